//! Shared foundation for Websage: configuration, credentials, the
//! top-level error type, and the chat/search data types every other
//! crate builds on.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, WebsageConfig};
pub use error::{Result, WebsageError};
pub use types::{ArchivedChat, ChatRole, Message, SearchResult};
