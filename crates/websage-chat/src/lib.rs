//! Conversational state and the interaction loop for Websage.
//!
//! Holds the per-session conversation store (active chat plus archive)
//! and the orchestrator that dispatches user input to raw search or the
//! search-augmented answer flow.

pub mod orchestrator;
pub mod session;

pub use orchestrator::{ChatOrchestrator, RESULT_COUNT, SEARCH_PREFIX};
pub use session::ChatSession;
