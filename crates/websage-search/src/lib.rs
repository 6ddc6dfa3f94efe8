//! Web-search provider client.
//!
//! Wraps the Google Custom Search JSON API behind the infallible
//! [`SearchProvider`] trait and renders raw results for the `search:`
//! command.

pub mod client;
pub mod format;

pub use client::{GoogleSearchClient, SearchProvider, MAX_RESULTS};
pub use format::format_results_markdown;
