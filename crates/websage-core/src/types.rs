//! Shared data types for chats and search results.
//!
//! These are deliberately small: a message is just a role and its text,
//! and a search result is three optional fields straight from the
//! provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// Capitalized form for display.
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// A single message within a chat. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A completed chat moved to the archive. Never mutated after archival.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchivedChat {
    pub id: Uuid,
    pub archived_at: DateTime<Utc>,
    /// Messages in their original chronological order.
    pub messages: Vec<Message>,
}

/// One result from the web-search provider.
///
/// All fields are optional because the provider may omit any of them.
/// Produced transiently per query and not persisted beyond the single
/// response that used it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl SearchResult {
    /// Synthetic record carrying a provider failure description.
    ///
    /// This is the search boundary's sole error-reporting channel.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: Some("Error".to_string()),
            link: None,
            snippet: Some(description.into()),
        }
    }
}
