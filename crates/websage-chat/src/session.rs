//! Conversation store: one active chat plus an append-only archive.
//!
//! Scoped to a single user session. Created at session start, discarded
//! at session end; nothing here survives a process restart.

use chrono::Utc;
use uuid::Uuid;

use websage_core::{ArchivedChat, ChatRole, Message};

/// Per-session conversation state.
///
/// The active chat starts empty. Archiving moves a non-empty active
/// chat to the end of the archive (most-recent-last) and resets the
/// active chat; archived chats are never mutated afterwards. There is
/// no deletion operation.
#[derive(Debug, Default)]
pub struct ChatSession {
    active: Vec<Message>,
    archive: Vec<ArchivedChat>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the active chat.
    pub fn append(&mut self, role: ChatRole, content: impl Into<String>) {
        self.active.push(Message::new(role, content));
    }

    /// Messages of the active chat, in insertion order.
    pub fn active(&self) -> &[Message] {
        &self.active
    }

    /// Archived chats, oldest first.
    pub fn archive(&self) -> &[ArchivedChat] {
        &self.archive
    }

    /// Move the active chat to the archive and start a fresh one.
    ///
    /// A no-op when the active chat is empty; the archive never grows
    /// an empty entry.
    pub fn archive_and_reset(&mut self) {
        if self.active.is_empty() {
            return;
        }
        let messages = std::mem::take(&mut self.active);
        self.archive.push(ArchivedChat {
            id: Uuid::new_v4(),
            archived_at: Utc::now(),
            messages,
        });
    }

    /// Case-insensitive substring search across archived chats.
    ///
    /// Scans most-recent-first. Each hit pairs the chat's 0-based
    /// position in the chronological archive with its matching
    /// messages, in their original order. Chats without matches are
    /// omitted.
    pub fn search_archive(&self, substring: &str) -> Vec<(usize, Vec<&Message>)> {
        let needle = substring.to_lowercase();
        self.archive
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(index, chat)| {
                let matches: Vec<&Message> = chat
                    .messages
                    .iter()
                    .filter(|m| m.content.to_lowercase().contains(&needle))
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some((index, matches))
                }
            })
            .collect()
    }
}
