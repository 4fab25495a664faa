//! Append-only message history of one conversation view

use crate::types::Message;

/// Ordered, append-only list of messages.
///
/// Insertion order is display order. Entries are never edited, removed,
/// re-sorted or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    messages: Vec<Message>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in arrival order
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
