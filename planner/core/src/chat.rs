//! Chat log for the plan assistant
//!
//! Append-only transcript of the conversation held on the weekly plan
//! screen. Replies come from the backend; nothing here interprets them.

use serde::{Deserialize, Serialize};

/// Who wrote a chat entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Typed by the user
    User,
    /// Returned by the backend
    Bot,
}

/// One entry in the transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Author
    #[serde(rename = "type")]
    pub role: ChatRole,
    /// Text
    pub message: String,
}

impl ChatEntry {
    /// Entry typed by the user
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            message: message.into(),
        }
    }

    /// Entry returned by the backend
    pub fn bot(message: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            message: message.into(),
        }
    }
}

/// Append-only chat transcript
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    /// Empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Most recent entry
    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been said
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_order() {
        let mut log = ChatLog::new();
        log.push(ChatEntry::user("What's for lunch?"));
        log.push(ChatEntry::bot("Rice and dal."));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].role, ChatRole::User);
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("Rice and dal."));
    }

    #[test]
    fn test_entry_serializes_role_as_type() {
        let json = serde_json::to_value(ChatEntry::bot("hi")).unwrap();
        assert_eq!(json["type"], "bot");
    }
}
