//! Message model representing one transcript entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the human user.
    User,
    /// Message produced by the reply service (or a local error entry).
    Bot,
}

impl Sender {
    /// Lowercase label used for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single transcript entry. Immutable once created; the transcript is an
/// append-only sequence, never reordered or edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (UUIDv7, time-ordered so creation order is
    /// recoverable even under rapid successive calls).
    pub id: Uuid,
    /// Display text. Already normalized for bot entries, raw trimmed input
    /// for user entries.
    pub text: String,
    /// Who authored the message. Fixed at creation.
    pub sender: Sender,
    /// When the message was created. Used only for display formatting.
    pub time: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_under_rapid_creation() {
        let a = Message::new(Sender::User, "one");
        let b = Message::new(Sender::User, "two");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sender_labels() {
        assert_eq!(Sender::User.as_str(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
    }
}
