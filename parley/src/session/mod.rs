//! Conversation session.
//!
//! Owns the ordered transcript and the pending flag, and drives exactly one
//! reply-service call per submitted turn. The presentation layer only ever
//! sees [`Snapshot`]s and calls [`ChatSession::submit`] / [`ChatSession::reset`],
//! so the session is testable without any rendering surface.

use tokio::sync::RwLock;

use crate::models::{Message, Sender};
use crate::normalize::normalize;
use crate::reply::ReplyService;

/// Greeting seeded into a fresh session.
pub const GREETING_TEXT: &str = "Hello! Ask me anything.";

/// Greeting seeded by `reset`, distinguishable from the initial one.
pub const RESET_TEXT: &str = "Chat cleared. Ask me something!";

/// Transcript entry shown when the reply service fails for any reason.
pub const CONNECT_ERROR_TEXT: &str = "Error: Could not connect to server";

/// What happened to a `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A user entry and a bot entry (reply or error) were appended.
    Completed,
    /// Trimmed input was empty; nothing changed.
    IgnoredEmpty,
    /// A request was already outstanding; nothing changed.
    IgnoredBusy,
}

/// Point-in-time view of the session for rendering.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The transcript in insertion (= display) order.
    pub transcript: Vec<Message>,
    /// True exactly while a reply request is outstanding.
    pub pending: bool,
}

#[derive(Debug)]
struct SessionState {
    transcript: Vec<Message>,
    pending: bool,
}

impl SessionState {
    fn seeded(greeting: &str) -> Self {
        Self {
            transcript: vec![Message::new(Sender::Bot, greeting)],
            pending: false,
        }
    }
}

/// A conversation between the user and one reply service.
///
/// The transcript is append-only and never empty. At most one request is
/// outstanding at a time: a second `submit` while one is in flight is
/// rejected outright rather than queued, so two bot replies can never race
/// for append order.
pub struct ChatSession<S> {
    state: RwLock<SessionState>,
    service: S,
}

impl<S: ReplyService> ChatSession<S> {
    /// Create a session seeded with the initial greeting.
    pub fn new(service: S) -> Self {
        Self {
            state: RwLock::new(SessionState::seeded(GREETING_TEXT)),
            service,
        }
    }

    /// Submit one user turn.
    ///
    /// Trims the input, appends a user entry, calls the reply service once,
    /// and appends the normalized reply (or the fixed error entry if the
    /// service failed). The pending flag is released on every exit path.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let text = raw_text.trim();
        if text.is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }

        {
            let mut state = self.state.write().await;
            if state.pending {
                return SubmitOutcome::IgnoredBusy;
            }
            state.pending = true;
            let entry = Message::new(Sender::User, text);
            tracing::debug!(sender = %entry.sender, id = %entry.id, "appending transcript entry");
            state.transcript.push(entry);
        }

        // The only suspension point: exactly one attempt, no retry.
        let reply_text = match self.service.reply(text).await {
            Ok(raw) => normalize(&raw),
            Err(err) => {
                tracing::warn!(error = %err, "reply service failed");
                // The error literal carries no markup, but error entries take
                // the same path as real replies.
                normalize(CONNECT_ERROR_TEXT)
            }
        };

        let mut state = self.state.write().await;
        let entry = Message::new(Sender::Bot, reply_text);
        tracing::debug!(sender = %entry.sender, id = %entry.id, "appending transcript entry");
        state.transcript.push(entry);
        state.pending = false;
        SubmitOutcome::Completed
    }

    /// Replace the transcript with a single fresh greeting and clear the
    /// pending flag. Always succeeds.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = SessionState::seeded(RESET_TEXT);
    }

    /// Consistent point-in-time view of the transcript and pending flag.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            transcript: state.transcript.clone(),
            pending: state.pending,
        }
    }
}
