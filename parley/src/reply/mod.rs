//! Reply service boundary.
//!
//! The session never talks to the network directly; it goes through the
//! [`ReplyService`] trait so transcript logic stays testable with a fake.

mod http;

use async_trait::async_trait;

pub use http::{HttpReplyService, DEFAULT_SERVER_URL};

/// Errors a reply service can produce. The session treats every variant the
/// same way (a fixed error entry in the transcript), but callers that log
/// want the distinction.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// Connection, DNS, timeout, or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
}

/// A request/response boundary that turns one trimmed user message into one
/// raw reply. Exactly one attempt per call; no retry, no history — the
/// service only ever sees the latest user turn.
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Send `message` and return the raw (possibly markup-laden) reply text.
    async fn reply(&self, message: &str) -> Result<String, ReplyError>;
}
