//! HTTP reply service client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ReplyError, ReplyService};

/// Default local reply server address.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Bounded wait for one reply. The server performs a single upstream model
/// call per request, so a generous cap is enough to avoid a stuck session.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Request body for `POST /chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Response body from `POST /chat`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

/// Reply service backed by the parley reply server over HTTP.
pub struct HttpReplyService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReplyService {
    /// Create a client for the server at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ReplyService for HttpReplyService {
    async fn reply(&self, message: &str) -> Result<String, ReplyError> {
        let url = format!("{}/chat", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), %url, "reply server returned an error");
            return Err(ReplyError::Status(resp.status()));
        }

        let body: ChatResponse = resp.json().await?;
        Ok(body.reply)
    }
}
