//! Upstream Gemini API client used by the reply server.

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Reply used when the model returns no candidates.
pub const NO_RESPONSE_TEXT: &str = "I couldn't generate a response. Please try again.";

const EMBEDDING_MODEL: &str = "embedding-001";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Dimension of the zero vector returned when embedding fails.
const EMBEDDING_DIM: usize = 768;

/// Client for the Generative Language API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for `model` authenticated with `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Model name this client generates with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate one reply for a single-user-turn prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Gemini API")?;

        if !resp.status().is_success() {
            bail!("Gemini returned {}", resp.status());
        }

        let value: Value = resp.json().await.context("Failed to parse Gemini response")?;
        Ok(extract_reply(&value).unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()))
    }

    /// Embed `text`, degrading to a zero vector on any failure so a chat
    /// turn never fails because of memory lookups.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.try_embed(text).await {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(error = %err, "embedding failed, using zero vector");
                vec![0.0; EMBEDDING_DIM]
            }
        }
    }

    async fn try_embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, EMBEDDING_MODEL, self.api_key
        );
        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] },
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach embedding API")?;

        if !resp.status().is_success() {
            bail!("Embedding API returned {}", resp.status());
        }

        let value: Value = resp
            .json()
            .await
            .context("Failed to parse embedding response")?;
        extract_embedding(&value).context("Embedding response had no values")
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a generate response.
fn extract_reply(value: &Value) -> Option<String> {
    value
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .map(String::from)
}

/// Pull `embedding.values` out of an embed response.
fn extract_embedding(value: &Value) -> Option<Vec<f32>> {
    let values = value.get("embedding")?.get("values")?.as_array()?;
    values
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_reply_text() {
        let value = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello there" }] }
            }]
        });
        assert_eq!(extract_reply(&value).as_deref(), Some("Hello there"));
    }

    #[test]
    fn missing_candidates_yields_none() {
        let value = serde_json::json!({ "candidates": [] });
        assert_eq!(extract_reply(&value), None);
        assert_eq!(extract_reply(&serde_json::json!({})), None);
    }

    #[test]
    fn extracts_embedding_values() {
        let value = serde_json::json!({
            "embedding": { "values": [0.25, -0.5] }
        });
        assert_eq!(extract_embedding(&value), Some(vec![0.25, -0.5]));
    }

    #[test]
    fn malformed_embedding_yields_none() {
        assert_eq!(extract_embedding(&serde_json::json!({})), None);
        let non_numeric = serde_json::json!({ "embedding": { "values": ["x"] } });
        assert_eq!(extract_embedding(&non_numeric), None);
    }
}
