//! Parley reply server.
//!
//! One axum server fronting the Gemini API, with an in-process similarity
//! memory of earlier replies. Memory and history live in process memory
//! only; a restart starts blank.
//!
//! Endpoints:
//! - POST /chat - Answer one user message
//! - GET /memory - Memory stats
//! - GET /clear - Wipe memory and history
//! - GET / - Server status

mod gemini;
mod memory;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use gemini::{GeminiClient, DEFAULT_CHAT_MODEL};
use memory::{worth_remembering, MemoryItem, MemoryStore};

/// Reply for an empty submission; the model is not consulted.
const EMPTY_MESSAGE_REPLY: &str = "Please type a message.";

/// Reply when the upstream model reports a quota error.
const QUOTA_REPLY: &str = "API limit reached. Try again later.";

/// Remembered context is truncated before it goes into the prompt.
const CONTEXT_CAP: usize = 300;

/// Shared server state.
pub struct ServerState {
    /// Remembered replies and rolling turn history.
    memory: RwLock<MemoryStore>,
    /// Upstream model client.
    gemini: GeminiClient,
}

// === Request/Response Types ===

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize)]
struct MemoryStats {
    total: usize,
    recent: Vec<MemoryItem>,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    memory_entries: usize,
    model: String,
}

// === Server Lifecycle ===

/// Start the reply server on 127.0.0.1:`port`.
pub async fn start_server(port: u16, api_key: String, model: String) -> Result<()> {
    let state = Arc::new(ServerState {
        memory: RwLock::new(MemoryStore::new()),
        gemini: GeminiClient::new(api_key, model),
    });

    let app = Router::new()
        .route("/", get(status_handler))
        .route("/chat", post(chat_handler))
        .route("/memory", get(memory_handler))
        .route("/clear", get(clear_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Parley reply server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

// === Handlers ===

async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    let message = req.message.trim();
    if message.is_empty() {
        return Json(ChatReply {
            reply: EMPTY_MESSAGE_REPLY.to_string(),
        });
    }

    Json(ChatReply {
        reply: answer(&state, message).await,
    })
}

/// One chat turn: memory lookup, single model call, memory update. Model
/// failures degrade to in-band replies; this endpoint never returns a
/// non-200 for them.
async fn answer(state: &ServerState, message: &str) -> String {
    let query_embedding = state.gemini.embed(message).await;
    let context = state
        .memory
        .read()
        .await
        .best_match(&query_embedding)
        .map(String::from);

    let prompt = build_prompt(message, context.as_deref());

    state
        .memory
        .write()
        .await
        .record_turn("user", message.to_string());

    match state.gemini.generate(&prompt).await {
        Ok(reply) => {
            let reply_embedding = if worth_remembering(&reply) {
                Some(state.gemini.embed(&reply).await)
            } else {
                None
            };

            let mut memory = state.memory.write().await;
            memory.record_turn("assistant", reply.clone());
            if let Some(embedding) = reply_embedding {
                memory.remember(&reply, embedding);
            }
            reply
        }
        Err(err) => {
            tracing::warn!(error = %err, "chat turn failed");
            failure_reply(&err.to_string(), message)
        }
    }
}

async fn memory_handler(State(state): State<Arc<ServerState>>) -> Json<MemoryStats> {
    let memory = state.memory.read().await;
    Json(MemoryStats {
        total: memory.len(),
        recent: memory.recent(3).to_vec(),
    })
}

async fn clear_handler(State(state): State<Arc<ServerState>>) -> Json<ClearResponse> {
    state.memory.write().await.clear();
    Json(ClearResponse {
        message: "Memory cleared",
    })
}

async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    let memory = state.memory.read().await;
    Json(StatusResponse {
        status: "running",
        memory_entries: memory.len(),
        model: state.gemini.model().to_string(),
    })
}

/// Map an upstream failure to the in-band reply text: quota errors get the
/// fixed limit message, everything else echoes the question back.
fn failure_reply(error_text: &str, message: &str) -> String {
    if error_text.contains("429") {
        QUOTA_REPLY.to_string()
    } else {
        format!("I'm having trouble. You asked: '{message}'")
    }
}

/// Assemble the single-turn prompt, embedding remembered context when there
/// is any.
fn build_prompt(message: &str, context: Option<&str>) -> String {
    let context_block = context
        .map(|c| {
            let capped: String = c.chars().take(CONTEXT_CAP).collect();
            format!("[Related to previous conversation: {capped}]\n\n")
        })
        .unwrap_or_default();

    format!(
        "You are a helpful AI assistant.\n\n\
         {context_block}User: {message}\n\n\
         Answer in a helpful, natural way. If the context above is relevant, \
         use it. Otherwise just answer normally."
    )
}
