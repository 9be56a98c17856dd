//! Route handler functions for the chat, history, and health endpoints.
//!
//! Each handler extracts parameters via axum extractors, calls into the
//! orchestrator held in AppState, and returns JSON responses.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shoptalk_core::types::Message;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request/response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: String,
    pub content: String,
    pub thread_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub thread_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub indexed_documents: usize,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /chat - answer a customer message within its conversation thread.
///
/// An absent or empty message is the same client error on the wire: the
/// fixed "Missing query parameter" body existing clients match on.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(ApiError::missing_message)?;

    let reply = state
        .orchestrator
        .handle_message(&message, request.thread_id)
        .await?;

    Ok(Json(ChatResponse {
        role: "assistant".to_string(),
        content: reply.content,
        thread_id: reply.thread_id,
    }))
}

/// GET /history/{thread_id} - read-only snapshot of a conversation.
///
/// Unknown thread ids return an empty message list rather than 404, since a
/// thread id is legal before its first completed turn.
pub async fn history(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Json<HistoryResponse> {
    let messages = state.orchestrator.history(&thread_id);
    Json(HistoryResponse {
        thread_id,
        messages,
    })
}

/// GET /health - liveness and index size.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        indexed_documents: state.index.len(),
    })
}
