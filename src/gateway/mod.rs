//! HTTP API server.
//!
//! Thin REST surface over the agent and the file tools: conversation,
//! learned knowledge, history search, and the two explicit-action endpoints
//! (organize, move). All non-trivial behavior lives in the agent layer.

use crate::agent::{Agent, TurnRequest};
use crate::config::GatewayConfig;
use crate::memory::MemoryStore;
use crate::providers::Message;
use crate::tools::FileTools;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Max query size for the chat endpoint: 1 MB.
const MAX_QUERY_SIZE: usize = 1_048_576;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub memory: Arc<MemoryStore>,
    pub tools: Arc<dyn FileTools>,
}

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<Message>,
    /// Optional session ID for preview/confirm continuity.
    /// If omitted, each request gets a unique session.
    pub session_id: Option<String>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub duration: f64,
    /// The session ID (for follow-up requests).
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct OrganizeRequest {
    pub path: String,
    #[serde(default)]
    pub execute: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub src: String,
    pub dest: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/knowledge", get(knowledge_handler))
        .route("/api/search", get(search_handler))
        .route("/api/organize", post(organize_handler))
        .route("/api/move", post(move_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &GatewayConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("gateway listening on {}", addr);
    axum::serve(listener, build_router(state))
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "agent": "deskbot",
        "version": crate::VERSION,
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    if body.query.len() > MAX_QUERY_SIZE {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({"error": "query too large"})),
        );
    }

    let session_id = body
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let reply = state
        .agent
        .handle_turn(TurnRequest {
            query: body.query,
            history: body.history,
            session_id: Some(session_id.clone()),
        })
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!(ChatResponse {
            reply: reply.reply,
            duration: reply.duration_seconds,
            session_id,
        })),
    )
}

async fn knowledge_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.memory.recent_facts(15) {
        Ok(facts) => (StatusCode::OK, Json(serde_json::json!({"facts": facts}))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        ),
    }
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    match state.memory.search_history(&params.q, 20) {
        Ok(records) => (StatusCode::OK, Json(serde_json::json!(records))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        ),
    }
}

async fn organize_handler(
    State(state): State<AppState>,
    Json(body): Json<OrganizeRequest>,
) -> impl IntoResponse {
    match state
        .tools
        .organize_folder(&PathBuf::from(&body.path), body.execute)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(serde_json::json!(outcome))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        ),
    }
}

async fn move_handler(
    State(state): State<AppState>,
    Json(body): Json<MoveRequest>,
) -> impl IntoResponse {
    match state
        .tools
        .move_file(&PathBuf::from(&body.src), &PathBuf::from(&body.dest))
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(serde_json::json!(outcome))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        ),
    }
}

#[cfg(test)]
mod tests;
