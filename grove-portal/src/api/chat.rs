//! Chat relay endpoints
//!
//! Persists the conversation per project and relays each user message,
//! with project context and a bounded history window, through the LLM.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::chat::StoredChatMessage;
use crate::error::{ApiError, ApiResult};
use crate::services::{ChatClient, ChatTurn};
use crate::{db, AppState};
use grove_common::events::GroveEvent;

/// POST /projects/{id}/chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /projects/{id}/chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /projects/{id}/chat
pub async fn relay_message(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let project = db::projects::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))?;

    let chat = state
        .chat
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("chat relay not configured".to_string()))?;

    let metrics = state
        .coordinator
        .store()
        .get_or_create(project_id)
        .await?;

    let history: Vec<ChatTurn> = db::chat::recent_messages(&state.db, project_id, 50)
        .await?
        .into_iter()
        .map(|m| ChatTurn {
            role: m.role,
            content: m.content,
        })
        .collect();

    let system_prompt = ChatClient::build_system_prompt(&project, Some(&metrics));
    let reply = chat
        .complete(&system_prompt, &history, message)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    // Persist both turns only after a successful completion
    db::chat::insert_message(&state.db, project_id, "user", message).await?;
    db::chat::insert_message(&state.db, project_id, "assistant", &reply).await?;

    state.event_bus.emit_lossy(GroveEvent::ChatExchange {
        project_id,
        timestamp: Utc::now(),
    });

    Ok(Json(ChatResponse { reply }))
}

/// GET /projects/{id}/chat
pub async fn chat_history(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StoredChatMessage>>> {
    if db::projects::get_project(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }

    Ok(Json(
        db::chat::recent_messages(&state.db, project_id, 100).await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/projects/:id/chat",
        post(relay_message).get(chat_history),
    )
}
