//! Community linking and progress endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{CommunityMetrics, TriggerOutcome};
use crate::progression::{requirement_text, MAX_AUTO_LEVEL};
use crate::services::LookupOutcome;
use crate::{db, AppState};
use grove_common::events::GroveEvent;

/// POST /projects/{id}/community/link request
#[derive(Debug, Deserialize)]
pub struct LinkCommunityRequest {
    /// Discord invite code or full invite URL
    pub invite: String,
}

/// POST /projects/{id}/community/link response
#[derive(Debug, Serialize)]
pub struct LinkCommunityResponse {
    pub guild_id: String,
    pub guild_name: String,
    pub member_count: u64,
    pub advanced: bool,
    pub level: i64,
}

/// GET /projects/{id}/community response
#[derive(Debug, Serialize)]
pub struct CommunityStatusResponse {
    pub metrics: CommunityMetrics,
    pub level: i64,
    /// What the next gate requires, None at the terminal level
    pub next_requirement: Option<String>,
}

/// POST /projects/{id}/community/link
///
/// Resolves the invite, attaches the guild to the project's community
/// record (created lazily here), refreshes the member count, and runs a
/// progress check.
pub async fn link_community(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<LinkCommunityRequest>,
) -> ApiResult<Json<LinkCommunityResponse>> {
    if db::projects::get_project(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }

    let guild = match state.discord.resolve_invite(&request.invite).await {
        LookupOutcome::Found(guild) => guild,
        LookupOutcome::Unavailable { reason } => {
            return Err(ApiError::Upstream(format!(
                "could not resolve invite: {reason}"
            )));
        }
    };

    let store = state.coordinator.store();
    store.link_guild(project_id, &guild.id, &guild.name).await?;
    // A resolvable invite is what verifies the community
    store.set_verified(project_id).await?;

    let outcome = state
        .coordinator
        .on_trigger(project_id, None, guild.approximate_member_count)
        .await?;

    state.event_bus.emit_lossy(GroveEvent::CommunityLinked {
        project_id,
        guild_id: guild.id.clone(),
        guild_name: guild.name.clone(),
        timestamp: Utc::now(),
    });

    let metrics = store.get_or_create(project_id).await?;

    Ok(Json(LinkCommunityResponse {
        guild_id: guild.id,
        guild_name: guild.name,
        member_count: metrics.member_count,
        advanced: outcome.advanced,
        level: outcome.to_level,
    }))
}

/// GET /projects/{id}/community
pub async fn community_status(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<CommunityStatusResponse>> {
    let project = db::projects::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))?;

    let metrics = state
        .coordinator
        .store()
        .get_or_create(project_id)
        .await?;

    let next_requirement = (project.level < MAX_AUTO_LEVEL)
        .then(|| requirement_text(project.level + 1, &state.config.thresholds));

    Ok(Json(CommunityStatusResponse {
        metrics,
        level: project.level,
        next_requirement,
    }))
}

/// POST /projects/{id}/progress/check
///
/// The explicit user-initiated trigger: re-evaluates the gate against
/// current counters without new activity.
pub async fn check_progress(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<TriggerOutcome>> {
    if db::projects::get_project(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }

    let outcome = state.coordinator.on_trigger(project_id, None, None).await?;
    Ok(Json(outcome))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/community/link", post(link_community))
        .route("/projects/:id/community", get(community_status))
        .route("/projects/:id/progress/check", post(check_progress))
}
