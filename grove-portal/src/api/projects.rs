//! Project CRUD and onboarding asset endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{AssetKind, MintedAsset, Project};
use crate::services::LookupOutcome;
use crate::{db, AppState};
use grove_common::events::GroveEvent;

/// POST /projects request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub wallet_address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// PATCH /projects/{id} request
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// POST /projects/{id}/assets/{kind}/mint response
#[derive(Debug, Serialize)]
pub struct MintAssetResponse {
    pub project_id: Uuid,
    pub kind: AssetKind,
    pub tx_id: String,
    /// Outcome of the progress check run after recording the mint
    pub advanced: bool,
    pub level: i64,
}

/// POST /projects/{id}/social/share request
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub post_url: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub verified: bool,
    pub recorded: bool,
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Project name is required".to_string()));
    }
    if request.wallet_address.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Wallet address is required".to_string(),
        ));
    }

    let project = Project::new(
        request.name.trim().to_string(),
        request.wallet_address.trim().to_string(),
        request.description,
        request.contact_email,
    );
    db::projects::create_project(&state.db, &project).await?;

    state.event_bus.emit_lossy(GroveEvent::ProjectCreated {
        project_id: project.id,
        name: project.name.clone(),
        timestamp: Utc::now(),
    });

    // Echo back with stored timestamps
    let stored = db::projects::get_project(&state.db, project.id)
        .await?
        .ok_or_else(|| ApiError::Internal("project vanished after insert".to_string()))?;

    Ok(Json(stored))
}

/// GET /projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(db::projects::list_projects(&state.db).await?))
}

/// GET /projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    db::projects::get_project(&state.db, project_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))
}

/// PATCH /projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let updated = db::projects::update_project(
        &state.db,
        project_id,
        request.name.as_deref(),
        request.description.as_deref(),
        request.contact_email.as_deref(),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }

    db::projects::get_project(&state.db, project_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))
}

/// DELETE /projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !db::projects::delete_project(&state.db, project_id).await? {
        return Err(ApiError::NotFound(format!("project {project_id}")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /projects/{id}/assets
pub async fn list_assets(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MintedAsset>>> {
    Ok(Json(db::assets::get_assets(&state.db, project_id).await?))
}

/// POST /projects/{id}/assets/{kind}/mint
///
/// Mints the asset to the project wallet, records it, then runs a
/// progress check (the level 1 -> 2 path).
pub async fn mint_asset(
    State(state): State<AppState>,
    Path((project_id, kind)): Path<(Uuid, String)>,
) -> ApiResult<Json<MintAssetResponse>> {
    let kind = AssetKind::parse(&kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown asset kind: {kind}")))?;

    let project = db::projects::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))?;

    let mint = state
        .mint
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("minting service not configured".to_string()))?;

    let tx_id = mint
        .mint(&project.wallet_address, kind)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    // Idempotent: a prior mint of this kind wins and its tx id is returned
    let tx_id = db::assets::record_mint(&state.db, project_id, kind, &tx_id).await?;

    state.event_bus.emit_lossy(GroveEvent::AssetMinted {
        project_id,
        kind: kind.as_str().to_string(),
        tx_id: tx_id.clone(),
        timestamp: Utc::now(),
    });

    let outcome = state.coordinator.on_trigger(project_id, None, None).await?;

    Ok(Json(MintAssetResponse {
        project_id,
        kind,
        tx_id,
        advanced: outcome.advanced,
        level: outcome.to_level,
    }))
}

/// POST /projects/{id}/social/share
///
/// Verifies the announcement post and records the share flag. An
/// unavailable platform is "no new information": nothing recorded,
/// nothing failed.
pub async fn share_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let project = db::projects::get_project(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))?;

    match state
        .twitter
        .verify_share(&request.post_url, &project.name)
        .await
    {
        LookupOutcome::Found(true) => {
            db::projects::set_social_shared(&state.db, project_id).await?;
            Ok(Json(ShareResponse {
                verified: true,
                recorded: true,
            }))
        }
        LookupOutcome::Found(false) => Ok(Json(ShareResponse {
            verified: false,
            recorded: false,
        })),
        LookupOutcome::Unavailable { reason } => {
            tracing::debug!(project_id = %project_id, "Share verification unavailable: {reason}");
            Ok(Json(ShareResponse {
                verified: false,
                recorded: false,
            }))
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(get_project)
                .patch(update_project)
                .delete(delete_project),
        )
        .route("/projects/:id/assets", get(list_assets))
        .route("/projects/:id/assets/:kind/mint", post(mint_asset))
        .route("/projects/:id/social/share", post(share_project))
}
