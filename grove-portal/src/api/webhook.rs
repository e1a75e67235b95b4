//! Community bot webhook
//!
//! Intake for the Discord relay bot: live chat messages, member-count
//! updates, and the bot-link handshake all arrive here and feed the
//! progression coordinator. Requests carry a shared secret; anything
//! else is rejected before touching state.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{ActivityUnit, TriggerOutcome};
use crate::AppState;

/// Header carrying the shared webhook secret
pub const SECRET_HEADER: &str = "x-grove-webhook-secret";

/// Webhook payload, discriminated by the `event` field
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WebhookPayload {
    /// A live chat message observed by the bot
    Message {
        project_id: Uuid,
        activity: ActivityUnit,
    },
    /// A member-count update pushed by the bot
    MemberCount {
        project_id: Uuid,
        member_count: u64,
    },
    /// The bot completed its handshake in the project's guild
    BotLinked {
        project_id: Uuid,
        guild_id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub accepted: bool,
    pub outcome: Option<TriggerOutcome>,
}

/// POST /webhook/discord
pub async fn discord_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> ApiResult<Json<WebhookResponse>> {
    verify_secret(&state, &headers)?;

    let outcome = match payload {
        WebhookPayload::Message {
            project_id,
            activity,
        } => {
            if activity.id.trim().is_empty() {
                return Err(ApiError::BadRequest(
                    "activity id is required for de-duplication".to_string(),
                ));
            }
            state
                .coordinator
                .on_trigger(project_id, Some(&activity), None)
                .await?
        }
        WebhookPayload::MemberCount {
            project_id,
            member_count,
        } => {
            state
                .coordinator
                .on_trigger(project_id, None, Some(member_count))
                .await?
        }
        WebhookPayload::BotLinked {
            project_id,
            guild_id,
        } => {
            let store = state.coordinator.store();
            let metrics = store.set_bot_linked(project_id).await?;
            // Bot handshake implies the guild id is authoritative
            if metrics.guild_id.as_deref() != Some(guild_id.as_str()) {
                store
                    .link_guild(project_id, &guild_id, metrics.guild_name.as_deref().unwrap_or(""))
                    .await?;
            }
            state.coordinator.on_trigger(project_id, None, None).await?
        }
    };

    Ok(Json(WebhookResponse {
        accepted: true,
        outcome: Some(outcome),
    }))
}

fn verify_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = match &state.config.discord.webhook_secret {
        Some(secret) if !secret.is_empty() => secret,
        // No secret configured: accept everything (development mode)
        _ => return Ok(()),
    };

    let presented = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    if presented == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized(
            "missing or invalid webhook secret".to_string(),
        ))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhook/discord", post(discord_webhook))
}
