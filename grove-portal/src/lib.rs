//! grove-portal library interface
//!
//! Exposes the application state, router construction, and all internal
//! modules for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod progression;
pub mod services;
pub mod tasks;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use grove_common::config::PortalConfig;
use grove_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::progression::ProgressionCoordinator;
use crate::services::{ChatClient, DiscordClient, MintClient, Notifier, TwitterClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (sole source of truth for progression)
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// The progression engine entry point
    pub coordinator: Arc<ProgressionCoordinator>,
    pub discord: Arc<DiscordClient>,
    /// None when the chat relay is not configured
    pub chat: Option<Arc<ChatClient>>,
    /// None when minting is not configured
    pub mint: Option<Arc<MintClient>>,
    pub twitter: Arc<TwitterClient>,
    pub config: Arc<PortalConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire up state and collaborators from configuration
    pub fn new(db: SqlitePool, event_bus: EventBus, config: PortalConfig) -> Self {
        let notifier = Arc::new(Notifier::from_config(&config.notify));
        let coordinator = Arc::new(ProgressionCoordinator::new(
            db.clone(),
            config.thresholds.clone(),
            notifier,
            event_bus.clone(),
        ));

        Self {
            db,
            event_bus,
            coordinator,
            discord: Arc::new(DiscordClient::new(config.discord.bot_token.clone())),
            chat: ChatClient::from_config(&config.chat).map(Arc::new),
            mint: MintClient::from_config(&config.mint).map(Arc::new),
            twitter: Arc::new(TwitterClient::new(config.twitter.bearer_token.clone())),
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health::routes())
        .merge(api::projects::routes())
        .merge(api::chat::routes())
        .merge(api::community::routes())
        .merge(api::webhook::routes())
        .route("/events", get(api::sse::event_stream))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
