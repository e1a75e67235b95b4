//! grove-portal - Community onboarding portal backend
//!
//! Single service hosting the project CRUD, the chat relay, the
//! community-bot webhook, and the progression engine with its periodic
//! reconciliation sweep.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grove_common::config::{resolve_data_folder, PortalConfig};
use grove_common::events::EventBus;
use grove_portal::{build_router, AppState};

/// Default seconds between reconciliation sweeps
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;

/// Command-line arguments for grove-portal
#[derive(Parser, Debug)]
#[command(name = "grove-portal")]
#[command(about = "Community onboarding portal backend")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "GROVE_PORT")]
    port: u16,

    /// Data folder holding grove.db
    #[arg(short, long, env = "GROVE_DATA_FOLDER")]
    data_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grove_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting grove-portal on port {}", args.port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = PortalConfig::load().context("Failed to load configuration")?;

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!("Data folder: {}", data_folder.display());

    let db_path = data_folder.join("grove.db");
    let db_pool = grove_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);

    let reconcile_interval = config
        .reconcile_interval_secs
        .unwrap_or(DEFAULT_RECONCILE_INTERVAL_SECS);

    let state = AppState::new(db_pool, event_bus, config);

    // Background reconciliation sweep, stopped on shutdown
    let cancel_token = CancellationToken::new();
    let sweep_handle =
        grove_portal::tasks::reconcile::spawn(state.clone(), reconcile_interval, cancel_token.clone());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!("Listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    cancel_token.cancel();
    if let Some(handle) = sweep_handle {
        let _ = handle.await;
    }
    info!("Shutdown complete");

    Ok(())
}

/// Resolve on ctrl-c / SIGTERM and cancel background tasks
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    cancel_token.cancel();
}
