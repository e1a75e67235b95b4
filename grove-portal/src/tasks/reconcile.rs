//! Periodic reconciliation sweep
//!
//! Every interval, walks all projects with a linked guild, refreshes
//! the live member count from the platform, and re-runs the progression
//! check. This is the retry path for anything a live trigger missed: a
//! webhook delivery that failed, a store error that aborted a count, a
//! gate that became satisfied while nothing else was happening.
//!
//! Safe to abort mid-list: each project's update is independently
//! idempotent, and the next tick picks up from current state.

use crate::db;
use crate::services::LookupOutcome;
use crate::AppState;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Spawn the sweep task. `interval_secs` of 0 disables it.
pub fn spawn(
    state: AppState,
    interval_secs: u64,
    cancel_token: CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Reconciliation sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick fires immediately; skip it so startup isn't a sweep
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Reconciliation sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    run_sweep(&state, &cancel_token).await;
                }
            }
        }
    }))
}

/// One pass over all projects with a linked community
pub async fn run_sweep(state: &AppState, cancel_token: &CancellationToken) {
    let projects = match db::projects::list_projects_with_guild(&state.db).await {
        Ok(projects) => projects,
        Err(e) => {
            tracing::warn!("Reconciliation sweep could not list projects: {e}");
            return;
        }
    };

    tracing::debug!(count = projects.len(), "Reconciliation sweep starting");

    for (project_id, guild_id) in projects {
        if cancel_token.is_cancelled() {
            return;
        }

        // Unavailable platform means "no new information": the check
        // still runs against stored counters
        let live_count = match state.discord.member_count(&guild_id).await {
            LookupOutcome::Found(count) => Some(count),
            LookupOutcome::Unavailable { reason } => {
                tracing::debug!(project_id = %project_id, "Member count unavailable: {reason}");
                None
            }
        };

        if let Err(e) = state
            .coordinator
            .on_trigger(project_id, None, live_count)
            .await
        {
            // Retryable by the next tick; nothing partial was written
            tracing::warn!(project_id = %project_id, "Reconciliation trigger failed: {e}");
        }
    }
}
