//! Progression coordinator
//!
//! Single entry point for every trigger source: the community-bot
//! webhook, the reconciliation sweep, the manual progress check, and
//! asset-mint completion all funnel through `on_trigger`. The
//! coordinator classifies (when given an activity), counts
//! idempotently, refreshes the member count, evaluates the gate, and
//! performs the at-most-once level transition.
//!
//! Safe under arbitrary concurrent invocation for the same project:
//! counting is keyed by activity identity, the transition is guarded by
//! compare-and-set on the expected level, and the notification ledger
//! backstops the CAS against re-entrant announcements. A lost CAS means
//! another trigger already advanced the project and is reported as
//! "no transition", never as an error.

use crate::db;
use crate::models::{ActivityCategory, ActivityUnit, TriggerOutcome};
use crate::progression::{can_advance, classify, requirement_text, ExternalFlags, MetricsStore, MAX_AUTO_LEVEL};
use crate::services::Notifier;
use anyhow::{anyhow, Result};
use chrono::Utc;
use grove_common::config::LevelThresholds;
use grove_common::events::{EventBus, GroveEvent};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

pub struct ProgressionCoordinator {
    pool: SqlitePool,
    store: MetricsStore,
    thresholds: LevelThresholds,
    notifier: Arc<Notifier>,
    event_bus: EventBus,
}

impl ProgressionCoordinator {
    pub fn new(
        pool: SqlitePool,
        thresholds: LevelThresholds,
        notifier: Arc<Notifier>,
        event_bus: EventBus,
    ) -> Self {
        let store = MetricsStore::new(pool.clone());
        Self {
            pool,
            store,
            thresholds,
            notifier,
            event_bus,
        }
    }

    /// The metrics store this coordinator mutates through
    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    /// Process one trigger for a project.
    ///
    /// Steps 1-3 (classify, count, refresh) abort the call on a store
    /// failure without touching the level; the next trigger retries on
    /// then-current data. At most one level is gained per call even when
    /// the metrics would satisfy several gates at once.
    pub async fn on_trigger(
        &self,
        project_id: Uuid,
        activity: Option<&ActivityUnit>,
        live_member_count: Option<u64>,
    ) -> Result<TriggerOutcome> {
        let project = db::projects::get_project(&self.pool, project_id)
            .await?
            .ok_or_else(|| anyhow!("project {project_id} not found"))?;

        let mut metrics = self.store.get_or_create(project_id).await?;

        if let Some(activity) = activity {
            let classification = classify(activity);
            tracing::debug!(
                project_id = %project_id,
                activity_id = %activity.id,
                category = classification.category.as_str(),
                confidence = classification.confidence,
                "Classified activity"
            );

            metrics = self
                .store
                .apply_activity(project_id, &activity.id, &classification)
                .await?;

            match classification.category {
                ActivityCategory::Paper => {
                    self.event_bus.emit_lossy(GroveEvent::PaperShared {
                        project_id,
                        activity_id: activity.id.clone(),
                        confidence: classification.confidence,
                        papers_shared: metrics.papers_shared,
                        timestamp: Utc::now(),
                    });
                }
                ActivityCategory::Ordinary => {
                    self.event_bus.emit_lossy(GroveEvent::ActivityCounted {
                        project_id,
                        activity_id: activity.id.clone(),
                        category: classification.category.as_str().to_string(),
                        messages_count: metrics.messages_count,
                        papers_shared: metrics.papers_shared,
                        timestamp: Utc::now(),
                    });
                }
                ActivityCategory::LowValue => {}
            }
        }

        if let Some(live) = live_member_count {
            metrics = self.store.refresh_member_count(project_id, live).await?;
            self.event_bus.emit_lossy(GroveEvent::MemberCountRefreshed {
                project_id,
                member_count: metrics.member_count,
                timestamp: Utc::now(),
            });
        }

        let current_level = project.level;
        if current_level >= MAX_AUTO_LEVEL {
            return Ok(TriggerOutcome::unchanged(current_level));
        }

        let (idea_asset_minted, vision_asset_minted) =
            db::assets::asset_flags(&self.pool, project_id).await?;
        let flags = ExternalFlags {
            idea_asset_minted,
            vision_asset_minted,
            bot_linked: metrics.bot_linked,
        };

        if !can_advance(current_level, &metrics, &flags, &self.thresholds) {
            return Ok(TriggerOutcome::unchanged(current_level));
        }

        let to_level = current_level + 1;
        if !self
            .store
            .compare_and_set_level(project_id, current_level, to_level)
            .await?
        {
            // Lost the race: another trigger already advanced this level
            tracing::debug!(
                project_id = %project_id,
                expected = current_level,
                "Level transition already taken by a concurrent trigger"
            );
            return Ok(TriggerOutcome::unchanged(current_level));
        }

        tracing::info!(
            project_id = %project_id,
            from_level = current_level,
            to_level,
            "Project advanced"
        );

        // The ledger row backstops the CAS: even a re-entrant caller that
        // somehow reaches this point announces at most once per level
        if self.store.record_notification(project_id, to_level).await? {
            let notifier = Arc::clone(&self.notifier);
            let project_name = project.name.clone();
            let contact_email = project.contact_email.clone();
            let requirements = requirement_text(to_level, &self.thresholds);
            tokio::spawn(async move {
                notifier
                    .announce_level_up(
                        &project_name,
                        contact_email.as_deref(),
                        to_level,
                        &requirements,
                    )
                    .await;
            });
        }

        self.event_bus.emit_lossy(GroveEvent::LevelAdvanced {
            project_id,
            from_level: current_level,
            to_level,
            timestamp: Utc::now(),
        });

        Ok(TriggerOutcome {
            advanced: true,
            from_level: current_level,
            to_level,
        })
    }
}
