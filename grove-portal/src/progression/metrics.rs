//! Metrics store adapter
//!
//! Owns every mutation of per-project counters and the level field. The
//! database is the sole source of truth; nothing in process memory is
//! authoritative. Two primitives make concurrent triggers safe without
//! locks:
//!
//! - counter updates are idempotent increments keyed by activity
//!   identity (the activity_log ledger), so redelivery of the same
//!   event is a no-op;
//! - level writes are compare-and-set on the expected current level, so
//!   at most one caller wins any given transition.

use crate::models::{ActivityCategory, Classification, CommunityMetrics};
use anyhow::{anyhow, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Weight of history in the quality running average
const QUALITY_DECAY: f64 = 0.9;
/// Weight of the newest contribution
const QUALITY_BLEND: f64 = 0.1;

#[derive(Clone)]
pub struct MetricsStore {
    pool: SqlitePool,
}

impl MetricsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a project's metrics, creating the empty record on first use
    pub async fn get_or_create(&self, project_id: Uuid) -> Result<CommunityMetrics> {
        sqlx::query(
            "INSERT INTO community_metrics (project_id) VALUES (?) ON CONFLICT (project_id) DO NOTHING",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(project_id).await
    }

    /// Apply one classified activity, idempotent on `activity_id`.
    ///
    /// The ledger insert and the counter updates run in one transaction:
    /// either the activity is recorded and counted, or nothing changes.
    /// A second call with an already-counted activity id returns current
    /// state untouched.
    pub async fn apply_activity(
        &self,
        project_id: Uuid,
        activity_id: &str,
        classification: &Classification,
    ) -> Result<CommunityMetrics> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO activity_log (activity_id, project_id, category, confidence)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (activity_id) DO NOTHING
            "#,
        )
        .bind(activity_id)
        .bind(project_id.to_string())
        .bind(classification.category.as_str())
        .bind(classification.confidence as i64)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            // Already counted by another trigger; nothing to do
            tx.rollback().await?;
            return self.get_or_create(project_id).await;
        }

        sqlx::query(
            "INSERT INTO community_metrics (project_id) VALUES (?) ON CONFLICT (project_id) DO NOTHING",
        )
        .bind(project_id.to_string())
        .execute(&mut *tx)
        .await?;

        // Papers and ordinary messages are mutually exclusive buckets
        let (message_inc, paper_inc) = match classification.category {
            ActivityCategory::Ordinary => (1i64, 0i64),
            ActivityCategory::Paper => (0, 1),
            ActivityCategory::LowValue => (0, 0),
        };

        sqlx::query(
            r#"
            UPDATE community_metrics
            SET messages_count = messages_count + ?,
                papers_shared = papers_shared + ?,
                quality_score = CAST(ROUND(quality_score * ? + ? * ?) AS INTEGER),
                updated_at = CURRENT_TIMESTAMP
            WHERE project_id = ?
            "#,
        )
        .bind(message_inc)
        .bind(paper_inc)
        .bind(QUALITY_DECAY)
        .bind(classification.quality_contribution as i64)
        .bind(QUALITY_BLEND)
        .bind(project_id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.fetch(project_id).await
    }

    /// Refresh the member count from a live platform read.
    ///
    /// Takes `max(current, live)` so a stale read racing a fresher one
    /// can never regress the stored count.
    pub async fn refresh_member_count(
        &self,
        project_id: Uuid,
        live_count: u64,
    ) -> Result<CommunityMetrics> {
        sqlx::query(
            "INSERT INTO community_metrics (project_id) VALUES (?) ON CONFLICT (project_id) DO NOTHING",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE community_metrics
            SET member_count = MAX(member_count, ?),
                updated_at = CURRENT_TIMESTAMP
            WHERE project_id = ?
            "#,
        )
        .bind(live_count as i64)
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(project_id).await
    }

    /// Compare-and-set the project level.
    ///
    /// Succeeds only if the stored level still equals `expected` at
    /// write time. Returns false when another trigger already advanced
    /// the level; callers treat that as success-without-action.
    pub async fn compare_and_set_level(
        &self,
        project_id: Uuid,
        expected: i64,
        new_level: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET level = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND level = ?
            "#,
        )
        .bind(new_level)
        .bind(project_id.to_string())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record that a level-up notification for (project, level) is being
    /// sent. Returns true only for the first caller; the unique row is
    /// the guard against re-notifying on a re-entrant call.
    pub async fn record_notification(&self, project_id: Uuid, level: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO level_notifications (project_id, level)
            VALUES (?, ?)
            ON CONFLICT (project_id, level) DO NOTHING
            "#,
        )
        .bind(project_id.to_string())
        .bind(level)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Attach a resolved guild to the project's community record
    pub async fn link_guild(
        &self,
        project_id: Uuid,
        guild_id: &str,
        guild_name: &str,
    ) -> Result<CommunityMetrics> {
        sqlx::query(
            "INSERT INTO community_metrics (project_id) VALUES (?) ON CONFLICT (project_id) DO NOTHING",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE community_metrics
            SET guild_id = ?, guild_name = ?, updated_at = CURRENT_TIMESTAMP
            WHERE project_id = ?
            "#,
        )
        .bind(guild_id)
        .bind(guild_name)
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(project_id).await
    }

    /// One-way: mark the community bot as linked
    pub async fn set_bot_linked(&self, project_id: Uuid) -> Result<CommunityMetrics> {
        sqlx::query(
            "INSERT INTO community_metrics (project_id) VALUES (?) ON CONFLICT (project_id) DO NOTHING",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "UPDATE community_metrics SET bot_linked = 1, updated_at = CURRENT_TIMESTAMP WHERE project_id = ?",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(project_id).await
    }

    /// One-way: mark the community as verified
    pub async fn set_verified(&self, project_id: Uuid) -> Result<CommunityMetrics> {
        sqlx::query(
            "UPDATE community_metrics SET verified = 1, updated_at = CURRENT_TIMESTAMP WHERE project_id = ?",
        )
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(project_id).await
    }

    async fn fetch(&self, project_id: Uuid) -> Result<CommunityMetrics> {
        let row = sqlx::query(
            r#"
            SELECT project_id, guild_id, guild_name, member_count, messages_count,
                   papers_shared, quality_score, bot_linked, verified
            FROM community_metrics
            WHERE project_id = ?
            "#,
        )
        .bind(project_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| anyhow!("community metrics missing for project {project_id}"))?;

        let member_count: i64 = row.get("member_count");
        let messages_count: i64 = row.get("messages_count");
        let papers_shared: i64 = row.get("papers_shared");
        let quality_score: i64 = row.get("quality_score");
        let bot_linked: i64 = row.get("bot_linked");
        let verified: i64 = row.get("verified");

        Ok(CommunityMetrics {
            project_id,
            guild_id: row.get("guild_id"),
            guild_name: row.get("guild_name"),
            member_count: member_count.max(0) as u64,
            messages_count: messages_count.max(0) as u64,
            papers_shared: papers_shared.max(0) as u64,
            quality_score: quality_score.clamp(0, 100) as u64,
            bot_linked: bot_linked != 0,
            verified: verified != 0,
        })
    }
}
