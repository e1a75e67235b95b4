//! Community metrics records
//!
//! One row per project, created lazily when a community is first linked.
//! Counters never decrease except via administrative reset; each distinct
//! activity contributes to messages_count / papers_shared at most once
//! (enforced by the activity_log ledger, not by this struct).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-project community engagement metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMetrics {
    pub project_id: Uuid,
    /// Linked Discord guild, if any
    pub guild_id: Option<String>,
    pub guild_name: Option<String>,
    /// Refreshed from the platform, never incremented locally
    pub member_count: u64,
    /// Incremented once per non-low-value, non-paper activity
    pub messages_count: u64,
    /// Incremented once per paper-classified activity
    pub papers_shared: u64,
    /// Exponentially-weighted running average, 0-100
    pub quality_score: u64,
    /// Set once when the community bot completes its handshake
    pub bot_linked: bool,
    pub verified: bool,
}

impl CommunityMetrics {
    /// Fresh metrics for a project with no recorded community activity
    pub fn empty(project_id: Uuid) -> Self {
        Self {
            project_id,
            guild_id: None,
            guild_name: None,
            member_count: 0,
            messages_count: 0,
            papers_shared: 0,
            quality_score: 0,
            bot_linked: false,
            verified: false,
        }
    }
}
