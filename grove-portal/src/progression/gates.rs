//! Level gate evaluation
//!
//! Pure mapping from (current level, metrics, external flags) to an
//! advancement decision. Threshold values come from the single
//! configuration table; nothing numeric is baked in here.

use crate::models::CommunityMetrics;
use grove_common::config::LevelThresholds;

/// Levels at or above this are terminal for the automatic engine;
/// anything further is driven by external collaborators
pub const MAX_AUTO_LEVEL: i64 = 4;

/// Boolean facts supplied by external collaborators, opaque to the gate
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalFlags {
    pub idea_asset_minted: bool,
    pub vision_asset_minted: bool,
    pub bot_linked: bool,
}

/// Whether a project at `level` currently satisfies the gate to `level + 1`
pub fn can_advance(
    level: i64,
    metrics: &CommunityMetrics,
    flags: &ExternalFlags,
    thresholds: &LevelThresholds,
) -> bool {
    match level {
        1 => flags.idea_asset_minted && flags.vision_asset_minted,
        2 => flags.bot_linked && metrics.member_count >= thresholds.members_for_level3,
        3 => {
            metrics.member_count >= thresholds.members_for_level4
                && metrics.papers_shared >= thresholds.papers_for_level4
                && metrics.messages_count >= thresholds.messages_for_level4
        }
        _ => false,
    }
}

/// Human-readable requirement summary for the gate into `target_level`,
/// used in level-up announcements
pub fn requirement_text(target_level: i64, thresholds: &LevelThresholds) -> String {
    match target_level {
        2 => "minted both onboarding assets (idea and vision)".to_string(),
        3 => format!(
            "linked the community bot and reached {} members",
            thresholds.members_for_level3
        ),
        4 => format!(
            "reached {} members, {} shared papers, and {} community messages",
            thresholds.members_for_level4,
            thresholds.papers_for_level4,
            thresholds.messages_for_level4
        ),
        _ => "completed all onboarding requirements".to_string(),
    }
}
