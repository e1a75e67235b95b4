//! Activity units and classification results
//!
//! An activity unit is one piece of community content (message plus
//! optional attachments) considered for classification. It is ephemeral:
//! only the classification outcome lands in the activity_log ledger.

use serde::{Deserialize, Serialize};

/// One piece of community content to classify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityUnit {
    /// Stable per-platform message identifier, used for de-duplication
    pub id: String,
    /// Raw message text
    #[serde(default)]
    pub text: String,
    /// Attachment descriptors as declared by the platform
    #[serde(default)]
    pub attachments: Vec<AttachmentInfo>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// Declared attachment metadata (never trusted beyond name/type/size)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Classification category for an activity unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    /// Trivial chatter, excluded from all counts
    LowValue,
    /// A contributing community message
    Ordinary,
    /// A shared research paper
    Paper,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::LowValue => "low_value",
            ActivityCategory::Ordinary => "ordinary",
            ActivityCategory::Paper => "paper",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low_value" => Some(ActivityCategory::LowValue),
            "ordinary" => Some(ActivityCategory::Ordinary),
            "paper" => Some(ActivityCategory::Paper),
            _ => None,
        }
    }
}

/// Result of classifying one activity unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: ActivityCategory,
    /// Detection confidence, 0-100
    pub confidence: u8,
    /// Contribution toward the running quality score, 0-100
    pub quality_contribution: u8,
}

impl Classification {
    pub fn low_value() -> Self {
        Self {
            category: ActivityCategory::LowValue,
            confidence: 100,
            quality_contribution: 0,
        }
    }

    pub fn paper(confidence: u8) -> Self {
        Self {
            category: ActivityCategory::Paper,
            confidence,
            quality_contribution: crate::progression::PAPER_QUALITY_CONTRIBUTION,
        }
    }

    pub fn ordinary(quality_contribution: u8) -> Self {
        Self {
            category: ActivityCategory::Ordinary,
            confidence: 100,
            quality_contribution,
        }
    }
}

/// Outcome of one progression trigger
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TriggerOutcome {
    /// True only for the caller that won the level transition
    pub advanced: bool,
    pub from_level: i64,
    pub to_level: i64,
}

impl TriggerOutcome {
    pub fn unchanged(level: i64) -> Self {
        Self {
            advanced: false,
            from_level: level,
            to_level: level,
        }
    }
}
