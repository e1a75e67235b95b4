//! Project records
//!
//! A project is the onboarding subject: it owns a wallet, progresses
//! through levels, and (optionally) links a Discord community. The level
//! field is only ever mutated through the progression coordinator's
//! compare-and-set, never directly by a handler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Onboarding project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Owning wallet address (opaque to the progression engine)
    pub wallet_address: String,
    /// Current level, starts at 1, monotonically non-decreasing
    pub level: i64,
    pub description: Option<String>,
    /// Where level-up announcements are mailed, if provided
    pub contact_email: Option<String>,
    /// Whether the project announced itself on the social platform
    pub social_shared: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    pub fn new(
        name: String,
        wallet_address: String,
        description: Option<String>,
        contact_email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            wallet_address,
            level: 1,
            description,
            contact_email,
            social_shared: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Onboarding asset kinds minted during level 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// The project's founding idea NFT
    Idea,
    /// The project's vision statement NFT
    Vision,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Idea => "idea",
            AssetKind::Vision => "vision",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(AssetKind::Idea),
            "vision" => Some(AssetKind::Vision),
            _ => None,
        }
    }
}

/// A minted onboarding asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintedAsset {
    pub project_id: Uuid,
    pub kind: AssetKind,
    /// Transaction identifier returned by the minting service
    pub tx_id: String,
    pub minted_at: String,
}
