//! Configuration loading and data folder resolution
//!
//! Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Level gate thresholds, one versioned table applied on every trigger path.
///
/// Values are configuration, not business logic baked into the progression
/// engine. Overridable via the `[thresholds]` section of config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    /// Minimum community members to advance level 2 -> 3
    pub members_for_level3: u64,
    /// Minimum community members to advance level 3 -> 4
    pub members_for_level4: u64,
    /// Minimum shared papers to advance level 3 -> 4
    pub papers_for_level4: u64,
    /// Minimum counted messages to advance level 3 -> 4
    pub messages_for_level4: u64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            members_for_level3: 4,
            members_for_level4: 10,
            papers_for_level4: 25,
            messages_for_level4: 100,
        }
    }
}

/// Chat relay (LLM) collaborator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible completions endpoint
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Model identifier passed through to the completions endpoint
    pub model: Option<String>,
}

/// NFT minting collaborator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Outbound notification settings (level-up announcements)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Discord webhook URL for the announcements channel
    pub discord_webhook_url: Option<String>,
    /// Email relay endpoint (fire-and-forget POST)
    pub email_endpoint: Option<String>,
    pub email_from: Option<String>,
}

/// Twitter (X) API settings for share verification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub bearer_token: Option<String>,
}

/// Social-platform (Discord) API settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub bot_token: Option<String>,
    /// Shared secret the community bot sends in its webhook requests
    pub webhook_secret: Option<String>,
}

/// Portal configuration, loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Data folder holding grove.db (overridable by CLI/env)
    pub data_folder: Option<String>,
    /// Seconds between reconciliation sweeps (0 disables the sweep)
    pub reconcile_interval_secs: Option<u64>,
    pub thresholds: LevelThresholds,
    pub chat: ChatConfig,
    pub mint: MintConfig,
    pub notify: NotifyConfig,
    pub discord: DiscordConfig,
    pub twitter: TwitterConfig,
}

impl PortalConfig {
    /// Load configuration from the platform config file, if present.
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                let config: PortalConfig = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
                tracing::info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(PortalConfig::default()),
        }
    }

    /// Parse configuration from a TOML string (used by tests and tooling)
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// Data folder resolution following the priority order above
pub fn resolve_data_folder(cli_arg: Option<&str>, config: &PortalConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("GROVE_DATA_FOLDER") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(ref path) = config.data_folder {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Locate the platform config file: ~/.config/grove/config.toml first,
/// then /etc/grove/config.toml on Linux.
fn find_config_file() -> Option<PathBuf> {
    if let Some(user_config) = dirs::config_dir().map(|d| d.join("grove").join("config.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/grove/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("grove"))
        .unwrap_or_else(|| PathBuf::from("./grove_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_canonical_table() {
        let t = LevelThresholds::default();
        assert_eq!(t.members_for_level3, 4);
        assert_eq!(t.members_for_level4, 10);
        assert_eq!(t.papers_for_level4, 25);
        assert_eq!(t.messages_for_level4, 100);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config = PortalConfig::from_toml(
            r#"
            reconcile_interval_secs = 120

            [thresholds]
            papers_for_level4 = 5

            [chat]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.reconcile_interval_secs, Some(120));
        assert_eq!(config.thresholds.papers_for_level4, 5);
        // Unspecified threshold values keep their defaults
        assert_eq!(config.thresholds.messages_for_level4, 100);
        assert_eq!(config.chat.model.as_deref(), Some("gpt-4o-mini"));
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn cli_argument_wins_over_config() {
        let config = PortalConfig {
            data_folder: Some("/from/config".to_string()),
            ..Default::default()
        };
        let resolved = resolve_data_folder(Some("/from/cli"), &config);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }
}
