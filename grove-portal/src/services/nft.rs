//! NFT minting client
//!
//! Thin wrapper over the minting service: recipient address and asset
//! kind in, transaction identifier out. Idempotency per (project, kind)
//! is enforced at the database layer, not here.

use crate::models::AssetKind;
use grove_common::config::MintConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Minting service error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Serialize)]
struct MintRequest<'a> {
    recipient: &'a str,
    asset_kind: &'a str,
}

#[derive(Deserialize)]
struct MintResponse {
    tx_id: String,
}

/// Minting service client
pub struct MintClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MintClient {
    /// Build from configuration; None when minting is not configured
    pub fn from_config(config: &MintConfig) -> Option<Self> {
        let base_url = config.base_url.clone()?;
        let api_key = config.api_key.clone()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Some(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Mint one onboarding asset to the recipient wallet
    pub async fn mint(&self, recipient: &str, kind: AssetKind) -> Result<String, MintError> {
        let url = format!("{}/mint", self.base_url);
        tracing::debug!(recipient = %recipient, kind = %kind.as_str(), "Requesting mint");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&MintRequest {
                recipient,
                asset_kind: kind.as_str(),
            })
            .send()
            .await
            .map_err(|e| MintError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::Api(status.as_u16(), body));
        }

        let minted: MintResponse = response
            .json()
            .await
            .map_err(|e| MintError::Parse(e.to_string()))?;

        tracing::info!(recipient = %recipient, kind = %kind.as_str(), tx_id = %minted.tx_id, "Asset minted");

        Ok(minted.tx_id)
    }
}
