//! Level-up notifications
//!
//! Posts the announcement to the community Discord channel and relays
//! an email to the project contact. Both sends are fire-and-forget:
//! failures are logged and swallowed, a notification must never block
//! or fail a level transition. Exactly-once delivery is the
//! coordinator's job (CAS + notification ledger), not this module's.

use grove_common::config::NotifyConfig;
use serde_json::json;
use std::time::Duration;

/// Outbound announcement sender
pub struct Notifier {
    http_client: reqwest::Client,
    discord_webhook_url: Option<String>,
    email_endpoint: Option<String>,
    email_from: Option<String>,
}

impl Notifier {
    pub fn from_config(config: &NotifyConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            discord_webhook_url: config.discord_webhook_url.clone(),
            email_endpoint: config.email_endpoint.clone(),
            email_from: config.email_from.clone(),
        }
    }

    /// Announce a level transition on every configured channel
    pub async fn announce_level_up(
        &self,
        project_name: &str,
        contact_email: Option<&str>,
        new_level: i64,
        requirements_met: &str,
    ) {
        let message = format!(
            "🎉 **{project_name}** advanced to level {new_level}! The community {requirements_met}."
        );

        if let Some(url) = &self.discord_webhook_url {
            let body = json!({ "content": message });
            if let Err(e) = self.http_client.post(url).json(&body).send().await {
                tracing::warn!(project = %project_name, "Discord announcement failed: {e}");
            }
        }

        if let (Some(endpoint), Some(to)) = (&self.email_endpoint, contact_email) {
            let body = json!({
                "from": self.email_from.as_deref().unwrap_or("portal@grove.dev"),
                "to": to,
                "subject": format!("{project_name} reached level {new_level}"),
                "text": message,
            });
            if let Err(e) = self.http_client.post(endpoint).json(&body).send().await {
                tracing::warn!(project = %project_name, "Email relay failed: {e}");
            }
        }
    }
}
