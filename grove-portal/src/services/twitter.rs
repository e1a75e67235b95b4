//! Social share verification
//!
//! Checks that a project's announcement post exists on the social
//! platform and mentions the project. Outcomes mirror the Discord
//! client: data or a typed `Unavailable`, never an aborting error.

use crate::services::discord::LookupOutcome;
use serde::Deserialize;
use std::time::Duration;

const TWITTER_API_BASE: &str = "https://api.twitter.com/2";

#[derive(Deserialize)]
struct TweetResponse {
    data: Option<TweetData>,
}

#[derive(Deserialize)]
struct TweetData {
    text: String,
}

/// Twitter (X) API client
pub struct TwitterClient {
    http_client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl TwitterClient {
    pub fn new(bearer_token: Option<String>) -> Self {
        Self::with_base_url(bearer_token, TWITTER_API_BASE.to_string())
    }

    pub fn with_base_url(bearer_token: Option<String>, base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            base_url,
            bearer_token,
        }
    }

    /// Verify that the post behind `post_url` exists and mentions the
    /// project name. Returns the mention check as an opaque boolean.
    pub async fn verify_share(&self, post_url: &str, project_name: &str) -> LookupOutcome<bool> {
        let token = match &self.bearer_token {
            Some(token) if !token.is_empty() => token.clone(),
            _ => {
                return LookupOutcome::Unavailable {
                    reason: "no bearer token configured".to_string(),
                }
            }
        };

        let post_id = match extract_post_id(post_url) {
            Some(id) => id,
            None => {
                return LookupOutcome::Unavailable {
                    reason: format!("unrecognized post URL: {post_url}"),
                }
            }
        };

        let url = format!("{}/tweets/{}", self.base_url, post_id);
        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return LookupOutcome::Unavailable {
                    reason: format!("network error: {e}"),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return LookupOutcome::Unavailable {
                reason: format!("tweet lookup returned {status}"),
            };
        }

        match response.json::<TweetResponse>().await {
            Ok(TweetResponse { data: Some(tweet) }) => {
                let mentions = tweet
                    .text
                    .to_lowercase()
                    .contains(&project_name.to_lowercase());
                LookupOutcome::Found(mentions)
            }
            Ok(_) => LookupOutcome::Unavailable {
                reason: "post not found".to_string(),
            },
            Err(e) => LookupOutcome::Unavailable {
                reason: format!("unparseable tweet response: {e}"),
            },
        }
    }
}

/// Pull the numeric status id out of a post URL
fn extract_post_id(url: &str) -> Option<&str> {
    let tail = url.split("/status/").nth(1)?;
    let id = tail.split(['?', '/']).next()?;
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_status_id_from_url_shapes() {
        assert_eq!(
            extract_post_id("https://x.com/grove/status/1780000000000000000"),
            Some("1780000000000000000")
        );
        assert_eq!(
            extract_post_id("https://twitter.com/grove/status/42?s=20"),
            Some("42")
        );
        assert_eq!(extract_post_id("https://x.com/grove"), None);
        assert_eq!(extract_post_id("https://x.com/grove/status/not-an-id"), None);
    }

    #[tokio::test]
    async fn missing_token_is_unavailable() {
        let client = TwitterClient::new(None);
        let outcome = client
            .verify_share("https://x.com/grove/status/42", "Grove")
            .await;
        assert!(matches!(outcome, LookupOutcome::Unavailable { .. }));
    }
}
