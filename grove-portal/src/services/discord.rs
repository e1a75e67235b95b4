//! Discord API client
//!
//! Resolves invite codes to guild metadata and reads live member
//! counts. Lookups never abort the caller: every failure mode (missing
//! token, network error, non-success status, timeout) surfaces as the
//! typed `Unavailable` outcome and the progression engine proceeds with
//! previously known values.

use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = "GrovePortal/0.1.0 (https://github.com/grove/grove)";
/// Requests per second against the Discord REST API
const RATE_LIMIT_PER_SEC: u32 = 5;

/// Outcome of a platform lookup: either data, or a typed "no new
/// information" result that callers must not escalate
#[derive(Debug, Clone)]
pub enum LookupOutcome<T> {
    Found(T),
    Unavailable { reason: String },
}

impl<T> LookupOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            LookupOutcome::Found(value) => Some(value),
            LookupOutcome::Unavailable { .. } => None,
        }
    }
}

/// Resolved guild metadata
#[derive(Debug, Clone, Deserialize)]
pub struct GuildInfo {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub approximate_member_count: Option<u64>,
}

#[derive(Deserialize)]
struct InviteResponse {
    guild: Option<GuildInfo>,
    approximate_member_count: Option<u64>,
}

#[derive(Deserialize)]
struct GuildPreviewResponse {
    approximate_member_count: Option<u64>,
}

/// Discord REST client
pub struct DiscordClient {
    http_client: reqwest::Client,
    base_url: String,
    bot_token: Option<String>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl DiscordClient {
    pub fn new(bot_token: Option<String>) -> Self {
        Self::with_base_url(bot_token, DISCORD_API_BASE.to_string())
    }

    /// Client against an alternate base URL (tests point this at a stub)
    pub fn with_base_url(bot_token: Option<String>, base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SEC).expect("rate limit is non-zero"),
        ));

        Self {
            http_client,
            base_url,
            bot_token,
            rate_limiter,
        }
    }

    /// Resolve an invite code to guild metadata
    pub async fn resolve_invite(&self, invite_code: &str) -> LookupOutcome<GuildInfo> {
        self.rate_limiter.until_ready().await;

        let code = invite_code
            .rsplit('/')
            .next()
            .unwrap_or(invite_code)
            .trim();
        if code.is_empty() {
            return LookupOutcome::Unavailable {
                reason: "empty invite code".to_string(),
            };
        }

        let url = format!("{}/invites/{}?with_counts=true", self.base_url, code);
        tracing::debug!(invite = %code, "Resolving Discord invite");

        let response = match self.http_client.get(&url).send().await {
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
                reason: format!("invite lookup returned {status}"),
            };
        }

        let invite: InviteResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return LookupOutcome::Unavailable {
                    reason: format!("unparseable invite response: {e}"),
                }
            }
        };

        match invite.guild {
            Some(mut guild) => {
                // Member count lives on the invite envelope, not the guild object
                if guild.approximate_member_count.is_none() {
                    guild.approximate_member_count = invite.approximate_member_count;
                }
                tracing::info!(guild_id = %guild.id, guild_name = %guild.name, "Resolved invite");
                LookupOutcome::Found(guild)
            }
            None => LookupOutcome::Unavailable {
                reason: "invite has no guild (group DM invite)".to_string(),
            },
        }
    }

    /// Live approximate member count for a guild (requires a bot token)
    pub async fn member_count(&self, guild_id: &str) -> LookupOutcome<u64> {
        let token = match &self.bot_token {
            Some(token) if !token.is_empty() => token.clone(),
            _ => {
                return LookupOutcome::Unavailable {
                    reason: "no bot token configured".to_string(),
                }
            }
        };

        self.rate_limiter.until_ready().await;

        let url = format!("{}/guilds/{}/preview", self.base_url, guild_id);
        let response = match self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bot {token}"))
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
                reason: format!("guild preview returned {status}"),
            };
        }

        match response.json::<GuildPreviewResponse>().await {
            Ok(GuildPreviewResponse {
                approximate_member_count: Some(count),
            }) => LookupOutcome::Found(count),
            Ok(_) => LookupOutcome::Unavailable {
                reason: "preview carried no member count".to_string(),
            },
            Err(e) => LookupOutcome::Unavailable {
                reason: format!("unparseable preview response: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unavailable_not_error() {
        let client = DiscordClient::new(None);
        match client.member_count("123456").await {
            LookupOutcome::Unavailable { reason } => {
                assert!(reason.contains("no bot token"));
            }
            LookupOutcome::Found(_) => panic!("lookup cannot succeed without a token"),
        }
    }

    #[tokio::test]
    async fn empty_invite_code_is_unavailable() {
        let client = DiscordClient::new(None);
        assert!(client.resolve_invite("  ").await.found().is_none());
    }
}
