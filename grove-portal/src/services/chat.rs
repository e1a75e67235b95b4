//! Chat relay client
//!
//! Assembles the onboarding assistant prompt and forwards it, with a
//! bounded history window, to an OpenAI-compatible chat-completions
//! endpoint. The model is a black box: prompt and history in, text out.

use crate::models::{CommunityMetrics, Project};
use grove_common::config::ChatConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Most recent turns forwarded with each completion request
pub const HISTORY_WINDOW: usize = 20;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Completion response contained no choices")]
    EmptyResponse,
}

/// One prior turn of the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible completions client
pub struct ChatClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Build from configuration; None when the relay is not configured
    pub fn from_config(config: &ChatConfig) -> Option<Self> {
        let base_url = config.base_url.clone()?;
        let api_key = config.api_key.clone()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Some(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Assemble the assistant's system prompt from project context
    pub fn build_system_prompt(project: &Project, metrics: Option<&CommunityMetrics>) -> String {
        let mut prompt = format!(
            "You are the onboarding guide for \"{}\", a community project at level {}. \
             Help the team grow their community and progress through onboarding. \
             Be concrete and encouraging; keep answers short.",
            project.name, project.level
        );

        if let Some(description) = &project.description {
            prompt.push_str("\nProject description: ");
            prompt.push_str(description);
        }

        if let Some(metrics) = metrics {
            prompt.push_str(&format!(
                "\nCommunity status: {} members, {} counted messages, {} shared papers.",
                metrics.member_count, metrics.messages_count, metrics.papers_shared
            ));
            if let Some(name) = &metrics.guild_name {
                prompt.push_str(&format!(" Linked Discord server: {name}."));
            }
        }

        prompt
    }

    /// Relay one user message through the model
    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage {
            role: "system",
            content: system_prompt,
        });

        // Bounded window: drop the oldest turns, never the system prompt
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &history[start..] {
            messages.push(WireMessage {
                role: &turn.role,
                content: &turn.content,
            });
        }

        messages.push(WireMessage {
            role: "user",
            content: user_message,
        });

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(status.as_u16(), body));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn unconfigured_relay_yields_no_client() {
        assert!(ChatClient::from_config(&ChatConfig::default()).is_none());
    }

    #[test]
    fn system_prompt_carries_project_and_community_context() {
        let mut project = Project::new(
            "Coral Atlas".to_string(),
            "0xabc".to_string(),
            Some("Mapping reef health with open data".to_string()),
            None,
        );
        project.level = 3;

        let mut metrics = CommunityMetrics::empty(Uuid::new_v4());
        metrics.member_count = 12;
        metrics.papers_shared = 3;
        metrics.guild_name = Some("coral-atlas".to_string());

        let prompt = ChatClient::build_system_prompt(&project, Some(&metrics));
        assert!(prompt.contains("Coral Atlas"));
        assert!(prompt.contains("level 3"));
        assert!(prompt.contains("12 members"));
        assert!(prompt.contains("3 shared papers"));
        assert!(prompt.contains("coral-atlas"));
    }
}
