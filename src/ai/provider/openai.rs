//! OpenAI API Provider
//!
//! Alternate backend using the Chat Completions API. The chat response is
//! re-shaped into the common success envelope (candidates/parts) before it
//! is returned, so the shared extractor normalizes both backends the same
//! way.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{ProviderConfig, TextProvider};
use crate::constants::generation;
use crate::types::{MailError, Result, UpstreamError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const PROVIDER_NAME: &str = "OPENAI";

/// OpenAI provider with secure API key handling.
pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                MailError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: generation::TEMPERATURE,
            top_p: generation::TOP_P,
            max_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }

    /// Convert a chat response into the common candidates/parts envelope.
    fn to_common_envelope(response: ChatCompletionResponse) -> String {
        let candidates: Vec<serde_json::Value> = response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .map(|text| json!({"content": {"parts": [{"text": text}]}}))
            .collect();

        json!({"candidates": candidates}).to_string()
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, UpstreamError> {
        let url = format!("{}/chat/completions", self.api_base);

        debug!(model = %self.model, "Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                UpstreamError::new(PROVIDER_NAME, format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::with_status(
                PROVIDER_NAME,
                status.as_u16(),
                format!("OpenAI API error: {}", body),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            UpstreamError::new(PROVIDER_NAME, format!("Failed to parse OpenAI response: {}", e))
        })?;

        Ok(Self::to_common_envelope(parsed))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::extract::extract_text;

    #[test]
    fn test_envelope_reshaping_feeds_extractor() {
        let chat = ChatCompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some("Dear team, thanks.".to_string()),
                },
            }],
        };
        let raw = OpenAiProvider::to_common_envelope(chat);
        assert_eq!(extract_text(&raw), "Dear team, thanks.");
    }

    #[test]
    fn test_empty_choices_become_empty_candidates() {
        let chat = ChatCompletionResponse { choices: vec![] };
        let raw = OpenAiProvider::to_common_envelope(chat);
        assert_eq!(extract_text(&raw), crate::constants::sentinel::NO_RESPONSE);
    }
}
