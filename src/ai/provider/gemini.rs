//! Gemini API Provider
//!
//! Default text-generation backend using Gemini's generateContent API.
//! Returns the raw response payload; success/error envelope handling lives
//! in `crate::ai::extract`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::{ProviderConfig, TextProvider};
use crate::constants::generation;
use crate::types::{MailError, Result, UpstreamError};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub const PROVIDER_NAME: &str = "GEMINI";

/// Gemini provider with secure API key handling.
pub struct GeminiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                MailError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY env var or provide in config"
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

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: generation::TEMPERATURE,
                top_k: generation::TOP_K,
                top_p: generation::TOP_P,
                max_output_tokens: generation::MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, UpstreamError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base,
            self.model,
            self.api_key.expose_secret()
        );

        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                UpstreamError::new(PROVIDER_NAME, format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            UpstreamError::new(PROVIDER_NAME, format!("Failed to read Gemini response: {}", e))
        })?;

        if !status.is_success() {
            return Err(UpstreamError::with_status(
                PROVIDER_NAME,
                status.as_u16(),
                format!("Gemini API error: {}", body),
            ));
        }

        Ok(body)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request types (Gemini wire format)

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}
