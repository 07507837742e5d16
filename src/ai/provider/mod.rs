//! Text-Generation Provider Abstraction
//!
//! Defines the `TextProvider` trait for interchangeable upstream backends.
//! Providers are stateless, registered once at startup, and immutable
//! afterwards. A provider call returns the RAW payload text from the
//! upstream; normalization into plain text is the extractor's job
//! (`crate::ai::extract`), so one extractor serves every backend.
//!
//! ## Modules
//!
//! - `gemini`: Gemini generateContent backend (the default provider)
//! - `openai`: Chat Completions backend, re-shaped into the common envelope
//! - `registry`: immutable name -> provider lookup with a validated default

mod gemini;
mod openai;
mod registry;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{MailError, Result, UpstreamError};

/// Shared provider handle used across concurrent callers.
pub type SharedProvider = Arc<dyn TextProvider + Send + Sync>;

/// A backend capable of producing generated text from a prompt.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Issue one generation call and return the raw payload text.
    ///
    /// Implementations must not retry internally; retry policy lives in
    /// `ResilientInvoker`. A completed HTTP exchange with an error status
    /// becomes an `UpstreamError` carrying that status.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, UpstreamError>;

    /// Provider name for registry lookup and logging. Case-insensitive
    /// matching is the registry's concern; implementations return their
    /// canonical uppercase name.
    fn name(&self) -> &str;
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for one upstream backend.
///
/// API keys are never serialized back out and are redacted in debug output.
/// Each provider converts the key to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider kind: "gemini" or "openai"
    pub kind: String,
    /// Model name (provider-specific default when absent)
    pub model: Option<String>,
    /// API key; falls back to the provider's env var
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL override (for proxies and test servers)
    pub api_base: Option<String>,
    /// Per-request network timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "gemini".to_string(),
            model: None,
            api_key: None,
            api_base: None,
            timeout_secs: crate::constants::generation::REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Create a shared provider from configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.kind.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        other => Err(MailError::Config(format!(
            "Unknown provider kind: {}. Supported: gemini, openai",
            other
        ))),
    }
}
