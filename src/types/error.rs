//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//!
//! ## Error Taxonomy
//!
//! - **RateLimited**: the fixed-window gate rejected the request (terminal
//!   for this call; the caller retries later, we never queue)
//! - **Upstream**: a non-rate-limit provider failure (4xx/5xx, network,
//!   timeout); fails fast, no retry
//! - **InvalidMode**: unrecognized rewrite mode, a client contract violation
//! - **Config**: bad or missing configuration, caught at startup
//!
//! Upstream rate-limiting never surfaces here: the invoker absorbs it and
//! degrades to sentinel text after retries are exhausted.

use thiserror::Error;

// =============================================================================
// Upstream Error
// =============================================================================

/// Failure reported by a text-generation provider call.
///
/// Carries the HTTP status when one was observed so the invoker can tell
/// "too many requests" apart from fatal failures without string matching.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    /// HTTP status, if the failure came from a completed HTTP exchange
    pub status: Option<u16>,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: String,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}:{}] {}", self.provider, status, self.message),
            None => write!(f, "[{}] {}", self.provider, self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl UpstreamError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            provider: provider.into(),
        }
    }

    pub fn with_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            provider: provider.into(),
        }
    }

    /// Whether this failure is the upstream telling us to slow down.
    ///
    /// Status 429 is authoritative; the message patterns cover providers
    /// that tunnel the condition through an error body.
    pub fn is_rate_limited(&self) -> bool {
        if self.status == Some(429) {
            return true;
        }
        let lower = self.message.to_lowercase();
        lower.contains("429") || lower.contains("too many requests")
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum MailError {
    /// Request rejected by the fixed-window rate gate
    #[error("rate limit exceeded for '{identifier}' on '{endpoint}'")]
    RateLimited { identifier: String, endpoint: String },

    /// Non-rate-limit provider failure (fatal for this call)
    #[error("provider call failed: {0}")]
    Upstream(UpstreamError),

    /// Unrecognized rewrite mode value from the client
    #[error("unknown rewrite mode: '{0}'")]
    InvalidMode(String),

    /// Unrecognized tone value from the client
    #[error("unknown tone: '{0}'")]
    InvalidTone(String),

    /// Unrecognized prompt version value from the client
    #[error("unknown prompt version: '{0}'")]
    InvalidVersion(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("history sink error: {0}")]
    History(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UpstreamError> for MailError {
    fn from(err: UpstreamError) -> Self {
        MailError::Upstream(err)
    }
}

pub type Result<T> = std::result::Result<T, MailError>;

// =============================================================================
// Tests
// =============================================================================
