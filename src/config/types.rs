//! Configuration Types
//!
//! All configuration structures with sensible defaults. Validation runs at
//! startup so a bad default provider or zero-width rate window never
//! reaches the service.

use serde::{Deserialize, Serialize};

use crate::ai::ProviderConfig;
use crate::constants::{rate, retry};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logical name of the provider used when a request names none
    pub default_provider: String,

    /// Upstream backends to register at startup
    pub providers: Vec<ProviderConfig>,

    /// Fixed-window rate gate settings
    pub rate: RateConfig,

    /// Resilient invoker settings
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: "GEMINI".to_string(),
            providers: vec![ProviderConfig::default()],
            rate: RateConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `MailError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.providers.is_empty() {
            return Err(crate::types::MailError::Config(
                "At least one provider must be configured".to_string(),
            ));
        }

        let default = self.default_provider.to_uppercase();
        let known = self
            .providers
            .iter()
            .any(|p| p.kind.to_uppercase() == default);
        if !known {
            return Err(crate::types::MailError::Config(format!(
                "default_provider '{}' does not match any configured provider",
                self.default_provider
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::types::MailError::Config(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.rate.max_requests == 0 || self.rate.window_secs == 0 {
            return Err(crate::types::MailError::Config(
                "rate.max_requests and rate.window_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Rate Gate Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Requests admitted per identifier/endpoint per window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            max_requests: rate::DEFAULT_MAX_REQUESTS,
            window_secs: rate::DEFAULT_WINDOW_SECS,
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempt budget against a rate-limited upstream
    pub max_attempts: u32,

    /// Escalating delay unit in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay_ms: retry::BASE_DELAY_MS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_default_provider_rejected() {
        let config = Config {
            default_provider: "CLAUDE".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = Config {
            rate: RateConfig {
                max_requests: 10,
                window_secs: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_provider_match_is_case_insensitive() {
        let config = Config {
            default_provider: "gemini".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
