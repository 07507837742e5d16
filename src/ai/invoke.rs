//! Resilient Upstream Invocation
//!
//! Issues a provider call with bounded retry against rate-limiting. The
//! contract:
//!
//! - up to `max_attempts` calls; before attempt n > 1 an escalating delay
//!   of (n - 1) x base unit sheds load against the throttled upstream
//! - a rate-limit signal (429 or marker text) retries while attempts
//!   remain; on exhaustion the RATE_LIMITED sentinel is returned as a
//!   normal text result so callers can render it without crashing
//! - any other failure is fatal for this call and propagates immediately
//!
//! Delays use the async timer, so a waiting call parks its task instead of
//! pinning a worker thread. There is no cancellation beyond the provider's
//! per-attempt network timeout.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::extract::extract_text;
use super::provider::SharedProvider;
use crate::constants::{retry, sentinel};
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for ResilientInvoker {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
        }
    }
}

impl ResilientInvoker {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Execute one logical generation call and return the raw payload.
    pub async fn invoke(&self, provider: &SharedProvider, prompt: &str) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.base_delay * (attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                sleep(delay).await;
            }

            match provider.generate(prompt).await {
                Ok(raw) => return Ok(raw),
                Err(err) if err.is_rate_limited() => {
                    warn!(
                        provider = %provider.name(),
                        attempt,
                        max_attempts = self.max_attempts,
                        "Upstream rate limited"
                    );
                    if attempt == self.max_attempts {
                        return Ok(sentinel::RATE_LIMITED.to_string());
                    }
                }
                Err(err) => {
                    warn!(provider = %provider.name(), error = %err, "Upstream call failed");
                    return Err(err.into());
                }
            }
        }

        // Unreachable with max_attempts >= 1; kept as a terminal soft result.
        Ok(sentinel::MAX_RETRIES.to_string())
    }

    /// Invoke and normalize: raw payload through the extractor.
    pub async fn generate_text(&self, provider: &SharedProvider, prompt: &str) -> Result<String> {
        let raw = self.invoke(provider, prompt).await?;
        Ok(extract_text(&raw))
    }
}

// =============================================================================
// Tests
// =============================================================================
