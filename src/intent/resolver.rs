//! Intent Resolution Pipeline
//!
//! Local-first intent detection with an upstream escalation path:
//!
//! 1. run the local keyword classifier; a non-OTHER result returns
//!    immediately with zero upstream calls (cost avoidance)
//! 2. otherwise ask the provider with the JSON-only classification prompt;
//!    a rate-limit sentinel keeps the local result
//! 3. decode the extracted reply; a non-OTHER decoded intent wins
//! 4. decode failure, upstream failure, or an upstream OTHER all fall back
//!    to the local result
//!
//! The pipeline never fails outward: every path terminates in a valid
//! classification, degrading to local-only behavior under upstream faults.

use tracing::{debug, info, warn};

use super::classifier::classify_local;
use crate::ai::extract::strip_code_fences;
use crate::ai::{ResilientInvoker, SharedProvider};
use crate::constants::sentinel;
use crate::prompt;
use crate::types::{EmailIntent, IntentClassification};

#[derive(Debug, Clone, Default)]
pub struct IntentResolver {
    invoker: ResilientInvoker,
}

impl IntentResolver {
    pub fn new(invoker: ResilientInvoker) -> Self {
        Self { invoker }
    }

    /// Resolve the intent of `content`, consulting `provider` only when the
    /// local classifier is inconclusive.
    pub async fn resolve(
        &self,
        provider: &SharedProvider,
        content: &str,
    ) -> IntentClassification {
        let local = classify_local(Some(content));
        if local.intent != EmailIntent::Other {
            info!(intent = ?local.intent, "Local classifier matched");
            return local;
        }

        match self.resolve_upstream(provider, content).await {
            Some(classified) if classified.intent != EmailIntent::Other => {
                info!(intent = ?classified.intent, "Upstream classifier matched");
                classified
            }
            _ => {
                debug!("Falling back to local classification");
                local
            }
        }
    }

    /// Upstream leg of the pipeline. `None` means "use the local fallback";
    /// no error escapes this function.
    async fn resolve_upstream(
        &self,
        provider: &SharedProvider,
        content: &str,
    ) -> Option<IntentClassification> {
        let prompt = prompt::classification(content);

        let text = match self.invoker.generate_text(provider, &prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Upstream classification failed");
                return None;
            }
        };

        if text.contains("Rate limited") || text == sentinel::MAX_RETRIES {
            warn!("Upstream classifier rate limited");
            return None;
        }

        let cleaned = strip_code_fences(&text);
        match serde_json::from_str::<IntentClassification>(&cleaned) {
            Ok(classified) => Some(classified),
            Err(err) => {
                warn!(error = %err, "Failed to decode classification reply");
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TextProvider;
    use crate::types::UpstreamError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        calls: AtomicU32,
        reply: String,
        rate_limited: bool,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Arc<Self> {
            let payload = serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            });
            Arc::new(Self {
                calls: AtomicU32::new(0),
                reply: payload.to_string(),
                rate_limited: false,
            })
        }

        fn throttled() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                reply: String::new(),
                rate_limited: true,
            })
        }
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limited {
                Err(UpstreamError::with_status("MOCK", 429, "Too Many Requests"))
            } else {
                Ok(self.reply.clone())
            }
        }

        fn name(&self) -> &str {
            "MOCK"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_match_skips_upstream_entirely() {
        let provider = ScriptedProvider::replying(r#"{"intent": "COMPLAINT", "reason": "x"}"#);
        let shared: SharedProvider = provider.clone();

        let result = IntentResolver::default()
            .resolve(&shared, "Just checking in on my application status")
            .await;

        assert_eq!(result.intent, EmailIntent::FollowUp);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inconclusive_local_escalates_upstream() {
        let provider = ScriptedProvider::replying(
            "```json\n{\"intent\": \"SALES_INQUIRY\", \"reason\": \"asks about product fit\"}\n```",
        );
        let shared: SharedProvider = provider.clone();

        let result = IntentResolver::default()
            .resolve(&shared, "wondering whether your product fits our team")
            .await;

        assert_eq!(result.intent, EmailIntent::SalesInquiry);
        assert!(provider.calls.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_upstream_keeps_local_result() {
        let provider = ScriptedProvider::throttled();
        let shared: SharedProvider = provider.clone();

        let result = IntentResolver::default()
            .resolve(&shared, "quarterly numbers attached for review")
            .await;

        assert_eq!(result.intent, EmailIntent::Other);
        assert_eq!(
            result.reason,
            "General communication - no specific intent detected"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_reply_falls_back_to_local() {
        let provider = ScriptedProvider::replying("I think this is probably a greeting?");
        let shared: SharedProvider = provider.clone();

        let result = IntentResolver::default()
            .resolve(&shared, "quarterly numbers attached for review")
            .await;

        assert_eq!(result.intent, EmailIntent::Other);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_other_keeps_local_reason() {
        let provider =
            ScriptedProvider::replying(r#"{"intent": "OTHER", "reason": "upstream shrug"}"#);
        let shared: SharedProvider = provider.clone();

        let result = IntentResolver::default()
            .resolve(&shared, "quarterly numbers attached for review")
            .await;

        assert_eq!(result.intent, EmailIntent::Other);
        assert_eq!(
            result.reason,
            "General communication - no specific intent detected"
        );
    }
}
