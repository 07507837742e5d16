//! Email Assistant Service
//!
//! Caller-facing operations wiring the rate gate, prompt composer, provider
//! registry, resilient invoker, intent pipeline, and history sink together.
//!
//! Fault policy: upstream rate-limiting and decode problems degrade to
//! sentinel text or local fallbacks and are returned as ordinary results;
//! only gate rejection, fatal upstream failures, and invalid input surface
//! as errors. History-write failures are logged and swallowed.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ai::{ProviderRegistry, ResilientInvoker, SharedProvider, create_provider};
use crate::ai::extract::strip_code_fences;
use crate::config::Config;
use crate::history::{HistorySink, NoopHistory};
use crate::intent::IntentResolver;
use crate::prompt;
use crate::rate::RateGate;
use crate::types::{
    EmailIntent, EmailSummary, EmailTone, FollowUpRequest, HistoryEntry, IntentClassification,
    MailError, QualityScore, ReplyRequest, Result, RewriteMode, RewriteRequest,
    ThreadReplyRequest,
};

/// Canned subjects used when the upstream reply cannot be decoded.
const FALLBACK_SUBJECTS: [&str; 3] = ["Re: Your Email", "Follow-up", "Regarding Your Message"];

pub struct EmailAssistant {
    registry: ProviderRegistry,
    invoker: ResilientInvoker,
    intent: IntentResolver,
    gate: RateGate,
    history: Arc<dyn HistorySink>,
}

impl EmailAssistant {
    pub fn new(registry: ProviderRegistry, gate: RateGate) -> Self {
        let invoker = ResilientInvoker::default();
        Self {
            registry,
            intent: IntentResolver::new(invoker.clone()),
            invoker,
            gate,
            history: Arc::new(NoopHistory),
        }
    }

    /// Build the full service from configuration: real providers, gate
    /// limits, and retry settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let providers = config
            .providers
            .iter()
            .map(create_provider)
            .collect::<Result<Vec<SharedProvider>>>()?;
        let registry = ProviderRegistry::new(providers, &config.default_provider)?;

        let gate = RateGate::new(
            Arc::new(crate::rate::MemoryCounterStore::new()),
            config.rate.max_requests,
            Duration::from_secs(config.rate.window_secs),
        );

        let invoker = ResilientInvoker::new(
            config.retry.max_attempts,
            Duration::from_millis(config.retry.base_delay_ms),
        );

        Ok(Self {
            registry,
            intent: IntentResolver::new(invoker.clone()),
            invoker,
            gate,
            history: Arc::new(NoopHistory),
        })
    }

    pub fn with_history(mut self, history: Arc<dyn HistorySink>) -> Self {
        self.history = history;
        self
    }

    pub fn with_invoker(mut self, invoker: ResilientInvoker) -> Self {
        self.intent = IntentResolver::new(invoker.clone());
        self.invoker = invoker;
        self
    }

    // =========================================================================
    // Caller-facing operations
    // =========================================================================

    /// Generate a reply to an inbound email.
    pub async fn generate_reply(&self, client: &str, request: &ReplyRequest) -> Result<String> {
        self.admit(client, "generate").await?;

        let provider = self.registry.resolve(request.provider.as_deref());
        let intent = self.intent.resolve(provider, &request.content).await;

        let composed = prompt::compose(
            &request.content,
            RewriteMode::GenerateReply,
            request.tone,
            request.version,
        );
        let text = self.invoker.generate_text(provider, &composed).await?;

        self.record(&request.content, &text, request.tone, intent.intent)
            .await;
        Ok(text)
    }

    /// Rewrite an email per the mode decision table (or generate a reply
    /// when the mode is GENERATE_REPLY).
    pub async fn rewrite(&self, client: &str, request: &RewriteRequest) -> Result<String> {
        self.admit(client, "rewrite").await?;

        let provider = self.registry.resolve(request.provider.as_deref());
        let composed = prompt::compose(
            &request.content,
            request.mode,
            request.tone,
            request.version,
        );
        let text = self.invoker.generate_text(provider, &composed).await?;

        let intent = self.intent.resolve(provider, &request.content).await;
        self.record(&request.content, &text, request.tone, intent.intent)
            .await;
        Ok(text)
    }

    /// Classify an email's intent. Upstream faults degrade to the local
    /// classifier; the only error here is gate rejection.
    pub async fn classify_intent(
        &self,
        client: &str,
        content: &str,
    ) -> Result<IntentClassification> {
        self.admit(client, "intent").await?;

        let provider = self.registry.default_provider();
        Ok(self.intent.resolve(provider, content).await)
    }

    /// Generate an escalating follow-up for an unanswered email.
    pub async fn follow_up(&self, client: &str, request: &FollowUpRequest) -> Result<String> {
        self.admit(client, "follow_up").await?;

        let provider = self.registry.resolve(request.provider.as_deref());
        let composed = prompt::follow_up(request);
        let text = self.invoker.generate_text(provider, &composed).await?;

        let intent = self.intent.resolve(provider, &request.content).await;
        self.record(
            &request.content,
            &text,
            Some(EmailTone::FollowUp),
            intent.intent,
        )
        .await;
        Ok(text)
    }

    /// Generate a reply considering prior thread messages.
    pub async fn thread_reply(&self, client: &str, request: &ThreadReplyRequest) -> Result<String> {
        self.admit(client, "thread_reply").await?;

        let provider = self.registry.resolve(request.provider.as_deref());
        let composed = prompt::thread_reply(request);
        let text = self.invoker.generate_text(provider, &composed).await?;

        let intent = self.intent.resolve(provider, &request.content).await;
        self.record(&request.content, &text, request.tone, intent.intent)
            .await;
        Ok(text)
    }

    /// Suggest three subject lines. Decode failure yields canned subjects,
    /// never an error.
    pub async fn subject_lines(&self, client: &str, content: &str) -> Result<Vec<String>> {
        self.admit(client, "subjects").await?;

        let provider = self.registry.default_provider();
        let text = self
            .invoker
            .generate_text(provider, &prompt::subject_lines(content))
            .await?;

        let cleaned = strip_code_fences(&text);
        match serde_json::from_str::<Vec<String>>(&cleaned) {
            Ok(subjects) if !subjects.is_empty() => Ok(subjects),
            _ => {
                warn!("Subject-line reply not decodable, using fallback subjects");
                Ok(FALLBACK_SUBJECTS.iter().map(|s| s.to_string()).collect())
            }
        }
    }

    /// Summarize an email into structured form. Decode failure yields a
    /// canned summary, never an error.
    pub async fn summarize(&self, client: &str, content: &str) -> Result<EmailSummary> {
        self.admit(client, "summarize").await?;

        let provider = self.registry.default_provider();
        let text = self
            .invoker
            .generate_text(provider, &prompt::summary(content))
            .await?;

        let cleaned = strip_code_fences(&text);
        match serde_json::from_str::<EmailSummary>(&cleaned) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                warn!(error = %err, "Summary reply not decodable, using fallback");
                Ok(EmailSummary {
                    summary: "Could not summarize email".to_string(),
                    action_items: vec!["Review email manually".to_string()],
                    deadlines: Vec::new(),
                })
            }
        }
    }

    /// Score an email's sentiment, politeness, and professionalism. Decode
    /// failure yields an "error" score, never an error.
    pub async fn score_quality(&self, client: &str, content: &str) -> Result<QualityScore> {
        self.admit(client, "quality").await?;

        let provider = self.registry.default_provider();
        let text = self
            .invoker
            .generate_text(provider, &prompt::quality(content))
            .await?;

        let cleaned = strip_code_fences(&text);
        match serde_json::from_str::<QualityScore>(&cleaned) {
            Ok(score) => Ok(score),
            Err(err) => {
                warn!(error = %err, "Quality reply not decodable, using fallback score");
                Ok(QualityScore {
                    sentiment: "error".to_string(),
                    politeness_score: 0.0,
                    professionalism_score: 0.0,
                })
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn admit(&self, client: &str, endpoint: &str) -> Result<()> {
        if self.gate.admit(client, endpoint).await {
            Ok(())
        } else {
            Err(MailError::RateLimited {
                identifier: client.to_string(),
                endpoint: endpoint.to_string(),
            })
        }
    }

    /// Record a completed generation. Sink failures never reach the caller.
    async fn record(
        &self,
        content: &str,
        response: &str,
        tone: Option<EmailTone>,
        intent: EmailIntent,
    ) {
        let entry = HistoryEntry::new(
            content,
            response,
            tone.unwrap_or(prompt::DEFAULT_TONE),
            intent,
        );
        match self.history.record(entry).await {
            Ok(()) => info!("History recorded"),
            Err(err) => warn!(error = %err, "History record failed, continuing"),
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
    use crate::history::MemoryHistory;
    use crate::rate::MemoryCounterStore;
    use crate::types::UpstreamError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum Script {
        Reply(&'static str),
        RateLimit,
        Fatal,
    }

    struct MockProvider {
        script: Script,
        calls: AtomicU32,
    }

    impl MockProvider {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TextProvider for MockProvider {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Reply(text) => Ok(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                })
                .to_string()),
                Script::RateLimit => {
                    Err(UpstreamError::with_status("MOCK", 429, "Too Many Requests"))
                }
                Script::Fatal => Err(UpstreamError::with_status("MOCK", 500, "boom")),
            }
        }

        fn name(&self) -> &str {
            "GEMINI"
        }
    }

    fn assistant(provider: Arc<MockProvider>) -> (EmailAssistant, Arc<MemoryHistory>) {
        let registry =
            ProviderRegistry::new(vec![provider as SharedProvider], "GEMINI").unwrap();
        let history = Arc::new(MemoryHistory::new());
        let service =
            EmailAssistant::new(registry, RateGate::in_memory()).with_history(history.clone());
        (service, history)
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_reply_returns_text_and_records() {
        let provider = MockProvider::new(Script::Reply("Thanks, noted."));
        let (service, history) = assistant(provider);

        let request = ReplyRequest {
            content: "Just checking in on my application status".to_string(),
            ..Default::default()
        };
        let text = service.generate_reply("1.2.3.4", &request).await.unwrap();

        assert_eq!(text, "Thanks, noted.");
        let entries = history.entries();
        assert_eq!(entries.len(), 1);
        // Local classifier decided before any upstream classification call.
        assert_eq!(entries[0].intent, EmailIntent::FollowUp);
        assert_eq!(entries[0].tone, EmailTone::Professional);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_rejection_is_terminal_error() {
        let provider = MockProvider::new(Script::Reply("ok"));
        let registry =
            ProviderRegistry::new(vec![provider as SharedProvider], "GEMINI").unwrap();
        let gate = RateGate::new(
            Arc::new(MemoryCounterStore::new()),
            1,
            Duration::from_secs(60),
        );
        let service = EmailAssistant::new(registry, gate);

        let request = ReplyRequest {
            content: "hello there".to_string(),
            ..Default::default()
        };
        assert!(service.generate_reply("c", &request).await.is_ok());

        let err = service.generate_reply("c", &request).await.unwrap_err();
        assert!(matches!(err, MailError::RateLimited { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_upstream_yields_sentinel_not_error() {
        let provider = MockProvider::new(Script::RateLimit);
        let (service, _history) = assistant(provider);

        let request = RewriteRequest {
            content: "please shorten this".to_string(),
            mode: RewriteMode::Shorten,
            tone: None,
            version: None,
            provider: None,
        };
        let text = service.rewrite("c", &request).await.unwrap();
        assert_eq!(text, crate::constants::sentinel::RATE_LIMITED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_upstream_propagates() {
        let provider = MockProvider::new(Script::Fatal);
        let (service, history) = assistant(provider);

        let request = ReplyRequest {
            content: "hello".to_string(),
            ..Default::default()
        };
        let err = service.generate_reply("c", &request).await.unwrap_err();
        assert!(matches!(err, MailError::Upstream(_)));
        assert!(history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_classify_intent_never_fails_for_upstream_faults() {
        let provider = MockProvider::new(Script::Fatal);
        let (service, _history) = assistant(provider);

        let result = service
            .classify_intent("c", "quarterly numbers attached")
            .await
            .unwrap();
        assert_eq!(result.intent, EmailIntent::Other);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subject_lines_decodes_json_array() {
        let provider = MockProvider::new(Script::Reply(
            r#"["Quick question", "About the invoice", "Touching base"]"#,
        ));
        let (service, _history) = assistant(provider);

        let subjects = service.subject_lines("c", "invoice query").await.unwrap();
        assert_eq!(subjects.len(), 3);
        assert_eq!(subjects[0], "Quick question");
    }

    #[tokio::test(start_paused = true)]
    async fn test_subject_lines_fallback_on_prose_reply() {
        let provider = MockProvider::new(Script::Reply("Sure! Here are some ideas..."));
        let (service, _history) = assistant(provider);

        let subjects = service.subject_lines("c", "invoice query").await.unwrap();
        assert_eq!(subjects, FALLBACK_SUBJECTS.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarize_fallback_on_undecodable_reply() {
        let provider = MockProvider::new(Script::Reply("not json"));
        let (service, _history) = assistant(provider);

        let summary = service.summarize("c", "long email").await.unwrap();
        assert_eq!(summary.summary, "Could not summarize email");
        assert_eq!(summary.action_items, vec!["Review email manually"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_score_quality_decodes_json_object() {
        let provider = MockProvider::new(Script::Reply(
            r#"{"sentiment": "positive", "politenessScore": 8.5, "professionalismScore": 9.2}"#,
        ));
        let (service, _history) = assistant(provider);

        let score = service.score_quality("c", "thanks so much!").await.unwrap();
        assert_eq!(score.sentiment, "positive");
        assert_eq!(score.politeness_score, 8.5);
        assert_eq!(score.professionalism_score, 9.2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_score_quality_fallback_on_rate_limited_upstream() {
        let provider = MockProvider::new(Script::RateLimit);
        let (service, _history) = assistant(provider);

        let score = service.score_quality("c", "thanks so much!").await.unwrap();
        assert_eq!(score.sentiment, "error");
        assert_eq!(score.politeness_score, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_failure_is_swallowed() {
        struct FailingSink;

        #[async_trait]
        impl HistorySink for FailingSink {
            async fn record(&self, _entry: HistoryEntry) -> Result<()> {
                Err(MailError::History("disk full".to_string()))
            }
        }

        let provider = MockProvider::new(Script::Reply("done"));
        let registry =
            ProviderRegistry::new(vec![provider as SharedProvider], "GEMINI").unwrap();
        let service = EmailAssistant::new(registry, RateGate::in_memory())
            .with_history(Arc::new(FailingSink));

        let request = ReplyRequest {
            content: "hello".to_string(),
            ..Default::default()
        };
        // The generation result survives the sink failure.
        assert_eq!(service.generate_reply("c", &request).await.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_records_follow_up_tone() {
        let provider = MockProvider::new(Script::Reply("Gentle nudge"));
        let (service, history) = assistant(provider);

        let request = FollowUpRequest {
            content: "the proposal from last week".to_string(),
            follow_up_number: 2,
            days_passed: 7,
            provider: None,
        };
        service.follow_up("c", &request).await.unwrap();

        assert_eq!(history.entries()[0].tone, EmailTone::FollowUp);
    }
}
