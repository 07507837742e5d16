//! Mailsmith - AI Email Assistant Core
//!
//! Turns a raw user request into a reliable, classified, provider-agnostic
//! call to an external generative-text API.
//!
//! ## Core Features
//!
//! - **Provider Registry**: interchangeable backends behind one trait,
//!   immutable name lookup with a validated default
//! - **Resilient Invocation**: bounded retry with escalating delay against
//!   rate-limited upstreams, sentinel text instead of crashes
//! - **Response Normalization**: success/error/sentinel payload shapes
//!   collapse into plain text via one idempotent extractor
//! - **Local-First Intent**: keyword classifier answers before any
//!   upstream call; the pipeline degrades gracefully to local-only
//! - **Fixed-Window Rate Gate**: atomic increment-with-TTL counters per
//!   identifier and endpoint
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsmith::{Config, EmailAssistant, ReplyRequest};
//!
//! let config = Config::default();
//! let assistant = EmailAssistant::from_config(&config)?;
//! let reply = assistant
//!     .generate_reply("203.0.113.7", &ReplyRequest {
//!         content: "Can we reschedule tomorrow's call?".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction, resilient invoker, response extraction
//! - [`intent`]: local keyword classifier and the resolution pipeline
//! - [`prompt`]: pure prompt composition (mode x version decision table)
//! - [`rate`]: fixed-window gate and counter store
//! - [`service`]: caller-facing operations
//! - [`history`]: fire-and-forget generation record sink

pub mod ai;
pub mod config;
pub mod constants;
pub mod history;
pub mod intent;
pub mod prompt;
pub mod rate;
pub mod service;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, RateConfig, RetryConfig};

// Error Types
pub use types::error::{MailError, Result, UpstreamError};

// Domain Types
pub use types::domain::{
    EmailIntent, EmailSummary, EmailTone, FollowUpRequest, HistoryEntry, IntentClassification,
    PromptVersion, QualityScore, ReplyRequest, RewriteMode, RewriteRequest, ThreadReplyRequest,
};

// Components
pub use ai::{
    GeminiProvider, OpenAiProvider, ProviderConfig, ProviderRegistry, ResilientInvoker,
    SharedProvider, TextProvider,
};
pub use history::{HistorySink, MemoryHistory, NoopHistory};
pub use intent::{IntentResolver, classify_local};
pub use rate::{CounterStore, MemoryCounterStore, RateGate};
pub use service::EmailAssistant;
