//! Core Type Definitions
//!
//! Domain enums, request shapes, and the unified error type.

pub mod domain;
pub mod error;

pub use domain::{
    EmailIntent, EmailSummary, EmailTone, FollowUpRequest, HistoryEntry, IntentClassification,
    PromptVersion, QualityScore, ReplyRequest, RewriteMode, RewriteRequest, ThreadReplyRequest,
};
pub use error::{MailError, Result, UpstreamError};
