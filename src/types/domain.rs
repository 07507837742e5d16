//! Domain Types
//!
//! Tones, rewrite modes, prompt versions, and intent categories shared by the
//! prompt composer, the intent pipeline, and the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::MailError;

// =============================================================================
// Email Tone
// =============================================================================

/// Requested tone for generated text. Rendered lowercase into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailTone {
    Professional,
    Formal,
    Casual,
    Friendly,
    Apologetic,
    FollowUp,
}

impl EmailTone {
    /// Lowercase form used inside prompt text.
    pub fn as_prompt_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Apologetic => "apologetic",
            Self::FollowUp => "follow_up",
        }
    }
}

impl FromStr for EmailTone {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PROFESSIONAL" => Ok(Self::Professional),
            "FORMAL" => Ok(Self::Formal),
            "CASUAL" => Ok(Self::Casual),
            "FRIENDLY" => Ok(Self::Friendly),
            "APOLOGETIC" => Ok(Self::Apologetic),
            "FOLLOW_UP" => Ok(Self::FollowUp),
            other => Err(MailError::InvalidTone(other.to_string())),
        }
    }
}

// =============================================================================
// Rewrite Mode
// =============================================================================

/// What to do with the input email.
///
/// Only `GenerateReply` is sensitive to the prompt version; the rewrite
/// modes carry fixed instructions. An unknown mode string is a hard client
/// error (`MailError::InvalidMode`), the one input fault that propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewriteMode {
    GenerateReply,
    Polish,
    Shorten,
    Expand,
    MakeFormal,
}

impl FromStr for RewriteMode {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GENERATE_REPLY" => Ok(Self::GenerateReply),
            "POLISH" => Ok(Self::Polish),
            "SHORTEN" => Ok(Self::Shorten),
            "EXPAND" => Ok(Self::Expand),
            "MAKE_FORMAL" => Ok(Self::MakeFormal),
            other => Err(MailError::InvalidMode(other.to_string())),
        }
    }
}

// =============================================================================
// Prompt Version
// =============================================================================

/// Versioned reply-prompt templates, for A/B-ing prompt quality.
/// `V2Structured` is the default when the request leaves it absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptVersion {
    #[serde(rename = "V1_SIMPLE")]
    V1Simple,
    #[default]
    #[serde(rename = "V2_STRUCTURED")]
    V2Structured,
    #[serde(rename = "V3_ENTERPRISE")]
    V3Enterprise,
}

impl FromStr for PromptVersion {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "V1_SIMPLE" | "V1" => Ok(Self::V1Simple),
            "V2_STRUCTURED" | "V2" => Ok(Self::V2Structured),
            "V3_ENTERPRISE" | "V3" => Ok(Self::V3Enterprise),
            other => Err(MailError::InvalidVersion(other.to_string())),
        }
    }
}

// =============================================================================
// Email Intent
// =============================================================================

/// Classified intent of an inbound email.
///
/// Variant order mirrors the local classifier's priority order; the JSON
/// names are the contract the upstream classification prompt must follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailIntent {
    FollowUp,
    JobApplication,
    InterviewReply,
    SupportRequest,
    SalesInquiry,
    Complaint,
    Greeting,
    #[default]
    Other,
}

/// Intent with a human-readable justification. Never absent: the
/// classification path always terminates in one of these, defaulting to
/// `Other` with an explanatory reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: EmailIntent,
    pub reason: String,
}

impl IntentClassification {
    pub fn new(intent: EmailIntent, reason: impl Into<String>) -> Self {
        Self {
            intent,
            reason: reason.into(),
        }
    }

    pub fn other(reason: impl Into<String>) -> Self {
        Self::new(EmailIntent::Other, reason)
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Reply-generation request. Ephemeral: exists only to build a prompt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
    pub tone: Option<EmailTone>,
    pub version: Option<PromptVersion>,
    pub provider: Option<String>,
}

/// Mode-based rewrite request (polish, shorten, expand, formalize, or a
/// full versioned reply).
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteRequest {
    pub content: String,
    pub mode: RewriteMode,
    pub tone: Option<EmailTone>,
    pub version: Option<PromptVersion>,
    pub provider: Option<String>,
}

/// Follow-up generation request.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpRequest {
    pub content: String,
    /// 1 = first nudge, 2 = second, anything else = final
    pub follow_up_number: u8,
    pub days_passed: u32,
    pub provider: Option<String>,
}

/// Thread-aware reply request: prior messages oldest-first.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadReplyRequest {
    pub content: String,
    pub previous_emails: Vec<String>,
    pub tone: Option<EmailTone>,
    pub provider: Option<String>,
}

/// Structured email summary decoded from the upstream reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub deadlines: Vec<Option<String>>,
}

/// Quality assessment decoded from the upstream reply. Scores are 0-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub sentiment: String,
    pub politeness_score: f64,
    pub professionalism_score: f64,
}

// =============================================================================
// History
// =============================================================================

/// Completed-generation record handed to the history sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub response: String,
    pub tone: EmailTone,
    pub intent: EmailIntent,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        content: impl Into<String>,
        response: impl Into<String>,
        tone: EmailTone,
        intent: EmailIntent,
    ) -> Self {
        Self {
            content: content.into(),
            response: response.into(),
            tone,
            intent,
            timestamp: Utc::now(),
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
    fn test_mode_parse_known() {
        assert_eq!(
            "generate_reply".parse::<RewriteMode>().unwrap(),
            RewriteMode::GenerateReply
        );
        assert_eq!("SHORTEN".parse::<RewriteMode>().unwrap(), RewriteMode::Shorten);
    }

    #[test]
    fn test_mode_parse_unknown_is_hard_error() {
        let err = "TRANSLATE".parse::<RewriteMode>().unwrap_err();
        assert!(matches!(err, MailError::InvalidMode(m) if m == "TRANSLATE"));
    }

    #[test]
    fn test_version_default_is_structured() {
        assert_eq!(PromptVersion::default(), PromptVersion::V2Structured);
        assert_eq!("v3".parse::<PromptVersion>().unwrap(), PromptVersion::V3Enterprise);
    }

    #[test]
    fn test_intent_json_names() {
        let c: IntentClassification =
            serde_json::from_str(r#"{"intent": "JOB_APPLICATION", "reason": "resume attached"}"#)
                .unwrap();
        assert_eq!(c.intent, EmailIntent::JobApplication);

        let json = serde_json::to_string(&IntentClassification::other("nothing matched")).unwrap();
        assert!(json.contains(r#""intent":"OTHER""#));
    }

    #[test]
    fn test_tone_prompt_rendering() {
        assert_eq!(EmailTone::Professional.as_prompt_str(), "professional");
        assert_eq!("friendly".parse::<EmailTone>().unwrap(), EmailTone::Friendly);
    }
}
