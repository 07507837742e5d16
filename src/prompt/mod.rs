//! Prompt Composition
//!
//! Pure functions building upstream prompt text from request fields. No
//! network or IO here; the mode x version decision table is part of the
//! crate's contract:
//!
//! | mode           | behavior                                          |
//! |----------------|---------------------------------------------------|
//! | GENERATE_REPLY | body selected by version (V1/V2/V3)               |
//! | POLISH         | fix grammar and clarity, preserve meaning         |
//! | SHORTEN        | keep key points, remove redundancy                |
//! | EXPAND         | add polite clarifying detail                      |
//! | MAKE_FORMAL    | rewrite fully formal                              |
//!
//! Tone defaults to professional, version to the structured variant, and
//! every composed prompt ends with a `Tone:` annotation line.

use crate::types::{EmailTone, FollowUpRequest, PromptVersion, RewriteMode, ThreadReplyRequest};

/// Default tone when the request leaves it absent.
pub const DEFAULT_TONE: EmailTone = EmailTone::Professional;

/// Compose the upstream prompt for a mode-based request. This is the single
/// entry point for reply and rewrite prompts.
pub fn compose(
    content: &str,
    mode: RewriteMode,
    tone: Option<EmailTone>,
    version: Option<PromptVersion>,
) -> String {
    let tone = tone.unwrap_or(DEFAULT_TONE);
    let version = version.unwrap_or_default();

    let body = match mode {
        RewriteMode::GenerateReply => versioned_reply_body(content, tone, version),
        RewriteMode::Polish => format!(
            "Polish this email: fix grammar, improve clarity, keep meaning same.\n\n{}",
            content
        ),
        RewriteMode::Shorten => format!(
            "Shorten this email: keep all key points, remove redundancy.\n\n{}",
            content
        ),
        RewriteMode::Expand => format!(
            "Expand this email: add polite details and clarification while keeping original intent.\n\n{}",
            content
        ),
        RewriteMode::MakeFormal => format!(
            "Rewrite this email as a completely formal business email.\n\n{}",
            content
        ),
    };

    format!("{}\n\nTone: {}", body, tone.as_prompt_str())
}

/// Versioned reply bodies. Only GENERATE_REPLY is version-sensitive.
fn versioned_reply_body(content: &str, tone: EmailTone, version: PromptVersion) -> String {
    let tone = tone.as_prompt_str();
    match version {
        PromptVersion::V1Simple => format!(
            "Reply to this email in a {} tone.\n\
             Do not include a subject line.\n\n\
             Email:\n{}",
            tone, content
        ),
        PromptVersion::V2Structured => format!(
            "You are a professional email assistant.\n\n\
             Task: Write a clear, polite reply.\n\
             Tone: {}\n\
             Rules:\n\
             - No subject line\n\
             - Single coherent email body (no multiple options)\n\n\
             Email:\n{}",
            tone, content
        ),
        PromptVersion::V3Enterprise => format!(
            "You are an enterprise-grade email assistant.\n\n\
             Objectives:\n\
             - Be concise but complete\n\
             - Use respectful, professional language\n\
             - Make next steps explicit if appropriate\n\n\
             Tone: {}\n\n\
             Original email:\n{}",
            tone, content
        ),
    }
}

/// Classification prompt constrained to a fixed JSON-only output contract.
/// The intent pipeline decodes the reply with serde; anything outside the
/// contract falls back to the local classifier.
pub fn classification(content: &str) -> String {
    format!(
        "Classify this email into EXACTLY ONE intent from: COMPLAINT, JOB_APPLICATION, \
         INTERVIEW_REPLY, FOLLOW_UP, SALES_INQUIRY, SUPPORT_REQUEST, GREETING, OTHER.\n\n\
         Respond with ONLY this JSON format. NO OTHER TEXT:\n\
         {{\"intent\": \"INTENT_NAME\", \"reason\": \"brief explanation\"}}\n\n\
         Email: {}",
        content
    )
}

/// Follow-up prompt: ordinal and urgency escalate with the follow-up number.
pub fn follow_up(request: &FollowUpRequest) -> String {
    let (ordinal, urgency) = match request.follow_up_number {
        1 => ("first", "gentle follow-up"),
        2 => ("second", "polite reminder"),
        _ => ("final", "urgent final reminder"),
    };

    format!(
        "Generate a professional {} follow-up email ({} after {} days no response).\n\
         Reference the original email content. Be increasingly urgent.\n\
         Do not include subject line.\n\n\
         Original email: {}",
        ordinal, urgency, request.days_passed, request.content
    )
}

/// Thread-aware prompt: numbered prior messages oldest-first, then the
/// message being answered.
pub fn thread_reply(request: &ThreadReplyRequest) -> String {
    let mut prompt = String::from("Thread context:\n");
    for (i, previous) in request.previous_emails.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, previous));
    }
    prompt.push_str(&format!(
        "\nReply to latest: {}\n\nGenerate professional reply considering full context. No subject.",
        request.content
    ));
    if let Some(tone) = request.tone {
        prompt.push_str(&format!(" Tone: {}", tone.as_prompt_str()));
    }
    prompt
}

/// Subject-line prompt with a JSON-array-only output contract.
pub fn subject_lines(content: &str) -> String {
    format!(
        "Generate EXACTLY 3 professional, concise subject lines for this email content.\n\
         Return ONLY JSON array: [\"Subject 1\", \"Subject 2\", \"Subject 3\"]\n\
         NO other text, NO explanations.\n\n\
         Email: {}",
        content
    )
}

/// Quality-scoring prompt with a JSON-object-only output contract.
pub fn quality(content: &str) -> String {
    format!(
        "Analyze this email for quality and return ONLY valid JSON:\n\
         {{\n\
           \"sentiment\": \"positive\",\n\
           \"politenessScore\": 8.5,\n\
           \"professionalismScore\": 9.2\n\
         }}\n\
         Scores 0-10. Be precise and honest.\n\n\
         Email: {}",
        content
    )
}

/// Summary prompt with a JSON-object-only output contract.
pub fn summary(content: &str) -> String {
    format!(
        "Analyze this email and return ONLY valid JSON with:\n\
         {{\n\
           \"summary\": \"1-2 sentence summary\",\n\
           \"actionItems\": [\"item1\", \"item2\"],\n\
           \"deadlines\": [\"MM/DD\", \"ASAP\", null]\n\
         }}\n\
         Use null for empty arrays. Be precise.\n\n\
         Email: {}",
        content
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_defaults_to_professional_tone() {
        let prompt = compose("See attached.", RewriteMode::Shorten, None, None);
        assert!(prompt.contains("Shorten this email"));
        assert!(prompt.ends_with("Tone: professional"));
    }

    #[test]
    fn test_every_mode_ends_with_tone_line() {
        for mode in [
            RewriteMode::GenerateReply,
            RewriteMode::Polish,
            RewriteMode::Shorten,
            RewriteMode::Expand,
            RewriteMode::MakeFormal,
        ] {
            let prompt = compose("x", mode, Some(EmailTone::Casual), None);
            assert!(prompt.ends_with("Tone: casual"), "mode {:?}", mode);
        }
    }

    #[test]
    fn test_reply_version_selection() {
        let v1 = compose("x", RewriteMode::GenerateReply, None, Some(PromptVersion::V1Simple));
        assert!(v1.starts_with("Reply to this email in a professional tone."));

        // Version absent -> structured variant.
        let default = compose("x", RewriteMode::GenerateReply, None, None);
        assert!(default.contains("You are a professional email assistant."));
        assert!(default.contains("Single coherent email body"));

        let v3 = compose("x", RewriteMode::GenerateReply, None, Some(PromptVersion::V3Enterprise));
        assert!(v3.contains("enterprise-grade email assistant"));
        assert!(v3.contains("Make next steps explicit"));
    }

    #[test]
    fn test_version_only_affects_generate_reply() {
        let a = compose("x", RewriteMode::Polish, None, Some(PromptVersion::V1Simple));
        let b = compose("x", RewriteMode::Polish, None, Some(PromptVersion::V3Enterprise));
        assert_eq!(a, b);
    }

    #[test]
    fn test_classification_contract() {
        let prompt = classification("hello there");
        assert!(prompt.contains("EXACTLY ONE intent"));
        assert!(prompt.contains(r#"{"intent": "INTENT_NAME", "reason": "brief explanation"}"#));
    }

    #[test]
    fn test_quality_contract() {
        let prompt = quality("thanks for the update");
        assert!(prompt.contains(r#""politenessScore""#));
        assert!(prompt.contains("Scores 0-10"));
    }

    #[test]
    fn test_follow_up_escalation() {
        let mut req = FollowUpRequest {
            content: "the proposal".to_string(),
            follow_up_number: 1,
            days_passed: 3,
            provider: None,
        };
        assert!(follow_up(&req).contains("first follow-up email (gentle follow-up after 3 days"));

        req.follow_up_number = 3;
        assert!(follow_up(&req).contains("final follow-up email (urgent final reminder"));
    }

    #[test]
    fn test_thread_prompt_numbers_context() {
        let req = ThreadReplyRequest {
            content: "latest".to_string(),
            previous_emails: vec!["one".to_string(), "two".to_string()],
            tone: Some(EmailTone::Formal),
            provider: None,
        };
        let prompt = thread_reply(&req);
        assert!(prompt.contains("1. one\n2. two\n"));
        assert!(prompt.contains("Reply to latest: latest"));
        assert!(prompt.ends_with("Tone: formal"));
    }
}
