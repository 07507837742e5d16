//! Local Intent Classifier
//!
//! Deterministic keyword classifier: the first, cheapest decision tier.
//! Zero external calls. Categories are tested in a fixed priority order and
//! the first match wins; overlapping keywords across categories resolve to
//! the earliest-listed category, which is a contract callers rely on
//! ("checking in on my application" is a FOLLOW_UP, not a JOB_APPLICATION).

use crate::types::{EmailIntent, IntentClassification};

/// Trigger table in priority order. First group whose substring matches
/// decides the intent; no scoring.
const KEYWORD_GROUPS: &[(EmailIntent, &str, &[&str])] = &[
    (
        EmailIntent::FollowUp,
        "Follow-up keywords detected",
        &[
            "follow up",
            "circling back",
            "checking in",
            "haven't heard",
            "just following up",
            "reminder",
        ],
    ),
    (
        EmailIntent::JobApplication,
        "Job application keywords",
        &["job", "position", "apply", "resume", "application", "hiring"],
    ),
    (
        EmailIntent::InterviewReply,
        "Interview/meeting scheduling",
        &["interview", "meeting", "schedule", "call", "zoom", "time"],
    ),
    (
        EmailIntent::SupportRequest,
        "Support/technical issue",
        &[
            "help",
            "issue",
            "problem",
            "not working",
            "error",
            "bug",
            "urgent",
            "asap",
        ],
    ),
    (
        EmailIntent::SalesInquiry,
        "Sales/pricing inquiry",
        &["price", "cost", "quote", "demo", "interested", "pricing"],
    ),
    (
        EmailIntent::Complaint,
        "Complaint/billing issue",
        &["complaint", "refund", "charge", "wrong", "broken", "dissatisfied"],
    ),
    (
        EmailIntent::Greeting,
        "Greeting/thanks message",
        &["hello", "hi", "thank", "nice to meet", "welcome"],
    ),
];

/// Classify email content by keywords. Absent content yields `Other`.
pub fn classify_local(content: Option<&str>) -> IntentClassification {
    let Some(content) = content else {
        return IntentClassification::other("Empty email");
    };

    let lower = content.to_lowercase();

    for (intent, reason, triggers) in KEYWORD_GROUPS {
        if triggers.iter().any(|t| lower.contains(t)) {
            return IntentClassification::new(*intent, *reason);
        }
    }

    IntentClassification::other("General communication - no specific intent detected")
}

// =============================================================================
// Tests
// =============================================================================
