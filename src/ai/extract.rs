//! Response Extraction
//!
//! Normalizes a raw upstream payload into plain text. A payload is one of
//! three shapes, decided by a single dispatch at the top:
//!
//! - **Sentinel**: a terminal soft result the invoker (or a previous
//!   extraction) already produced, passed through unchanged, so
//!   `extract_text` is idempotent on its own outputs
//! - **ErrorEnvelope**: upstream error JSON, formatted human-readable
//! - **SuccessEnvelope**: candidates with text parts; first part of the
//!   first candidate wins
//!
//! A payload that parses as none of these becomes a diagnostic embedding
//! the decode error and a bounded excerpt of the raw text, never the whole
//! payload.

use serde::Deserialize;
use tracing::warn;

use crate::constants::{extract, sentinel};

/// Normalize a raw provider payload into plain text. Never fails: decode
/// problems degrade to diagnostic text.
pub fn extract_text(raw: &str) -> String {
    match classify(raw) {
        Payload::Sentinel(text) => text.to_string(),
        Payload::Envelope(Envelope::Error { error }) => {
            format!("{}{}", sentinel::PROVIDER_ERROR_PREFIX, error.message)
        }
        Payload::Envelope(Envelope::Success { candidates }) => {
            let Some(first) = candidates.first() else {
                return sentinel::NO_RESPONSE.to_string();
            };
            match first.content.parts.first() {
                Some(part) => part.text.clone(),
                None => sentinel::EMPTY_CONTENT.to_string(),
            }
        }
        Payload::Malformed(err) => {
            warn!(excerpt = %bounded_excerpt(raw), "Failed to decode provider payload");
            format!(
                "{}{}. Raw: {}",
                sentinel::DECODE_ERROR_PREFIX,
                err,
                bounded_excerpt(raw)
            )
        }
    }
}

/// Strip markdown code fences and surrounding noise from a JSON-bearing
/// reply, leaving text ready for serde decode.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

// =============================================================================
// Payload dispatch
// =============================================================================

enum Payload<'a> {
    Sentinel(&'a str),
    Envelope(Envelope),
    Malformed(serde_json::Error),
}

fn classify(raw: &str) -> Payload<'_> {
    if is_sentinel(raw) {
        return Payload::Sentinel(raw);
    }
    match serde_json::from_str::<Envelope>(raw) {
        Ok(envelope) => Payload::Envelope(envelope),
        Err(err) => Payload::Malformed(err),
    }
}

fn is_sentinel(raw: &str) -> bool {
    raw.contains("Rate limited")
        || raw.contains(sentinel::MAX_RETRIES)
        || raw.starts_with(sentinel::PROVIDER_ERROR_PREFIX)
        || raw.starts_with(sentinel::DECODE_ERROR_PREFIX)
        || raw == sentinel::NO_RESPONSE
        || raw == sentinel::EMPTY_CONTENT
}

/// Char-boundary-safe prefix of the raw payload for diagnostics.
fn bounded_excerpt(raw: &str) -> String {
    raw.chars().take(extract::RAW_EXCERPT_CHARS).collect()
}

// =============================================================================
// Wire envelopes
// =============================================================================

// Error must come first: untagged deserialization tries variants in order,
// and a fully-defaulted Success would swallow error bodies otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Error {
        error: ErrorBody,
    },
    Success {
        #[serde(default)]
        candidates: Vec<Candidate>,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

// =============================================================================
// Tests
// =============================================================================
