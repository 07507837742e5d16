//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Resilient invoker constants
pub mod retry {
    /// Maximum attempts against a rate-limited upstream
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Escalating delay unit between attempts (attempt index x this)
    pub const BASE_DELAY_MS: u64 = 1_000;
}

/// Upstream generation parameters (fixed per request)
pub mod generation {
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_K: u32 = 40;
    pub const TOP_P: f32 = 0.95;
    pub const MAX_OUTPUT_TOKENS: u32 = 800;

    /// Per-attempt network timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 20;
}

/// Fixed-window rate gate defaults
pub mod rate {
    /// Requests admitted per window per identifier/endpoint
    pub const DEFAULT_MAX_REQUESTS: u32 = 10;

    /// Window length in seconds
    pub const DEFAULT_WINDOW_SECS: u64 = 60;
}

/// Sentinel texts: deliberate terminal "soft" results, never errors.
///
/// The extractor recognizes these (and its own outputs) and passes them
/// through unchanged, so extraction is idempotent.
pub mod sentinel {
    /// Returned after the retry budget is spent on consecutive 429s
    pub const RATE_LIMITED: &str =
        "Rate limited by the provider. Try again in 1-2 minutes.";

    /// Defensive terminal for a retry loop that falls through
    pub const MAX_RETRIES: &str = "Max retries exceeded";

    /// Prefix for a decoded upstream error envelope
    pub const PROVIDER_ERROR_PREFIX: &str = "Provider error: ";

    /// Prefix for a malformed-payload diagnostic
    pub const DECODE_ERROR_PREFIX: &str = "Error decoding provider response: ";

    /// Success envelope carried zero candidates
    pub const NO_RESPONSE: &str = "No response generated by the provider.";

    /// Candidate carried zero text parts
    pub const EMPTY_CONTENT: &str = "Provider returned empty content.";
}

/// Response extractor limits
pub mod extract {
    /// Longest raw-payload excerpt embedded in a decode diagnostic.
    /// Bounds log and response size when the upstream sends garbage.
    pub const RAW_EXCERPT_CHARS: usize = 100;
}
