//! AI Integration Layer
//!
//! Provider abstraction, resilient invocation, and response normalization.

pub mod extract;
pub mod invoke;
pub mod provider;

pub use extract::{extract_text, strip_code_fences};
pub use invoke::ResilientInvoker;
pub use provider::{
    GeminiProvider, OpenAiProvider, ProviderConfig, ProviderRegistry, SharedProvider,
    TextProvider, create_provider,
};
