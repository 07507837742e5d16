//! Configuration
//!
//! Typed settings with defaults, file + env resolution, and startup
//! validation.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, RateConfig, RetryConfig};
