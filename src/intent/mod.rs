//! Intent Detection
//!
//! Local keyword tier plus the upstream escalation pipeline.

pub mod classifier;
pub mod resolver;

pub use classifier::classify_local;
pub use resolver::IntentResolver;
