//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources:
//! 1. Built-in defaults (Serialized)
//! 2. Project config (mailsmith.toml)
//! 3. Environment variables (MAILSMITH_* prefix, `__` as section separator)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::Path;
use tracing::debug;

use super::types::Config;
use crate::types::{MailError, Result};

const PROJECT_CONFIG: &str = "mailsmith.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults -> project file -> env vars.
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let project_path = Path::new(PROJECT_CONFIG);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(project_path));
        }

        // e.g. MAILSMITH_RATE__MAX_REQUESTS -> rate.max_requests
        figment = figment.merge(Env::prefixed("MAILSMITH_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| MailError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration for display, TOML by default or
    /// pretty JSON. API keys are skipped during serialization, so a render
    /// never leaks them.
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| MailError::Config(e.to_string()))
        }
    }

    /// Load configuration from a specific file only (plus defaults).
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| MailError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
