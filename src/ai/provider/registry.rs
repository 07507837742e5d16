//! Provider Registry
//!
//! Immutable mapping from uppercased provider name to provider instance,
//! built once at startup and reused for every lookup. Lookup never fails:
//! an absent or unrecognized name resolves to the configured default, and
//! the constructor rejects a default that is not in the registered set, so
//! the fallback always exists.

use std::collections::HashMap;
use tracing::debug;

use super::SharedProvider;
use crate::types::{MailError, Result};

pub struct ProviderRegistry {
    providers: HashMap<String, SharedProvider>,
    default_name: String,
}

impl ProviderRegistry {
    /// Build the registry. `default_name` must match one of the registered
    /// providers (case-insensitive) or construction fails.
    pub fn new(providers: Vec<SharedProvider>, default_name: &str) -> Result<Self> {
        if providers.is_empty() {
            return Err(MailError::Config(
                "Provider registry requires at least one provider".to_string(),
            ));
        }

        let map: HashMap<String, SharedProvider> = providers
            .into_iter()
            .map(|p| (p.name().to_uppercase(), p))
            .collect();

        let default_name = default_name.to_uppercase();
        if !map.contains_key(&default_name) {
            return Err(MailError::Config(format!(
                "Default provider '{}' is not registered. Registered: {}",
                default_name,
                map.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(Self {
            providers: map,
            default_name,
        })
    }

    /// Resolve a logical provider name. Absent or unknown names fall back
    /// to the default provider.
    pub fn resolve(&self, name: Option<&str>) -> &SharedProvider {
        match name {
            Some(n) => {
                let key = n.to_uppercase();
                match self.providers.get(&key) {
                    Some(provider) => provider,
                    None => {
                        debug!(requested = %key, default = %self.default_name,
                            registered = ?self.provider_names(),
                            "Unknown provider requested, using default");
                        self.default_provider()
                    }
                }
            }
            None => self.default_provider(),
        }
    }

    pub fn default_provider(&self) -> &SharedProvider {
        // Validated at construction, so the default is always present.
        &self.providers[&self.default_name]
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TextProvider;
    use crate::types::UpstreamError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NamedProvider(&'static str);

    #[async_trait]
    impl TextProvider for NamedProvider {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, UpstreamError> {
            Ok(format!(r#"{{"candidates": [{{"content": {{"parts": [{{"text": "{}"}}]}}}}]}}"#, self.0))
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(
            vec![
                Arc::new(NamedProvider("GEMINI")) as SharedProvider,
                Arc::new(NamedProvider("OPENAI")) as SharedProvider,
            ],
            "GEMINI",
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_known_name_case_insensitive() {
        let r = registry();
        assert_eq!(r.resolve(Some("openai")).name(), "OPENAI");
        assert_eq!(r.resolve(Some("OpenAI")).name(), "OPENAI");
    }

    #[test]
    fn test_absent_unknown_and_default_agree() {
        let r = registry();
        assert_eq!(r.resolve(None).name(), "GEMINI");
        assert_eq!(r.resolve(Some("GEMINI")).name(), "GEMINI");
        assert_eq!(r.resolve(Some("CLAUDE")).name(), "GEMINI");
    }

    #[test]
    fn test_provider_names_lists_registered_set() {
        let r = registry();
        let mut names = r.provider_names();
        names.sort_unstable();
        assert_eq!(names, vec!["GEMINI", "OPENAI"]);
    }

    #[test]
    fn test_unregistered_default_rejected_at_startup() {
        let result = ProviderRegistry::new(
            vec![Arc::new(NamedProvider("OPENAI")) as SharedProvider],
            "GEMINI",
        );
        assert!(matches!(result, Err(MailError::Config(_))));
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert!(ProviderRegistry::new(vec![], "GEMINI").is_err());
    }
}
