//! Request routing: resolve an effective provider and model for a prompt.
//!
//! Resolution priority, applied strictly in order:
//!
//! 1. An explicit model that exists in the catalog wins, and its declared
//!    provider overrides whatever provider the caller passed.
//! 2. `provider == "auto"` resolves to the configured default model.
//! 3. An explicit provider must be a known id; with `model == "auto"` the
//!    prompt is classified by keyword to pick the coding, reasoning, or
//!    default model (the classified model's own binding applies).
//! 4. Anything left over is an unknown model id.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, ModelSpec, Provider, RoutingError};

/// Wildcard accepted for both the provider and model arguments.
pub const AUTO: &str = "auto";

/// Ordered keyword rules for auto-model classification. First match wins.
const CODING_KEYWORDS: &[&str] = &["code", "programming", "debug"];
const REASONING_KEYWORDS: &[&str] = &["analysis", "research", "complex"];

/// Role-to-model assignment used when the caller does not name a model.
#[derive(Debug, Clone)]
pub struct RoleModels {
    pub default_model: String,
    pub coding_model: String,
    pub reasoning_model: String,
}

/// A resolved (provider, model) pair.
#[derive(Debug, Clone)]
pub struct Route {
    pub provider: Provider,
    pub model: ModelSpec,
}

pub struct Router {
    catalog: Arc<Catalog>,
    roles: RoleModels,
}

impl Router {
    pub fn new(catalog: Arc<Catalog>, roles: RoleModels) -> Self {
        Self { catalog, roles }
    }

    /// Resolve the effective provider and model for a request.
    pub fn route(&self, provider: &str, model: &str, prompt: &str) -> Result<Route, RoutingError> {
        // Rule 1: a known model id always keeps its declared provider.
        if self.catalog.find_model(model).is_some() {
            return self.bind(model);
        }

        // Rule 2: auto provider substitutes the configured default pair.
        if provider == AUTO {
            return self.bind(&self.roles.default_model);
        }

        // Rule 4 guard: from here on the provider must be a real id.
        self.catalog.provider(provider)?;

        // Rule 3: auto model classifies the prompt.
        if model == AUTO {
            let classified = self.classify(prompt);
            debug!(model = classified, "classified prompt");
            return self.bind(classified);
        }

        Err(RoutingError::UnknownModel(model.to_string()))
    }

    /// Map a free-text prompt to a configured role model. Rules are
    /// evaluated in fixed order; coding keywords shadow reasoning ones.
    pub fn classify<'a>(&'a self, prompt: &str) -> &'a str {
        let lowered = prompt.to_lowercase();
        let contains = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));
        if contains(CODING_KEYWORDS) {
            &self.roles.coding_model
        } else if contains(REASONING_KEYWORDS) {
            &self.roles.reasoning_model
        } else {
            &self.roles.default_model
        }
    }

    fn bind(&self, model_id: &str) -> Result<Route, RoutingError> {
        let model = self.catalog.model(model_id)?.clone();
        let provider = self.catalog.provider(&model.provider_id)?.clone();
        Ok(Route { provider, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let catalog = Arc::new(Catalog::builtin());
        Router::new(
            catalog,
            RoleModels {
                default_model: "llama3.1".to_string(),
                coding_model: "qwen2.5-coder".to_string(),
                reasoning_model: "claude-sonnet-4-20250514".to_string(),
            },
        )
    }

    #[test]
    fn model_binding_wins_for_every_cataloged_model() {
        let catalog = Catalog::builtin();
        let router = router();
        for model in catalog.models() {
            // Even a bogus provider argument is overridden by the binding.
            for provider_arg in ["auto", "openai", "no-such-provider"] {
                let route = router.route(provider_arg, &model.id, "hi").unwrap();
                assert_eq!(route.provider.id, model.provider_id);
                assert_eq!(route.model.id, model.id);
            }
        }
    }

    #[test]
    fn auto_provider_resolves_to_default_pair() {
        let route = router().route("auto", "auto", "Explain recursion").unwrap();
        assert_eq!(route.provider.id, "ollama");
        assert_eq!(route.model.id, "llama3.1");
    }

    #[test]
    fn coding_keywords_shadow_reasoning_keywords() {
        // Both a coding and an analysis keyword: the first rule wins.
        let route = router()
            .route("ollama", "auto", "Write code for statistical analysis")
            .unwrap();
        assert_eq!(route.model.id, "qwen2.5-coder");
    }

    #[test]
    fn reasoning_keywords_pick_the_reasoning_model() {
        let route = router()
            .route("ollama", "auto", "Deep research on market trends")
            .unwrap();
        assert_eq!(route.model.id, "claude-sonnet-4-20250514");
        // Binding wins: the reasoning model drags in its own provider.
        assert_eq!(route.provider.id, "anthropic");
    }

    #[test]
    fn classification_is_case_insensitive() {
        let route = router().route("ollama", "auto", "DEBUG this panic").unwrap();
        assert_eq!(route.model.id, "qwen2.5-coder");
    }

    #[test]
    fn keywordless_prompt_falls_back_to_default_model() {
        let route = router().route("ollama", "auto", "Explain recursion").unwrap();
        assert_eq!(route.model.id, "llama3.1");
    }

    #[test]
    fn unknown_provider_errors() {
        let err = router().route("no-such-provider", "auto", "hi").unwrap_err();
        assert_eq!(
            err,
            RoutingError::UnknownProvider("no-such-provider".to_string())
        );
    }

    #[test]
    fn unknown_model_with_known_provider_errors() {
        let err = router().route("openai", "gpt-99", "hi").unwrap_err();
        assert_eq!(err, RoutingError::UnknownModel("gpt-99".to_string()));
    }
}
