//! Provider registry and model catalog.
//!
//! Pure lookup tables, immutable after startup. The engine constructs one
//! [`Catalog`] (usually [`Catalog::builtin`]) and passes it explicitly as
//! an `Arc` into every component that needs it; there is no global state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quality score assigned to models that do not declare one.
pub const DEFAULT_QUALITY_SCORE: f32 = 0.85;

/// Lookup failure for an unknown provider or model id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),
}

/// Wire-format family a provider speaks. One request adapter exists per
/// family in [`crate::wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireFamily {
    ChatCompletions,
    MessagesApi,
    GenerateContent,
    LocalGenerate,
}

impl std::fmt::Display for WireFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChatCompletions => write!(f, "chat-completions"),
            Self::MessagesApi => write!(f, "messages-api"),
            Self::GenerateContent => write!(f, "generate-content"),
            Self::LocalGenerate => write!(f, "local-generate"),
        }
    }
}

/// A backend connection template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    /// Endpoint URL; may contain a `{model}` placeholder (generate-content).
    pub endpoint: String,
    /// Environment variable holding the credential. `None` exactly for
    /// unauthenticated local providers.
    pub auth_env: Option<String>,
    pub family: WireFamily,
}

impl Provider {
    pub fn new(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        auth_env: Option<&str>,
        family: WireFamily,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            auth_env: auth_env.map(String::from),
            family,
        }
    }
}

/// A named model bound to exactly one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub provider_id: String,
    /// Static quality score in `[0, 1]`, used for consensus ranking.
    pub quality_score: f32,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>, provider_id: impl Into<String>, quality_score: f32) -> Self {
        Self {
            id: id.into(),
            provider_id: provider_id.into(),
            quality_score,
        }
    }
}

/// Immutable provider/model lookup tables.
#[derive(Debug)]
pub struct Catalog {
    providers: HashMap<String, Provider>,
    models: HashMap<String, ModelSpec>,
}

impl Catalog {
    /// Build a catalog, validating that every model references an existing
    /// provider.
    pub fn new(providers: Vec<Provider>, models: Vec<ModelSpec>) -> Result<Self, RoutingError> {
        let providers: HashMap<String, Provider> =
            providers.into_iter().map(|p| (p.id.clone(), p)).collect();
        for model in &models {
            if !providers.contains_key(&model.provider_id) {
                return Err(RoutingError::UnknownProvider(model.provider_id.clone()));
            }
        }
        let models = models.into_iter().map(|m| (m.id.clone(), m)).collect();
        Ok(Self { providers, models })
    }

    /// The built-in production catalog.
    pub fn builtin() -> Self {
        let providers = [
            Provider::new(
                "openai",
                "https://api.openai.com/v1/chat/completions",
                Some("OPENAI_API_KEY"),
                WireFamily::ChatCompletions,
            ),
            Provider::new(
                "anthropic",
                "https://api.anthropic.com/v1/messages",
                Some("ANTHROPIC_API_KEY"),
                WireFamily::MessagesApi,
            ),
            Provider::new(
                "gemini",
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent",
                Some("GEMINI_API_KEY"),
                WireFamily::GenerateContent,
            ),
            Provider::new(
                "ollama",
                "http://localhost:11434/api/generate",
                None,
                WireFamily::LocalGenerate,
            ),
        ];
        let models = [
            ModelSpec::new("gpt-4o", "openai", 0.92),
            ModelSpec::new("gpt-4o-mini", "openai", 0.80),
            ModelSpec::new("claude-sonnet-4-20250514", "anthropic", 0.95),
            ModelSpec::new("gemini-2.0-flash", "gemini", DEFAULT_QUALITY_SCORE),
            ModelSpec::new("llama3.1", "ollama", 0.75),
            ModelSpec::new("qwen2.5-coder", "ollama", 0.82),
        ];
        // Static data is correct by construction; validation is for
        // caller-supplied catalogs.
        Self {
            providers: providers.into_iter().map(|p| (p.id.clone(), p)).collect(),
            models: models.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn provider(&self, id: &str) -> Result<&Provider, RoutingError> {
        self.providers
            .get(id)
            .ok_or_else(|| RoutingError::UnknownProvider(id.to_string()))
    }

    pub fn model(&self, id: &str) -> Result<&ModelSpec, RoutingError> {
        self.models
            .get(id)
            .ok_or_else(|| RoutingError::UnknownModel(id.to_string()))
    }

    /// Non-erroring lookup used by the router's binding-wins rule.
    pub fn find_model(&self, id: &str) -> Option<&ModelSpec> {
        self.models.get(id)
    }

    /// The `n` highest-scored model ids, score descending with id-ascending
    /// tiebreak so the default fan-out set is deterministic.
    pub fn top_models(&self, n: usize) -> Vec<String> {
        let mut models: Vec<&ModelSpec> = self.models.values().collect();
        models.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        models.into_iter().take(n).map(|m| m.id.clone()).collect()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }
}
