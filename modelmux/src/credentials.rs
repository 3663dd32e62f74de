//! Per-provider credential resolution from process environment.

use std::env;

use thiserror::Error;

use crate::catalog::Provider;

/// A non-local provider has no secret in its fixed environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing credential for provider {provider}: {env_var} is not set")]
pub struct CredentialError {
    pub provider: String,
    pub env_var: String,
}

/// Resolves a provider's secret before any network attempt.
///
/// Self-hosted providers (no `auth_env`) resolve to `None` without error;
/// everything else must have a non-empty value in its environment variable.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver;

impl CredentialResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, provider: &Provider) -> Result<Option<String>, CredentialError> {
        let Some(env_var) = provider.auth_env.as_deref() else {
            return Ok(None);
        };
        match env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            _ => Err(CredentialError {
                provider: provider.id.clone(),
                env_var: env_var.to_string(),
            }),
        }
    }
}
