//! Engine and sidecar configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment variable overrides (e.g. `MODELMUX_DEFAULT_MODEL`)
//! 2. Values set on the struct by the caller
//! 3. Built-in defaults
//!
//! ## Model roles
//!
//! | Role      | Selected when                                   | Default                    |
//! |-----------|--------------------------------------------------|----------------------------|
//! | default   | no keyword matches, or `provider = "auto"`       | llama3.1 on ollama         |
//! | coding    | prompt mentions code / programming / debug       | qwen2.5-coder on ollama    |
//! | reasoning | prompt mentions analysis / research / complex    | claude-sonnet-4-20250514   |

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::router::RoleModels;

const ENV_DEFAULT_PROVIDER: &str = "MODELMUX_DEFAULT_PROVIDER";
const ENV_DEFAULT_MODEL: &str = "MODELMUX_DEFAULT_MODEL";
const ENV_CODING_MODEL: &str = "MODELMUX_CODING_MODEL";
const ENV_REASONING_MODEL: &str = "MODELMUX_REASONING_MODEL";
const ENV_TIMEOUT_SECS: &str = "MODELMUX_TIMEOUT_SECS";
const ENV_FANOUT: &str = "MODELMUX_FANOUT";
const ENV_SIDECAR_HOST: &str = "MODELMUX_SIDECAR_HOST";
const ENV_SIDECAR_PORT: &str = "MODELMUX_SIDECAR_PORT";
const ENV_HEALTH_TTL_SECS: &str = "MODELMUX_HEALTH_TTL_SECS";
const ENV_HEALTH_PROBE_TIMEOUT_SECS: &str = "MODELMUX_HEALTH_PROBE_TIMEOUT_SECS";

const DEFAULT_PROVIDER: &str = "ollama";
const DEFAULT_MODEL: &str = "llama3.1";
const DEFAULT_CODING_MODEL: &str = "qwen2.5-coder";
const DEFAULT_REASONING_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Size of the default fan-out set (top models by quality score).
const DEFAULT_FANOUT: usize = 3;

const DEFAULT_SIDECAR_HOST: &str = "127.0.0.1";
const DEFAULT_SIDECAR_PORT: u16 = 8765;
const DEFAULT_HEALTH_TTL_SECS: u64 = 30;
const DEFAULT_HEALTH_PROBE_TIMEOUT_SECS: u64 = 2;

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_secs(var: &str, default: u64) -> Duration {
    env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// Location and probe policy for the sibling backend gated by the health
/// monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarConfig {
    pub host: String,
    pub port: u16,
    /// How long a probe result stays valid before a fresh probe is issued.
    pub health_ttl: Duration,
    /// Deadline for a single health probe.
    pub probe_timeout: Duration,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            host: env_or(ENV_SIDECAR_HOST, DEFAULT_SIDECAR_HOST),
            port: env::var(ENV_SIDECAR_PORT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIDECAR_PORT),
            health_ttl: env_secs(ENV_HEALTH_TTL_SECS, DEFAULT_HEALTH_TTL_SECS),
            probe_timeout: env_secs(
                ENV_HEALTH_PROBE_TIMEOUT_SECS,
                DEFAULT_HEALTH_PROBE_TIMEOUT_SECS,
            ),
        }
    }
}

impl SidecarConfig {
    pub fn health_url(&self) -> String {
        format!("http://{}:{}/health", self.host, self.port)
    }
}

/// Top-level configuration consumed by [`crate::engine::ModelMux`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxConfig {
    pub default_provider: String,
    pub default_model: String,
    pub coding_model: String,
    pub reasoning_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Default per-call deadline, also used for every fan-out task.
    pub call_timeout: Duration,
    /// Number of models in the default consensus set.
    pub fanout_size: usize,
    pub sidecar: SidecarConfig,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            default_provider: env_or(ENV_DEFAULT_PROVIDER, DEFAULT_PROVIDER),
            default_model: env_or(ENV_DEFAULT_MODEL, DEFAULT_MODEL),
            coding_model: env_or(ENV_CODING_MODEL, DEFAULT_CODING_MODEL),
            reasoning_model: env_or(ENV_REASONING_MODEL, DEFAULT_REASONING_MODEL),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            call_timeout: env_secs(ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS),
            fanout_size: env::var(ENV_FANOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FANOUT),
            sidecar: SidecarConfig::default(),
        }
    }
}

impl MuxConfig {
    /// Build from environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// The role-to-model assignment handed to the router.
    pub fn role_models(&self) -> RoleModels {
        RoleModels {
            default_model: self.default_model.clone(),
            coding_model: self.coding_model.clone(),
            reasoning_model: self.reasoning_model.clone(),
        }
    }

    /// Validate values that do not depend on the catalog.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be > 0".to_string());
        }
        if self.fanout_size == 0 {
            return Err("fanout_size must be > 0".to_string());
        }
        if self.call_timeout.is_zero() {
            return Err("call_timeout must be > 0".to_string());
        }
        Ok(())
    }

    /// Check that the configured roles resolve against a catalog and that
    /// the default pair is consistent with the model's declared binding.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<(), String> {
        catalog
            .provider(&self.default_provider)
            .map_err(|e| e.to_string())?;
        let default = catalog.model(&self.default_model).map_err(|e| e.to_string())?;
        if default.provider_id != self.default_provider {
            return Err(format!(
                "default model {} is bound to provider {}, not {}",
                self.default_model, default.provider_id, self.default_provider
            ));
        }
        catalog.model(&self.coding_model).map_err(|e| e.to_string())?;
        catalog
            .model(&self.reasoning_model)
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = MuxConfig::default();
        cfg.validate().expect("default config should be valid");
        cfg.validate_against(&Catalog::builtin())
            .expect("default roles should resolve against the builtin catalog");
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let mut cfg = MuxConfig::default();
        cfg.temperature = 2.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_fanout_rejected() {
        let mut cfg = MuxConfig::default();
        cfg.fanout_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_role_model_rejected_against_catalog() {
        let mut cfg = MuxConfig::default();
        cfg.coding_model = "no-such-model".to_string();
        assert!(cfg.validate_against(&Catalog::builtin()).is_err());
    }

    #[test]
    fn sidecar_health_url_includes_host_port_and_path() {
        let sidecar = SidecarConfig {
            host: "10.0.0.5".to_string(),
            port: 9000,
            health_ttl: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(2),
        };
        assert_eq!(sidecar.health_url(), "http://10.0.0.5:9000/health");
    }
}
