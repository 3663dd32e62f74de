//! Engine facade wiring routing, dispatch, consensus, and health gating.
//!
//! [`ModelMux`] is constructed once at startup from an immutable
//! configuration and catalog; callers (CLI, dashboards, chat surfaces)
//! drive it through three calls: `invoke`, `consensus`, and `check_health`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::catalog::Catalog;
use crate::config::MuxConfig;
use crate::consensus;
use crate::credentials::CredentialResolver;
use crate::dispatch::Dispatcher;
use crate::error::MuxError;
use crate::health::HealthMonitor;
use crate::router::Router;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{ConsensusReport, InvocationRequest, InvocationResult, InvokeOptions};

/// Connect timeout for the shared HTTP client; per-call deadlines are
/// enforced separately by the dispatcher.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ModelMux {
    config: MuxConfig,
    catalog: Arc<Catalog>,
    router: Router,
    dispatcher: Dispatcher,
    health: HealthMonitor,
}

impl ModelMux {
    /// Build the engine against the built-in catalog and a real HTTP
    /// client.
    pub fn new(config: MuxConfig) -> Result<Self, MuxError> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(CONNECT_TIMEOUT)?);
        Self::with_transport(config, Arc::new(Catalog::builtin()), transport)
    }

    /// Build the engine with an injected catalog and transport. This is
    /// the seam tests use to run the full stack without a network.
    pub fn with_transport(
        config: MuxConfig,
        catalog: Arc<Catalog>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, MuxError> {
        config.validate().map_err(MuxError::Config)?;
        config
            .validate_against(&catalog)
            .map_err(MuxError::Config)?;

        let router = Router::new(catalog.clone(), config.role_models());
        let dispatcher = Dispatcher::new(
            catalog.clone(),
            CredentialResolver::new(),
            transport.clone(),
            &config,
        );
        let health = HealthMonitor::new(&config.sidecar, transport);

        Ok(Self {
            config,
            catalog,
            router,
            dispatcher,
            health,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Route a prompt to one provider and execute the call.
    pub async fn invoke(
        &self,
        prompt: &str,
        options: InvokeOptions,
    ) -> Result<InvocationResult, MuxError> {
        let route = self
            .router
            .route(&options.provider, &options.model, prompt)?;
        info!(provider = %route.provider.id, model = %route.model.id, "routed request");

        let request = InvocationRequest {
            prompt: prompt.to_string(),
            model_id: route.model.id.clone(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            timeout: options.timeout.unwrap_or(self.config.call_timeout),
        };
        self.dispatcher.invoke_one(&request).await
    }

    /// Fan a prompt out to several models and rank the results. An empty
    /// `model_ids` uses the configured default set.
    pub async fn consensus(
        &self,
        prompt: &str,
        model_ids: &[String],
    ) -> Result<ConsensusReport, MuxError> {
        let results = self.dispatcher.invoke_many(prompt, model_ids).await?;
        consensus::aggregate(results)
    }

    /// Cached sidecar liveness.
    pub async fn check_health(&self) -> bool {
        self.health.is_healthy().await
    }

    /// Gate used by sidecar-dependent call paths; short-circuits with
    /// `ServiceUnavailable` when the cached status is down.
    pub async fn require_sidecar(&self) -> Result<(), MuxError> {
        self.health.require_healthy().await
    }
}
