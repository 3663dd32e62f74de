//! Call execution: single invocations and concurrent fan-out.
//!
//! `invoke_one` is the fail-fast path: routing and credential problems are
//! raised before any network I/O, and only transport-level outcomes are
//! captured on the result. `invoke_many` launches one task per requested
//! model; every task owns its timeout and its failure, and nothing a task
//! does can cancel or block a sibling. The join is a plain barrier, so the
//! wall-clock bound is the largest per-task timeout, not their sum.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, ModelSpec, Provider};
use crate::config::MuxConfig;
use crate::credentials::CredentialResolver;
use crate::error::{CallError, MuxError};
use crate::transport::HttpTransport;
use crate::types::{InvocationRequest, InvocationResult};
use crate::wire;

/// Parameters applied to every fan-out task.
#[derive(Debug, Clone)]
struct CallDefaults {
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    credentials: CredentialResolver,
    transport: Arc<dyn HttpTransport>,
    defaults: CallDefaults,
    fanout_size: usize,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<Catalog>,
        credentials: CredentialResolver,
        transport: Arc<dyn HttpTransport>,
        config: &MuxConfig,
    ) -> Self {
        Self {
            catalog,
            credentials,
            transport,
            defaults: CallDefaults {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                timeout: config.call_timeout,
            },
            fanout_size: config.fanout_size,
        }
    }

    /// Execute a single resolved request.
    ///
    /// Unknown model ids and missing credentials are `Err` before any
    /// network attempt; network, timeout, and parse failures come back as
    /// the result's error.
    pub async fn invoke_one(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationResult, MuxError> {
        let model = self.catalog.model(&request.model_id)?.clone();
        let provider = self.catalog.provider(&model.provider_id)?.clone();
        let secret = self.credentials.resolve(&provider)?;
        Ok(self.call(&provider, &model, request, secret.as_deref()).await)
    }

    /// Fan a prompt out to several models and return their results in
    /// request order.
    ///
    /// An empty `model_ids` substitutes the top-scored default set. Unknown
    /// ids fail fast before anything is spawned. Inside the fan-out a
    /// missing credential is an isolated per-model failure, not an abort.
    pub async fn invoke_many(
        &self,
        prompt: &str,
        model_ids: &[String],
    ) -> Result<Vec<InvocationResult>, MuxError> {
        let ids: Vec<String> = if model_ids.is_empty() {
            self.catalog.top_models(self.fanout_size)
        } else {
            model_ids.to_vec()
        };

        let mut targets = Vec::with_capacity(ids.len());
        for id in &ids {
            let model = self.catalog.model(id)?.clone();
            let provider = self.catalog.provider(&model.provider_id)?.clone();
            targets.push((provider, model));
        }
        let scores: Vec<f32> = targets.iter().map(|(_, m)| m.quality_score).collect();

        info!(models = ids.len(), "dispatching fan-out");

        let handles: Vec<_> = targets
            .into_iter()
            .map(|(provider, model)| {
                let dispatcher = self.clone();
                let request = InvocationRequest {
                    prompt: prompt.to_string(),
                    model_id: model.id.clone(),
                    temperature: dispatcher.defaults.temperature,
                    max_tokens: dispatcher.defaults.max_tokens,
                    timeout: dispatcher.defaults.timeout,
                };
                tokio::spawn(async move {
                    let secret = match dispatcher.credentials.resolve(&provider) {
                        Ok(secret) => secret,
                        Err(err) => {
                            warn!(model = %model.id, error = %err, "fan-out entry skipped");
                            return InvocationResult::failure(
                                &model.id,
                                CallError::Credential(err.env_var),
                                model.quality_score,
                            );
                        }
                    };
                    dispatcher
                        .call(&provider, &model, &request, secret.as_deref())
                        .await
                })
            })
            .collect();

        // Join barrier: results come back in request order regardless of
        // completion order. A panicked task only loses its own entry.
        let joined = futures::future::join_all(handles).await;
        let mut results = Vec::with_capacity(ids.len());
        for ((id, score), outcome) in ids.iter().zip(scores).zip(joined) {
            results.push(match outcome {
                Ok(result) => result,
                Err(err) => InvocationResult::failure(
                    id.as_str(),
                    CallError::Network(format!("worker task aborted: {err}")),
                    score,
                ),
            });
        }
        Ok(results)
    }

    /// One provider call, bounded by the request's timeout. Never fails:
    /// every outcome lands on the returned result.
    async fn call(
        &self,
        provider: &Provider,
        model: &ModelSpec,
        request: &InvocationRequest,
        secret: Option<&str>,
    ) -> InvocationResult {
        let call = match wire::build_call(provider, &model.id, request, secret) {
            Ok(call) => call,
            Err(err) => return InvocationResult::failure(&model.id, err, model.quality_score),
        };

        let started = Instant::now();
        let outcome = match tokio::time::timeout(request.timeout, self.transport.execute(call)).await
        {
            Err(_) => Err(CallError::Timeout(request.timeout)),
            Ok(Err(err)) => Err(err),
            Ok(Ok(reply)) => wire::extract_text(provider.family, &reply),
        };

        match outcome {
            Ok(text) => {
                debug!(
                    model = %model.id,
                    provider = %provider.id,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "call complete"
                );
                InvocationResult::success(&model.id, text, model.quality_score)
            }
            Err(err) => {
                warn!(model = %model.id, provider = %provider.id, error = %err, "call failed");
                InvocationResult::failure(&model.id, err, model.quality_score)
            }
        }
    }
}
