//! Error taxonomy for routing, dispatch, and aggregation.
//!
//! Two layers, matching how failures propagate:
//!
//! - [`MuxError`] is the fail-fast layer: routing and credential problems
//!   raised before any network attempt, plus the aggregation-level
//!   `NoSuccessfulResponse` and the health-gate `ServiceUnavailable`.
//! - [`CallError`] is the per-call layer: transport, timeout, and response
//!   shape failures captured on an individual `InvocationResult`, never
//!   thrown across the fan-out boundary.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::RoutingError;
use crate::credentials::CredentialError;
use crate::types::InvocationResult;

/// Failure of a single provider call, stored on its `InvocationResult`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Transport-level failure: connect refused, DNS, broken stream.
    #[error("network: {0}")]
    Network(String),

    /// The per-call deadline elapsed before the provider answered.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx status or a response body that did not match the provider's
    /// documented shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// Credential missing for a fan-out sibling. The single-call path
    /// fails fast with [`CredentialError`] instead.
    #[error("missing credential: {0} is not set")]
    Credential(String),
}

/// Unified error type for the engine surface.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("configuration error: {0}")]
    Config(String),

    /// Every fan-out call failed. Carries the full per-model report so the
    /// caller can still render the individual failures.
    #[error("no model returned a usable response ({} attempted)", results.len())]
    NoSuccessfulResponse { results: Vec<InvocationResult> },

    /// Health-gated short circuit: the sidecar backend is down, so the
    /// request was not attempted.
    #[error("sidecar backend is unavailable")]
    ServiceUnavailable,

    #[error("http client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_error_display_names_the_deadline() {
        let err = CallError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn no_successful_response_counts_attempts() {
        let results = vec![
            InvocationResult::failure("a", CallError::Network("down".into()), 0.8),
            InvocationResult::failure("b", CallError::Network("down".into()), 0.9),
        ];
        let err = MuxError::NoSuccessfulResponse { results };
        assert!(err.to_string().contains("2 attempted"));
    }
}
