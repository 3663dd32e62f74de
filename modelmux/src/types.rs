//! Call-surface types: options, resolved requests, per-model results, and
//! the consensus report.

use std::time::Duration;

use crate::error::CallError;

/// Caller-facing knobs for a single invocation, before routing.
///
/// `provider` and `model` accept catalog ids or `"auto"`; resolution order
/// lives in [`crate::router::Router`].
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-call deadline; `None` uses the configured default.
    pub timeout: Option<Duration>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            model: "auto".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout: None,
        }
    }
}

/// A fully resolved dispatch request: the model id is a known catalog entry
/// by the time this exists.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub prompt: String,
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Outcome of one provider call.
///
/// `outcome` encodes the exactly-one-of-text-or-error invariant directly;
/// `score` is the model's static quality score, used for winner selection.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub model_id: String,
    pub outcome: Result<String, CallError>,
    pub score: f32,
}

impl InvocationResult {
    pub fn success(model_id: impl Into<String>, text: impl Into<String>, score: f32) -> Self {
        Self {
            model_id: model_id.into(),
            outcome: Ok(text.into()),
            score,
        }
    }

    pub fn failure(model_id: impl Into<String>, error: CallError, score: f32) -> Self {
        Self {
            model_id: model_id.into(),
            outcome: Err(error),
            score,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&CallError> {
        self.outcome.as_ref().err()
    }
}

/// Aggregated fan-out outcome.
///
/// `results` keeps the caller's request order, independent of completion
/// order. A report is only constructed when at least one call succeeded, so
/// `winner_model_id` is always a real entry; the zero-success case is
/// raised as [`crate::error::MuxError::NoSuccessfulResponse`] instead.
#[derive(Debug, Clone)]
pub struct ConsensusReport {
    pub results: Vec<InvocationResult>,
    pub winner_model_id: String,
}

impl ConsensusReport {
    /// The winning entry itself.
    pub fn winner(&self) -> Option<&InvocationResult> {
        self.results
            .iter()
            .find(|r| r.model_id == self.winner_model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure_accessors() {
        let ok = InvocationResult::success("m1", "hello", 0.9);
        assert!(ok.is_success());
        assert_eq!(ok.text(), Some("hello"));
        assert!(ok.error().is_none());

        let bad = InvocationResult::failure("m2", CallError::Network("refused".into()), 0.8);
        assert!(!bad.is_success());
        assert!(bad.text().is_none());
        assert!(matches!(bad.error(), Some(CallError::Network(_))));
    }

    #[test]
    fn report_winner_resolves_entry() {
        let report = ConsensusReport {
            results: vec![
                InvocationResult::success("a", "x", 0.8),
                InvocationResult::success("b", "y", 0.9),
            ],
            winner_model_id: "b".to_string(),
        };
        assert_eq!(report.winner().map(|r| r.text()).flatten(), Some("y"));
    }
}
