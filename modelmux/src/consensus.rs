//! Consensus selection over fan-out results.
//!
//! The report keeps the caller's request order. The winner is a ranked
//! pick, not a text fusion: the first successful result whose score is
//! strictly greater than every score seen before it. Failed entries stay
//! in the report so callers can see partial failure, but they never win.

use tracing::{info, warn};

use crate::error::MuxError;
use crate::types::{ConsensusReport, InvocationResult};

/// Build the consensus report, or raise `NoSuccessfulResponse` when every
/// call failed.
pub fn aggregate(results: Vec<InvocationResult>) -> Result<ConsensusReport, MuxError> {
    match select_winner(&results) {
        Some(winner_model_id) => {
            info!(
                winner = %winner_model_id,
                results = results.len(),
                successes = results.iter().filter(|r| r.is_success()).count(),
                "consensus reached"
            );
            Ok(ConsensusReport {
                results,
                winner_model_id,
            })
        }
        None => {
            warn!(results = results.len(), "every fan-out call failed");
            Err(MuxError::NoSuccessfulResponse { results })
        }
    }
}

/// Argmax by static score over successes, first occurrence on ties.
fn select_winner(results: &[InvocationResult]) -> Option<String> {
    let mut best: Option<&InvocationResult> = None;
    for result in results.iter().filter(|r| r.is_success()) {
        if best.map_or(true, |current| result.score > current.score) {
            best = Some(result);
        }
    }
    best.map(|r| r.model_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;

    fn ok(id: &str, score: f32) -> InvocationResult {
        InvocationResult::success(id, format!("text from {id}"), score)
    }

    fn fail(id: &str, score: f32) -> InvocationResult {
        InvocationResult::failure(id, CallError::Network("down".into()), score)
    }

    #[test]
    fn two_successes_keep_order_and_higher_score_wins() {
        let report = aggregate(vec![ok("modelA", 0.92), ok("modelB", 0.88)]).unwrap();
        let order: Vec<&str> = report.results.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(order, vec!["modelA", "modelB"]);
        assert_eq!(report.winner_model_id, "modelA");
    }

    #[test]
    fn tie_goes_to_first_occurrence_of_the_max() {
        let report = aggregate(vec![ok("a", 0.90), ok("b", 0.95), ok("c", 0.95)]).unwrap();
        assert_eq!(report.winner_model_id, "b");
    }

    #[test]
    fn failed_entries_never_win_even_with_the_top_score() {
        let report = aggregate(vec![fail("best", 0.99), ok("ok", 0.70)]).unwrap();
        assert_eq!(report.winner_model_id, "ok");
        // The failed entry is still reported.
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].error().is_some());
    }

    #[test]
    fn all_failures_raise_no_successful_response() {
        let err = aggregate(vec![fail("a", 0.9), fail("b", 0.8)]).unwrap_err();
        match err {
            MuxError::NoSuccessfulResponse { results } => {
                assert_eq!(results.len(), 2);
                assert_eq!(results[0].model_id, "a");
            }
            other => panic!("expected NoSuccessfulResponse, got {other:?}"),
        }
    }

    #[test]
    fn single_success_wins() {
        let report = aggregate(vec![ok("only", 0.5)]).unwrap();
        assert_eq!(report.winner_model_id, "only");
        assert_eq!(report.winner().and_then(|r| r.text()), Some("text from only"));
    }
}
