//! Request adapters, one per provider wire-format family.
//!
//! Each submodule owns the typed request/response structs for its family
//! and exposes `build` / `parse`. This module dispatches on
//! [`WireFamily`] and applies the shared non-2xx rule: a completed exchange
//! with a non-success status is a parse-level failure of that call, never
//! an error thrown past the dispatcher.

mod chat_completions;
mod generate_content;
mod local_generate;
mod messages;

use crate::catalog::{Provider, WireFamily};
use crate::error::CallError;
use crate::transport::{HttpCall, HttpReply};
use crate::types::InvocationRequest;

/// Build the outbound call for a provider. `secret` is `None` only for
/// unauthenticated local providers.
pub fn build_call(
    provider: &Provider,
    model_id: &str,
    request: &InvocationRequest,
    secret: Option<&str>,
) -> Result<HttpCall, CallError> {
    let secret = secret.unwrap_or_default();
    match provider.family {
        WireFamily::ChatCompletions => {
            chat_completions::build(&provider.endpoint, model_id, request, secret)
        }
        WireFamily::MessagesApi => messages::build(&provider.endpoint, model_id, request, secret),
        WireFamily::GenerateContent => {
            generate_content::build(&provider.endpoint, model_id, request, secret)
        }
        WireFamily::LocalGenerate => local_generate::build(&provider.endpoint, model_id, request),
    }
}

/// Extract the response text for a family, or the reason it is unusable.
pub fn extract_text(family: WireFamily, reply: &HttpReply) -> Result<String, CallError> {
    if !reply.is_success() {
        return Err(CallError::Parse(format!(
            "HTTP {}: {}",
            reply.status,
            snippet(&reply.body)
        )));
    }
    match family {
        WireFamily::ChatCompletions => chat_completions::parse(&reply.body),
        WireFamily::MessagesApi => messages::parse(&reply.body),
        WireFamily::GenerateContent => generate_content::parse(&reply.body),
        WireFamily::LocalGenerate => local_generate::parse(&reply.body),
    }
}

/// First part of an error body, bounded so provider error pages do not
/// flood logs.
fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_2xx_is_a_parse_failure_with_status() {
        let reply = HttpReply {
            status: 429,
            body: "rate limited".to_string(),
        };
        let err = extract_text(WireFamily::ChatCompletions, &reply).unwrap_err();
        match err {
            CallError::Parse(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("rate limited"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let reply = HttpReply {
            status: 500,
            body: "x".repeat(1000),
        };
        let err = extract_text(WireFamily::LocalGenerate, &reply).unwrap_err();
        let msg = err.to_string();
        assert!(msg.len() < 300);
        assert!(msg.contains("..."));
    }
}
