//! Ollama-style local generate wire format.
//!
//! No auth; non-streaming; text at `response`.

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::transport::HttpCall;
use crate::types::InvocationRequest;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

pub(super) fn build(
    endpoint: &str,
    model_id: &str,
    request: &InvocationRequest,
) -> Result<HttpCall, CallError> {
    let payload = GenerateRequest {
        model: model_id,
        prompt: &request.prompt,
        stream: false,
    };
    let body = serde_json::to_value(&payload).map_err(|e| CallError::Parse(e.to_string()))?;
    Ok(HttpCall::post(endpoint, body))
}

pub(super) fn parse(body: &str) -> Result<String, CallError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CallError::Parse(format!("local-generate response: {e}")))?;
    response
        .response
        .ok_or_else(|| CallError::Parse("local-generate response has no response field".into()))
}
