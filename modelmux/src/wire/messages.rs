//! Anthropic-style messages wire format.
//!
//! `x-api-key` + version header; text at `content[0].text`.

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::transport::HttpCall;
use crate::types::InvocationRequest;

const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

pub(super) fn build(
    endpoint: &str,
    model_id: &str,
    request: &InvocationRequest,
    secret: &str,
) -> Result<HttpCall, CallError> {
    let payload = MessagesRequest {
        model: model_id,
        max_tokens: request.max_tokens,
        messages: vec![Message {
            role: "user",
            content: &request.prompt,
        }],
    };
    let body = serde_json::to_value(&payload).map_err(|e| CallError::Parse(e.to_string()))?;
    Ok(HttpCall::post(endpoint, body)
        .with_header("x-api-key", secret)
        .with_header("anthropic-version", API_VERSION))
}

pub(super) fn parse(body: &str) -> Result<String, CallError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| CallError::Parse(format!("messages response: {e}")))?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| CallError::Parse("messages response has no content[0].text".into()))
}
