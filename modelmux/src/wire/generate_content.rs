//! Google-style generate-content wire format.
//!
//! Secret travels as a `key` query parameter; the endpoint template carries
//! a `{model}` placeholder; text at `candidates[0].content.parts[0].text`.

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::transport::HttpCall;
use crate::types::InvocationRequest;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

pub(super) fn build(
    endpoint: &str,
    model_id: &str,
    request: &InvocationRequest,
    secret: &str,
) -> Result<HttpCall, CallError> {
    let payload = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
    };
    let body = serde_json::to_value(&payload).map_err(|e| CallError::Parse(e.to_string()))?;
    let url = format!("{}?key={}", endpoint.replace("{model}", model_id), secret);
    Ok(HttpCall::post(url, body))
}

pub(super) fn parse(body: &str) -> Result<String, CallError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CallError::Parse(format!("generate-content response: {e}")))?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            CallError::Parse(
                "generate-content response has no candidates[0].content.parts[0].text".into(),
            )
        })
}
