//! OpenAI-style chat-completions wire format.
//!
//! Bearer auth; text at `choices[0].message.content`.

use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::transport::HttpCall;
use crate::types::InvocationRequest;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub(super) fn build(
    endpoint: &str,
    model_id: &str,
    request: &InvocationRequest,
    secret: &str,
) -> Result<HttpCall, CallError> {
    let payload = ChatRequest {
        model: model_id,
        messages: vec![ChatMessage {
            role: "user",
            content: &request.prompt,
        }],
        temperature: request.temperature,
    };
    let body = serde_json::to_value(&payload).map_err(|e| CallError::Parse(e.to_string()))?;
    Ok(HttpCall::post(endpoint, body).with_header("authorization", format!("Bearer {secret}")))
}

pub(super) fn parse(body: &str) -> Result<String, CallError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CallError::Parse(format!("chat-completions response: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            CallError::Parse("chat-completions response has no choices[0].message.content".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;
    use std::time::Duration;

    fn request() -> InvocationRequest {
        InvocationRequest {
            prompt: "hello".to_string(),
            model_id: "gpt-4o".to_string(),
            temperature: 0.5,
            max_tokens: 2000,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn build_sets_bearer_auth_and_body_shape() {
        let call = build("https://api.openai.com/v1/chat/completions", "gpt-4o", &request(), "sk-1")
            .unwrap();
        assert_eq!(call.method, HttpMethod::Post);
        assert_eq!(call.header("authorization"), Some("Bearer sk-1"));
        let body = call.body.unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.5);
    }

    #[test]
    fn parse_reads_first_choice() {
        let text = parse(r#"{"choices":[{"message":{"content":"hi there"}}]}"#).unwrap();
        assert_eq!(text, "hi there");
    }

    #[test]
    fn parse_rejects_empty_choices() {
        assert!(matches!(
            parse(r#"{"choices":[]}"#),
            Err(CallError::Parse(_))
        ));
    }

    #[test]
    fn parse_rejects_null_content() {
        assert!(parse(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
    }
}
