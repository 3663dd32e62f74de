//! HTTP transport seam.
//!
//! Adapters build [`HttpCall`] values; the dispatcher and health monitor
//! execute them through the [`HttpTransport`] trait so every network-facing
//! path can be driven by a scripted transport in tests. The production
//! implementation is a thin wrapper over one shared `reqwest::Client`.

use async_trait::async_trait;

use crate::error::{CallError, MuxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An outbound request, fully built by a wire adapter.
#[derive(Debug, Clone)]
pub struct HttpCall {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpCall {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Header value by name, if set. Test helper for asserting auth shapes.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP exchange. Status interpretation and body parsing are
/// the wire layer's job.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes HTTP calls. Errors are transport-level only; non-2xx replies
/// come back as `Ok` and are classified downstream.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, call: HttpCall) -> Result<HttpReply, CallError>;
}

/// Production transport over a shared `reqwest::Client`.
///
/// Only the connect timeout lives here; per-call deadlines are enforced by
/// the dispatcher around `execute`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: std::time::Duration) -> Result<Self, MuxError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| MuxError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, call: HttpCall) -> Result<HttpReply, CallError> {
        let mut request = match call.method {
            HttpMethod::Get => self.client.get(&call.url),
            HttpMethod::Post => self.client.post(&call.url),
        };
        for (name, value) in &call.headers {
            request = request.header(*name, value);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_finds_set_headers() {
        let call = HttpCall::post("http://x/y", serde_json::json!({}))
            .with_header("authorization", "Bearer k");
        assert_eq!(call.header("authorization"), Some("Bearer k"));
        assert_eq!(call.header("x-api-key"), None);
    }

    #[test]
    fn reply_success_range() {
        assert!(HttpReply::ok("{}").is_success());
        assert!(HttpReply { status: 204, body: String::new() }.is_success());
        assert!(!HttpReply { status: 404, body: String::new() }.is_success());
        assert!(!HttpReply { status: 500, body: String::new() }.is_success());
    }
}
