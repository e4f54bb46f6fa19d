//! HTTP plumbing behind the API client.

use serde_json::Value;
use std::fmt;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

const USER_AGENT: &str = concat!("asc-helper/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

/// One REST call, minus authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::Patch,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// The exchange could not be completed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Request { url: String, reason: String },
    ReadBody { url: String, reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request { url, reason } => {
                write!(f, "request to {} failed: {}", url, reason)
            }
            TransportError::ReadBody { url, reason } => {
                write!(f, "failed to read response from {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Sends an authenticated request and returns the response regardless of status.
pub trait Transport {
    fn send(
        &self,
        request: &ApiRequest,
        authorization: &str,
    ) -> Result<ApiResponse, TransportError>;
}

/// Blocking HTTPS transport built on `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        UreqTransport { agent }
    }

    fn send_with_body(
        builder: RequestBuilder<WithBody>,
        request: &ApiRequest,
        authorization: &str,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let mut builder = builder
            .header("Authorization", authorization)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json");
        for (key, value) in &request.query {
            builder = builder.query(key, value);
        }
        match &request.body {
            Some(body) => builder.send_json(body),
            None => builder.send_empty(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: &ApiRequest,
        authorization: &str,
    ) -> Result<ApiResponse, TransportError> {
        log::debug!("{} {}", request.method, request.url);

        let result = match request.method {
            Method::Get => {
                let mut builder = self
                    .agent
                    .get(&request.url)
                    .header("Authorization", authorization)
                    .header("User-Agent", USER_AGENT)
                    .header("Accept", "application/json");
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                builder.call()
            }
            Method::Post => {
                Self::send_with_body(self.agent.post(&request.url), request, authorization)
            }
            Method::Patch => {
                Self::send_with_body(self.agent.patch(&request.url), request, authorization)
            }
        };

        let mut response = result.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::ReadBody {
                url: request.url.clone(),
                reason: e.to_string(),
            })?;

        log::debug!("{} {} -> {}", request.method, request.url, status);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builders_set_method_and_body() {
        let get =
            ApiRequest::get("https://example.test/v1/apps").with_query("filter[bundleId]", "a.b");
        assert_eq!(get.method, Method::Get);
        assert_eq!(get.query, vec![("filter[bundleId]".to_string(), "a.b".to_string())]);
        assert!(get.body.is_none());

        let post = ApiRequest::post("https://example.test/v1/apps", json!({"data": {}}));
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.body, Some(json!({"data": {}})));

        let patch = ApiRequest::patch("https://example.test/v1/apps/1", json!({}));
        assert_eq!(patch.method.to_string(), "PATCH");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = UreqTransport::new();
        let request = ApiRequest::get("http://127.0.0.1:9/v1/apps");
        let result = transport.send(&request, "Bearer x");
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
