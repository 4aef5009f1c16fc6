//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only seam where I/O happens. `UreqTransport` is the
//! production implementation; tests plug in closures that answer from
//! fixtures. Timeouts and connection pooling belong to the transport, which
//! is why `UreqTransport::with_agent` accepts a caller-configured agent.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Largest response body read into memory. Full menus run to a few MB.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Performs one blocking HTTP exchange.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// `Transport` backed by a `ureq` agent.
///
/// The agent is built with `http_status_as_error(false)` so 4xx/5xx responses
/// come back as data; the upstream reports failures in the body.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_agent(agent(None))
    }

    /// A transport whose every request is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_agent(agent(Some(timeout)))
    }

    /// Wrap an agent the caller configured. The agent should be built with
    /// `http_status_as_error(false)`, otherwise non-2xx answers surface as
    /// `TransportError`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

fn agent(timeout: Option<Duration>) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .build()
        .new_agent()
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            (HttpMethod::Post, body) => {
                let mut builder = self.agent.post(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| ApiError::TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse::ok(format!(r#"{{"echo":"{}"}}"#, req.method)))
        };
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://unused.test/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let resp = transport.execute(&req).unwrap();
        assert_eq!(resp.body, r#"{"echo":"GET"}"#);
    }

    #[test]
    fn refused_connection_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://127.0.0.1:{port}/power/store-locator"),
            headers: Vec::new(),
            body: None,
        };
        let err = UreqTransport::with_timeout(Duration::from_secs(2))
            .execute(&req)
            .unwrap_err();
        assert!(matches!(err, ApiError::TransportError(_)));
    }
}
