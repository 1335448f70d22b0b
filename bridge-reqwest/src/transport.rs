//! HTTP transport implementation using reqwest.

use async_trait::async_trait;
use bridge_traits::error::{TransportError, TransportResult};
use bridge_traits::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Reqwest-based HTTP transport.
///
/// Provides connection pooling, TLS and per-request timeouts. Does not
/// retry and does not interpret status codes; both are caller concerns.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default 30 s request deadline.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a transport with a custom default request deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("tankview/0.1.0")
            .build()
            .expect("reqwest client construction only fails on TLS backend misconfiguration");

        Self { client }
    }

    /// Wrap an already-configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(Self::convert_method(request.method), &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let url = request.url.clone();
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        debug!(status, url = %url, "HTTP request completed");

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(|e| classify(&e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Network(format!("Connection failed: {}", error))
    } else {
        TransportError::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_conversion() {
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestTransport::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
    }

    #[tokio::test]
    async fn transport_constructs() {
        let _transport = ReqwestTransport::new();
    }
}
