//! HTTP Transport Abstraction
//!
//! A minimal async HTTP seam. Implementations perform a single attempt per
//! call; retry policy belongs to the callers that know which failures are
//! retryable (the storage client), not to the wire.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::TransportResult;

/// HTTP method types used by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP request builder.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Attach an `application/x-www-form-urlencoded` body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self.body = Some(Bytes::from(encoded));
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.body).map_err(|e| e.to_string())
    }

    /// Response body as a lossy UTF-8 string, for error surfaces.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retry policy for operations wrapping transport calls.
///
/// The delays are bounded exponential: `base_delay * factor^attempt`,
/// capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Backoff delay before retry number `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(self.factor.saturating_pow(attempt.saturating_sub(1)));
        exp.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            factor: 2,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Async HTTP transport trait.
///
/// Implementations handle TLS, connection pooling and per-request
/// deadlines. They do NOT retry and do NOT interpret status codes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a single HTTP request attempt.
    async fn execute(&self, request: HttpRequest) -> TransportResult<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_auth_header() {
        let request = HttpRequest::get("https://example.com")
            .header("Accept", "application/json")
            .bearer_token("secret")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer secret".to_string())
        );
        assert_eq!(request.method, HttpMethod::Get);
    }

    #[test]
    fn form_body_is_urlencoded() {
        let request = HttpRequest::post("https://example.com/token")
            .form(&[("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer")]);

        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        assert_eq!(
            body,
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn response_status_checks() {
        let response = HttpResponse {
            status: 206,
            headers: HashMap::new(),
            body: Bytes::from_static(b"chunk"),
        };
        assert!(response.is_success());
    }

    #[test]
    fn retry_delays_are_bounded_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(1), Duration::from_millis(500));
        assert_eq!(policy.delay_before(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_before(3), Duration::from_millis(2000));

        let capped = RetryPolicy {
            max_delay: Duration::from_millis(800),
            ..RetryPolicy::default()
        };
        assert_eq!(capped.delay_before(3), Duration::from_millis(800));
    }
}
