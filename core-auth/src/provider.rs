//! Credential provider: token exchange and single-flight caching.

use crate::credential::{AccessToken, ServiceAccountKey};
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use bridge_traits::http::{HttpRequest, HttpTransport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Tokens within this margin of expiry are refreshed instead of handed
/// out, so a caller never receives a token that dies mid-request.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime claimed for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// OAuth 2.0 grant type for service-identity assertions.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Deadline for one token-exchange request.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of access tokens for components making authenticated calls.
///
/// The seam exists so the storage client and the diagnostics can run
/// against canned tokens in tests; production code uses
/// [`CredentialProvider`].
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A currently-valid access token.
    async fn token(&self) -> Result<AccessToken>;

    /// The authenticated identity's email, for reports and sharing hints.
    fn identity_email(&self) -> &str;
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Issues short-lived access tokens for the service identity.
///
/// The provider owns the key material exclusively. Each call returns the
/// cached token unless it is near expiry; otherwise a token exchange runs
/// while the cache lock is held, so concurrent refreshers converge on a
/// single outbound exchange (single-flight). No retries happen here;
/// retry policy belongs to the storage client wrapping calls that use the
/// token.
pub struct CredentialProvider {
    key: ServiceAccountKey,
    transport: Arc<dyn HttpTransport>,
    cached: Mutex<Option<AccessToken>>,
}

impl CredentialProvider {
    pub fn new(key: ServiceAccountKey, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            key,
            transport,
            cached: Mutex::new(None),
        }
    }

    /// The identity email, for diagnostics and remediation hints.
    pub fn identity_email(&self) -> &str {
        &self.key.client_email
    }

    /// Get a valid access token, refreshing if the cached one is absent
    /// or near expiry.
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired_with_margin(TOKEN_EXPIRY_MARGIN_SECS) {
                debug!("Returning cached access token");
                return Ok(token.clone());
            }
            debug!("Cached token near expiry, refreshing");
        }

        // The lock stays held across the exchange: late arrivals wait
        // here and find the fresh token instead of issuing their own.
        let token = self.exchange().await?;
        info!(expires_at = %token.expires_at, "Access token refreshed");
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Perform one token exchange against the configured endpoint.
    async fn exchange(&self) -> Result<AccessToken> {
        let assertion = self.sign_assertion()?;

        let request = HttpRequest::post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .timeout(EXCHANGE_TIMEOUT);

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.is_success() {
            let detail = response.text_lossy();
            warn!(status = response.status, "Token exchange rejected");
            // An expired or revoked assertion comes back as a grant
            // error naming expiry; everything else is a plain rejection.
            if response.status == 400 && detail.contains("expired") {
                return Err(AuthError::Expired(detail));
            }
            return Err(AuthError::RejectedByServer {
                status: response.status,
                detail,
            });
        }

        let payload: TokenResponse = response.json().map_err(|e| AuthError::RejectedByServer {
            status: response.status,
            detail: format!("Unparseable token response: {}", e),
        })?;

        Ok(AccessToken::new(payload.access_token, payload.expires_in))
    }

    fn sign_assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: self.key.scope_string(),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        jsonwebtoken::encode(&header, &claims, &self.key.signing_key()?)
            .map_err(|e| AuthError::MalformedKey(format!("Failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl TokenSource for CredentialProvider {
    async fn token(&self) -> Result<AccessToken> {
        CredentialProvider::token(self).await
    }

    fn identity_email(&self) -> &str {
        CredentialProvider::identity_email(self)
    }
}
