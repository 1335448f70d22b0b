//! Shared error taxonomies for the transport and storage seams.

use thiserror::Error;

/// Errors surfaced by an [`crate::http::HttpTransport`] implementation.
///
/// A transport failure is always a wire-level problem; HTTP status codes
/// are not errors at this layer and arrive in the response instead.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request did not complete within its deadline.
    #[error("Request timed out")]
    Timeout,

    /// Connection setup or transfer failed.
    #[error("Network error: {0}")]
    Network(String),
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Classified failures of a [`crate::storage::StorageClient`] operation.
///
/// The classification drives both retry policy (only [`Transient`] is
/// retried) and the access diagnostics, so the variants must stay
/// distinguishable: a 403 that merely reflects missing sharing is
/// `Forbidden`, while a 403 whose body reports insufficient token scope
/// is `ScopeInsufficient`.
///
/// [`Transient`]: StorageError::Transient
#[derive(Error, Debug)]
pub enum StorageError {
    /// The identity could not authenticate (token failure or HTTP 401).
    /// Fatal to the whole session: nothing is reachable without a token.
    #[error("Authentication failed: {detail}")]
    Auth { detail: String },

    /// The server refused the operation for this identity (HTTP 403).
    #[error("Access forbidden (status {status}): {detail}")]
    Forbidden { status: u16, detail: String },

    /// The token authenticated but its scopes do not cover the operation.
    #[error("Token scope insufficient (status {status}): {detail}")]
    ScopeInsufficient { status: u16, detail: String },

    /// The resource does not exist or is not visible to this identity;
    /// the API cannot distinguish the two.
    #[error("Not found (or not shared with this identity): {id}")]
    NotFound { id: String },

    /// The requested range starts beyond the end of the asset.
    #[error("Range not satisfiable: start {start} exceeds size {size}")]
    RangeNotSatisfiable { start: u64, size: u64 },

    /// Retryable failure: server error, throttling, timeout or a broken
    /// connection. Surfaced only after the retries are exhausted.
    #[error("Transient storage failure: {detail}")]
    Transient { detail: String },

    /// The server answered with a body this client could not parse.
    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

impl StorageError {
    /// Whether the operation may be retried with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient { .. })
    }

    /// The HTTP status associated with this classification, when there
    /// is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StorageError::Forbidden { status, .. } => Some(*status),
            StorageError::ScopeInsufficient { status, .. } => Some(*status),
            StorageError::NotFound { .. } => Some(404),
            StorageError::RangeNotSatisfiable { .. } => Some(416),
            StorageError::Auth { .. } => Some(401),
            StorageError::Transient { .. } | StorageError::Decode(_) => None,
        }
    }
}

impl From<TransportError> for StorageError {
    fn from(error: TransportError) -> Self {
        StorageError::Transient {
            detail: error.to_string(),
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StorageError::Transient {
            detail: "503".into()
        }
        .is_transient());
        assert!(!StorageError::NotFound { id: "x".into() }.is_transient());
        assert!(!StorageError::Forbidden {
            status: 403,
            detail: String::new()
        }
        .is_transient());
    }

    #[test]
    fn transport_errors_map_to_transient() {
        let err: StorageError = TransportError::Timeout.into();
        assert!(err.is_transient());
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(
            StorageError::NotFound { id: "f".into() }.http_status(),
            Some(404)
        );
        assert_eq!(
            StorageError::RangeNotSatisfiable { start: 10, size: 5 }.http_status(),
            Some(416)
        );
        assert_eq!(
            StorageError::Transient { detail: "".into() }.http_status(),
            None
        );
    }
}
