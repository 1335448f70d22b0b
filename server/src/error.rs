//! HTTP error mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_traits::error::StorageError;
use core_catalog::CatalogError;
use core_stream::StreamError;
use serde::Serialize;

/// Application-level errors surfaced by the HTTP handlers.
///
/// Every user-visible failure carries the remediation category from the
/// diagnostic taxonomy, never a backtrace.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Forbidden(String),
    ScopeInsufficient(String),
    UpstreamAuth(String),
    RangeNotSatisfiable { size: u64 },
    Interrupted(String),
    Cancelled,
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    category: &'static str,
}

impl AppError {
    fn category(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "TARGET_NOT_FOUND",
            AppError::Forbidden(_) => "NEEDS_SHARING",
            AppError::ScopeInsufficient(_) => "NEEDS_SCOPE_FIX",
            AppError::UpstreamAuth(_) => "NEEDS_AUTH_FIX",
            AppError::RangeNotSatisfiable { .. } => "READY",
            AppError::Interrupted(_) | AppError::Cancelled | AppError::Internal(_) => "UNKNOWN",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) | AppError::ScopeInsufficient(_) => StatusCode::FORBIDDEN,
            // The *client's* request was fine; our upstream identity is
            // what failed.
            AppError::UpstreamAuth(_) | AppError::Interrupted(_) => StatusCode::BAD_GATEWAY,
            AppError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::NotFound(m)
            | AppError::Forbidden(m)
            | AppError::ScopeInsufficient(m)
            | AppError::UpstreamAuth(m)
            | AppError::Interrupted(m)
            | AppError::Internal(m) => m.clone(),
            AppError::RangeNotSatisfiable { size } => {
                format!("Requested range is beyond the asset ({} bytes)", size)
            }
            AppError::Cancelled => "Request cancelled by shutdown".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.message(),
            category: self.category(),
        });

        // 416 must disclose the total size so players can re-request.
        if let AppError::RangeNotSatisfiable { size } = &self {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{}", size))],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound { id } => AppError::NotFound(format!("Asset {} not found", id)),
            StorageError::Forbidden { detail, .. } => AppError::Forbidden(detail),
            StorageError::ScopeInsufficient { detail, .. } => AppError::ScopeInsufficient(detail),
            StorageError::Auth { detail } => AppError::UpstreamAuth(detail),
            StorageError::RangeNotSatisfiable { size, .. } => {
                AppError::RangeNotSatisfiable { size }
            }
            StorageError::Transient { detail } => AppError::Interrupted(detail),
            StorageError::Decode(detail) => AppError::Internal(detail),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Auth(detail) => AppError::UpstreamAuth(detail),
            CatalogError::Cancelled => AppError::Cancelled,
        }
    }
}

impl From<StreamError> for AppError {
    fn from(error: StreamError) -> Self {
        match error {
            StreamError::RangeNotSatisfiable { size, .. } => {
                AppError::RangeNotSatisfiable { size }
            }
            StreamError::Interrupted { detail, .. } => AppError::Interrupted(detail),
            StreamError::Cancelled => AppError::Cancelled,
            StreamError::Storage(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_expected_statuses() {
        let cases: Vec<(StorageError, StatusCode)> = vec![
            (
                StorageError::NotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::Forbidden {
                    status: 403,
                    detail: String::new(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                StorageError::Auth {
                    detail: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                StorageError::RangeNotSatisfiable { start: 9, size: 5 },
                StatusCode::RANGE_NOT_SATISFIABLE,
            ),
        ];

        for (error, expected) in cases {
            let app: AppError = error.into();
            assert_eq!(app.status(), expected);
        }
    }

    #[test]
    fn every_error_carries_a_category() {
        let app: AppError = CatalogError::Auth("no token".into()).into();
        assert_eq!(app.category(), "NEEDS_AUTH_FIX");

        let app: AppError = StreamError::Interrupted {
            delivered: 10,
            detail: "flaked".into(),
        }
        .into();
        assert_eq!(app.category(), "UNKNOWN");
    }
}
