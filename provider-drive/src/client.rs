//! Drive API client implementation
//!
//! Implements the `StorageClient` trait against the Drive v3 API.

use async_trait::async_trait;
use bridge_traits::error::{StorageError, StorageResult};
use bridge_traits::http::{HttpRequest, HttpResponse, HttpTransport, RetryPolicy};
use bridge_traits::storage::{AssetRef, ChildEntry, RangeData, StorageClient};
use core_auth::TokenSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::types::{ApiErrorBody, DriveFile, FilesListResponse};

/// Drive API base URL.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per listing page (API limit).
const MAX_PAGE_SIZE: u32 = 1000;

/// Fields requested for file resources.
const FILE_FIELDS: &str = "id,name,mimeType,size,parents,trashed";

/// Shared-drive visibility parameters, applied to every listing and
/// metadata call; service identities commonly live on shared drives.
const SHARED_DRIVE_PARAMS: &str = "supportsAllDrives=true&includeItemsFromAllDrives=true";

/// Deadlines per request kind.
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Markers in a 403 body that mean the token's scope is too narrow, as
/// opposed to the folder simply not being shared with the identity.
const SCOPE_MARKERS: &[&str] = &[
    "insufficientPermissions",
    "insufficientFilePermissions",
    "ACCESS_TOKEN_SCOPE_INSUFFICIENT",
];

/// Drive API client.
///
/// Authenticates through a [`TokenSource`] and classifies every failure
/// into the storage taxonomy. Transient failures (5xx, 429, wire errors)
/// retry with bounded exponential backoff; everything else propagates
/// after a single attempt.
pub struct DriveClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenSource>,
    retry: RetryPolicy,
}

impl DriveClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            transport,
            tokens,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn bearer(&self) -> StorageResult<String> {
        let token = self.tokens.token().await.map_err(|e| StorageError::Auth {
            detail: e.to_string(),
        })?;
        Ok(token.value)
    }

    /// Execute a GET with retry on transient classifications only.
    ///
    /// `resource_id` feeds the NotFound classification; `range` adds a
    /// `Range` header for content downloads.
    async fn get_with_retry(
        &self,
        url: &str,
        resource_id: &str,
        range: Option<&str>,
        timeout: Duration,
    ) -> StorageResult<HttpResponse> {
        let mut attempt = 1u32;

        loop {
            let mut request = HttpRequest::get(url)
                .bearer_token(self.bearer().await?)
                .header("Accept", "application/json")
                .timeout(timeout);
            if let Some(range_value) = range {
                request = request.header("Range", range_value);
            }

            let outcome = match self.transport.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => classify_response(&response, resource_id),
                Err(e) => StorageError::from(e),
            };

            if !outcome.is_transient() || attempt >= self.retry.max_attempts {
                if outcome.is_transient() {
                    warn!(
                        url,
                        attempts = attempt,
                        "Request failed after exhausting retries"
                    );
                }
                return Err(outcome);
            }

            let delay = self.retry.delay_before(attempt);
            debug!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Run a files.list query, paginating to exhaustion when
    /// `paginate` is set.
    async fn list_query(
        &self,
        query: &str,
        page_size: u32,
        paginate: bool,
    ) -> StorageResult<Vec<ChildEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files?q={}&orderBy=name&pageSize={}&fields=nextPageToken,files({})&{}",
                DRIVE_API_BASE,
                urlencoding::encode(query),
                page_size,
                FILE_FIELDS,
                SHARED_DRIVE_PARAMS,
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self.get_with_retry(&url, query, None, LIST_TIMEOUT).await?;
            let page: FilesListResponse = response
                .json()
                .map_err(|e| StorageError::Decode(format!("files.list response: {}", e)))?;

            entries.extend(
                page.files
                    .into_iter()
                    .filter(|f| !f.trashed)
                    .map(DriveFile::into_child_entry),
            );

            match page.next_page_token {
                Some(token) if paginate => page_token = Some(token),
                _ => return Ok(entries),
            }
        }
    }
}

/// Classify a non-success response into the storage taxonomy.
fn classify_response(response: &HttpResponse, resource_id: &str) -> StorageError {
    let status = response.status;
    let body = response.text_lossy();

    match status {
        401 => StorageError::Auth {
            detail: format!("Token rejected by storage API: {}", body),
        },
        403 => {
            let detail = api_error_message(&body).unwrap_or_else(|| body.clone());
            if SCOPE_MARKERS.iter().any(|marker| body.contains(marker)) {
                StorageError::ScopeInsufficient { status, detail }
            } else {
                StorageError::Forbidden { status, detail }
            }
        }
        404 => StorageError::NotFound {
            id: resource_id.to_string(),
        },
        416 => StorageError::RangeNotSatisfiable {
            start: 0,
            size: content_range_total(response).unwrap_or(0),
        },
        429 => StorageError::Transient {
            detail: "Rate limited (429)".to_string(),
        },
        s if (500..600).contains(&s) => StorageError::Transient {
            detail: format!("Server error (status {}): {}", s, body),
        },
        s => StorageError::Decode(format!("Unexpected API status {}: {}", s, body)),
    }
}

/// Pull the human-readable message out of an API error body, if the body
/// has the standard shape.
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}

/// Total size from a `Content-Range: bytes */SIZE` header, which a 416
/// response carries when the server knows the asset size.
fn content_range_total(response: &HttpResponse) -> Option<u64> {
    response
        .headers
        .get("content-range")
        .and_then(|v| v.rsplit('/').next())
        .and_then(|total| total.trim().parse().ok())
}

#[async_trait]
impl StorageClient for DriveClient {
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    async fn list_children(&self, folder_id: &str) -> StorageResult<Vec<ChildEntry>> {
        let query = format!("'{}' in parents and trashed=false", folder_id);
        let entries = self.list_query(&query, MAX_PAGE_SIZE, true).await;

        // The query string is what traveled to the server, but callers
        // asked about the folder; report NotFound against its id.
        let entries = entries.map_err(|e| match e {
            StorageError::NotFound { .. } => StorageError::NotFound {
                id: folder_id.to_string(),
            },
            other => other,
        })?;

        debug!(count = entries.len(), "Listed folder children");
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn list_shared_with_me(&self) -> StorageResult<Vec<ChildEntry>> {
        self.list_query("sharedWithMe=true and trashed=false", 100, false)
            .await
    }

    #[instrument(skip(self))]
    async fn list_any_visible(&self) -> StorageResult<Vec<ChildEntry>> {
        // One small page with no parent constraint; existence is the
        // signal, not completeness.
        self.list_query("trashed=false", 10, false).await
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get_metadata(&self, file_id: &str) -> StorageResult<AssetRef> {
        let url = format!(
            "{}/files/{}?fields={}&supportsAllDrives=true",
            DRIVE_API_BASE, file_id, FILE_FIELDS
        );

        let response = self
            .get_with_retry(&url, file_id, None, LIST_TIMEOUT)
            .await?;
        let file: DriveFile = response
            .json()
            .map_err(|e| StorageError::Decode(format!("file metadata: {}", e)))?;

        if file.trashed {
            return Err(StorageError::NotFound {
                id: file_id.to_string(),
            });
        }

        Ok(file.into_asset_ref())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn fetch_range(&self, file_id: &str, start: u64, end: u64) -> StorageResult<RangeData> {
        let url = format!(
            "{}/files/{}?alt=media&supportsAllDrives=true",
            DRIVE_API_BASE, file_id
        );
        let range_header = format!("bytes={}-{}", start, end);

        let response = self
            .get_with_retry(&url, file_id, Some(&range_header), DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| match e {
                StorageError::RangeNotSatisfiable { size, .. } => {
                    StorageError::RangeNotSatisfiable { start, size }
                }
                other => other,
            })?;

        let requested = end.saturating_sub(start) + 1;

        let bytes = if response.status == 200 {
            // Server ignored the range and sent full content; carve the
            // span out locally.
            let full = response.body;
            let len = full.len() as u64;
            if start >= len && len > 0 {
                return Err(StorageError::RangeNotSatisfiable { start, size: len });
            }
            if len == 0 {
                full
            } else {
                let span_end = (start + requested).min(len);
                full.slice(start as usize..span_end as usize)
            }
        } else {
            response.body
        };

        let truncated = (bytes.len() as u64) < requested;
        if truncated {
            debug!(
                got = bytes.len(),
                requested, "Asset shorter than requested span"
            );
        }

        Ok(RangeData { bytes, truncated })
    }
}
