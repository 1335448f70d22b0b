//! Chunked range assembly over the storage client.

use crate::error::{Result, StreamError};
use bridge_traits::error::StorageError;
use bridge_traits::storage::{AssetRef, ByteRange, StorageClient};
use bytes::{Bytes, BytesMut};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Streaming configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Upper bound on a single fetch, so large ranges never occupy
    /// unbounded memory.
    pub chunk_size: usize,
    /// Metadata cache capacity (assets, not bytes).
    pub metadata_cache_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4 * 1024 * 1024,
            metadata_cache_capacity: 64,
        }
    }
}

/// A correctly-framed partial-content response.
///
/// `start`/`end` are the inclusive span actually served; for a
/// zero-length asset the body is empty and the span is `0..=0` by
/// convention (callers check `total_size`). `truncated` is set when the
/// request asked for bytes past the end of the asset.
#[derive(Debug, Clone)]
pub struct RangeResponse {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
    pub truncated: bool,
    /// The asset's mime type, for the HTTP `Content-Type` header.
    pub mime_type: String,
    pub body: Bytes,
}

impl RangeResponse {
    /// Whether this response covers the whole asset, which lets the HTTP
    /// layer answer 200 instead of 206.
    pub fn is_full_content(&self) -> bool {
        self.start == 0 && (self.total_size == 0 || self.end == self.total_size - 1)
    }
}

/// Serves byte ranges of remote assets through bounded chunked fetches.
///
/// Safe for concurrent use; the only shared state is the per-asset
/// metadata cache, which is append/replace-only.
pub struct StreamProxy {
    storage: Arc<dyn StorageClient>,
    config: StreamConfig,
    metadata: Mutex<LruCache<String, AssetRef>>,
}

impl StreamProxy {
    pub fn new(storage: Arc<dyn StorageClient>, config: StreamConfig) -> Self {
        let capacity = NonZeroUsize::new(config.metadata_cache_capacity.max(1))
            .expect("capacity is clamped to at least 1");
        Self {
            storage,
            config,
            metadata: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Asset metadata, cached per asset id for this proxy's lifetime.
    async fn metadata(&self, asset_id: &str) -> Result<AssetRef> {
        if let Some(asset) = self
            .metadata
            .lock()
            .expect("metadata cache lock poisoned")
            .get(asset_id)
        {
            debug!(asset_id, "Metadata cache hit");
            return Ok(asset.clone());
        }

        let asset = self.storage.get_metadata(asset_id).await?;
        self.metadata
            .lock()
            .expect("metadata cache lock poisoned")
            .put(asset_id.to_string(), asset.clone());
        Ok(asset)
    }

    /// Open a validated range of an asset and return its bytes.
    ///
    /// With no range the whole asset is served. An `end` past the asset
    /// truncates to the actual size and marks the response `truncated`;
    /// a `start` beyond the asset fails with `RangeNotSatisfiable`.
    #[instrument(skip(self, cancel), fields(asset_id = %asset_id))]
    pub async fn open(
        &self,
        asset_id: &str,
        range: Option<ByteRange>,
        cancel: &CancellationToken,
    ) -> Result<RangeResponse> {
        let asset = self.metadata(asset_id).await?;
        let size = asset.size;

        let start = range.map(|r| r.start).unwrap_or(0);
        let requested_end = range.and_then(|r| r.end);

        if size == 0 {
            if start > 0 {
                return Err(StreamError::RangeNotSatisfiable { start, size });
            }
            return Ok(RangeResponse {
                start: 0,
                end: 0,
                total_size: 0,
                truncated: false,
                mime_type: asset.mime_type,
                body: Bytes::new(),
            });
        }

        if start >= size {
            return Err(StreamError::RangeNotSatisfiable { start, size });
        }

        let last = size - 1;
        let truncated_request = requested_end.map(|e| e > last).unwrap_or(false);
        let end = requested_end.unwrap_or(last).min(last);
        if end < start {
            return Err(StreamError::RangeNotSatisfiable { start, size });
        }

        let mut body = BytesMut::with_capacity((end - start + 1) as usize);
        let mut truncated_asset = false;
        let mut chunk_start = start;

        while chunk_start <= end {
            if cancel.is_cancelled() {
                return Err(StreamError::Cancelled);
            }

            let chunk_end = chunk_start
                .saturating_add(self.config.chunk_size as u64 - 1)
                .min(end);

            let fetch = self.storage.fetch_range(asset_id, chunk_start, chunk_end);
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                result = fetch => result,
            };

            match result {
                Ok(data) => {
                    body.extend_from_slice(&data.bytes);
                    if data.truncated {
                        // The asset is shorter than its metadata said;
                        // serve what exists rather than looping forever.
                        warn!(
                            asset_id,
                            expected = size,
                            got = body.len(),
                            "Asset shorter than cached metadata"
                        );
                        truncated_asset = true;
                        break;
                    }
                    chunk_start = chunk_end + 1;
                }
                Err(StorageError::Transient { detail }) => {
                    return Err(StreamError::Interrupted {
                        delivered: body.len() as u64,
                        detail,
                    });
                }
                Err(other) => return Err(StreamError::Storage(other)),
            }
        }

        Ok(RangeResponse {
            start,
            end,
            total_size: size,
            truncated: truncated_request || truncated_asset,
            mime_type: asset.mime_type,
            body: body.freeze(),
        })
    }

    /// The configured chunk size, exposed for response sizing decisions.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }
}
