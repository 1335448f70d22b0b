//! Storage Client Abstraction
//!
//! Typed seam over the remote file-storage API: listing folder children,
//! fetching file metadata and downloading byte ranges. Implemented by
//! `provider-drive` and mocked by the consumers' tests.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// One row of a folder listing, in server listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Folders and server-native documents report no size.
    pub size: Option<u64>,
    pub is_folder: bool,
}

/// A streamable unit, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub parent_id: Option<String>,
}

/// A requested byte span; `end` is inclusive, `None` meaning
/// end-of-asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }
}

/// Bytes returned for one ranged fetch.
///
/// `truncated` is set when the asset ended before the requested span did,
/// so the payload is shorter than asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeData {
    pub bytes: Bytes,
    pub truncated: bool,
}

/// Typed interface over the remote storage API.
///
/// Every operation authenticates internally (the implementation holds its
/// credential provider) and classifies failures into
/// [`StorageError`](crate::error::StorageError). Transient failures are
/// retried with bounded exponential backoff inside the implementation;
/// everything else propagates after a single attempt.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List the children of a folder, ordered by name, paginated to
    /// exhaustion.
    async fn list_children(&self, folder_id: &str) -> StorageResult<Vec<ChildEntry>>;

    /// List items shared directly with this identity. A well-known
    /// reachable location used to probe whether the identity has any
    /// storage visibility at all.
    async fn list_shared_with_me(&self) -> StorageResult<Vec<ChildEntry>>;

    /// One page of anything visible to the identity, with no parent
    /// constraint. Empty output from an otherwise-successful call means
    /// the identity can reach the API but sees nothing.
    async fn list_any_visible(&self) -> StorageResult<Vec<ChildEntry>>;

    /// Fetch metadata for a single file.
    async fn get_metadata(&self, file_id: &str) -> StorageResult<AssetRef>;

    /// Fetch the inclusive byte span `[start, end]` of a file's content.
    ///
    /// Returns exactly the requested span, or fewer bytes with
    /// `truncated = true` when the asset is shorter than requested.
    /// Fails with `RangeNotSatisfiable` when `start` is beyond the asset.
    async fn fetch_range(&self, file_id: &str, start: u64, end: u64) -> StorageResult<RangeData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_entry_serializes_with_folder_flag() {
        let entry = ChildEntry {
            id: "folder1".to_string(),
            name: "cam1".to_string(),
            mime_type: "application/vnd.google-apps.folder".to_string(),
            size: None,
            is_folder: true,
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: ChildEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn byte_range_open_end() {
        let range = ByteRange::new(1024, None);
        assert_eq!(range.start, 1024);
        assert!(range.end.is_none());
    }
}
