//! Drive API response types
//!
//! Data structures for deserializing Drive API v3 responses.

use bridge_traits::storage::{AssetRef, ChildEntry};
use serde::Deserialize;

/// Mime type marking a folder resource.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Drive API file resource, reduced to the fields this system requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// File size in bytes, serialized as a decimal string; omitted for
    /// folders and server-native documents
    #[serde(default)]
    pub size: Option<String>,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,

    /// Whether file is trashed
    #[serde(default)]
    pub trashed: bool,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn into_child_entry(self) -> ChildEntry {
        let is_folder = self.is_folder();
        let size = self.size_bytes();
        ChildEntry {
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            size,
            is_folder,
        }
    }

    pub fn into_asset_ref(self) -> AssetRef {
        let size = self.size_bytes().unwrap_or(0);
        let parent_id = self.parents.first().cloned();
        AssetRef {
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            size,
            parent_id,
        }
    }
}

/// Drive API files.list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for the next page
    pub next_page_token: Option<String>,
}

/// Error body shape the API uses for non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub errors: Vec<ApiErrorReason>,

    /// Top-level status string, e.g. `PERMISSION_DENIED`.
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorReason {
    #[serde(default)]
    pub reason: String,
}
