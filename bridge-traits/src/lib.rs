//! # Bridge Traits
//!
//! Seam traits between the tankview cores and the outside world:
//! - [`http::HttpTransport`] abstracts the HTTP wire so the token exchange
//!   and the drive client can run against mocks in tests
//! - [`storage::StorageClient`] is the typed interface over the remote
//!   file-storage API consumed by diagnostics, catalog and streaming
//! - [`error`] carries the shared transport and storage error taxonomies

pub mod error;
pub mod http;
pub mod storage;

pub use error::{StorageError, StorageResult, TransportError, TransportResult};
pub use http::HttpTransport;
pub use storage::StorageClient;
