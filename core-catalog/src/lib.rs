//! # Asset Catalog
//!
//! Discovers playable video assets under a folder tree.
//!
//! ## Overview
//!
//! The resolver walks the tree breadth-first through
//! [`StorageClient::list_children`](bridge_traits::storage::StorageClient),
//! keeping children whose mime type is on the configured video allow-list.
//! The walk is bounded in depth, guarded against folder cycles, and
//! tolerant of unreachable subtrees: a subfolder the identity cannot list
//! becomes a skip record instead of failing the discovery of its siblings.
//! Sibling folders list concurrently with a bounded worker count; results
//! merge back in listing order so output is deterministic.

pub mod error;
pub mod resolver;

pub use error::{CatalogError, Result};
pub use resolver::{AssetResolver, Resolution, SkippedFolder};
