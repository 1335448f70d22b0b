//! # Drive Storage Provider
//!
//! Implements the [`StorageClient`](bridge_traits::storage::StorageClient)
//! trait for the Drive v3 API.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated folder listing, ordered by name, shared-drive aware
//! - File metadata retrieval
//! - Ranged content download for progressive playback
//! - Status/body classification into the storage error taxonomy
//! - Bounded exponential backoff for transient failures only

pub mod client;
pub mod types;

pub use client::DriveClient;
