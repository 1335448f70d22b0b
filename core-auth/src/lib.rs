//! # Service Identity Authentication
//!
//! Authenticates the non-interactive service identity against the storage
//! provider's token endpoint.
//!
//! ## Overview
//!
//! This crate provides:
//! - Service-account key loading with scope validation
//! - RS256 JWT assertion signing and token exchange
//! - Short-lived access-token caching with an expiry safety margin
//! - Single-flight refresh under concurrent callers
//!
//! The key material stays inside this crate: it is held in memory only,
//! redacted from `Debug` output and discarded when the provider drops.

pub mod credential;
pub mod error;
pub mod provider;

pub use credential::{AccessToken, ServiceAccountKey};
pub use error::{AuthError, Result};
pub use provider::{CredentialProvider, TokenSource};
