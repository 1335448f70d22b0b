//! # Stream Proxy
//!
//! Serves validated byte ranges of remote assets for progressive
//! playback.
//!
//! ## Overview
//!
//! A playback request names an asset and an optional byte range. The
//! proxy resolves the asset's size (cached per asset for the proxy's
//! lifetime), validates the range against it, then satisfies the span
//! with sequential bounded-size range fetches concatenated in order;
//! large ranges never buffer more than one chunk beyond what has already
//! been handed to the caller's response. A chunk that still fails after
//! the storage client's retries interrupts the stream; cancellation
//! aborts the in-flight chunk instead of silently returning partial data.

pub mod error;
pub mod proxy;

pub use error::{Result, StreamError};
pub use proxy::{RangeResponse, StreamConfig, StreamProxy};
