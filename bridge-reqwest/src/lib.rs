//! # Reqwest Transport
//!
//! Native [`HttpTransport`](bridge_traits::http::HttpTransport)
//! implementation backed by `reqwest`: pooled connections, rustls TLS and
//! per-request deadlines. One attempt per call; retry policy lives with
//! the callers.

mod transport;

pub use transport::ReqwestTransport;
