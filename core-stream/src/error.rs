use bridge_traits::error::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    /// The requested range starts beyond the end of the asset.
    #[error("Range not satisfiable: start {start} exceeds size {size}")]
    RangeNotSatisfiable { start: u64, size: u64 },

    /// A chunk fetch kept failing transiently after the storage client's
    /// retries. The already-delivered prefix is the caller's to have
    /// consumed; nothing is buffered beyond the current chunk.
    #[error("Stream interrupted after {delivered} bytes: {detail}")]
    Interrupted { delivered: u64, detail: String },

    /// The caller cancelled mid-stream.
    #[error("Stream cancelled")]
    Cancelled,

    /// Non-transient storage failure (missing asset, revoked access,
    /// authentication), surfaced with its classification intact.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, StreamError>;
