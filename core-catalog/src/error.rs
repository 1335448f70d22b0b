use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Nothing is reachable without a token, so traversal fails as a
    /// whole instead of producing an empty-but-plausible catalog.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The caller cancelled the traversal.
    #[error("Traversal cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
