//! Error types for cache operations

/// Errors from a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation failed: {0}")]
    Backend(String),
}

/// Result alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
