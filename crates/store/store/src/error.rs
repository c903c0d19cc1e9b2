use thiserror::Error;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the pool could not be built.
    #[error("connection error: {0}")]
    Connection(String),

    /// A backend I/O or driver error.
    #[error("storage error: {0}")]
    Storage(String),

    /// A document could not be encoded for, or decoded from, the backend.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The query cannot be expressed against this backend's schema.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
