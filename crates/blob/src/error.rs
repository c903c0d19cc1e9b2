use thiserror::Error;

/// Errors that can occur during upload and presign operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Uploads need a file name to derive the storage key from.
    #[error("file name must not be empty")]
    EmptyFilename,

    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// A presigned URL could not be produced.
    #[error("presign failed: {0}")]
    Presign(String),
}
