use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;

/// Object storage for post media and avatars.
///
/// Implementors provide the actual storage mechanism (e.g. S3 or memory).
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Store `data` under a key derived from `folder`, `filename` and
    /// `owner_id`, and return that key.
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        owner_id: &str,
        data: Bytes,
    ) -> Result<String, BlobError>;

    /// Produce a time-limited URL for reading the object at `key`.
    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, BlobError>;
}
