use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use crate::error::BlobError;
use crate::media::object_key;
use crate::uploader::Uploader;

/// One recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub key: String,
    pub folder: String,
    pub filename: String,
    pub content_type: String,
    pub owner_id: String,
    pub data: Bytes,
}

/// In-memory uploader. Suitable for development and testing.
///
/// Every upload is recorded in order. Presigned URLs take the form
/// `memory://{key}?expires={secs}`.
pub struct MemoryUploader {
    /// Upload sequence -> record.
    uploads: DashMap<u64, UploadRecord>,
    seq: AtomicU64,
    fail_presign: AtomicBool,
}

impl MemoryUploader {
    /// Create a new empty uploader.
    pub fn new() -> Self {
        Self {
            uploads: DashMap::new(),
            seq: AtomicU64::new(0),
            fail_presign: AtomicBool::new(false),
        }
    }

    /// Make every subsequent presign fail (or succeed again).
    pub fn set_fail_presign(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::Relaxed);
    }

    /// All uploads so far, oldest first.
    pub fn uploads(&self) -> Vec<UploadRecord> {
        let mut records: Vec<(u64, UploadRecord)> = self
            .uploads
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, r)| r).collect()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.uploads.iter().any(|entry| entry.value().key == key)
    }
}

impl Default for MemoryUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Uploader for MemoryUploader {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        owner_id: &str,
        data: Bytes,
    ) -> Result<String, BlobError> {
        let key = object_key(folder, filename, owner_id, Utc::now().timestamp())?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        debug!(%key, size = data.len(), "object stored in memory");
        self.uploads.insert(
            seq,
            UploadRecord {
                key: key.clone(),
                folder: folder.to_owned(),
                filename: filename.to_owned(),
                content_type: content_type.to_owned(),
                owner_id: owner_id.to_owned(),
                data,
            },
        );
        Ok(key)
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, BlobError> {
        if self.fail_presign.load(Ordering::Relaxed) {
            return Err(BlobError::Presign(format!("presign disabled for {key}")));
        }
        if !self.contains_key(key) {
            return Err(BlobError::NotFound(key.to_owned()));
        }
        Ok(format!("memory://{key}?expires={}", ttl.as_secs()))
    }
}
