use std::time::Duration;

use serde::Deserialize;

/// Media storage for uploaded images, videos and avatars.
///
/// # Example
///
/// ```toml
/// [storage]
/// backend = "s3"
/// bucket = "inkwell-media"
/// region = "eu-west-1"
/// endpoint_url = "http://localhost:9000"
/// presign_ttl_seconds = 900
/// ```
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// `"memory"` or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Bucket for the `s3` backend.
    pub bucket: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint override for S3-compatible servers.
    pub endpoint_url: Option<String>,
    /// Key prefix applied to every object.
    pub prefix: Option<String>,
    /// Lifetime of presigned media links in seconds.
    #[serde(default = "default_presign_ttl")]
    pub presign_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: None,
            region: default_region(),
            endpoint_url: None,
            prefix: None,
            presign_ttl_seconds: default_presign_ttl(),
        }
    }
}

impl StorageConfig {
    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.presign_ttl_seconds)
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_presign_ttl() -> u64 {
    15 * 60
}
