use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use inkwell_blob::{BlobError, Uploader, object_key};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsError, classify_sdk_error};

/// Configuration for the S3 uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Shared AWS configuration (region, endpoint URL, credentials).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Bucket holding every uploaded object.
    pub bucket: String,

    /// Key prefix for all objects (e.g. `"inkwell/"`).
    #[serde(default)]
    pub prefix: Option<String>,

    /// Address buckets by path rather than subdomain (needed by most
    /// S3-compatible servers).
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3Config {
    /// Create a new `S3Config` for the given region and bucket.
    pub fn new(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            bucket: bucket.into(),
            prefix: None,
            force_path_style: false,
        }
    }

    /// Set the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the endpoint URL override and switch to path-style addressing.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self.force_path_style = true;
        self
    }

    /// Apply the configured prefix to a key.
    fn prefixed_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_owned(),
        }
    }
}

/// Uploads media to S3 and presigns GET URLs for reading it back.
pub struct S3Uploader {
    config: S3Config,
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Uploader")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3Uploader {
    /// Create a new `S3Uploader` by building an AWS SDK client.
    pub async fn new(config: S3Config) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);
        Self { config, client }
    }

    /// Create an `S3Uploader` with a pre-built client (for testing).
    pub fn with_client(config: S3Config, client: aws_sdk_s3::Client) -> Self {
        Self { config, client }
    }

    /// Check that the bucket is reachable with the configured credentials.
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn health_check(&self) -> Result<(), BlobError> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "S3 health check failed");
                BlobError::from(classify_sdk_error(&e.to_string()))
            })?;
        debug!("S3 health check passed");
        Ok(())
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    #[instrument(skip(self, data), fields(bucket = %self.config.bucket, size = data.len()))]
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        owner_id: &str,
        data: Bytes,
    ) -> Result<String, BlobError> {
        let key = self.config.prefixed_key(&object_key(
            folder,
            filename,
            owner_id,
            Utc::now().timestamp(),
        )?);

        debug!(key = %key, "uploading object to S3");

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::Private)
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                error!(error = %err_str, "S3 put_object failed");
                BlobError::from(classify_sdk_error(&err_str))
            })?;

        info!(key = %key, "S3 object uploaded");
        Ok(key)
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, BlobError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| BlobError::from(AwsError::Configuration(e.to_string())))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| BlobError::Presign(e.to_string()))?;

        Ok(request.uri().to_owned())
    }
}
