//! Amazon S3 backend for Inkwell media uploads.
//!
//! [`S3Uploader`] implements [`inkwell_blob::Uploader`]: objects are written
//! with a private ACL and read back through presigned GET URLs. Region,
//! endpoint override and credentials come from [`AwsBaseConfig`]; without
//! static keys the standard AWS environment credential chain is used.

pub mod auth;
pub mod config;
pub mod error;
pub mod s3;

pub use config::AwsBaseConfig;
pub use error::AwsError;
pub use s3::{S3Config, S3Uploader};
