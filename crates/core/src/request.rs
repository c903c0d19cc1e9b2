//! Inbound request payloads.

use serde::{Deserialize, Serialize};

use crate::block::{BlockKind, FormatKind, HeadingRange};
use crate::role::Role;

/// Post creation or replacement payload.
///
/// Sent as the `metadata` part of a multipart request; file bytes for media
/// blocks travel in sibling `block_{i}_file` parts keyed by block index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBlogPostRequest {
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<CreateBlockRequest>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBlockRequest {
    /// Zero means "assign from position".
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub order: i64,
    /// Text blocks only.
    #[serde(default)]
    pub paragraphs: Vec<CreateParagraphRequest>,
    /// Heading blocks only.
    #[serde(default)]
    pub heading_level: Option<u8>,
    /// Heading blocks only.
    #[serde(default)]
    pub text: Option<String>,
    /// Image and video blocks only: the original file name.
    #[serde(default)]
    pub filename: String,
}

impl CreateBlockRequest {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: 0,
            kind,
            order: 0,
            paragraphs: Vec::new(),
            heading_level: None,
            text: None,
            filename: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateParagraphRequest {
    /// Ignored; paragraph ids are reassigned by position.
    #[serde(default)]
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub formats: Vec<CreateFormatRequest>,
    #[serde(default)]
    pub headings: Vec<HeadingRange>,
    #[serde(default)]
    pub align: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateFormatRequest {
    #[serde(rename = "type")]
    pub kind: FormatKind,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub hyperlink: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access: Vec<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}
