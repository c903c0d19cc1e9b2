use chrono::{DateTime, Utc};
use inkwell_query::{FieldKind, FieldTypes};
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::ContentError;
use crate::status::PostStatus;

/// A blog post. Owns its blocks, paragraphs and formats.
///
/// Every field has a serde default so that projected reads (which omit
/// fields) still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BlogPost {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub author_id: String,
    pub categories: Vec<String>,
    pub title: String,
    pub blocks: Vec<Block>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub const COLLECTION: &'static str = "blog_posts";

    /// Field kinds used to coerce raw filter values against posts.
    pub fn field_types() -> FieldTypes {
        FieldTypes::new()
            .with_field("title", FieldKind::String)
            .with_field("author_id", FieldKind::String)
            .with_field("categories", FieldKind::String)
            .with_field("status", FieldKind::String)
            .with_field("created_at", FieldKind::Timestamp)
            .with_field("updated_at", FieldKind::Timestamp)
    }

    /// Check the title and every block.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() {
            return Err(ContentError::EmptyTitle);
        }
        self.blocks
            .iter()
            .enumerate()
            .try_for_each(|(i, block)| block.validate(i))
    }
}
