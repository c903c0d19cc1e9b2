use chrono::{DateTime, Utc};
use inkwell_query::{FieldKind, FieldTypes};
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::role::Role;

/// A post category, optionally restricted to some account roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Category {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub access: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub const COLLECTION: &'static str = "categories";

    pub fn field_types() -> FieldTypes {
        FieldTypes::new()
            .with_field("name", FieldKind::String)
            .with_field("description", FieldKind::String)
            .with_field("access", FieldKind::String)
            .with_field("created_at", FieldKind::Timestamp)
            .with_field("updated_at", FieldKind::Timestamp)
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.name.trim().is_empty() {
            return Err(ContentError::EmptyName);
        }
        Ok(())
    }
}
