use chrono::{DateTime, Utc};
use inkwell_query::{FieldKind, FieldTypes};
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::status::AccountStatus;

/// A user account.
///
/// `password` holds the argon2 hash. API responses use a separate view type
/// that never carries it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: AccountStatus,
    pub role: Role,
    pub avatar: String,
    pub avatar_folder: String,
    pub wallet_balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const TABLE: &'static str = "users";

    /// Field kinds for raw user queries. `id` is a numeric identifier.
    pub fn field_types() -> FieldTypes {
        FieldTypes::new()
            .with_field("first_name", FieldKind::String)
            .with_field("last_name", FieldKind::String)
            .with_field("username", FieldKind::String)
            .with_field("email", FieldKind::String)
            .with_field("password", FieldKind::String)
            .with_field("status", FieldKind::String)
            .with_field("role", FieldKind::String)
            .with_field("avatar", FieldKind::String)
            .with_field("avatar_folder", FieldKind::String)
            .with_field("wallet_balance", FieldKind::Float)
            .with_field("created_at", FieldKind::Timestamp)
            .with_field("updated_at", FieldKind::Timestamp)
    }
}

/// Public view of a [`User`]; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
    pub role: Role,
    pub avatar: String,
    pub avatar_folder: String,
    /// Presigned URL for the avatar, filled in on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_link: Option<String>,
    pub wallet_balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            status: user.status,
            role: user.role,
            avatar: user.avatar,
            avatar_folder: user.avatar_folder,
            avatar_link: None,
            wallet_balance: user.wallet_balance,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_drops_password_hash() {
        let user = User {
            id: Some("7".into()),
            email: "ada@example.com".into(),
            password: "$argon2id$secret".into(),
            role: Role::Admin,
            ..User::default()
        };
        let json = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password").is_none());
        assert!(json.get("avatar_link").is_none());
    }

    #[test]
    fn password_is_a_string_field() {
        assert_eq!(
            User::field_types().kind_of("password"),
            Some(FieldKind::String)
        );
        assert_eq!(User::field_types().kind_of("id"), Some(FieldKind::Identifier));
    }
}
