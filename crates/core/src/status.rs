use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a blog post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PostStatus {
    #[default]
    Active,
    Inactive,
    Deleted,
    Archived,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AccountStatus {
    Active,
    Inactive,
    #[default]
    Pending,
    Suspended,
    Banned,
    Deleted,
    Archived,
}

impl AccountStatus {
    /// Parse a status from a string, ignoring case.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "pending" => Some(Self::Pending),
            "suspended" => Some(Self::Suspended),
            "banned" => Some(Self::Banned),
            "deleted" => Some(Self::Deleted),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
            Self::Deleted => "deleted",
            Self::Archived => "archived",
        }
    }

    /// Whether an account in this status may sign in and call protected routes.
    pub fn can_sign_in(self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PostStatus::Deleted).unwrap(),
            "\"deleted\""
        );
    }

    #[test]
    fn account_status_sign_in_rules() {
        assert!(AccountStatus::Active.can_sign_in());
        assert!(AccountStatus::Pending.can_sign_in());
        for status in [
            AccountStatus::Inactive,
            AccountStatus::Suspended,
            AccountStatus::Banned,
            AccountStatus::Deleted,
            AccountStatus::Archived,
        ] {
            assert!(!status.can_sign_in(), "{status}");
        }
    }

    #[test]
    fn account_status_round_trips_through_loose_parse() {
        assert_eq!(
            AccountStatus::from_str_loose("Banned"),
            Some(AccountStatus::Banned)
        );
        assert_eq!(AccountStatus::from_str_loose("gone"), None);
    }
}
