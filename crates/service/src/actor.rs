use inkwell_core::Role;

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the caller may read or modify the account `user_id`.
    pub fn can_manage(&self, user_id: &str) -> bool {
        self.is_admin() || self.id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_manage_everyone() {
        let admin = Actor::new("1", Role::Admin);
        assert!(admin.can_manage("1"));
        assert!(admin.can_manage("2"));
    }

    #[test]
    fn others_manage_only_themselves() {
        let user = Actor::new("5", Role::Premium);
        assert!(user.can_manage("5"));
        assert!(!user.can_manage("6"));
    }
}
