use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::Regular
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Regular,
    Admin,
}

/// The authenticated user a request is evaluated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub role: Role,
}

/// Posts a viewer is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(Uuid),
}

impl Scope {
    /// Owner filter for SQL binds; `None` means no filter
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::OwnedBy(user_id) => Some(*user_id),
        }
    }

    pub fn includes(&self, owner_id: Uuid) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(user_id) => *user_id == owner_id,
        }
    }
}

impl Viewer {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn scope(&self) -> Scope {
        if self.is_admin() {
            Scope::All
        } else {
            Scope::OwnedBy(self.user_id)
        }
    }

    pub fn can_delete_post(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_by_role() {
        let user_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        let regular = Viewer::new(user_id, Role::Regular);
        assert_eq!(regular.scope(), Scope::OwnedBy(user_id));
        assert!(regular.scope().includes(user_id));
        assert!(!regular.scope().includes(other));

        let admin = Viewer::new(user_id, Role::Admin);
        assert_eq!(admin.scope(), Scope::All);
        assert!(admin.scope().includes(other));
        assert_eq!(admin.scope().owner(), None);
    }

    #[test]
    fn test_post_deletion_rights() {
        let owner = Uuid::new_v4();
        assert!(Viewer::new(owner, Role::Regular).can_delete_post(owner));
        assert!(!Viewer::new(Uuid::new_v4(), Role::Regular).can_delete_post(owner));
        assert!(Viewer::new(Uuid::new_v4(), Role::Admin).can_delete_post(owner));
    }
}
