//! Caller identity stamped onto created rows.
//!
//! The core never authorizes by role; the role travels along for logging only.

use crate::entities::{Role, user};

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Written to `user_id` / `created_by`
    pub user_id: i64,
    /// Role of the caller, as resolved by the API layer
    pub role: Role,
}

impl Actor {
    /// Creates an actor from an id and role.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Identity used for rows written by seeding and maintenance jobs.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            user_id: 0,
            role: Role::Admin,
        }
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self::new(user.id, user.role)
    }
}
