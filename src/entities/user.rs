//! User entity - Accounts that operate the tracker.
//!
//! The password column holds whatever credential string the caller supplies;
//! hashing happens outside this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of a user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including month record administration
    #[sea_orm(string_value = "admin")]
    Admin,
    /// May manage products
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
    /// Read access
    #[sea_orm(string_value = "user")]
    User,
    /// Registered but not yet approved
    #[default]
    #[sea_orm(string_value = "new_user")]
    NewUser,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique
    #[sea_orm(unique)]
    pub username: String,
    /// Opaque credential supplied by the caller
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Access level
    pub role: Role,
    /// Last time activity was recorded
    pub last_active: Option<DateTimeUtc>,
    /// Accumulated active time in seconds
    pub total_active_time: i64,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
