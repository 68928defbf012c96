//! Task entity - Work items assigned between users.
//!
//! `assigned_to` and `created_by` are plain user ids; the tracker does not enforce
//! that they reference existing users.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress of a task
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Newly created
    #[default]
    #[sea_orm(string_value = "started")]
    Started,
    /// Being worked on
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Done
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Started, in progress or completed
    pub status: TaskStatus,
    /// Optional deadline
    pub due_date: Option<DateTimeUtc>,
    /// User the task is assigned to, if any
    pub assigned_to: Option<i64>,
    /// User who created the task
    pub created_by: i64,
    /// When the task was created
    pub created_at: DateTimeUtc,
}

/// `Task` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
