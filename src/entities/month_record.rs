//! Month record entity - An accounting period that groups products.
//!
//! A month record is open while `is_locked` is false. Locking closes the period: its
//! products can no longer be updated or deleted, and the period becomes clearable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Month record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "month_records")]
pub struct Model {
    /// Unique identifier for the month record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display label (e.g., "Month 1"), not unique
    pub name: String,
    /// When the period started
    pub start_date: DateTimeUtc,
    /// When the period was locked, None until the first lock
    pub end_date: Option<DateTimeUtc>,
    /// Whether new products may default to this period
    pub is_active: bool,
    /// Whether the period is closed for product writes
    pub is_locked: bool,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `MonthRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One month record has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
