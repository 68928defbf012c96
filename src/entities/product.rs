//! Product entity - A game account or in-game item held for sale.
//!
//! Every product belongs to exactly one month record. `profit` is stored alongside the
//! two prices and is always `selling_price - cost_price`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of goods a product is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ProductCategory {
    /// A whole game account
    #[sea_orm(string_value = "Game Account")]
    #[serde(rename = "Game Account")]
    GameAccount,
    /// Items, currency or skins inside a game
    #[sea_orm(string_value = "In-Game Items")]
    #[serde(rename = "In-Game Items")]
    InGameItems,
}

/// Sale state of a product
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Still in stock
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    /// Sold to a customer
    #[sea_orm(string_value = "sold")]
    Sold,
}

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Listing name of the product
    pub name: String,
    /// Login or identifier of the game account involved
    pub game_account: String,
    /// Name of the game (free text, usually one of the catalog game names)
    pub game_name: String,
    /// Account or in-game items
    pub category: ProductCategory,
    /// When the product was received, defaults to creation time
    pub date_received: DateTimeUtc,
    /// Purchase price, never negative
    pub cost_price: f64,
    /// Sale price, never negative
    pub selling_price: f64,
    /// `selling_price - cost_price`
    pub profit: f64,
    /// Available or sold
    pub status: ProductStatus,
    /// Optional evidence reference (file name, link, ...)
    pub evidence: Option<String>,
    /// ID of the month record this product is booked under
    pub month_record_id: i64,
    /// ID of the user who created the product
    pub user_id: i64,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one month record
    #[sea_orm(
        belongs_to = "super::month_record::Entity",
        from = "Column::MonthRecordId",
        to = "super::month_record::Column::Id"
    )]
    MonthRecord,
}

impl Related<super::month_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
