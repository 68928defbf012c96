//! Game name entity - Catalog of game titles offered in product forms.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Game name database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_names")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Game title, unique across the catalog
    #[sea_orm(unique)]
    pub name: String,
    /// When the entry was added
    pub created_at: DateTimeUtc,
    /// ID of the user who added the entry
    pub created_by: i64,
}

/// `GameName` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
