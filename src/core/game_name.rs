//! Game name catalog - The list of game titles offered when booking products.

use crate::{
    core::{actor::Actor, validation::min_chars},
    entities::{GameName, game_name},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves a game name by id.
///
/// # Errors
/// Returns [`Error::GameNameNotFound`] if no entry has this id.
pub async fn get_game_name(db: &DatabaseConnection, id: i64) -> Result<game_name::Model> {
    GameName::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::GameNameNotFound { id })
}

/// Finds a game name by its exact title.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_game_name_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<game_name::Model>> {
    GameName::find()
        .filter(game_name::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds a game title to the catalog.
///
/// # Errors
/// Returns an error if:
/// - The trimmed name is shorter than 2 characters
/// - The name is already in the catalog
/// - The database insert fails
pub async fn create_game_name(
    db: &DatabaseConnection,
    actor: &Actor,
    name: &str,
) -> Result<game_name::Model> {
    let name = min_chars(name, 2, "Game name must be at least 2 characters")?;

    if get_game_name_by_name(db, &name).await?.is_some() {
        return Err(Error::GameNameExists { name });
    }

    let entry = game_name::ActiveModel {
        name: Set(name),
        created_at: Set(Utc::now()),
        created_by: Set(actor.user_id),
        ..Default::default()
    };
    let entry = entry.insert(db).await?;

    info!(game_name_id = entry.id, name = %entry.name, "Game name added");
    Ok(entry)
}

/// Removes a game title. Products keep their free-text game name.
///
/// # Returns
/// `Ok(false)` if no entry had this id.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn delete_game_name(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = GameName::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// The whole catalog in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_game_names(db: &DatabaseConnection) -> Result<Vec<game_name::Model>> {
    GameName::find()
        .order_by_asc(game_name::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
