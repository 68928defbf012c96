//! User business logic - Accounts, roles and activity tracking.
//!
//! Credentials are stored as given; callers hash them first. Roles are recorded here
//! but enforced by the API layer.

use crate::{
    core::validation::min_chars,
    entities::{Role, User, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info};

const USERNAME_MESSAGE: &str = "Username must be at least 3 characters";

/// Payload for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Login name, at least 3 characters
    pub username: String,
    /// Already-hashed credential
    pub password_hash: String,
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    /// New login name
    #[serde(default)]
    pub username: Option<String>,
    /// New role (promotion or demotion)
    #[serde(default)]
    pub role: Option<Role>,
}

/// Retrieves a user by id.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if no user has this id.
pub async fn get_user(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id })
}

/// Finds a user by login name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a user. New accounts always start as [`Role::NewUser`].
///
/// # Errors
/// Returns an error if:
/// - The username is shorter than 3 characters
/// - The credential is empty
/// - The username is already taken
/// - The database insert fails
pub async fn create_user(db: &DatabaseConnection, new: NewUser) -> Result<user::Model> {
    let username = min_chars(&new.username, 3, USERNAME_MESSAGE)?;
    if new.password_hash.is_empty() {
        return Err(Error::validation("Password is required"));
    }

    if get_user_by_username(db, &username).await?.is_some() {
        return Err(Error::UsernameTaken { username });
    }

    let user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(new.password_hash),
        role: Set(Role::NewUser),
        last_active: Set(None),
        total_active_time: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;

    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Applies a partial update to a user.
///
/// # Errors
/// Returns an error if the user does not exist, the new username is invalid or
/// taken, or the database update fails.
pub async fn update_user(db: &DatabaseConnection, id: i64, patch: UserPatch) -> Result<user::Model> {
    let existing = get_user(db, id).await?;
    let mut active: user::ActiveModel = existing.clone().into();
    let mut changed = false;

    if let Some(username) = patch.username.as_deref() {
        let username = min_chars(username, 3, USERNAME_MESSAGE)?;
        if username != existing.username {
            if get_user_by_username(db, &username).await?.is_some() {
                return Err(Error::UsernameTaken { username });
            }
            active.username = Set(username);
            changed = true;
        }
    }
    if let Some(role) = patch.role {
        active.role = Set(role);
        changed = true;
    }

    if !changed {
        return Ok(existing);
    }
    let updated = active.update(db).await?;
    info!(user_id = id, role = ?updated.role, "User updated");
    Ok(updated)
}

/// Deletes a user.
///
/// # Returns
/// `Ok(false)` if no user had this id.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn delete_user(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = User::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Replaces a user's credential.
///
/// # Returns
/// `Ok(false)` if no user had this id.
///
/// # Errors
/// Returns an error if the credential is empty or the database update fails.
pub async fn reset_password(
    db: &DatabaseConnection,
    id: i64,
    new_password_hash: String,
) -> Result<bool> {
    if new_password_hash.is_empty() {
        return Err(Error::validation("Password is required"));
    }

    let result = User::update_many()
        .col_expr(user::Column::PasswordHash, Expr::value(new_password_hash))
        .filter(user::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Seconds to credit between the previous activity stamp and `now`.
///
/// The first stamp credits nothing; a clock that went backwards credits nothing.
#[must_use]
pub fn active_seconds_since(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    last_active.map_or(0, |last| (now - last).num_seconds().max(0))
}

/// Stamps activity for a user and adds the elapsed time to their total.
///
/// # Returns
/// `Ok(false)` if no user had this id.
///
/// # Errors
/// Returns an error if the database update fails.
pub async fn record_activity(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let Some(existing) = User::find_by_id(id).one(db).await? else {
        return Ok(false);
    };

    let now = Utc::now();
    let elapsed = active_seconds_since(existing.last_active, now);
    let total = existing.total_active_time + elapsed;

    let mut active: user::ActiveModel = existing.into();
    active.last_active = Set(Some(now));
    active.total_active_time = Set(total);
    active.update(db).await?;

    debug!(user_id = id, elapsed, "Activity recorded");
    Ok(true)
}

/// All users in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
