//! Shared test utilities for the product tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    context::TrackerContext,
    core::{Actor, NewMonthRecord, NewProduct, user},
    entities::{self, ProductCategory, Role},
    errors::Result,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Wraps [`setup_test_db`] in a [`TrackerContext`].
pub async fn setup_context() -> Result<TrackerContext> {
    Ok(TrackerContext::new(setup_test_db().await?))
}

/// The caller used to stamp `user_id` / `created_by` in tests.
pub const fn test_actor() -> Actor {
    Actor::new(1, Role::Supervisor)
}

/// Creates an open, active month record starting now.
pub async fn create_test_month_record(
    ctx: &TrackerContext,
    name: &str,
) -> Result<entities::month_record::Model> {
    ctx.month_records
        .create(NewMonthRecord::new(name, Utc::now()))
        .await
}

/// Product payload with sensible defaults.
///
/// # Defaults
/// * name: "Starter Account", game "Valorant", category Game Account
/// * cost 10.0, selling 15.0 (profit 5.0)
/// * date received, status and evidence left to the store
pub fn test_new_product(month_record_id: i64) -> NewProduct {
    NewProduct {
        name: "Starter Account".to_string(),
        game_account: "acc-001".to_string(),
        game_name: "Valorant".to_string(),
        category: ProductCategory::GameAccount,
        date_received: None,
        cost_price: 10.0,
        selling_price: 15.0,
        status: None,
        evidence: None,
        month_record_id,
    }
}

/// Creates a test product with the default prices.
pub async fn create_test_product(
    ctx: &TrackerContext,
    name: &str,
    month_record_id: i64,
) -> Result<entities::product::Model> {
    let new = NewProduct {
        name: name.to_string(),
        ..test_new_product(month_record_id)
    };
    ctx.products.create(&test_actor(), new).await
}

/// Creates a test product with custom prices.
pub async fn create_custom_product(
    ctx: &TrackerContext,
    name: &str,
    month_record_id: i64,
    cost_price: f64,
    selling_price: f64,
) -> Result<entities::product::Model> {
    let new = NewProduct {
        name: name.to_string(),
        cost_price,
        selling_price,
        ..test_new_product(month_record_id)
    };
    ctx.products.create(&test_actor(), new).await
}

/// Registers a user with a placeholder credential.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        user::NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
}
