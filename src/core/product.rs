//! Product business logic - Handles all product-related operations.
//!
//! Products are booked under a month record. Creating a product only requires the
//! month record to exist; updating or deleting one is refused while its month record
//! is locked. The lock check and the write share one period guard and one database
//! transaction, so a concurrent `lock` either lands before the check (and the write
//! fails) or after the commit.

use crate::{
    core::{
        actor::Actor,
        month_record::{ensure_unlocked, find_month_record},
        period_guard::PeriodGuards,
        validation::{double_option, min_chars, price, profit},
    },
    entities::{Product, ProductCategory, ProductStatus, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const NAME_MESSAGE: &str = "Product name must be at least 3 characters";
const GAME_ACCOUNT_MESSAGE: &str = "Game account information is required";
const GAME_NAME_MESSAGE: &str = "Game name is required";
const COST_PRICE_MESSAGE: &str = "Cost price must be a positive number";
const SELLING_PRICE_MESSAGE: &str = "Selling price must be a positive number";

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Listing name, at least 3 characters
    pub name: String,
    /// Game account reference, required
    pub game_account: String,
    /// Game title, required
    pub game_name: String,
    /// Account or in-game items
    pub category: ProductCategory,
    /// Defaults to now
    #[serde(default)]
    pub date_received: Option<DateTimeUtc>,
    /// Non-negative purchase price
    pub cost_price: f64,
    /// Non-negative sale price
    pub selling_price: f64,
    /// Defaults to available
    #[serde(default)]
    pub status: Option<ProductStatus>,
    /// Optional evidence reference
    #[serde(default)]
    pub evidence: Option<String>,
    /// Month record to book the product under
    pub month_record_id: i64,
}

/// Partial update of a product. `None` leaves a field untouched.
///
/// `profit` is not patchable; it follows the prices.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    /// New listing name
    #[serde(default)]
    pub name: Option<String>,
    /// New game account reference
    #[serde(default)]
    pub game_account: Option<String>,
    /// New game title
    #[serde(default)]
    pub game_name: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<ProductCategory>,
    /// New receive date
    #[serde(default)]
    pub date_received: Option<DateTimeUtc>,
    /// New purchase price
    #[serde(default)]
    pub cost_price: Option<f64>,
    /// New sale price
    #[serde(default)]
    pub selling_price: Option<f64>,
    /// New sale state
    #[serde(default)]
    pub status: Option<ProductStatus>,
    /// `Some(None)` removes the evidence reference
    #[serde(default, deserialize_with = "double_option")]
    pub evidence: Option<Option<String>>,
    /// Moves the product to another month record
    #[serde(default)]
    pub month_record_id: Option<i64>,
}

/// A patch whose text and price fields have passed validation.
struct CheckedPatch {
    name: Option<String>,
    game_account: Option<String>,
    game_name: Option<String>,
    cost_price: Option<f64>,
    selling_price: Option<f64>,
}

impl ProductPatch {
    fn check(&self) -> Result<CheckedPatch> {
        Ok(CheckedPatch {
            name: self
                .name
                .as_deref()
                .map(|v| min_chars(v, 3, NAME_MESSAGE))
                .transpose()?,
            game_account: self
                .game_account
                .as_deref()
                .map(|v| min_chars(v, 1, GAME_ACCOUNT_MESSAGE))
                .transpose()?,
            game_name: self
                .game_name
                .as_deref()
                .map(|v| min_chars(v, 1, GAME_NAME_MESSAGE))
                .transpose()?,
            cost_price: self
                .cost_price
                .map(|v| price(v, COST_PRICE_MESSAGE))
                .transpose()?,
            selling_price: self
                .selling_price
                .map(|v| price(v, SELLING_PRICE_MESSAGE))
                .transpose()?,
        })
    }

    /// Builds the changed active model from `existing` and the validated fields.
    fn apply(&self, checked: CheckedPatch, existing: product::Model) -> product::ActiveModel {
        let cost_price = checked.cost_price.unwrap_or(existing.cost_price);
        let selling_price = checked.selling_price.unwrap_or(existing.selling_price);
        let price_changed = checked.cost_price.is_some() || checked.selling_price.is_some();

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = checked.name {
            active.name = Set(name);
        }
        if let Some(game_account) = checked.game_account {
            active.game_account = Set(game_account);
        }
        if let Some(game_name) = checked.game_name {
            active.game_name = Set(game_name);
        }
        if let Some(category) = self.category {
            active.category = Set(category);
        }
        if let Some(date_received) = self.date_received {
            active.date_received = Set(date_received);
        }
        if price_changed {
            active.cost_price = Set(cost_price);
            active.selling_price = Set(selling_price);
            active.profit = Set(profit(cost_price, selling_price));
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(evidence) = self.evidence.clone() {
            active.evidence = Set(evidence);
        }
        if let Some(month_record_id) = self.month_record_id {
            active.month_record_id = Set(month_record_id);
        }
        active
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.game_account.is_none()
            && self.game_name.is_none()
            && self.category.is_none()
            && self.date_received.is_none()
            && self.cost_price.is_none()
            && self.selling_price.is_none()
            && self.status.is_none()
            && self.evidence.is_none()
            && self.month_record_id.is_none()
    }
}

/// Product CRUD, consistent with the month record ledger.
#[derive(Clone)]
pub struct ProductStore {
    database: DatabaseConnection,
    periods: Arc<PeriodGuards>,
}

impl ProductStore {
    /// Creates a store over `database`, sharing `periods` with the month record ledger.
    #[must_use]
    pub const fn new(database: DatabaseConnection, periods: Arc<PeriodGuards>) -> Self {
        Self { database, periods }
    }

    /// Creates a product booked under `new.month_record_id`.
    ///
    /// The month record must exist but may be locked: late entries into a closed
    /// period are accepted, only later edits and deletions are refused.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The name is shorter than 3 characters, or the game account or game name is empty
    /// - Either price is negative or not finite
    /// - The month record does not exist
    /// - The database insert fails
    #[instrument(skip(self, new), fields(user_id = actor.user_id, role = ?actor.role))]
    pub async fn create(&self, actor: &Actor, new: NewProduct) -> Result<product::Model> {
        let name = min_chars(&new.name, 3, NAME_MESSAGE)?;
        let game_account = min_chars(&new.game_account, 1, GAME_ACCOUNT_MESSAGE)?;
        let game_name = min_chars(&new.game_name, 1, GAME_NAME_MESSAGE)?;
        let cost_price = price(new.cost_price, COST_PRICE_MESSAGE)?;
        let selling_price = price(new.selling_price, SELLING_PRICE_MESSAGE)?;

        find_month_record(&self.database, new.month_record_id).await?;

        let now = Utc::now();
        let product = product::ActiveModel {
            name: Set(name),
            game_account: Set(game_account),
            game_name: Set(game_name),
            category: Set(new.category),
            date_received: Set(new.date_received.unwrap_or(now)),
            cost_price: Set(cost_price),
            selling_price: Set(selling_price),
            profit: Set(profit(cost_price, selling_price)),
            status: Set(new.status.unwrap_or_default()),
            evidence: Set(new.evidence),
            month_record_id: Set(new.month_record_id),
            user_id: Set(actor.user_id),
            created_at: Set(now),
            ..Default::default()
        };
        let product = product.insert(&self.database).await?;

        info!(
            product_id = product.id,
            month_record_id = product.month_record_id,
            "Product created"
        );
        Ok(product)
    }

    /// Retrieves a product by id.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if no product has this id.
    pub async fn get(&self, id: i64) -> Result<product::Model> {
        Product::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or(Error::ProductNotFound { id })
    }

    /// Applies a partial update to a product.
    ///
    /// Profit is recomputed from the merged prices whenever either price is supplied.
    /// Moving a product to another month record requires both periods to be unlocked.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The product does not exist
    /// - A supplied field fails validation
    /// - The owning (or target) month record is locked; nothing is written
    /// - The target month record does not exist
    /// - The database update fails
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<product::Model> {
        let checked = patch.check()?;

        loop {
            let seen = self.get(id).await?;
            let mut periods = vec![seen.month_record_id];
            periods.extend(patch.month_record_id);
            let _guard = self.periods.acquire_many(&periods).await;

            let txn = self.database.begin().await?;
            let existing = Product::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(Error::ProductNotFound { id })?;

            // Moved to another period while waiting for the guard; retry under the new one
            if existing.month_record_id != seen.month_record_id {
                debug!("Product changed period while waiting, retrying");
                continue;
            }

            ensure_unlocked(&txn, existing.month_record_id).await?;
            if let Some(target) = patch.month_record_id {
                ensure_unlocked(&txn, target).await?;
            }

            if patch.is_empty() {
                return Ok(existing);
            }

            let updated = patch.apply(checked, existing).update(&txn).await?;
            txn.commit().await?;

            debug!(profit = updated.profit, "Product updated");
            return Ok(updated);
        }
    }

    /// Deletes a product.
    ///
    /// # Returns
    /// * `Ok(true)` - The product was deleted
    /// * `Ok(false)` - No product has this id
    ///
    /// # Errors
    /// Returns [`Error::LockedPeriod`] if the owning month record is locked, or a
    /// database error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        loop {
            let Some(seen) = Product::find_by_id(id).one(&self.database).await? else {
                return Ok(false);
            };
            let _guard = self.periods.acquire(seen.month_record_id).await;

            let txn = self.database.begin().await?;
            let Some(existing) = Product::find_by_id(id).one(&txn).await? else {
                return Ok(false);
            };

            if existing.month_record_id != seen.month_record_id {
                debug!("Product changed period while waiting, retrying");
                continue;
            }

            ensure_unlocked(&txn, existing.month_record_id).await?;

            let result = Product::delete_by_id(id).exec(&txn).await?;
            txn.commit().await?;

            info!("Product deleted");
            return Ok(result.rows_affected > 0);
        }
    }

    /// All products in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<product::Model>> {
        Product::find()
            .order_by_asc(product::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Products booked under one month record, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_by_month_record(
        &self,
        month_record_id: i64,
    ) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::MonthRecordId.eq(month_record_id))
            .order_by_asc(product::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Products of one category, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_by_category(
        &self,
        category: ProductCategory,
    ) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::Category.eq(category))
            .order_by_asc(product::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Products with one status, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_by_status(&self, status: ProductStatus) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::Status.eq(status))
            .order_by_asc(product::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }
}
