//! Month record business logic - The accounting period ledger.
//!
//! This module owns the lock/active/clear state machine of month records:
//!
//! ```text
//! created (locked = false) --lock--> locked, inactive, end_date = now
//! locked --unlock--> unlocked (end_date kept, still inactive)
//! locked --clear--> products of the period deleted, record kept
//! ```
//!
//! Every transition runs under the record's period guard and inside a database
//! transaction, so product writes that check the lock state never interleave with a
//! concurrent lock or unlock of the same period.

use crate::{
    core::{
        period_guard::PeriodGuards,
        validation::{double_option, min_chars},
    },
    entities::{MonthRecord, Product, month_record, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const fn default_true() -> bool {
    true
}

/// Payload for creating a month record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMonthRecord {
    /// Display label, not unique
    pub name: String,
    /// Required; `None` is rejected with a validation error
    pub start_date: Option<DateTimeUtc>,
    /// Defaults to true
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Defaults to false
    #[serde(default)]
    pub is_locked: bool,
}

impl NewMonthRecord {
    /// An open, active period starting at `start_date`.
    pub fn new(name: impl Into<String>, start_date: DateTimeUtc) -> Self {
        Self {
            name: name.into(),
            start_date: Some(start_date),
            is_active: true,
            is_locked: false,
        }
    }
}

/// Partial update of a month record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthRecordPatch {
    /// New display label
    #[serde(default)]
    pub name: Option<String>,
    /// New start date
    #[serde(default)]
    pub start_date: Option<DateTimeUtc>,
    /// `Some(None)` clears the end date
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTimeUtc>>,
    /// New active flag
    #[serde(default)]
    pub is_active: Option<bool>,
    /// New lock flag
    #[serde(default)]
    pub is_locked: Option<bool>,
}

impl MonthRecordPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_active.is_none()
            && self.is_locked.is_none()
    }
}

/// Loads a month record on any connection or transaction.
pub(crate) async fn find_month_record<C>(conn: &C, id: i64) -> Result<month_record::Model>
where
    C: ConnectionTrait,
{
    MonthRecord::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::MonthRecordNotFound { id })
}

/// Loads a month record and fails with [`Error::LockedPeriod`] if it is locked.
///
/// Callers must hold the record's period guard for the check to stay valid until
/// their write commits.
pub(crate) async fn ensure_unlocked<C>(conn: &C, id: i64) -> Result<month_record::Model>
where
    C: ConnectionTrait,
{
    let record = find_month_record(conn, id).await?;
    if record.is_locked {
        return Err(Error::LockedPeriod {
            month_record_id: id,
        });
    }
    Ok(record)
}

/// Owns the set of accounting periods and their write-permission state.
#[derive(Clone)]
pub struct MonthRecordLedger {
    database: DatabaseConnection,
    periods: Arc<PeriodGuards>,
}

impl MonthRecordLedger {
    /// Creates a ledger over `database`, sharing `periods` with the product store.
    #[must_use]
    pub const fn new(database: DatabaseConnection, periods: Arc<PeriodGuards>) -> Self {
        Self { database, periods }
    }

    /// Inserts a new month record with no end date.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The start date is missing
    /// - The name is empty or whitespace-only
    /// - The record would be both locked and active
    /// - The database insert fails
    pub async fn create(&self, new: NewMonthRecord) -> Result<month_record::Model> {
        let start_date = new
            .start_date
            .ok_or_else(|| Error::validation("Start date is required"))?;
        let name = min_chars(&new.name, 1, "Month record name is required")?;

        if new.is_locked && new.is_active {
            return Err(Error::validation("A locked month record cannot be active"));
        }

        let record = month_record::ActiveModel {
            name: Set(name),
            start_date: Set(start_date),
            end_date: Set(None),
            is_active: Set(new.is_active),
            is_locked: Set(new.is_locked),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let record = record.insert(&self.database).await?;

        info!(month_record_id = record.id, name = %record.name, "Month record created");
        Ok(record)
    }

    /// Retrieves a month record by id.
    ///
    /// # Errors
    /// Returns [`Error::MonthRecordNotFound`] if no record has this id.
    pub async fn get(&self, id: i64) -> Result<month_record::Model> {
        find_month_record(&self.database, id).await
    }

    /// All month records in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<month_record::Model>> {
        MonthRecord::find()
            .order_by_asc(month_record::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Records that are not locked, in insertion order.
    ///
    /// Only `is_locked` is consulted. A record can be unlocked and inactive at the
    /// same time (for example after an unlock), and it is included here.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_unlocked(&self) -> Result<Vec<month_record::Model>> {
        MonthRecord::find()
            .filter(month_record::Column::IsLocked.eq(false))
            .order_by_asc(month_record::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// The default period for new products: the oldest record flagged active.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn current(&self) -> Result<Option<month_record::Model>> {
        MonthRecord::find()
            .filter(month_record::Column::IsActive.eq(true))
            .order_by_asc(month_record::Column::Id)
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Applies a partial update to a month record.
    ///
    /// The lock and active flags may be changed freely here, except that the result
    /// must not be locked and active at once. Only [`Self::lock`] stamps `end_date`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The record does not exist
    /// - A supplied name is empty
    /// - The patched record would be both locked and active
    /// - The database update fails
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: MonthRecordPatch) -> Result<month_record::Model> {
        let name = patch
            .name
            .as_deref()
            .map(|name| min_chars(name, 1, "Month record name is required"))
            .transpose()?;

        let _guard = self.periods.acquire(id).await;
        let txn = self.database.begin().await?;

        let record = find_month_record(&txn, id).await?;
        if patch.is_empty() {
            return Ok(record);
        }

        let is_locked = patch.is_locked.unwrap_or(record.is_locked);
        let is_active = patch.is_active.unwrap_or(record.is_active);
        if is_locked && is_active {
            return Err(Error::validation("A locked month record cannot be active"));
        }

        let mut active: month_record::ActiveModel = record.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = patch.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_locked) = patch.is_locked {
            active.is_locked = Set(is_locked);
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        debug!(
            is_locked = updated.is_locked,
            is_active = updated.is_active,
            "Month record updated"
        );
        Ok(updated)
    }

    /// Closes a period: locked, inactive, `end_date` set to now.
    ///
    /// Locking an already locked record is a no-op that keeps the original
    /// `end_date`.
    ///
    /// # Returns
    /// * `Ok(true)` - The record is locked
    /// * `Ok(false)` - No record has this id
    ///
    /// # Errors
    /// Returns an error if the database update fails.
    #[instrument(skip(self))]
    pub async fn lock(&self, id: i64) -> Result<bool> {
        let _guard = self.periods.acquire(id).await;
        let txn = self.database.begin().await?;

        let Some(record) = MonthRecord::find_by_id(id).one(&txn).await? else {
            warn!("Lock requested for unknown month record");
            return Ok(false);
        };

        if record.is_locked {
            debug!("Month record already locked");
            return Ok(true);
        }

        let mut active: month_record::ActiveModel = record.into();
        active.is_locked = Set(true);
        active.is_active = Set(false);
        active.end_date = Set(Some(Utc::now()));
        active.update(&txn).await?;

        txn.commit().await?;
        info!("Month record locked");
        Ok(true)
    }

    /// Reopens a period for product writes.
    ///
    /// Equivalent to updating `is_locked` to false: `end_date` and `is_active` are left
    /// as they are.
    ///
    /// # Errors
    /// Returns [`Error::MonthRecordNotFound`] if no record has this id, or a database
    /// error.
    pub async fn unlock(&self, id: i64) -> Result<month_record::Model> {
        let record = self
            .update(
                id,
                MonthRecordPatch {
                    is_locked: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(month_record_id = id, "Month record unlocked");
        Ok(record)
    }

    /// Permanently deletes every product booked under a locked period.
    ///
    /// The month record itself is kept. There is no undo.
    ///
    /// # Returns
    /// * `Ok(true)` - The products were deleted
    /// * `Ok(false)` - The record does not exist or is not locked; nothing deleted
    ///
    /// # Errors
    /// Returns an error if the database delete fails; no rows are deleted in that case.
    #[instrument(skip(self))]
    pub async fn clear(&self, id: i64) -> Result<bool> {
        let _guard = self.periods.acquire(id).await;
        let txn = self.database.begin().await?;

        let Some(record) = MonthRecord::find_by_id(id).one(&txn).await? else {
            warn!("Clear requested for unknown month record");
            return Ok(false);
        };

        if !record.is_locked {
            warn!("Refusing to clear an unlocked month record");
            return Ok(false);
        }

        let deleted = Product::delete_many()
            .filter(product::Column::MonthRecordId.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(
            products_deleted = deleted.rows_affected,
            "Month record cleared"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_create_month_record_defaults() -> Result<()> {
        let ctx = setup_context().await?;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let record = ctx
            .month_records
            .create(NewMonthRecord::new("Month 1", start))
            .await?;

        assert_eq!(record.name, "Month 1");
        assert_eq!(record.start_date, start);
        assert_eq!(record.end_date, None);
        assert!(record.is_active);
        assert!(!record.is_locked);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_month_record_requires_start_date() -> Result<()> {
        let ctx = setup_context().await?;

        let result = ctx
            .month_records
            .create(NewMonthRecord {
                name: "Month 1".to_string(),
                start_date: None,
                is_active: true,
                is_locked: false,
            })
            .await;

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(ctx.month_records.list_all().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_month_record_rejects_locked_and_active() -> Result<()> {
        let ctx = setup_context().await?;

        let result = ctx
            .month_records
            .create(NewMonthRecord {
                is_locked: true,
                ..NewMonthRecord::new("Month 1", Utc::now())
            })
            .await;

        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_names_are_not_unique() -> Result<()> {
        let ctx = setup_context().await?;

        create_test_month_record(&ctx, "Month 1").await?;
        create_test_month_record(&ctx, "Month 1").await?;

        assert_eq!(ctx.month_records.list_all().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_month_record() -> Result<()> {
        let ctx = setup_context().await?;

        let result = ctx.month_records.get(999).await;
        assert!(matches!(result, Err(Error::MonthRecordNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_lock_sets_end_date_and_deactivates() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;

        assert!(ctx.month_records.lock(record.id).await?);

        let locked = ctx.month_records.get(record.id).await?;
        assert!(locked.is_locked);
        assert!(!locked.is_active);
        assert!(locked.end_date.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_lock_missing_record_returns_false() -> Result<()> {
        let ctx = setup_context().await?;

        assert!(!ctx.month_records.lock(42).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_lock_twice_keeps_first_end_date() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;

        assert!(ctx.month_records.lock(record.id).await?);
        let first = ctx.month_records.get(record.id).await?;

        assert!(ctx.month_records.lock(record.id).await?);
        let second = ctx.month_records.get(record.id).await?;

        assert_eq!(first, second);
        assert!(second.end_date.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_unlock_keeps_end_date_and_inactive() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;
        ctx.month_records.lock(record.id).await?;
        let locked = ctx.month_records.get(record.id).await?;

        let unlocked = ctx.month_records.unlock(record.id).await?;

        assert!(!unlocked.is_locked);
        assert!(!unlocked.is_active);
        assert_eq!(unlocked.end_date, locked.end_date);

        Ok(())
    }

    #[tokio::test]
    async fn test_unlock_missing_record() -> Result<()> {
        let ctx = setup_context().await?;

        let result = ctx.month_records.unlock(7).await;
        assert!(matches!(result, Err(Error::MonthRecordNotFound { id: 7 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_patches_fields() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();

        let updated = ctx
            .month_records
            .update(
                record.id,
                MonthRecordPatch {
                    name: Some("  January  ".to_string()),
                    end_date: Some(Some(end)),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(updated.name, "January");
        assert_eq!(updated.end_date, Some(end));
        assert!(!updated.is_active);
        assert_eq!(updated.start_date, record.start_date);

        let cleared = ctx
            .month_records
            .update(
                record.id,
                MonthRecordPatch {
                    end_date: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(cleared.end_date, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_can_lock_without_end_date() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;

        let updated = ctx
            .month_records
            .update(
                record.id,
                MonthRecordPatch {
                    is_locked: Some(true),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        assert!(updated.is_locked);
        assert_eq!(updated.end_date, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_locked_and_active() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;
        ctx.month_records.lock(record.id).await?;

        let result = ctx
            .month_records
            .update(
                record.id,
                MonthRecordPatch {
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Unlocking and reactivating in one patch is fine
        let reopened = ctx
            .month_records
            .update(
                record.id,
                MonthRecordPatch {
                    is_active: Some(true),
                    is_locked: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        assert!(reopened.is_active);
        assert!(!reopened.is_locked);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_record() -> Result<()> {
        let ctx = setup_context().await?;

        let result = ctx
            .month_records
            .update(3, MonthRecordPatch::default())
            .await;
        assert!(matches!(result, Err(Error::MonthRecordNotFound { id: 3 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_unlocked_ignores_active_flag() -> Result<()> {
        let ctx = setup_context().await?;
        let open = create_test_month_record(&ctx, "Open").await?;
        let inactive = ctx
            .month_records
            .create(NewMonthRecord {
                is_active: false,
                ..NewMonthRecord::new("Inactive", Utc::now())
            })
            .await?;
        let closed = create_test_month_record(&ctx, "Closed").await?;
        ctx.month_records.lock(closed.id).await?;

        let unlocked = ctx.month_records.list_unlocked().await?;
        let ids: Vec<i64> = unlocked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![open.id, inactive.id]);

        let all = ctx.month_records.list_all().await?;
        assert_eq!(all.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_current_is_oldest_active() -> Result<()> {
        let ctx = setup_context().await?;
        assert!(ctx.month_records.current().await?.is_none());

        let first = create_test_month_record(&ctx, "Month 1").await?;
        create_test_month_record(&ctx, "Month 2").await?;
        assert_eq!(ctx.month_records.current().await?.unwrap().id, first.id);

        ctx.month_records.lock(first.id).await?;
        assert_eq!(
            ctx.month_records.current().await?.unwrap().name,
            "Month 2"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_unlocked_is_noop() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;
        create_test_product(&ctx, "Starter Account", record.id).await?;

        assert!(!ctx.month_records.clear(record.id).await?);
        assert_eq!(ctx.products.list_by_month_record(record.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_missing_record_returns_false() -> Result<()> {
        let ctx = setup_context().await?;

        assert!(!ctx.month_records.clear(11).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_no_period_guards() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;

        for id in 1000..1200 {
            assert!(!ctx.month_records.lock(id).await?);
            assert!(!ctx.month_records.clear(id).await?);
        }
        ctx.month_records.lock(record.id).await?;
        ctx.month_records.unlock(record.id).await?;

        assert!(ctx.periods.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_rechecks_lock_after_waiting_for_guard() -> Result<()> {
        let ctx = setup_context().await?;
        let record = create_test_month_record(&ctx, "Month 1").await?;
        let product = create_test_product(&ctx, "Starter Account", record.id).await?;
        ctx.month_records.lock(record.id).await?;

        // Hold the period so the clear has to wait
        let guard = ctx.periods.acquire(record.id).await;

        let pending = {
            let month_records = ctx.month_records.clone();
            tokio::spawn(async move { month_records.clear(record.id).await })
        };

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(!pending.is_finished());

        // Unlock the period behind the waiting clear's back, then let it proceed
        let mut unlocked: month_record::ActiveModel = MonthRecord::find_by_id(record.id)
            .one(&ctx.database)
            .await?
            .unwrap()
            .into();
        unlocked.is_locked = Set(false);
        unlocked.update(&ctx.database).await?;
        drop(guard);

        assert!(!pending.await.unwrap()?);
        assert_eq!(ctx.products.list_by_month_record(record.id).await?, vec![product]);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_locked_only_touches_its_products() -> Result<()> {
        let ctx = setup_context().await?;
        let closed = create_test_month_record(&ctx, "Month 1").await?;
        let open = create_test_month_record(&ctx, "Month 2").await?;

        create_test_product(&ctx, "Account A", closed.id).await?;
        create_test_product(&ctx, "Account B", closed.id).await?;
        let survivor = create_test_product(&ctx, "Account C", open.id).await?;

        ctx.month_records.lock(closed.id).await?;
        assert!(ctx.month_records.clear(closed.id).await?);

        assert!(ctx.products.list_by_month_record(closed.id).await?.is_empty());
        let remaining = ctx.products.list_all().await?;
        assert_eq!(remaining, vec![survivor]);

        // The record itself survives the clear
        let record = ctx.month_records.get(closed.id).await?;
        assert!(record.is_locked);

        Ok(())
    }
}
