//! Shared handles for callers of the core.

use crate::core::{MonthRecordLedger, PeriodGuards, ProductStore};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Everything an API layer needs to call into the tracker.
///
/// The ledger and the product store share one [`PeriodGuards`] registry; build them
/// through [`TrackerContext::new`] rather than separately so they stay coordinated.
#[derive(Clone)]
pub struct TrackerContext {
    /// Database connection for the free-function modules (tasks, users, game names)
    pub database: DatabaseConnection,
    /// Period guards shared by the ledger and the product store
    pub periods: Arc<PeriodGuards>,
    /// Month record ledger
    pub month_records: MonthRecordLedger,
    /// Product store
    pub products: ProductStore,
}

impl TrackerContext {
    /// Wires a ledger and a product store over the same connection and guards.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        let periods = Arc::new(PeriodGuards::new());
        Self {
            month_records: MonthRecordLedger::new(database.clone(), Arc::clone(&periods)),
            products: ProductStore::new(database.clone(), Arc::clone(&periods)),
            periods,
            database,
        }
    }
}
