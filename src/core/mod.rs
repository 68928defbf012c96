//! Core business logic - storage-backed operations independent of any transport.
//!
//! [`month_record::MonthRecordLedger`] and [`product::ProductStore`] share one
//! [`period_guard::PeriodGuards`] registry so that product writes and period
//! transitions on the same month record are serialized.

/// Caller identity stamped onto created rows
pub mod actor;
/// Game title catalog
pub mod game_name;
/// Month record ledger and its lock/clear state machine
pub mod month_record;
/// Per-month-record async mutexes
pub mod period_guard;
/// Product store gated by the month record lock state
pub mod product;
/// Month summary figures
pub mod report;
/// Tasks
pub mod task;
/// Users, roles and activity tracking
pub mod user;
/// Shared input checks
pub mod validation;

pub use actor::Actor;
pub use month_record::{MonthRecordLedger, MonthRecordPatch, NewMonthRecord};
pub use period_guard::PeriodGuards;
pub use product::{NewProduct, ProductPatch, ProductStore};
