//! Unified error types for the product tracker core.
//!
//! Every operation returns [`Result`], so callers can tell a bad payload, a missing row
//! and a write against a closed accounting period apart from storage failures.

use thiserror::Error;

/// All failures the core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed a shape or range check (negative price, empty name, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// No month record with this id
    #[error("Month record not found: {id}")]
    MonthRecordNotFound {
        /// Requested id
        id: i64,
    },

    /// No product with this id
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested id
        id: i64,
    },

    /// No game name with this id
    #[error("Game name not found: {id}")]
    GameNameNotFound {
        /// Requested id
        id: i64,
    },

    /// No task with this id
    #[error("Task not found: {id}")]
    TaskNotFound {
        /// Requested id
        id: i64,
    },

    /// No user with this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested id
        id: i64,
    },

    /// Write attempted against a product whose month record is locked
    #[error("Month record {month_record_id} is locked")]
    LockedPeriod {
        /// The locked month record
        month_record_id: i64,
    },

    /// A game name with this exact name already exists
    #[error("Game name already exists: {name}")]
    GameNameExists {
        /// Conflicting name
        name: String,
    },

    /// A user with this username already exists
    #[error("Username already taken: {username}")]
    UsernameTaken {
        /// Conflicting username
        username: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Storage failure, surfaced as-is and never retried
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for every "row does not exist" variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MonthRecordNotFound { .. }
                | Self::ProductNotFound { .. }
                | Self::GameNameNotFound { .. }
                | Self::TaskNotFound { .. }
                | Self::UserNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(Error::ProductNotFound { id: 1 }.is_not_found());
        assert!(Error::MonthRecordNotFound { id: 1 }.is_not_found());
        assert!(!Error::LockedPeriod { month_record_id: 1 }.is_not_found());
        assert!(!Error::validation("bad").is_not_found());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::LockedPeriod { month_record_id: 7 }.to_string(),
            "Month record 7 is locked"
        );
        assert_eq!(
            Error::validation("Cost price must be a positive number").to_string(),
            "Validation error: Cost price must be a positive number"
        );
    }
}
