/// Catalog seeding from config.toml
pub mod catalog;

/// Database configuration and connection management
pub mod database;
