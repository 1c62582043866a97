//! Database module for FillableSync
//!
//! This module handles database connections and schema introspection.

pub mod catalog;
pub mod connection;

// Re-export key types
pub use catalog::{normalize_type, ColumnInfo, MemoryCatalog, SchemaCatalog, SqlCatalog};
pub use connection::DatabaseConnection;
