//! Utilities for FillableSync
//!
//! This module provides utility functions used across the library.

pub mod naming;
pub mod logging;

// Re-export key utility functions
pub use naming::{
    class_basename, default_table_name, normalize_class_name, pluralize_word, qualify,
};
