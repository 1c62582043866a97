//! Fillable module for FillableSync
//!
//! Computes, renders and applies `$fillable` (and `$dates`) declarations.

pub mod diff;
pub mod exclusions;
pub mod fields;
pub mod patcher;
pub mod render;

// Re-export key types
pub use exclusions::{ExclusionResolver, ExclusionSet};
pub use fields::{compute_fields, date_columns};
pub use patcher::{normalize_open_tag, Declaration, PatchResult, Placement, SourcePatcher};
pub use render::{render, render_dates};
