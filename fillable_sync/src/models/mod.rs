//! Models module for FillableSync
//!
//! This module handles static model discovery.

pub mod lexer;
pub mod metadata;
pub mod registry;

// Re-export key types
pub use metadata::TypeMetadata;
pub use registry::{ModelDescriptor, ModelInventory, ModelRegistry, ScannedType};
