//! FillableSync: keeps the `$fillable` property of Eloquent models in sync with the database
//!
//! FillableSync scans a Laravel project for model classes, reads the columns of each
//! model's table and rewrites the model's `$fillable` declaration to list every
//! column that is not excluded.

pub mod config;
pub mod db;
pub mod error;
pub mod fillable;
pub mod models;
pub mod reconcile;
pub mod utils;

use std::io::Write;

// Re-export main types for easier access
pub use config::Config;
pub use db::catalog::{MemoryCatalog, SchemaCatalog, SqlCatalog};
pub use error::{Error, Result};
pub use models::registry::ModelRegistry;
pub use reconcile::{Action, ModelOutcome, Reconciler, RunOptions};

/// Initialize FillableSync with the specified configuration file
pub fn init(config_path: &str) -> Result<FillableSyncClient> {
    let config = config::load_from_file(config_path)?;
    FillableSyncClient::new(config)
}

/// The main client for running FillableSync against a live database
pub struct FillableSyncClient {
    config: Config,
    catalog: SqlCatalog,
}

impl FillableSyncClient {
    /// Create a new client, connecting to the configured database
    pub fn new(config: Config) -> Result<Self> {
        let catalog = SqlCatalog::connect(&config.database)?;
        Ok(Self { config, catalog })
    }

    /// Reconcile models, writing the dry-run report to `out`
    pub fn run<W: Write>(&self, options: &RunOptions, out: &mut W, colored: bool) -> Result<Vec<ModelOutcome>> {
        Reconciler::new(&self.catalog, &self.config)?
            .with_color(colored)
            .run(options, out)
    }
}
