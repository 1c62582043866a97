//! Reconciliation driver
//!
//! Discovers models, computes each model's fillable fields from the schema
//! catalog and either patches the model source or reports a diff.

use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::db::catalog::SchemaCatalog;
use crate::error::{Error, Result};
use crate::fillable::diff::{colorize, diff};
use crate::fillable::exclusions::ExclusionResolver;
use crate::fillable::fields::{compute_fields, date_columns};
use crate::fillable::patcher::{PatchResult, SourcePatcher};
use crate::fillable::render::{render, render_dates};
use crate::models::registry::{ModelDescriptor, ModelInventory, ModelRegistry};
use crate::utils::naming::normalize_class_name;

const SEPARATOR: &str = "----------------------------------------";

/// Options for one reconciliation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Patch files instead of reporting diffs
    pub write_changes: bool,
    /// Restrict the run to one fully-qualified class name
    pub model: Option<String>,
    pub excluded_columns: Vec<String>,
    pub project_path: PathBuf,
    pub model_directories: Vec<String>,
    /// Also reconcile `$dates`
    pub sync_dates: bool,
}

impl RunOptions {
    /// Dry-run options taken from configuration
    pub fn from_config(config: &Config, project_path: impl Into<PathBuf>) -> Self {
        Self {
            write_changes: false,
            model: None,
            excluded_columns: config.fillable.exclude.clone(),
            project_path: project_path.into(),
            model_directories: config.models.paths.clone(),
            sync_dates: config.fillable.sync_dates,
        }
    }
}

/// What happened to one declaration of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Patched(PatchResult),
    Reported { diff: String },
}

/// Result of reconciling one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutcome {
    pub model: String,
    pub path: PathBuf,
    pub table: String,
    pub fields: Vec<String>,
    pub fillable: Action,
    pub dates: Option<Action>,
}

/// Drives reconciliation against a schema catalog
pub struct Reconciler<'a, C: SchemaCatalog + ?Sized> {
    catalog: &'a C,
    registry: ModelRegistry,
    exclusions: ExclusionResolver,
    fillable_patcher: SourcePatcher,
    dates_patcher: SourcePatcher,
    colored: bool,
}

impl<'a, C: SchemaCatalog + ?Sized> Reconciler<'a, C> {
    pub fn new(catalog: &'a C, config: &Config) -> Result<Self> {
        Ok(Self {
            catalog,
            registry: ModelRegistry::new(&config.models),
            exclusions: ExclusionResolver::new(&config.fillable),
            fillable_patcher: SourcePatcher::fillable()?,
            dates_patcher: SourcePatcher::dates()?,
            colored: false,
        })
    }

    /// Color the dry-run report for a terminal
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Reconcile every selected model, writing the dry-run report to `out`
    ///
    /// Stops at the first model that fails; models handled before it keep
    /// their changes.
    pub fn run<W: Write>(&self, options: &RunOptions, out: &mut W) -> Result<Vec<ModelOutcome>> {
        let inventory = self
            .registry
            .scan(&options.project_path, &options.model_directories)?;
        let targets = self.select_models(&inventory, options.model.as_deref())?;

        tracing::info!(
            models = targets.len(),
            write = options.write_changes,
            "Reconciling fillable declarations"
        );

        let mut outcomes = Vec::with_capacity(targets.len());
        for descriptor in &targets {
            let outcome = self
                .reconcile_model(&inventory, descriptor, options, out)
                .map_err(|e| e.for_model(&descriptor.name))?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    fn select_models(&self, inventory: &ModelInventory, model: Option<&str>) -> Result<Vec<ModelDescriptor>> {
        let name = match model {
            Some(name) => name,
            None => return Ok(inventory.models()),
        };

        let scanned = inventory
            .get(name)
            .ok_or_else(|| Error::ModelNotFound(normalize_class_name(name)))?;

        if !inventory.is_model(name) {
            tracing::warn!(class = %scanned.metadata.name, "Not a concrete Eloquent model, skipping");
            return Ok(Vec::new());
        }

        Ok(vec![ModelDescriptor {
            name: scanned.metadata.name.clone(),
            path: scanned.path.clone(),
        }])
    }

    fn reconcile_model<W: Write>(
        &self,
        inventory: &ModelInventory,
        descriptor: &ModelDescriptor,
        options: &RunOptions,
        out: &mut W,
    ) -> Result<ModelOutcome> {
        let name = descriptor.name.as_str();
        let table = inventory
            .table_name(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))?;

        let excluded = self.exclusions.resolve(inventory, name, &options.excluded_columns);
        let fields = compute_fields(self.catalog, &table, &excluded)?;
        let rendered = render(&fields);

        // Tables without date columns leave `$dates` alone
        let dates_rendered = if options.sync_dates {
            let timestamps = self.exclusions.timestamp_columns(inventory, name);
            let dates = date_columns(self.catalog, &table, &timestamps)?;
            (!dates.is_empty()).then(|| render_dates(&dates))
        } else {
            None
        };

        tracing::debug!(model = name, table = %table, fields = ?fields, "Resolved fillable fields");

        let (fillable, dates) = if options.write_changes {
            let fillable = self.fillable_patcher.patch(&descriptor.path, &rendered)?;
            let dates = match &dates_rendered {
                Some(text) => Some(Action::Patched(self.dates_patcher.patch(&descriptor.path, text)?)),
                None => None,
            };
            (Action::Patched(fillable), dates)
        } else {
            let content = std::fs::read_to_string(&descriptor.path)?;
            let fillable_diff = diff(
                self.fillable_patcher.current_declaration(&content).unwrap_or_default(),
                &rendered,
            );
            let dates_diff = dates_rendered.as_ref().map(|text| {
                diff(self.dates_patcher.current_declaration(&content).unwrap_or_default(), text)
            });

            let mut report = fillable_diff.clone();
            if let Some(dates_diff) = &dates_diff {
                report.push_str(dates_diff);
            }
            self.write_report(out, name, &report)?;

            (
                Action::Reported { diff: fillable_diff },
                dates_diff.map(|diff| Action::Reported { diff }),
            )
        };

        Ok(ModelOutcome {
            model: descriptor.name.clone(),
            path: descriptor.path.clone(),
            table,
            fields,
            fillable,
            dates,
        })
    }

    fn write_report<W: Write>(&self, out: &mut W, model: &str, report: &str) -> Result<()> {
        writeln!(out, "Model: {}", model)?;
        if self.colored {
            write!(out, "{}", colorize(report))?;
        } else if report.is_empty() {
            writeln!(out, "No changes")?;
        } else {
            write!(out, "{}", report)?;
        }
        writeln!(out, "{}", SEPARATOR)?;
        writeln!(out)?;
        Ok(())
    }
}
