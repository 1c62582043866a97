//! Exclusion resolver
//!
//! Collects the column names that must never be mass assignable for a model.

use indexmap::IndexSet;

use crate::config::FillableConfig;
use crate::models::registry::ModelInventory;

/// Property listing extra non-fillable columns
pub const NON_FILLABLE_PROPERTY: &str = "nonFillable";
/// Eloquent's guarded attribute list
pub const GUARDED_PROPERTY: &str = "guarded";
/// Eloquent's primary key override
pub const PRIMARY_KEY_PROPERTY: &str = "primaryKey";

/// Ordered set of excluded column names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(IndexSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>) -> bool {
        self.0.insert(column.into())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for column in iter {
            self.insert(column);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Builds exclusion sets from configuration and static model declarations
#[derive(Debug, Clone)]
pub struct ExclusionResolver {
    identifier_column: String,
    created_at_column: String,
    updated_at_column: String,
}

impl ExclusionResolver {
    pub fn new(config: &FillableConfig) -> Self {
        Self {
            identifier_column: config.identifier_column.clone(),
            created_at_column: config.created_at_column.clone(),
            updated_at_column: config.updated_at_column.clone(),
        }
    }

    /// Primary key column, honouring a literal `$primaryKey` override
    pub fn identifier_column(&self, inventory: &ModelInventory, model: &str) -> String {
        inventory
            .declaring(model, PRIMARY_KEY_PROPERTY)
            .and_then(|m| m.string(PRIMARY_KEY_PROPERTY))
            .unwrap_or(&self.identifier_column)
            .to_string()
    }

    /// Creation and update timestamp columns, honouring `CREATED_AT` / `UPDATED_AT`
    pub fn timestamp_columns(&self, inventory: &ModelInventory, model: &str) -> [String; 2] {
        [
            inventory
                .constant(model, "CREATED_AT")
                .unwrap_or(&self.created_at_column)
                .to_string(),
            inventory
                .constant(model, "UPDATED_AT")
                .unwrap_or(&self.updated_at_column)
                .to_string(),
        ]
    }

    /// Exclusion set for `model`
    pub fn resolve(
        &self,
        inventory: &ModelInventory,
        model: &str,
        caller_excluded: &[String],
    ) -> ExclusionSet {
        let mut exclusions = ExclusionSet::new();

        exclusions.insert(self.identifier_column(inventory, model));
        exclusions.extend(self.timestamp_columns(inventory, model));
        exclusions.extend(caller_excluded.iter().map(|c| c.trim()).filter(|c| !c.is_empty()));

        for property in [NON_FILLABLE_PROPERTY, GUARDED_PROPERTY] {
            if let Some(columns) = declared_list(inventory, model, property) {
                exclusions.extend(columns.iter().map(|c| c.as_str()));
            }
        }

        tracing::debug!(
            model = model,
            excluded = ?exclusions.iter().collect::<Vec<_>>(),
            "Resolved exclusions"
        );

        exclusions
    }
}

/// Literal list declared for `property` by the model or its nearest ancestor
fn declared_list<'i>(inventory: &'i ModelInventory, model: &str, property: &str) -> Option<&'i [String]> {
    let declaring = inventory.declaring(model, property)?;

    match declaring.list(property) {
        Some(columns) => Some(columns),
        None => {
            tracing::debug!(
                model = model,
                declared_in = %declaring.name,
                property = property,
                "Declaration is not a literal list, treating it as absent"
            );
            None
        }
    }
}
