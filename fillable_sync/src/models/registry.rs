//! Model registry for FillableSync
//!
//! This module scans model directories, extracts static metadata from each
//! source file and decides which classes are Eloquent models.

use glob::Pattern;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ModelsConfig;
use crate::error::{Error, Result};
use crate::models::metadata::TypeMetadata;
use crate::utils::naming::{default_table_name, normalize_class_name};

/// A model class found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Fully-qualified class name
    pub name: String,
    pub path: PathBuf,
}

/// A class scanned from a source file, model or not
#[derive(Debug, Clone)]
pub struct ScannedType {
    pub metadata: TypeMetadata,
    pub path: PathBuf,
}

/// Every class found during a scan, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ModelInventory {
    // PHP class names are case-insensitive; keys are lowercased
    types: IndexMap<String, ScannedType>,
    base_classes: HashSet<String>,
}

impl ModelInventory {
    pub fn new(base_classes: &[String]) -> Self {
        Self {
            types: IndexMap::new(),
            base_classes: base_classes
                .iter()
                .map(|name| normalize_class_name(name).to_lowercase())
                .collect(),
        }
    }

    /// Add a scanned class; the first file declaring a name wins
    pub fn insert(&mut self, metadata: TypeMetadata, path: PathBuf) -> bool {
        let key = metadata.name.to_lowercase();
        if self.types.contains_key(&key) {
            tracing::debug!(class = %metadata.name, path = %path.display(), "Duplicate class declaration ignored");
            return false;
        }
        self.types.insert(key, ScannedType { metadata, path });
        true
    }

    pub fn get(&self, name: &str) -> Option<&ScannedType> {
        self.types.get(&normalize_class_name(name).to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether the parent chain of `name` reaches a configured base class
    pub fn extends_base(&self, name: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.get(name).and_then(|t| t.metadata.parent.clone());

        while let Some(parent) = current {
            let key = parent.to_lowercase();
            if self.base_classes.contains(&key) {
                return true;
            }
            if !visited.insert(key) {
                return false;
            }
            current = self.get(&parent).and_then(|t| t.metadata.parent.clone());
        }

        false
    }

    /// A concrete class descending from a base model
    pub fn is_model(&self, name: &str) -> bool {
        match self.get(name) {
            Some(scanned) => !scanned.metadata.is_abstract && self.extends_base(name),
            None => false,
        }
    }

    /// The class itself followed by its scanned ancestors, nearest first
    pub fn lineage(&self, name: &str) -> Vec<&TypeMetadata> {
        let mut lineage = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.get(name);

        while let Some(scanned) = current {
            if !visited.insert(scanned.metadata.name.to_lowercase()) {
                break;
            }
            lineage.push(&scanned.metadata);
            current = scanned.metadata.parent.as_deref().and_then(|p| self.get(p));
        }

        lineage
    }

    /// Nearest declaration of a property in the lineage of `name`
    ///
    /// Returns the declaring class, or `None` if no class in the lineage
    /// declares the property.
    pub fn declaring(&self, name: &str, property: &str) -> Option<&TypeMetadata> {
        self.lineage(name).into_iter().find(|m| m.declares(property))
    }

    /// Nearest class constant in the lineage of `name`
    pub fn constant(&self, name: &str, constant: &str) -> Option<&str> {
        self.lineage(name).into_iter().find_map(|m| m.constant(constant))
    }

    /// Table backing `name`: a literal `$table` declaration, else Eloquent's default
    pub fn table_name(&self, name: &str) -> Option<String> {
        let scanned = self.get(name)?;

        let declared = self
            .declaring(name, "table")
            .and_then(|m| m.string("table"))
            .filter(|table| !table.is_empty());

        Some(match declared {
            Some(table) => table.to_string(),
            None => default_table_name(&scanned.metadata.short_name),
        })
    }

    /// Models in discovery order
    pub fn models(&self) -> Vec<ModelDescriptor> {
        self.types
            .values()
            .filter(|t| self.is_model(&t.metadata.name))
            .map(|t| ModelDescriptor {
                name: t.metadata.name.clone(),
                path: t.path.clone(),
            })
            .collect()
    }
}

/// Registry that discovers Eloquent models on disk
pub struct ModelRegistry {
    config: ModelsConfig,
}

impl ModelRegistry {
    /// Create a new model registry
    pub fn new(config: &ModelsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Scan `directories` below `root_path` and return the model descriptors
    pub fn discover(&self, root_path: &Path, directories: &[String]) -> Result<Vec<ModelDescriptor>> {
        Ok(self.scan(root_path, directories)?.models())
    }

    /// Scan `directories` below `root_path` and return every class found
    pub fn scan(&self, root_path: &Path, directories: &[String]) -> Result<ModelInventory> {
        let exclude_patterns = self
            .config
            .exclude_paths
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| {
                    Error::ModelDiscoveryError(format!("Invalid exclude pattern {}: {}", pattern, e))
                })
            })
            .collect::<Result<Vec<Pattern>>>()?;

        let mut inventory = ModelInventory::new(&self.config.base_classes);

        for directory in directories {
            let base_path = root_path.join(directory.trim());

            if !base_path.is_dir() {
                return Err(Error::ModelDiscoveryError(format!(
                    "Path does not exist: {}",
                    base_path.display()
                )));
            }

            for entry in WalkDir::new(&base_path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();

                if !entry.file_type().is_file()
                    || path.extension().map_or(true, |ext| ext != self.config.extension.as_str())
                {
                    continue;
                }

                let relative = path.strip_prefix(root_path).unwrap_or(path);
                if exclude_patterns.iter().any(|p| p.matches_path(relative)) {
                    tracing::debug!(path = %path.display(), "Excluded from model scan");
                    continue;
                }

                self.process_file(path, &mut inventory);
            }
        }

        tracing::debug!(classes = inventory.len(), "Model scan complete");
        Ok(inventory)
    }

    /// Add the class declared in one file, skipping anything unreadable
    fn process_file(&self, path: &Path, inventory: &mut ModelInventory) {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
                return;
            }
        };

        match TypeMetadata::from_source(&contents) {
            Some(metadata) => {
                inventory.insert(metadata, path.to_owned());
            }
            None => {
                tracing::debug!(path = %path.display(), "No class declaration found");
            }
        }
    }
}
