#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway Laravel-style project on disk
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create model directory");
        }
        fs::write(&path, contents).expect("Failed to write model file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative)).expect("Failed to read model file")
    }
}

/// Source of a model class extending Eloquent's base model
pub fn model_source(namespace: &str, class: &str, body: &str) -> String {
    format!(
        "<?php\n\nnamespace {};\n\nuse Illuminate\\Database\\Eloquent\\Model;\n\nclass {} extends Model\n{{\n{}}}\n",
        namespace, class, body
    )
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
