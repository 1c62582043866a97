//! Configuration handling for FillableSync

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Default config file name looked up in the project root
pub const DEFAULT_CONFIG_FILE: &str = "fillable_sync.toml";

/// Load configuration from a TOML or YAML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e)))?;

    let is_yaml = path
        .extension()
        .map_or(false, |ext| ext == "yaml" || ext == "yml");

    let config: Config = if is_yaml {
        serde_yaml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    } else {
        toml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    };

    Ok(config)
}

/// Represents the complete FillableSync configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub fillable: FillableConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub driver: Option<String>,
    pub url: Option<String>,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub schema: Option<String>,
}

impl DatabaseConfig {
    /// Driver name, inferred from the url scheme when not configured
    pub fn resolved_driver(&self) -> Result<String> {
        if let Some(driver) = &self.driver {
            return Ok(driver.to_lowercase());
        }

        let url = self
            .url
            .as_deref()
            .ok_or_else(|| Error::ConfigError("No database url configured".to_string()))?;

        let scheme = url.split(':').next().unwrap_or_default().to_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Ok("postgres".to_string()),
            "mysql" | "mariadb" => Ok("mysql".to_string()),
            "sqlite" => Ok("sqlite".to_string()),
            _ => Err(Error::ConfigError(format!(
                "Cannot infer database driver from url scheme: {}", scheme
            ))),
        }
    }
}

/// Model discovery configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelsConfig {
    #[serde(default = "default_model_paths")]
    pub paths: Vec<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    pub exclude_paths: Option<Vec<String>>,
    #[serde(default = "default_base_classes")]
    pub base_classes: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            paths: default_model_paths(),
            extension: default_extension(),
            exclude_paths: None,
            base_classes: default_base_classes(),
        }
    }
}

/// Fillable generation behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FillableConfig {
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
    #[serde(default = "default_created_at_column")]
    pub created_at_column: String,
    #[serde(default = "default_updated_at_column")]
    pub updated_at_column: String,
    #[serde(default)]
    pub sync_dates: bool,
}

impl Default for FillableConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            identifier_column: default_identifier_column(),
            created_at_column: default_created_at_column(),
            updated_at_column: default_updated_at_column(),
            sync_dates: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: default_log_format(),
            stdout: true,
        }
    }
}

fn default_model_paths() -> Vec<String> {
    vec!["app".to_string()]
}

fn default_extension() -> String {
    "php".to_string()
}

fn default_base_classes() -> Vec<String> {
    [
        "Illuminate\\Database\\Eloquent\\Model",
        "Illuminate\\Foundation\\Auth\\User",
        "Illuminate\\Database\\Eloquent\\Relations\\Pivot",
        "Illuminate\\Database\\Eloquent\\Relations\\MorphPivot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude() -> Vec<String> {
    vec!["id".to_string()]
}

fn default_identifier_column() -> String {
    "id".to_string()
}

fn default_created_at_column() -> String {
    "created_at".to_string()
}

fn default_updated_at_column() -> String {
    "updated_at".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}
