//! Error types for FillableSync

use thiserror::Error;

/// Result type for FillableSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for FillableSync
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Model discovery error: {0}")]
    ModelDiscoveryError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Patch error: {0}")]
    PatchError(String),

    #[error("Failed to reconcile model {model}: {source}")]
    Model {
        model: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Attach the model being reconciled to an error
    pub fn for_model(self, model: &str) -> Self {
        Error::Model {
            model: model.to_string(),
            source: Box::new(self),
        }
    }
}

/// Convert TOML deserialization errors to FillableSync errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

/// Convert YAML deserialization errors to FillableSync errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

/// Declaration patterns are built at runtime from property names
impl From<regex::Error> for Error {
    fn from(error: regex::Error) -> Self {
        Error::PatchError(format!("Invalid declaration pattern: {}", error))
    }
}
