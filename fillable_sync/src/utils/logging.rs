//! Logging utilities for FillableSync
//!
//! This module provides logging setup and configuration. Log output goes to
//! stderr or a file so that stdout only carries the diff report.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};
use std::path::Path;
use std::fs::File;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a configured level name, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &Option<LoggingConfig>, verbose: bool) -> Result<()> {
    let default_config = LoggingConfig::default();
    let config = config.as_ref().unwrap_or(&default_config);

    let level = if verbose { Level::DEBUG } else { parse_level(&config.level) };

    let directive = format!("fillable_sync={}", level)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid log directive: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);

    let json = config.format.to_lowercase() == "json";

    if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(file_path)?;
        let builder = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(file);

        if json {
            tracing::subscriber::set_global_default(builder.json().finish())
                .map_err(|e| Error::Unknown(e.to_string()))?;
        } else {
            tracing::subscriber::set_global_default(builder.finish())
                .map_err(|e| Error::Unknown(e.to_string()))?;
        }
    } else if config.stdout {
        let builder = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr);

        if json {
            tracing::subscriber::set_global_default(builder.json().finish())
                .map_err(|e| Error::Unknown(e.to_string()))?;
        } else {
            tracing::subscriber::set_global_default(builder.finish())
                .map_err(|e| Error::Unknown(e.to_string()))?;
        }
    }

    Ok(())
}
