use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fillable_sync::config::{self, Config, DEFAULT_CONFIG_FILE};
use fillable_sync::utils::logging::init_logging;
use fillable_sync::{FillableSyncClient, RunOptions};

/// FillableSync - keep Eloquent `$fillable` declarations in sync with the database
#[derive(Parser, Debug)]
#[command(name = "fillable_sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only reconcile this fully-qualified model class
    model: Option<String>,

    /// Write changes to the model files instead of printing a diff
    #[arg(long)]
    write: bool,

    /// Extra columns to exclude, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Project root (default: current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Model search roots relative to the project root, comma separated
    #[arg(long, value_delimiter = ',')]
    directories: Option<Vec<String>>,

    /// Also sync the `$dates` declaration
    #[arg(long)]
    dates: bool,

    /// Path to config file (default: <path>/fillable_sync.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_path = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };

    let mut config = load_config(cli.config.as_deref(), &project_path)?;
    if let Some(url) = &cli.database_url {
        config.database.url = Some(url.clone());
    }

    init_logging(&config.logging, cli.verbose)?;

    let options = RunOptions {
        write_changes: cli.write,
        model: cli.model.clone(),
        excluded_columns: cli.exclude.clone().unwrap_or_else(|| config.fillable.exclude.clone()),
        project_path,
        model_directories: cli
            .directories
            .clone()
            .unwrap_or_else(|| config.models.paths.clone()),
        sync_dates: cli.dates || config.fillable.sync_dates,
    };

    let client = FillableSyncClient::new(config).context("Failed to connect to the database")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    client.run(&options, &mut out, true)?;

    writeln!(out, "{}", "Fillable properties have been updated.".green())?;
    Ok(())
}

/// Explicit config file, else the project's default file, else defaults
fn load_config(path: Option<&Path>, project_path: &Path) -> Result<Config> {
    if let Some(path) = path {
        return Ok(config::load_from_file(path)?);
    }

    let default_path = project_path.join(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        Ok(config::load_from_file(&default_path)?)
    } else {
        Ok(Config::default())
    }
}
