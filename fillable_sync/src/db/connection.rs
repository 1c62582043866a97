//! Database connection handling
//!
//! This module provides functionality to establish and manage database connections.

use sqlx::{
    mysql::MySqlPoolOptions,
    postgres::PgPoolOptions,
    sqlite::SqlitePoolOptions,
    MySql, Pool, Postgres, Sqlite,
};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// Enumeration of supported database types
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
    Sqlite(Pool<Sqlite>),
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::ConfigError("No database url configured".to_string()))?;
        let pool_size = config.pool_size.unwrap_or(1);
        let timeout = std::time::Duration::from_secs(config.timeout_seconds.unwrap_or(30));

        match config.resolved_driver()?.as_str() {
            "postgres" => {
                let pool = PgPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect(url)
                    .await?;

                Ok(DatabaseConnection::Postgres(pool))
            }
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect(url)
                    .await?;

                Ok(DatabaseConnection::MySql(pool))
            }
            "sqlite" => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect(url)
                    .await?;

                Ok(DatabaseConnection::Sqlite(pool))
            }
            driver => Err(Error::DatabaseError(format!(
                "Unsupported database driver: {}", driver
            ))),
        }
    }

    /// Driver name of this connection
    pub fn driver(&self) -> &'static str {
        match self {
            DatabaseConnection::Postgres(_) => "postgres",
            DatabaseConnection::MySql(_) => "mysql",
            DatabaseConnection::Sqlite(_) => "sqlite",
        }
    }

    /// Execute a SQL statement
    pub async fn execute(&self, sql: &str) -> Result<()> {
        match self {
            DatabaseConnection::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            DatabaseConnection::MySql(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            DatabaseConnection::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }
        Ok(())
    }
}
