//! Schema catalog
//!
//! Lists the columns of a table and their data types. The sqlx-backed
//! catalog owns a current-thread runtime and blocks on every query, so callers
//! stay synchronous.

use sqlx::{FromRow, Row};
use std::collections::HashMap;

use crate::config::DatabaseConfig;
use crate::db::connection::DatabaseConnection;
use crate::error::{Error, Result};

/// A column of a table as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Schema introspection capability
pub trait SchemaCatalog {
    /// Columns of `table` in their declared order
    ///
    /// An unknown table is an error, never an empty listing.
    fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Column names of `table` in their declared order
    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.describe(table)?.into_iter().map(|c| c.name).collect())
    }

    /// Normalized data type of one column
    fn column_type(&self, table: &str, column: &str) -> Result<String> {
        self.describe(table)?
            .into_iter()
            .find(|c| c.name == column)
            .map(|c| c.data_type)
            .ok_or_else(|| Error::DatabaseError(format!(
                "Column {} not found in table {}", column, table
            )))
    }
}

/// Map a raw database type onto the small vocabulary used by the tool
pub fn normalize_type(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    // `varchar(255)`, `bigint unsigned` and `timestamp without time zone` keep their first word
    let base = lowered
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    match base {
        "date" => "date",
        "datetime" | "datetime2" | "smalldatetime" => "datetime",
        t if t.starts_with("timestamp") => "timestamp",
        t if t.starts_with("time") => "time",
        "bool" | "boolean" => "boolean",
        "bigint" | "int8" | "bigserial" => "bigint",
        "smallint" | "int2" | "tinyint" => "smallint",
        "int" | "integer" | "int4" | "mediumint" | "serial" => "integer",
        "uuid" => "uuid",
        t if t.contains("char") || t == "string" => "string",
        t if t.contains("text") || t == "clob" => "text",
        "decimal" | "numeric" | "money" => "decimal",
        "real" | "float" | "float4" | "float8" | "double" => "float",
        "json" | "jsonb" => "json",
        t if t.contains("blob") || t == "bytea" || t.contains("binary") => "binary",
        _ => return raw.trim().to_lowercase(),
    }
    .to_string()
}

#[derive(FromRow)]
struct ColumnRow {
    column_name: String,
    data_type: String,
}

/// Catalog backed by a live database connection
pub struct SqlCatalog {
    // Declared before the runtime so the pool is dropped first
    connection: DatabaseConnection,
    schema: Option<String>,
    runtime: tokio::runtime::Runtime,
}

impl SqlCatalog {
    /// Connect to the configured database
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let connection = runtime.block_on(DatabaseConnection::connect(config))?;

        tracing::debug!(driver = connection.driver(), "Connected to database");

        Ok(Self {
            connection,
            schema: config.schema.clone(),
            runtime,
        })
    }

    /// Execute a raw SQL statement on the underlying connection
    pub fn execute(&self, sql: &str) -> Result<()> {
        self.runtime.block_on(self.connection.execute(sql))
    }

    async fn fetch_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = match &self.connection {
            DatabaseConnection::Postgres(pool) => {
                let sql = r#"
                    SELECT column_name::text AS column_name, data_type::text AS data_type
                    FROM information_schema.columns
                    WHERE table_schema = $1 AND table_name = $2
                    ORDER BY ordinal_position
                "#;

                sqlx::query_as::<_, ColumnRow>(sql)
                    .bind(self.schema.as_deref().unwrap_or("public"))
                    .bind(table)
                    .fetch_all(pool)
                    .await?
            }
            DatabaseConnection::MySql(pool) => {
                let sql = r#"
                    SELECT CAST(column_name AS CHAR) AS column_name, CAST(data_type AS CHAR) AS data_type
                    FROM information_schema.columns
                    WHERE table_schema = COALESCE(?, DATABASE()) AND table_name = ?
                    ORDER BY ordinal_position
                "#;

                sqlx::query_as::<_, ColumnRow>(sql)
                    .bind(self.schema.as_deref())
                    .bind(table)
                    .fetch_all(pool)
                    .await?
            }
            DatabaseConnection::Sqlite(pool) => {
                let pragma = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
                let rows = sqlx::query(&pragma).fetch_all(pool).await?;

                let mut columns = Vec::with_capacity(rows.len());
                for row in rows {
                    columns.push(ColumnRow {
                        column_name: row.try_get("name")?,
                        data_type: row.try_get("type")?,
                    });
                }
                columns
            }
        };

        if rows.is_empty() {
            return Err(Error::TableNotFound(table.to_string()));
        }

        Ok(rows
            .into_iter()
            .map(|row| ColumnInfo::new(row.column_name, normalize_type(&row.data_type)))
            .collect())
    }
}

impl SchemaCatalog for SqlCatalog {
    fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.runtime.block_on(self.fetch_columns(table))
    }
}

/// Catalog holding table definitions in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, Vec<ColumnInfo>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table from `(column, type)` pairs, keeping their order
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str)]) -> Self {
        self.add_table(
            table,
            columns.iter().map(|(name, ty)| ColumnInfo::new(*name, *ty)).collect(),
        );
        self
    }

    pub fn add_table(&mut self, table: &str, columns: Vec<ColumnInfo>) {
        self.tables.insert(table.to_string(), columns);
    }
}

impl SchemaCatalog for MemoryCatalog {
    fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }
}
