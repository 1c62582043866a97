//! Field calculator
//!
//! Turns a table's column listing into the fillable field list.

use crate::db::catalog::SchemaCatalog;
use crate::error::Result;
use crate::fillable::exclusions::ExclusionSet;

/// Normalized types stored in `$dates`
pub const DATE_TYPES: &[&str] = &["date", "datetime", "timestamp"];

/// Table columns minus exclusions, in table order
pub fn compute_fields<C>(catalog: &C, table: &str, exclusions: &ExclusionSet) -> Result<Vec<String>>
where
    C: SchemaCatalog + ?Sized,
{
    let fields: Vec<String> = catalog
        .list_columns(table)?
        .into_iter()
        .filter(|column| !exclusions.contains(column))
        .collect();

    tracing::debug!(table = table, fields = fields.len(), "Computed fillable fields");
    Ok(fields)
}

/// Date-typed columns of `table`, excluding the timestamp columns
pub fn date_columns<C>(catalog: &C, table: &str, timestamps: &[String]) -> Result<Vec<String>>
where
    C: SchemaCatalog + ?Sized,
{
    Ok(catalog
        .describe(table)?
        .into_iter()
        .filter(|column| DATE_TYPES.contains(&column.data_type.as_str()))
        .filter(|column| !timestamps.contains(&column.name))
        .map(|column| column.name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::MemoryCatalog;

    #[test]
    fn test_exclusions_keep_table_order() {
        let catalog = MemoryCatalog::new().with_table(
            "posts",
            &[("id", "bigint"), ("title", "string"), ("body", "text"), ("created_at", "timestamp")],
        );
        let exclusions: ExclusionSet = ["created_at", "id"].into_iter().collect();

        let fields = compute_fields(&catalog, "posts", &exclusions).unwrap();
        assert_eq!(fields, vec!["title", "body"]);
    }

    #[test]
    fn test_date_columns_skip_timestamps() {
        let catalog = MemoryCatalog::new().with_table(
            "events",
            &[
                ("id", "bigint"),
                ("starts_on", "date"),
                ("published_at", "datetime"),
                ("created_at", "timestamp"),
                ("updated_at", "timestamp"),
            ],
        );
        let timestamps = vec!["created_at".to_string(), "updated_at".to_string()];

        let dates = date_columns(&catalog, "events", &timestamps).unwrap();
        assert_eq!(dates, vec!["starts_on", "published_at"]);
    }
}
