mod common;

use pretty_assertions::assert_eq;
use rstest::*;

use common::{model_source, strings, Project};
use fillable_sync::config::DatabaseConfig;
use fillable_sync::db::normalize_type;
use fillable_sync::{Config, Error, Reconciler, RunOptions, SchemaCatalog, SqlCatalog};

fn memory_catalog() -> SqlCatalog {
    let config = DatabaseConfig {
        url: Some("sqlite::memory:".to_string()),
        pool_size: Some(1),
        ..Default::default()
    };
    let catalog = SqlCatalog::connect(&config).unwrap();
    catalog
        .execute(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                born_on DATE,
                verified_at DATETIME,
                created_at TIMESTAMP,
                updated_at TIMESTAMP
            )",
        )
        .unwrap();
    catalog
}

#[test]
fn test_lists_columns_in_table_order() {
    let catalog = memory_catalog();
    assert_eq!(
        catalog.list_columns("users").unwrap(),
        strings(&["id", "name", "born_on", "verified_at", "created_at", "updated_at"])
    );
}

#[test]
fn test_column_types_are_normalized() {
    let catalog = memory_catalog();
    assert_eq!(catalog.column_type("users", "id").unwrap(), "integer");
    assert_eq!(catalog.column_type("users", "name").unwrap(), "string");
    assert_eq!(catalog.column_type("users", "born_on").unwrap(), "date");
    assert_eq!(catalog.column_type("users", "verified_at").unwrap(), "datetime");
}

#[test]
fn test_unknown_table() {
    let catalog = memory_catalog();
    assert!(matches!(catalog.list_columns("ghosts"), Err(Error::TableNotFound(_))));
}

#[test]
fn test_reconcile_against_sqlite() {
    let catalog = memory_catalog();
    let project = Project::new();
    project.write("app/Models/User.php", &model_source("App\\Models", "User", ""));

    let config = Config::default();
    let mut options = RunOptions::from_config(&config, project.root());
    options.write_changes = true;
    options.sync_dates = true;

    let mut out = Vec::new();
    let outcomes = Reconciler::new(&catalog, &config)
        .unwrap()
        .run(&options, &mut out)
        .unwrap();

    assert_eq!(outcomes[0].fields, strings(&["name", "born_on", "verified_at"]));
    let source = project.read("app/Models/User.php");
    assert!(source.contains("protected $dates = ['born_on', 'verified_at'];"));
}

#[rstest]
#[case("INTEGER", "integer")]
#[case("int(11)", "integer")]
#[case("BIGINT UNSIGNED", "bigint")]
#[case("character varying", "string")]
#[case("varchar(255)", "string")]
#[case("timestamp without time zone", "timestamp")]
#[case("time", "time")]
#[case("tinyint(1)", "smallint")]
#[case("jsonb", "json")]
#[case("numeric(8,2)", "decimal")]
#[case("point", "point")]
#[case("INTERVAL", "interval")]
fn test_normalize_type(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(normalize_type(raw), expected);
}
