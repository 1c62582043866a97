mod common;

use pretty_assertions::assert_eq;
use rstest::*;

use common::{model_source, strings, Project};
use fillable_sync::db::ColumnInfo;
use fillable_sync::fillable::PatchResult;
use fillable_sync::{Action, Config, Error, MemoryCatalog, Reconciler, Result, RunOptions, SchemaCatalog};

const USER_BODY: &str = "    protected $table = 'users';\n\n    protected $fillable = [\n        'name',\n        'email',\n    ];\n";

#[fixture]
fn catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_table(
            "users",
            &[
                ("id", "bigint"),
                ("name", "string"),
                ("email", "string"),
                ("created_at", "timestamp"),
                ("updated_at", "timestamp"),
            ],
        )
        .with_table(
            "posts",
            &[
                ("id", "bigint"),
                ("title", "string"),
                ("published_on", "date"),
                ("created_at", "timestamp"),
                ("updated_at", "timestamp"),
            ],
        )
}

fn options(project: &Project) -> RunOptions {
    RunOptions::from_config(&Config::default(), project.root())
}

fn run(catalog: &MemoryCatalog, options: &RunOptions) -> (Result<Vec<fillable_sync::ModelOutcome>>, String) {
    let config = Config::default();
    let mut out = Vec::new();
    let result = Reconciler::new(catalog, &config).unwrap().run(options, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[rstest]
fn test_dry_run_on_up_to_date_model(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/User.php", &model_source("App\\Models", "User", USER_BODY));

    let (result, output) = run(&catalog, &options(&project));
    let outcomes = result.unwrap();

    assert_eq!(
        output,
        "Model: App\\Models\\User\nNo changes\n----------------------------------------\n\n"
    );
    assert_eq!(outcomes[0].fillable, Action::Reported { diff: String::new() });
    assert!(!output.lines().any(|l| l.starts_with("+ ") || l.starts_with("- ")));
}

#[rstest]
fn test_dry_run_reports_diff_without_writing(catalog: MemoryCatalog) {
    let project = Project::new();
    let source = model_source("App\\Models", "Post", "    protected $fillable = ['body'];\n");
    project.write("app/Models/Post.php", &source);

    let (result, output) = run(&catalog, &options(&project));
    result.unwrap();

    assert_eq!(
        output,
        "Model: App\\Models\\Post\n\
         - protected $fillable = ['body'];\n\
         + protected $fillable = [\n\
         +         'title',\n\
         +         'published_on',\n\
         +     ];\n\
         ----------------------------------------\n\n"
    );
    assert_eq!(project.read("app/Models/Post.php"), source);
}

#[rstest]
fn test_write_mode_patches_every_model(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/Post.php", &model_source("App\\Models", "Post", ""));
    project.write("app/Models/User.php", &model_source("App\\Models", "User", USER_BODY));

    let mut options = options(&project);
    options.write_changes = true;

    let (result, output) = run(&catalog, &options);
    let outcomes = result.unwrap();

    assert_eq!(output, "");
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].table, "posts");
    assert_eq!(outcomes[0].fields, strings(&["title", "published_on"]));
    assert_eq!(outcomes[0].fillable, Action::Patched(PatchResult::Appended));
    assert_eq!(outcomes[1].fillable, Action::Patched(PatchResult::Unchanged));
    assert!(project
        .read("app/Models/Post.php")
        .contains("protected $fillable = [\n        'title',\n        'published_on',\n    ];"));
}

#[rstest]
fn test_specific_model_only(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/Post.php", &model_source("App\\Models", "Post", ""));
    project.write("app/Models/User.php", &model_source("App\\Models", "User", USER_BODY));

    let mut options = options(&project);
    options.model = Some("\\App\\Models\\User".to_string());

    let (result, output) = run(&catalog, &options);
    let outcomes = result.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].model, "App\\Models\\User");
    assert!(output.starts_with("Model: App\\Models\\User\n"));
}

#[rstest]
fn test_unknown_model_is_an_error(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/User.php", &model_source("App\\Models", "User", USER_BODY));

    let mut options = options(&project);
    options.model = Some("App\\Models\\Ghost".to_string());

    let (result, _) = run(&catalog, &options);
    assert!(matches!(result, Err(Error::ModelNotFound(name)) if name == "App\\Models\\Ghost"));
}

#[rstest]
fn test_missing_table_names_the_model(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/Invoice.php", &model_source("App\\Models", "Invoice", ""));

    let (result, _) = run(&catalog, &options(&project));
    match result {
        Err(Error::Model { model, source }) => {
            assert_eq!(model, "App\\Models\\Invoice");
            assert!(matches!(*source, Error::TableNotFound(ref table) if table == "invoices"));
        }
        other => panic!("expected a model error, got {:?}", other),
    }
}

struct OfflineCatalog;

impl SchemaCatalog for OfflineCatalog {
    fn describe(&self, _table: &str) -> Result<Vec<ColumnInfo>> {
        Err(Error::DatabaseError("connection refused".to_string()))
    }
}

#[test]
fn test_catalog_failure_aborts_run() {
    let project = Project::new();
    project.write("app/Models/Post.php", &model_source("App\\Models", "Post", ""));
    project.write("app/Models/User.php", &model_source("App\\Models", "User", ""));

    let config = Config::default();
    let mut opts = options(&project);
    opts.write_changes = true;
    let mut out = Vec::new();
    let result = Reconciler::new(&OfflineCatalog, &config).unwrap().run(&opts, &mut out);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("App\\Models\\Post"));
    assert!(!project.read("app/Models/User.php").contains("$fillable"));
}

#[rstest]
fn test_dates_sync(catalog: MemoryCatalog) {
    let project = Project::new();
    project.write("app/Models/Post.php", &model_source("App\\Models", "Post", ""));

    let mut options = options(&project);
    options.write_changes = true;
    options.sync_dates = true;

    let (result, _) = run(&catalog, &options);
    let outcomes = result.unwrap();

    assert_eq!(outcomes[0].dates, Some(Action::Patched(PatchResult::InsertedAfterAnchor)));
    assert!(project.read("app/Models/Post.php").contains(
        "        'published_on',\n    ];\n\n    protected $dates = ['published_on'];\n"
    ));
}

#[rstest]
fn test_dates_left_alone_without_date_columns(catalog: MemoryCatalog) {
    let project = Project::new();
    let body = format!("{}\n    protected $dates = ['created_at', 'updated_at'];\n", USER_BODY);
    let source = model_source("App\\Models", "User", &body);
    project.write("app/Models/User.php", &source);

    let mut options = options(&project);
    options.sync_dates = true;

    let (result, output) = run(&catalog, &options);
    let outcomes = result.unwrap();
    assert_eq!(outcomes[0].dates, None);
    assert_eq!(
        output,
        "Model: App\\Models\\User\nNo changes\n----------------------------------------\n\n"
    );

    options.write_changes = true;
    let (result, _) = run(&catalog, &options);
    let outcomes = result.unwrap();
    assert_eq!(outcomes[0].fillable, Action::Patched(PatchResult::Unchanged));
    assert_eq!(outcomes[0].dates, None);
    assert_eq!(project.read("app/Models/User.php"), source);
}
