//! End-to-end planning from schema files on disk

use std::fs::File;

use pretty_assertions::assert_eq;

use rust_dbmerge::loader::{load_data_map, write_data_map};
use rust_dbmerge::{plan_merge, Dialect, MergeOptions, PlannedMerge};

use crate::common::TestContext;

fn gallery_options(ctx: &TestContext, dialect: Dialect) -> MergeOptions {
    MergeOptions {
        model: ctx.path("model/gallery.map.xml"),
        db: ctx.path("db"),
        dialect,
        ..Default::default()
    }
}

fn statements(planned: &PlannedMerge) -> Vec<String> {
    planned
        .plan
        .tokens
        .iter()
        .flat_map(|token| token.create_sql(planned.factory.as_ref()).unwrap())
        .collect()
}

#[test]
fn test_plan_from_fixture_files() {
    let ctx = TestContext::with_fixture("gallery");
    let planned = plan_merge(&gallery_options(&ctx, Dialect::Postgres)).unwrap();

    assert_eq!(planned.db.len(), 3);
    assert!(planned.plan.warnings.is_empty());
    assert_eq!(
        statements(&planned),
        vec![
            "DROP TABLE PAINTING_ARCHIVE CASCADE",
            "CREATE TABLE GALLERY (GALLERY_ID INTEGER NOT NULL, GALLERY_NAME VARCHAR(100) NOT NULL, PRIMARY KEY (GALLERY_ID))",
            "ALTER TABLE PAINTING ADD COLUMN GALLERY_ID INTEGER",
            "ALTER TABLE ARTIST ALTER COLUMN ARTIST_NAME TYPE CHAR(254)",
            "ALTER TABLE PAINTING ADD FOREIGN KEY (GALLERY_ID) REFERENCES GALLERY (GALLERY_ID)",
        ]
    );
}

#[test]
fn test_added_file_changes_the_plan() {
    let ctx = TestContext::with_fixture("gallery");
    ctx.write(
        "db/03_gallery.sql",
        "CREATE TABLE GALLERY (\n    GALLERY_ID INTEGER NOT NULL PRIMARY KEY,\n    GALLERY_NAME VARCHAR(100) NOT NULL\n);\n",
    );

    let planned = plan_merge(&gallery_options(&ctx, Dialect::Postgres)).unwrap();
    let names: Vec<&str> = planned.plan.tokens.iter().map(|t| t.token_name()).collect();
    assert_eq!(
        names,
        vec!["Drop Table", "Add Column", "Set Column Type", "Add Relationship"]
    );
}

#[test]
fn test_exclude_option_keeps_archive_table() {
    let ctx = TestContext::with_fixture("gallery");
    let options = MergeOptions {
        exclude_tables: vec![".*_ARCHIVE".to_string()],
        ..gallery_options(&ctx, Dialect::Postgres)
    };

    let planned = plan_merge(&options).unwrap();
    assert!(planned
        .plan
        .tokens
        .iter()
        .all(|t| t.token_name() != "Drop Table"));
}

#[test]
fn test_invalid_value_for_null_entry() {
    let ctx = TestContext::with_fixture("gallery");
    let options = MergeOptions {
        values_for_null: vec!["GALLERY_NAME".to_string()],
        ..gallery_options(&ctx, Dialect::Generic)
    };

    let err = plan_merge(&options).err().unwrap();
    assert!(err.to_string().contains("Invalid value-for-null entry 'GALLERY_NAME'"));
}

#[test]
fn test_missing_schema_source_is_an_error() {
    let ctx = TestContext::with_fixture("gallery");
    let options = MergeOptions {
        db: ctx.path("does-not-exist"),
        ..gallery_options(&ctx, Dialect::Generic)
    };
    assert!(plan_merge(&options).is_err());
}

#[test]
fn test_script_has_header_and_terminated_statements() {
    let ctx = TestContext::with_fixture("gallery");
    let mut planned = plan_merge(&gallery_options(&ctx, Dialect::Postgres)).unwrap();

    let mut out = Vec::new();
    let report = planned.write_script(&mut out).unwrap();
    let script = String::from_utf8(out).unwrap();

    assert!(report.is_success());
    assert!(script.starts_with("-- Generated by rust-dbmerge"));
    assert!(script.contains("-- Dialect: postgres\n"));
    assert!(script.contains("DROP TABLE PAINTING_ARCHIVE CASCADE;\n"));
    let statements: Vec<&str> = script
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .collect();
    assert_eq!(statements.len(), 5);
    assert!(statements.iter().all(|line| line.ends_with(';')));
}

#[test]
fn test_sqlserver_script_uses_go_batches() {
    let ctx = TestContext::with_fixture("gallery");
    let mut planned = plan_merge(&gallery_options(&ctx, Dialect::SqlServer)).unwrap();

    let mut out = Vec::new();
    planned.write_script(&mut out).unwrap();
    let script = String::from_utf8(out).unwrap();

    assert!(script.contains("-- Dialect: sqlserver\n"));
    assert_eq!(script.lines().filter(|line| *line == "GO").count(), 5);
}

#[test]
fn test_updated_model_round_trips_through_map_file() {
    let ctx = TestContext::with_fixture("gallery");
    let options = gallery_options(&ctx, Dialect::Generic);
    let mut planned = plan_merge(&options).unwrap();

    planned.reverse().unwrap();
    let outcome = planned.execute(None);
    assert!(outcome.report.is_success());

    let updated = ctx.root.join("model/updated.map.xml");
    write_data_map(&planned.model, File::create(&updated).unwrap()).unwrap();
    let reloaded = load_data_map(updated.to_str().unwrap(), Dialect::Generic).unwrap();
    assert!(reloaded.entity("GALLERY").is_none());
    assert!(reloaded.entity("PAINTING_ARCHIVE").is_some());

    let replanned = plan_merge(&MergeOptions {
        model: updated.to_string_lossy().into_owned(),
        ..options
    })
    .unwrap();
    assert!(replanned.plan.is_empty(), "{:?}", replanned.plan.tokens);
}
