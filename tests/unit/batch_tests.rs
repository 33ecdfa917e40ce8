//! Batch DML builder tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::*;

use rust_dbmerge::batch::{
    DeleteBatchQueryBuilder, InsertBatchQueryBuilder, RowSnapshot, UpdateBatchQueryBuilder,
};
use rust_dbmerge::dialect::QuotingStrategy;
use rust_dbmerge::model::{DbAttribute, DbEntity, SqlType};

const QUALIFIER: [&str; 3] = ["LOCKING_TEST_ID", "NAME", "DESCRIPTION"];

fn locking_test() -> DbEntity {
    DbEntity::new("LOCKING_TEST")
        .with_attribute(DbAttribute::new("LOCKING_TEST_ID", SqlType::Integer).primary_key().generated())
        .with_attribute(DbAttribute::new("NAME", SqlType::Varchar).length(100))
        .with_attribute(DbAttribute::new("DESCRIPTION", SqlType::Varchar).length(200))
}

#[rstest]
#[case(RowSnapshot::new(), "DELETE FROM LOCKING_TEST WHERE LOCKING_TEST_ID = ? AND NAME = ? AND DESCRIPTION = ?")]
#[case(RowSnapshot::new().with_null("NAME"), "DELETE FROM LOCKING_TEST WHERE LOCKING_TEST_ID = ? AND NAME IS NULL AND DESCRIPTION = ?")]
#[case(RowSnapshot::new().with_null("name").with_null("DESCRIPTION"), "DELETE FROM LOCKING_TEST WHERE LOCKING_TEST_ID = ? AND NAME IS NULL AND DESCRIPTION IS NULL")]
fn test_delete_null_patterns(#[case] row: RowSnapshot, #[case] expected: &str) {
    let entity = locking_test();
    let builder =
        DeleteBatchQueryBuilder::new(&entity, QuotingStrategy::unquoted()).with_qualifier(QUALIFIER);
    assert_eq!(builder.create_sql(&row), expected);
}

#[test]
fn test_insert_with_generated_key() {
    let entity = locking_test();
    let builder =
        InsertBatchQueryBuilder::new(&entity, QuotingStrategy::unquoted()).include_generated(true);
    assert_eq!(
        builder.create_sql(),
        "INSERT INTO LOCKING_TEST (LOCKING_TEST_ID, NAME, DESCRIPTION) VALUES (?, ?, ?)"
    );
}

#[test]
fn test_update_quoted_in_schema() {
    let entity = locking_test().in_schema("APP");
    let builder = UpdateBatchQueryBuilder::new(
        &entity,
        QuotingStrategy::default().enabled(true),
        ["NAME", "DESCRIPTION"],
    );
    assert_eq!(
        builder.create_sql(&RowSnapshot::new()),
        r#"UPDATE "APP"."LOCKING_TEST" SET "NAME" = ?, "DESCRIPTION" = ? WHERE "LOCKING_TEST_ID" = ?"#
    );
}

fn snapshot(nulls: &[bool]) -> RowSnapshot {
    QUALIFIER
        .iter()
        .zip(nulls)
        .filter(|(_, null)| **null)
        .fold(RowSnapshot::new(), |row, (column, _)| row.with_null(*column))
}

proptest! {
    #[rstest]
    fn prop_delete_placeholders_match_parameters(nulls in prop::collection::vec(any::<bool>(), 3)) {
        let entity = locking_test();
        let row = snapshot(&nulls);
        let builder = DeleteBatchQueryBuilder::new(&entity, QuotingStrategy::unquoted())
            .with_qualifier(QUALIFIER);

        let sql = builder.create_sql(&row);
        let params = builder.parameters(&row);
        prop_assert_eq!(sql.matches('?').count(), params.len());
        prop_assert_eq!(sql.matches("IS NULL").count(), nulls.iter().filter(|n| **n).count());
    }

    #[rstest]
    fn prop_update_placeholders_match_parameters(nulls in prop::collection::vec(any::<bool>(), 3)) {
        let entity = locking_test();
        let row = snapshot(&nulls);
        let builder = UpdateBatchQueryBuilder::new(&entity, QuotingStrategy::unquoted(), ["NAME"])
            .with_qualifier(QUALIFIER);

        let sql = builder.create_sql(&row);
        prop_assert_eq!(sql.matches('?').count(), builder.parameters(&row).len());
        prop_assert!(sql.starts_with("UPDATE LOCKING_TEST SET NAME = ? WHERE LOCKING_TEST_ID"));
    }
}
