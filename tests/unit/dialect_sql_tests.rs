//! Per-dialect DDL rendering tests

use pretty_assertions::assert_eq;
use rstest::*;

use rust_dbmerge::dialect::DbAdapter;
use rust_dbmerge::merge::{
    factory_with_adapter, merger_factory, MergeDirection, MergerToken, MergerTokenFactory,
};
use rust_dbmerge::model::{DbAttribute, DbEntity, DbRelationship, SqlType};
use rust_dbmerge::{Dialect, TokenError};

fn table() -> DbEntity {
    DbEntity::new("T")
        .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key().generated())
        .with_attribute(DbAttribute::new("C", SqlType::Varchar).length(50))
}

fn column() -> DbAttribute {
    DbAttribute::new("C", SqlType::Varchar).length(50)
}

/// Builds a token with the dialect's factory and renders it
fn render(dialect: Dialect, build: impl Fn(&dyn MergerTokenFactory) -> MergerToken) -> Vec<String> {
    let factory = merger_factory(dialect);
    build(factory.as_ref())
        .create_sql(factory.as_ref())
        .unwrap()
}

#[rstest]
#[case(Dialect::Generic, "CREATE TABLE T (ID INTEGER NOT NULL, C VARCHAR(50) NULL, PRIMARY KEY (ID))")]
#[case(Dialect::Hsql, "CREATE TABLE T (ID INTEGER NOT NULL GENERATED BY DEFAULT AS IDENTITY (START WITH 1), C VARCHAR(50) NULL, PRIMARY KEY (ID))")]
#[case(Dialect::Postgres, "CREATE TABLE T (ID INTEGER NOT NULL GENERATED BY DEFAULT AS IDENTITY, C VARCHAR(50) NULL, PRIMARY KEY (ID))")]
#[case(Dialect::MySql, "CREATE TABLE T (ID INTEGER NOT NULL AUTO_INCREMENT, C VARCHAR(50) NULL, PRIMARY KEY (ID)) ENGINE=InnoDB")]
#[case(Dialect::SqlServer, "CREATE TABLE T (ID INTEGER NOT NULL IDENTITY (1, 1), C VARCHAR(50) NULL, PRIMARY KEY (ID))")]
#[case(Dialect::Oracle, "CREATE TABLE T (ID INTEGER NOT NULL, C VARCHAR2(50) NULL, PRIMARY KEY (ID))")]
fn test_create_table(#[case] dialect: Dialect, #[case] expected: &str) {
    let sql = render(dialect, |f| f.create_create_table(MergeDirection::ToDb, table()));
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Generic, "DROP TABLE T")]
#[case(Dialect::MySql, "DROP TABLE T")]
#[case(Dialect::Postgres, "DROP TABLE T CASCADE")]
#[case(Dialect::Oracle, "DROP TABLE T CASCADE CONSTRAINTS")]
fn test_drop_table(#[case] dialect: Dialect, #[case] expected: &str) {
    let sql = render(dialect, |f| f.create_drop_table(MergeDirection::ToDb, table()));
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Generic, "ALTER TABLE T ADD COLUMN C VARCHAR(50)")]
#[case(Dialect::Hsql, "ALTER TABLE T ADD COLUMN C VARCHAR(50)")]
#[case(Dialect::Derby, "ALTER TABLE T ADD COLUMN C VARCHAR(50)")]
#[case(Dialect::MySql, "ALTER TABLE T ADD COLUMN C VARCHAR(50)")]
#[case(Dialect::SqlServer, "ALTER TABLE T ADD C VARCHAR(50)")]
#[case(Dialect::Oracle, "ALTER TABLE T ADD C VARCHAR2(50)")]
fn test_add_column(#[case] dialect: Dialect, #[case] expected: &str) {
    let sql = render(dialect, |f| f.create_add_column(MergeDirection::ToDb, table(), column()));
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Generic, "ALTER TABLE T ALTER COLUMN C SET NOT NULL")]
#[case(Dialect::Postgres, "ALTER TABLE T ALTER COLUMN C SET NOT NULL")]
#[case(Dialect::Derby, "ALTER TABLE T ALTER COLUMN C NOT NULL")]
#[case(Dialect::MySql, "ALTER TABLE T MODIFY C VARCHAR(50) NOT NULL")]
#[case(Dialect::SqlServer, "ALTER TABLE T ALTER COLUMN C VARCHAR(50) NOT NULL")]
#[case(Dialect::Oracle, "ALTER TABLE T MODIFY (C NOT NULL)")]
fn test_set_not_null(#[case] dialect: Dialect, #[case] expected: &str) {
    let sql = render(dialect, |f| {
        f.create_set_not_null(MergeDirection::ToDb, table(), column().mandatory())
    });
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Generic, "ALTER TABLE T ALTER COLUMN C DROP NOT NULL")]
#[case(Dialect::Hsql, "ALTER TABLE T ALTER COLUMN C SET NULL")]
#[case(Dialect::H2, "ALTER TABLE T ALTER COLUMN C SET NULL")]
#[case(Dialect::Derby, "ALTER TABLE T ALTER COLUMN C NULL")]
#[case(Dialect::MySql, "ALTER TABLE T MODIFY C VARCHAR(50) NULL")]
#[case(Dialect::SqlServer, "ALTER TABLE T ALTER COLUMN C VARCHAR(50) NULL")]
#[case(Dialect::Oracle, "ALTER TABLE T MODIFY (C NULL)")]
fn test_set_allow_null(#[case] dialect: Dialect, #[case] expected: &str) {
    let sql = render(dialect, |f| f.create_set_allow_null(MergeDirection::ToDb, table(), column()));
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Generic, "ALTER TABLE T ALTER COLUMN C VARCHAR(100)")]
#[case(Dialect::Derby, "ALTER TABLE T ALTER COLUMN C SET DATA TYPE VARCHAR(100)")]
#[case(Dialect::Postgres, "ALTER TABLE T ALTER COLUMN C TYPE VARCHAR(100)")]
#[case(Dialect::MySql, "ALTER TABLE T MODIFY C VARCHAR(100) NULL")]
#[case(Dialect::SqlServer, "ALTER TABLE T ALTER COLUMN C VARCHAR(100) NULL")]
#[case(Dialect::Oracle, "ALTER TABLE T MODIFY (C VARCHAR2(100))")]
fn test_set_column_type(#[case] dialect: Dialect, #[case] expected: &str) {
    let wider = DbAttribute::new("C", SqlType::Varchar).length(100);
    let sql = render(dialect, |f| {
        f.create_set_column_type(MergeDirection::ToDb, table(), column(), wider.clone())
    });
    assert_eq!(sql, vec![expected]);
}

#[rstest]
#[case(Dialect::Hsql, "ALTER TABLE T ALTER COLUMN ID INTEGER GENERATED BY DEFAULT AS IDENTITY")]
#[case(Dialect::H2, "ALTER TABLE T ALTER COLUMN ID INTEGER AUTO_INCREMENT")]
#[case(Dialect::Postgres, "ALTER TABLE T ALTER COLUMN ID ADD GENERATED BY DEFAULT AS IDENTITY")]
#[case(Dialect::MySql, "ALTER TABLE T MODIFY ID INTEGER NOT NULL AUTO_INCREMENT")]
fn test_add_generated_flag(#[case] dialect: Dialect, #[case] expected: &str) {
    let id = DbAttribute::new("ID", SqlType::Integer).primary_key();
    let sql = render(dialect, |f| {
        f.create_set_generated_flag(MergeDirection::ToDb, table(), id.clone(), true)
    });
    assert_eq!(sql, vec![expected]);
}

#[test]
fn test_mysql_modify_keeps_auto_increment() {
    let id = DbAttribute::new("ID", SqlType::Integer).primary_key().generated();
    let wider = DbAttribute::new("ID", SqlType::BigInt).primary_key().generated();

    let sql = render(Dialect::MySql, |f| {
        f.create_set_column_type(MergeDirection::ToDb, table(), id.clone(), wider.clone())
    });
    assert_eq!(sql, vec!["ALTER TABLE T MODIFY ID BIGINT NOT NULL AUTO_INCREMENT"]);

    let sql = render(Dialect::MySql, |f| {
        f.create_set_not_null(MergeDirection::ToDb, table(), id.clone())
    });
    assert_eq!(sql, vec!["ALTER TABLE T MODIFY ID INTEGER NOT NULL AUTO_INCREMENT"]);

    let sql = render(Dialect::MySql, |f| {
        f.create_set_generated_flag(MergeDirection::ToDb, table(), id.clone(), false)
    });
    assert_eq!(sql, vec!["ALTER TABLE T MODIFY ID INTEGER NOT NULL"]);
}

#[rstest]
#[case(Dialect::Generic)]
#[case(Dialect::Derby)]
#[case(Dialect::SqlServer)]
#[case(Dialect::Oracle)]
fn test_generated_flag_unsupported(#[case] dialect: Dialect) {
    let factory = merger_factory(dialect);
    let id = DbAttribute::new("ID", SqlType::Integer).primary_key();
    for flag in [true, false] {
        let token = factory.create_set_generated_flag(MergeDirection::ToDb, table(), id.clone(), flag);
        match token.create_sql(factory.as_ref()) {
            Err(TokenError::Unsupported(unsupported)) => assert_eq!(unsupported.dialect, dialect),
            other => panic!("Expected unsupported feature, got {:?}", other),
        }
    }
}

#[rstest]
#[case(Dialect::Generic, Some("PK_T"), vec!["ALTER TABLE T DROP CONSTRAINT PK_T", "ALTER TABLE T ADD PRIMARY KEY (ID)"])]
#[case(Dialect::Postgres, None, vec!["ALTER TABLE T DROP CONSTRAINT t_pkey", "ALTER TABLE T ADD PRIMARY KEY (ID)"])]
#[case(Dialect::SqlServer, Some("PK_T"), vec!["ALTER TABLE T DROP CONSTRAINT PK_T", "ALTER TABLE T ADD PRIMARY KEY (ID)"])]
fn test_set_primary_key(
    #[case] dialect: Dialect,
    #[case] pk_name: Option<&str>,
    #[case] expected: Vec<&str>,
) {
    let sql = render(dialect, |f| {
        f.create_set_primary_key(
            MergeDirection::ToDb,
            table(),
            vec!["C".to_string()],
            vec!["ID".to_string()],
            pk_name.map(str::to_string),
        )
    });
    assert_eq!(sql, expected);
}

#[test]
fn test_add_relationship_renders_fk() {
    let factory = merger_factory(Dialect::Generic);
    let relationship = DbRelationship::new("toArtist", "PAINTING", "ARTIST")
        .join("ARTIST_ID", "ARTIST_ID")
        .fk_name("FK_PAINTING_ARTIST");
    let token = factory.create_add_relationship(
        MergeDirection::ToDb,
        DbEntity::new("PAINTING"),
        relationship,
        DbEntity::new("ARTIST"),
    );
    assert_eq!(
        token.create_sql(factory.as_ref()).unwrap(),
        vec!["ALTER TABLE PAINTING ADD CONSTRAINT FK_PAINTING_ARTIST FOREIGN KEY (ARTIST_ID) REFERENCES ARTIST (ARTIST_ID)"]
    );
}

#[test]
fn test_value_for_null_update() {
    let sql = render(Dialect::Generic, |f| {
        f.create_set_value_for_null(MergeDirection::ToDb, table(), column(), "'n/a'".to_string())
    });
    assert_eq!(sql, vec!["UPDATE T SET C = 'n/a' WHERE C IS NULL"]);
}

#[rstest]
#[case(Dialect::Generic, "ALTER TABLE \"APP\".\"T\" ADD COLUMN \"C\" VARCHAR(50)")]
#[case(Dialect::MySql, "ALTER TABLE `APP`.`T` ADD COLUMN `C` VARCHAR(50)")]
#[case(Dialect::SqlServer, "ALTER TABLE [APP].[T] ADD [C] VARCHAR(50)")]
fn test_quoted_identifiers(#[case] dialect: Dialect, #[case] expected: &str) {
    let factory = factory_with_adapter(DbAdapter::new(dialect).with_quoting(true));
    let token = factory.create_add_column(MergeDirection::ToDb, table().in_schema("APP"), column());
    assert_eq!(token.create_sql(factory.as_ref()).unwrap(), vec![expected]);
}

#[test]
fn test_model_ward_tokens_render_nothing() {
    let factory = merger_factory(Dialect::Postgres);
    let token = factory.create_drop_table(MergeDirection::ToModel, table());
    assert!(token.create_sql(factory.as_ref()).unwrap().is_empty());
}

#[test]
fn test_undefined_type_is_reported() {
    let factory = merger_factory(Dialect::Generic);
    let token = factory.create_add_column(
        MergeDirection::ToDb,
        table(),
        DbAttribute::new("X", SqlType::Other),
    );
    assert!(matches!(
        token.create_sql(factory.as_ref()),
        Err(TokenError::UndefinedType { .. })
    ));
}
