//! Executing planned tokens against data sources and the model

use pretty_assertions::assert_eq;

use rust_dbmerge::datasource::{DataSource, ScriptDataSource};
use rust_dbmerge::merge::{
    merger_factory, DbMerger, MergeDirection, MergerContext, TokenStatus,
};
use rust_dbmerge::model::{DataMap, DbAttribute, SqlType};
use rust_dbmerge::pk::{generate_pk, AutoPkSupport};
use rust_dbmerge::{plan_with_factory, Dialect, MergeOptions, PlannedMerge};

use crate::common::{artist, gallery_model, with_entity_changed, FailingDataSource};

#[test]
fn test_failed_statement_does_not_stop_the_batch() {
    let factory = merger_factory(Dialect::Generic);
    let plan = DbMerger::new(factory.as_ref())
        .create_merge_tokens(&gallery_model(), &DataMap::new("db"))
        .unwrap();
    let mut source = FailingDataSource::failing_on(&["CREATE TABLE GALLERY"]);
    let mut model = gallery_model();

    let (report, failures) = {
        let mut context =
            MergerContext::new(factory.as_ref(), &mut model).with_data_source(&mut source);
        let report = context.execute_tokens(&plan.tokens);
        (report, context.validation().failures().to_vec())
    };

    assert!(!report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.executed_count(), 4);
    assert_eq!(report.outcomes[1].token, "Create Table GALLERY To DB");
    assert!(matches!(report.outcomes[1].status, TokenStatus::Failed(_)));

    assert_eq!(failures.len(), 1);
    assert!(failures[0].message.contains("code 42"));
    assert_eq!(source.executed.len(), 4);
    assert!(source.executed[0].starts_with("CREATE TABLE ARTIST"));
}

#[test]
fn test_database_tokens_need_a_data_source() {
    let factory = merger_factory(Dialect::Generic);
    let mut model = gallery_model();
    let token = factory.create_drop_table(MergeDirection::ToDb, artist());

    let mut context = MergerContext::new(factory.as_ref(), &mut model);
    let report = context.execute_tokens(&[token]);
    assert_eq!(report.failed_count(), 1);
    assert!(context.validation().failures()[0]
        .message
        .contains("no data source configured"));
}

#[test]
fn test_unsupported_generated_flag_is_skipped() {
    let model = with_entity_changed(&gallery_model(), "GALLERY", |gallery| {
        gallery.attribute_mut("GALLERY_ID").unwrap().generated = true;
    });
    let db = gallery_model();
    let factory = merger_factory(Dialect::Derby);
    let plan = DbMerger::new(factory.as_ref())
        .create_merge_tokens(&model, &db)
        .unwrap();
    assert_eq!(plan.len(), 1);

    let mut script = ScriptDataSource::new();
    let mut target = model.clone();
    let report = MergerContext::new(factory.as_ref(), &mut target)
        .with_data_source(&mut script)
        .execute_tokens(&plan.tokens);

    assert!(report.is_success());
    assert_eq!(report.unsupported_count(), 1);
    match &report.outcomes[0].status {
        TokenStatus::Unsupported(unsupported) => assert_eq!(unsupported.dialect, Dialect::Derby),
        other => panic!("Expected unsupported token, got {:?}", other),
    }
    assert!(script.statements().is_empty());
}

#[test]
fn test_reversed_plan_brings_model_in_line_with_database() {
    let model = gallery_model();
    let db = with_entity_changed(&model, "ARTIST", |artist| {
        artist.remove_attribute("DATE_OF_BIRTH");
        artist.add_attribute(DbAttribute::new("NICKNAME", SqlType::Varchar).length(40));
    });
    let db = with_entity_changed(&db, "GALLERY", |gallery| {
        gallery.attribute_mut("GALLERY_NAME").unwrap().max_length = Some(50);
    });
    let db = with_entity_changed(&db, "PAINTING", |painting| {
        painting.remove_relationship("toGallery");
    });

    let options = MergeOptions::default();
    let factory = merger_factory(Dialect::Generic);
    let plan = plan_with_factory(&options, factory.as_ref(), &model, &db).unwrap();
    assert_eq!(plan.len(), 4);

    let mut planned = PlannedMerge {
        model,
        db,
        factory,
        plan,
    };
    planned.reverse().unwrap();
    assert!(planned
        .plan
        .tokens
        .iter()
        .all(|t| t.direction() == MergeDirection::ToModel));

    let outcome = planned.execute(None);
    assert!(outcome.report.is_success());
    assert!(!outcome.model_changes.is_empty());

    let gallery = planned.model.entity("GALLERY").unwrap();
    let name = gallery.attribute("GALLERY_NAME").unwrap();
    assert_eq!(name.max_length, Some(50));
    assert!(name.mandatory);
    assert!(planned.model.entity("PAINTING").unwrap().relationship("toGallery").is_none());

    let replanned = plan_with_factory(
        &options,
        planned.factory.as_ref(),
        &planned.model,
        &planned.db,
    )
    .unwrap();
    assert!(replanned.is_empty());
}

#[test]
fn test_pk_support_runs_through_a_data_source() {
    let support = AutoPkSupport::new(Dialect::Generic);
    let model = gallery_model();
    let entities: Vec<_> = model.entities().iter().collect();
    let mut source = FailingDataSource::default();

    let missing = {
        let mut conn = source.connection().unwrap();
        for sql in support.create_statements(&entities) {
            conn.execute(&sql).unwrap();
        }
        generate_pk(conn.as_mut(), &support, entities[0])
    };

    assert_eq!(source.executed.len(), 5);
    assert!(source.executed[0].starts_with("CREATE TABLE AUTO_PK_SUPPORT"));
    let err = missing.unwrap_err();
    assert!(err.message.contains("ARTIST"));
}
