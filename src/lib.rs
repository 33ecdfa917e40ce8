//! rust-dbmerge: schema merge engine
//!
//! This library compares a mapped model with a database schema, plans the
//! differences as ordered merge tokens and executes them against a
//! database, a script or the model itself.

pub mod batch;
pub mod datasource;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod graph;
pub mod loader;
pub mod merge;
pub mod model;
pub mod pk;

use std::io::Write;

use anyhow::{bail, Result};

pub use dialect::Dialect;
pub use error::{DbMergeError, SqlError, TokenError, UnsupportedFeature};

use datasource::{DataSource, ScriptDataSource};
use diff::CompoundDiff;
use dialect::DbAdapter;
use merge::{
    factory_with_adapter, DbMerger, ExecutionReport, FiltersConfig, MapValueForNull, MergePlan,
    MergerContext, MergerTokenFactory,
};
use model::DataMap;

/// Options for planning a merge
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// The mapped model: DataMap XML, DDL, a directory or a glob pattern
    pub model: String,
    /// The current database schema, in the same formats as `model`
    pub db: String,
    pub dialect: Dialect,
    /// Table name regexes to include; empty includes every table
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    pub skip_relationships: bool,
    pub skip_primary_keys: bool,
    pub case_sensitive: bool,
    /// `TABLE.COLUMN=literal` entries filling NULLs before NOT NULL is set
    pub values_for_null: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            db: String::new(),
            dialect: Dialect::Generic,
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
            skip_relationships: false,
            skip_primary_keys: false,
            case_sensitive: false,
            values_for_null: Vec::new(),
        }
    }
}

/// A computed plan together with the schemas it was computed from
pub struct PlannedMerge {
    pub model: DataMap,
    pub db: DataMap,
    pub factory: Box<dyn MergerTokenFactory>,
    pub plan: MergePlan,
}

/// Result of executing a plan
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub report: ExecutionReport,
    /// Compressed changes applied to the model by model-ward tokens
    pub model_changes: CompoundDiff,
}

/// Load both schemas and plan the tokens that bring the database in line
/// with the model
pub fn plan_merge(options: &MergeOptions) -> Result<PlannedMerge> {
    let model = loader::load_data_map(&options.model, options.dialect)?;
    let db = loader::load_data_map(&options.db, options.dialect)?;
    tracing::info!(
        model = model.len(),
        db = db.len(),
        dialect = %options.dialect,
        "Schemas loaded"
    );

    let adapter = DbAdapter::new(options.dialect).with_quoting(model.quoting_sql_identifiers);
    let factory = factory_with_adapter(adapter);
    let plan = plan_with_factory(options, factory.as_ref(), &model, &db)?;

    Ok(PlannedMerge {
        model,
        db,
        factory,
        plan,
    })
}

/// Plan from schemas already in memory
pub fn plan_with_factory(
    options: &MergeOptions,
    factory: &dyn MergerTokenFactory,
    model: &DataMap,
    db: &DataMap,
) -> Result<MergePlan> {
    let filters = FiltersConfig::new(&options.include_tables, &options.exclude_tables)?;

    let mut values = MapValueForNull::new();
    for entry in &options.values_for_null {
        if values.parse_entry(entry).is_none() {
            bail!("Invalid value-for-null entry '{}', expected TABLE.COLUMN=literal", entry);
        }
    }

    let merger = DbMerger::builder(factory)
        .filters(filters)
        .value_for_null(values)
        .skip_relationships_tokens(options.skip_relationships)
        .skip_pk_tokens(options.skip_primary_keys)
        .case_sensitive(options.case_sensitive)
        .build();
    Ok(merger.create_merge_tokens(model, db)?)
}

impl PlannedMerge {
    /// Turns the plan around so it updates the model from the database
    pub fn reverse(&mut self) -> Result<()> {
        self.plan = self.plan.reverse(self.factory.as_ref())?;
        Ok(())
    }

    /// Executes every token. Database-ward tokens need `data_source`; without
    /// one they are recorded as failures.
    pub fn execute(&mut self, data_source: Option<&mut dyn DataSource>) -> MergeOutcome {
        let mut context = MergerContext::new(self.factory.as_ref(), &mut self.model);
        if let Some(source) = data_source {
            context = context.with_data_source(source);
        }
        let report = context.execute_tokens(&self.plan.tokens);
        MergeOutcome {
            report,
            model_changes: context.model_changes(),
        }
    }

    /// Writes the plan as a SQL script with a timestamped header
    pub fn write_script<W: Write>(&mut self, out: &mut W) -> Result<ExecutionReport> {
        let mut script = ScriptDataSource::new();
        let source: &mut dyn DataSource = &mut script;
        let outcome = self.execute(Some(source));
        let adapter = self.factory.adapter();

        writeln!(
            out,
            "-- Generated by rust-dbmerge {} on {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(out, "-- Dialect: {}", adapter.dialect)?;
        for warning in &self.plan.warnings {
            writeln!(out, "-- WARNING: {}", warning)?;
        }
        for entry in &outcome.report.outcomes {
            if let merge::TokenStatus::Unsupported(reason) = &entry.status {
                writeln!(out, "-- SKIPPED {}: {}", entry.token, reason)?;
            }
        }
        writeln!(out)?;
        script.write_script(out, adapter.batch_terminator)?;

        tracing::info!(statements = script.statements().len(), "Script written");
        Ok(outcome.report)
    }
}
