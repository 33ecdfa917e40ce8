//! Execution state shared by the tokens of one merge

use super::factory::MergerTokenFactory;
use super::token::{Executed, MergerToken};
use super::validation::{ValidationFailure, ValidationResult};
use crate::datasource::DataSource;
use crate::diff::{CompoundDiff, GraphDiff, GraphDiffCompressor};
use crate::error::{SqlError, UnsupportedFeature};
use crate::model::DataMap;

/// What happened to one token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Executed(Executed),
    /// Skipped because the dialect lacks a capability
    Unsupported(UnsupportedFeature),
    /// At least one statement or model change failed
    Failed(Vec<ValidationFailure>),
}

#[derive(Debug, Clone)]
pub struct TokenOutcome {
    pub token: String,
    pub status: TokenStatus,
}

/// Per-token results of [`MergerContext::execute_tokens`]
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<TokenOutcome>,
}

impl ExecutionReport {
    /// True when no token failed. Unsupported tokens do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn executed_count(&self) -> usize {
        self.count(|s| matches!(s, TokenStatus::Executed(_)))
    }

    pub fn unsupported_count(&self) -> usize {
        self.count(|s| matches!(s, TokenStatus::Unsupported(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, TokenStatus::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&TokenStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

/// Holds everything tokens need while they run: the factory, the model being
/// synchronized, an optional data source and the collected failures.
pub struct MergerContext<'a> {
    factory: &'a dyn MergerTokenFactory,
    data_map: &'a mut DataMap,
    data_source: Option<&'a mut dyn DataSource>,
    validation: ValidationResult,
    changes: CompoundDiff,
}

impl<'a> MergerContext<'a> {
    pub fn new(factory: &'a dyn MergerTokenFactory, data_map: &'a mut DataMap) -> Self {
        Self {
            factory,
            data_map,
            data_source: None,
            validation: ValidationResult::new(),
            changes: CompoundDiff::new(),
        }
    }

    pub fn with_data_source(mut self, data_source: &'a mut dyn DataSource) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn factory(&self) -> &'a dyn MergerTokenFactory {
        self.factory
    }

    pub fn data_map(&self) -> &DataMap {
        &*self.data_map
    }

    pub fn data_map_mut(&mut self) -> &mut DataMap {
        &mut *self.data_map
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Runs one statement for `token`. Failures are recorded, not returned.
    pub fn execute_sql(&mut self, token: &MergerToken, sql: &str) -> bool {
        tracing::debug!(token = %token, sql, "Executing statement");
        let result = match self.data_source.as_deref_mut() {
            Some(source) => source.connection().and_then(|mut conn| conn.execute(sql)),
            None => Err(SqlError::new("no data source configured")),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                self.record_failure(token, Some(sql), e.to_string());
                false
            }
        }
    }

    pub fn record_failure(&mut self, token: &MergerToken, statement: Option<&str>, message: String) {
        tracing::warn!(token = %token, statement, error = %message, "Token failed");
        self.validation.add_failure(ValidationFailure {
            token: token.to_string(),
            statement: statement.map(str::to_string),
            message,
        });
    }

    pub fn record_change(&mut self, change: GraphDiff) {
        self.changes.push(change);
    }

    /// Model changes made so far, compressed
    pub fn model_changes(&self) -> CompoundDiff {
        GraphDiffCompressor::new().compress(&self.changes)
    }

    /// Executes every token in order and reports each outcome.
    ///
    /// A failed token never stops the batch.
    pub fn execute_tokens(&mut self, tokens: &[MergerToken]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for token in tokens {
            let failures_before = self.validation.len();
            let status = match token.execute(self) {
                Ok(executed) => {
                    let failures = &self.validation.failures()[failures_before..];
                    if failures.is_empty() {
                        TokenStatus::Executed(executed)
                    } else {
                        TokenStatus::Failed(failures.to_vec())
                    }
                }
                Err(unsupported) => {
                    tracing::warn!(token = %token, "{}", unsupported);
                    TokenStatus::Unsupported(unsupported)
                }
            };
            report.outcomes.push(TokenOutcome {
                token: token.to_string(),
                status,
            });
        }
        tracing::info!(
            executed = report.executed_count(),
            unsupported = report.unsupported_count(),
            failed = report.failed_count(),
            "Token execution finished"
        );
        report
    }
}
