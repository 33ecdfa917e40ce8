use super::{append_qualifier, bound_qualifier, RowSnapshot};
use crate::dialect::QuotingStrategy;
use crate::model::DbEntity;

/// `UPDATE <table> SET a = ?, ... WHERE ...`
#[derive(Debug, Clone)]
pub struct UpdateBatchQueryBuilder<'a> {
    entity: &'a DbEntity,
    quoting: QuotingStrategy,
    updated: Vec<String>,
    qualifier: Vec<String>,
}

impl<'a> UpdateBatchQueryBuilder<'a> {
    pub fn new<I, S>(entity: &'a DbEntity, quoting: QuotingStrategy, updated: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity,
            quoting,
            updated: updated.into_iter().map(Into::into).collect(),
            qualifier: entity.primary_key_names(),
        }
    }

    pub fn with_qualifier<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qualifier = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn create_sql(&self, row: &RowSnapshot) -> String {
        let assignments: Vec<String> = self
            .updated
            .iter()
            .map(|c| format!("{} = ?", self.quoting.quoted_name(c)))
            .collect();
        let mut buf = format!(
            "UPDATE {} SET {}",
            self.quoting.quoted_fully_qualified_name(self.entity),
            assignments.join(", ")
        );
        append_qualifier(&mut buf, &self.quoting, &self.qualifier, row);
        buf
    }

    /// Updated columns followed by bound qualifier columns
    pub fn parameters(&self, row: &RowSnapshot) -> Vec<&str> {
        let mut params: Vec<&str> = self.updated.iter().map(String::as_str).collect();
        params.extend(bound_qualifier(&self.qualifier, row));
        params
    }
}
