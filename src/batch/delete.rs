use super::{append_qualifier, bound_qualifier, RowSnapshot};
use crate::dialect::QuotingStrategy;
use crate::model::DbEntity;

/// `DELETE FROM <table> WHERE ...`
///
/// The qualifier defaults to the primary key. Optimistic locking adds the
/// locked attributes with [`DeleteBatchQueryBuilder::with_qualifier`].
#[derive(Debug, Clone)]
pub struct DeleteBatchQueryBuilder<'a> {
    entity: &'a DbEntity,
    quoting: QuotingStrategy,
    qualifier: Vec<String>,
}

impl<'a> DeleteBatchQueryBuilder<'a> {
    pub fn new(entity: &'a DbEntity, quoting: QuotingStrategy) -> Self {
        Self {
            entity,
            quoting,
            qualifier: entity.primary_key_names(),
        }
    }

    /// Replaces the qualifier columns
    pub fn with_qualifier<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qualifier = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn create_sql(&self, row: &RowSnapshot) -> String {
        let mut buf = String::from("DELETE FROM ");
        buf.push_str(&self.quoting.quoted_fully_qualified_name(self.entity));
        append_qualifier(&mut buf, &self.quoting, &self.qualifier, row);
        buf
    }

    /// Columns bound to `?` placeholders, in placeholder order
    pub fn parameters(&self, row: &RowSnapshot) -> Vec<&str> {
        bound_qualifier(&self.qualifier, row)
    }
}
