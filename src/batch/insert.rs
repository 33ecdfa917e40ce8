use crate::dialect::QuotingStrategy;
use crate::model::DbEntity;

/// `INSERT INTO <table> (...) VALUES (?, ...)`
#[derive(Debug, Clone)]
pub struct InsertBatchQueryBuilder<'a> {
    entity: &'a DbEntity,
    quoting: QuotingStrategy,
    include_generated: bool,
}

impl<'a> InsertBatchQueryBuilder<'a> {
    pub fn new(entity: &'a DbEntity, quoting: QuotingStrategy) -> Self {
        Self {
            entity,
            quoting,
            include_generated: false,
        }
    }

    /// Bind generated columns too, for dialects without generated keys
    pub fn include_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    pub fn columns(&self) -> Vec<&str> {
        self.entity
            .attributes
            .iter()
            .filter(|a| self.include_generated || !a.generated)
            .map(|a| a.name.as_str())
            .collect()
    }

    pub fn create_sql(&self) -> String {
        let columns = self.columns();
        let names: Vec<String> = columns.iter().map(|c| self.quoting.quoted_name(c)).collect();
        let params = vec!["?"; columns.len()];
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quoting.quoted_fully_qualified_name(self.entity),
            names.join(", "),
            params.join(", ")
        )
    }
}
