//! Default values written into existing NULLs before a column becomes NOT NULL

use std::collections::HashMap;

use crate::model::{DbAttribute, DbEntity};

/// Supplies the SQL literal used to fill NULLs in a column
pub trait ValueForNullProvider {
    fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<String>;

    fn has_value_for(&self, entity: &DbEntity, column: &DbAttribute) -> bool {
        self.value_for(entity, column).is_some()
    }
}

/// Never supplies a value
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyValueForNull;

impl ValueForNullProvider for EmptyValueForNull {
    fn value_for(&self, _entity: &DbEntity, _column: &DbAttribute) -> Option<String> {
        None
    }
}

/// Values keyed by `TABLE.COLUMN`, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct MapValueForNull {
    values: HashMap<String, String>,
}

impl MapValueForNull {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, entity: &str, column: &str, literal: impl Into<String>) -> Self {
        self.insert(entity, column, literal);
        self
    }

    pub fn insert(&mut self, entity: &str, column: &str, literal: impl Into<String>) {
        self.values.insert(key(entity, column), literal.into());
    }

    /// Parses `TABLE.COLUMN=literal`
    pub fn parse_entry(&mut self, entry: &str) -> Option<()> {
        let (target, literal) = entry.split_once('=')?;
        let (entity, column) = target.trim().split_once('.')?;
        self.insert(entity, column, literal.trim());
        Some(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn key(entity: &str, column: &str) -> String {
    format!("{}.{}", entity, column).to_uppercase()
}

impl ValueForNullProvider for MapValueForNull {
    fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<String> {
        self.values.get(&key(&entity.name, &column.name)).cloned()
    }
}
