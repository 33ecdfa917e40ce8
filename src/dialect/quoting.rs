//! Identifier quoting

use crate::model::DbEntity;

/// How identifiers are wrapped in generated SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotingStrategy {
    pub enabled: bool,
    pub start: &'static str,
    pub end: &'static str,
}

impl QuotingStrategy {
    pub fn new(start: &'static str, end: &'static str) -> Self {
        Self {
            enabled: false,
            start,
            end,
        }
    }

    /// Plain identifiers, no quoting characters at all
    pub fn unquoted() -> Self {
        Self::new("", "")
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn quoted_name(&self, name: &str) -> String {
        if self.enabled {
            format!("{}{}{}", self.start, name, self.end)
        } else {
            name.to_string()
        }
    }

    /// Quotes each part of `catalog.schema.name` separately
    pub fn quoted_fully_qualified_name(&self, entity: &DbEntity) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(catalog) = &entity.catalog {
            parts.push(self.quoted_name(catalog));
        }
        if let Some(schema) = &entity.schema {
            parts.push(self.quoted_name(schema));
        }
        parts.push(self.quoted_name(&entity.name));
        parts.join(".")
    }
}

impl Default for QuotingStrategy {
    fn default() -> Self {
        Self::new("\"", "\"")
    }
}
