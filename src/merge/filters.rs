//! Table include / exclude filters

use regex::Regex;

use crate::error::DbMergeError;
use crate::model::DbEntity;

/// Regex-based table selection.
///
/// A table is included when it matches any include pattern (or there are
/// none) and matches no exclude pattern. Patterns are anchored and
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FiltersConfig {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FiltersConfig {
    /// Includes every table
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn new<I, E>(include: I, exclude: E) -> Result<Self, DbMergeError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn is_include_table(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(name));
        included && !self.exclude.iter().any(|r| r.is_match(name))
    }

    pub fn accepts(&self, entity: &DbEntity) -> bool {
        self.is_include_table(&entity.name)
    }
}

fn compile<I>(patterns: I) -> Result<Vec<Regex>, DbMergeError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(&format!("(?i)^(?:{})$", pattern)).map_err(|source| {
                DbMergeError::InvalidFilter {
                    pattern: pattern.to_string(),
                    source,
                }
            })
        })
        .collect()
}
