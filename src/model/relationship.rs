//! Foreign-key relationships between tables

use super::DataMap;

/// One column pair of a relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbJoin {
    pub source: String,
    pub target: String,
}

impl DbJoin {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Relationship from one table to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbRelationship {
    pub name: String,
    pub source_entity: String,
    pub target_entity: String,
    pub to_many: bool,
    pub to_dependent_pk: bool,
    pub joins: Vec<DbJoin>,
    /// Constraint name as detected in a live database
    pub fk_name: Option<String>,
}

impl DbRelationship {
    pub fn new(
        name: impl Into<String>,
        source_entity: impl Into<String>,
        target_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_entity: source_entity.into(),
            target_entity: target_entity.into(),
            to_many: false,
            to_dependent_pk: false,
            joins: Vec::new(),
            fk_name: None,
        }
    }

    pub fn join(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.joins.push(DbJoin::new(source, target));
        self
    }

    pub fn to_many(mut self) -> Self {
        self.to_many = true;
        self
    }

    pub fn fk_name(mut self, name: impl Into<String>) -> Self {
        self.fk_name = Some(name.into());
        self
    }

    /// True if every join targets a primary key column of the target entity
    pub fn is_to_pk(&self, map: &DataMap) -> bool {
        let Some(target) = map.entity(&self.target_entity) else {
            return false;
        };
        !self.joins.is_empty()
            && self.joins.iter().all(|join| {
                target
                    .attribute(&join.target)
                    .is_some_and(|attr| attr.primary_key)
            })
    }

    /// True if both relationships join the same entities over the same columns,
    /// compared case-insensitively and regardless of join order
    pub fn same_joins_as(&self, other: &DbRelationship) -> bool {
        if self.joins.len() != other.joins.len()
            || !self.source_entity.eq_ignore_ascii_case(&other.source_entity)
            || !self.target_entity.eq_ignore_ascii_case(&other.target_entity)
        {
            return false;
        }
        self.joins.iter().all(|j1| {
            other.joins.iter().any(|j2| {
                j1.source.eq_ignore_ascii_case(&j2.source)
                    && j1.target.eq_ignore_ascii_case(&j2.target)
            })
        })
    }

    /// Short label used in token values: `SOURCE->TARGET`
    pub fn label(&self) -> String {
        format!("{}->{}", self.source_entity, self.target_entity)
    }
}
