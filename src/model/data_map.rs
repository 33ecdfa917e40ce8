//! Container of table metadata

use super::DbEntity;

/// A named set of tables, either a mapped model or a detected database schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataMap {
    pub name: String,
    pub quoting_sql_identifiers: bool,
    entities: Vec<DbEntity>,
}

impl DataMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoting_sql_identifiers: false,
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: DbEntity) -> Self {
        self.add_entity(entity);
        self
    }

    pub fn entities(&self) -> &[DbEntity] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&DbEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut DbEntity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// Entity lookup, case-insensitive unless `case_sensitive` is set
    pub fn find_entity(&self, name: &str, case_sensitive: bool) -> Option<&DbEntity> {
        if case_sensitive {
            self.entity(name)
        } else {
            self.entities
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(name))
        }
    }

    /// Adds or replaces an entity with the same name
    pub fn add_entity(&mut self, entity: DbEntity) {
        match self.entity_mut(&entity.name) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    /// Removes an entity. With `clear_dependencies`, relationships of other
    /// entities that point at it are removed too.
    pub fn remove_entity(&mut self, name: &str, clear_dependencies: bool) -> Option<DbEntity> {
        let index = self.entities.iter().position(|e| e.name == name)?;
        let removed = self.entities.remove(index);
        if clear_dependencies {
            for entity in &mut self.entities {
                entity.relationships.retain(|r| r.target_entity != name);
            }
        }
        Some(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}
