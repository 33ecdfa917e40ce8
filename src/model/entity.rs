//! Table and column metadata

use super::{DbRelationship, SqlType};

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbAttribute {
    pub name: String,
    pub sql_type: SqlType,
    /// Length for character/binary types, precision for decimal types
    pub max_length: Option<u32>,
    pub scale: Option<u32>,
    /// NOT NULL
    pub mandatory: bool,
    pub primary_key: bool,
    /// Identity / auto-increment column
    pub generated: bool,
}

impl DbAttribute {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            max_length: None,
            scale: None,
            mandatory: false,
            primary_key: false,
            generated: false,
        }
    }

    pub fn length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.max_length = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Marks the column as part of the primary key. PK columns are always mandatory.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.mandatory = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// True if type, length and scale are the same as `other`'s
    pub fn same_type_as(&self, other: &DbAttribute) -> bool {
        if self.sql_type != other.sql_type {
            return false;
        }
        if self.sql_type.supports_length() && self.max_length != other.max_length {
            return false;
        }
        !(self.sql_type.is_decimal() && self.scale != other.scale)
    }
}

/// Table metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEntity {
    pub name: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub attributes: Vec<DbAttribute>,
    pub relationships: Vec<DbRelationship>,
    /// Name of the PK constraint as detected in a live database
    pub primary_key_name: Option<String>,
}

impl DbEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: None,
            schema: None,
            attributes: Vec::new(),
            relationships: Vec::new(),
            primary_key_name: None,
        }
    }

    /// Builder-style attribute addition
    pub fn with_attribute(mut self, attribute: DbAttribute) -> Self {
        self.add_attribute(attribute);
        self
    }

    pub fn with_relationship(mut self, relationship: DbRelationship) -> Self {
        self.add_relationship(relationship);
        self
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// `catalog.schema.name`, skipping parts that are not set
    pub fn fully_qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(catalog) = &self.catalog {
            parts.push(catalog);
        }
        if let Some(schema) = &self.schema {
            parts.push(schema);
        }
        parts.push(&self.name);
        parts.join(".")
    }

    pub fn attribute(&self, name: &str) -> Option<&DbAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut DbAttribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Attribute lookup, case-insensitive unless `case_sensitive` is set
    pub fn find_attribute(&self, name: &str, case_sensitive: bool) -> Option<&DbAttribute> {
        if case_sensitive {
            self.attribute(name)
        } else {
            self.attributes
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(name))
        }
    }

    /// Adds or replaces an attribute with the same name
    pub fn add_attribute(&mut self, attribute: DbAttribute) {
        match self.attribute_mut(&attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<DbAttribute> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index))
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &DbAttribute> {
        self.attributes.iter().filter(|a| a.primary_key)
    }

    pub fn primary_key_names(&self) -> Vec<String> {
        self.primary_keys().map(|a| a.name.clone()).collect()
    }

    pub fn relationship(&self, name: &str) -> Option<&DbRelationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Adds or replaces a relationship with the same name
    pub fn add_relationship(&mut self, relationship: DbRelationship) {
        match self
            .relationships
            .iter_mut()
            .find(|r| r.name == relationship.name)
        {
            Some(existing) => *existing = relationship,
            None => self.relationships.push(relationship),
        }
    }

    pub fn remove_relationship(&mut self, name: &str) -> Option<DbRelationship> {
        let index = self.relationships.iter().position(|r| r.name == name)?;
        Some(self.relationships.remove(index))
    }
}
