//! DDL generation shared by every dialect

use super::{Capabilities, Dialect, QuotingStrategy, TypeInfo, TypeMap};
use crate::error::TokenError;
use crate::model::{DbAttribute, DbEntity, DbRelationship};

/// Dialect-specific DDL builder.
///
/// Everything that varies between databases is decided in [`DbAdapter::new`];
/// the methods below only read that configuration.
#[derive(Debug, Clone)]
pub struct DbAdapter {
    pub dialect: Dialect,
    pub capabilities: Capabilities,
    pub quoting: QuotingStrategy,
    pub types: TypeMap,
    /// Statement separator used when writing scripts
    pub batch_terminator: &'static str,
    /// Appended to generated columns in `CREATE TABLE`
    identity_clause: Option<&'static str>,
    /// Appended after the closing parenthesis of `CREATE TABLE`
    table_suffix: Option<&'static str>,
    /// Appended to `DROP TABLE name`
    drop_table_suffix: Option<&'static str>,
}

impl DbAdapter {
    pub fn new(dialect: Dialect) -> Self {
        let quoting = match dialect {
            Dialect::MySql => QuotingStrategy::new("`", "`"),
            Dialect::SqlServer => QuotingStrategy::new("[", "]"),
            _ => QuotingStrategy::default(),
        };
        let identity_clause = match dialect {
            Dialect::Hsql => Some(" GENERATED BY DEFAULT AS IDENTITY (START WITH 1)"),
            Dialect::Derby | Dialect::Postgres => Some(" GENERATED BY DEFAULT AS IDENTITY"),
            Dialect::H2 | Dialect::MySql => Some(" AUTO_INCREMENT"),
            Dialect::SqlServer => Some(" IDENTITY (1, 1)"),
            Dialect::Generic | Dialect::Oracle => None,
        };
        let table_suffix = match dialect {
            Dialect::MySql => Some(" ENGINE=InnoDB"),
            _ => None,
        };
        let drop_table_suffix = match dialect {
            Dialect::Oracle => Some(" CASCADE CONSTRAINTS"),
            Dialect::Postgres => Some(" CASCADE"),
            _ => None,
        };

        Self {
            dialect,
            capabilities: dialect.capabilities(),
            quoting,
            types: TypeMap::for_dialect(dialect),
            batch_terminator: if dialect == Dialect::SqlServer {
                "GO"
            } else {
                ";"
            },
            identity_clause,
            table_suffix,
            drop_table_suffix,
        }
    }

    /// Same adapter with identifier quoting switched on or off
    pub fn with_quoting(mut self, enabled: bool) -> Self {
        self.quoting.enabled = enabled;
        self
    }

    pub fn quoted(&self, name: &str) -> String {
        self.quoting.quoted_name(name)
    }

    pub fn table_name(&self, entity: &DbEntity) -> String {
        self.quoting.quoted_fully_qualified_name(entity)
    }

    fn type_info(&self, entity: &DbEntity, attribute: &DbAttribute) -> Result<TypeInfo, TokenError> {
        self.types
            .get(attribute.sql_type)
            .ok_or_else(|| TokenError::UndefinedType {
                entity: entity.name.clone(),
                attribute: attribute.name.clone(),
            })
    }

    /// Bare external type name, without size
    pub fn type_name(
        &self,
        entity: &DbEntity,
        attribute: &DbAttribute,
    ) -> Result<&'static str, TokenError> {
        Ok(self.type_info(entity, attribute)?.name)
    }

    /// `(length)` or `(length, scale)` for types that take a size
    pub fn size_and_precision(&self, attribute: &DbAttribute) -> Option<String> {
        if !attribute.sql_type.supports_length() {
            return None;
        }
        let length = attribute.max_length.filter(|len| *len > 0)?;
        match attribute.scale {
            Some(scale) if attribute.sql_type.is_decimal() => {
                Some(format!("({}, {})", length, scale))
            }
            _ => Some(format!("({})", length)),
        }
    }

    /// External type with its size, e.g. `VARCHAR(100)`
    pub fn column_type(
        &self,
        entity: &DbEntity,
        attribute: &DbAttribute,
    ) -> Result<String, TokenError> {
        let info = self.type_info(entity, attribute)?;
        let size = if info.sized {
            self.size_and_precision(attribute)
        } else {
            None
        };
        let Some(size) = size else {
            return Ok(info.name.to_string());
        };

        // Derby binary types put the size before FOR BIT DATA
        match info.name.split_once(' ') {
            Some((head, tail)) if tail.ends_with("FOR BIT DATA") => {
                Ok(format!("{}{} {}", head, size, tail))
            }
            _ => Ok(format!("{}{}", info.name, size)),
        }
    }

    /// Appends one column definition: `NAME TYPE(size) NOT NULL`
    pub fn create_table_append_column(
        &self,
        buf: &mut String,
        entity: &DbEntity,
        attribute: &DbAttribute,
    ) -> Result<(), TokenError> {
        buf.push_str(&self.quoted(&attribute.name));
        buf.push(' ');
        buf.push_str(&self.column_type(entity, attribute)?);
        buf.push_str(if attribute.mandatory {
            " NOT NULL"
        } else {
            " NULL"
        });
        if attribute.generated && self.capabilities.supports_generated_keys {
            if let Some(clause) = self.identity_clause {
                buf.push_str(clause);
            }
        }
        Ok(())
    }

    /// `PRIMARY KEY (a, b)`, or None for an entity without PK columns
    pub fn pk_clause(&self, entity: &DbEntity) -> Option<String> {
        let mut pk: Vec<&DbAttribute> = entity.primary_keys().collect();
        if pk.is_empty() {
            return None;
        }
        if self.dialect == Dialect::MySql {
            // AUTO_INCREMENT must lead the key
            pk.sort_by_key(|attr| !attr.generated);
        }
        let columns: Vec<String> = pk.iter().map(|attr| self.quoted(&attr.name)).collect();
        Some(format!("PRIMARY KEY ({})", columns.join(", ")))
    }

    pub fn create_table(&self, entity: &DbEntity) -> Result<String, TokenError> {
        let mut buf = format!("CREATE TABLE {} (", self.table_name(entity));
        for (i, attribute) in entity.attributes.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            self.create_table_append_column(&mut buf, entity, attribute)?;
        }
        if let Some(pk) = self.pk_clause(entity) {
            if !entity.attributes.is_empty() {
                buf.push_str(", ");
            }
            buf.push_str(&pk);
        }
        buf.push(')');
        if let Some(suffix) = self.table_suffix {
            buf.push_str(suffix);
        }
        Ok(buf)
    }

    pub fn drop_table_statements(&self, entity: &DbEntity) -> Vec<String> {
        vec![format!(
            "DROP TABLE {}{}",
            self.table_name(entity),
            self.drop_table_suffix.unwrap_or("")
        )]
    }

    /// `ALTER TABLE s ADD FOREIGN KEY (cols) REFERENCES t (cols)`.
    ///
    /// None when the relationship has no joins or the dialect has no FK
    /// constraints.
    pub fn create_fk_constraint(
        &self,
        source: &DbEntity,
        target: &DbEntity,
        relationship: &DbRelationship,
    ) -> Option<String> {
        if relationship.joins.is_empty() || !self.capabilities.supports_fk_constraints {
            return None;
        }
        let source_columns: Vec<String> = relationship
            .joins
            .iter()
            .map(|join| self.quoted(&join.source))
            .collect();
        let target_columns: Vec<String> = relationship
            .joins
            .iter()
            .map(|join| self.quoted(&join.target))
            .collect();

        let constraint = match &relationship.fk_name {
            Some(name) => format!("CONSTRAINT {} ", self.quoted(name)),
            None => String::new(),
        };
        Some(format!(
            "ALTER TABLE {} ADD {}FOREIGN KEY ({}) REFERENCES {} ({})",
            self.table_name(source),
            constraint,
            source_columns.join(", "),
            self.table_name(target),
            target_columns.join(", ")
        ))
    }

    /// `ALTER TABLE t ADD UNIQUE (cols)`
    pub fn create_unique_constraint(
        &self,
        entity: &DbEntity,
        columns: &[&DbAttribute],
    ) -> Option<String> {
        if columns.is_empty() || !self.capabilities.supports_unique_constraints {
            return None;
        }
        let names: Vec<String> = columns.iter().map(|attr| self.quoted(&attr.name)).collect();
        Some(format!(
            "ALTER TABLE {} ADD UNIQUE ({})",
            self.table_name(entity),
            names.join(", ")
        ))
    }
}
