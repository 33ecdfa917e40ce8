//! Token construction and per-dialect SQL rendering

use super::token::{MergeDirection, MergerToken, TokenKind};
use crate::dialect::{DbAdapter, Dialect};
use crate::error::{TokenError, UnsupportedFeature};
use crate::model::{DbAttribute, DbEntity, DbRelationship};

/// Builds merge tokens and renders them as SQL for one dialect.
///
/// The `create_*` constructors are shared by every dialect. Dialects
/// override the `*_sql` renderers whose syntax differs from the generic
/// ANSI form.
pub trait MergerTokenFactory {
    fn adapter(&self) -> &DbAdapter;

    fn dialect(&self) -> Dialect {
        self.adapter().dialect
    }

    // Constructors

    fn create_create_table(&self, direction: MergeDirection, entity: DbEntity) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::CreateTable)
    }

    fn create_drop_table(&self, direction: MergeDirection, entity: DbEntity) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::DropTable)
    }

    fn create_add_column(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::AddColumn { column })
    }

    fn create_drop_column(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::DropColumn { column })
    }

    fn create_set_allow_null(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::SetAllowNull { column })
    }

    fn create_set_not_null(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::SetNotNull { column })
    }

    fn create_set_column_type(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::SetColumnType { from, to })
    }

    fn create_set_primary_key(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        old: Vec<String>,
        new: Vec<String>,
        pk_name: Option<String>,
    ) -> MergerToken {
        MergerToken::new(
            direction,
            entity,
            TokenKind::SetPrimaryKey { old, new, pk_name },
        )
    }

    fn create_set_generated_flag(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
        flag: bool,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::SetGeneratedFlag { column, flag })
    }

    fn create_add_relationship(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        relationship: DbRelationship,
        target: DbEntity,
    ) -> MergerToken {
        MergerToken::new(
            direction,
            entity,
            TokenKind::AddRelationship {
                relationship,
                target,
            },
        )
    }

    fn create_drop_relationship(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        relationship: DbRelationship,
        target: DbEntity,
    ) -> MergerToken {
        MergerToken::new(
            direction,
            entity,
            TokenKind::DropRelationship {
                relationship,
                target,
            },
        )
    }

    fn create_set_value_for_null(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
        value: String,
    ) -> MergerToken {
        MergerToken::new(direction, entity, TokenKind::SetValueForNull { column, value })
    }

    // Renderers

    fn render(&self, token: &MergerToken) -> Result<Vec<String>, TokenError> {
        let entity = token.entity();
        match token.kind() {
            TokenKind::CreateTable => self.create_table_sql(entity),
            TokenKind::DropTable => self.drop_table_sql(entity),
            TokenKind::AddColumn { column } => self.add_column_sql(entity, column),
            TokenKind::DropColumn { column } => self.drop_column_sql(entity, column),
            TokenKind::SetAllowNull { column } => self.set_allow_null_sql(entity, column),
            TokenKind::SetNotNull { column } => self.set_not_null_sql(entity, column),
            TokenKind::SetColumnType { from, to } => self.set_column_type_sql(entity, from, to),
            TokenKind::SetPrimaryKey { old, new, pk_name } => {
                self.set_primary_key_sql(entity, old, new, pk_name.as_deref())
            }
            TokenKind::SetGeneratedFlag { column, flag } => {
                self.set_generated_flag_sql(entity, column, *flag)
            }
            TokenKind::AddRelationship {
                relationship,
                target,
            } => self.add_relationship_sql(entity, relationship, target),
            TokenKind::DropRelationship { relationship, .. } => {
                self.drop_relationship_sql(entity, relationship)
            }
            TokenKind::SetValueForNull { column, value } => {
                self.set_value_for_null_sql(entity, column, value)
            }
        }
    }

    fn create_table_sql(&self, entity: &DbEntity) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.adapter().create_table(entity)?])
    }

    fn drop_table_sql(&self, entity: &DbEntity) -> Result<Vec<String>, TokenError> {
        Ok(self.adapter().drop_table_statements(entity))
    }

    fn add_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(vec![format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            adapter.table_name(entity),
            adapter.quoted(&column.name),
            adapter.column_type(entity, column)?
        )])
    }

    fn drop_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            adapter.table_name(entity),
            adapter.quoted(&column.name)
        )])
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL",
            adapter.table_name(entity),
            adapter.quoted(&column.name)
        )])
    }

    fn set_not_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            adapter.table_name(entity),
            adapter.quoted(&column.name)
        )])
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            adapter.table_name(entity),
            adapter.quoted(&to.name),
            adapter.column_type(entity, to)?
        )])
    }

    /// Drops the current key (by constraint name when known) and adds the new one
    fn set_primary_key_sql(
        &self,
        entity: &DbEntity,
        old: &[String],
        new: &[String],
        pk_name: Option<&str>,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        let table = adapter.table_name(entity);
        let mut statements = Vec::new();
        if !old.is_empty() {
            statements.push(match pk_name {
                Some(name) => format!("ALTER TABLE {} DROP CONSTRAINT {}", table, adapter.quoted(name)),
                None => format!("ALTER TABLE {} DROP PRIMARY KEY", table),
            });
        }
        if let Some(clause) = adapter.pk_clause(&with_primary_key(entity, new)) {
            statements.push(format!("ALTER TABLE {} ADD {}", table, clause));
        }
        Ok(statements)
    }

    /// Capability gate for generated-column changes; the DDL itself comes
    /// from [`MergerTokenFactory::generated_column_sql`]
    fn set_generated_flag_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        let capabilities = &self.adapter().capabilities;
        let allowed = capabilities.supports_generated_keys
            && if flag {
                capabilities.supports_generated_keys_add
            } else {
                capabilities.supports_generated_keys_drop
            };
        if !allowed {
            let feature = if flag {
                "adding a generated flag to an existing column"
            } else {
                "dropping the generated flag of a column"
            };
            return Err(UnsupportedFeature::new(self.dialect(), feature).into());
        }
        self.generated_column_sql(entity, column, flag)
    }

    fn generated_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        let action = if flag {
            "ADD GENERATED BY DEFAULT AS IDENTITY"
        } else {
            "DROP IDENTITY"
        };
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            adapter.table_name(entity),
            adapter.quoted(&column.name),
            action
        )])
    }

    fn add_relationship_sql(
        &self,
        entity: &DbEntity,
        relationship: &DbRelationship,
        target: &DbEntity,
    ) -> Result<Vec<String>, TokenError> {
        Ok(self
            .adapter()
            .create_fk_constraint(entity, target, relationship)
            .into_iter()
            .collect())
    }

    /// Nothing is rendered when the constraint name is unknown
    fn drop_relationship_sql(
        &self,
        entity: &DbEntity,
        relationship: &DbRelationship,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        Ok(relationship
            .fk_name
            .iter()
            .map(|fk| {
                format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    adapter.table_name(entity),
                    adapter.quoted(fk)
                )
            })
            .collect())
    }

    fn set_value_for_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        value: &str,
    ) -> Result<Vec<String>, TokenError> {
        let adapter = self.adapter();
        let name = adapter.quoted(&column.name);
        Ok(vec![format!(
            "UPDATE {} SET {} = {} WHERE {} IS NULL",
            adapter.table_name(entity),
            name,
            value,
            name
        )])
    }
}

/// Copy of `entity` whose primary key is exactly `columns`
fn with_primary_key(entity: &DbEntity, columns: &[String]) -> DbEntity {
    let mut copy = entity.clone();
    for attribute in &mut copy.attributes {
        attribute.primary_key = columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&attribute.name));
    }
    copy
}

fn null_clause(column: &DbAttribute) -> &'static str {
    if column.mandatory {
        " NOT NULL"
    } else {
        " NULL"
    }
}

/// ANSI syntax, no generated-key support
#[derive(Debug, Clone)]
pub struct GenericMergerFactory {
    adapter: DbAdapter,
}

impl GenericMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::Generic))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }
}

impl Default for GenericMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for GenericMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }
}

/// HSQLDB
#[derive(Debug, Clone)]
pub struct HsqlMergerFactory {
    adapter: DbAdapter,
}

impl HsqlMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::Hsql))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }
}

impl Default for HsqlMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for HsqlMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NULL",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name)
        )])
    }

    fn generated_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        let table = self.adapter.table_name(entity);
        let name = self.adapter.quoted(&column.name);
        Ok(vec![if flag {
            format!(
                "ALTER TABLE {} ALTER COLUMN {} {} GENERATED BY DEFAULT AS IDENTITY",
                table,
                name,
                self.adapter.column_type(entity, column)?
            )
        } else {
            format!("ALTER TABLE {} ALTER COLUMN {} DROP GENERATED", table, name)
        }])
    }
}

/// H2
#[derive(Debug, Clone)]
pub struct H2MergerFactory {
    adapter: DbAdapter,
}

impl H2MergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::H2))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }
}

impl Default for H2MergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for H2MergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NULL",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name)
        )])
    }

    fn generated_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}{}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            self.adapter.column_type(entity, column)?,
            if flag { " AUTO_INCREMENT" } else { "" }
        )])
    }
}

/// Apache Derby. Identity columns cannot be added or removed after creation.
#[derive(Debug, Clone)]
pub struct DerbyMergerFactory {
    adapter: DbAdapter,
}

impl DerbyMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::Derby))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }
}

impl Default for DerbyMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for DerbyMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} NULL",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name)
        )])
    }

    fn set_not_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} NOT NULL",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name)
        )])
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&to.name),
            self.adapter.column_type(entity, to)?
        )])
    }
}

/// PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresMergerFactory {
    adapter: DbAdapter,
}

impl PostgresMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::Postgres))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }
}

impl Default for PostgresMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for PostgresMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&to.name),
            self.adapter.column_type(entity, to)?
        )])
    }

    /// Postgres has no `DROP PRIMARY KEY`; unnamed keys use the default `<table>_pkey`
    fn set_primary_key_sql(
        &self,
        entity: &DbEntity,
        old: &[String],
        new: &[String],
        pk_name: Option<&str>,
    ) -> Result<Vec<String>, TokenError> {
        let table = self.adapter.table_name(entity);
        let mut statements = Vec::new();
        if !old.is_empty() {
            let name = pk_name
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_pkey", entity.name.to_lowercase()));
            statements.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                table,
                self.adapter.quoted(&name)
            ));
        }
        if let Some(clause) = self.adapter.pk_clause(&with_primary_key(entity, new)) {
            statements.push(format!("ALTER TABLE {} ADD {}", table, clause));
        }
        Ok(statements)
    }

    fn generated_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        let action = if flag {
            "ADD GENERATED BY DEFAULT AS IDENTITY"
        } else {
            "DROP IDENTITY IF EXISTS"
        };
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            action
        )])
    }
}

/// MySQL / MariaDB
#[derive(Debug, Clone)]
pub struct MySqlMergerFactory {
    adapter: DbAdapter,
}

impl MySqlMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::MySql))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }

    /// `ALTER TABLE t MODIFY col type`, the only way MySQL changes a column.
    /// MODIFY redefines the whole column, so AUTO_INCREMENT is restated.
    fn modify(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        null: &str,
        auto_increment: bool,
    ) -> Result<String, TokenError> {
        Ok(format!(
            "ALTER TABLE {} MODIFY {} {}{}{}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            self.adapter.column_type(entity, column)?,
            null,
            if auto_increment { " AUTO_INCREMENT" } else { "" }
        ))
    }
}

impl Default for MySqlMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for MySqlMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.modify(entity, column, " NULL", column.generated)?])
    }

    fn set_not_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.modify(entity, column, " NOT NULL", column.generated)?])
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.modify(entity, to, null_clause(to), to.generated)?])
    }

    fn drop_relationship_sql(
        &self,
        entity: &DbEntity,
        relationship: &DbRelationship,
    ) -> Result<Vec<String>, TokenError> {
        Ok(relationship
            .fk_name
            .iter()
            .map(|fk| {
                format!(
                    "ALTER TABLE {} DROP FOREIGN KEY {}",
                    self.adapter.table_name(entity),
                    self.adapter.quoted(fk)
                )
            })
            .collect())
    }

    fn generated_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        flag: bool,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.modify(entity, column, " NOT NULL", flag)?])
    }
}

/// Microsoft SQL Server. Identity cannot be altered on an existing column.
#[derive(Debug, Clone)]
pub struct SqlServerMergerFactory {
    adapter: DbAdapter,
}

impl SqlServerMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::SqlServer))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }

    fn alter_column(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        nulls: &str,
    ) -> Result<String, TokenError> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} {}{}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            self.adapter.column_type(entity, column)?,
            nulls
        ))
    }
}

impl Default for SqlServerMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for SqlServerMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn add_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD {} {}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            self.adapter.column_type(entity, column)?
        )])
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.alter_column(entity, column, " NULL")?])
    }

    fn set_not_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.alter_column(entity, column, " NOT NULL")?])
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![self.alter_column(entity, to, null_clause(to))?])
    }

    /// An unnamed key cannot be dropped
    fn set_primary_key_sql(
        &self,
        entity: &DbEntity,
        old: &[String],
        new: &[String],
        pk_name: Option<&str>,
    ) -> Result<Vec<String>, TokenError> {
        let table = self.adapter.table_name(entity);
        let mut statements = Vec::new();
        if !old.is_empty() {
            let name = pk_name.ok_or_else(|| TokenError::InvalidMetadata {
                entity: entity.name.clone(),
                message: "primary key constraint name is unknown".to_string(),
            })?;
            statements.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                table,
                self.adapter.quoted(name)
            ));
        }
        if let Some(clause) = self.adapter.pk_clause(&with_primary_key(entity, new)) {
            statements.push(format!("ALTER TABLE {} ADD {}", table, clause));
        }
        Ok(statements)
    }
}

/// Oracle
#[derive(Debug, Clone)]
pub struct OracleMergerFactory {
    adapter: DbAdapter,
}

impl OracleMergerFactory {
    pub fn new() -> Self {
        Self::with_adapter(DbAdapter::new(Dialect::Oracle))
    }

    pub fn with_adapter(adapter: DbAdapter) -> Self {
        Self { adapter }
    }

    fn modify(&self, entity: &DbEntity, definition: String) -> String {
        format!(
            "ALTER TABLE {} MODIFY ({})",
            self.adapter.table_name(entity),
            definition
        )
    }
}

impl Default for OracleMergerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerTokenFactory for OracleMergerFactory {
    fn adapter(&self) -> &DbAdapter {
        &self.adapter
    }

    fn add_column_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD {} {}",
            self.adapter.table_name(entity),
            self.adapter.quoted(&column.name),
            self.adapter.column_type(entity, column)?
        )])
    }

    fn set_allow_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let name = self.adapter.quoted(&column.name);
        Ok(vec![self.modify(entity, format!("{} NULL", name))])
    }

    fn set_not_null_sql(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let name = self.adapter.quoted(&column.name);
        Ok(vec![self.modify(entity, format!("{} NOT NULL", name))])
    }

    fn set_column_type_sql(
        &self,
        entity: &DbEntity,
        _from: &DbAttribute,
        to: &DbAttribute,
    ) -> Result<Vec<String>, TokenError> {
        let definition = format!(
            "{} {}",
            self.adapter.quoted(&to.name),
            self.adapter.column_type(entity, to)?
        );
        Ok(vec![self.modify(entity, definition)])
    }
}

/// Factory with default settings for `dialect`
pub fn merger_factory(dialect: Dialect) -> Box<dyn MergerTokenFactory> {
    factory_with_adapter(DbAdapter::new(dialect))
}

/// Factory for the adapter's dialect, keeping the adapter's quoting settings
pub fn factory_with_adapter(adapter: DbAdapter) -> Box<dyn MergerTokenFactory> {
    match adapter.dialect {
        Dialect::Generic => Box::new(GenericMergerFactory::with_adapter(adapter)),
        Dialect::Hsql => Box::new(HsqlMergerFactory::with_adapter(adapter)),
        Dialect::H2 => Box::new(H2MergerFactory::with_adapter(adapter)),
        Dialect::Derby => Box::new(DerbyMergerFactory::with_adapter(adapter)),
        Dialect::Postgres => Box::new(PostgresMergerFactory::with_adapter(adapter)),
        Dialect::MySql => Box::new(MySqlMergerFactory::with_adapter(adapter)),
        Dialect::SqlServer => Box::new(SqlServerMergerFactory::with_adapter(adapter)),
        Dialect::Oracle => Box::new(OracleMergerFactory::with_adapter(adapter)),
    }
}
