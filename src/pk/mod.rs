//! Primary keys drawn from a shared `AUTO_PK_SUPPORT` table
//!
//! Each table has one row holding the next free id. A generator reads the
//! row and advances it by the cache size while holding a [`TableLock`].

mod lock;

pub use lock::TableLock;

use crate::datasource::Connection;
use crate::dialect::Dialect;
use crate::error::SqlError;
use crate::model::DbEntity;

pub const AUTO_PK_TABLE: &str = "AUTO_PK_SUPPORT";
pub const DEFAULT_PK_CACHE_SIZE: i64 = 20;
/// First id handed out for a freshly seeded table
pub const DEFAULT_PK_START: i64 = 200;

/// DDL and queries for the `AUTO_PK_SUPPORT` table
#[derive(Debug, Clone, Copy)]
pub struct AutoPkSupport {
    dialect: Dialect,
    cache_size: i64,
}

impl AutoPkSupport {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            cache_size: DEFAULT_PK_CACHE_SIZE,
        }
    }

    pub fn cache_size(mut self, cache_size: i64) -> Self {
        self.cache_size = cache_size.max(1);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (TABLE_NAME CHAR(100) NOT NULL, NEXT_ID {} NOT NULL, PRIMARY KEY (TABLE_NAME))",
            AUTO_PK_TABLE,
            match self.dialect {
                Dialect::Oracle => "NUMBER",
                _ => "BIGINT",
            }
        )
    }

    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE {}", AUTO_PK_TABLE)
    }

    pub fn delete_entries_sql(&self, entities: &[&DbEntity]) -> String {
        let names: Vec<String> = entities.iter().map(|e| quote_literal(&e.name)).collect();
        format!(
            "DELETE FROM {} WHERE TABLE_NAME IN ({})",
            AUTO_PK_TABLE,
            names.join(", ")
        )
    }

    pub fn seed_sql(&self, entity: &DbEntity) -> String {
        format!(
            "INSERT INTO {} (TABLE_NAME, NEXT_ID) VALUES ({}, {})",
            AUTO_PK_TABLE,
            quote_literal(&entity.name),
            DEFAULT_PK_START
        )
    }

    /// Everything needed to set up key generation for `entities`
    pub fn create_statements(&self, entities: &[&DbEntity]) -> Vec<String> {
        let mut statements = vec![self.create_table_sql()];
        if !entities.is_empty() {
            statements.push(self.delete_entries_sql(entities));
        }
        statements.extend(entities.iter().map(|e| self.seed_sql(e)));
        statements
    }

    pub fn select_sql(&self, entity: &DbEntity) -> String {
        let hint = match self.dialect {
            Dialect::SqlServer => " WITH (UPDLOCK, HOLDLOCK)",
            _ => "",
        };
        format!(
            "SELECT NEXT_ID FROM {}{} WHERE TABLE_NAME = {}",
            AUTO_PK_TABLE,
            hint,
            quote_literal(&entity.name)
        )
    }

    pub fn update_sql(&self, entity: &DbEntity) -> String {
        format!(
            "UPDATE {} SET NEXT_ID = NEXT_ID + {} WHERE TABLE_NAME = {}",
            AUTO_PK_TABLE,
            self.cache_size,
            quote_literal(&entity.name)
        )
    }
}

/// SQL string literal for a table name
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reserves the next block of ids for `entity` and returns its first id.
///
/// The table stays locked for the select and update. It is unlocked when
/// the guard drops; a transaction is only committed if the update ran.
pub fn generate_pk(
    conn: &mut dyn Connection,
    support: &AutoPkSupport,
    entity: &DbEntity,
) -> Result<i64, SqlError> {
    let mut lock = TableLock::acquire(conn, support.dialect())?;
    let conn = lock.connection();

    let next = conn.query_i64(&support.select_sql(entity))?.ok_or_else(|| {
        SqlError::new(format!(
            "no {} row for table {}",
            AUTO_PK_TABLE, entity.name
        ))
    })?;
    conn.execute(&support.update_sql(entity))?;
    lock.complete();

    tracing::debug!(table = %entity.name, next, "Reserved primary key block");
    Ok(next)
}
