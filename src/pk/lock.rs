use super::AUTO_PK_TABLE;
use crate::datasource::Connection;
use crate::dialect::Dialect;
use crate::error::SqlError;

/// Holds a lock on `AUTO_PK_SUPPORT` for as long as it lives.
///
/// Unlock statements run in `Drop`; an unlock failure is logged since
/// there is no caller left to return it to. Work done under the lock is
/// rolled back unless [`TableLock::complete`] was called.
pub struct TableLock<'c> {
    conn: &'c mut dyn Connection,
    dialect: Dialect,
    completed: bool,
}

impl<'c> TableLock<'c> {
    pub fn acquire(conn: &'c mut dyn Connection, dialect: Dialect) -> Result<Self, SqlError> {
        for sql in lock_statements(dialect) {
            conn.execute(&sql)?;
        }
        tracing::trace!(%dialect, "Locked {}", AUTO_PK_TABLE);
        Ok(Self {
            conn,
            dialect,
            completed: false,
        })
    }

    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    /// Marks the work under the lock as done so it is kept on unlock
    pub fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for TableLock<'_> {
    fn drop(&mut self) {
        for sql in unlock_statements(self.dialect, self.completed) {
            if let Err(e) = self.conn.execute(&sql) {
                tracing::warn!(error = %e, statement = %sql, "Failed to unlock {}", AUTO_PK_TABLE);
            }
        }
    }
}

fn lock_statements(dialect: Dialect) -> Vec<String> {
    match dialect {
        Dialect::MySql => vec![format!("LOCK TABLES {} WRITE", AUTO_PK_TABLE)],
        Dialect::SqlServer => vec![
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE".to_string(),
            "BEGIN TRANSACTION".to_string(),
        ],
        _ => Vec::new(),
    }
}

fn unlock_statements(dialect: Dialect, completed: bool) -> Vec<String> {
    match dialect {
        Dialect::MySql => vec!["UNLOCK TABLES".to_string()],
        Dialect::SqlServer if completed => vec!["COMMIT TRANSACTION".to_string()],
        Dialect::SqlServer => vec!["ROLLBACK TRANSACTION".to_string()],
        _ => Vec::new(),
    }
}
