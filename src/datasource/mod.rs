//! Database access used while executing merge tokens
//!
//! A [`DataSource`] hands out [`Connection`]s. A connection is released
//! when it is dropped, so every path through the caller gives it back.

#[cfg(feature = "mssql")]
mod mssql;

use std::io::Write;

use crate::error::SqlError;

#[cfg(feature = "mssql")]
pub use mssql::MssqlDataSource;

/// An open database connection
pub trait Connection {
    /// Runs one statement; returns the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<u64, SqlError>;

    /// Runs a query and returns the first column of the first row
    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, SqlError>;
}

/// Source of connections
pub trait DataSource {
    fn connection(&mut self) -> Result<Box<dyn Connection + '_>, SqlError>;
}

/// Data source that records statements instead of running them
#[derive(Debug, Default)]
pub struct ScriptDataSource {
    statements: Vec<String>,
}

impl ScriptDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }

    /// Writes the recorded statements, each followed by `terminator`.
    ///
    /// A `GO` style terminator goes on its own line; `;` is appended.
    pub fn write_script<W: Write>(&self, out: &mut W, terminator: &str) -> std::io::Result<()> {
        for statement in &self.statements {
            if terminator.chars().all(|c| c.is_ascii_alphabetic()) {
                writeln!(out, "{}", statement)?;
                writeln!(out, "{}", terminator)?;
            } else {
                writeln!(out, "{}{}", statement, terminator)?;
            }
        }
        Ok(())
    }
}

struct ScriptConnection<'a> {
    statements: &'a mut Vec<String>,
}

impl Connection for ScriptConnection<'_> {
    fn execute(&mut self, sql: &str) -> Result<u64, SqlError> {
        tracing::trace!(sql, "Recording statement");
        self.statements.push(sql.to_string());
        Ok(0)
    }

    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, SqlError> {
        self.statements.push(sql.to_string());
        Ok(None)
    }
}

impl DataSource for ScriptDataSource {
    fn connection(&mut self) -> Result<Box<dyn Connection + '_>, SqlError> {
        Ok(Box::new(ScriptConnection {
            statements: &mut self.statements,
        }))
    }
}
