//! Database dialects: capabilities, identifier quoting, type names and DDL

mod adapter;
mod quoting;
mod types;

use std::fmt;
use std::str::FromStr;

pub use adapter::DbAdapter;
pub use quoting::QuotingStrategy;
pub use types::{TypeInfo, TypeMap};

use crate::error::DbMergeError;

/// Supported target databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Generic,
    Hsql,
    H2,
    Derby,
    Postgres,
    MySql,
    SqlServer,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 8] = [
        Dialect::Generic,
        Dialect::Hsql,
        Dialect::H2,
        Dialect::Derby,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::SqlServer,
        Dialect::Oracle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Hsql => "hsql",
            Dialect::H2 => "h2",
            Dialect::Derby => "derby",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        }
    }

    /// Capabilities for this dialect
    pub fn capabilities(&self) -> Capabilities {
        let base = Capabilities::default();
        match self {
            Dialect::Generic => base,
            Dialect::Hsql | Dialect::H2 | Dialect::Postgres | Dialect::MySql => Capabilities {
                supports_generated_keys: true,
                supports_generated_keys_add: true,
                supports_generated_keys_drop: true,
                supports_batch_updates: true,
                ..base
            },
            Dialect::Derby | Dialect::SqlServer => Capabilities {
                supports_generated_keys: true,
                supports_batch_updates: true,
                ..base
            },
            Dialect::Oracle => Capabilities {
                supports_batch_updates: true,
                ..base
            },
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = DbMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "jdbc" => Ok(Dialect::Generic),
            "hsql" | "hsqldb" => Ok(Dialect::Hsql),
            "h2" => Ok(Dialect::H2),
            "derby" => Ok(Dialect::Derby),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "oracle" => Ok(Dialect::Oracle),
            _ => Err(DbMergeError::UnknownDialect {
                name: s.to_string(),
            }),
        }
    }
}

/// What a dialect can do. Passed around explicitly, never read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_generated_keys: bool,
    /// Turning an existing column into a generated one
    pub supports_generated_keys_add: bool,
    /// Turning a generated column back into a plain one
    pub supports_generated_keys_drop: bool,
    pub supports_fk_constraints: bool,
    pub supports_unique_constraints: bool,
    pub supports_batch_updates: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            supports_generated_keys: false,
            supports_generated_keys_add: false,
            supports_generated_keys_drop: false,
            supports_fk_constraints: true,
            supports_unique_constraints: true,
            supports_batch_updates: false,
        }
    }
}
