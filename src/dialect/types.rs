//! Per-dialect column type names

use std::collections::HashMap;

use super::Dialect;
use crate::model::SqlType;

/// External type name for one [`SqlType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: &'static str,
    /// False when the external type takes no `(length[, scale])` suffix
    pub sized: bool,
}

impl TypeInfo {
    const fn sized(name: &'static str) -> Self {
        Self { name, sized: true }
    }

    const fn fixed(name: &'static str) -> Self {
        Self { name, sized: false }
    }
}

/// Lookup table from type codes to dialect type names, built once per adapter
#[derive(Debug, Clone)]
pub struct TypeMap {
    types: HashMap<SqlType, TypeInfo>,
}

impl TypeMap {
    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut types: HashMap<SqlType, TypeInfo> = SqlType::ALL
            .iter()
            .filter(|t| **t != SqlType::Other)
            .map(|t| (*t, TypeInfo::sized(t.name())))
            .collect();

        for (sql_type, info) in overrides(dialect) {
            types.insert(sql_type, info);
        }
        Self { types }
    }

    /// None means the type is undefined for this dialect
    pub fn get(&self, sql_type: SqlType) -> Option<TypeInfo> {
        self.types.get(&sql_type).copied()
    }

    /// Reverse lookup, used when reading DDL written for this dialect
    pub fn sql_type_of(&self, external: &str) -> Option<SqlType> {
        let upper = external.trim().to_ascii_uppercase();
        SqlType::ALL
            .iter()
            .copied()
            .find(|t| self.get(*t).is_some_and(|info| info.name == upper))
    }
}

fn overrides(dialect: Dialect) -> Vec<(SqlType, TypeInfo)> {
    use SqlType::*;
    match dialect {
        Dialect::Generic | Dialect::Hsql => Vec::new(),
        Dialect::H2 => vec![
            (Bit, TypeInfo::fixed("BOOLEAN")),
            (LongVarchar, TypeInfo::fixed("CLOB")),
            (LongVarBinary, TypeInfo::fixed("BLOB")),
        ],
        Dialect::Derby => vec![
            (Bit, TypeInfo::fixed("SMALLINT")),
            (TinyInt, TypeInfo::fixed("SMALLINT")),
            (NChar, TypeInfo::sized("CHAR")),
            (NVarchar, TypeInfo::sized("VARCHAR")),
            (LongVarchar, TypeInfo::fixed("LONG VARCHAR")),
            (Binary, TypeInfo::sized("CHAR FOR BIT DATA")),
            (VarBinary, TypeInfo::sized("VARCHAR FOR BIT DATA")),
            (LongVarBinary, TypeInfo::fixed("LONG VARCHAR FOR BIT DATA")),
        ],
        Dialect::Postgres => vec![
            (Bit, TypeInfo::fixed("BOOLEAN")),
            (TinyInt, TypeInfo::fixed("SMALLINT")),
            (Double, TypeInfo::fixed("DOUBLE PRECISION")),
            (Real, TypeInfo::fixed("REAL")),
            (NChar, TypeInfo::sized("CHAR")),
            (NVarchar, TypeInfo::sized("VARCHAR")),
            (LongVarchar, TypeInfo::fixed("TEXT")),
            (Clob, TypeInfo::fixed("TEXT")),
            (Binary, TypeInfo::fixed("BYTEA")),
            (VarBinary, TypeInfo::fixed("BYTEA")),
            (LongVarBinary, TypeInfo::fixed("BYTEA")),
            (Blob, TypeInfo::fixed("BYTEA")),
        ],
        Dialect::MySql => vec![
            (Boolean, TypeInfo::fixed("BOOLEAN")),
            (NChar, TypeInfo::sized("CHAR")),
            (NVarchar, TypeInfo::sized("VARCHAR")),
            (LongVarchar, TypeInfo::fixed("LONGTEXT")),
            (Clob, TypeInfo::fixed("LONGTEXT")),
            (Timestamp, TypeInfo::fixed("DATETIME")),
            (LongVarBinary, TypeInfo::fixed("LONGBLOB")),
            (Blob, TypeInfo::fixed("LONGBLOB")),
        ],
        Dialect::SqlServer => vec![
            (Boolean, TypeInfo::fixed("BIT")),
            (Double, TypeInfo::fixed("FLOAT")),
            (LongVarchar, TypeInfo::fixed("TEXT")),
            (Clob, TypeInfo::fixed("NTEXT")),
            (Timestamp, TypeInfo::fixed("DATETIME")),
            (LongVarBinary, TypeInfo::fixed("IMAGE")),
            (Blob, TypeInfo::fixed("IMAGE")),
        ],
        Dialect::Oracle => vec![
            (Bit, TypeInfo::fixed("NUMBER(1)")),
            (Boolean, TypeInfo::fixed("NUMBER(1)")),
            (TinyInt, TypeInfo::fixed("NUMBER(3)")),
            (SmallInt, TypeInfo::fixed("NUMBER(5)")),
            (BigInt, TypeInfo::fixed("NUMBER(19)")),
            (Double, TypeInfo::fixed("DOUBLE PRECISION")),
            (Numeric, TypeInfo::sized("NUMBER")),
            (Varchar, TypeInfo::sized("VARCHAR2")),
            (NVarchar, TypeInfo::sized("NVARCHAR2")),
            (LongVarchar, TypeInfo::fixed("CLOB")),
            (Time, TypeInfo::fixed("DATE")),
            (Binary, TypeInfo::sized("RAW")),
            (VarBinary, TypeInfo::sized("RAW")),
            (LongVarBinary, TypeInfo::fixed("BLOB")),
        ],
    }
}
