//! Column type codes

use std::fmt;
use std::str::FromStr;

/// JDBC-style column type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    /// Type that could not be mapped; attributes of this type cannot be rendered
    Other,
}

impl SqlType {
    pub const ALL: [SqlType; 25] = [
        SqlType::Bit,
        SqlType::Boolean,
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Float,
        SqlType::Real,
        SqlType::Double,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Char,
        SqlType::Varchar,
        SqlType::LongVarchar,
        SqlType::NChar,
        SqlType::NVarchar,
        SqlType::Clob,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::Binary,
        SqlType::VarBinary,
        SqlType::LongVarBinary,
        SqlType::Blob,
        SqlType::Other,
    ];

    /// Name used in DataMap files (`java.sql.Types` field name)
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarchar => "NVARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::Blob => "BLOB",
            SqlType::Other => "OTHER",
        }
    }

    /// Map a type name as it appears in DDL or DataMap files.
    ///
    /// Dialect spellings (`INT`, `NUMBER`, `TEXT`, `DATETIME2`, ...) are
    /// folded onto the closest code. Unknown names map to [`SqlType::Other`].
    pub fn from_name(name: &str) -> SqlType {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");
        match base {
            "BIT" => SqlType::Bit,
            "BOOLEAN" | "BOOL" => SqlType::Boolean,
            "TINYINT" => SqlType::TinyInt,
            "SMALLINT" | "INT2" | "SMALLSERIAL" => SqlType::SmallInt,
            "INTEGER" | "INT" | "INT4" | "SERIAL" | "MEDIUMINT" => SqlType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" => SqlType::BigInt,
            "FLOAT" => SqlType::Float,
            "REAL" | "FLOAT4" => SqlType::Real,
            "DOUBLE" | "FLOAT8" => SqlType::Double,
            "NUMERIC" | "NUMBER" => SqlType::Numeric,
            "DECIMAL" | "DEC" | "MONEY" => SqlType::Decimal,
            "CHAR" | "CHARACTER" => SqlType::Char,
            "VARCHAR" | "VARCHAR2" => SqlType::Varchar,
            "LONGVARCHAR" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => SqlType::LongVarchar,
            "NCHAR" => SqlType::NChar,
            "NVARCHAR" | "NVARCHAR2" => SqlType::NVarchar,
            "CLOB" | "NCLOB" | "NTEXT" => SqlType::Clob,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" | "DATETIME" | "DATETIME2" | "SMALLDATETIME" => SqlType::Timestamp,
            "BINARY" => SqlType::Binary,
            "VARBINARY" | "RAW" => SqlType::VarBinary,
            "LONGVARBINARY" | "IMAGE" | "BYTEA" => SqlType::LongVarBinary,
            "BLOB" | "LONGBLOB" | "MEDIUMBLOB" => SqlType::Blob,
            _ => SqlType::Other,
        }
    }

    /// True if the type takes a length (or precision) in a column definition
    pub fn supports_length(&self) -> bool {
        matches!(
            self,
            SqlType::Binary
                | SqlType::Char
                | SqlType::NChar
                | SqlType::NVarchar
                | SqlType::Decimal
                | SqlType::Double
                | SqlType::Float
                | SqlType::Numeric
                | SqlType::Real
                | SqlType::VarBinary
                | SqlType::Varchar
        )
    }

    /// True for exact and approximate decimal types
    pub fn is_decimal(&self) -> bool {
        matches!(
            self,
            SqlType::Decimal | SqlType::Numeric | SqlType::Double | SqlType::Float | SqlType::Real
        )
    }

    pub fn is_character(&self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::Varchar | SqlType::NChar | SqlType::NVarchar
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SqlType::from_name(s))
    }
}
