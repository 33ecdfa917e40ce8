//! Error types for rust-dbmerge

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::dialect::Dialect;

/// Errors that can occur while loading schemas or planning a merge
#[derive(Error, Debug)]
pub enum DbMergeError {
    #[error("Failed to read schema file: {path}")]
    SchemaReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse DataMap file: {path}")]
    MapParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid DataMap file format: {message}")]
    InvalidMapFormat { message: String },

    #[error("SQL parse error in {path}: {message}")]
    SqlParseError { path: PathBuf, message: String },

    #[error("No schema files matched: {pattern}")]
    NoSchemaFiles { pattern: String },

    #[error("Unknown dialect: {name}")]
    UnknownDialect { name: String },

    #[error("Invalid table filter pattern '{pattern}'")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid metadata for '{entity}': {message}")]
    InvalidMetadata { entity: String, message: String },

    #[error("Dependency cycle between merge tokens: {tokens}")]
    DependencyCycle { tokens: String },

    #[error("XML generation error: {message}")]
    XmlGenerationError { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// A capability the target dialect does not have.
///
/// This is a dialect limitation, not a runtime data problem, so it is kept
/// apart from [`SqlError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{dialect} does not support {feature}")]
pub struct UnsupportedFeature {
    pub dialect: Dialect,
    pub feature: String,
}

impl UnsupportedFeature {
    pub fn new(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Errors raised while rendering a token into SQL or applying it to a model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeature),

    #[error("Undefined type for attribute '{entity}.{attribute}'")]
    UndefinedType { entity: String, attribute: String },

    #[error("Invalid metadata for '{entity}': {message}")]
    InvalidMetadata { entity: String, message: String },
}

/// A failure reported by a database connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SqlError {
    pub message: String,
    pub code: Option<i32>,
}

impl SqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}
