//! Failures collected while executing tokens

use std::fmt;

/// One failed statement or model change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Display form of the token, e.g. `Add Column ARTIST.NAME To DB`
    pub token: String,
    /// The statement that failed; None for model-side failures
    pub statement: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statement {
            Some(sql) => write!(f, "{}: {} [{}]", self.token, self.message, sql),
            None => write!(f, "{}: {}", self.token, self.message),
        }
    }
}

/// Accumulates failures; execution keeps going after each one
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_failure(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
