//! Common test utilities for rust-dbmerge tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_dbmerge::datasource::{Connection, DataSource};
use rust_dbmerge::model::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};
use rust_dbmerge::SqlError;

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestContext {
    /// Create a new test context by copying a fixture to a temp directory
    pub fn with_fixture(fixture_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(fixture_name);

        let root = temp_dir.path().to_path_buf();
        copy_dir_recursive(&fixture_path, &root).expect("Failed to copy fixture");

        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Path inside the fixture copy, as the string the loader expects
    pub fn path(&self, relative: &str) -> String {
        self.root.join(relative).to_string_lossy().into_owned()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

// ============================================================================
// Model fixtures
// ============================================================================

pub fn artist() -> DbEntity {
    DbEntity::new("ARTIST")
        .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::BigInt).primary_key())
        .with_attribute(DbAttribute::new("ARTIST_NAME", SqlType::Char).length(254).mandatory())
        .with_attribute(DbAttribute::new("DATE_OF_BIRTH", SqlType::Date))
}

pub fn gallery() -> DbEntity {
    DbEntity::new("GALLERY")
        .with_attribute(DbAttribute::new("GALLERY_ID", SqlType::Integer).primary_key())
        .with_attribute(DbAttribute::new("GALLERY_NAME", SqlType::Varchar).length(100).mandatory())
}

pub fn painting() -> DbEntity {
    DbEntity::new("PAINTING")
        .with_attribute(DbAttribute::new("PAINTING_ID", SqlType::Integer).primary_key())
        .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::BigInt))
        .with_attribute(DbAttribute::new("GALLERY_ID", SqlType::Integer))
        .with_attribute(DbAttribute::new("PAINTING_TITLE", SqlType::Varchar).length(255).mandatory())
        .with_attribute(DbAttribute::new("ESTIMATED_PRICE", SqlType::Decimal).precision(10, 2))
        .with_relationship(to_artist())
        .with_relationship(to_gallery())
}

pub fn to_artist() -> DbRelationship {
    DbRelationship::new("toArtist", "PAINTING", "ARTIST").join("ARTIST_ID", "ARTIST_ID")
}

pub fn to_gallery() -> DbRelationship {
    DbRelationship::new("toGallery", "PAINTING", "GALLERY").join("GALLERY_ID", "GALLERY_ID")
}

/// ARTIST, GALLERY and PAINTING with PAINTING's two foreign keys
pub fn gallery_model() -> DataMap {
    DataMap::new("gallery")
        .with_entity(artist())
        .with_entity(gallery())
        .with_entity(painting())
}

/// Applies `change` to one entity of a copy of `map`
pub fn with_entity_changed(map: &DataMap, name: &str, change: impl FnOnce(&mut DbEntity)) -> DataMap {
    let mut copy = map.clone();
    change(copy.entity_mut(name).expect("Fixture entity missing"));
    copy
}

// ============================================================================
// Data source doubles
// ============================================================================

/// Records statements and fails the ones containing `fail_on`
#[derive(Debug, Default)]
pub struct FailingDataSource {
    pub executed: Vec<String>,
    pub fail_on: Vec<&'static str>,
}

impl FailingDataSource {
    pub fn failing_on(patterns: &[&'static str]) -> Self {
        Self {
            executed: Vec::new(),
            fail_on: patterns.to_vec(),
        }
    }
}

struct FailingConnection<'a> {
    source: &'a mut FailingDataSource,
}

impl Connection for FailingConnection<'_> {
    fn execute(&mut self, sql: &str) -> Result<u64, SqlError> {
        if self.source.fail_on.iter().any(|p| sql.contains(p)) {
            return Err(SqlError::with_code(format!("rejected: {}", sql), 42));
        }
        self.source.executed.push(sql.to_string());
        Ok(1)
    }

    fn query_i64(&mut self, _sql: &str) -> Result<Option<i64>, SqlError> {
        Ok(None)
    }
}

impl DataSource for FailingDataSource {
    fn connection(&mut self) -> Result<Box<dyn Connection + '_>, SqlError> {
        Ok(Box::new(FailingConnection { source: self }))
    }
}
