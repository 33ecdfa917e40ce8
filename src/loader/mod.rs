//! Schema input and output
//!
//! A schema comes from DataMap XML files, DDL scripts, a directory holding
//! either, or a glob pattern over them. All DDL files of one source are read
//! by a single [`DdlLoader`] so foreign keys may reference tables declared
//! in other files.

pub mod ddl;
pub mod map_xml;
pub mod writer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;

pub use ddl::{parse_ddl, DdlLoader};
pub use map_xml::parse_data_map;
pub use writer::write_data_map;

use crate::dialect::Dialect;
use crate::error::DbMergeError;
use crate::model::DataMap;

/// Loads a schema from a file, directory or glob pattern
pub fn load_data_map(source: &str, dialect: Dialect) -> Result<DataMap> {
    let files = collect_schema_files(source)?;
    if files.is_empty() {
        return Err(DbMergeError::NoSchemaFiles {
            pattern: source.to_string(),
        }
        .into());
    }
    tracing::info!(source, files = files.len(), "Loading schema");

    let mut map = DataMap::new(source_name(source));
    let mut ddl = DdlLoader::new(map.name.clone(), dialect);
    let mut has_ddl = false;

    for file in &files {
        let content = read_file_with_encoding_fallback(file).map_err(|e| {
            DbMergeError::SchemaReadError {
                path: file.clone(),
                source: e,
            }
        })?;

        if is_map_file(file) {
            let parsed = parse_data_map(file, &content)?;
            map.quoting_sql_identifiers |= parsed.quoting_sql_identifiers;
            for entity in parsed.entities() {
                map.add_entity(entity.clone());
            }
        } else {
            ddl.load(file, &content)?;
            has_ddl = true;
        }
    }

    if has_ddl {
        for entity in ddl.finish()?.entities() {
            map.add_entity(entity.clone());
        }
    }

    tracing::debug!(entities = map.len(), "Schema loaded");
    Ok(map)
}

/// Files named by `source`, sorted so loading order is reproducible
pub fn collect_schema_files(source: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(source);
    let mut files = Vec::new();

    if path.is_dir() {
        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_schema_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    } else if source.contains(['*', '?', '[']) {
        let paths = glob::glob(source).with_context(|| format!("Invalid glob pattern: {}", source))?;
        files.extend(
            paths
                .filter_map(|p| p.ok())
                .filter(|p| p.is_file() && is_schema_file(p)),
        );
    } else if path.is_file() {
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_map_file(path: &Path) -> bool {
    path.to_string_lossy().to_ascii_lowercase().ends_with(".map.xml")
}

fn is_schema_file(path: &Path) -> bool {
    is_map_file(path)
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

fn source_name(source: &str) -> String {
    let path = Path::new(source);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    name.split('.').next().unwrap_or(&name).to_string()
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
pub fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}
