//! Schema loading from files, directories and glob patterns

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use rust_dbmerge::loader::{collect_schema_files, load_data_map, write_data_map};
use rust_dbmerge::model::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};
use rust_dbmerge::{DbMergeError, Dialect};

const ARTIST_SQL: &str = "CREATE TABLE ARTIST (\n\
    ARTIST_ID BIGINT NOT NULL PRIMARY KEY,\n\
    ARTIST_NAME VARCHAR(254) NOT NULL\n\
);\n";

const PAINTING_SQL: &str = "CREATE TABLE PAINTING (\n\
    PAINTING_ID INTEGER NOT NULL PRIMARY KEY,\n\
    ARTIST_ID BIGINT,\n\
    CONSTRAINT FK_PAINTING_ARTIST FOREIGN KEY (ARTIST_ID) REFERENCES ARTIST (ARTIST_ID)\n\
);\n";

fn schema_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write schema file");
    }
    dir
}

#[test]
fn test_directory_resolves_foreign_keys_across_files() {
    // PAINTING sorts before the table it references
    let dir = schema_dir(&[
        ("b_artist.sql", ARTIST_SQL.as_bytes()),
        ("a_painting.sql", PAINTING_SQL.as_bytes()),
        ("README.md", b"not a schema"),
    ]);

    let map = load_data_map(dir.path().to_str().unwrap(), Dialect::Generic).unwrap();
    assert_eq!(map.len(), 2);
    let rel = &map.entity("PAINTING").unwrap().relationships[0];
    assert_eq!(rel.target_entity, "ARTIST");
    assert_eq!(rel.fk_name.as_deref(), Some("FK_PAINTING_ARTIST"));
    assert!(rel.is_to_pk(&map));
}

#[test]
fn test_nested_directories_are_walked() {
    let dir = schema_dir(&[
        ("tables/artist.sql", ARTIST_SQL.as_bytes()),
        ("tables/more/painting.sql", PAINTING_SQL.as_bytes()),
    ]);
    let files = collect_schema_files(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn test_glob_pattern_selects_files() {
    let dir = schema_dir(&[
        ("artist.sql", ARTIST_SQL.as_bytes()),
        ("painting.sql", PAINTING_SQL.as_bytes()),
        ("gallery.txt", b"CREATE TABLE GALLERY (ID INT);"),
    ]);
    let pattern = format!("{}/art*.sql", dir.path().display());

    let map = load_data_map(&pattern, Dialect::Generic).unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.entity("ARTIST").is_some());
}

#[test]
fn test_windows_1252_file_is_decoded() {
    let mut content = b"-- Caf\xe9 schema\n".to_vec();
    content.extend_from_slice(ARTIST_SQL.as_bytes());
    let dir = schema_dir(&[("artist.sql", &content)]);

    let map = load_data_map(dir.path().to_str().unwrap(), Dialect::Generic).unwrap();
    assert!(map.entity("ARTIST").is_some());
}

#[test]
fn test_utf8_bom_is_stripped() {
    let mut content = b"\xef\xbb\xbf".to_vec();
    content.extend_from_slice(ARTIST_SQL.as_bytes());
    let dir = schema_dir(&[("artist.sql", &content)]);
    let path = dir.path().join("artist.sql");

    let map = load_data_map(path.to_str().unwrap(), Dialect::Generic).unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn test_no_schema_files() {
    let dir = schema_dir(&[("notes.txt", b"nothing here")]);
    let err = load_data_map(dir.path().to_str().unwrap(), Dialect::Generic).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DbMergeError>(),
        Some(DbMergeError::NoSchemaFiles { .. })
    ));
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = schema_dir(&[("broken.sql", b"CREATE TABLE T (A INT")]);
    let err = load_data_map(dir.path().to_str().unwrap(), Dialect::Generic).unwrap_err();
    assert!(err.to_string().contains("broken.sql"));
}

#[test]
fn test_written_map_loads_back() {
    let map = DataMap::new("gallery")
        .with_entity(
            DbEntity::new("ARTIST")
                .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::BigInt).primary_key())
                .with_attribute(DbAttribute::new("ARTIST_NAME", SqlType::Varchar).length(254)),
        )
        .with_entity(
            DbEntity::new("PAINTING")
                .with_attribute(DbAttribute::new("PAINTING_ID", SqlType::Integer).primary_key().generated())
                .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::BigInt))
                .with_attribute(DbAttribute::new("ESTIMATED_PRICE", SqlType::Decimal).precision(10, 2))
                .with_relationship(
                    DbRelationship::new("toArtist", "PAINTING", "ARTIST").join("ARTIST_ID", "ARTIST_ID"),
                ),
        );

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gallery.map.xml");
    write_data_map(&map, fs::File::create(&path).unwrap()).unwrap();

    let loaded = load_data_map(path.to_str().unwrap(), Dialect::Generic).unwrap();
    assert_eq!(loaded, map);
}

#[test]
fn test_map_and_ddl_files_are_combined() {
    let xml = r#"<data-map>
	<db-entity name="GALLERY">
		<db-attribute name="GALLERY_ID" type="INTEGER" isPrimaryKey="true" isMandatory="true"/>
	</db-entity>
</data-map>"#;
    let dir = schema_dir(&[
        ("artist.sql", ARTIST_SQL.as_bytes()),
        ("gallery.map.xml", xml.as_bytes()),
    ]);

    let map = load_data_map(dir.path().to_str().unwrap(), Dialect::Generic).unwrap();
    let mut names: Vec<&str> = map.entities().iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["ARTIST", "GALLERY"]);
}
