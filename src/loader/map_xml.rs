//! DataMap XML reading

use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::DbMergeError;
use crate::model::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};

/// Parses the `db-entity` and `db-relationship` elements of a DataMap file.
/// Object-layer elements are ignored.
pub fn parse_data_map(path: &Path, content: &str) -> Result<DataMap, DbMergeError> {
    let doc = Document::parse(content).map_err(|source| DbMergeError::MapParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "data-map" {
        return Err(invalid(format!(
            "expected <data-map> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut map = DataMap::new(map_name(path));
    let mut relationships = Vec::new();

    for node in root.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "property" => {
                if node.attribute("name") == Some("quoteSqlIdentifiers") {
                    map.quoting_sql_identifiers = flag(&node, "value");
                }
            }
            "db-entity" => map.add_entity(parse_entity(&node)?),
            "db-relationship" => relationships.push(parse_relationship(&node)?),
            _ => {}
        }
    }

    for relationship in relationships {
        let source = relationship.source_entity.clone();
        let entity = map.entity_mut(&source).ok_or_else(|| {
            invalid(format!(
                "relationship '{}' has unknown source entity '{}'",
                relationship.name, source
            ))
        })?;
        entity.add_relationship(relationship);
    }

    tracing::debug!(path = %path.display(), entities = map.len(), "Parsed DataMap");
    Ok(map)
}

fn parse_entity(node: &Node) -> Result<DbEntity, DbMergeError> {
    let mut entity = DbEntity::new(required(node, "name")?);
    entity.schema = node.attribute("schema").map(str::to_string);
    entity.catalog = node.attribute("catalog").map(str::to_string);

    for child in node.children().filter(|n| n.has_tag_name("db-attribute")) {
        let sql_type = child
            .attribute("type")
            .map_or(SqlType::Other, SqlType::from_name);
        let mut attribute = DbAttribute::new(required(&child, "name")?, sql_type);
        attribute.max_length = number(&child, "length");
        // Older files store the scale as "precision"
        attribute.scale = number(&child, "scale").or_else(|| number(&child, "precision"));
        attribute.primary_key = flag(&child, "isPrimaryKey");
        attribute.mandatory = flag(&child, "isMandatory") || attribute.primary_key;
        attribute.generated = flag(&child, "isGenerated");
        entity.add_attribute(attribute);
    }
    Ok(entity)
}

fn parse_relationship(node: &Node) -> Result<DbRelationship, DbMergeError> {
    let mut relationship = DbRelationship::new(
        required(node, "name")?,
        required(node, "source")?,
        required(node, "target")?,
    );
    relationship.to_many = flag(node, "toMany");
    relationship.to_dependent_pk = flag(node, "toDependentPK");

    for pair in node
        .children()
        .filter(|n| n.has_tag_name("db-attribute-pair"))
    {
        relationship = relationship.join(required(&pair, "source")?, required(&pair, "target")?);
    }
    Ok(relationship)
}

fn map_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file.strip_suffix(".map.xml")
        .or_else(|| file.strip_suffix(".xml"))
        .unwrap_or(&file)
        .to_string()
}

fn required(node: &Node, name: &str) -> Result<String, DbMergeError> {
    node.attribute(name).map(str::to_string).ok_or_else(|| {
        invalid(format!(
            "<{}> is missing the '{}' attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn flag(node: &Node, name: &str) -> bool {
    node.attribute(name)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn number(node: &Node, name: &str) -> Option<u32> {
    node.attribute(name).and_then(|v| v.trim().parse().ok())
}

fn invalid(message: String) -> DbMergeError {
    DbMergeError::InvalidMapFormat { message }
}
