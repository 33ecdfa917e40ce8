//! DataMap XML writing

use std::io::Write;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::model::{DataMap, DbAttribute, DbEntity, DbRelationship};

const MODEL_MAP_NS: &str = "http://cayenne.apache.org/schema/10/modelMap";

/// Writes the database layer of `map` as DataMap XML
pub fn write_data_map<W: Write>(map: &DataMap, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let root = BytesStart::new("data-map")
        .with_attributes([("xmlns", MODEL_MAP_NS), ("project-version", "10")]);
    writer.write_event(Event::Start(root))?;

    if map.quoting_sql_identifiers {
        let prop = BytesStart::new("property")
            .with_attributes([("name", "quoteSqlIdentifiers"), ("value", "true")]);
        writer.write_event(Event::Empty(prop))?;
    }

    for entity in map.entities() {
        write_entity(&mut writer, entity)?;
    }
    for entity in map.entities() {
        for relationship in &entity.relationships {
            write_relationship(&mut writer, relationship)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("data-map")))?;
    Ok(())
}

fn write_entity<W: Write>(writer: &mut Writer<W>, entity: &DbEntity) -> Result<()> {
    let mut start = BytesStart::new("db-entity");
    start.push_attribute(("name", entity.name.as_str()));
    if let Some(catalog) = &entity.catalog {
        start.push_attribute(("catalog", catalog.as_str()));
    }
    if let Some(schema) = &entity.schema {
        start.push_attribute(("schema", schema.as_str()));
    }

    if entity.attributes.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for attribute in &entity.attributes {
        writer.write_event(Event::Empty(attribute_element(attribute)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("db-entity")))?;
    Ok(())
}

fn attribute_element(attribute: &DbAttribute) -> BytesStart<'static> {
    let mut elem = BytesStart::new("db-attribute");
    elem.push_attribute(("name", attribute.name.as_str()));
    elem.push_attribute(("type", attribute.sql_type.name()));
    if attribute.generated {
        elem.push_attribute(("isGenerated", "true"));
    }
    if attribute.primary_key {
        elem.push_attribute(("isPrimaryKey", "true"));
    }
    if attribute.mandatory {
        elem.push_attribute(("isMandatory", "true"));
    }
    if let Some(length) = attribute.max_length {
        elem.push_attribute(("length", length.to_string().as_str()));
    }
    if let Some(scale) = attribute.scale {
        elem.push_attribute(("scale", scale.to_string().as_str()));
    }
    elem
}

fn write_relationship<W: Write>(
    writer: &mut Writer<W>,
    relationship: &DbRelationship,
) -> Result<()> {
    let mut start = BytesStart::new("db-relationship");
    start.push_attribute(("name", relationship.name.as_str()));
    start.push_attribute(("source", relationship.source_entity.as_str()));
    start.push_attribute(("target", relationship.target_entity.as_str()));
    if relationship.to_dependent_pk {
        start.push_attribute(("toDependentPK", "true"));
    }
    start.push_attribute(("toMany", if relationship.to_many { "true" } else { "false" }));

    writer.write_event(Event::Start(start))?;
    for join in &relationship.joins {
        let pair = BytesStart::new("db-attribute-pair")
            .with_attributes([("source", join.source.as_str()), ("target", join.target.as_str())]);
        writer.write_event(Event::Empty(pair))?;
    }
    writer.write_event(Event::End(BytesEnd::new("db-relationship")))?;
    Ok(())
}
