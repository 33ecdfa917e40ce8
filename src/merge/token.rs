//! Merge tokens: one schema difference and the action that resolves it

use std::fmt;

use super::context::MergerContext;
use super::factory::MergerTokenFactory;
use crate::diff::{ArcId, GraphDiff, NodeId};
use crate::error::{TokenError, UnsupportedFeature};
use crate::model::{DbAttribute, DbEntity, DbRelationship};

/// Arc label linking an entity node to its attribute nodes in the change log
const ATTRIBUTES_ARC: &str = "attributes";

/// Which side of the comparison is brought in line with the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeDirection {
    /// Change the database to match the model
    ToDb,
    /// Change the model to match the database
    ToModel,
}

impl MergeDirection {
    pub fn reverse(self) -> Self {
        match self {
            MergeDirection::ToDb => MergeDirection::ToModel,
            MergeDirection::ToModel => MergeDirection::ToDb,
        }
    }
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeDirection::ToDb => f.write_str("To DB"),
            MergeDirection::ToModel => f.write_str("To Model"),
        }
    }
}

/// What a token does, with the data it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    CreateTable,
    DropTable,
    AddColumn {
        column: DbAttribute,
    },
    DropColumn {
        column: DbAttribute,
    },
    SetAllowNull {
        column: DbAttribute,
    },
    SetNotNull {
        column: DbAttribute,
    },
    /// `from` is the column as it is now, `to` as it should become
    SetColumnType {
        from: DbAttribute,
        to: DbAttribute,
    },
    /// Column names of the current and the wanted primary key
    SetPrimaryKey {
        old: Vec<String>,
        new: Vec<String>,
        pk_name: Option<String>,
    },
    SetGeneratedFlag {
        column: DbAttribute,
        flag: bool,
    },
    AddRelationship {
        relationship: DbRelationship,
        target: DbEntity,
    },
    DropRelationship {
        relationship: DbRelationship,
        target: DbEntity,
    },
    /// `value` is an SQL literal
    SetValueForNull {
        column: DbAttribute,
        value: String,
    },
}

/// Result of running one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executed {
    /// Number of statements submitted to the data source
    Statements(usize),
    /// Number of changes applied to the model
    ModelChanges(usize),
}

impl fmt::Display for Executed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executed::Statements(n) => write!(f, "{} statement(s)", n),
            Executed::ModelChanges(n) => write!(f, "{} model change(s)", n),
        }
    }
}

/// An immutable schema change for one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergerToken {
    direction: MergeDirection,
    entity: DbEntity,
    kind: TokenKind,
}

impl MergerToken {
    pub fn new(direction: MergeDirection, entity: DbEntity, kind: TokenKind) -> Self {
        Self {
            direction,
            entity,
            kind,
        }
    }

    pub fn direction(&self) -> MergeDirection {
        self.direction
    }

    pub fn entity(&self) -> &DbEntity {
        &self.entity
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn token_name(&self) -> &'static str {
        match self.kind {
            TokenKind::CreateTable => "Create Table",
            TokenKind::DropTable => "Drop Table",
            TokenKind::AddColumn { .. } => "Add Column",
            TokenKind::DropColumn { .. } => "Drop Column",
            TokenKind::SetAllowNull { .. } => "Set Allow Null",
            TokenKind::SetNotNull { .. } => "Set Not Null",
            TokenKind::SetColumnType { .. } => "Set Column Type",
            TokenKind::SetPrimaryKey { .. } => "Set Primary Key",
            TokenKind::SetGeneratedFlag { .. } => "Set Generated Flag",
            TokenKind::AddRelationship { .. } => "Add Relationship",
            TokenKind::DropRelationship { .. } => "Drop Relationship",
            TokenKind::SetValueForNull { .. } => "Set value for null",
        }
    }

    pub fn token_value(&self) -> String {
        match &self.kind {
            TokenKind::CreateTable | TokenKind::DropTable | TokenKind::SetPrimaryKey { .. } => {
                self.entity.name.clone()
            }
            TokenKind::AddRelationship { relationship, .. }
            | TokenKind::DropRelationship { relationship, .. } => relationship.label(),
            _ => match self.column() {
                Some(column) => format!("{}.{}", self.entity.name, column.name),
                None => self.entity.name.clone(),
            },
        }
    }

    /// The column a column-level token works on
    pub fn column(&self) -> Option<&DbAttribute> {
        match &self.kind {
            TokenKind::AddColumn { column }
            | TokenKind::DropColumn { column }
            | TokenKind::SetAllowNull { column }
            | TokenKind::SetNotNull { column }
            | TokenKind::SetGeneratedFlag { column, .. }
            | TokenKind::SetValueForNull { column, .. } => Some(column),
            TokenKind::SetColumnType { to, .. } => Some(to),
            _ => None,
        }
    }

    /// The relationship a relationship token works on
    pub fn relationship(&self) -> Option<&DbRelationship> {
        match &self.kind {
            TokenKind::AddRelationship { relationship, .. }
            | TokenKind::DropRelationship { relationship, .. } => Some(relationship),
            _ => None,
        }
    }

    /// Ordering class: lower weights run first.
    ///
    /// Constraints are dropped before the columns and tables they use, and
    /// created after them.
    pub fn sort_weight(&self) -> u32 {
        match self.kind {
            TokenKind::DropRelationship { .. } => 10,
            TokenKind::DropColumn { .. } => 20,
            TokenKind::DropTable => 30,
            TokenKind::CreateTable => 40,
            TokenKind::AddColumn { .. } => 50,
            TokenKind::SetValueForNull { .. } => 60,
            TokenKind::SetAllowNull { .. }
            | TokenKind::SetNotNull { .. }
            | TokenKind::SetColumnType { .. } => 70,
            TokenKind::SetPrimaryKey { .. } => 80,
            TokenKind::SetGeneratedFlag { .. } => 90,
            TokenKind::AddRelationship { .. } => 100,
        }
    }

    /// Token that undoes this one from the other side
    pub fn create_reverse(&self, factory: &dyn MergerTokenFactory) -> MergerToken {
        let direction = self.direction.reverse();
        let entity = self.entity.clone();
        match &self.kind {
            TokenKind::CreateTable => factory.create_drop_table(direction, entity),
            TokenKind::DropTable => factory.create_create_table(direction, entity),
            TokenKind::AddColumn { column } => {
                factory.create_drop_column(direction, entity, column.clone())
            }
            TokenKind::DropColumn { column } => {
                factory.create_add_column(direction, entity, column.clone())
            }
            TokenKind::SetAllowNull { column } => {
                factory.create_set_not_null(direction, entity, column.clone())
            }
            TokenKind::SetNotNull { column } => {
                factory.create_set_allow_null(direction, entity, column.clone())
            }
            TokenKind::SetColumnType { from, to } => {
                factory.create_set_column_type(direction, entity, to.clone(), from.clone())
            }
            TokenKind::SetPrimaryKey { old, new, pk_name } => factory.create_set_primary_key(
                direction,
                entity,
                new.clone(),
                old.clone(),
                pk_name.clone(),
            ),
            TokenKind::SetGeneratedFlag { column, flag } => {
                factory.create_set_generated_flag(direction, entity, column.clone(), !flag)
            }
            TokenKind::AddRelationship {
                relationship,
                target,
            } => factory.create_drop_relationship(
                direction,
                entity,
                relationship.clone(),
                target.clone(),
            ),
            TokenKind::DropRelationship {
                relationship,
                target,
            } => factory.create_add_relationship(
                direction,
                entity,
                relationship.clone(),
                target.clone(),
            ),
            TokenKind::SetValueForNull { column, value } => {
                factory.create_set_value_for_null(direction, entity, column.clone(), value.clone())
            }
        }
    }

    /// DDL for a database-ward token; model-ward tokens render nothing
    pub fn create_sql(&self, factory: &dyn MergerTokenFactory) -> Result<Vec<String>, TokenError> {
        match self.direction {
            MergeDirection::ToDb => factory.render(self),
            MergeDirection::ToModel => Ok(Vec::new()),
        }
    }

    /// Applies the token through `context`.
    ///
    /// SQL and metadata failures are recorded in the context's validation
    /// result. Only a missing dialect capability is returned as an error.
    pub fn execute(&self, context: &mut MergerContext<'_>) -> Result<Executed, UnsupportedFeature> {
        match self.direction {
            MergeDirection::ToDb => {
                let statements = match self.create_sql(context.factory()) {
                    Ok(statements) => statements,
                    Err(TokenError::Unsupported(unsupported)) => return Err(unsupported),
                    Err(e) => {
                        context.record_failure(self, None, e.to_string());
                        return Ok(Executed::Statements(0));
                    }
                };
                for sql in &statements {
                    context.execute_sql(self, sql);
                }
                Ok(Executed::Statements(statements.len()))
            }
            MergeDirection::ToModel => match self.apply_to_model(context) {
                Ok(changes) => Ok(Executed::ModelChanges(changes)),
                Err(e) => {
                    context.record_failure(self, None, e.to_string());
                    Ok(Executed::ModelChanges(0))
                }
            },
        }
    }

    fn missing_entity(&self) -> TokenError {
        TokenError::InvalidMetadata {
            entity: self.entity.name.clone(),
            message: "entity is not in the model".to_string(),
        }
    }

    fn missing_column(&self, column: &str) -> TokenError {
        TokenError::InvalidMetadata {
            entity: self.entity.name.clone(),
            message: format!("column '{}' is not in the model", column),
        }
    }

    /// Mutates the context's model, logging each change. Returns the number
    /// of changes made.
    fn apply_to_model(&self, context: &mut MergerContext<'_>) -> Result<usize, TokenError> {
        let entity_node = NodeId::new(&self.entity.name);
        let column_node = |name: &str| NodeId::new(format!("{}.{}", self.entity.name, name));
        let mut changes = Vec::new();

        match &self.kind {
            TokenKind::CreateTable => {
                changes.push(GraphDiff::NodeCreate {
                    node: entity_node.clone(),
                });
                for attribute in &self.entity.attributes {
                    changes.push(GraphDiff::NodeCreate {
                        node: column_node(&attribute.name),
                    });
                    changes.push(GraphDiff::ArcCreate {
                        node: entity_node.clone(),
                        target: Some(column_node(&attribute.name)),
                        arc: ArcId::new(ATTRIBUTES_ARC),
                    });
                }
                context.data_map_mut().add_entity(self.entity.clone());
            }
            TokenKind::DropTable => {
                let map = context.data_map_mut();
                for other in map.entities() {
                    for relationship in &other.relationships {
                        if relationship.target_entity == self.entity.name && other.name != self.entity.name {
                            changes.push(GraphDiff::ArcDelete {
                                node: NodeId::new(&other.name),
                                target: Some(entity_node.clone()),
                                arc: ArcId::new(&relationship.name),
                            });
                        }
                    }
                }
                map.remove_entity(&self.entity.name, true)
                    .ok_or_else(|| self.missing_entity())?;
                changes.push(GraphDiff::NodeDelete { node: entity_node });
            }
            TokenKind::AddColumn { column } => {
                let entity = context
                    .data_map_mut()
                    .entity_mut(&self.entity.name)
                    .ok_or_else(|| self.missing_entity())?;
                entity.add_attribute(column.clone());
                changes.push(GraphDiff::NodeCreate {
                    node: column_node(&column.name),
                });
                changes.push(GraphDiff::ArcCreate {
                    node: entity_node,
                    target: Some(column_node(&column.name)),
                    arc: ArcId::new(ATTRIBUTES_ARC),
                });
            }
            TokenKind::DropColumn { column } => {
                let entity = context
                    .data_map_mut()
                    .entity_mut(&self.entity.name)
                    .ok_or_else(|| self.missing_entity())?;
                entity
                    .remove_attribute(&column.name)
                    .ok_or_else(|| self.missing_column(&column.name))?;

                let dependent: Vec<String> = entity
                    .relationships
                    .iter()
                    .filter(|r| r.joins.iter().any(|j| j.source == column.name))
                    .map(|r| r.name.clone())
                    .collect();
                for name in dependent {
                    if let Some(relationship) = entity.remove_relationship(&name) {
                        changes.push(GraphDiff::ArcDelete {
                            node: entity_node.clone(),
                            target: Some(NodeId::new(&relationship.target_entity)),
                            arc: ArcId::new(&relationship.name),
                        });
                    }
                }
                changes.push(GraphDiff::ArcDelete {
                    node: entity_node,
                    target: Some(column_node(&column.name)),
                    arc: ArcId::new(ATTRIBUTES_ARC),
                });
                changes.push(GraphDiff::NodeDelete {
                    node: column_node(&column.name),
                });
            }
            TokenKind::SetAllowNull { column } | TokenKind::SetNotNull { column } => {
                let mandatory = matches!(self.kind, TokenKind::SetNotNull { .. });
                let attribute = self.model_attribute(context, &column.name)?;
                if attribute.mandatory != mandatory {
                    changes.push(GraphDiff::PropertyChange {
                        node: column_node(&column.name),
                        property: "mandatory".to_string(),
                        old: attribute.mandatory.into(),
                        new: mandatory.into(),
                    });
                    attribute.mandatory = mandatory;
                }
            }
            TokenKind::SetColumnType { to, .. } => {
                let attribute = self.model_attribute(context, &to.name)?;
                let node = column_node(&to.name);
                if attribute.sql_type != to.sql_type {
                    changes.push(GraphDiff::PropertyChange {
                        node: node.clone(),
                        property: "type".to_string(),
                        old: attribute.sql_type.name().into(),
                        new: to.sql_type.name().into(),
                    });
                }
                if attribute.max_length != to.max_length {
                    changes.push(GraphDiff::PropertyChange {
                        node: node.clone(),
                        property: "length".to_string(),
                        old: attribute.max_length.map(i64::from).into(),
                        new: to.max_length.map(i64::from).into(),
                    });
                }
                if attribute.scale != to.scale {
                    changes.push(GraphDiff::PropertyChange {
                        node,
                        property: "scale".to_string(),
                        old: attribute.scale.map(i64::from).into(),
                        new: to.scale.map(i64::from).into(),
                    });
                }
                attribute.sql_type = to.sql_type;
                attribute.max_length = to.max_length;
                attribute.scale = to.scale;
            }
            TokenKind::SetPrimaryKey { new, .. } => {
                let entity = context
                    .data_map_mut()
                    .entity_mut(&self.entity.name)
                    .ok_or_else(|| self.missing_entity())?;
                if let Some(missing) = new
                    .iter()
                    .find(|name| entity.find_attribute(name, false).is_none())
                {
                    return Err(self.missing_column(missing));
                }
                for attribute in &mut entity.attributes {
                    let in_key = new.iter().any(|n| n.eq_ignore_ascii_case(&attribute.name));
                    if attribute.primary_key != in_key {
                        changes.push(GraphDiff::PropertyChange {
                            node: column_node(&attribute.name),
                            property: "primaryKey".to_string(),
                            old: attribute.primary_key.into(),
                            new: in_key.into(),
                        });
                        attribute.primary_key = in_key;
                    }
                }
            }
            TokenKind::SetGeneratedFlag { column, flag } => {
                let attribute = self.model_attribute(context, &column.name)?;
                if attribute.generated != *flag {
                    changes.push(GraphDiff::PropertyChange {
                        node: column_node(&column.name),
                        property: "generated".to_string(),
                        old: attribute.generated.into(),
                        new: (*flag).into(),
                    });
                    attribute.generated = *flag;
                }
            }
            TokenKind::AddRelationship { relationship, .. } => {
                let entity = context
                    .data_map_mut()
                    .entity_mut(&self.entity.name)
                    .ok_or_else(|| self.missing_entity())?;
                entity.add_relationship(relationship.clone());
                changes.push(GraphDiff::ArcCreate {
                    node: entity_node,
                    target: Some(NodeId::new(&relationship.target_entity)),
                    arc: ArcId::new(&relationship.name),
                });
            }
            TokenKind::DropRelationship { relationship, .. } => {
                let entity = context
                    .data_map_mut()
                    .entity_mut(&self.entity.name)
                    .ok_or_else(|| self.missing_entity())?;
                let existing = entity
                    .relationships
                    .iter()
                    .find(|r| r.name == relationship.name || r.same_joins_as(relationship))
                    .map(|r| r.name.clone());
                if let Some(name) = existing {
                    entity.remove_relationship(&name);
                    changes.push(GraphDiff::ArcDelete {
                        node: entity_node,
                        target: Some(NodeId::new(&relationship.target_entity)),
                        arc: ArcId::new(&name),
                    });
                }
            }
            // Nothing to change on the model side
            TokenKind::SetValueForNull { .. } => {}
        }

        let count = changes.len();
        for change in changes {
            context.record_change(change);
        }
        Ok(count)
    }

    fn model_attribute<'c>(
        &self,
        context: &'c mut MergerContext<'_>,
        column: &str,
    ) -> Result<&'c mut DbAttribute, TokenError> {
        let entity = context
            .data_map_mut()
            .entity_mut(&self.entity.name)
            .ok_or_else(|| self.missing_entity())?;
        entity
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(column))
            .ok_or_else(|| self.missing_column(column))
    }
}

impl fmt::Display for MergerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.token_name(),
            self.token_value(),
            self.direction
        )
    }
}
