//! Comparison of a model against a database schema

use std::collections::HashSet;

use super::factory::MergerTokenFactory;
use super::filters::FiltersConfig;
use super::sorter::TokenSorter;
use super::token::{MergeDirection, MergerToken};
use super::value_for_null::{EmptyValueForNull, ValueForNullProvider};
use crate::error::DbMergeError;
use crate::graph::{DepthFirstSearch, MapDigraph};
use crate::model::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};

/// Ordered tokens plus anything the user should know before running them
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    pub tokens: Vec<MergerToken>,
    pub warnings: Vec<String>,
}

impl MergePlan {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The same differences resolved in the other direction
    pub fn reverse(&self, factory: &dyn MergerTokenFactory) -> Result<MergePlan, DbMergeError> {
        let reversed = self
            .tokens
            .iter()
            .map(|token| token.create_reverse(factory))
            .collect();
        Ok(MergePlan {
            tokens: TokenSorter::new().sort(reversed)?,
            warnings: self.warnings.clone(),
        })
    }
}

/// Produces the tokens that bring a database in line with a model
pub struct DbMerger<'f> {
    factory: &'f dyn MergerTokenFactory,
    value_for_null: Box<dyn ValueForNullProvider + 'f>,
    skip_relationships_tokens: bool,
    skip_pk_tokens: bool,
    filters: FiltersConfig,
    case_sensitive: bool,
}

pub struct DbMergerBuilder<'f> {
    merger: DbMerger<'f>,
}

impl<'f> DbMergerBuilder<'f> {
    pub fn value_for_null(mut self, provider: impl ValueForNullProvider + 'f) -> Self {
        self.merger.value_for_null = Box::new(provider);
        self
    }

    pub fn skip_relationships_tokens(mut self, skip: bool) -> Self {
        self.merger.skip_relationships_tokens = skip;
        self
    }

    pub fn skip_pk_tokens(mut self, skip: bool) -> Self {
        self.merger.skip_pk_tokens = skip;
        self
    }

    pub fn filters(mut self, filters: FiltersConfig) -> Self {
        self.merger.filters = filters;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.merger.case_sensitive = case_sensitive;
        self
    }

    pub fn build(self) -> DbMerger<'f> {
        self.merger
    }
}

impl<'f> DbMerger<'f> {
    pub fn builder(factory: &'f dyn MergerTokenFactory) -> DbMergerBuilder<'f> {
        DbMergerBuilder {
            merger: DbMerger {
                factory,
                value_for_null: Box::new(EmptyValueForNull),
                skip_relationships_tokens: false,
                skip_pk_tokens: false,
                filters: FiltersConfig::everything(),
                case_sensitive: false,
            },
        }
    }

    /// Merger with default settings
    pub fn new(factory: &'f dyn MergerTokenFactory) -> Self {
        Self::builder(factory).build()
    }

    /// Tokens that make `db` match `model`, sorted for execution.
    ///
    /// The model is validated first; nothing is planned for malformed metadata.
    pub fn create_merge_tokens(
        &self,
        model: &DataMap,
        db: &DataMap,
    ) -> Result<MergePlan, DbMergeError> {
        let entities: Vec<&DbEntity> = model
            .entities()
            .iter()
            .filter(|e| self.filters.accepts(e))
            .collect();
        validate_model(model, &entities)?;

        let mut tokens = Vec::new();
        let mut matched: HashSet<&str> = HashSet::new();

        for entity in &entities {
            let Some(detected) = db.find_entity(&entity.name, self.case_sensitive) else {
                tracing::debug!(table = %entity.name, "Table missing in database");
                tokens.push(
                    self.factory
                        .create_create_table(MergeDirection::ToDb, (*entity).clone()),
                );
                if !self.skip_relationships_tokens {
                    for relationship in &entity.relationships {
                        if let Some(target) = self.fk_target(model, relationship) {
                            tokens.push(self.factory.create_add_relationship(
                                MergeDirection::ToDb,
                                (*entity).clone(),
                                relationship.clone(),
                                target.clone(),
                            ));
                        }
                    }
                }
                continue;
            };
            matched.insert(detected.name.as_str());

            self.check_relationships_to_drop(model, entity, detected, &mut tokens);
            if !self.skip_relationships_tokens {
                self.check_relationships_to_add(model, entity, detected, &mut tokens);
            }
            self.check_columns(entity, detected, &mut tokens);
            if !self.skip_pk_tokens {
                self.check_primary_key(entity, detected, &mut tokens);
            }
        }

        let mut warnings = Vec::new();
        let to_drop: Vec<&DbEntity> = db
            .entities()
            .iter()
            .filter(|e| !matched.contains(e.name.as_str()) && self.filters.accepts(e))
            .collect();
        if !to_drop.is_empty() {
            let references = reference_graph(db);
            for dropped in &to_drop {
                tokens.push(
                    self.factory
                        .create_drop_table(MergeDirection::ToDb, (*dropped).clone()),
                );
                for other in db.entities() {
                    if to_drop.iter().any(|d| d.name == other.name) {
                        continue;
                    }
                    for relationship in &other.relationships {
                        if relationship.target_entity.eq_ignore_ascii_case(&dropped.name) {
                            tokens.push(self.factory.create_drop_relationship(
                                MergeDirection::ToDb,
                                other.clone(),
                                relationship.clone(),
                                (*dropped).clone(),
                            ));
                        }
                    }
                }
                if let Some(warning) = drop_impact(&references, &dropped.name) {
                    warnings.push(warning);
                }
            }
        }

        let tokens = TokenSorter::new().sort(tokens)?;
        tracing::info!(tokens = tokens.len(), warnings = warnings.len(), "Merge plan created");
        Ok(MergePlan { tokens, warnings })
    }

    /// Target entity of a relationship that deserves an FK constraint
    fn fk_target<'m>(
        &self,
        model: &'m DataMap,
        relationship: &DbRelationship,
    ) -> Option<&'m DbEntity> {
        let worthy = !relationship.to_many
            && !relationship.to_dependent_pk
            && !relationship.joins.is_empty()
            && self.factory.adapter().capabilities.supports_fk_constraints
            && relationship.is_to_pk(model);
        if !worthy {
            return None;
        }
        model.find_entity(&relationship.target_entity, self.case_sensitive)
    }

    fn check_relationships_to_drop(
        &self,
        model: &DataMap,
        entity: &DbEntity,
        detected: &DbEntity,
        tokens: &mut Vec<MergerToken>,
    ) {
        for relationship in &detected.relationships {
            if entity
                .relationships
                .iter()
                .any(|r| r.same_joins_as(relationship))
            {
                continue;
            }
            let Some(target) = model.find_entity(&relationship.target_entity, false) else {
                continue;
            };

            // Align names with the model so the token can be reversed onto it
            let mut aligned = relationship.clone();
            aligned.source_entity = entity.name.clone();
            aligned.target_entity = target.name.clone();
            for join in &mut aligned.joins {
                if let Some(source) = entity.find_attribute(&join.source, false) {
                    join.source = source.name.clone();
                }
                if let Some(column) = target.find_attribute(&join.target, false) {
                    join.target = column.name.clone();
                }
            }

            let to_many = aligned.to_many;
            let token = self.factory.create_drop_relationship(
                MergeDirection::ToDb,
                entity.clone(),
                aligned,
                target.clone(),
            );
            // Only to-one relationships exist as FKs in the database
            tokens.push(if to_many {
                token.create_reverse(self.factory)
            } else {
                token
            });
        }
    }

    fn check_relationships_to_add(
        &self,
        model: &DataMap,
        entity: &DbEntity,
        detected: &DbEntity,
        tokens: &mut Vec<MergerToken>,
    ) {
        for relationship in &entity.relationships {
            if detected
                .relationships
                .iter()
                .any(|r| r.same_joins_as(relationship))
            {
                continue;
            }
            if let Some(target) = self.fk_target(model, relationship) {
                tokens.push(self.factory.create_add_relationship(
                    MergeDirection::ToDb,
                    entity.clone(),
                    relationship.clone(),
                    target.clone(),
                ));
            }
        }
    }

    fn check_columns(&self, entity: &DbEntity, detected: &DbEntity, tokens: &mut Vec<MergerToken>) {
        let factory = self.factory;
        let direction = MergeDirection::ToDb;

        for column in &detected.attributes {
            if entity
                .find_attribute(&column.name, self.case_sensitive)
                .is_none()
            {
                tokens.push(factory.create_drop_column(direction, entity.clone(), column.clone()));
            }
        }

        for column in &entity.attributes {
            let Some(existing) = detected.find_attribute(&column.name, self.case_sensitive) else {
                tokens.push(factory.create_add_column(direction, entity.clone(), column.clone()));
                if column.mandatory {
                    self.push_not_null(entity, column, tokens);
                }
                continue;
            };

            if column.mandatory != existing.mandatory {
                if column.mandatory {
                    self.push_not_null(entity, column, tokens);
                } else {
                    tokens.push(factory.create_set_allow_null(
                        direction,
                        entity.clone(),
                        column.clone(),
                    ));
                }
            }

            if !column.same_type_as(existing) {
                tokens.push(factory.create_set_column_type(
                    direction,
                    entity.clone(),
                    existing.clone(),
                    column.clone(),
                ));
            }

            if column.generated != existing.generated
                && factory.adapter().capabilities.supports_generated_keys
            {
                tokens.push(factory.create_set_generated_flag(
                    direction,
                    entity.clone(),
                    column.clone(),
                    column.generated,
                ));
            }
        }
    }

    fn push_not_null(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        tokens: &mut Vec<MergerToken>,
    ) {
        if let Some(value) = self.value_for_null.value_for(entity, column) {
            tokens.push(self.factory.create_set_value_for_null(
                MergeDirection::ToDb,
                entity.clone(),
                column.clone(),
                value,
            ));
        }
        tokens.push(
            self.factory
                .create_set_not_null(MergeDirection::ToDb, entity.clone(), column.clone()),
        );
    }

    fn check_primary_key(&self, entity: &DbEntity, detected: &DbEntity, tokens: &mut Vec<MergerToken>) {
        let upper = |names: Vec<String>| -> HashSet<String> {
            names.into_iter().map(|n| n.to_uppercase()).collect()
        };
        let old = detected.primary_key_names();
        let new = entity.primary_key_names();
        if upper(old.clone()) == upper(new.clone()) {
            return;
        }
        tokens.push(self.factory.create_set_primary_key(
            MergeDirection::ToDb,
            entity.clone(),
            old,
            new,
            detected.primary_key_name.clone(),
        ));
    }
}

/// Rejects metadata that cannot be turned into DDL
fn validate_model(model: &DataMap, entities: &[&DbEntity]) -> Result<(), DbMergeError> {
    for entity in entities {
        if let Some(column) = entity
            .attributes
            .iter()
            .find(|a| a.sql_type == SqlType::Other)
        {
            return Err(DbMergeError::InvalidMetadata {
                entity: entity.name.clone(),
                message: format!("column '{}' has an undefined type", column.name),
            });
        }
        for relationship in &entity.relationships {
            let target = model.find_entity(&relationship.target_entity, false);
            for join in &relationship.joins {
                if entity.find_attribute(&join.source, false).is_none() {
                    return Err(DbMergeError::InvalidMetadata {
                        entity: entity.name.clone(),
                        message: format!(
                            "relationship '{}' joins unknown column '{}'",
                            relationship.name, join.source
                        ),
                    });
                }
                if let Some(target) = target {
                    if target.find_attribute(&join.target, false).is_none() {
                        return Err(DbMergeError::InvalidMetadata {
                            entity: entity.name.clone(),
                            message: format!(
                                "relationship '{}' joins unknown column '{}.{}'",
                                relationship.name, target.name, join.target
                            ),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Digraph with an arc `referenced -> referencing` for every FK relationship
pub fn reference_graph(map: &DataMap) -> MapDigraph<String> {
    let mut graph = MapDigraph::new();
    for entity in map.entities() {
        graph.add_vertex(entity.name.clone());
    }
    for entity in map.entities() {
        for relationship in entity.relationships.iter().filter(|r| !r.to_many) {
            let Some(target) = map.find_entity(&relationship.target_entity, false) else {
                continue;
            };
            if target.name != entity.name {
                graph.add_arc(target.name.clone(), entity.name.clone());
            }
        }
    }
    graph
}

/// Warning naming every table that references `dropped`, directly or not
fn drop_impact(references: &MapDigraph<String>, dropped: &str) -> Option<String> {
    let affected: Vec<String> = DepthFirstSearch::new(references, dropped.to_string())
        .skip(1)
        .collect();
    if affected.is_empty() {
        return None;
    }
    let warning = format!(
        "Dropping table {} affects tables referencing it: {}",
        dropped,
        affected.join(", ")
    );
    tracing::warn!("{}", warning);
    Some(warning)
}
