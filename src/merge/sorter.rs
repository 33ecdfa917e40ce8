//! Execution ordering of merge tokens

use super::token::{MergerToken, TokenKind};
use crate::error::DbMergeError;
use crate::graph::{GraphError, IndegreeTopologicalSort, MapDigraph};

/// Orders tokens so that each one runs after the tokens it depends on.
///
/// Tokens are first stable-sorted by [`MergerToken::sort_weight`]. Explicit
/// dependencies between individual tokens are then added as arcs and the
/// result is sorted topologically, which keeps the weight order wherever the
/// dependencies allow it.
#[derive(Debug, Default)]
pub struct TokenSorter;

impl TokenSorter {
    pub fn new() -> Self {
        Self
    }

    pub fn sort(&self, mut tokens: Vec<MergerToken>) -> Result<Vec<MergerToken>, DbMergeError> {
        tokens.sort_by_key(MergerToken::sort_weight);

        let graph = dependency_graph(&tokens);
        tracing::debug!(
            tokens = tokens.len(),
            dependencies = graph.arc_count(),
            "Sorting merge tokens"
        );

        let mut order = Vec::with_capacity(tokens.len());
        for step in IndegreeTopologicalSort::new(&graph) {
            match step {
                Ok(index) => order.push(index),
                Err(GraphError::Cycle { remaining }) => {
                    let names: Vec<String> =
                        remaining.iter().map(|i| tokens[*i].to_string()).collect();
                    return Err(DbMergeError::DependencyCycle {
                        tokens: names.join(", "),
                    });
                }
            }
        }

        let mut slots: Vec<Option<MergerToken>> = tokens.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect())
    }
}

/// Arc `i -> j` when token `j` must run after token `i`
fn dependency_graph(tokens: &[MergerToken]) -> MapDigraph<usize> {
    let mut graph = MapDigraph::new();
    for index in 0..tokens.len() {
        graph.add_vertex(index);
    }
    for (j, later) in tokens.iter().enumerate() {
        for (i, earlier) in tokens.iter().enumerate() {
            if i != j && depends_on(later, earlier) {
                graph.add_arc(i, j);
            }
        }
    }
    graph
}

fn same(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn is_column(token: &MergerToken, entity: &str, column: &str) -> bool {
    same(&token.entity().name, entity) && token.column().is_some_and(|c| same(&c.name, column))
}

fn depends_on(later: &MergerToken, earlier: &MergerToken) -> bool {
    let entity = later.entity().name.as_str();
    match later.kind() {
        TokenKind::AddRelationship { relationship, .. } => match earlier.kind() {
            TokenKind::CreateTable => {
                same(&earlier.entity().name, entity)
                    || same(&earlier.entity().name, &relationship.target_entity)
            }
            TokenKind::AddColumn { column } => relationship.joins.iter().any(|join| {
                (same(&earlier.entity().name, entity) && same(&column.name, &join.source))
                    || (same(&earlier.entity().name, &relationship.target_entity)
                        && same(&column.name, &join.target))
            }),
            TokenKind::SetPrimaryKey { .. } => {
                same(&earlier.entity().name, &relationship.target_entity)
            }
            _ => false,
        },
        TokenKind::SetNotNull { column } => match earlier.kind() {
            TokenKind::SetValueForNull { .. } | TokenKind::AddColumn { .. } => {
                is_column(earlier, entity, &column.name)
            }
            _ => false,
        },
        TokenKind::SetPrimaryKey { .. } => match earlier.kind() {
            TokenKind::AddColumn { .. } | TokenKind::SetNotNull { .. } => {
                same(&earlier.entity().name, entity)
            }
            _ => false,
        },
        TokenKind::DropTable => match earlier.kind() {
            TokenKind::DropRelationship { relationship, .. } => {
                same(&earlier.entity().name, entity) || same(&relationship.target_entity, entity)
            }
            _ => false,
        },
        TokenKind::DropColumn { column } => match earlier.kind() {
            TokenKind::DropRelationship { relationship, .. } => {
                relationship.joins.iter().any(|join| {
                    (same(&earlier.entity().name, entity) && same(&join.source, &column.name))
                        || (same(&relationship.target_entity, entity)
                            && same(&join.target, &column.name))
                })
            }
            // the old key constraint must be gone before its columns
            TokenKind::SetPrimaryKey { old, .. } => {
                same(&earlier.entity().name, entity)
                    && old.iter().any(|name| same(name, &column.name))
            }
            _ => false,
        },
        _ => false,
    }
}
