//! Property tests for diff compression

use proptest::prelude::*;
use rstest::*;

use rust_dbmerge::diff::{ArcId, CompoundDiff, GraphDiff, GraphDiffCompressor, NodeId, Value};

const NODES: [&str; 4] = ["a", "b", "c", "d"];

fn node(i: usize) -> NodeId {
    NodeId::new(NODES[i % NODES.len()])
}

fn any_diff() -> impl Strategy<Value = GraphDiff> {
    prop_oneof![
        (0..4usize).prop_map(|n| GraphDiff::NodeCreate { node: node(n) }),
        (0..4usize).prop_map(|n| GraphDiff::NodeDelete { node: node(n) }),
        (0..4usize, 0..3i64, 0..3i64).prop_map(|(n, old, new)| GraphDiff::PropertyChange {
            node: node(n),
            property: "length".to_string(),
            old: Value::Int(old),
            new: Value::Int(new),
        }),
        any_arc(),
    ]
}

/// Arc changes between distinct nodes, the only ones that can cancel
fn any_arc() -> impl Strategy<Value = GraphDiff> {
    (0..4usize, 1..4usize, any::<bool>()).prop_map(|(from, offset, create)| {
        let source = node(from);
        let target = Some(node(from + offset));
        let arc = ArcId::new("toTarget");
        if create {
            GraphDiff::ArcCreate { node: source, target, arc }
        } else {
            GraphDiff::ArcDelete { node: source, target, arc }
        }
    })
}

fn compress(diffs: Vec<GraphDiff>) -> Vec<GraphDiff> {
    GraphDiffCompressor::new()
        .compress(&CompoundDiff::from(diffs))
        .into_iter()
        .collect()
}

fn structural(diffs: &[GraphDiff]) -> Vec<GraphDiff> {
    diffs
        .iter()
        .filter(|d| !d.is_property_change())
        .cloned()
        .collect()
}

fn is_subsequence(short: &[GraphDiff], long: &[GraphDiff]) -> bool {
    let mut rest = long.iter();
    short.iter().all(|item| rest.any(|candidate| candidate == item))
}

#[rstest]
#[case(vec![], vec![])]
#[case(
    vec![GraphDiff::NodeCreate { node: "t".into() }, GraphDiff::NodeDelete { node: "t".into() }],
    vec![]
)]
#[case(
    vec![GraphDiff::NodeDelete { node: "t".into() }],
    vec![GraphDiff::NodeDelete { node: "t".into() }]
)]
fn test_lifecycle_cases(#[case] input: Vec<GraphDiff>, #[case] expected: Vec<GraphDiff>) {
    assert_eq!(compress(input), expected);
}

proptest! {
    #[rstest]
    fn prop_compression_only_removes(diffs in prop::collection::vec(any_diff(), 0..40)) {
        let compressed = compress(diffs.clone());
        prop_assert!(compressed.len() <= diffs.len());
        prop_assert!(is_subsequence(&structural(&compressed), &structural(&diffs)));
    }

    #[rstest]
    fn prop_created_then_deleted_node_leaves_no_trace(
        middle in prop::collection::vec(any_diff(), 0..30)
    ) {
        let mut diffs = vec![GraphDiff::NodeCreate { node: "z".into() }];
        for (i, diff) in middle.into_iter().enumerate() {
            diffs.push(diff);
            diffs.push(GraphDiff::PropertyChange {
                node: "z".into(),
                property: "scale".to_string(),
                old: Value::Int(i as i64),
                new: Value::Int(i as i64 + 1),
            });
        }
        diffs.push(GraphDiff::NodeDelete { node: "z".into() });

        let compressed = compress(diffs);
        prop_assert!(compressed.iter().all(|d| d.node() != &NodeId::new("z")));
    }

    #[rstest]
    fn prop_arc_changes_undone_in_reverse_cancel_out(
        arcs in prop::collection::vec(any_arc(), 1..30)
    ) {
        let mut diffs = arcs.clone();
        diffs.extend(arcs.iter().rev().map(GraphDiff::inverse));
        prop_assert!(compress(diffs).is_empty());
    }

    #[rstest]
    fn prop_property_chain_coalesces(values in prop::collection::vec(0..100i64, 2..20)) {
        let diffs: Vec<GraphDiff> = values
            .windows(2)
            .map(|pair| GraphDiff::PropertyChange {
                node: "a".into(),
                property: "type".to_string(),
                old: Value::Int(pair[0]),
                new: Value::Int(pair[1]),
            })
            .collect();

        let first = values[0];
        let last = values[values.len() - 1];
        prop_assert_eq!(
            compress(diffs),
            vec![GraphDiff::PropertyChange {
                node: "a".into(),
                property: "type".to_string(),
                old: Value::Int(first),
                new: Value::Int(last),
            }]
        );
    }
}
