//! Graph traversal and ordering tests

use proptest::prelude::*;
use rstest::*;

use rust_dbmerge::graph::{
    topological_sort, DepthFirstSearch, DepthFirstStampSearch, GraphError, MapDigraph, Stamp,
};

fn chain() -> MapDigraph<&'static str> {
    let mut graph = MapDigraph::new();
    graph.add_arc("A", "B");
    graph.add_arc("B", "C");
    graph
}

#[test]
fn test_topological_sort_chain() {
    assert_eq!(topological_sort(&chain()).unwrap(), vec!["A", "B", "C"]);
}

#[test]
fn test_topological_sort_keeps_insertion_order_of_independent_vertices() {
    let mut graph = MapDigraph::new();
    for v in ["X", "Y", "Z"] {
        graph.add_vertex(v);
    }
    assert_eq!(topological_sort(&graph).unwrap(), vec!["X", "Y", "Z"]);
}

#[test]
fn test_topological_sort_reports_cycle() {
    let mut graph = chain();
    graph.add_arc("C", "B");
    match topological_sort(&graph) {
        Err(GraphError::Cycle { remaining }) => {
            assert!(remaining.contains(&"B"));
            assert!(remaining.contains(&"C"));
            assert!(!remaining.contains(&"A"));
        }
        other => panic!("Expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_reverse_flips_arcs() {
    let reversed = chain().reverse();
    assert!(reversed.has_arc(&"B", &"A"));
    assert!(reversed.has_arc(&"C", &"B"));
    assert_eq!(reversed.arc_count(), 2);
    assert_eq!(topological_sort(&reversed).unwrap(), vec!["C", "B", "A"]);
}

#[test]
fn test_depth_first_search_visits_reachable_once() {
    let mut graph = chain();
    graph.add_arc("A", "C");
    graph.add_vertex("D");
    let visited: Vec<_> = DepthFirstSearch::new(&graph, "A").collect();
    assert_eq!(visited.len(), 3);
    assert_eq!(visited[0], "A");
    assert!(!visited.contains(&"D"));
}

#[test]
fn test_depth_first_search_reset_keeps_seen_vertices() {
    let graph = chain();
    let mut search = DepthFirstSearch::new(&graph, "B");
    assert_eq!(search.by_ref().count(), 2);

    search.reset("A");
    let rest: Vec<_> = search.by_ref().collect();
    assert_eq!(rest, vec!["A"]);

    search.reset_all("A");
    assert_eq!(search.count(), 3);
}

#[test]
fn test_stamp_search_reports_depth() {
    let mut graph = MapDigraph::new();
    graph.add_arc("ROOT", "LEFT");
    graph.add_arc("ROOT", "RIGHT");
    graph.add_arc("LEFT", "LEAF");

    let mut search = DepthFirstStampSearch::new(&graph, "ROOT");
    let mut seen = Vec::new();
    while let Some((stamp, vertex)) = search.next() {
        if matches!(stamp, Stamp::GrowDepth | Stamp::GrowBreadth) {
            seen.push((vertex, search.depth()));
        }
    }
    assert_eq!(
        seen,
        vec![("ROOT", 1), ("LEFT", 2), ("LEAF", 3), ("RIGHT", 2)]
    );
}

#[rstest]
#[case(&[], 0)]
#[case(&[("A", "B")], 1)]
#[case(&[("A", "B"), ("A", "B")], 1)]
#[case(&[("A", "B"), ("B", "A"), ("C", "A")], 3)]
fn test_arc_count(#[case] arcs: &[(&'static str, &'static str)], #[case] expected: usize) {
    let mut graph = MapDigraph::new();
    for (from, to) in arcs {
        graph.add_arc(*from, *to);
    }
    assert_eq!(graph.arc_count(), expected);
}

proptest! {
    /// Arcs only go from lower to higher numbers, so the graph is acyclic
    #[rstest]
    fn prop_topological_order_respects_arcs(
        arcs in prop::collection::vec((0u8..20, 0u8..20), 0..60)
    ) {
        let mut graph = MapDigraph::new();
        for v in 0u8..20 {
            graph.add_vertex(v);
        }
        let arcs: Vec<(u8, u8)> = arcs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        for (from, to) in &arcs {
            graph.add_arc(*from, *to);
        }

        let order = topological_sort(&graph).unwrap();
        prop_assert_eq!(order.len(), 20);
        let position = |v: u8| order.iter().position(|x| *x == v).unwrap();
        for (from, to) in arcs {
            prop_assert!(position(from) < position(to));
        }
    }
}
