//! Property tests for the structural guarantees of the algebra.

use amr_algebra::graph::AmrGraph;
use amr_algebra::graph::topology;
use amr_algebra::join::cleanup::prune;
use amr_algebra::join::{JoinEngine, JoinRequest};
use proptest::prelude::*;

const CONCEPTS: &[&str] = &["want-01", "go-01", "boy", "girl", "and", "city", "name"];
const LABELS: &[&str] = &[":arg0", ":arg1", ":mod", ":op1", ":op2", ":location"];

fn concept() -> impl Strategy<Value = String> {
    prop::sample::select(CONCEPTS).prop_map(str::to_string)
}

fn label() -> impl Strategy<Value = String> {
    prop::sample::select(LABELS).prop_map(str::to_string)
}

/// Arbitrary graph over `n0..n5`, cycles and dangling leaves included.
fn any_graph() -> impl Strategy<Value = AmrGraph> {
    prop::collection::vec((0usize..6, label(), 0usize..8), 0..20).prop_flat_map(|edges| {
        prop::collection::vec(concept(), 6).prop_map(move |concepts| {
            let mut triples: Vec<(String, String, String)> = concepts
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("n{i}"), ":instance".to_string(), c.clone()))
                .collect();
            // Targets n6 and n7 are never subjects, so they stay leaves.
            triples.extend(edges.iter().map(|(s, l, o)| (format!("n{s}"), l.clone(), format!("n{o}"))));
            AmrGraph::from_triples(triples)
        })
    })
}

/// Tree rooted at `n0`: node `i` hangs off a node with a smaller index.
fn tree() -> impl Strategy<Value = AmrGraph> {
    (1usize..6).prop_flat_map(|n| {
        (
            prop::collection::vec(concept(), n),
            prop::collection::vec((any::<prop::sample::Index>(), label()), n - 1),
        )
            .prop_map(|(concepts, links)| {
                let mut triples: Vec<(String, String, String)> = concepts
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (format!("n{i}"), ":instance".to_string(), c.clone()))
                    .collect();
                for (child, (parent, l)) in links.iter().enumerate() {
                    let child = child + 1;
                    triples.push((format!("n{}", parent.index(child)), l.clone(), format!("n{child}")));
                }
                AmrGraph::from_triples(triples)
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn pruning_is_idempotent(graph in any_graph()) {
        let once = prune(&graph, "n0");
        prop_assert_eq!(prune(&once, "n0"), once.clone());
        prop_assert!(!topology::has_cycle(&once));
    }

    #[test]
    fn triples_round_trip(graph in any_graph()) {
        prop_assert_eq!(AmrGraph::from_triples(graph.to_triples()), graph);
    }

    #[test]
    fn appended_trees_are_well_formed(destination in tree(), piece in tree(), rel in label()) {
        let out = JoinEngine::default()
            .join(&destination, &JoinRequest::append(piece, rel), None)
            .unwrap();
        let report = topology::report(&out.graph);
        prop_assert!(report.is_well_formed(), "{:?}", report);
        prop_assert!(out.graph.contains("n0"));
    }

    #[test]
    fn merged_trees_are_well_formed(destination in tree(), piece in tree()) {
        let out = JoinEngine::default()
            .join(&destination, &JoinRequest::merge(piece), None)
            .unwrap();
        let report = topology::report(&out.graph);
        prop_assert!(report.is_well_formed(), "{:?}", report);
    }
}
