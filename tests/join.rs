//! End-to-end tests for graph composition.
//!
//! These drive [`JoinEngine`] through append, replace and merge on small
//! sentence graphs and check the structural promises of every result: a
//! single root, no cycles, and an id map that tracks where the piece went.

use std::collections::BTreeMap;

use amr_algebra::graph::topology;
use amr_algebra::graph::{AmrGraph, Relation};
use amr_algebra::join::{IdRange, JoinEngine, JoinRequest};
use amr_algebra::AlgebraConfig;
use amr_algebra::error::JoinError;

fn want_person() -> AmrGraph {
    AmrGraph::from_triples([
        ("a", ":instance", "want-01"),
        ("a", ":arg0", "p"),
        ("p", ":instance", "person"),
    ])
}

/// The boy wants to go.
fn want_boy() -> AmrGraph {
    AmrGraph::from_triples([
        ("w", ":instance", "want-01"),
        ("w", ":arg0", "b"),
        ("w", ":arg1", "g"),
        ("b", ":instance", "boy"),
        ("g", ":instance", "go-01"),
        ("g", ":arg0", "b"),
    ])
}

fn assert_well_formed(graph: &AmrGraph) {
    let report = topology::report(graph);
    assert!(report.is_well_formed(), "not well formed: {report:?}\n{graph}");
}

#[test]
fn append_go_under_want() {
    let piece = AmrGraph::from_triples([("x", ":instance", "go-01")]);
    let out = JoinEngine::default()
        .join(&want_person(), &JoinRequest::append(piece, ":arg1"), Some(IdRange::single("a")))
        .unwrap();

    assert_eq!(out.graph.len(), 3);
    assert_eq!(out.graph.ids().next(), Some("a"));
    assert!(out.graph.relations("a").unwrap().contains(&Relation::new(":arg1", "x")));
    assert!(out.id_map.is_empty());
    assert_well_formed(&out.graph);
}

#[test]
fn append_preserves_both_sides() {
    let piece = AmrGraph::from_triples([
        ("a", ":instance", "go-01"),
        ("a", ":arg0", "p"),
        ("p", ":instance", "car"),
    ]);
    let destination = want_person();
    let total = destination.relation_count() + piece.relation_count() + 1;

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::append(piece, ":rel"), None)
        .unwrap();

    assert_eq!(out.id_map.get("a").map(String::as_str), Some("a1"));
    assert_eq!(out.id_map.get("p").map(String::as_str), Some("p1"));
    assert!(out.graph.relations("a").unwrap().contains(&Relation::new(":rel", "a1")));
    assert_eq!(out.graph.relation_count(), total);
    assert_eq!(out.graph.instance_of("p1"), "car");
    assert_well_formed(&out.graph);
}

#[test]
fn replace_swaps_a_participant() {
    let piece = AmrGraph::from_triples([("x", ":instance", "girl")]);
    let out = JoinEngine::default()
        .join(&want_boy(), &JoinRequest::replace(piece), Some(IdRange::single("b")))
        .unwrap();

    assert!(!out.graph.contains("b"));
    assert_eq!(out.graph.ids().collect::<Vec<_>>(), vec!["w", "x", "g"]);
    assert!(out.graph.relations("w").unwrap().contains(&Relation::new(":arg0", "x")));
    assert!(out.graph.relations("g").unwrap().contains(&Relation::new(":arg0", "x")));
    assert_well_formed(&out.graph);
}

#[test]
fn replace_rewires_both_range_ends() {
    let piece = AmrGraph::from_triples([
        ("x", ":instance", "run-02"),
        ("x", ":arg0", "y"),
        ("y", ":instance", "girl"),
    ]);
    let request = JoinRequest::replace(piece).with_piece_range(IdRange::new("x", "y"));
    let out = JoinEngine::default()
        .join(&want_boy(), &request, Some(IdRange::new("g", "b")))
        .unwrap();

    // g becomes x and b becomes y; g's :arg0 b is carried over and lands on y.
    assert!(!out.graph.contains("g"));
    assert!(!out.graph.contains("b"));
    let w = out.graph.relations("w").unwrap();
    assert!(w.contains(&Relation::new(":arg0", "y")));
    assert!(w.contains(&Relation::new(":arg1", "x")));
    assert_eq!(
        out.graph.relations("x").unwrap(),
        [Relation::new(":instance", "run-02"), Relation::new(":arg0", "y")]
    );
    assert_eq!(out.graph.ids().collect::<Vec<_>>(), ["w", "y", "x"]);
    assert!(out.id_map.is_empty());
    assert_well_formed(&out.graph);
}

#[test]
fn merge_identical_graphs_is_identity() {
    let out = JoinEngine::default()
        .join(&want_person(), &JoinRequest::merge(want_person()), None)
        .unwrap();
    assert_eq!(out.graph, want_person());
    assert!(out.id_map.is_empty());
}

#[test]
fn merge_same_concepts_unions_relations() {
    let destination = AmrGraph::from_triples([
        ("w", ":instance", "want-01"),
        ("w", ":arg0", "b"),
        ("b", ":instance", "boy"),
    ]);
    let piece = AmrGraph::from_triples([
        ("w", ":instance", "want-01"),
        ("w", ":arg0", "b"),
        ("w", ":arg1", "g"),
        ("b", ":instance", "boy"),
        ("b", ":mod", "t"),
        ("g", ":instance", "go-01"),
        ("t", ":instance", "tall"),
    ]);

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::merge(piece), None)
        .unwrap();

    let w = out.graph.relations("w").unwrap();
    assert_eq!(w.len(), 3);
    assert!(w.contains(&Relation::new(":arg0", "b")));
    assert!(w.contains(&Relation::new(":arg1", "g")));
    assert!(out.graph.relations("b").unwrap().contains(&Relation::new(":mod", "t")));
    assert_eq!(out.graph.len(), 4);
    assert_well_formed(&out.graph);
}

#[test]
fn merge_different_concepts_glues_them() {
    let destination = AmrGraph::from_triples([("b", ":instance", "boy")]);
    let piece = AmrGraph::from_triples([("g", ":instance", "girl")]);

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::merge(piece), None)
        .unwrap();

    assert_eq!(out.graph.ids().next(), Some("a"));
    assert_eq!(out.graph.instance_of("a"), "and");
    let glue = out.graph.relations("a").unwrap();
    assert!(glue.contains(&Relation::new(":op1", "b")));
    assert!(glue.contains(&Relation::new(":op2", "g")));
    assert_eq!(out.id_map.get("g").map(String::as_str), Some("a"));
    assert_well_formed(&out.graph);
}

#[test]
fn merge_lists_concatenates_items() {
    let destination = AmrGraph::from_triples([
        ("a", ":instance", "and"),
        ("a", ":op1", "b"),
        ("b", ":instance", "boy"),
    ]);
    let piece = AmrGraph::from_triples([
        ("a", ":instance", "and"),
        ("a", ":op1", "c"),
        ("c", ":instance", "cat"),
    ]);

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::merge(piece), None)
        .unwrap();

    let list = out.graph.relations("a").unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.contains(&Relation::new(":op1", "b")));
    assert!(list.contains(&Relation::new(":op2", "c")));
    assert!(!out.graph.contains("a1"));
}

#[test]
fn merge_single_item_lists_collapse_to_the_item() {
    let list = AmrGraph::from_triples([
        ("a", ":instance", "and"),
        ("a", ":op1", "b"),
        ("b", ":instance", "boy"),
    ]);

    let out = JoinEngine::default()
        .join(&list, &JoinRequest::merge(list.clone()), None)
        .unwrap();

    assert_eq!(out.graph, AmrGraph::from_triples([("b", ":instance", "boy")]));
    assert_eq!(out.id_map.get("a").map(String::as_str), Some("b"));
}

#[test]
fn merge_stops_at_the_range_end() {
    let request = JoinRequest::merge(want_boy()).with_piece_range(IdRange::new("w", "b"));
    let out = JoinEngine::default()
        .join(&want_boy(), &request, Some(IdRange::new("w", "b")))
        .unwrap();

    // w and g fuse with their copies; the end pair b / b1 is left apart and
    // both predicates that now repeat are glued under `and`.
    assert_eq!(out.graph.ids().collect::<Vec<_>>(), ["w", "a", "b", "b1", "g", "a1"]);
    assert!(out.graph.relations("w").unwrap().contains(&Relation::new(":arg0", "a")));
    assert!(out.graph.relations("g").unwrap().contains(&Relation::new(":arg0", "a1")));
    for glue in ["a", "a1"] {
        assert_eq!(out.graph.instance_of(glue), "and");
        let items = out.graph.relations(glue).unwrap();
        assert!(items.contains(&Relation::new(":op1", "b")));
        assert!(items.contains(&Relation::new(":op2", "b1")));
    }
    assert_eq!(out.graph.instance_of("b1"), "boy");
    assert_eq!(
        out.id_map,
        [("b".to_string(), "b1".to_string())].into_iter().collect::<BTreeMap<_, _>>()
    );
    assert_well_formed(&out.graph);
}

#[test]
fn custom_joinability_merges_synonyms() {
    let destination = AmrGraph::from_triples([("b", ":instance", "boy"), ("b", ":mod", "t"), ("t", ":instance", "tall")]);
    let piece = AmrGraph::from_triples([("l", ":instance", "lad"), ("l", ":poss", "d"), ("d", ":instance", "dog")]);
    let synonyms = |a: &str, b: &str, g: &AmrGraph| {
        let pair = [g.instance_of(a), g.instance_of(b)];
        pair.contains(&"boy") && pair.contains(&"lad")
    };

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::merge(piece).with_joinable(synonyms), None)
        .unwrap();

    assert_eq!(out.graph.instance_of("b"), "boy");
    assert!(out.graph.relations("b").unwrap().contains(&Relation::new(":poss", "d")));
    assert!(!out.graph.contains("l"));
    assert_eq!(out.id_map.get("l").map(String::as_str), Some("b"));
}

#[test]
fn return_relation_cycle_is_pruned() {
    let piece = AmrGraph::from_triples([("g", ":instance", "go-01")]);
    let request = JoinRequest::append(piece, ":arg1").with_return_relation(":arg0");
    let out = JoinEngine::default().join(&want_person(), &request, None).unwrap();

    assert_eq!(out.graph.relations("g").unwrap(), &[Relation::instance("go-01")]);
    assert_well_formed(&out.graph);
}

#[test]
fn repeated_predicates_are_glued_after_append() {
    let destination = AmrGraph::from_triples([
        ("w", ":instance", "want-01"),
        ("w", ":arg1", "g"),
        ("g", ":instance", "go-01"),
    ]);
    let piece = AmrGraph::from_triples([("s", ":instance", "stay-01")]);

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::append(piece, ":arg1"), None)
        .unwrap();

    let arg1: Vec<_> = out.graph.relations("w").unwrap().iter().filter(|r| r.label == ":arg1").collect();
    assert_eq!(arg1.len(), 1);
    let glue = arg1[0].target.as_str();
    assert_eq!(out.graph.instance_of(glue), "and");
    assert!(out.graph.relations(glue).unwrap().contains(&Relation::new(":op2", "s")));
    assert_well_formed(&out.graph);
}

#[test]
fn configured_join_entity_is_used() {
    let config = AlgebraConfig::from_toml_str("[join]\nentity = \"or\"\n").unwrap();
    let destination = AmrGraph::from_triples([("b", ":instance", "boy")]);
    let piece = AmrGraph::from_triples([("g", ":instance", "girl")]);

    let out = config
        .join_engine()
        .unwrap()
        .join(&destination, &config.configure(JoinRequest::merge(piece)), None)
        .unwrap();

    assert_eq!(out.graph.instance_of("o"), "or");
    assert_eq!(out.graph.relations("o").unwrap().len(), 3);
}

#[test]
fn unknown_piece_range_is_reported() {
    let piece = AmrGraph::from_triples([("x", ":instance", "go-01")]);
    let request = JoinRequest::append(piece, ":arg1").with_piece_range(IdRange::new("x", "missing"));
    let err = JoinEngine::default().join(&want_person(), &request, None).unwrap_err();
    assert!(matches!(err, JoinError::UnknownIdentifier { ref id, .. } if id == "missing"));
}

#[test]
fn inputs_are_untouched_and_json_round_trips() {
    let destination = want_boy();
    let snapshot = destination.clone();
    let piece = AmrGraph::from_json(r#"{"x": [[":instance", "city"]]}"#).unwrap();

    let out = JoinEngine::default()
        .join(&destination, &JoinRequest::append(piece, ":location").with_piece_range(IdRange::single("x")), None)
        .unwrap();

    assert_eq!(destination, snapshot);
    let json = out.graph.to_json().unwrap();
    assert_eq!(AmrGraph::from_json(&json).unwrap(), out.graph);
    let value = serde_json::to_value(&out).unwrap();
    assert!(value.get("map").is_some());
}
