//! Identifier reconciliation: renaming colliding node ids before two graphs
//! share one namespace.
//!
//! A colliding id has its trailing number incremented (`x` → `x1`, `a0` →
//! `a1`, `p9` → `p10`) until the candidate is free in the destination, in the
//! incoming graph, and among ids already handed out in the same pass.

use std::collections::{HashMap, HashSet};

use crate::graph::AmrGraph;

/// Old id → new id for every node of a reconciled graph, identity entries
/// included.
pub type IdMap = HashMap<String, String>;

/// Increment the trailing number of `id`, treating a missing number as `0`.
pub fn increment_id(id: &str) -> String {
    let stem = id.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &id[stem.len()..];
    if digits.is_empty() {
        return format!("{id}1");
    }
    match digits.parse::<u128>().ok().and_then(|n| n.checked_add(1)) {
        Some(n) => format!("{stem}{n}"),
        None => format!("{id}1"),
    }
}

/// Rename the nodes of `incoming` that collide with nodes of `destination`.
///
/// Rewrites both the node keys and every relation target pointing at a
/// renamed node, and returns the complete old → new map.
pub fn reconcile_ids(incoming: &mut AmrGraph, destination: &AmrGraph) -> IdMap {
    let ids: Vec<String> = incoming.ids().map(str::to_string).collect();
    let mut map = IdMap::with_capacity(ids.len());
    let mut assigned: HashSet<String> = HashSet::new();

    for id in ids {
        let mut candidate = id.clone();
        if destination.contains(&candidate) {
            while destination.contains(&candidate)
                || incoming.contains(&candidate)
                || assigned.contains(&candidate)
            {
                candidate = increment_id(&candidate);
            }
            tracing::trace!(from = %id, to = %candidate, "renamed colliding node id");
        }
        assigned.insert(candidate.clone());
        map.insert(id, candidate);
    }

    let renames: HashMap<String, String> = map
        .iter()
        .filter(|(old, new)| old != new)
        .map(|(old, new)| (old.clone(), new.clone()))
        .collect();
    if !renames.is_empty() {
        incoming.rewrite_targets(&renames);
        incoming.rename_nodes(&renames);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_rules() {
        assert_eq!(increment_id("x"), "x1");
        assert_eq!(increment_id("a0"), "a1");
        assert_eq!(increment_id("p9"), "p10");
        assert_eq!(increment_id("b007"), "b8");
    }

    #[test]
    fn renames_only_collisions() {
        let destination = AmrGraph::from_triples([("a", ":instance", "and"), ("a", ":op1", "b"), ("b", ":instance", "boy")]);
        let mut incoming = AmrGraph::from_triples([
            ("b", ":instance", "bee"),
            ("b", ":arg0", "c"),
            ("c", ":instance", "cat"),
        ]);
        let map = reconcile_ids(&mut incoming, &destination);
        assert_eq!(map["b"], "b1");
        assert_eq!(map["c"], "c");
        assert_eq!(incoming.ids().collect::<Vec<_>>(), vec!["b1", "c"]);
        assert_eq!(incoming.instance_of("b1"), "bee");
    }

    #[test]
    fn skips_ids_taken_by_incoming_and_earlier_renames() {
        let destination = AmrGraph::from_triples([("a", ":instance", "x"), ("a1", ":instance", "y")]);
        let mut incoming = AmrGraph::from_triples([
            ("a", ":instance", "p"),
            ("a", ":arg0", "a2"),
            ("a2", ":instance", "q"),
        ]);
        let map = reconcile_ids(&mut incoming, &destination);
        // a1 is taken in the destination, a2 in the incoming graph.
        assert_eq!(map["a"], "a3");
        assert_eq!(map["a2"], "a2");
        assert_eq!(incoming.relations("a3").unwrap()[1].target, "a2");
    }

    #[test]
    fn rewrites_internal_references() {
        let destination = AmrGraph::from_triples([("g", ":instance", "go-01")]);
        let mut incoming = AmrGraph::from_triples([
            ("w", ":instance", "want-01"),
            ("w", ":arg1", "g"),
            ("g", ":instance", "go-02"),
        ]);
        let map = reconcile_ids(&mut incoming, &destination);
        assert_eq!(map["g"], "g1");
        assert_eq!(incoming.relations("w").unwrap()[1].target, "g1");
    }
}
