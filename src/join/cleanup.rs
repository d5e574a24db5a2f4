//! Post-join normalisation: duplicate triples, repeated predicates and
//! reachability pruning.

use std::collections::HashSet;

use crate::graph::{AmrGraph, Relation};
use crate::label::{LabelPattern, matches_any};

use super::merge::glue_nodes;

/// Drop repeated `(label, target)` pairs within each node, keeping the first.
pub fn remove_duplicate_triples(graph: &mut AmrGraph) {
    let ids: Vec<String> = graph.ids().map(str::to_string).collect();
    for id in ids {
        if let Some(rels) = graph.relations_mut(&id) {
            let mut seen: HashSet<Relation> = HashSet::with_capacity(rels.len());
            rels.retain(|r| seen.insert(r.clone()));
        }
    }
}

/// Glue the distinct objects of a repeated predicate under one
/// `entity` node, unless the predicate is listed in `not_joinable`.
///
/// `(w :mod x) (w :mod y)` becomes `(w :mod a) (a :op1 x :op2 y)`.
pub fn collapse_repeated_relations(
    graph: &mut AmrGraph,
    not_joinable: &[LabelPattern],
    entity: &str,
    relation: &str,
) {
    let ids: Vec<String> = graph.ids().map(str::to_string).collect();
    for id in ids {
        let mut repeated: Vec<(String, Vec<String>)> = Vec::new();
        for r in graph.relations(&id).unwrap_or_default() {
            match repeated.iter_mut().find(|(label, _)| *label == r.label) {
                Some((_, objects)) if !objects.contains(&r.target) => objects.push(r.target.clone()),
                Some(_) => {}
                None => repeated.push((r.label.clone(), vec![r.target.clone()])),
            }
        }

        for (label, objects) in repeated {
            if objects.len() < 2 || matches_any(&label, not_joinable) {
                continue;
            }
            let refs: Vec<&str> = objects.iter().map(String::as_str).collect();
            let glue = glue_nodes(graph, entity, relation, &refs);
            tracing::debug!(node = %id, label = %label, glue = %glue, "collapsed repeated relation");
            if let Some(rels) = graph.relations_mut(&id) {
                let mut placed = false;
                rels.retain_mut(|r| {
                    if r.label != label {
                        return true;
                    }
                    if placed {
                        return false;
                    }
                    r.target = glue.clone();
                    placed = true;
                    true
                });
            }
        }
    }
}

/// The part of `graph` reachable from `root`, with every relation that
/// points back at a node on the current path removed.
///
/// Nodes keep depth-first pre-order. Relations to already finished nodes
/// (re-entrancies) are kept. Idempotent.
pub fn prune(graph: &AmrGraph, root: &str) -> AmrGraph {
    let mut out = AmrGraph::new();
    if !graph.contains(root) {
        return out;
    }
    let mut on_path: HashSet<String> = HashSet::new();
    let mut finished: HashSet<String> = HashSet::new();
    // (node, index of the next relation to inspect)
    let mut stack: Vec<(String, usize)> = Vec::new();

    on_path.insert(root.to_string());
    finished.insert(root.to_string());
    out.insert(root, Vec::new());
    stack.push((root.to_string(), 0));

    while let Some((node, next)) = stack.last_mut() {
        let rels = graph.relations(node).unwrap_or_default();
        let Some(r) = rels.get(*next) else {
            on_path.remove(node.as_str());
            stack.pop();
            continue;
        };
        *next += 1;
        if on_path.contains(&r.target) {
            continue;
        }
        let node = node.clone();
        out.push_relation(&node, r.label.clone(), r.target.clone());
        if graph.contains(&r.target) && finished.insert(r.target.clone()) {
            on_path.insert(r.target.clone());
            out.insert(r.target.clone(), Vec::new());
            stack.push((r.target.clone(), 0));
        }
    }
    out
}
