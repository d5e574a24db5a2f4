//! Query primitives over an [`AmrGraph`]: root finding, adjacency lookup,
//! constrained depth-first triple search, subgraph extraction and path length.
//!
//! Every traversal here is guarded by a visited set, so cyclic graphs are safe.

use std::collections::{HashSet, VecDeque};

use crate::label::LabelPattern;

use super::AmrGraph;

/// The first node (in insertion order) with no incoming relation.
///
/// Returns `None` for an empty graph or one where every node is referenced.
pub fn root_id(graph: &AmrGraph) -> Option<&str> {
    let targets: HashSet<&str> = graph
        .relations_iter()
        .map(|(_, r)| r.target.as_str())
        .collect();
    graph.ids().find(|id| !targets.contains(id))
}

/// The `:instance` concept of `id`, or `""` for leaves.
pub fn instance_of<'g>(graph: &'g AmrGraph, id: &str) -> &'g str {
    graph.instance_of(id)
}

/// Direct children of `id`, optionally filtered by relation label.
pub fn children_of(
    graph: &AmrGraph,
    id: &str,
    relation: Option<&LabelPattern>,
    ignore_instance: bool,
) -> Vec<String> {
    graph
        .relations(id)
        .unwrap_or_default()
        .iter()
        .filter(|r| !(ignore_instance && r.is_instance()))
        .filter(|r| relation.is_none_or(|p| p.matches(&r.label)))
        .map(|r| r.target.clone())
        .collect()
}

/// Direct parents of `id`, optionally filtered by relation label.
///
/// A parent appears once per matching relation. This scans the whole graph.
pub fn parents_of(graph: &AmrGraph, id: &str, relation: Option<&LabelPattern>) -> Vec<String> {
    graph
        .relations_iter()
        .filter(|(_, r)| r.target == id)
        .filter(|(_, r)| relation.is_none_or(|p| p.matches(&r.label)))
        .map(|(subject, _)| subject.to_string())
        .collect()
}

/// Parameters of a triple search.
///
/// Unset patterns match anything. The subject pattern is matched against the
/// subject's instance, the predicate pattern against the relation label and the
/// object pattern against the target's instance (or the target itself for
/// literals).
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub subject: Option<LabelPattern>,
    pub predicate: Option<LabelPattern>,
    pub object: Option<LabelPattern>,
    /// Start node; defaults to the graph root.
    pub root: Option<String>,
    /// Keep descending below the first matches.
    pub full_search: bool,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, pattern: impl Into<LabelPattern>) -> Self {
        self.subject = Some(pattern.into());
        self
    }

    pub fn predicate(mut self, pattern: impl Into<LabelPattern>) -> Self {
        self.predicate = Some(pattern.into());
        self
    }

    pub fn object(mut self, pattern: impl Into<LabelPattern>) -> Self {
        self.object = Some(pattern.into());
        self
    }

    pub fn from_node(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn full(mut self) -> Self {
        self.full_search = true;
        self
    }
}

type Collector<'c> = &'c mut dyn FnMut(&str, &str, &str) -> Vec<String>;

struct TripleSearch<'g, 'c> {
    graph: &'g AmrGraph,
    query: &'g SearchQuery,
    collector: Option<Collector<'c>>,
    visited: HashSet<String>,
}

impl TripleSearch<'_, '_> {
    fn triple_matches(&self, label: &str, target: &str) -> bool {
        let predicate_ok = self.query.predicate.as_ref().is_none_or(|p| p.matches(label));
        let object_ok = self.query.object.as_ref().is_none_or(|p| {
            let instance = self.graph.instance_of(target);
            p.matches(if instance.is_empty() { target } else { instance })
        });
        predicate_ok && object_ok
    }

    fn visit(&mut self, node: &str) -> Vec<String> {
        let graph = self.graph;
        let Some(relations) = graph.relations(node) else {
            return Vec::new();
        };
        if !self.visited.insert(node.to_string()) {
            return Vec::new();
        }

        let mut found = Vec::new();
        let subject_ok = self
            .query
            .subject
            .as_ref()
            .is_none_or(|p| p.matches(graph.instance_of(node)));
        if subject_ok {
            for r in relations {
                if !self.triple_matches(&r.label, &r.target) {
                    continue;
                }
                match self.collector.as_mut() {
                    Some(collect) => found.extend(collect(node, &r.label, &r.target)),
                    None => {
                        found.push(node.to_string());
                        break;
                    }
                }
            }
        }

        if found.is_empty() {
            for r in relations {
                found.extend(self.visit(&r.target));
            }
        }

        if self.query.full_search {
            let mut frontier = found.clone();
            while !frontier.is_empty() {
                let children: Vec<String> = frontier
                    .iter()
                    .flat_map(|p| children_of(graph, p, None, false))
                    .collect();
                frontier.clear();
                for child in &children {
                    frontier.extend(self.visit(child));
                }
                found.extend(frontier.iter().cloned());
            }
        }
        found
    }
}

/// Depth-first search for the shallowest nodes whose outgoing triples match
/// `query`. Returns the matching subject ids.
pub fn search(graph: &AmrGraph, query: &SearchQuery) -> Vec<String> {
    run_search(graph, query, None)
}

/// Like [`search`], but each matching triple `(subject, label, target)` is
/// handed to `collector`, whose outputs are accumulated instead of the
/// subject id. A branch whose collector outputs are all empty counts as
/// unmatched and the search descends further.
pub fn search_with<F>(graph: &AmrGraph, query: &SearchQuery, mut collector: F) -> Vec<String>
where
    F: FnMut(&str, &str, &str) -> Vec<String>,
{
    run_search(graph, query, Some(&mut collector))
}

fn run_search(graph: &AmrGraph, query: &SearchQuery, collector: Option<Collector<'_>>) -> Vec<String> {
    let root = match query.root.as_deref().or_else(|| root_id(graph)) {
        Some(root) => root.to_string(),
        None => return Vec::new(),
    };
    let mut walk = TripleSearch {
        graph,
        query,
        collector,
        visited: HashSet::new(),
    };
    walk.visit(&root)
}

/// The subgraph reachable from `id`, without descending past `end`.
pub fn subgraph_at(graph: &AmrGraph, id: &str, end: Option<&str>) -> AmrGraph {
    let mut out = AmrGraph::new();
    let mut stack = vec![id.to_string()];
    // Pre-order: pop a node, copy it, push its children in reverse.
    while let Some(node) = stack.pop() {
        if out.contains(&node) {
            continue;
        }
        let Some(relations) = graph.relations(&node) else {
            continue;
        };
        out.insert(node.clone(), relations.to_vec());
        for r in relations.iter().rev() {
            if Some(r.target.as_str()) != end && !out.contains(&r.target) {
                stack.push(r.target.clone());
            }
        }
    }
    out
}

/// Shortest downward distance from `from` to `to`, ignoring `:instance`
/// edges; `0` when `to` is not a descendant.
pub fn descendant_distance(graph: &AmrGraph, from: &str, to: &str) -> usize {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((from, 0));
    while let Some((node, depth)) = queue.pop_front() {
        let Some(relations) = graph.relations(node) else {
            continue;
        };
        for r in relations.iter().filter(|r| !r.is_instance()) {
            if r.target == to {
                return depth + 1;
            }
            if seen.insert(r.target.as_str()) {
                queue.push_back((r.target.as_str(), depth + 1));
            }
        }
    }
    0
}

/// Path length from `from` to `to`, tolerant of reifications.
///
/// When `to` is not below `from` (typically because it hangs off a
/// reification under an ancestor), the first-parent chain of `from` is
/// climbed until some ancestor reaches `to`. Returns `0` when no directed
/// path exists.
pub fn path_length(graph: &AmrGraph, from: &str, to: &str) -> usize {
    let mut origin = from.to_string();
    let mut climbed: HashSet<String> = HashSet::from([origin.clone()]);
    loop {
        let distance = descendant_distance(graph, &origin, to);
        if distance > 0 {
            return distance;
        }
        match parents_of(graph, &origin, None).into_iter().next() {
            Some(parent) if climbed.insert(parent.clone()) => origin = parent,
            _ => return 0,
        }
    }
}
