//! AMR graph model: an ordered, string-keyed table of nodes.
//!
//! An [`AmrGraph`] maps each node id to an ordered list of [`Relation`]s. A
//! node absent from the table is a *leaf* (a literal or constant with no
//! outgoing relations). The reserved `:instance` relation attaches the node's
//! concept name and appears at most once per node.
//!
//! Node order is insertion order. It matters for root selection and for
//! identifier reconciliation, while relation order matters for numbered
//! relations (`:op1`, `:op2`, ...). Neither matters for equality.
//!
//! - [`query`]: root, adjacency and depth-first triple search
//! - [`triples`]: flat triple-list conversion
//! - [`build`]: instance and list-node constructors
//! - [`topology`]: petgraph-backed structural checks

pub mod build;
pub mod query;
pub mod topology;
pub mod triples;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GraphError, GraphResult};

pub use triples::Triple;

/// The reserved relation carrying a node's concept name.
pub const INSTANCE: &str = ":instance";

/// One outgoing relation: `(label, target)`.
///
/// The target is either another node id or a leaf literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Relation {
    /// Relation label, e.g. `:arg0`.
    pub label: String,
    /// Target node id or literal.
    pub target: String,
}

impl Relation {
    /// Create a relation.
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }

    /// An `:instance` relation.
    pub fn instance(concept: impl Into<String>) -> Self {
        Self::new(INSTANCE, concept)
    }

    /// Whether this is the `:instance` slot.
    pub fn is_instance(&self) -> bool {
        self.label == INSTANCE
    }
}

impl From<(String, String)> for Relation {
    fn from((label, target): (String, String)) -> Self {
        Self { label, target }
    }
}

impl From<Relation> for (String, String) {
    fn from(r: Relation) -> Self {
        (r.label, r.target)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.target)
    }
}

/// An AMR graph: ordered node table keyed by variable name.
#[derive(Debug, Clone, Default)]
pub struct AmrGraph {
    nodes: Vec<(String, Vec<Relation>)>,
    /// Node id → position in `nodes`.
    index: HashMap<String, usize>,
}

impl AmrGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-leaf nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is a (non-leaf) node of this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Whether `id` is a leaf: absent from the node table.
    pub fn is_leaf(&self, id: &str) -> bool {
        !self.contains(id)
    }

    /// Whether `id` is a node or the target of some relation.
    pub fn mentions(&self, id: &str) -> bool {
        self.contains(id) || self.relations_iter().any(|(_, r)| r.target == id)
    }

    /// The relations of `id`, or `None` for a leaf.
    pub fn relations(&self, id: &str) -> Option<&[Relation]> {
        self.index.get(id).map(|&i| self.nodes[i].1.as_slice())
    }

    /// Mutable access to the relations of `id`.
    pub fn relations_mut(&mut self, id: &str) -> Option<&mut Vec<Relation>> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.nodes[i].1),
            None => None,
        }
    }

    /// The relations of `id`, failing for leaves.
    pub fn try_relations(&self, id: &str) -> GraphResult<&[Relation]> {
        self.relations(id).ok_or_else(|| GraphError::UnknownNode { id: id.to_string() })
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(id, _)| id.as_str())
    }

    /// `(id, relations)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Relation])> {
        self.nodes.iter().map(|(id, rels)| (id.as_str(), rels.as_slice()))
    }

    /// Every `(subject, relation)` pair in node order.
    pub fn relations_iter(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.nodes
            .iter()
            .flat_map(|(id, rels)| rels.iter().map(move |r| (id.as_str(), r)))
    }

    /// Total number of relations (triples).
    pub fn relation_count(&self) -> usize {
        self.nodes.iter().map(|(_, rels)| rels.len()).sum()
    }

    /// Insert or replace a node. A replaced node keeps its position.
    pub fn insert(&mut self, id: impl Into<String>, relations: Vec<Relation>) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&i) => self.nodes[i].1 = relations,
            None => {
                self.index.insert(id.clone(), self.nodes.len());
                self.nodes.push((id, relations));
            }
        }
    }

    /// Remove a node, returning its relations. References to it are untouched.
    pub fn remove(&mut self, id: &str) -> Option<Vec<Relation>> {
        let pos = self.index.remove(id)?;
        let (_, relations) = self.nodes.remove(pos);
        for (i, (node_id, _)) in self.nodes.iter().enumerate().skip(pos) {
            self.index.insert(node_id.clone(), i);
        }
        Some(relations)
    }

    /// Append a relation to `id`, creating the node if it is a leaf.
    pub fn push_relation(&mut self, id: &str, label: impl Into<String>, target: impl Into<String>) {
        let relation = Relation::new(label, target);
        match self.relations_mut(id) {
            Some(rels) => rels.push(relation),
            None => self.insert(id, vec![relation]),
        }
    }

    /// The concept attached through `:instance`, or `""` for leaves and
    /// nodes without one.
    pub fn instance_of(&self, id: &str) -> &str {
        self.relations(id)
            .and_then(|rels| rels.iter().find(|r| r.is_instance()))
            .map(|r| r.target.as_str())
            .unwrap_or("")
    }

    /// Rewrite every relation target found in `renames`.
    pub fn rewrite_targets(&mut self, renames: &HashMap<String, String>) {
        for (_, rels) in &mut self.nodes {
            for r in rels.iter_mut() {
                if let Some(new) = renames.get(&r.target) {
                    r.target = new.clone();
                }
            }
        }
    }

    /// Re-key nodes found in `renames`, keeping their positions.
    pub fn rename_nodes(&mut self, renames: &HashMap<String, String>) {
        for (id, _) in &mut self.nodes {
            if let Some(new) = renames.get(id.as_str()) {
                *id = new.clone();
            }
        }
        self.reindex();
    }

    /// Point every reference to `old` at `new`, skipping relations owned by
    /// `new` itself and by `except`.
    pub fn redirect(&mut self, old: &str, new: &str, except: Option<&str>) {
        for (subject, rels) in &mut self.nodes {
            if subject == new || Some(subject.as_str()) == except {
                continue;
            }
            for r in rels.iter_mut() {
                if r.target == old {
                    r.target = new.to_string();
                }
            }
        }
    }

    /// Point the references to `old` owned by `subject` at `new`.
    pub fn redirect_in(&mut self, subject: &str, old: &str, new: &str) {
        if let Some(rels) = self.relations_mut(subject) {
            for r in rels.iter_mut() {
                if r.target == old {
                    r.target = new.to_string();
                }
            }
        }
    }

    /// Add every node of `other`, overwriting nodes with the same id.
    pub fn absorb(&mut self, other: AmrGraph) {
        for (id, rels) in other.nodes {
            self.insert(id, rels);
        }
    }

    /// Keep only the nodes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &[Relation]) -> bool) {
        self.nodes.retain(|(id, rels)| keep(id, rels));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();
    }

    /// Parse a graph from its JSON object form.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::Json {
            message: e.to_string(),
        })
    }

    /// Render the graph as a pretty-printed JSON object.
    pub fn to_json(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::Json {
            message: e.to_string(),
        })
    }
}

/// Clone each graph of a slice.
pub fn clone_all(graphs: &[AmrGraph]) -> Vec<AmrGraph> {
    graphs.to_vec()
}

impl PartialEq for AmrGraph {
    /// Structural equality: same node ids and, per node, the same relations
    /// as a set. Node order and relation order are ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(id, rels)| match other.relations(id) {
            Some(theirs) => {
                let a: HashSet<&Relation> = rels.iter().collect();
                let b: HashSet<&Relation> = theirs.iter().collect();
                a == b
            }
            None => false,
        })
    }
}

impl Eq for AmrGraph {}

impl FromIterator<(String, Vec<Relation>)> for AmrGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Relation>)>>(iter: I) -> Self {
        let mut graph = AmrGraph::new();
        for (id, rels) in iter {
            graph.insert(id, rels);
        }
        graph
    }
}

impl Serialize for AmrGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for (id, rels) in &self.nodes {
            map.serialize_entry(id, rels)?;
        }
        map.end()
    }
}

struct AmrGraphVisitor;

impl<'de> Visitor<'de> for AmrGraphVisitor {
    type Value = AmrGraph;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from node id to a list of [relation, target] pairs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AmrGraph, A::Error> {
        let mut graph = AmrGraph::new();
        while let Some((id, rels)) = access.next_entry::<String, Vec<Relation>>()? {
            graph.insert(id, rels);
        }
        Ok(graph)
    }
}

impl<'de> Deserialize<'de> for AmrGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AmrGraphVisitor)
    }
}

impl fmt::Display for AmrGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, rels) in &self.nodes {
            write!(f, "{id}:")?;
            for r in rels {
                write!(f, " ({r})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn want_graph() -> AmrGraph {
        AmrGraph::from_json(
            r#"{"w": [[":instance", "want-01"], [":arg0", "b"], [":arg1", "g"]],
                "b": [[":instance", "boy"]],
                "g": [[":instance", "go-01"], [":arg0", "b"]]}"#,
        )
        .unwrap()
    }

    #[test]
    fn json_preserves_node_order() {
        let g = want_graph();
        assert_eq!(g.ids().collect::<Vec<_>>(), vec!["w", "b", "g"]);
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.starts_with(r#"{"w":[[":instance","want-01"]"#));
        assert_eq!(AmrGraph::from_json(&json).unwrap(), g);
    }

    #[test]
    fn instance_and_leaves() {
        let g = want_graph();
        assert_eq!(g.instance_of("w"), "want-01");
        assert_eq!(g.instance_of("missing"), "");
        assert!(g.is_leaf("missing"));
        assert!(g.mentions("b"));
        assert!(!g.mentions("missing"));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut g = want_graph();
        g.remove("b");
        assert_eq!(g.ids().collect::<Vec<_>>(), vec!["w", "g"]);
        assert_eq!(g.instance_of("g"), "go-01");
        g.push_relation("b", INSTANCE, "girl");
        assert_eq!(g.ids().last(), Some("b"));
    }

    #[test]
    fn redirect_skips_new_owner() {
        let mut g = want_graph();
        g.redirect("b", "g", None);
        assert_eq!(g.relations("w").unwrap()[1].target, "g");
        // g's own reference to b is left alone; it would become a self loop.
        assert_eq!(g.relations("g").unwrap()[1].target, "b");
    }

    #[test]
    fn equality_ignores_order() {
        let a = AmrGraph::from_json(r#"{"x": [[":instance", "a"], [":mod", "y"]], "y": [[":instance", "b"]]}"#)
            .unwrap();
        let b = AmrGraph::from_json(r#"{"y": [[":instance", "b"]], "x": [[":mod", "y"], [":instance", "a"]]}"#)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = AmrGraph::from_json(r#"{"x": [":instance"]}"#).unwrap_err();
        assert!(matches!(err, GraphError::Json { .. }));
    }
}
