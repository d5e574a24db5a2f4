//! Constructors for small graphs: single instances and list nodes.

use crate::join::reconcile::reconcile_ids;
use crate::label::relation_family;

use super::query::root_id;
use super::{AmrGraph, INSTANCE, Relation};

/// One element appended to a list node.
#[derive(Debug, Clone)]
pub enum ListItem {
    /// An existing node id or a literal.
    Node(String),
    /// A whole graph, merged in and referenced by its root.
    Graph(AmrGraph),
}

impl From<&str> for ListItem {
    fn from(id: &str) -> Self {
        Self::Node(id.to_string())
    }
}

impl From<AmrGraph> for ListItem {
    fn from(graph: AmrGraph) -> Self {
        Self::Graph(graph)
    }
}

/// A one-node graph of concept `instance`, keyed by the concept's first letter.
pub fn create_instance(instance: &str) -> AmrGraph {
    let id = instance.chars().next().map(String::from).unwrap_or_else(|| "x".to_string());
    let mut graph = AmrGraph::new();
    graph.insert(id, vec![Relation::instance(instance)]);
    graph
}

/// A list node of concept `instance` (e.g. `and`) holding `items` under the
/// numbered relation family `relation` (e.g. `:op`).
pub fn create_list_node(items: Vec<ListItem>, instance: &str, relation: &str) -> AmrGraph {
    let mut graph = create_instance(instance);
    let root = graph.ids().next().map(str::to_string);
    append_list_node(&mut graph, root.as_deref(), Some(relation), items);
    graph
}

/// Append `items` to the list node `id` (default: the root), numbering
/// after the existing children.
///
/// `relation` defaults to the family of the node's first child relation.
/// Returns the ids actually referenced, after any renaming of merged graphs.
pub fn append_list_node(
    graph: &mut AmrGraph,
    id: Option<&str>,
    relation: Option<&str>,
    items: Vec<ListItem>,
) -> Vec<String> {
    let Some(list_id) = id.or_else(|| root_id(graph)).map(str::to_string) else {
        return Vec::new();
    };
    let existing = graph.relations(&list_id).unwrap_or_default();
    let family = match relation {
        Some(r) => r.to_string(),
        None => existing
            .iter()
            .find(|r| !r.is_instance())
            .map(|r| relation_family(&r.label).to_string())
            .unwrap_or_else(|| ":op".to_string()),
    };
    let mut next = existing.iter().filter(|r| r.label != INSTANCE).count() + 1;

    let mut referenced = Vec::with_capacity(items.len());
    for item in items {
        let target = match item {
            ListItem::Node(id) => id,
            ListItem::Graph(mut piece) => {
                let Some(piece_root) = root_id(&piece).map(str::to_string) else {
                    continue;
                };
                let map = reconcile_ids(&mut piece, graph);
                graph.absorb(piece);
                map.get(&piece_root).cloned().unwrap_or(piece_root)
            }
        };
        graph.push_relation(&list_id, format!("{family}{next}"), target.clone());
        next += 1;
        referenced.push(target);
    }
    referenced
}

/// Split text on whitespace.
pub fn tokenize(input: &str) -> Vec<&str> {
    input.split_whitespace().collect()
}

/// Split text into AMR name literals: each word wrapped in double quotes.
pub fn tokenize_name(input: &str) -> Vec<String> {
    tokenize(input).into_iter().map(|w| format!("\"{w}\"")).collect()
}
