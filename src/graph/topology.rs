//! Structural checks backed by `petgraph`.
//!
//! The composition engine promises single-rooted, acyclic output. These
//! helpers project an [`AmrGraph`] onto a petgraph `DiGraph` (leaf literals and
//! `:instance` concepts excluded) and verify those promises.

use std::collections::HashMap;

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::Serialize;

use super::AmrGraph;
use super::query::root_id;

/// Projection of the node-to-node relations of an AMR graph.
pub struct Projection {
    /// Node weights are node ids, edge weights relation labels.
    pub graph: DiGraph<String, String>,
    /// Node id → petgraph index.
    pub index: HashMap<String, NodeIndex>,
}

/// Project the non-leaf nodes and the relations between them.
pub fn project(graph: &AmrGraph) -> Projection {
    let mut dg: DiGraph<String, String> = DiGraph::with_capacity(graph.len(), graph.relation_count());
    let mut index = HashMap::with_capacity(graph.len());
    for id in graph.ids() {
        index.insert(id.to_string(), dg.add_node(id.to_string()));
    }
    for (subject, r) in graph.relations_iter() {
        if r.is_instance() {
            continue;
        }
        if let (Some(&s), Some(&o)) = (index.get(subject), index.get(&r.target)) {
            dg.add_edge(s, o, r.label.clone());
        }
    }
    Projection { graph: dg, index }
}

/// Whether the node-to-node relations contain a directed cycle.
pub fn has_cycle(graph: &AmrGraph) -> bool {
    is_cyclic_directed(&project(graph).graph)
}

/// Node ids in a topological order, or `None` when the graph is cyclic.
pub fn topological_order(graph: &AmrGraph) -> Option<Vec<String>> {
    let p = project(graph);
    toposort(&p.graph, None)
        .ok()
        .map(|order| order.into_iter().map(|i| p.graph[i].clone()).collect())
}

/// Summary of the structural invariants of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyReport {
    pub root: Option<String>,
    pub nodes: usize,
    pub relations: usize,
    /// Nodes with no incoming node-to-node relation, self-loops included.
    pub roots: usize,
    pub acyclic: bool,
    /// Nodes not reachable from `root`.
    pub unreachable: Vec<String>,
}

impl TopologyReport {
    /// Single root, no cycles, everything reachable.
    pub fn is_well_formed(&self) -> bool {
        self.root.is_some() && self.roots == 1 && self.acyclic && self.unreachable.is_empty()
    }
}

/// Inspect `graph`.
pub fn report(graph: &AmrGraph) -> TopologyReport {
    let p = project(graph);
    let root = root_id(graph).map(str::to_string);
    let roots = p
        .graph
        .node_indices()
        .filter(|&n| {
            p.graph
                .edges_directed(n, petgraph::Direction::Incoming)
                .next()
                .is_none()
        })
        .count();

    let mut reached = vec![false; p.graph.node_count()];
    if let Some(start) = root.as_ref().and_then(|r| p.index.get(r)) {
        let mut bfs = Bfs::new(&p.graph, *start);
        while let Some(n) = bfs.next(&p.graph) {
            reached[n.index()] = true;
        }
    }
    let unreachable = p
        .graph
        .node_indices()
        .filter(|n| !reached[n.index()])
        .map(|n| p.graph[n].clone())
        .collect();

    TopologyReport {
        root,
        nodes: graph.len(),
        relations: graph.relation_count(),
        roots,
        acyclic: !is_cyclic_directed(&p.graph),
        unreachable,
    }
}
