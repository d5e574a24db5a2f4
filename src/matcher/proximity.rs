//! Reification-aware triple matching and the recursive proximity score.

use std::collections::{HashMap, HashSet};

use crate::graph::query::{SearchQuery, children_of, parents_of, path_length, search_with};
use crate::graph::{AmrGraph, INSTANCE};
use crate::label::{LabelPattern, inverse, matches_any};
use crate::reify::ReificationIndex;

use super::score::ScoreFn;

/// Which way a triple is read from its origin node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The origin is the subject; the match is found among its descendants.
    Child,
    /// The origin is the object; the match is the subject.
    Parent,
}

/// A borrowed `(subject, label, target)` triple.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'t> {
    pub subject: &'t str,
    pub label: &'t str,
    pub target: &'t str,
}

impl<'t> Edge<'t> {
    pub fn new(subject: &'t str, label: &'t str, target: &'t str) -> Self {
        Self { subject, label, target }
    }
}

/// A target node paired with the pattern node it plays.
pub type Pairing = (String, String);

/// Keep the first position of every target id, with its last pattern id.
fn dedupe_by_id(pairs: Vec<Pairing>) -> Vec<Pairing> {
    let mut out: Vec<Pairing> = Vec::with_capacity(pairs.len());
    for (id, pattern_id) in pairs {
        match out.iter_mut().find(|(seen, _)| *seen == id) {
            Some(slot) => slot.1 = pattern_id,
            None => out.push((id, pattern_id)),
        }
    }
    out
}

/// `1 / path length`, treating "no directed path" as adjacent.
fn weight(length: usize) -> f64 {
    1.0 / length.max(1) as f64
}

/// Proximity computation between one target graph and one pattern graph.
pub struct ProximitySearch<'a> {
    graph: &'a AmrGraph,
    pattern: &'a AmrGraph,
    scorer: &'a dyn ScoreFn,
    index: &'a ReificationIndex,
    /// `reification_from_relation` compiles regexes; cache per label.
    reifications: HashMap<String, Vec<LabelPattern>>,
}

impl<'a> ProximitySearch<'a> {
    pub fn new(
        graph: &'a AmrGraph,
        pattern: &'a AmrGraph,
        scorer: &'a dyn ScoreFn,
        index: &'a ReificationIndex,
    ) -> Self {
        Self {
            graph,
            pattern,
            scorer,
            index,
            reifications: HashMap::new(),
        }
    }

    fn node_score(&self, id: &str, pattern_id: &str) -> f64 {
        self.scorer.score(id, pattern_id, self.graph, self.pattern)
    }

    fn accept(&self, id: &str, pattern_id: &str) -> Option<Pairing> {
        (self.node_score(id, pattern_id) > 0.0).then(|| (id.to_string(), pattern_id.to_string()))
    }

    fn reifications_of(&mut self, relation: &str) -> &[LabelPattern] {
        let index = self.index;
        self.reifications
            .entry(relation.to_string())
            .or_insert_with(|| index.reification_from_relation(relation))
    }

    fn reifies(&mut self, instance: &str, relation: &str) -> bool {
        !instance.is_empty() && matches_any(instance, self.reifications_of(relation))
    }

    fn expresses(&self, label: &str, instance: &str) -> bool {
        matches_any(label, &self.index.relation_from_reification(instance))
    }

    /// Compare target triple `g` with pattern triple `p`, read in `direction`
    /// from the origins `g_origin` and `p_origin`.
    ///
    /// Returns the `(target id, pattern id)` pair with a positive score:
    /// the opposite endpoints for equal labels, the crossed endpoints for
    /// inverse labels, otherwise the best child of a reification node on
    /// either side whose relation matches the other side's label.
    pub fn has_match(
        &mut self,
        direction: Direction,
        g_origin: &str,
        p_origin: &str,
        g: Edge<'_>,
        p: Edge<'_>,
    ) -> Option<Pairing> {
        if g.label == INSTANCE || p.label == INSTANCE {
            return None;
        }
        if direction == Direction::Parent && (p.target != p_origin || g.target != g_origin) {
            return None;
        }

        if g.label == p.label {
            return match direction {
                Direction::Child => self.accept(g.target, p.target),
                Direction::Parent => self.accept(g.subject, p.subject),
            };
        }
        if g.label == inverse(p.label) || p.label == inverse(g.label) {
            return match direction {
                Direction::Child => self.accept(g.subject, p.target),
                Direction::Parent => self.accept(g.target, p.subject),
            };
        }

        let graph = self.graph;
        let pattern = self.pattern;
        // Pattern-side reification: compare the target endpoints with its children.
        let from_pattern = |node: &str| -> Vec<Pairing> {
            children_of(pattern, node, None, true)
                .into_iter()
                .flat_map(|c| [(g.subject.to_string(), c.clone()), (g.target.to_string(), c)])
                .collect()
        };
        // Target-side reification: compare its children with the pattern endpoints.
        let from_graph = |node: &str| -> Vec<Pairing> {
            children_of(graph, node, None, true)
                .into_iter()
                .flat_map(|c| [(c.clone(), p.subject.to_string()), (c, p.target.to_string())])
                .collect()
        };

        let comparators = if self.expresses(g.label, pattern.instance_of(p_origin)) {
            from_pattern(p_origin)
        } else if self.expresses(g.label, pattern.instance_of(p.subject)) {
            from_pattern(p.subject)
        } else if self.expresses(p.label, graph.instance_of(g_origin)) {
            from_graph(g_origin)
        } else if self.expresses(p.label, graph.instance_of(g.subject)) {
            from_graph(g.subject)
        } else if self.reifies(pattern.instance_of(p.subject), g.label) {
            from_pattern(p.subject)
        } else if self.reifies(graph.instance_of(g.subject), p.label) {
            from_graph(g.subject)
        } else if self.reifies(pattern.instance_of(p.target), g.label) {
            from_pattern(p.target)
        } else if self.reifies(graph.instance_of(g.target), p.label) {
            from_graph(g.target)
        } else {
            return None;
        };

        let mut best: Option<(f64, Pairing)> = None;
        for (id, pattern_id) in comparators {
            let score = self.node_score(&id, &pattern_id);
            if score > best.as_ref().map_or(0.0, |(s, _)| *s) {
                best = Some((score, (id, pattern_id)));
            }
        }
        best.map(|(_, pairing)| pairing)
    }

    /// For each outgoing pattern relation of `pattern_id`, the first target
    /// node at or below `id` that matches it.
    pub fn children_search(&mut self, id: &str, pattern_id: &str) -> Vec<Pairing> {
        let graph = self.graph;
        let pattern = self.pattern;
        let Some(pattern_relations) = pattern.relations(pattern_id) else {
            return Vec::new();
        };
        let query = SearchQuery::new().from_node(id);
        let mut result = Vec::new();
        for pr in pattern_relations.iter().filter(|r| !r.is_instance()) {
            let wanted = Edge::new(pattern_id, &pr.label, &pr.target);
            let found = search_with(graph, &query, |subject, label, target| {
                if label == INSTANCE {
                    return Vec::new();
                }
                self.has_match(Direction::Child, id, pattern_id, Edge::new(subject, label, target), wanted)
                    .map(|(a, b)| vec![a, b])
                    .unwrap_or_default()
            });
            if let [a, b, ..] = found.as_slice() {
                result.push((a.clone(), b.clone()));
            }
        }
        dedupe_by_id(result)
    }

    /// For each pattern parent of `pattern_id`, a matching parent of `id`, or
    /// failing that the closest match among the target's ancestors.
    pub fn parents_search(&mut self, id: &str, pattern_id: &str) -> Vec<Pairing> {
        let mut path = HashSet::from([id.to_string()]);
        self.parents_search_from(id, pattern_id, &mut path)
    }

    fn parents_search_from(&mut self, id: &str, pattern_id: &str, path: &mut HashSet<String>) -> Vec<Pairing> {
        let graph = self.graph;
        let pattern = self.pattern;
        let pattern_parents = parents_of(pattern, pattern_id, None);
        let graph_parents = parents_of(graph, id, None);

        let mut result = Vec::new();
        for pp in &pattern_parents {
            let mut direct = None;
            'search: for pr in pattern.relations(pp).unwrap_or_default().iter().filter(|r| !r.is_instance()) {
                for gp in &graph_parents {
                    for gr in graph.relations(gp).unwrap_or_default().iter().filter(|r| !r.is_instance()) {
                        direct = self.has_match(
                            Direction::Parent,
                            id,
                            pattern_id,
                            Edge::new(gp, &gr.label, &gr.target),
                            Edge::new(pp, &pr.label, &pr.target),
                        );
                        if direct.is_some() {
                            break 'search;
                        }
                    }
                }
            }

            match direct {
                Some(pairing) => result.push(pairing),
                None => {
                    let mut best: Vec<Pairing> = Vec::new();
                    let mut shortest = usize::MAX;
                    for gp in &graph_parents {
                        if !path.insert(gp.clone()) {
                            continue;
                        }
                        let found = self.parents_search_from(gp, pattern_id, path);
                        path.remove(gp);
                        if let Some((first, _)) = found.first() {
                            let length = path_length(graph, first, gp);
                            if length < shortest {
                                shortest = length;
                                best = found;
                            }
                        }
                    }
                    result.extend(best);
                }
            }
        }
        dedupe_by_id(result)
    }

    /// Recursive neighbourhood score of `id` playing `pattern_id`.
    ///
    /// `memo` is keyed by `(id, pattern_id)` and seeded with `1.0` before
    /// recursing. The seed is never overwritten: a pair reached again, in a
    /// cycle or from a second neighbour, contributes `1.0`.
    pub fn information_proximity(
        &mut self,
        id: &str,
        pattern_id: &str,
        memo: &mut HashMap<(String, String), f64>,
    ) -> f64 {
        let key = (id.to_string(), pattern_id.to_string());
        if let Some(&score) = memo.get(&key) {
            return score;
        }
        memo.insert(key, 1.0);

        let graph = self.graph;
        let node_score = self.node_score(id, pattern_id);
        let mut score = 1.0;
        for (child, child_pattern) in self.children_search(id, pattern_id) {
            let child_score = self.information_proximity(&child, &child_pattern, memo);
            score += weight(path_length(graph, id, &child)) * child_score;
        }
        for (parent, parent_pattern) in self.parents_search(id, pattern_id) {
            let parent_score = self.information_proximity(&parent, &parent_pattern, memo);
            score += weight(path_length(graph, &parent, id)) * parent_score;
        }
        score *= 1.0 + node_score;
        tracing::trace!(id, pattern_id, score, "proximity");
        score
    }
}
