//! Recursive entity merging.
//!
//! Starting from the two range starts, a pair of nodes is either *joinable*
//! (same concept, not a join entity, not excluded) and fused into the
//! destination node, or glued side by side under a join-entity node such as
//! `and`. Children sharing a relation are then paired up and merged the same
//! way, walking toward each side's range end. Every visited pair is recorded,
//! so cyclic input terminates.

use std::collections::HashSet;

use crate::graph::build::create_instance;
use crate::graph::{AmrGraph, Relation};
use crate::label::{is_list_relation, matches_any, relation_family};
use crate::lexicon;

use super::reconcile::{IdMap, reconcile_ids};
use super::{AlgParams, Joinable};

/// Point references to `old` at `new`.
///
/// A node is redirected everywhere. A leaf is only redirected inside
/// `scope`, since the same literal may legitimately appear elsewhere.
pub(crate) fn change_reference(graph: &mut AmrGraph, old: &str, new: &str, scope: Option<&str>) {
    if graph.contains(old) {
        graph.redirect(old, new, None);
    } else if let Some(subject) = scope {
        graph.redirect_in(subject, old, new);
    }
}

/// Attach `ids` as numbered children (`{relation}N`) of a node of concept
/// `entity`, returning that node's id.
///
/// One of `ids` is reused when it already has the concept; otherwise a fresh
/// node is created with a non-colliding id. An id with the same concept has
/// its children absorbed instead of being nested. References are left alone.
pub(crate) fn glue_nodes(graph: &mut AmrGraph, entity: &str, relation: &str, ids: &[&str]) -> String {
    let glue = match ids.iter().find(|id| graph.instance_of(id) == entity) {
        Some(id) => id.to_string(),
        None => {
            let mut fresh = create_instance(entity);
            reconcile_ids(&mut fresh, graph);
            let id = fresh.ids().next().unwrap_or_default().to_string();
            graph.absorb(fresh);
            tracing::debug!(glue = %id, entity, "created glue node");
            id
        }
    };

    let mut next = graph
        .relations(&glue)
        .map_or(0, |rels| rels.iter().filter(|r| !r.is_instance()).count())
        + 1;
    for &id in ids {
        if id == glue {
            continue;
        }
        let items: Vec<String> = if graph.instance_of(id) == entity {
            graph
                .relations(id)
                .unwrap_or_default()
                .iter()
                .filter(|r| !r.is_instance())
                .map(|r| r.target.clone())
                .collect()
        } else {
            vec![id.to_string()]
        };
        for target in items {
            graph.push_relation(&glue, format!("{relation}{next}"), target);
            next += 1;
        }
    }
    glue
}

/// Child pairs of one node, split by joinability. Keys keep first-seen order.
#[derive(Debug, Default)]
pub(crate) struct Groups {
    pub mergeable: Vec<(String, Vec<String>)>,
    pub not_mergeable: Vec<(String, Vec<String>)>,
}

fn push_pair(groups: &mut Vec<(String, Vec<String>)>, a: &str, b: &str) {
    match groups.iter_mut().find(|(key, _)| key == a) {
        Some((_, partners)) => partners.push(b.to_string()),
        None => groups.push((a.to_string(), vec![b.to_string()])),
    }
}

/// State of one merge run over the combined graph.
pub(crate) struct Merger<'a> {
    graph: &'a mut AmrGraph,
    params: &'a AlgParams,
    join_entity: &'a str,
    join_relation: &'a str,
    joinable: Option<&'a dyn Joinable>,
    visited: HashSet<(String, String)>,
    map: IdMap,
}

impl<'a> Merger<'a> {
    pub(crate) fn new(
        graph: &'a mut AmrGraph,
        params: &'a AlgParams,
        join_entity: &'a str,
        join_relation: &'a str,
        joinable: Option<&'a dyn Joinable>,
    ) -> Self {
        Self {
            graph,
            params,
            join_entity,
            join_relation,
            joinable,
            visited: HashSet::new(),
            map: IdMap::new(),
        }
    }

    /// The substitutions performed so far: absorbed id → surviving id.
    pub(crate) fn into_map(self) -> IdMap {
        self.map
    }

    /// Merge the pair `(dest.0, piece.0)`, then recurse into their children
    /// toward `dest.1` and `piece.1`. `parent` is the node the pair hangs off.
    pub(crate) fn merge_entities(&mut self, dest: (&str, &str), piece: (&str, &str), parent: Option<&str>) {
        let (d, d_end) = dest;
        let (p, p_end) = piece;
        let pair = (d.to_string(), p.to_string());
        let first = self.visited.is_empty();
        if !first && (self.visited.contains(&pair) || d == d_end || p == p_end) {
            return;
        }
        self.visited.insert(pair);

        if self.joinable(d, p) {
            tracing::trace!(dest = d, piece = p, "merging joinable pair");
            self.merge_relations(d, p);
            change_reference(self.graph, p, d, parent);
            if !self.graph.contains(d) {
                return;
            }
            self.map.insert(p.to_string(), d.to_string());

            let is_list = self.is_list(d);
            let groups = self.group_by_mergeable(d, is_list);
            self.merge_groups(&groups.mergeable, d_end, p_end, d);
            if is_list {
                self.merge_equal_items(d);
                if let Some(child) = self.collapse_list(d) {
                    self.map.insert(d.to_string(), child.clone());
                    self.map.insert(p.to_string(), child);
                }
            } else {
                self.merge_groups(&groups.not_mergeable, d_end, p_end, d);
            }
        } else {
            let glue = glue_nodes(self.graph, self.join_entity, self.join_relation, &[d, p]);
            tracing::trace!(dest = d, piece = p, glue = %glue, "gluing pair");
            for id in [d, p] {
                self.graph.redirect(id, &glue, None);
            }

            let groups = self.group_by_mergeable(&glue, true);
            self.merge_groups(&groups.mergeable, d_end, p_end, &glue);
            self.merge_equal_items(&glue);
            let survivor = self.collapse_list(&glue).unwrap_or(glue);
            self.map.insert(d.to_string(), survivor.clone());
            self.map.insert(p.to_string(), survivor);
        }
    }

    fn merge_groups(&mut self, groups: &[(String, Vec<String>)], d_end: &str, p_end: &str, parent: &str) {
        for (id, partners) in groups {
            for partner in partners {
                self.merge_entities((id.as_str(), d_end), (partner.as_str(), p_end), Some(parent));
            }
        }
    }

    fn not_joinable_relation(&self, label: &str) -> bool {
        matches_any(label, &self.params.not_joinable_relations)
    }

    /// Same concept on both sides, neither a leaf unless they are the same
    /// leaf, not the join entity and not excluded. Falls back to the
    /// caller's test.
    fn joinable(&self, a: &str, b: &str) -> bool {
        self.entities_joinable(a, b) || self.joinable.is_some_and(|test| test.is_joinable(a, b, &*self.graph))
    }

    fn entities_joinable(&self, a: &str, b: &str) -> bool {
        let first = self.graph.instance_of(a);
        for id in [a, b] {
            let instance = self.graph.instance_of(id);
            if (first.is_empty() && id != a)
                || instance == self.join_entity
                || instance != first
                || matches_any(instance, &self.params.not_joinable_entities)
            {
                return false;
            }
        }
        true
    }

    /// Copy the relations of `p` missing from `d`, skipping not-joinable
    /// labels. Leaves have nothing to copy.
    fn merge_relations(&mut self, d: &str, p: &str) {
        let (Some(dest), Some(piece)) = (self.graph.relations(d), self.graph.relations(p)) else {
            return;
        };
        let mut additions: Vec<Relation> = Vec::new();
        for r in piece {
            if !self.not_joinable_relation(&r.label) && !dest.contains(r) && !additions.contains(r) {
                additions.push(r.clone());
            }
        }
        if let Some(rels) = self.graph.relations_mut(d) {
            rels.extend(additions);
        }
    }

    fn is_list(&self, id: &str) -> bool {
        self.graph
            .relations(id)
            .unwrap_or_default()
            .iter()
            .find(|r| !r.is_instance())
            .is_some_and(|r| is_list_relation(&r.label))
    }

    /// Pair up the children of `id` that share a relation label (or, for
    /// list nodes, a relation family).
    fn group_by_mergeable(&self, id: &str, is_list: bool) -> Groups {
        let mut groups = Groups::default();
        let Some(rels) = self.graph.relations(id) else {
            return groups;
        };
        let key = |r: &Relation| -> String {
            if is_list {
                relation_family(&r.label).to_string()
            } else {
                r.label.clone()
            }
        };

        let mut paired: HashSet<&str> = HashSet::new();
        for (i1, r1) in rels.iter().enumerate() {
            if self.not_joinable_relation(&r1.label) {
                continue;
            }
            for (i2, r2) in rels.iter().enumerate() {
                if i1 == i2
                    || r1.target == r2.target
                    || self.not_joinable_relation(&r2.label)
                    || (paired.contains(r1.target.as_str()) && paired.contains(r2.target.as_str()))
                    || key(r1) != key(r2)
                {
                    continue;
                }
                paired.insert(r1.target.as_str());
                paired.insert(r2.target.as_str());
                let bucket = if self.joinable(&r1.target, &r2.target) {
                    &mut groups.mergeable
                } else {
                    &mut groups.not_mergeable
                };
                push_pair(bucket, &r1.target, &r2.target);
            }
        }
        groups
    }

    /// Leaves are equal when identical; nodes when their relation sets are.
    fn entities_equal(&self, a: &str, b: &str) -> bool {
        match (self.graph.relations(a), self.graph.relations(b)) {
            (Some(ra), Some(rb)) => {
                let sa: HashSet<&Relation> = ra.iter().collect();
                let sb: HashSet<&Relation> = rb.iter().collect();
                sa == sb
            }
            _ => a == b,
        }
    }

    /// Drop equal children of the list node `id` and renumber the survivors
    /// `1..n` under the family of its first child relation.
    fn merge_equal_items(&mut self, id: &str) {
        let Some(rels) = self.graph.relations(id) else {
            return;
        };
        let Some(family) = rels
            .iter()
            .find(|r| !r.is_instance())
            .map(|r| relation_family(&r.label).to_string())
        else {
            return;
        };
        let instance = rels.iter().find(|r| r.is_instance()).cloned();
        let mut objects: Vec<String> = rels
            .iter()
            .filter(|r| !r.is_instance())
            .map(|r| r.target.clone())
            .collect();
        objects.sort();
        objects.dedup();

        let mut kept: Vec<String> = Vec::with_capacity(objects.len());
        for object in objects {
            if !kept.iter().any(|k| self.entities_equal(&object, k)) {
                kept.push(object);
            }
        }

        let mut rebuilt: Vec<Relation> = instance.into_iter().collect();
        rebuilt.extend(
            kept.into_iter()
                .enumerate()
                .map(|(i, target)| Relation::new(format!("{family}{}", i + 1), target)),
        );
        self.graph.insert(id, rebuilt);
    }

    /// A join-entity list left with a single node child is redundant:
    /// redirect its references to the child and return the child.
    fn collapse_list(&mut self, id: &str) -> Option<String> {
        let rels = self.graph.relations(id)?;
        let instance = self.graph.instance_of(id);
        if rels.len() >= 3 || !(lexicon::is_join_entity(instance) || instance == self.join_entity) {
            return None;
        }
        let child = rels.iter().find(|r| !r.is_instance())?.target.clone();
        if !self.graph.contains(&child) {
            return None;
        }
        tracing::trace!(list = id, child = %child, "collapsing single-item list");
        self.graph.redirect(id, &child, None);
        Some(child)
    }
}
