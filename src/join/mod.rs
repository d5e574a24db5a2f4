//! Graph composition: append, replace and merge.
//!
//! [`JoinEngine::join`] never touches its inputs. It clones the destination
//! graph, reconciles the piece's ids against it, combines both into one
//! namespace and applies the requested [`JoinMode`]. Every mode then goes
//! through the same cleanup: duplicate triples are dropped, repeated joinable
//! predicates are glued under a join-entity node, and the result is pruned to
//! the cycle-free part reachable from the root.
//!
//! ```no_run
//! use amr_algebra::graph::AmrGraph;
//! use amr_algebra::join::{JoinEngine, JoinRequest};
//!
//! let graph = AmrGraph::from_triples([("w", ":instance", "want-01")]);
//! let piece = AmrGraph::from_triples([("g", ":instance", "go-01")]);
//! let outcome = JoinEngine::default()
//!     .join(&graph, &JoinRequest::append(piece, ":arg1"), None)
//!     .unwrap();
//! assert_eq!(outcome.graph.relations("w").unwrap().len(), 2);
//! ```

pub mod cleanup;
pub mod merge;
pub mod reconcile;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::{GraphError, JoinError, JoinResult};
use crate::graph::AmrGraph;
use crate::graph::query::root_id;
use crate::label::LabelPattern;
use crate::lexicon::{DEFAULT_JOIN_ENTITY, DEFAULT_JOIN_RELATION};

use self::merge::{Merger, change_reference};
use self::reconcile::{IdMap, reconcile_ids};

/// A `(start, end)` pair of node ids bounding the region of interest in one
/// side of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRange {
    pub start: String,
    pub end: String,
}

impl IdRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// A range whose start and end are the same node.
    pub fn single(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            start: id.clone(),
            end: id,
        }
    }

    /// Parse `a` or `a,b`.
    pub fn parse(text: &str) -> Self {
        match text.split_once(',') {
            Some((start, end)) => Self::new(start.trim(), end.trim()),
            None => Self::single(text.trim()),
        }
    }
}

/// Caller-supplied joinability test, consulted when two nodes are not
/// joinable by instance equality.
pub trait Joinable {
    fn is_joinable(&self, a: &str, b: &str, graph: &AmrGraph) -> bool;
}

impl<F> Joinable for F
where
    F: Fn(&str, &str, &AmrGraph) -> bool,
{
    fn is_joinable(&self, a: &str, b: &str, graph: &AmrGraph) -> bool {
        self(a, b, graph)
    }
}

/// How the piece is combined with the destination.
pub enum JoinMode {
    /// Link the piece under the destination range start with `relation`,
    /// optionally linking back from the piece range end.
    Append {
        relation: String,
        return_relation: Option<String>,
    },
    /// Substitute the piece range endpoints for the destination ones.
    Replace,
    /// Unify overlapping structure.
    Merge { joinable: Option<Box<dyn Joinable>> },
}

impl JoinMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Append { .. } => "append",
            Self::Replace => "replace",
            Self::Merge { .. } => "merge",
        }
    }
}

impl fmt::Debug for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append {
                relation,
                return_relation,
            } => f
                .debug_struct("Append")
                .field("relation", relation)
                .field("return_relation", return_relation)
                .finish(),
            Self::Replace => f.write_str("Replace"),
            Self::Merge { joinable } => f
                .debug_struct("Merge")
                .field("joinable", &joinable.as_ref().map(|_| "<fn>"))
                .finish(),
        }
    }
}

/// A graph fragment and the instructions for joining it.
#[derive(Debug)]
pub struct JoinRequest {
    pub piece: AmrGraph,
    /// Region of the piece to join; defaults to its root. Ids refer to the
    /// piece as given, before any renaming.
    pub piece_range: Option<IdRange>,
    pub mode: JoinMode,
    /// Concept used to glue nodes that cannot be merged.
    pub join_entity: String,
    /// Numbered relation family used under glue nodes.
    pub join_relation: String,
}

impl JoinRequest {
    fn with_mode(piece: AmrGraph, mode: JoinMode) -> Self {
        Self {
            piece,
            piece_range: None,
            mode,
            join_entity: DEFAULT_JOIN_ENTITY.to_string(),
            join_relation: DEFAULT_JOIN_RELATION.to_string(),
        }
    }

    pub fn append(piece: AmrGraph, relation: impl Into<String>) -> Self {
        Self::with_mode(
            piece,
            JoinMode::Append {
                relation: relation.into(),
                return_relation: None,
            },
        )
    }

    pub fn replace(piece: AmrGraph) -> Self {
        Self::with_mode(piece, JoinMode::Replace)
    }

    pub fn merge(piece: AmrGraph) -> Self {
        Self::with_mode(piece, JoinMode::Merge { joinable: None })
    }

    pub fn with_piece_range(mut self, range: IdRange) -> Self {
        self.piece_range = Some(range);
        self
    }

    /// Relation pushed from the piece range end back to the destination
    /// range end. Ignored, with a debug event, unless the request appends.
    pub fn with_return_relation(mut self, relation: impl Into<String>) -> Self {
        if let JoinMode::Append {
            return_relation, ..
        } = &mut self.mode
        {
            *return_relation = Some(relation.into());
        } else {
            tracing::debug!(mode = self.mode.name(), "return relation ignored outside append");
        }
        self
    }

    /// Extra joinability test. Ignored, with a debug event, unless the
    /// request merges.
    pub fn with_joinable(mut self, test: impl Joinable + 'static) -> Self {
        if let JoinMode::Merge { joinable } = &mut self.mode {
            *joinable = Some(Box::new(test));
        } else {
            tracing::debug!(mode = self.mode.name(), "joinability test ignored outside merge");
        }
        self
    }

    pub fn with_join_entity(mut self, entity: impl Into<String>) -> Self {
        self.join_entity = entity.into();
        self
    }

    pub fn with_join_relation(mut self, relation: impl Into<String>) -> Self {
        self.join_relation = relation.into();
        self
    }
}

/// Labels and concepts that must never be merged.
#[derive(Debug, Clone)]
pub struct AlgParams {
    /// Relations never copied between merged nodes nor glued when repeated.
    pub not_joinable_relations: Vec<LabelPattern>,
    /// Instances whose nodes are never merged.
    pub not_joinable_entities: Vec<LabelPattern>,
}

impl Default for AlgParams {
    fn default() -> Self {
        Self {
            not_joinable_relations: vec![LabelPattern::exact(crate::graph::INSTANCE)],
            not_joinable_entities: vec![LabelPattern::exact("name")],
        }
    }
}

/// Result of a join: the new graph and where the piece's ids ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinOutcome {
    pub graph: AmrGraph,
    /// Old id → final id for piece nodes renamed or absorbed, and for
    /// destination nodes absorbed by a merge.
    #[serde(rename = "map")]
    pub id_map: BTreeMap<String, String>,
}

impl JoinOutcome {
    fn unchanged(graph: &AmrGraph) -> Self {
        Self {
            graph: graph.clone(),
            id_map: BTreeMap::new(),
        }
    }
}

/// Composition engine.
#[derive(Debug, Clone, Default)]
pub struct JoinEngine {
    params: AlgParams,
}

impl JoinEngine {
    pub fn new(params: AlgParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AlgParams {
        &self.params
    }

    /// Join `request.piece` into `graph` over `range` (default: the root).
    ///
    /// An empty side short-circuits to a clone of the other side. Fails when
    /// a range id names nothing in its graph, when a side has no root but
    /// one is needed, or when the join entity is empty.
    pub fn join(
        &self,
        graph: &AmrGraph,
        request: &JoinRequest,
        range: Option<IdRange>,
    ) -> JoinResult<JoinOutcome> {
        if graph.is_empty() {
            return Ok(JoinOutcome::unchanged(&request.piece));
        }
        if request.piece.is_empty() {
            return Ok(JoinOutcome::unchanged(graph));
        }
        if request.join_entity.is_empty() {
            return Err(JoinError::InvalidJoinEntity {
                entity: request.join_entity.clone(),
            });
        }

        let mut res = graph.clone();
        let mut root = root_id(&res)
            .map(str::to_string)
            .ok_or_else(|| GraphError::NoRoot {
                side: "destination".into(),
            })?;
        let range = range.unwrap_or_else(|| IdRange::single(root.clone()));
        for id in [&range.start, &range.end] {
            if !res.mentions(id) {
                return Err(JoinError::UnknownIdentifier {
                    id: id.clone(),
                    side: "destination".into(),
                });
            }
        }

        let mut piece = request.piece.clone();
        let piece_map = reconcile_ids(&mut piece, &res);
        let piece_range = self.resolve_piece_range(request, &piece_map)?;
        res.absorb(piece);

        tracing::debug!(
            mode = request.mode.name(),
            destination = %format!("{}..{}", range.start, range.end),
            piece = %format!("{}..{}", piece_range.start, piece_range.end),
            renamed = piece_map.iter().filter(|(k, v)| k != v).count(),
            "joining graphs"
        );

        let mut merge_map = IdMap::new();
        match &request.mode {
            JoinMode::Append {
                relation,
                return_relation,
            } => {
                res.push_relation(&range.start, relation.clone(), piece_range.start.clone());
                if let Some(back) = return_relation {
                    res.push_relation(&piece_range.end, back.clone(), range.end.clone());
                }
            }
            JoinMode::Replace => {
                let mut processed: HashSet<&str> = HashSet::new();
                for (dest, new) in [
                    (&range.start, &piece_range.start),
                    (&range.end, &piece_range.end),
                ] {
                    if dest == new || !processed.insert(dest.as_str()) {
                        continue;
                    }
                    let carried: Vec<_> = res
                        .relations(dest)
                        .unwrap_or_default()
                        .iter()
                        .filter(|r| !r.is_instance())
                        .cloned()
                        .collect();
                    for r in carried {
                        res.push_relation(new, r.label, r.target);
                    }
                    change_reference(&mut res, dest, new, None);
                    if *dest == root {
                        root = new.clone();
                    }
                    res.remove(dest);
                }
            }
            JoinMode::Merge { joinable } => {
                let mut merger = Merger::new(
                    &mut res,
                    &self.params,
                    &request.join_entity,
                    &request.join_relation,
                    joinable.as_deref(),
                );
                merger.merge_entities(
                    (range.start.as_str(), range.end.as_str()),
                    (piece_range.start.as_str(), piece_range.end.as_str()),
                    None,
                );
                merge_map = merger.into_map();
                root = resolve(&merge_map, &root);
            }
        }

        cleanup::remove_duplicate_triples(&mut res);
        cleanup::collapse_repeated_relations(
            &mut res,
            &self.params.not_joinable_relations,
            &request.join_entity,
            &request.join_relation,
        );
        if !res.contains(&root) {
            if let Some(fallback) = root_id(&res).or_else(|| res.ids().next()) {
                root = fallback.to_string();
            }
        }
        let before = res.len();
        let res = cleanup::prune(&res, &root);
        tracing::debug!(root = %root, pruned = before - res.len(), nodes = res.len(), "join finished");

        let id_map = final_map(&piece_map, &merge_map, graph, &res);
        Ok(JoinOutcome { graph: res, id_map })
    }

    /// Map the piece range (given in the piece's original ids) into the
    /// combined namespace.
    fn resolve_piece_range(&self, request: &JoinRequest, map: &IdMap) -> JoinResult<IdRange> {
        let lookup = |id: &str| -> JoinResult<String> {
            match map.get(id) {
                Some(new) => Ok(new.clone()),
                None if request.piece.mentions(id) => Ok(id.to_string()),
                None => Err(JoinError::UnknownIdentifier {
                    id: id.to_string(),
                    side: "piece".into(),
                }),
            }
        };
        match &request.piece_range {
            Some(r) => Ok(IdRange::new(lookup(&r.start)?, lookup(&r.end)?)),
            None => {
                let root = root_id(&request.piece).ok_or_else(|| GraphError::NoRoot {
                    side: "piece".into(),
                })?;
                Ok(IdRange::single(lookup(root)?))
            }
        }
    }
}

/// Follow `id` through `map` to its final destination. A chain that loops
/// stops at the first repeated id.
fn resolve(map: &IdMap, id: &str) -> String {
    let mut current = id.to_string();
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(next) = map.get(&current) {
        if !seen.insert(next.clone()) {
            break;
        }
        current = next.clone();
    }
    current
}

/// Where each piece id ended up: its reconciled id followed through the
/// merge substitutions. Destination ids absorbed by the merge are listed
/// too, unless a piece id of the same name takes the slot. Unchanged ids and
/// ids whose destination was pruned are dropped.
fn final_map(
    piece_map: &IdMap,
    merge_map: &IdMap,
    destination: &AmrGraph,
    result: &AmrGraph,
) -> BTreeMap<String, String> {
    let absorbed = merge_map
        .keys()
        .filter(|k| destination.contains(k) && !piece_map.contains_key(*k))
        .map(|k| (k.clone(), resolve(merge_map, k)));
    piece_map
        .iter()
        .map(|(k, v)| (k.clone(), resolve(merge_map, v)))
        .chain(absorbed)
        .filter(|(k, v)| k != v && result.contains(v))
        .collect()
}

/// Join with the default [`AlgParams`].
pub fn join_graph(
    graph: &AmrGraph,
    request: &JoinRequest,
    range: Option<IdRange>,
) -> JoinResult<JoinOutcome> {
    JoinEngine::default().join(graph, request, range)
}
