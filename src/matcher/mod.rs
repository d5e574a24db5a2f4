//! Heuristic pattern matching.
//!
//! Given a target graph and a small pattern graph holding a placeholder
//! node (by default the first `amr-unknown` node), [`PatternMatcher`] ranks
//! every target node by how well it plays the placeholder's role. Scores
//! are normalized by the placeholder's proximity to itself, so a perfect
//! structural match scores about `1.0`.
//!
//! ```no_run
//! use amr_algebra::graph::AmrGraph;
//! use amr_algebra::matcher::PatternMatcher;
//!
//! // "The boy wants to go." / "Who wants to go?"
//! let graph = AmrGraph::from_triples([
//!     ("w", ":instance", "want-01"),
//!     ("w", ":arg0", "b"),
//!     ("b", ":instance", "boy"),
//! ]);
//! let pattern = AmrGraph::from_triples([
//!     ("w", ":instance", "want-01"),
//!     ("w", ":arg0", "u"),
//!     ("u", ":instance", "amr-unknown"),
//! ]);
//! let ranking = PatternMatcher::default().search_pattern(&graph, &pattern, None).unwrap();
//! assert_eq!(ranking[0].id, "b");
//! ```

pub mod proximity;
pub mod score;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{MatchError, MatchResult};
use crate::graph::AmrGraph;
use crate::graph::query::{SearchQuery, search};
use crate::lexicon::PLACEHOLDER_INSTANCE;
use crate::reify::ReificationIndex;

use self::proximity::ProximitySearch;
use self::score::{DefaultScorer, ScoreFn};

/// One ranked target node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub id: String,
    pub score: f64,
}

/// A pattern search: the pattern graph, its placeholder and the output form.
#[derive(Debug, Clone)]
pub struct PatternQuery<'p> {
    pub pattern: &'p AmrGraph,
    /// Pattern node to look for; defaults to the first placeholder-instance node.
    pub placeholder: Option<String>,
    /// Return bare ids instead of scored results.
    pub ids_only: bool,
}

impl<'p> PatternQuery<'p> {
    pub fn new(pattern: &'p AmrGraph) -> Self {
        Self {
            pattern,
            placeholder: None,
            ids_only: false,
        }
    }

    pub fn placeholder(mut self, id: impl Into<String>) -> Self {
        self.placeholder = Some(id.into());
        self
    }

    pub fn ids_only(mut self) -> Self {
        self.ids_only = true;
        self
    }
}

/// Output of [`PatternMatcher::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ranking {
    Scored(Vec<ScoreResult>),
    Ids(Vec<String>),
}

impl Ranking {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Scored(results) => results.iter().map(|r| r.id.as_str()).collect(),
            Self::Ids(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Ranks target nodes against a pattern placeholder.
pub struct PatternMatcher {
    scorer: Box<dyn ScoreFn>,
    placeholder_instance: String,
    index: &'static ReificationIndex,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self {
            scorer: Box::new(DefaultScorer),
            placeholder_instance: PLACEHOLDER_INSTANCE.to_string(),
            index: ReificationIndex::standard(),
        }
    }
}

impl std::fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("placeholder_instance", &self.placeholder_instance)
            .finish_non_exhaustive()
    }
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node scoring strategy.
    pub fn with_scorer(mut self, scorer: impl ScoreFn + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Concept marking the default placeholder node.
    pub fn with_placeholder_instance(mut self, instance: impl Into<String>) -> Self {
        self.placeholder_instance = instance.into();
        self
    }

    /// Resolve the placeholder: `explicit` must be a pattern node; otherwise
    /// the first node of the placeholder concept, if any.
    pub fn placeholder(&self, pattern: &AmrGraph, explicit: Option<&str>) -> MatchResult<Option<String>> {
        match explicit {
            Some(id) if pattern.contains(id) => Ok(Some(id.to_string())),
            Some(id) => Err(MatchError::UnknownPlaceholder { id: id.to_string() }),
            None => {
                let query = SearchQuery::new().subject(self.placeholder_instance.as_str());
                Ok(search(pattern, &query).into_iter().next())
            }
        }
    }

    /// Proximity of target node `id` to pattern node `pattern_id`, unnormalized.
    pub fn information_proximity(&self, graph: &AmrGraph, id: &str, pattern: &AmrGraph, pattern_id: &str) -> f64 {
        let mut search = ProximitySearch::new(graph, pattern, self.scorer.as_ref(), self.index);
        search.information_proximity(id, pattern_id, &mut HashMap::new())
    }

    /// Every target node with a positive score, normalized and sorted best
    /// first. Ties keep graph order. A pattern without a placeholder yields
    /// an empty ranking.
    pub fn search_pattern(
        &self,
        graph: &AmrGraph,
        pattern: &AmrGraph,
        placeholder: Option<&str>,
    ) -> MatchResult<Vec<ScoreResult>> {
        let Some(placeholder) = self.placeholder(pattern, placeholder)? else {
            tracing::debug!(instance = %self.placeholder_instance, "pattern has no placeholder");
            return Ok(Vec::new());
        };

        let mut search = ProximitySearch::new(graph, pattern, self.scorer.as_ref(), self.index);
        let mut results: Vec<ScoreResult> = graph
            .ids()
            .filter_map(|id| {
                let score = search.information_proximity(id, &placeholder, &mut HashMap::new());
                (score > 0.0).then(|| ScoreResult {
                    id: id.to_string(),
                    score,
                })
            })
            .collect();

        let ceiling = self.information_proximity(pattern, &placeholder, pattern, &placeholder);
        if ceiling > 0.0 {
            for r in &mut results {
                r.score /= ceiling;
            }
        }
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        tracing::debug!(placeholder = %placeholder, candidates = results.len(), ceiling, "ranked pattern matches");
        Ok(results)
    }

    /// [`search_pattern`](Self::search_pattern) returning ids only.
    pub fn search_pattern_ids(
        &self,
        graph: &AmrGraph,
        pattern: &AmrGraph,
        placeholder: Option<&str>,
    ) -> MatchResult<Vec<String>> {
        Ok(self
            .search_pattern(graph, pattern, placeholder)?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    /// Run a [`PatternQuery`].
    pub fn run(&self, graph: &AmrGraph, query: &PatternQuery<'_>) -> MatchResult<Ranking> {
        let results = self.search_pattern(graph, query.pattern, query.placeholder.as_deref())?;
        Ok(if query.ids_only {
            Ranking::Ids(results.into_iter().map(|r| r.id).collect())
        } else {
            Ranking::Scored(results)
        })
    }
}

/// Rank with the default scorer and placeholder concept.
pub fn search_pattern(
    graph: &AmrGraph,
    pattern: &AmrGraph,
    placeholder: Option<&str>,
) -> MatchResult<Vec<ScoreResult>> {
    PatternMatcher::default().search_pattern(graph, pattern, placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn who_wants() -> AmrGraph {
        AmrGraph::from_triples([
            ("w", ":instance", "want-01"),
            ("w", ":arg0", "u"),
            ("u", ":instance", "amr-unknown"),
        ])
    }

    #[test]
    fn placeholder_resolution() {
        let m = PatternMatcher::default();
        assert_eq!(m.placeholder(&who_wants(), None).unwrap().as_deref(), Some("u"));
        assert_eq!(m.placeholder(&who_wants(), Some("w")).unwrap().as_deref(), Some("w"));
        let err = m.placeholder(&who_wants(), Some("nope")).unwrap_err();
        assert!(matches!(err, MatchError::UnknownPlaceholder { .. }));
        assert_eq!(m.placeholder(&want_boy(), None).unwrap(), None);
    }

    #[test]
    fn agent_of_want_ranks_first() {
        let ranking = search_pattern(&want_boy(), &who_wants(), None).unwrap();
        assert_eq!(ranking[0].id, "b");
        assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn missing_placeholder_is_empty() {
        let ranking = search_pattern(&want_boy(), &want_boy(), None).unwrap();
        assert!(ranking.is_empty());
    }

    #[test]
    fn ids_only_query() {
        let pattern = who_wants();
        let m = PatternMatcher::default();
        let ranking = m.run(&want_boy(), &PatternQuery::new(&pattern).ids_only()).unwrap();
        assert!(matches!(ranking, Ranking::Ids(_)));
        assert_eq!(ranking.ids()[0], "b");
    }

    #[test]
    fn custom_scorer_is_used() {
        let m = PatternMatcher::default().with_scorer(|_: &str, _: &str, _: &AmrGraph, _: &AmrGraph| 0.0);
        let ranking = m.search_pattern(&want_boy(), &who_wants(), None).unwrap();
        // Zero relevance everywhere still leaves the base score.
        assert_eq!(ranking.len(), want_boy().len());
        assert!(ranking.iter().all(|r| r.score == 1.0));
    }
}
