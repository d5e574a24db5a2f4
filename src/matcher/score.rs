//! Node scoring strategies.

use crate::graph::AmrGraph;
use crate::lexicon;

/// Relevance of target node `id` for pattern node `pattern_id`.
///
/// Larger is better; `0.0` means "no match" and prunes that branch of the
/// search early.
pub trait ScoreFn {
    fn score(&self, id: &str, pattern_id: &str, graph: &AmrGraph, pattern: &AmrGraph) -> f64;
}

impl<F> ScoreFn for F
where
    F: Fn(&str, &str, &AmrGraph, &AmrGraph) -> f64,
{
    fn score(&self, id: &str, pattern_id: &str, graph: &AmrGraph, pattern: &AmrGraph) -> f64 {
        self(id, pattern_id, graph, pattern)
    }
}

/// Instance equality with a half-score for joker concepts.
///
/// A target leaf scores 1 only against the identical pattern id. A target
/// node scores 1 when its concept equals the pattern node's, 0.5 when
/// either concept is a joker (`and`, `or`, `multi-sentence`, `amr-unknown`),
/// 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScorer;

impl ScoreFn for DefaultScorer {
    fn score(&self, id: &str, pattern_id: &str, graph: &AmrGraph, pattern: &AmrGraph) -> f64 {
        let instance = graph.instance_of(id);
        if instance.is_empty() {
            return if id == pattern_id { 1.0 } else { 0.0 };
        }
        let pattern_instance = pattern.instance_of(pattern_id);
        if instance == pattern_instance {
            1.0
        } else if lexicon::is_joker(instance) || lexicon::is_joker(pattern_instance) {
            0.5
        } else {
            0.0
        }
    }
}
