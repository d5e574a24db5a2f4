//! Flat triple lists.
//!
//! A triple list round-trips with [`AmrGraph`] up to regrouping: converting a
//! list back into a graph collects each subject's relations in their relative
//! order, and orders nodes by the first appearance of their subject. Lists in
//! which a subject's triples are interleaved with other subjects' come back
//! grouped.

use serde::{Deserialize, Serialize};

use super::{AmrGraph, Relation};

/// A `(subject, predicate, object)` triple of strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct Triple {
    /// Subject node id.
    pub subject: String,
    /// Relation label.
    pub predicate: String,
    /// Object node id or literal.
    pub object: String,
}

impl Triple {
    /// Create a triple.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl From<(String, String, String)> for Triple {
    fn from((subject, predicate, object): (String, String, String)) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl From<Triple> for (String, String, String) {
    fn from(t: Triple) -> Self {
        (t.subject, t.predicate, t.object)
    }
}

impl From<(&str, &str, &str)> for Triple {
    fn from((s, p, o): (&str, &str, &str)) -> Self {
        Self::new(s, p, o)
    }
}

/// Flatten a graph into triples, node by node.
pub fn to_triples(graph: &AmrGraph) -> Vec<Triple> {
    graph
        .relations_iter()
        .map(|(subject, r)| Triple::new(subject, r.label.as_str(), r.target.as_str()))
        .collect()
}

impl AmrGraph {
    /// Group triples by subject into a graph.
    pub fn from_triples<I, T>(triples: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Triple>,
    {
        let mut graph = AmrGraph::new();
        for t in triples {
            let t = t.into();
            match graph.relations_mut(&t.subject) {
                Some(rels) => rels.push(Relation::new(t.predicate, t.object)),
                None => graph.insert(t.subject, vec![Relation::new(t.predicate, t.object)]),
            }
        }
        graph
    }

    /// Flatten into triples.
    pub fn to_triples(&self) -> Vec<Triple> {
        to_triples(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_triples_round_trip_exactly() {
        let triples = vec![
            Triple::new("w", ":instance", "want-01"),
            Triple::new("w", ":arg0", "b"),
            Triple::new("b", ":instance", "boy"),
        ];
        let graph = AmrGraph::from_triples(triples.clone());
        assert_eq!(graph.to_triples(), triples);
    }

    #[test]
    fn interleaved_subjects_are_regrouped() {
        let graph = AmrGraph::from_triples([
            ("w", ":instance", "want-01"),
            ("b", ":instance", "boy"),
            ("w", ":arg0", "b"),
        ]);
        assert_eq!(
            graph.to_triples(),
            vec![
                Triple::new("w", ":instance", "want-01"),
                Triple::new("w", ":arg0", "b"),
                Triple::new("b", ":instance", "boy"),
            ]
        );
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_string(&Triple::new("w", ":arg0", "b")).unwrap();
        assert_eq!(json, r#"["w",":arg0","b"]"#);
    }
}
