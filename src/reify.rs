//! Reification index: relations and the event concepts that stand in for them.
//!
//! AMR can express `:location` either as an edge or as a `be-located-at-91`
//! node whose arguments are the edge's endpoints. The pattern matcher uses this
//! index to treat both forms as equivalent.
//!
//! ```
//! use amr_algebra::reify::ReificationIndex;
//!
//! let index = ReificationIndex::standard();
//! let relations = index.relation_from_reification("be-located-at-91");
//! assert!(relations.iter().any(|p| p.matches(":location")));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::label::{LabelPattern, inverse};
use crate::lexicon::{self, REIFICATIONS, Reification};

static STANDARD: LazyLock<ReificationIndex> = LazyLock::new(|| ReificationIndex::new(REIFICATIONS));

static RE_SENSE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-\d+$").unwrap());

/// Bidirectional, immutable view of a reification table.
#[derive(Debug, Clone)]
pub struct ReificationIndex {
    by_relation: HashMap<&'static str, &'static [&'static str]>,
    by_instance: HashMap<&'static str, Vec<&'static str>>,
}

impl ReificationIndex {
    /// Index a reification table.
    pub fn new(table: &'static [Reification]) -> Self {
        let mut by_relation = HashMap::with_capacity(table.len());
        let mut by_instance: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for entry in table {
            by_relation.insert(entry.relation, entry.instances);
            for &instance in entry.instances {
                by_instance.entry(instance).or_default().push(entry.relation);
            }
        }
        Self {
            by_relation,
            by_instance,
        }
    }

    /// The shared index over the built-in table.
    pub fn standard() -> &'static ReificationIndex {
        &STANDARD
    }

    /// Concepts reifying `relation`.
    pub fn reifications_of(&self, relation: &str) -> &[&'static str] {
        self.by_relation.get(relation).copied().unwrap_or_default()
    }

    /// Relations reified by `instance`.
    pub fn relations_reified_by(&self, instance: &str) -> &[&'static str] {
        self.by_instance
            .get(instance)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Candidate relation labels expressed by a node of concept `instance`.
    ///
    /// The sense number is stripped and the stem prefixed with `:` (plus its
    /// inverse), then every relation listing `instance` as a reification is
    /// added with its inverse. Preposition reifications map to `:prep-<stem>`
    /// and are never inverted. Leaves (`""`) yield nothing.
    pub fn relation_from_reification(&self, instance: &str) -> Vec<LabelPattern> {
        if instance.is_empty() {
            return Vec::new();
        }
        let stem = RE_SENSE_SUFFIX.replace(instance, "");
        let base = format!(":{stem}");
        let mut out = if lexicon::is_preposition_reification(instance) {
            vec![LabelPattern::exact(format!(":prep-{stem}")), LabelPattern::Exact(base)]
        } else {
            let inv = inverse(&base);
            vec![LabelPattern::Exact(base), LabelPattern::Exact(inv)]
        };
        for &relation in self.relations_reified_by(instance) {
            out.push(LabelPattern::exact(relation));
            out.push(LabelPattern::Exact(inverse(relation)));
        }
        out
    }

    /// Candidate instance patterns for nodes that reify `relation`.
    ///
    /// Regexes matching `<stem>-NN` and `<stem>` for the relation and its
    /// inverse, followed by the explicit table entries of both directions.
    pub fn reification_from_relation(&self, relation: &str) -> Vec<LabelPattern> {
        let inv = inverse(relation);
        let bare = regex::escape(relation.strip_prefix(':').unwrap_or(relation));
        let inv_bare = regex::escape(inv.strip_prefix(':').unwrap_or(&inv));

        let mut out: Vec<LabelPattern> = [
            format!("{bare}-[0-9]+$"),
            format!("{inv_bare}-[0-9]+$"),
            format!("{bare}$"),
            format!("{inv_bare}$"),
        ]
        .iter()
        .filter_map(|expr| Regex::new(expr).ok().map(LabelPattern::Regex))
        .collect();

        out.extend(self.reifications_of(relation).iter().map(|&i| LabelPattern::exact(i)));
        out.extend(self.reifications_of(&inv).iter().map(|&i| LabelPattern::exact(i)));

        if let Some(stem) = relation.strip_prefix(":prep-") {
            out.extend(
                lexicon::PREPOSITIONS
                    .iter()
                    .filter(|p| RE_SENSE_SUFFIX.replace(p, "") == stem)
                    .map(|&p| LabelPattern::exact(p)),
            );
        }
        out
    }
}

/// Guess the surface word behind an instance name: sense numbers, preposition
/// words and light verbs (`have`, `be`) are dropped and the longest remaining
/// part wins.
pub fn possible_word_from_instance(instance: &str) -> &str {
    if !instance.contains('-') {
        return instance;
    }
    let parts: Vec<&str> = instance.split('-').collect();
    parts
        .iter()
        .copied()
        .filter(|p| {
            !(p.chars().all(|c| c.is_ascii_digit())
                || lexicon::is_preposition_word(p)
                || lexicon::IGNORED_INSTANCE_WORDS.contains(p))
        })
        .fold(None::<&str>, |best, p| match best {
            Some(b) if b.len() >= p.len() => Some(b),
            _ => Some(p),
        })
        .unwrap_or(parts[0])
}
