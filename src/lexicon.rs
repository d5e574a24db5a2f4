//! Static AMR vocabulary tables.
//!
//! Immutable, process-wide data consumed by the reification index, the join
//! engine and the default scorer. Nothing here is ever mutated at runtime, so
//! the tables are plain `static` slices shared freely across callers.

/// A relation together with the event concepts that can stand in for it.
pub struct Reification {
    /// Relation label, e.g. `:location`.
    pub relation: &'static str,
    /// Concepts reifying the relation, e.g. `be-located-at-91`.
    pub instances: &'static [&'static str],
}

/// The reification table.
///
/// Sorted by relation label.
pub static REIFICATIONS: &[Reification] = &[
    Reification { relation: ":accompanier", instances: &["accompany-01"] },
    Reification { relation: ":age", instances: &["age-01"] },
    Reification { relation: ":beneficiary", instances: &["benefit-01", "receive-01"] },
    Reification { relation: ":cause", instances: &["cause-01"] },
    Reification { relation: ":concession", instances: &["have-concession-91"] },
    Reification { relation: ":condition", instances: &["have-condition-91"] },
    Reification { relation: ":cost", instances: &["cost-01"] },
    Reification { relation: ":degree", instances: &["have-degree-91"] },
    Reification { relation: ":destination", instances: &["be-destined-for-91"] },
    Reification { relation: ":duration", instances: &["last-01"] },
    Reification { relation: ":employed-by", instances: &["have-org-role-91"] },
    Reification { relation: ":example", instances: &["exemplify-01"] },
    Reification { relation: ":extent", instances: &["have-extent-91"] },
    Reification { relation: ":frequency", instances: &["have-frequency-91"] },
    Reification { relation: ":instrument", instances: &["have-instrument-91"] },
    Reification { relation: ":li", instances: &["have-li-91"] },
    Reification { relation: ":location", instances: &["be-located-at-91"] },
    Reification { relation: ":manner", instances: &["have-manner-91"] },
    Reification { relation: ":meaning", instances: &["mean-01"] },
    Reification { relation: ":mod", instances: &["have-mod-91"] },
    Reification { relation: ":name", instances: &["have-name-91"] },
    Reification { relation: ":ord", instances: &["have-ord-91"] },
    Reification { relation: ":part", instances: &["have-part-91"] },
    Reification { relation: ":polarity", instances: &["have-polarity-91"] },
    Reification { relation: ":poss", instances: &["have-03", "own-01"] },
    Reification { relation: ":purpose", instances: &["have-purpose-91"] },
    Reification { relation: ":quant", instances: &["have-quant-91"] },
    Reification { relation: ":role", instances: &["have-org-role-91"] },
    Reification { relation: ":source", instances: &["be-from-91"] },
    Reification { relation: ":subevent", instances: &["have-subevent-91"] },
    Reification { relation: ":subset", instances: &["include-91"] },
    Reification { relation: ":superset", instances: &["include-91"] },
    Reification { relation: ":time", instances: &["be-temporally-at-91"] },
    Reification { relation: ":topic", instances: &["concern-02"] },
    Reification { relation: ":value", instances: &["have-value-91"] },
];

/// Reifying instances that stand for a preposition rather than a role.
///
/// Their stem is a `:prep-*` relation and is never inverted.
pub static PREPOSITIONS: &[&str] = &["say-01", "instead-of-91", "rate-entity-91", "regardless-91"];

/// Relations that end in `-of` without being inverse roles.
pub static NOT_INVERSES: &[&str] = &[":consist-of"];

/// Concepts that conjoin their children.
pub static CONJUNCTIONS: &[&str] = &["cause-01", "contrast-01", "and", "or"];

/// Concepts usable as glue nodes when two entities cannot be unified.
pub static JOIN_ENTITIES: &[&str] = &["and", "or", "multi-sentence"];

/// Concepts that partially match anything under the default scorer.
pub static JOKER_INSTANCES: &[&str] = &["and", "or", "multi-sentence", "amr-unknown"];

/// Instance of the default pattern placeholder.
pub const PLACEHOLDER_INSTANCE: &str = "amr-unknown";

/// Default join-entity concept.
pub const DEFAULT_JOIN_ENTITY: &str = "and";

/// Default join relation family.
pub const DEFAULT_JOIN_RELATION: &str = ":op";

/// Words dropped when guessing the surface word of an instance name.
pub static IGNORED_INSTANCE_WORDS: &[&str] = &["have", "be"];

/// English prepositions (and articles), sorted for binary search.
pub static PREPOSITION_WORDS: &[&str] = &[
    "a", "abaft", "aboard", "about", "above", "absent", "across", "afore", "after", "against",
    "along", "alongside", "amid", "amidst", "among", "amongst", "an", "anenst", "apropos", "apud",
    "around", "as", "aside", "astride", "at", "athwart", "atop", "barring", "before", "behind",
    "below", "beneath", "beside", "besides", "between", "beyond", "but", "by", "circa",
    "concerning", "despite", "down", "during", "except", "excluding", "failing", "following",
    "for", "forenenst", "from", "given", "in", "including", "inside", "into", "lest", "like",
    "mid", "midst", "minus", "modulo", "near", "next", "notwithstanding", "of", "off", "on",
    "onto", "opposite", "out", "outside", "over", "pace", "past", "per", "plus", "pro", "qua",
    "regarding", "round", "sans", "save", "since", "than", "through", "throughout", "till",
    "times", "to", "toward", "towards", "under", "underneath", "unlike", "until", "unto", "up",
    "upon", "versus", "via", "vice", "with", "within", "without", "worth",
];

/// Whether `word` is a known preposition.
pub fn is_preposition_word(word: &str) -> bool {
    PREPOSITION_WORDS.binary_search(&word).is_ok()
}

/// Whether `instance` is a preposition reification.
pub fn is_preposition_reification(instance: &str) -> bool {
    PREPOSITIONS.contains(&instance)
}

/// Whether `instance` is a recognized join-entity concept.
pub fn is_join_entity(instance: &str) -> bool {
    JOIN_ENTITIES.contains(&instance)
}

/// Whether `instance` is a joker concept.
pub fn is_joker(instance: &str) -> bool {
    JOKER_INSTANCES.contains(&instance)
}
