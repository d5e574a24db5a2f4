//! Relation labels and the label patterns used to filter them.
//!
//! A [`LabelPattern`] is either an exact string or a regular expression. The
//! same type filters relation labels in [`search`](crate::graph::query::search),
//! instance names in the not-joinable entity lists, and the reification
//! candidates produced by [`ReificationIndex`](crate::reify::ReificationIndex).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PatternError, PatternResult};
use crate::graph::INSTANCE;
use crate::lexicon::NOT_INVERSES;

static RE_LIST_RELATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(op|sn)\d+$").unwrap());

static RE_TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+$").unwrap());

/// A closed matcher over labels: exact equality or (unanchored) regex search.
#[derive(Debug, Clone)]
pub enum LabelPattern {
    /// Matches only the identical string.
    Exact(String),
    /// Matches any string in which the expression finds a match.
    Regex(Regex),
}

impl LabelPattern {
    /// An exact-match pattern.
    pub fn exact(label: impl Into<String>) -> Self {
        Self::Exact(label.into())
    }

    /// Compile a regular-expression pattern.
    pub fn regex(pattern: &str) -> PatternResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Parse the textual form used in configuration files: `/expr/` is a
    /// regular expression, anything else an exact label.
    pub fn parse(text: &str) -> PatternResult<Self> {
        match text
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(expr) if text.len() >= 2 => Self::regex(expr),
            _ => Ok(Self::exact(text)),
        }
    }

    /// Whether `candidate` satisfies this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Exact(s) => s == candidate,
            Self::Regex(re) => re.is_match(candidate),
        }
    }
}

impl From<&str> for LabelPattern {
    fn from(label: &str) -> Self {
        Self::exact(label)
    }
}

impl From<String> for LabelPattern {
    fn from(label: String) -> Self {
        Self::Exact(label)
    }
}

impl From<Regex> for LabelPattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl PartialEq for LabelPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for LabelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "{s}"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// True if any pattern in `patterns` matches `candidate`.
pub fn matches_any(candidate: &str, patterns: &[LabelPattern]) -> bool {
    patterns.iter().any(|p| p.matches(candidate))
}

/// The syntactic inverse of a relation label.
///
/// `:location-of` becomes `:location` and `:location` becomes `:location-of`.
/// Labels listed in [`NOT_INVERSES`] (such as `:consist-of`) are forward roles
/// that merely end in `-of`, so they gain another suffix instead.
pub fn inverse(label: &str) -> String {
    match label.strip_suffix("-of") {
        Some(base) if !NOT_INVERSES.contains(&label) => base.to_string(),
        _ => format!("{label}-of"),
    }
}

/// Whether two labels are equal or each other's inverse.
pub fn equivalent_or_inverse(a: &str, b: &str) -> bool {
    a == b || a == inverse(b) || b == inverse(a)
}

/// Whether `label` belongs to a numbered list family (`:opN`, `:snN`).
pub fn is_list_relation(label: &str) -> bool {
    RE_LIST_RELATION.is_match(label)
}

/// Strip the trailing number of a numbered relation: `:op3` → `:op`.
pub fn relation_family(label: &str) -> &str {
    match RE_TRAILING_NUMBER.find(label) {
        Some(m) => &label[..m.start()],
        None => label,
    }
}

/// Whether `label` is the reserved concept slot.
pub fn is_instance(label: &str) -> bool {
    label == INSTANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_regex_matching() {
        let exact = LabelPattern::exact(":arg0");
        assert!(exact.matches(":arg0"));
        assert!(!exact.matches(":arg0-of"));

        let re = LabelPattern::regex(r"^:arg\d$").unwrap();
        assert!(re.matches(":arg1"));
        assert!(!re.matches(":arg1-of"));
    }

    #[test]
    fn parse_slash_delimited_as_regex() {
        assert_eq!(
            LabelPattern::parse("/^name$/").unwrap(),
            LabelPattern::regex("^name$").unwrap()
        );
        assert_eq!(LabelPattern::parse("name").unwrap(), LabelPattern::exact("name"));
        assert_eq!(LabelPattern::parse("/").unwrap(), LabelPattern::exact("/"));
        assert!(LabelPattern::parse("/(unclosed/").is_err());
    }

    #[test]
    fn inverse_round_trips() {
        assert_eq!(inverse(":location"), ":location-of");
        assert_eq!(inverse(":location-of"), ":location");
        assert_eq!(inverse(":consist-of"), ":consist-of-of");
        assert!(equivalent_or_inverse(":arg0", ":arg0-of"));
        assert!(!equivalent_or_inverse(":arg0", ":arg1"));
    }

    #[test]
    fn list_relations_and_families() {
        assert!(is_list_relation(":op1"));
        assert!(is_list_relation(":sn12"));
        assert!(!is_list_relation(":arg1"));
        assert!(!is_list_relation(":op"));
        assert_eq!(relation_family(":op12"), ":op");
        assert_eq!(relation_family(":mod"), ":mod");
    }
}
