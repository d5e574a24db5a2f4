//! Rich diagnostic error types for amr-algebra.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly which part of a
//! composition or query request was impossible to honour.
//!
//! The engines are pure computations: most malformed inputs have a defined
//! fallback (empty side, default root, empty ranking). Errors are reserved for
//! requests that cannot be carried out at all.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for amr-algebra.
#[derive(Debug, Error, Diagnostic)]
pub enum AlgebraError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("unknown node: \"{id}\"")]
    #[diagnostic(
        code(amr::graph::unknown_node),
        help(
            "The identifier is neither a node of the graph nor the target of any relation. \
             Check the variable name against the graph's keys."
        )
    )]
    UnknownNode { id: String },

    #[error("{side} graph has no root")]
    #[diagnostic(
        code(amr::graph::no_root),
        help(
            "Every node of the graph has an incoming relation, so no root can be chosen. \
             Break the cycle through the top node or pass an explicit id range."
        )
    )]
    NoRoot { side: String },

    #[error("graph JSON error: {message}")]
    #[diagnostic(
        code(amr::graph::json),
        help(
            "Graphs are JSON objects mapping node ids to lists of [relation, target] pairs, \
             e.g. {{\"w\": [[\":instance\", \"want-01\"], [\":arg0\", \"b\"]]}}."
        )
    )]
    Json { message: String },
}

// ---------------------------------------------------------------------------
// Label pattern errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("invalid label pattern /{pattern}/: {message}")]
    #[diagnostic(
        code(amr::pattern::invalid_regex),
        help(
            "Label patterns written between slashes are compiled as regular expressions. \
             Escape special characters, or drop the slashes to match the label exactly."
        )
    )]
    InvalidRegex { pattern: String, message: String },
}

// ---------------------------------------------------------------------------
// Join errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum JoinError {
    #[error("unknown identifier \"{id}\" in the {side} range")]
    #[diagnostic(
        code(amr::join::unknown_identifier),
        help(
            "Range ids must name a node (or a relation target) of their own graph. \
             Piece range ids use the piece's original ids; they are renamed automatically."
        )
    )]
    UnknownIdentifier { id: String, side: String },

    #[error("invalid join entity \"{entity}\"")]
    #[diagnostic(
        code(amr::join::invalid_join_entity),
        help("The join entity is the concept used to glue nodes together, e.g. \"and\". It must not be empty.")
    )]
    InvalidJoinEntity { entity: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Matcher errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MatchError {
    #[error("placeholder \"{id}\" is not a node of the pattern graph")]
    #[diagnostic(
        code(amr::matcher::unknown_placeholder),
        help(
            "Pass the id of a pattern node, or omit the placeholder to use the first \
             node whose instance is the configured placeholder instance (\"amr-unknown\")."
        )
    )]
    UnknownPlaceholder { id: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(amr::config::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(amr::config::parse),
        help("Check the TOML syntax. Known sections are [join] and [matcher].")
    )]
    Parse { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),
}

/// Convenience result type for top-level operations.
pub type AlgebraResult<T> = std::result::Result<T, AlgebraError>;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Result type for label pattern compilation.
pub type PatternResult<T> = std::result::Result<T, PatternError>;

/// Result type for join operations.
pub type JoinResult<T> = std::result::Result<T, JoinError>;

/// Result type for pattern searches.
pub type MatchResult<T> = std::result::Result<T, MatchError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_error_wraps_into_top_level() {
        let err: AlgebraError = JoinError::UnknownIdentifier {
            id: "q".into(),
            side: "piece".into(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown identifier \"q\" in the piece range");
    }

    #[test]
    fn diagnostic_codes_are_namespaced() {
        let err = GraphError::NoRoot {
            side: "destination".into(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("amr::graph::no_root"));
    }
}
