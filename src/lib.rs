// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # amr-algebra
//!
//! Graph algebra and heuristic pattern matching over Abstract Meaning
//! Representation (AMR) graphs.
//!
//! ## Architecture
//!
//! - **Graph model** (`graph`): ordered node → relation-list maps, triple
//!   conversion, label-pattern search and a petgraph projection for
//!   structural checks
//! - **Labels** (`label`, `lexicon`): exact/regex label patterns, inverse
//!   relations and the static AMR tables
//! - **Reification** (`reify`): bidirectional relation ↔ concept index
//! - **Composition** (`join`): append, replace and merge with id
//!   reconciliation and post-join cleanup
//! - **Matching** (`matcher`): information-proximity ranking of target nodes
//!   against a pattern placeholder
//! - **Configuration** (`config`): TOML-loaded engine parameters
//!
//! ## Library usage
//!
//! ```no_run
//! use amr_algebra::graph::AmrGraph;
//! use amr_algebra::join::{JoinEngine, JoinRequest};
//!
//! let want = AmrGraph::from_triples([
//!     ("w", ":instance", "want-01"),
//!     ("w", ":arg0", "p"),
//!     ("p", ":instance", "person"),
//! ]);
//! let go = AmrGraph::from_triples([("g", ":instance", "go-01")]);
//! let outcome = JoinEngine::default()
//!     .join(&want, &JoinRequest::append(go, ":arg1"), None)
//!     .unwrap();
//! println!("{}", outcome.graph);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod join;
pub mod label;
pub mod lexicon;
pub mod matcher;
pub mod reify;

pub use config::AlgebraConfig;
pub use error::{AlgebraError, AlgebraResult};
pub use graph::{AmrGraph, Relation};
pub use join::{AlgParams, IdRange, JoinEngine, JoinMode, JoinOutcome, JoinRequest};
pub use label::LabelPattern;
pub use matcher::{PatternMatcher, PatternQuery, Ranking, ScoreResult};
