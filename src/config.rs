//! TOML configuration for the join and matcher engines.
//!
//! ```toml
//! [join]
//! entity = "and"
//! relation = ":op"
//! not_joinable_relations = ["/^:instance$/"]
//! not_joinable_entities = ["/^name$/"]
//!
//! [matcher]
//! placeholder_instance = "amr-unknown"
//! ```
//!
//! Every key is optional. Label lists use the [`LabelPattern::parse`] form:
//! `/expr/` is a regular expression, anything else an exact label.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::join::{AlgParams, JoinEngine, JoinRequest};
use crate::label::LabelPattern;
use crate::lexicon::{DEFAULT_JOIN_ENTITY, DEFAULT_JOIN_RELATION, PLACEHOLDER_INSTANCE};
use crate::matcher::PatternMatcher;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgebraConfig {
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// `[join]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Concept used for glue nodes.
    #[serde(default = "default_entity")]
    pub entity: String,
    /// Numbered relation family under glue nodes.
    #[serde(default = "default_relation")]
    pub relation: String,
    #[serde(default = "default_not_joinable_relations")]
    pub not_joinable_relations: Vec<String>,
    #[serde(default = "default_not_joinable_entities")]
    pub not_joinable_entities: Vec<String>,
}

/// `[matcher]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Concept marking the default placeholder node of a pattern.
    #[serde(default = "default_placeholder_instance")]
    pub placeholder_instance: String,
}

fn default_entity() -> String {
    DEFAULT_JOIN_ENTITY.to_string()
}

fn default_relation() -> String {
    DEFAULT_JOIN_RELATION.to_string()
}

fn default_not_joinable_relations() -> Vec<String> {
    vec!["/^:instance$/".to_string()]
}

fn default_not_joinable_entities() -> Vec<String> {
    vec!["/^name$/".to_string()]
}

fn default_placeholder_instance() -> String {
    PLACEHOLDER_INSTANCE.to_string()
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            entity: default_entity(),
            relation: default_relation(),
            not_joinable_relations: default_not_joinable_relations(),
            not_joinable_entities: default_not_joinable_entities(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            placeholder_instance: default_placeholder_instance(),
        }
    }
}

impl AlgebraConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Compile the not-joinable label lists.
    pub fn alg_params(&self) -> ConfigResult<AlgParams> {
        Ok(AlgParams {
            not_joinable_relations: compile(&self.join.not_joinable_relations)?,
            not_joinable_entities: compile(&self.join.not_joinable_entities)?,
        })
    }

    pub fn join_engine(&self) -> ConfigResult<JoinEngine> {
        Ok(JoinEngine::new(self.alg_params()?))
    }

    pub fn pattern_matcher(&self) -> PatternMatcher {
        PatternMatcher::default().with_placeholder_instance(self.matcher.placeholder_instance.clone())
    }

    /// Stamp the configured join entity and relation onto `request`.
    pub fn configure(&self, request: JoinRequest) -> JoinRequest {
        request
            .with_join_entity(self.join.entity.clone())
            .with_join_relation(self.join.relation.clone())
    }
}

fn compile(patterns: &[String]) -> ConfigResult<Vec<LabelPattern>> {
    patterns
        .iter()
        .map(|p| LabelPattern::parse(p).map_err(ConfigError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_params() {
        let params = AlgebraConfig::default().alg_params().unwrap();
        assert!(params.not_joinable_relations[0].matches(":instance"));
        assert!(!params.not_joinable_relations[0].matches(":instance-of"));
        assert!(params.not_joinable_entities[0].matches("name"));
        assert_eq!(AlgebraConfig::from_toml_str("").unwrap(), AlgebraConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = AlgebraConfig::from_toml_str(
            r#"
            [join]
            entity = "or"
            not_joinable_entities = ["name", "/^date-/"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.join.entity, "or");
        assert_eq!(cfg.join.relation, ":op");
        assert_eq!(cfg.matcher.placeholder_instance, "amr-unknown");

        let params = cfg.alg_params().unwrap();
        assert!(params.not_joinable_entities[0].matches("name"));
        assert!(params.not_joinable_entities[1].matches("date-entity"));

        let request = cfg.configure(JoinRequest::replace(crate::graph::AmrGraph::new()));
        assert_eq!(request.join_entity, "or");
        assert_eq!(request.join_relation, ":op");
    }

    #[test]
    fn bad_inputs_are_reported() {
        let err = AlgebraConfig::from_toml_str("[join\nentity = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let cfg = AlgebraConfig::from_toml_str("[join]\nnot_joinable_relations = [\"/(/\"]").unwrap();
        let err = cfg.alg_params().unwrap_err();
        assert!(matches!(err, ConfigError::Pattern(_)));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("amr.toml");
        std::fs::write(&path, "[matcher]\nplaceholder_instance = \"thing\"\n").unwrap();

        let cfg = AlgebraConfig::load(&path).unwrap();
        assert_eq!(cfg.matcher.placeholder_instance, "thing");

        let err = AlgebraConfig::load(&tmp.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
