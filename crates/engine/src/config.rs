//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! is a valid configuration:
//!
//! ```json
//! {
//!   "factors": { "dimensions": 20, "iterations": 15, "regularization": 0.1, "seed": 42 },
//!   "collaborative": { "max_neighbours": 100 }
//! }
//! ```

use crate::error::{RecommendationError, Result};
use recommenders::{DEFAULT_MAX_NEIGHBOURS, FactorConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Latent factor training
    pub factors: FactorConfig,

    pub collaborative: CollaborativeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollaborativeConfig {
    /// Upper bound on neighbours averaged per request
    pub max_neighbours: usize,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            max_neighbours: DEFAULT_MAX_NEIGHBOURS,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| RecommendationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            RecommendationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.factors
            .validate()
            .map_err(|e| RecommendationError::Config(e.to_string()))?;
        if self.collaborative.max_neighbours == 0 {
            return Err(RecommendationError::Config(
                "collaborative.max_neighbours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.factors.dimensions, 20);
        assert_eq!(config.collaborative.max_neighbours, 100);
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json(r#"{"factors": {"dimensions": 8, "seed": 7}}"#).unwrap();
        assert_eq!(config.factors.dimensions, 8);
        assert_eq!(config.factors.seed, 7);
        assert_eq!(config.factors.iterations, 15);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_json(r#"{"factors": {"regularization": -1.0}}"#).unwrap_err();
        assert!(matches!(err, RecommendationError::Config(_)));

        let err =
            EngineConfig::from_json(r#"{"collaborative": {"max_neighbours": 0}}"#).unwrap_err();
        assert!(matches!(err, RecommendationError::Config(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(RecommendationError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"factorz": {}}"#),
            Err(RecommendationError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
