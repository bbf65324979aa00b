//! Engine configuration.
//!
//! Every tunable of the feedback loop in one place. Loaded from TOML; fields
//! missing from the file keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::system_state::StateDynamics;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config value out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Statements whose `|feedback score|` exceeds this get adapted.
    pub feedback_threshold: f64,
    /// Primitives ignore feedback with magnitude at or below this.
    pub adaptation_threshold: f64,
    /// Smoothing factor for primitive metric updates.
    pub learning_rate: f64,
    pub stability_sensitivity: f64,
    pub stability_floor: f64,
    pub complexity_retention: f64,
    pub complexity_gain: f64,
    /// Purpose objectives generate statements only above this priority.
    pub objective_priority_threshold: f64,
    /// Skip generated statements whose content already exists.
    pub deduplicate_generated: bool,
    /// Fixed RNG seed; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let dynamics = StateDynamics::default();
        Self {
            feedback_threshold: 0.6,
            adaptation_threshold: 0.7,
            learning_rate: 0.1,
            stability_sensitivity: dynamics.stability_sensitivity,
            stability_floor: dynamics.stability_floor,
            complexity_retention: dynamics.complexity_retention,
            complexity_gain: dynamics.complexity_gain,
            objective_priority_threshold: 0.8,
            deduplicate_generated: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Load a TOML file, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Using default engine config");
                Self::default()
            }
        }
    }

    /// Render as TOML.
    ///
    /// Fails for values TOML cannot hold, such as a seed above `i64::MAX`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every rate and threshold is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("feedback_threshold", self.feedback_threshold),
            ("adaptation_threshold", self.adaptation_threshold),
            ("stability_sensitivity", self.stability_sensitivity),
            ("stability_floor", self.stability_floor),
            ("complexity_retention", self.complexity_retention),
            ("complexity_gain", self.complexity_gain),
            ("objective_priority_threshold", self.objective_priority_threshold),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "learning_rate",
                value: self.learning_rate,
            });
        }

        Ok(())
    }

    /// The state-update tunables.
    pub fn dynamics(&self) -> StateDynamics {
        StateDynamics {
            stability_sensitivity: self.stability_sensitivity,
            stability_floor: self.stability_floor,
            complexity_retention: self.complexity_retention,
            complexity_gain: self.complexity_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.feedback_threshold, 0.6);
        assert_eq!(config.adaptation_threshold, 0.7);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.objective_priority_threshold, 0.8);
        assert!(!config.deduplicate_generated);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            feedback_threshold = 0.5
            seed = 42
            deduplicate_generated = true
            "#,
        )
        .unwrap();

        assert_eq!(config.feedback_threshold, 0.5);
        assert_eq!(config.seed, Some(42));
        assert!(config.deduplicate_generated);
        // Untouched fields keep defaults
        assert_eq!(config.adaptation_threshold, 0.7);
    }

    #[test]
    fn test_out_of_range() {
        let err = EngineConfig::from_toml_str("stability_floor = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: "stability_floor", .. }
        ));

        let err = EngineConfig::from_toml_str("learning_rate = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "learning_rate", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("feedback_threshold = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/definitely/not/here/engine.toml");
        assert!(matches!(EngineConfig::load(path), Err(ConfigError::Io { .. })));
        assert_eq!(EngineConfig::load_or_default(path), EngineConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig {
            seed: Some(7),
            ..Default::default()
        };
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("seed = 7"));
        assert_eq!(EngineConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_unrepresentable_seed_fails_to_render() {
        let config = EngineConfig {
            seed: Some(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(config.to_toml(), Err(ConfigError::Serialize(_))));

        let config = EngineConfig {
            seed: Some(i64::MAX as u64),
            ..Default::default()
        };
        let rendered = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_dynamics() {
        let dynamics = EngineConfig::default().dynamics();
        assert_eq!(dynamics, StateDynamics::default());
    }
}
