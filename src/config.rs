//! Engine configuration loading.
//!
//! A small TOML file covers the tunables; every field has a default so an
//! empty file (or no file at all, via [`EngineConfig::default`]) works.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration load errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the flood engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Multiplier applied to `penalty` when seeding a newly tracked user.
    /// Partial starting credit: more than one message, less than a full
    /// burst allowance.
    #[serde(default = "default_seed_factor")]
    pub seed_factor: f64,

    /// Kick reason used for flood kicks.
    #[serde(default = "default_kick_reason")]
    pub kick_reason: String,

    /// SQLite database path for the bundled metadata store
    /// (":memory:" for tests).
    #[serde(default = "default_database")]
    pub database: String,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_factor: default_seed_factor(),
            kick_reason: default_kick_reason(),
            database: default_database(),
        }
    }
}

fn default_seed_factor() -> f64 {
    1.8
}

fn default_kick_reason() -> String {
    "Flooding".to_string()
}

fn default_database() -> String {
    "floodserv.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.seed_factor, 1.8);
        assert_eq!(config.kick_reason, "Flooding");
        assert_eq!(config.database, "floodserv.db");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("seed_factor = 2.0").unwrap();
        assert_eq!(config.seed_factor, 2.0);
        assert_eq!(config.kick_reason, "Flooding");
    }

    #[test]
    fn empty_toml_is_valid() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.seed_factor, 1.8);
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floodserv.toml");
        std::fs::write(&path, "kick_reason = \"No flooding\"\ndatabase = \":memory:\"\n")
            .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.kick_reason, "No flooding");
        assert_eq!(config.database, ":memory:");

        assert!(matches!(
            EngineConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
