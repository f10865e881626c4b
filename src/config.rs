use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolve::Threshold;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    #[serde(default = "default_min_confidence_score")]
    pub min_confidence_score: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_confidence_score: default_min_confidence_score(),
        }
    }
}

fn default_min_confidence_score() -> f64 {
    Threshold::DEFAULT_SCORE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Local registry document used instead of the bundled one.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Source for `registry update`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Worker threads; 0 uses every available CPU.
    #[serde(default)]
    pub jobs: usize,
    #[serde(default = "default_title_column")]
    pub title_column: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            title_column: default_title_column(),
        }
    }
}

fn default_title_column() -> String {
    "title".to_string()
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gpumatch").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Fuzzy threshold from the CLI override, else the config file.
    pub fn threshold(&self, cli_override: Option<f64>) -> Result<Threshold> {
        let score = cli_override.unwrap_or(self.matching.min_confidence_score);
        Threshold::new(score).context("Invalid min confidence score")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matching.min_confidence_score, 80.0);
        assert_eq!(config.registry.cache_ttl_seconds, 86400);
        assert_eq!(config.batch.title_column, "title");
        assert_eq!(config.batch.jobs, 0);
        assert!(config.registry.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml("[matching]\nmin_confidence_score = 85.5\n").unwrap();
        assert_eq!(config.matching.min_confidence_score, 85.5);
        assert_eq!(config.batch.title_column, "title");
    }

    #[test]
    fn test_threshold_override() {
        let config = Config::default();
        assert_eq!(config.threshold(None).unwrap().score(), 80.0);
        assert_eq!(config.threshold(Some(90.0)).unwrap().score(), 90.0);
        assert!(config.threshold(Some(180.0)).is_err());
    }

    #[test]
    fn test_invalid_config_from_file_is_rejected_at_use() {
        let config = Config::from_toml("[matching]\nmin_confidence_score = -3.0\n").unwrap();
        assert!(config.threshold(None).is_err());
    }
}
