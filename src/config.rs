use crate::learning::{LearnerConfig, RecommendationConfig};
use crate::search::DEFAULT_MAX_RESULTS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".codesensei";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State directory; `~/.codesensei/state` when unset
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    /// TOML file replacing the built-in stop words and synonyms
    pub lexicon_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            lexicon_path: None,
        }
    }
}

/// Learner hyper-parameters plus recommendation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub max_examples: usize,
    pub min_examples: usize,
    pub retrain_threshold: usize,
    pub top_n: usize,
    pub similarity_bonus: f64,
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        let learner = LearnerConfig::default();
        let recommendations = RecommendationConfig::default();
        Self {
            epochs: learner.epochs,
            learning_rate: learner.learning_rate,
            max_examples: learner.max_examples,
            min_examples: learner.min_examples,
            retrain_threshold: learner.retrain_threshold,
            top_n: recommendations.top_n,
            similarity_bonus: recommendations.similarity_bonus,
            seed: learner.seed,
        }
    }
}

impl LearningConfig {
    pub fn learner(&self) -> LearnerConfig {
        LearnerConfig {
            epochs: self.epochs,
            learning_rate: self.learning_rate,
            max_examples: self.max_examples,
            min_examples: self.min_examples,
            retrain_threshold: self.retrain_threshold,
            seed: self.seed,
        }
    }

    pub fn recommendations(&self) -> RecommendationConfig {
        RecommendationConfig {
            top_n: self.top_n,
            similarity_bonus: self.similarity_bonus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Reject queries that are not about programming or IT
    pub restrict_to_it: bool,
    /// Maximum stored queries per user
    pub history_limit: usize,
    /// JSON catalog replacing the built-in knowledge base
    pub catalog_path: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            restrict_to_it: true,
            history_limit: 100,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Resolved state directory
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::app_dir()?.join("state")),
        }
    }

    fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(APP_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.storage.dir.is_none());
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.learning.epochs, 50);
        assert_eq!(config.learning.top_n, 3);
        assert!(config.assistant.restrict_to_it);
        assert_eq!(config.assistant.history_limit, 100);
    }

    #[test]
    fn test_learning_split() {
        let mut config = Config::default();
        config.learning.retrain_threshold = 4;
        config.learning.similarity_bonus = 0.5;
        config.learning.seed = Some(9);

        let learner = config.learning.learner();
        assert_eq!(learner.retrain_threshold, 4);
        assert_eq!(learner.seed, Some(9));
        assert_eq!(config.learning.recommendations().similarity_bonus, 0.5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[learning]\nepochs = 10\n").unwrap();
        assert_eq!(config.learning.epochs, 10);
        assert_eq!(config.learning.learning_rate, 0.01);
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn test_load_from_creates_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_config_serialization() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.storage.dir = Some(temp.path().join("state"));
        config.assistant.restrict_to_it = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.storage_dir().unwrap(), temp.path().join("state"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[search\nmax_results = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
