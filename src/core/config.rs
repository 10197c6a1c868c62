//! Category mapper configuration module
//!
//! Config loading priority:
//! 1. Explicit `--config <file>` (errors are fatal)
//! 2. `catmap.json` in the working directory (errors fall back to defaults)
//! 3. Built-in defaults
//!
//! Command-line flags are applied on top of whichever config was loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{Error, Result};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "catmap.json";

/// Default Model2Vec model ID
pub const DEFAULT_MODEL2VEC_MODEL: &str = "minishlab/potion-base-8M";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_target_tree")]
    pub target_tree: PathBuf,

    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default)]
    pub weights: Weights,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub model: ModelConfig,
}

fn default_target_tree() -> PathBuf {
    PathBuf::from("./scripts/cats/target.json")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("category_embeddings.json")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("category_mapping.json")
}

fn default_threshold() -> f32 {
    0.5
}

fn default_top_k() -> usize {
    5
}

/// Blend of name and path similarity used when scoring a candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_name_weight")]
    pub name: f32,

    #[serde(default = "default_path_weight")]
    pub path: f32,
}

fn default_name_weight() -> f32 {
    0.7
}

fn default_path_weight() -> f32 {
    0.3
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            name: default_name_weight(),
            path: default_path_weight(),
        }
    }
}

/// Which Model2Vec model encodes category text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Local model directory; takes precedence over `model_id`
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

fn default_model_id() -> String {
    DEFAULT_MODEL2VEC_MODEL.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            model_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_tree: default_target_tree(),
            cache_file: default_cache_file(),
            output_file: default_output_file(),
            threshold: default_threshold(),
            weights: Weights::default(),
            top_k: default_top_k(),
            model: ModelConfig::default(),
        }
    }
}

impl Config {
    /// Load config from an explicit file, or from `catmap.json` in `dir` when present.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let implicit = dir.join(DEFAULT_CONFIG_FILE);
        if !implicit.exists() {
            return Ok(Self::default());
        }

        match Self::load_from_file(&implicit) {
            Ok(config) => {
                tracing::debug!(path = %implicit.display(), "loaded config");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("{}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };

        if !self.threshold.is_finite() {
            return Err(invalid(format!("threshold must be finite, got {}", self.threshold)));
        }
        if !(self.weights.name.is_finite() && self.weights.path.is_finite()) {
            return Err(invalid("weights must be finite".to_string()));
        }
        if self.weights.name < 0.0 || self.weights.path < 0.0 {
            return Err(invalid("weights must not be negative".to_string()));
        }
        Ok(())
    }

    /// Generate default config file content
    pub fn default_json() -> String {
        serde_json::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
