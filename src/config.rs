use crate::context_classifier::{default_fallbacks, FallbackSpec, DEFAULT_CONTEXT_WINDOW};
use crate::merger::{Selection, DEFAULT_MAX_LABELS, DEFAULT_MIN_LABEL_SCORE};
use crate::samples::DEFAULT_SAMPLE_LIMIT;
use crate::templates::OverwritePolicy;
use crate::value_classifier::DEFAULT_VALUE_SAMPLE_CAP;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Emit or withhold positions whose marker vanished after a template was redefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    #[default]
    Drop,
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub sample_limit: usize,
    pub value_sample_cap: usize,
    pub context_window: usize,
    pub max_labels: usize,
    pub min_label_score: u32,
    pub overwrite_policy: OverwritePolicy,
    pub stale_positions: StalePolicy,
    pub fallback_heuristics: Vec<FallbackSpec>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            value_sample_cap: DEFAULT_VALUE_SAMPLE_CAP,
            context_window: DEFAULT_CONTEXT_WINDOW,
            max_labels: DEFAULT_MAX_LABELS,
            min_label_score: DEFAULT_MIN_LABEL_SCORE,
            overwrite_policy: OverwritePolicy::default(),
            stale_positions: StalePolicy::default(),
            fallback_heuristics: default_fallbacks(),
        }
    }
}

impl DiscoveryConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: DiscoveryConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_limit == 0 {
            return Err(ConfigError::Invalid("sample_limit must be at least 1".into()));
        }
        if self.max_labels == 0 {
            return Err(ConfigError::Invalid("max_labels must be at least 1".into()));
        }
        Ok(())
    }

    pub fn selection(&self) -> Selection {
        Selection { max_labels: self.max_labels, min_score: self.min_label_score }
    }
}
