//! Engine configuration, persisted as TOML.
//!
//! ```toml
//! [matcher]
//! top_k = 3
//! min_score = 80
//!
//! [refinement]
//! max_questions = 10
//!
//! [scoring]
//! threshold = 0.5
//! confirmation_policy = "union"
//! sort_by_confidence = false
//!
//! [extractor]
//! backend = "list"
//! ```
//!
//! Every field has a default, so a partial file (or none at all) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::ExtractorConfig;
use crate::matcher::MatchConfig;
use crate::refine::RefineConfig;
use crate::score::ScoreConfig;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DxConfig {
    #[serde(default)]
    pub matcher: MatchConfig,
    #[serde(default)]
    pub refinement: RefineConfig,
    #[serde(default)]
    pub scoring: ScoreConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl DxConfig {
    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |message: &str| -> ConfigResult<()> {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };
        if self.matcher.top_k == 0 {
            return invalid("matcher.top_k must be at least 1");
        }
        if self.matcher.min_score > 100 {
            return invalid("matcher.min_score must be in 0..=100");
        }
        if self.refinement.max_questions == 0 {
            return invalid("refinement.max_questions must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.scoring.threshold) {
            return invalid("scoring.threshold must be in 0.0..=1.0");
        }
        if self.extractor.timeout_secs == 0 {
            return invalid("extractor.timeout_secs must be at least 1");
        }
        Ok(())
    }
}
