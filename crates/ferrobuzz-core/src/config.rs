//! Run configuration.
//!
//! Values resolve in this order, later layers winning: built-in defaults,
//! an optional YAML file, environment variables, then command-line flags
//! (applied by the caller). Credentials only ever come from the file or the
//! environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labeler::DEFAULT_NO_CHANGE_EPSILON;
use crate::ml::CrossValidationConfig;
use crate::price_source::OutputSize;
use crate::ValidationError;

pub const API_KEY_ENV: &str = "FERROBUZZ_ALPHAVANTAGE_API_KEY";
pub const DEFAULT_ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("alphavantage api key is not configured; set FERROBUZZ_ALPHAVANTAGE_API_KEY or alphavantage.api_key")]
    MissingApiKey,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Alpha Vantage connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub output_size: OutputSize,
    pub timeout_ms: u64,
    pub requests_per_minute: u32,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: String::from(DEFAULT_ALPHAVANTAGE_URL),
            output_size: OutputSize::Compact,
            timeout_ms: 10_000,
            // free tier
            requests_per_minute: 5,
        }
    }
}

impl AlphaVantageConfig {
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

impl std::fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("output_size", &self.output_size)
            .field("timeout_ms", &self.timeout_ms)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

/// Everything one analysis run needs besides its input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cross_validation: CrossValidationConfig,
    pub no_change_epsilon: f64,
    /// Fill days without mentions with zero over the table's full date range.
    pub zero_fill: bool,
    pub alphavantage: AlphaVantageConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cross_validation: CrossValidationConfig::default(),
            no_change_epsilon: DEFAULT_NO_CHANGE_EPSILON,
            zero_fill: true,
            alphavantage: AlphaVantageConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults, overlaid with `path` when given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment values read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.alphavantage.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cross_validation.validate()?;
        if !self.no_change_epsilon.is_finite() || self.no_change_epsilon < 0.0 {
            return Err(ValidationError::InvalidEpsilon {
                value: self.no_change_epsilon,
            });
        }
        Ok(())
    }
}
