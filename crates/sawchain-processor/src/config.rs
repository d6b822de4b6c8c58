//! Configuration for the SawChain transaction processor.
//!
//! Limits participate in validation, so every replica of a network must run
//! with identical values.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FAMILY_NAME;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {variable}: {value:?}")]
    InvalidVariable { variable: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Processor configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Transaction family served.
    pub family_name: String,
    /// Family versions accepted from the runtime.
    pub family_versions: Vec<String>,
    /// Maximum inputs of one transformation event (anti-DoS).
    pub max_transformation_inputs: usize,
    /// Maximum parameter values of one description event (anti-DoS).
    pub max_event_values: usize,
    /// Maximum characters of any free-text field.
    pub max_text_length: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            family_name: FAMILY_NAME.to_string(),
            family_versions: vec!["0.1".to_string()],
            max_transformation_inputs: 256,
            max_event_values: 64,
            max_text_length: 4096,
        }
    }
}

impl ProcessorConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SAWCHAIN_FAMILY_VERSIONS`: comma separated versions (default: 0.1)
    /// - `SAWCHAIN_MAX_TRANSFORMATION_INPUTS` (default: 256)
    /// - `SAWCHAIN_MAX_EVENT_VALUES` (default: 64)
    /// - `SAWCHAIN_MAX_TEXT_LENGTH` (default: 4096)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(versions) = env::var("SAWCHAIN_FAMILY_VERSIONS") {
            config.family_versions = versions
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(n) = parse_var("SAWCHAIN_MAX_TRANSFORMATION_INPUTS")? {
            config.max_transformation_inputs = n;
        }
        if let Some(n) = parse_var("SAWCHAIN_MAX_EVENT_VALUES")? {
            config.max_event_values = n;
        }
        if let Some(n) = parse_var("SAWCHAIN_MAX_TEXT_LENGTH")? {
            config.max_text_length = n;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.family_name != FAMILY_NAME {
            return Err(ConfigError::Invalid(format!(
                "family name must be {FAMILY_NAME}, got {}",
                self.family_name
            )));
        }
        if self.family_versions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one family version is required".to_string(),
            ));
        }
        if self.max_transformation_inputs == 0
            || self.max_event_values == 0
            || self.max_text_length == 0
        {
            return Err(ConfigError::Invalid("limits must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn parse_var(variable: &'static str) -> Result<Option<usize>, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVariable { variable, value }),
        Err(_) => Ok(None),
    }
}
