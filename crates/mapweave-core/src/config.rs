//! Engine configuration
//!
//! Settings are taken from defaults, then an optional YAML or JSON file, then
//! `MAPWEAVE_*` environment variables.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::validation::ValidationMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "MAPWEAVE_";

/// Behaviour switches for a [`MappingEngine`](crate::engine::MappingEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delimiter for combine/separate mappings that declare none
    pub default_delimiter: String,

    /// Run the validation engine before executing a session
    pub validate_before_execution: bool,

    /// Abort the session when validation reports errors
    pub fail_on_validation_errors: bool,

    pub validation_mode: ValidationMode,

    /// Let property fields fall back to environment variables
    pub environment_properties: bool,

    /// Write null source values as placeholders instead of skipping them
    pub write_null_values: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_delimiter: " ".to_string(),
            validate_before_execution: true,
            fail_on_validation_errors: false,
            validation_mode: ValidationMode::Strict,
            environment_properties: false,
            write_null_values: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file, YAML for `.yaml`/`.yml` and JSON otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Defaults or the given file, with environment overrides applied
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env()?;
        Ok(config)
    }

    /// Apply `MAPWEAVE_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from `(name, value)` pairs; unrelated names are ignored
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "DEFAULT_DELIMITER" => self.default_delimiter = value,
                "VALIDATE_BEFORE_EXECUTION" => {
                    self.validate_before_execution = parse_flag(&name, &value)?
                }
                "FAIL_ON_VALIDATION_ERRORS" => {
                    self.fail_on_validation_errors = parse_flag(&name, &value)?
                }
                "ENVIRONMENT_PROPERTIES" => self.environment_properties = parse_flag(&name, &value)?,
                "WRITE_NULL_VALUES" => self.write_null_values = parse_flag(&name, &value)?,
                "VALIDATION_MODE" => {
                    self.validation_mode = match value.to_ascii_lowercase().as_str() {
                        "strict" => ValidationMode::Strict,
                        "lenient" => ValidationMode::Lenient,
                        other => {
                            return Err(Error::configuration(format!(
                                "{} must be 'strict' or 'lenient', got '{}'",
                                name, other
                            )))
                        }
                    }
                }
                _ => log::debug!("Ignoring unknown setting {}", name),
            }
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::configuration(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}
