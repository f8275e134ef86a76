//! Config loading, validation, and lookup.

use super::model::{CONFIG_FILE_NAME, Config};
use crate::error::{EngineError, Result};
use chrono::format::{Item, StrftimeItems};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the effective config.
    ///
    /// An explicit path must exist. Otherwise `<root>/clausekit.yaml` is used
    /// when present, and defaults apply when it is not.
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            EngineError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `render.date_format` must be non-empty and a valid strftime format
    /// - `render.true_label` and `render.false_label` must differ
    pub fn validate(&self) -> Result<()> {
        let format = &self.render.date_format;
        if format.trim().is_empty() {
            return Err(EngineError::UserError(
                "config validation failed: render.date_format must be non-empty".to_string(),
            ));
        }

        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(EngineError::UserError(format!(
                "config validation failed: render.date_format '{}' is not a valid date format.\n\
                 Fix: use strftime specifiers such as '%Y-%m-%d' or '%d %B %Y'.",
                format
            )));
        }

        if self.render.true_label == self.render.false_label {
            return Err(EngineError::UserError(format!(
                "config validation failed: render.true_label and render.false_label are both '{}'",
                self.render.true_label
            )));
        }

        Ok(())
    }
}
