//! Parsing and serialization of template files.

use super::Template;
use crate::error::{EngineError, Result};

impl Template {
    /// Parse a template from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            EngineError::UserError(format!(
                "failed to parse template YAML: {}\n\nFix: check the template file for syntax errors",
                e
            ))
        })
    }

    /// Parse a template from JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            EngineError::UserError(format!(
                "failed to parse template JSON: {}\n\nFix: check the template file for syntax errors",
                e
            ))
        })
    }

    /// Serialize to YAML. Conditions are written in canonical tree form.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            EngineError::UserError(format!("failed to serialize template: {}", e))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            EngineError::UserError(format!("failed to serialize template: {}", e))
        })
    }
}
