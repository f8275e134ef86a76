//! Configuration types and defaults for clausekit.
//!
//! This module defines enums and default value functions used by the Config
//! struct, plus the rendering options shared with the reference resolver.

use serde::{Deserialize, Serialize};

/// What assembly does when a referenced parameter has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// The comparison evaluates to false, tokens stay verbatim, a warning is recorded.
    #[default]
    Exclude,
    /// The whole document is refused until every referenced value is supplied.
    Block,
}

/// Output format for assembled documents and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// How parameter values are rendered when substituted into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Rendering of a true boolean.
    pub true_label: String,

    /// Rendering of a false boolean.
    pub false_label: String,

    /// `strftime`-style format for dates.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            true_label: default_true_label(),
            false_label: default_false_label(),
            date_format: default_date_format(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_true_label() -> String {
    "Yes".to_string()
}
pub(crate) fn default_false_label() -> String {
    "No".to_string()
}
pub(crate) fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}
