//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// File name looked up in the store root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "clausekit.yaml";

/// Configuration for assembly and validation.
///
/// This struct represents the contents of `clausekit.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Assembly settings
    // =========================================================================
    /// What to do when a referenced parameter has no value.
    pub missing_value_policy: MissingValuePolicy,

    /// Rendering of substituted values.
    pub render: RenderOptions,

    // =========================================================================
    // Host settings
    // =========================================================================
    /// Default output format for `assemble` and `validate`.
    pub output_format: OutputFormat,

    /// Treat warnings as failures in the CLI.
    pub strict: bool,
}
