//! Error types for clausekit.
//!
//! Hard failures only. Soft problems (missing values, dangling references,
//! malformed condition nodes) are reported as [`Diagnostic`]s alongside results
//! and never surface here.

use crate::diagnostics::Diagnostic;
use crate::exit_codes;
use thiserror::Error;

/// Main error type for engine and host operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid arguments, unreadable files, malformed YAML/JSON, bad config.
    #[error("{0}")]
    UserError(String),

    /// The template violates a structural invariant and was rejected before use.
    #[error("template '{template_id}' is structurally invalid:\n{}", format_defects(.defects))]
    InvalidTemplate {
        template_id: String,
        defects: Vec<Diagnostic>,
    },

    /// An edit would introduce a second node with the same id among its siblings.
    #[error("duplicate identifier '{id}' in {scope}")]
    DuplicateIdentifier { scope: String, id: String },

    /// An edit referenced a clause or paragraph that does not exist.
    #[error("no such node: {0}")]
    NodeNotFound(String),

    /// An edit referenced a position outside the sibling list.
    #[error("position {position} is out of range (0..={max})")]
    InvalidPosition { position: usize, max: usize },

    /// A structural write was based on a stale template version.
    #[error(
        "template '{template_id}' was modified concurrently (edit based on version {expected}, stored version is {found})"
    )]
    EditConflict {
        template_id: String,
        expected: u64,
        found: u64,
    },

    /// Assembly was refused because parameter values were missing.
    #[error("assembly of '{template_id}' blocked: missing values for {}", .missing.join(", "))]
    AssemblyBlocked {
        template_id: String,
        missing: Vec<String>,
    },

    /// A raw parameter value could not be coerced to its declared type.
    #[error("invalid value for parameter '{parameter_id}': {reason}")]
    InvalidValue {
        parameter_id: String,
        reason: String,
    },

    /// A validation report contained failures.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Another save holds the template's lock file.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl EngineError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::UserError(_) => exit_codes::USER_ERROR,
            EngineError::DuplicateIdentifier { .. } => exit_codes::USER_ERROR,
            EngineError::NodeNotFound(_) => exit_codes::USER_ERROR,
            EngineError::InvalidPosition { .. } => exit_codes::USER_ERROR,
            EngineError::InvalidValue { .. } => exit_codes::USER_ERROR,
            EngineError::InvalidTemplate { .. } => exit_codes::VALIDATION_FAILURE,
            EngineError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            EngineError::EditConflict { .. } => exit_codes::EDIT_CONFLICT,
            EngineError::LockError(_) => exit_codes::EDIT_CONFLICT,
            EngineError::AssemblyBlocked { .. } => exit_codes::ASSEMBLY_BLOCKED,
        }
    }
}

fn format_defects(defects: &[Diagnostic]) -> String {
    defects
        .iter()
        .map(|d| format!("  x {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias for clausekit operations.
pub type Result<T> = std::result::Result<T, EngineError>;
