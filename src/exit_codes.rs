//! Exit code constants for the clausekit CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, bad config)
//! - 2: Validation failure (report failed or template structurally invalid)
//! - 3: Edit conflict (stale template version, or another save holds the lock)
//! - 4: Assembly blocked (missing values under the `block` policy)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: diagnostics with error severity, or a template rejected at ingestion.
pub const VALIDATION_FAILURE: i32 = 2;

/// A structural write was based on a stale template version, or raced another save.
pub const EDIT_CONFLICT: i32 = 3;

/// Assembly refused because parameter values were missing.
pub const ASSEMBLY_BLOCKED: i32 = 4;
