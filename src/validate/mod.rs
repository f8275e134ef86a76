//! Integrity validation for templates.
//!
//! The validator walks a template against a parameter catalog and reports
//! every problem it finds as a [`Diagnostic`](crate::diagnostics::Diagnostic):
//!
//! - Dangling references: `@tokens` or condition parameters missing from the catalog
//! - Type mismatches between operators, operands and declared parameter types
//! - Malformed condition nodes
//! - Structural defects (duplicate ids and orders, extra Introductions)
//!
//! Validation never mutates the template and never stops at the first problem.

mod types;
mod validator;


pub use types::ValidationReport;
pub use validator::validate;
