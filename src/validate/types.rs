//! Validation report type.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use serde::Serialize;
use std::collections::BTreeSet;

/// Everything the validator found for one template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub template_id: String,
    /// Diagnostics in traversal order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(template_id: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            template_id: template_id.into(),
            diagnostics,
        }
    }

    /// No error-severity diagnostics.
    pub fn passed(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// No diagnostics at all.
    pub fn clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Distinct parameter ids reported as dangling.
    pub fn dangling_references(&self) -> BTreeSet<String> {
        self.diagnostics
            .iter()
            .filter_map(|d| match &d.kind {
                DiagnosticKind::DanglingReference { parameter_id } => Some(parameter_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Format the report for terminal output.
    ///
    /// ```text
    /// Template 'employment': 1 error, 1 warning
    ///
    ///   x employment/bonus: reference to unknown parameter 'bonus_amount'
    ///   ! employment: order gap: expected 2, found 3
    /// ```
    pub fn format_report(&self) -> String {
        if self.clean() {
            return format!("Template '{}' is valid\n", self.template_id);
        }

        let errors = self.errors().count();
        let warnings = self.warnings().count();
        let mut msg = format!(
            "Template '{}': {} {}, {} {}\n\n",
            self.template_id,
            errors,
            plural(errors, "error", "errors"),
            warnings,
            plural(warnings, "warning", "warnings"),
        );

        for diagnostic in &self.diagnostics {
            let marker = match diagnostic.severity {
                Severity::Error => 'x',
                Severity::Warning => '!',
            };
            msg.push_str(&format!(
                "  {} {}: {}\n",
                marker, diagnostic.path, diagnostic.kind
            ));
        }

        msg
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
