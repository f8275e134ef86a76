//! Implementation of the `clausekit validate` command.
//!
//! Loads a template and its catalog, runs the integrity validator and prints
//! the report. The template is never modified.

use crate::cli::{ReportFormat, ValidateArgs};
use crate::context::HostContext;
use crate::diagnostics::Severity;
use crate::error::{EngineError, Result};
use crate::validate::{ValidationReport, validate};

/// Execute the `clausekit validate` command.
///
/// Fails with exit code 2 when the report has errors, or any diagnostic at
/// all in strict mode.
pub fn cmd_validate(ctx: &HostContext, args: &ValidateArgs) -> Result<()> {
    let (template, catalog) = ctx.load_typed(&args.template)?;
    let report = validate(&template, &catalog);

    print!("{}", render_report(&report, args.format)?);

    let strict = args.strict || ctx.config.strict;
    check_outcome(&report, strict)
}

pub(crate) fn render_report(report: &ValidationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(report.format_report()),
        ReportFormat::Json => serde_json::to_string_pretty(report)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| EngineError::UserError(format!("failed to serialize report: {}", e))),
    }
}

pub(crate) fn check_outcome(report: &ValidationReport, strict: bool) -> Result<()> {
    let errors = report.errors().count();
    let warnings = report.warnings().count();

    let message = if errors > 0 {
        format!("template '{}' has {} error(s)", report.template_id, errors)
    } else if strict && warnings > 0 {
        format!(
            "template '{}' has {} warning(s) in strict mode",
            report.template_id, warnings
        )
    } else {
        return Ok(());
    };

    // Structural defects are fixed mechanically by tidy.
    let failing = report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error || strict);
    let structural = failing.filter(|d| d.kind.is_structural()).count();
    if structural > 0 {
        return Err(EngineError::ValidationError(format!(
            "{} ({} structural)\n\nFix: run `clausekit tidy {}` to repair ids and orders",
            message, structural, report.template_id
        )));
    }
    Err(EngineError::ValidationError(message))
}
