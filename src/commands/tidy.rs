//! Implementation of the `clausekit tidy` command.

use crate::cli::TidyArgs;
use crate::context::HostContext;
use crate::error::Result;
use crate::store::TemplateProvider;
use crate::template::RepairReport;

/// Execute the `clausekit tidy` command.
///
/// Repairs the stored template (keep-first deduplication, renumbering) and
/// saves it with a version check. With `--dry-run` nothing is written.
pub fn cmd_tidy(ctx: &HostContext, args: &TidyArgs) -> Result<()> {
    let (report, saved_version) = tidy(ctx, args)?;
    print!("{}", report);
    match saved_version {
        Some(version) => println!("Saved '{}' as version {}", args.template, version),
        None if args.dry_run && !report.is_empty() => println!("Dry run: nothing saved"),
        None => {}
    }
    Ok(())
}

/// Repair and (unless dry-run or already canonical) save.
///
/// Returns the report and the saved version, if a save happened.
pub(crate) fn tidy(ctx: &HostContext, args: &TidyArgs) -> Result<(RepairReport, Option<u64>)> {
    let mut template = ctx.store.load_template(&args.template)?;
    let report = template.repair();

    if args.dry_run || report.is_empty() {
        return Ok((report, None));
    }

    let saved = ctx.store.save_template(&template)?;
    Ok((report, Some(saved.version)))
}
