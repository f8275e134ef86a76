//! Implementation of the `clausekit show` command.
//!
//! Prints a template's clause tree in document order, one line per node,
//! with conditions in their textual form.

use crate::cli::ShowArgs;
use crate::context::HostContext;
use crate::error::Result;
use crate::store::TemplateProvider;
use crate::template::Template;

/// Execute the `clausekit show` command.
pub fn cmd_show(ctx: &HostContext, args: &ShowArgs) -> Result<()> {
    let template = ctx.store.load_template(&args.template)?;
    print!("{}", render_outline(&template));
    Ok(())
}

/// Render the outline.
///
/// ```text
/// employment: Employment Agreement
/// Version:    3 (updated 2025-07-01 09:30:00 UTC by alice@laptop)
///
/// [intro] Introduction (introduction)
/// [duties] Duties
///   [casual] Casual Work  if @contract_type == "casual"
/// ```
pub(crate) fn render_outline(template: &Template) -> String {
    let mut out = format!("{}: {}\n", template.id, template.title);

    let mut version = format!("Version:    {}", template.version);
    match (&template.updated_at, &template.updated_by) {
        (Some(at), Some(by)) => {
            version.push_str(&format!(" (updated {} by {})", at.format("%Y-%m-%d %H:%M:%S UTC"), by))
        }
        (Some(at), None) => {
            version.push_str(&format!(" (updated {})", at.format("%Y-%m-%d %H:%M:%S UTC")))
        }
        _ => {}
    }
    out.push_str(&version);
    out.push_str("\n\n");

    for clause in template.clauses_in_order() {
        out.push_str(&format!("[{}] {}", clause.id, clause.title));
        if clause.is_introduction() {
            out.push_str(" (introduction)");
        }
        if let Some(condition) = &clause.condition {
            out.push_str(&format!("  if {}", condition));
        }
        out.push('\n');

        for paragraph in clause.paragraphs_in_order() {
            out.push_str(&format!("  [{}] {}", paragraph.id, paragraph.title));
            if let Some(condition) = &paragraph.condition {
                out.push_str(&format!("  if {}", condition));
            }
            out.push('\n');
        }
    }

    out
}
