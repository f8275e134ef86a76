//! Implementation of the `clausekit assemble` command.

use crate::assemble::{Assembler, Assembly};
use crate::cli::{AssembleArgs, DocumentFormat};
use crate::config::OutputFormat;
use crate::context::HostContext;
use crate::error::{EngineError, Result};
use crate::fs::atomic_write;
use crate::store::ValueSource;

/// Execute the `clausekit assemble` command.
///
/// Warnings are printed to stderr. In strict mode any warning fails the
/// command and no document is written.
pub fn cmd_assemble(ctx: &HostContext, args: &AssembleArgs) -> Result<()> {
    let assembly = assemble_for(ctx, args)?;

    for warning in &assembly.warnings {
        eprintln!("warning: {}", warning);
    }

    if (args.strict || ctx.config.strict) && !assembly.warnings.is_empty() {
        return Err(EngineError::ValidationError(format!(
            "assembly of '{}' produced {} warning(s) in strict mode",
            assembly.template_id,
            assembly.warnings.len()
        )));
    }

    let rendered = render(&assembly, effective_format(ctx, args))?;
    match &args.output {
        Some(path) => {
            atomic_write(path, &rendered)?;
            eprintln!("Wrote {} ({} sections)", path.display(), assembly.sections.len());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Load inputs and assemble, without printing anything.
pub(crate) fn assemble_for(ctx: &HostContext, args: &AssembleArgs) -> Result<Assembly> {
    let (template, _catalog) = ctx.load_typed(&args.template)?;
    let values = ctx.store.get_values(&args.template, &args.context)?;
    Assembler::from_config(&ctx.config).assemble(&template, &values)
}

pub(crate) fn effective_format(ctx: &HostContext, args: &AssembleArgs) -> DocumentFormat {
    args.format.unwrap_or(match ctx.config.output_format {
        OutputFormat::Markdown => DocumentFormat::Markdown,
        OutputFormat::Json => DocumentFormat::Json,
    })
}

pub(crate) fn render(assembly: &Assembly, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Markdown => Ok(assembly.to_markdown()),
        DocumentFormat::Json => {
            let mut json = assembly.to_json_pretty()?;
            json.push('\n');
            Ok(json)
        }
    }
}
