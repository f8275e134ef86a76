//! Implementation of the `clausekit refs` command.

use crate::cli::RefsArgs;
use crate::error::{EngineError, Result};
use crate::reference::find_references;
use std::io::Read;

/// Execute the `clausekit refs` command.
///
/// Prints each referenced parameter id on its own line, sorted.
pub fn cmd_refs(args: &RefsArgs) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            EngineError::UserError(format!("failed to read '{}': {}", path.display(), e))
        })?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| EngineError::UserError(format!("failed to read stdin: {}", e)))?;
            buffer
        }
    };

    print!("{}", render_refs(&text));
    Ok(())
}

pub(crate) fn render_refs(text: &str) -> String {
    find_references(text)
        .into_iter()
        .map(|id| format!("{}\n", id))
        .collect()
}
