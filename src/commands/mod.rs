//! Command implementations for clausekit.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command renders its output to a string first so the
//! rendering can be tested without capturing stdout.

mod assemble;
mod refs;
mod show;
mod tidy;
mod validate_cmd;


use crate::cli::{Cli, Command};
use crate::context::HostContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    if let Command::Refs(args) = &cli.command {
        return refs::cmd_refs(args);
    }

    let ctx = HostContext::resolve(&cli.root, cli.config.as_deref())?;
    match cli.command {
        Command::Assemble(args) => assemble::cmd_assemble(&ctx, &args),
        Command::Validate(args) => validate_cmd::cmd_validate(&ctx, &args),
        Command::Show(args) => show::cmd_show(&ctx, &args),
        Command::Tidy(args) => tidy::cmd_tidy(&ctx, &args),
        Command::Refs(args) => refs::cmd_refs(&args),
    }
}
