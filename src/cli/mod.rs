//! CLI argument parsing for clausekit.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clausekit: conditional document assembly over clause templates.
///
/// Templates, catalogs and parameter values live in a store directory:
/// - templates/<template>.yaml holds the clause tree and conditions
/// - catalogs/<template>.yaml lists the parameters the template may use
/// - values/<template>/<context>.yaml supplies values for one document
#[derive(Parser, Debug)]
#[command(name = "clausekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store root directory.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file (defaults to <root>/clausekit.yaml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine decisions to stderr.
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for clausekit.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a document from a template and a set of values.
    ///
    /// Includes the clauses and paragraphs whose conditions hold and
    /// substitutes @parameter references. Warnings go to stderr.
    Assemble(AssembleArgs),

    /// Check a template against its parameter catalog.
    ///
    /// Reports dangling references, type mismatches, malformed conditions
    /// and structural defects. Does not modify the template.
    Validate(ValidateArgs),

    /// List the @parameter references in a piece of text.
    Refs(RefsArgs),

    /// Print a template's outline with conditions in textual form.
    Show(ShowArgs),

    /// Repair duplicate ids and orders, then save the template.
    ///
    /// Keeps the first occurrence of any duplicated id and renumbers all
    /// sibling orders. The save fails if the template changed meanwhile.
    Tidy(TidyArgs),
}

/// Output format for assembled documents.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Json,
}

/// Output format for validation reports.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the `assemble` command.
#[derive(Parser, Debug)]
pub struct AssembleArgs {
    /// Template id.
    pub template: String,

    /// Value context id (values/<template>/<context>.yaml).
    #[arg(short, long)]
    pub context: String,

    /// Output format (defaults to the config's output_format).
    #[arg(short, long, value_enum)]
    pub format: Option<DocumentFormat>,

    /// Write the document to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when assembly produced any warning.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Template id.
    pub template: String,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Fail on warnings as well as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `refs` command.
#[derive(Parser, Debug)]
pub struct RefsArgs {
    /// Text to scan. Reads stdin when neither text nor --file is given.
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// File to scan.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Template id.
    pub template: String,
}

/// Arguments for the `tidy` command.
#[derive(Parser, Debug)]
pub struct TidyArgs {
    /// Template id.
    pub template: String,

    /// Report what would change without saving.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
