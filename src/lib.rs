//! clausekit: conditional document assembly for clause-based templates.
//!
//! A [`Template`](template::Template) is an ordered tree of clauses and
//! paragraphs, each optionally gated by a [`Condition`](condition::Condition)
//! over typed parameter values. Assembly evaluates the gates, drops excluded
//! subtrees and substitutes `@parameter` references in what remains.
//!
//! # Example
//!
//! ```
//! use clausekit::assemble::assemble;
//! use clausekit::catalog::ParameterValues;
//! use clausekit::condition::Condition;
//! use clausekit::template::{Clause, Paragraph, Template};
//!
//! let mut template = Template::new("offer", "Offer Letter");
//! template.clauses.push(
//!     Clause::new("bonus", "Bonus", "")
//!         .with_condition(Condition::is_true("has_bonus"))
//!         .with_paragraph(Paragraph::new("amount", "Bonus Amount", "Bonus: @bonus_amount")),
//! );
//!
//! let values = ParameterValues::new()
//!     .with("has_bonus", true)
//!     .with("bonus_amount", 500.0);
//! let assembly = assemble(&template, &values).unwrap();
//!
//! assert_eq!(assembly.section_ids(), vec!["bonus", "bonus/amount"]);
//! assert_eq!(assembly.sections[1].content, "Bonus: 500");
//! ```

pub mod assemble;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod condition;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod reference;
pub mod store;
pub mod template;
pub mod validate;

#[cfg(test)]
mod test_support;
