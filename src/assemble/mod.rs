//! Document assembly.
//!
//! Assembly walks a template in document order, keeps the clauses and
//! paragraphs whose conditions hold for the supplied values, and substitutes
//! `@parameter` references in their titles and content.
//!
//! Exclusion cascades: when a clause is excluded, its paragraphs are dropped
//! without their conditions being evaluated.

mod assembler;
mod types;


pub use assembler::{Assembler, assemble};
pub use types::{Assembly, Section, SectionKind};
