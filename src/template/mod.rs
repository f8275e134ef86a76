//! Template tree model.
//!
//! A template is an ordered list of clauses, each holding an ordered list of
//! paragraphs. Every clause and paragraph may carry a [`Condition`] deciding
//! whether it appears in an assembled document.
//!
//! # Template File Format
//!
//! ```yaml
//! id: employment
//! title: Employment Agreement
//! version: 3
//! clauses:
//!   - id: intro
//!     title: Introduction
//!     content: This agreement is made with @employee_name.
//!     order: -1
//!   - id: remuneration
//!     title: Remuneration
//!     order: 0
//!     paragraphs:
//!       - id: bonus
//!         content: The employee is eligible for a bonus.
//!         condition: "@has_bonus"
//!         order: 0
//! ```
//!
//! The clause with order `-1` is the Introduction. It always comes first and
//! there is at most one. All other sibling orders are zero-based and dense.
//!
//! Trees are accepted as read; [`Template::check_structure`] rejects the
//! ones the assembler cannot use and [`Template::repair`] fixes them.

use crate::catalog::Catalog;
use crate::condition::Condition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod io;
mod mutations;
mod repair;
mod structure;
#[cfg(test)]
mod tests;

pub use repair::RepairReport;

/// Order value that marks the Introduction clause.
pub const INTRODUCTION_ORDER: i64 = -1;

/// A document template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    // =========================================================================
    // Identity
    // =========================================================================
    /// Template identifier (also the file stem in a store).
    pub id: String,

    /// Document title.
    #[serde(default)]
    pub title: String,

    // =========================================================================
    // Concurrency stamp
    // =========================================================================
    /// Incremented by every successful save.
    #[serde(default)]
    pub version: u64,

    /// When the template was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Who last saved the template (e.g., "alice@laptop").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    // =========================================================================
    // Content
    // =========================================================================
    /// Clauses in storage order; use [`Template::clauses_in_order`] to read
    /// them in document order.
    #[serde(default)]
    pub clauses: Vec<Clause>,

    // =========================================================================
    // Unknown fields (forward compatibility)
    // =========================================================================
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A top-level section of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Unique within the template.
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    /// Absent means "always include".
    #[serde(
        default,
        deserialize_with = "crate::condition::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<Condition>,

    /// Position among sibling clauses; `-1` for the Introduction.
    #[serde(default)]
    pub order: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<Paragraph>,
}

/// A sub-section of a clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Unique within the owning clause.
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(
        default,
        deserialize_with = "crate::condition::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<Condition>,

    /// Position among sibling paragraphs.
    #[serde(default)]
    pub order: i64,
}

impl Template {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            version: 0,
            updated_at: None,
            updated_by: None,
            clauses: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Clauses in document order: the Introduction first, then ascending
    /// `order`. Ties keep storage order.
    pub fn clauses_in_order(&self) -> Vec<&Clause> {
        let mut ordered: Vec<&Clause> = self.clauses.iter().collect();
        ordered.sort_by_key(|c| (!c.is_introduction(), c.order));
        ordered
    }

    /// The Introduction clause, if any.
    pub fn introduction(&self) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.is_introduction())
    }

    pub fn clause(&self, id: &str) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.id == id)
    }

    pub fn clause_mut(&mut self, id: &str) -> Option<&mut Clause> {
        self.clauses.iter_mut().find(|c| c.id == id)
    }

    /// Type every condition's operands against the catalog.
    pub fn coerce_conditions(&mut self, catalog: &Catalog) {
        for clause in &mut self.clauses {
            if let Some(condition) = clause.condition.as_mut() {
                condition.coerce_operands(catalog);
            }
            for paragraph in &mut clause.paragraphs {
                if let Some(condition) = paragraph.condition.as_mut() {
                    condition.coerce_operands(catalog);
                }
            }
        }
    }
}

impl Clause {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            condition: None,
            order: 0,
            paragraphs: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Append a paragraph, numbering it after the existing ones.
    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        let order = self.paragraphs.len() as i64;
        self.paragraphs.push(paragraph.with_order(order));
        self
    }

    pub fn is_introduction(&self) -> bool {
        self.order == INTRODUCTION_ORDER
    }

    /// Paragraphs in ascending `order`; ties keep storage order.
    pub fn paragraphs_in_order(&self) -> Vec<&Paragraph> {
        let mut ordered: Vec<&Paragraph> = self.paragraphs.iter().collect();
        ordered.sort_by_key(|p| p.order);
        ordered
    }

    pub fn paragraph(&self, id: &str) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id == id)
    }

    /// Sort paragraphs into document order and number them from zero.
    pub(crate) fn renumber_paragraphs(&mut self) {
        self.paragraphs.sort_by_key(|p| p.order);
        number_paragraphs(&mut self.paragraphs);
    }
}

impl Paragraph {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            condition: None,
            order: 0,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }
}

/// Assign orders by position.
fn number_paragraphs(paragraphs: &mut [Paragraph]) {
    for (i, paragraph) in paragraphs.iter_mut().enumerate() {
        paragraph.order = i as i64;
    }
}
