//! Keep-first repair of structurally invalid trees.

use super::{Template, INTRODUCTION_ORDER};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

/// What [`Template::repair`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Clause ids dropped as later duplicates.
    pub removed_clauses: Vec<String>,

    /// `(clause id, paragraph id)` pairs dropped as later duplicates.
    pub removed_paragraphs: Vec<(String, String)>,

    /// Clauses that were pinned as Introduction but lost to an earlier one.
    pub demoted_introductions: Vec<String>,

    /// Whether any sibling order changed during renumbering.
    pub renumbered: bool,
}

impl RepairReport {
    /// Whether the template was already in canonical shape.
    pub fn is_empty(&self) -> bool {
        self.removed_clauses.is_empty()
            && self.removed_paragraphs.is_empty()
            && self.demoted_introductions.is_empty()
            && !self.renumbered
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "nothing to repair");
        }
        for id in &self.removed_clauses {
            writeln!(f, "removed duplicate clause '{}'", id)?;
        }
        for (clause_id, paragraph_id) in &self.removed_paragraphs {
            writeln!(
                f,
                "removed duplicate paragraph '{}/{}'",
                clause_id, paragraph_id
            )?;
        }
        for id in &self.demoted_introductions {
            writeln!(f, "demoted extra introduction '{}' to a regular clause", id)?;
        }
        if self.renumbered {
            writeln!(f, "renumbered sibling orders")?;
        }
        Ok(())
    }
}

impl Template {
    /// Bring the tree back into canonical shape.
    ///
    /// The first occurrence in storage order wins: later clauses with an
    /// already-seen id are dropped, as are later paragraphs with an
    /// already-seen id within their clause. Extra Introductions become
    /// regular clauses placed after the existing ones. Finally all orders are
    /// renumbered.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        let mut seen = BTreeSet::new();
        self.clauses.retain(|clause| {
            let keep = seen.insert(clause.id.clone());
            if !keep {
                report.removed_clauses.push(clause.id.clone());
            }
            keep
        });

        for clause in &mut self.clauses {
            let mut seen = BTreeSet::new();
            clause.paragraphs.retain(|paragraph| {
                let keep = seen.insert(paragraph.id.clone());
                if !keep {
                    report
                        .removed_paragraphs
                        .push((clause.id.clone(), paragraph.id.clone()));
                }
                keep
            });
        }

        let before = self.order_snapshot();

        let mut has_introduction = false;
        let mut demoted = Vec::new();
        let mut kept = Vec::with_capacity(self.clauses.len());
        for clause in std::mem::take(&mut self.clauses) {
            if clause.is_introduction() {
                if has_introduction {
                    report.demoted_introductions.push(clause.id.clone());
                    demoted.push(clause);
                    continue;
                }
                has_introduction = true;
            }
            kept.push(clause);
        }
        self.clauses = kept;
        self.renumber();

        // Demoted Introductions go after every regular clause, in storage order.
        let mut next_order = self.clauses.iter().filter(|c| !c.is_introduction()).count() as i64;
        for mut clause in demoted {
            clause.order = next_order;
            clause.renumber_paragraphs();
            next_order += 1;
            self.clauses.push(clause);
        }

        report.renumbered = before != self.order_snapshot();

        if !report.is_empty() {
            info!(
                template_id = %self.id,
                removed_clauses = report.removed_clauses.len(),
                removed_paragraphs = report.removed_paragraphs.len(),
                demoted = report.demoted_introductions.len(),
                "repaired template"
            );
        }
        report
    }

    /// Storage-order snapshot of every id and order in the tree.
    fn order_snapshot(&self) -> Vec<(String, i64, Vec<(String, i64)>)> {
        self.clauses
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    c.order,
                    c.paragraphs.iter().map(|p| (p.id.clone(), p.order)).collect(),
                )
            })
            .collect()
    }
}
