//! Structural invariant checks.

use super::{Clause, Paragraph, Template, INTRODUCTION_ORDER};
use crate::diagnostics::{Diagnostic, DiagnosticKind, NodePath};
use crate::error::{EngineError, Result};
use std::collections::{BTreeMap, BTreeSet};

impl Template {
    /// Every structural defect in the tree, in traversal order.
    ///
    /// Order gaps are warnings; everything else is an error.
    pub fn structural_defects(&self) -> Vec<Diagnostic> {
        let mut defects = Vec::new();
        let template_path = NodePath::template(&self.id);

        for id in duplicates(self.clauses.iter().map(|c| c.id.as_str())) {
            defects.push(Diagnostic::error(
                NodePath::clause(&self.id, id),
                DiagnosticKind::DuplicateId { id: id.to_string() },
            ));
        }

        let introductions = self.clauses.iter().filter(|c| c.is_introduction()).count();
        if introductions > 1 {
            defects.push(Diagnostic::error(
                template_path.clone(),
                DiagnosticKind::MultipleIntroductions {
                    count: introductions,
                },
            ));
        }

        for clause in &self.clauses {
            if clause.order < 0 && clause.order != INTRODUCTION_ORDER {
                defects.push(Diagnostic::error(
                    NodePath::clause(&self.id, &clause.id),
                    DiagnosticKind::NegativeOrder {
                        order: clause.order,
                    },
                ));
            }
        }

        let regular: Vec<i64> = self
            .clauses
            .iter()
            .filter(|c| c.order >= 0)
            .map(|c| c.order)
            .collect();
        check_orders(&regular, &template_path, &mut defects);

        for clause in self.clauses_in_order() {
            clause_defects(&self.id, clause, &mut defects);
        }

        defects
    }

    /// Reject a tree that violates the sibling id and order invariants.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The tree may be assembled (order gaps are tolerated)
    /// * `Err(EngineError::InvalidTemplate)` - Lists every error-severity defect
    pub fn check_structure(&self) -> Result<()> {
        let errors: Vec<Diagnostic> = self
            .structural_defects()
            .into_iter()
            .filter(Diagnostic::is_error)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidTemplate {
                template_id: self.id.clone(),
                defects: errors,
            })
        }
    }
}

fn clause_defects(template_id: &str, clause: &Clause, defects: &mut Vec<Diagnostic>) {
    let clause_path = NodePath::clause(template_id, &clause.id);

    for id in duplicates(clause.paragraphs.iter().map(|p| p.id.as_str())) {
        defects.push(Diagnostic::error(
            NodePath::paragraph(template_id, &clause.id, id),
            DiagnosticKind::DuplicateId { id: id.to_string() },
        ));
    }

    for paragraph in negative(&clause.paragraphs) {
        defects.push(Diagnostic::error(
            NodePath::paragraph(template_id, &clause.id, &paragraph.id),
            DiagnosticKind::NegativeOrder {
                order: paragraph.order,
            },
        ));
    }

    let orders: Vec<i64> = clause
        .paragraphs
        .iter()
        .filter(|p| p.order >= 0)
        .map(|p| p.order)
        .collect();
    check_orders(&orders, &clause_path, defects);
}

fn negative(paragraphs: &[Paragraph]) -> impl Iterator<Item = &Paragraph> {
    paragraphs.iter().filter(|p| p.order < 0)
}

/// Ids that occur more than once, each reported once, in first-seen order.
fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut seen_order = Vec::new();
    for id in ids {
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            seen_order.push(id);
        }
        *count += 1;
    }
    seen_order
        .into_iter()
        .filter(|id| counts.get(id).copied().unwrap_or(0) > 1)
        .collect()
}

/// Report duplicate orders (errors) and the first gap (warning) in a
/// sibling list of non-negative orders.
fn check_orders(orders: &[i64], path: &NodePath, defects: &mut Vec<Diagnostic>) {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for &order in orders {
        if !seen.insert(order) && reported.insert(order) {
            defects.push(Diagnostic::error(
                path.clone(),
                DiagnosticKind::DuplicateOrder { order },
            ));
        }
    }

    if let Some((expected, found)) = seen
        .iter()
        .enumerate()
        .map(|(i, &order)| (i as i64, order))
        .find(|(expected, found)| expected != found)
    {
        defects.push(Diagnostic::warning(
            path.clone(),
            DiagnosticKind::OrderGap { expected, found },
        ));
    }
}
