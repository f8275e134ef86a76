//! Core validation logic.

use super::types::ValidationReport;
use crate::catalog::{Catalog, Parameter, ParameterType};
use crate::condition::{CompareOp, Condition, LogicalOp, Operand};
use crate::diagnostics::{Diagnostic, DiagnosticKind, NodePath};
use crate::reference::find_references;
use crate::template::Template;
use std::collections::BTreeSet;

/// Validate a template against a parameter catalog.
///
/// Structural defects come first, then per-node findings in document order
/// (clause, then its paragraphs). Each node reports a given problem once.
///
/// # Arguments
///
/// * `template` - The template to inspect
/// * `catalog` - Parameters the template may reference
///
/// # Returns
///
/// * `ValidationReport` - All diagnostics found; `passed()` if none are errors
///
/// # Example
///
/// ```
/// use clausekit::catalog::{Catalog, Parameter};
/// use clausekit::template::{Clause, Template};
/// use clausekit::validate::validate;
///
/// let catalog = Catalog::new([Parameter::text("p1")]);
/// let mut template = Template::new("t", "T");
/// template.clauses.push(Clause::new("c", "C", "Between @p1 and @p2."));
///
/// let report = validate(&template, &catalog);
/// assert!(!report.passed());
/// assert_eq!(report.dangling_references().into_iter().collect::<Vec<_>>(), vec!["p2"]);
/// ```
pub fn validate(template: &Template, catalog: &Catalog) -> ValidationReport {
    let mut diagnostics = template.structural_defects();

    for clause in template.clauses_in_order() {
        let path = NodePath::clause(&template.id, &clause.id);
        check_node(
            NodeView {
                path: &path,
                title: &clause.title,
                content: &clause.content,
                condition: clause.condition.as_ref(),
            },
            catalog,
            &mut diagnostics,
        );

        for paragraph in clause.paragraphs_in_order() {
            let path = NodePath::paragraph(&template.id, &clause.id, &paragraph.id);
            check_node(
                NodeView {
                    path: &path,
                    title: &paragraph.title,
                    content: &paragraph.content,
                    condition: paragraph.condition.as_ref(),
                },
                catalog,
                &mut diagnostics,
            );
        }
    }

    ValidationReport::new(&template.id, diagnostics)
}

/// The parts of a clause or paragraph the validator looks at.
struct NodeView<'a> {
    path: &'a NodePath,
    title: &'a str,
    content: &'a str,
    condition: Option<&'a Condition>,
}

fn check_node(node: NodeView<'_>, catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    let mut found: Vec<Diagnostic> = Vec::new();

    let mut referenced = find_references(node.title);
    referenced.extend(find_references(node.content));
    for id in referenced {
        if !catalog.contains(&id) {
            push_once(&mut found, Diagnostic::error(
                node.path.clone(),
                DiagnosticKind::DanglingReference { parameter_id: id },
            ));
        }
    }

    if let Some(condition) = node.condition {
        let mut kinds = Vec::new();
        check_condition(condition, catalog, &mut kinds);
        for kind in kinds {
            push_once(&mut found, Diagnostic::error(node.path.clone(), kind));
        }
    }

    out.extend(found);
}

fn push_once(found: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if !found.contains(&diagnostic) {
        found.push(diagnostic);
    }
}

fn check_condition(condition: &Condition, catalog: &Catalog, out: &mut Vec<DiagnosticKind>) {
    match condition {
        Condition::Compare {
            parameter_id,
            operator,
            operand,
        } => match catalog.get(parameter_id) {
            None => out.push(DiagnosticKind::DanglingReference {
                parameter_id: parameter_id.clone(),
            }),
            Some(parameter) => check_compare(parameter, *operator, operand, out),
        },
        Condition::Logical { operator, children } => {
            if *operator == LogicalOp::Not && children.len() != 1 {
                out.push(DiagnosticKind::NotArity {
                    children: children.len(),
                });
            }
            for child in children {
                check_condition(child, catalog, out);
            }
        }
        Condition::Malformed { reason, .. } => out.push(DiagnosticKind::MalformedCondition {
            reason: reason.clone(),
        }),
    }
}

fn check_compare(
    parameter: &Parameter,
    operator: CompareOp,
    operand: &Operand,
    out: &mut Vec<DiagnosticKind>,
) {
    let mismatch = |detail: String| DiagnosticKind::TypeMismatch {
        parameter_id: parameter.id.clone(),
        detail,
    };

    match operator {
        CompareOp::IsTrue | CompareOp::IsFalse => {
            if parameter.kind != ParameterType::Boolean {
                out.push(mismatch(format!(
                    "{} requires a boolean parameter, '{}' is {}",
                    operator, parameter.id, parameter.kind
                )));
            }
        }
        CompareOp::Equals | CompareOp::NotEquals => match operand {
            Operand::Single(value) => {
                if let Some(detail) = unrepresentable(parameter, value) {
                    out.push(mismatch(detail));
                }
            }
            _ => out.push(missing_operand(operator, parameter)),
        },
        CompareOp::OneOf => {
            if !matches!(parameter.kind, ParameterType::Enum | ParameterType::Text) {
                out.push(mismatch(format!(
                    "oneOf requires an enum or text parameter, '{}' is {}",
                    parameter.id, parameter.kind
                )));
                return;
            }
            match operand {
                Operand::List(values) => {
                    let mut reported = BTreeSet::new();
                    for value in values {
                        if let Some(detail) = unrepresentable(parameter, value) {
                            if reported.insert(detail.clone()) {
                                out.push(mismatch(detail));
                            }
                        }
                    }
                }
                _ => out.push(missing_operand(operator, parameter)),
            }
        }
    }
}

fn missing_operand(operator: CompareOp, parameter: &Parameter) -> DiagnosticKind {
    DiagnosticKind::MalformedCondition {
        reason: format!("{} on '{}' is missing its operand", operator, parameter.id),
    }
}

fn unrepresentable(parameter: &Parameter, value: &crate::catalog::Value) -> Option<String> {
    if value.fits(parameter) || value.coerce_to(parameter).is_some() {
        return None;
    }
    let shown = value.to_json();
    Some(match parameter.kind {
        ParameterType::Enum => format!(
            "{} is not one of the declared options [{}]",
            shown,
            parameter.options.join(", ")
        ),
        kind => format!("{} is not representable as {}", shown, kind),
    })
}
