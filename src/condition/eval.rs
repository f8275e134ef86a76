//! Condition evaluation.
//!
//! Evaluation is total: every tree yields a boolean. Problems met along the
//! way (missing values, type mismatches, malformed nodes) make the affected
//! node `false` and are collected as diagnostic kinds in evaluation order.

use super::{CompareOp, Condition, LogicalOp, Operand};
use crate::catalog::{ParameterValues, Value};
use crate::diagnostics::DiagnosticKind;

/// Evaluate a condition, discarding any issues.
///
/// An absent condition means "always include".
///
/// # Example
///
/// ```
/// use clausekit::catalog::ParameterValues;
/// use clausekit::condition::{Condition, evaluate};
///
/// let values = ParameterValues::new().with("has_bonus", true);
/// assert!(evaluate(Some(&Condition::is_true("has_bonus")), &values));
/// assert!(evaluate(None, &values));
/// ```
pub fn evaluate(condition: Option<&Condition>, values: &ParameterValues) -> bool {
    Evaluator::new(values).evaluate(condition)
}

/// Evaluates conditions against one set of values and records issues.
#[derive(Debug)]
pub struct Evaluator<'a> {
    values: &'a ParameterValues,
    issues: Vec<DiagnosticKind>,
}

impl<'a> Evaluator<'a> {
    pub fn new(values: &'a ParameterValues) -> Self {
        Self {
            values,
            issues: Vec::new(),
        }
    }

    /// Evaluate an optional condition; absent is `true`.
    pub fn evaluate(&mut self, condition: Option<&Condition>) -> bool {
        match condition {
            None => true,
            Some(c) => self.eval(c),
        }
    }

    /// Issues recorded so far, in evaluation order.
    pub fn issues(&self) -> &[DiagnosticKind] {
        &self.issues
    }

    /// Drain recorded issues.
    pub fn take_issues(&mut self) -> Vec<DiagnosticKind> {
        std::mem::take(&mut self.issues)
    }

    fn eval(&mut self, condition: &Condition) -> bool {
        match condition {
            Condition::Compare {
                parameter_id,
                operator,
                operand,
            } => self.eval_compare(parameter_id, *operator, operand),
            Condition::Logical { operator, children } => match operator {
                // `all`/`any` short-circuit left to right, which fixes the
                // order in which issues are recorded.
                LogicalOp::And => children.iter().all(|c| self.eval(c)),
                LogicalOp::Or => children.iter().any(|c| self.eval(c)),
                LogicalOp::Not => match children.as_slice() {
                    [child] => !self.eval(child),
                    _ => {
                        self.issues.push(DiagnosticKind::MalformedCondition {
                            reason: format!(
                                "NOT requires exactly one child, found {}",
                                children.len()
                            ),
                        });
                        false
                    }
                },
            },
            Condition::Malformed { reason, .. } => {
                self.issues.push(DiagnosticKind::MalformedCondition {
                    reason: reason.clone(),
                });
                false
            }
        }
    }

    fn eval_compare(&mut self, parameter_id: &str, operator: CompareOp, operand: &Operand) -> bool {
        let values = self.values;
        let Some(value) = values.get(parameter_id) else {
            self.issues.push(DiagnosticKind::MissingParameterValue {
                parameter_id: parameter_id.to_string(),
            });
            return false;
        };

        match (operator, operand) {
            (CompareOp::Equals, Operand::Single(expected)) => value.matches(expected),
            (CompareOp::NotEquals, Operand::Single(expected)) => !value.matches(expected),
            (CompareOp::IsTrue | CompareOp::IsFalse, _) => match value {
                Value::Bool(b) => *b == (operator == CompareOp::IsTrue),
                other => {
                    self.mismatch(
                        parameter_id,
                        format!("{} requires a boolean, found {}", operator, other.kind_name()),
                    );
                    false
                }
            },
            (CompareOp::OneOf, Operand::List(candidates)) => {
                if value.as_str().is_none() {
                    self.mismatch(
                        parameter_id,
                        format!(
                            "oneOf requires a text or enum value, found {}",
                            value.kind_name()
                        ),
                    );
                    return false;
                }
                candidates.iter().any(|c| value.matches(c))
            }
            (op, _) => {
                self.issues.push(DiagnosticKind::MalformedCondition {
                    reason: format!("{} on '{}' is missing its operand", op, parameter_id),
                });
                false
            }
        }
    }

    fn mismatch(&mut self, parameter_id: &str, detail: String) {
        self.issues.push(DiagnosticKind::TypeMismatch {
            parameter_id: parameter_id.to_string(),
            detail,
        });
    }
}
