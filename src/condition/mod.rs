//! Condition AST, normalization, and evaluation.
//!
//! A condition is a boolean expression tree over parameter values that gates
//! whether a clause or paragraph appears in an assembled document.
//!
//! Conditions reach the engine either as a JSON tree or as a short textual
//! expression; both are normalized into [`Condition`] at the ingestion
//! boundary (see [`Condition::from_json`] and [`Condition::parse`]) so the
//! evaluator only ever sees one shape.
//!
//! # Textual Form
//!
//! ```text
//! @has_bonus AND NOT @probation is true
//! @contract_type in ["fixed_term", "casual"] OR @salary == 100000
//! ```
//!
//! A node that cannot be normalized becomes [`Condition::Malformed`]. It
//! evaluates to `false` and is reported by the validator; the rest of the
//! tree is unaffected.

mod eval;
mod normalize;
mod parse;


pub use eval::{Evaluator, evaluate};
pub use parse::MAX_NESTING;

use crate::catalog::{Catalog, Value};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equals,
    NotEquals,
    IsTrue,
    IsFalse,
    OneOf,
}

impl CompareOp {
    /// Canonical (camelCase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Equals => "equals",
            CompareOp::NotEquals => "notEquals",
            CompareOp::IsTrue => "isTrue",
            CompareOp::IsFalse => "isFalse",
            CompareOp::OneOf => "oneOf",
        }
    }

    /// Parse an operator name: camelCase, snake_case or symbolic.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "equals" | "eq" | "==" => Some(Self::Equals),
            "notEquals" | "not_equals" | "neq" | "!=" => Some(Self::NotEquals),
            "isTrue" | "is_true" => Some(Self::IsTrue),
            "isFalse" | "is_false" => Some(Self::IsFalse),
            "oneOf" | "one_of" | "in" => Some(Self::OneOf),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator of an internal condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }

    /// Parse an operator name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => Some(Self::And),
            "OR" | "||" => Some(Self::Or),
            "NOT" | "!" => Some(Self::Not),
            _ => None,
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `isTrue` / `isFalse` take no operand.
    None,
    /// `equals` / `notEquals`.
    Single(Value),
    /// `oneOf` candidates, in declaration order.
    List(Vec<Value>),
}

/// A boolean expression over parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Condition {
    /// Leaf comparison against one parameter.
    Compare {
        parameter_id: String,
        operator: CompareOp,
        operand: Operand,
    },
    /// AND / OR over zero or more children; NOT over exactly one.
    Logical {
        operator: LogicalOp,
        children: Vec<Condition>,
    },
    /// A node that could not be normalized. `source` keeps the raw input so a
    /// save does not destroy what the author wrote.
    Malformed {
        reason: String,
        source: serde_json::Value,
    },
}

impl Condition {
    // =========================================================================
    // Builders
    // =========================================================================

    pub fn is_true(parameter_id: impl Into<String>) -> Self {
        Self::compare(parameter_id, CompareOp::IsTrue, Operand::None)
    }

    pub fn is_false(parameter_id: impl Into<String>) -> Self {
        Self::compare(parameter_id, CompareOp::IsFalse, Operand::None)
    }

    pub fn equals(parameter_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(
            parameter_id,
            CompareOp::Equals,
            Operand::Single(value.into()),
        )
    }

    pub fn not_equals(parameter_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(
            parameter_id,
            CompareOp::NotEquals,
            Operand::Single(value.into()),
        )
    }

    pub fn one_of<I, V>(parameter_id: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::compare(
            parameter_id,
            CompareOp::OneOf,
            Operand::List(candidates.into_iter().map(Into::into).collect()),
        )
    }

    pub fn compare(parameter_id: impl Into<String>, operator: CompareOp, operand: Operand) -> Self {
        Condition::Compare {
            parameter_id: parameter_id.into(),
            operator,
            operand,
        }
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Logical {
            operator: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Logical {
            operator: LogicalOp::Or,
            children,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Condition) -> Self {
        Condition::Logical {
            operator: LogicalOp::Not,
            children: vec![child],
        }
    }

    pub fn malformed(reason: impl Into<String>, source: serde_json::Value) -> Self {
        Condition::Malformed {
            reason: reason.into(),
            source,
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Visit every node in pre-order, children left to right.
    pub fn walk<F: FnMut(&Condition)>(&self, f: &mut F) {
        f(self);
        if let Condition::Logical { children, .. } = self {
            for child in children {
                child.walk(f);
            }
        }
    }

    /// Every parameter id referenced by a comparison in this tree.
    pub fn parameter_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        self.walk(&mut |node| {
            if let Condition::Compare { parameter_id, .. } = node {
                ids.insert(parameter_id.clone());
            }
        });
        ids
    }

    /// Type operands against the catalog's declared parameter types.
    ///
    /// Operands that cannot be represented by the declared type are left as
    /// read; the validator reports them.
    pub fn coerce_operands(&mut self, catalog: &Catalog) {
        match self {
            Condition::Compare {
                parameter_id,
                operand,
                ..
            } => {
                let Some(parameter) = catalog.get(parameter_id) else {
                    return;
                };
                match operand {
                    Operand::Single(value) => {
                        if let Some(typed) = value.coerce_to(parameter) {
                            *value = typed;
                        }
                    }
                    Operand::List(values) => {
                        for value in values.iter_mut() {
                            if let Some(typed) = value.coerce_to(parameter) {
                                *value = typed;
                            }
                        }
                    }
                    Operand::None => {}
                }
            }
            Condition::Logical { children, .. } => {
                for child in children {
                    child.coerce_operands(catalog);
                }
            }
            Condition::Malformed { .. } => {}
        }
    }

    /// Whether the rendered form is an infix AND/OR chain. A single-child
    /// AND/OR renders as its child, so it inherits the child's answer.
    fn needs_parens(&self) -> bool {
        match self {
            Condition::Logical {
                operator: LogicalOp::And | LogicalOp::Or,
                children,
            } => match children.as_slice() {
                [only] => only.needs_parens(),
                _ => children.len() > 1,
            },
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Condition {
    fn from(raw: serde_json::Value) -> Self {
        Condition::from_json(&raw)
    }
}

impl From<Condition> for serde_json::Value {
    fn from(condition: Condition) -> Self {
        condition.to_json()
    }
}

/// Deserialize an optional condition, treating `null`, `""` and `{}` as absent.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::Object(map)) if map.is_empty() => None,
        Some(other) => Some(Condition::from_json(&other)),
    })
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(_) => write!(f, "{}", value.to_json()),
        Value::Text(s) | Value::EnumOption(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
        Value::Date(_) => write!(f, "{}", value.to_json()),
    }
}

impl fmt::Display for Condition {
    /// Render in the textual form accepted by [`Condition::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare {
                parameter_id,
                operator,
                operand,
            } => {
                write!(f, "@{}", parameter_id)?;
                match (operator, operand) {
                    (CompareOp::IsTrue, _) => write!(f, " is true"),
                    (CompareOp::IsFalse, _) => write!(f, " is false"),
                    (CompareOp::Equals | CompareOp::NotEquals, Operand::Single(v)) => {
                        let symbol = if *operator == CompareOp::Equals {
                            "=="
                        } else {
                            "!="
                        };
                        write!(f, " {} ", symbol)?;
                        write_literal(f, v)
                    }
                    (CompareOp::OneOf, Operand::List(values)) => {
                        write!(f, " in [")?;
                        for (i, v) in values.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write_literal(f, v)?;
                        }
                        write!(f, "]")
                    }
                    (op, _) => write!(f, " {} <missing operand>", op),
                }
            }
            Condition::Logical { operator, children } => match operator {
                LogicalOp::And | LogicalOp::Or if children.is_empty() => {
                    write!(f, "{}", *operator == LogicalOp::And)
                }
                LogicalOp::And | LogicalOp::Or => {
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            write!(f, " {} ", operator.as_str())?;
                        }
                        if child.needs_parens() {
                            write!(f, "({})", child)?;
                        } else {
                            write!(f, "{}", child)?;
                        }
                    }
                    Ok(())
                }
                LogicalOp::Not => match children.as_slice() {
                    [child] if child.needs_parens() => write!(f, "NOT ({})", child),
                    [child] => write!(f, "NOT {}", child),
                    _ => write!(f, "NOT <{} operands>", children.len()),
                },
            },
            Condition::Malformed { reason, .. } => write!(f, "<malformed: {}>", reason),
        }
    }
}
