//! Soft diagnostics shared by the validator and the assembler.
//!
//! A diagnostic names the node it concerns (template, clause, paragraph) and
//! the kind of defect. Diagnostics accumulate into lists returned next to
//! results; they never abort an operation on their own.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Location of a node inside a template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodePath {
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<String>,
}

impl NodePath {
    pub fn template(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            clause_id: None,
            paragraph_id: None,
        }
    }

    pub fn clause(template_id: impl Into<String>, clause_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            clause_id: Some(clause_id.into()),
            paragraph_id: None,
        }
    }

    pub fn paragraph(
        template_id: impl Into<String>,
        clause_id: impl Into<String>,
        paragraph_id: impl Into<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            clause_id: Some(clause_id.into()),
            paragraph_id: Some(paragraph_id.into()),
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template_id)?;
        if let Some(clause) = &self.clause_id {
            write!(f, "/{}", clause)?;
        }
        if let Some(paragraph) = &self.paragraph_id {
            write!(f, "/{}", paragraph)?;
        }
        Ok(())
    }
}

/// The kind of defect a diagnostic reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A referenced parameter has no value at assembly time.
    MissingParameterValue { parameter_id: String },
    /// A `@token` or condition refers to a parameter absent from the catalog.
    DanglingReference { parameter_id: String },
    /// An operator or operand does not fit the parameter's declared type.
    TypeMismatch {
        parameter_id: String,
        detail: String,
    },
    /// A condition node could not be normalized or has an invalid shape.
    MalformedCondition { reason: String },
    /// Two siblings share an id.
    DuplicateId { id: String },
    /// Two siblings share an order value.
    DuplicateOrder { order: i64 },
    /// Sibling orders are not dense and zero-based.
    OrderGap { expected: i64, found: i64 },
    /// More than one clause is pinned at the Introduction position.
    MultipleIntroductions { count: usize },
    /// A node has a negative order that is not the Introduction's.
    NegativeOrder { order: i64 },
    /// A NOT node does not have exactly one child.
    NotArity { children: usize },
}

impl DiagnosticKind {
    /// The parameter id this diagnostic concerns, if any.
    pub fn parameter_id(&self) -> Option<&str> {
        match self {
            DiagnosticKind::MissingParameterValue { parameter_id }
            | DiagnosticKind::DanglingReference { parameter_id }
            | DiagnosticKind::TypeMismatch { parameter_id, .. } => Some(parameter_id),
            _ => None,
        }
    }

    /// Whether this kind describes the shape of the tree rather than its references.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::DuplicateId { .. }
                | DiagnosticKind::DuplicateOrder { .. }
                | DiagnosticKind::OrderGap { .. }
                | DiagnosticKind::MultipleIntroductions { .. }
                | DiagnosticKind::NegativeOrder { .. }
                | DiagnosticKind::NotArity { .. }
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingParameterValue { parameter_id } => {
                write!(f, "no value for parameter '{}'", parameter_id)
            }
            DiagnosticKind::DanglingReference { parameter_id } => {
                write!(f, "reference to unknown parameter '{}'", parameter_id)
            }
            DiagnosticKind::TypeMismatch {
                parameter_id,
                detail,
            } => write!(f, "type mismatch on '{}': {}", parameter_id, detail),
            DiagnosticKind::MalformedCondition { reason } => {
                write!(f, "malformed condition: {}", reason)
            }
            DiagnosticKind::DuplicateId { id } => write!(f, "duplicate id '{}'", id),
            DiagnosticKind::DuplicateOrder { order } => {
                write!(f, "duplicate order {}", order)
            }
            DiagnosticKind::OrderGap { expected, found } => {
                write!(f, "order gap: expected {}, found {}", expected, found)
            }
            DiagnosticKind::MultipleIntroductions { count } => {
                write!(f, "{} introduction clauses (at most one allowed)", count)
            }
            DiagnosticKind::NegativeOrder { order } => {
                write!(f, "negative order {}", order)
            }
            DiagnosticKind::NotArity { children } => {
                write!(f, "NOT requires exactly one child, found {}", children)
            }
        }
    }
}

/// A single diagnostic attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: NodePath,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(severity: Severity, path: NodePath, kind: DiagnosticKind) -> Self {
        Self {
            severity,
            path,
            kind,
        }
    }

    pub fn error(path: NodePath, kind: DiagnosticKind) -> Self {
        Self::new(Severity::Error, path, kind)
    }

    pub fn warning(path: NodePath, kind: DiagnosticKind) -> Self {
        Self::new(Severity::Warning, path, kind)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.kind, self.severity)
    }
}
