//! Core assembly logic.

use super::types::{Assembly, Section, SectionKind};
use crate::catalog::ParameterValues;
use crate::condition::{Condition, Evaluator};
use crate::config::{Config, MissingValuePolicy, RenderOptions};
use crate::diagnostics::{Diagnostic, DiagnosticKind, NodePath};
use crate::error::{EngineError, Result};
use crate::reference::substitute_with;
use crate::template::Template;
use tracing::{debug, warn};

/// Assemble with default rendering and the `exclude` missing-value policy.
///
/// # Example
///
/// ```
/// use clausekit::assemble::assemble;
/// use clausekit::catalog::ParameterValues;
/// use clausekit::condition::Condition;
/// use clausekit::template::{Clause, Paragraph, Template};
///
/// let mut template = Template::new("offer", "Offer");
/// template.clauses.push(
///     Clause::new("pay", "Pay", "Salary: @salary.")
///         .with_paragraph(
///             Paragraph::new("bonus", "Bonus", "A bonus applies.")
///                 .with_condition(Condition::is_true("has_bonus")),
///         ),
/// );
///
/// let values = ParameterValues::new().with("salary", 50000.0).with("has_bonus", false);
/// let assembly = assemble(&template, &values).unwrap();
/// assert_eq!(assembly.section_ids(), vec!["pay"]);
/// assert_eq!(assembly.sections[0].content, "Salary: 50000.");
/// ```
pub fn assemble(template: &Template, values: &ParameterValues) -> Result<Assembly> {
    Assembler::default().assemble(template, values)
}

/// Assembles documents with fixed rendering options and missing-value policy.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    render: RenderOptions,
    policy: MissingValuePolicy,
}

impl Assembler {
    pub fn new(render: RenderOptions, policy: MissingValuePolicy) -> Self {
        Self { render, policy }
    }

    /// Build an assembler from the engine configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.render.clone(), config.missing_value_policy)
    }

    pub fn with_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Assemble `template` for one set of values.
    ///
    /// # Returns
    ///
    /// * `Ok(Assembly)` - Included sections in document order, plus warnings
    /// * `Err(EngineError::InvalidTemplate)` - The tree violates a structural invariant
    /// * `Err(EngineError::AssemblyBlocked)` - Under the `block` policy, a
    ///   value needed by an evaluated condition or an included section is missing
    pub fn assemble(&self, template: &Template, values: &ParameterValues) -> Result<Assembly> {
        template.check_structure()?;

        let mut run = Run {
            template_id: &template.id,
            values,
            render: &self.render,
            warnings: Vec::new(),
        };

        let title = run.substitute(NodePath::template(&template.id), &template.title);
        let mut sections = Vec::new();

        for clause in template.clauses_in_order() {
            let path = NodePath::clause(&template.id, &clause.id);
            if !run.include(&path, clause.condition.as_ref()) {
                debug!(
                    template_id = %template.id,
                    clause_id = %clause.id,
                    skipped_paragraphs = clause.paragraphs.len(),
                    "excluded clause"
                );
                continue;
            }

            sections.push(Section {
                kind: if clause.is_introduction() {
                    SectionKind::Introduction
                } else {
                    SectionKind::Clause
                },
                clause_id: clause.id.clone(),
                paragraph_id: None,
                title: run.substitute(path.clone(), &clause.title),
                content: run.substitute(path, &clause.content),
            });

            for paragraph in clause.paragraphs_in_order() {
                let path = NodePath::paragraph(&template.id, &clause.id, &paragraph.id);
                if !run.include(&path, paragraph.condition.as_ref()) {
                    debug!(
                        template_id = %template.id,
                        clause_id = %clause.id,
                        paragraph_id = %paragraph.id,
                        "excluded paragraph"
                    );
                    continue;
                }
                sections.push(Section {
                    kind: SectionKind::Paragraph,
                    clause_id: clause.id.clone(),
                    paragraph_id: Some(paragraph.id.clone()),
                    title: run.substitute(path.clone(), &paragraph.title),
                    content: run.substitute(path, &paragraph.content),
                });
            }
        }

        if self.policy == MissingValuePolicy::Block {
            let missing = missing_parameters(&run.warnings);
            if !missing.is_empty() {
                return Err(EngineError::AssemblyBlocked {
                    template_id: template.id.clone(),
                    missing,
                });
            }
        }

        Ok(Assembly {
            template_id: template.id.clone(),
            title,
            sections,
            warnings: run.warnings,
        })
    }
}

/// State for one assembly pass.
struct Run<'a> {
    template_id: &'a str,
    values: &'a ParameterValues,
    render: &'a RenderOptions,
    warnings: Vec<Diagnostic>,
}

impl Run<'_> {
    fn include(&mut self, path: &NodePath, condition: Option<&Condition>) -> bool {
        let mut evaluator = Evaluator::new(self.values);
        let included = evaluator.evaluate(condition);
        for kind in evaluator.take_issues() {
            self.record(path.clone(), kind);
        }
        included
    }

    fn substitute(&mut self, path: NodePath, text: &str) -> String {
        let result = substitute_with(text, self.values, self.render);
        for parameter_id in result.unresolved {
            self.record(
                path.clone(),
                DiagnosticKind::MissingParameterValue { parameter_id },
            );
        }
        result.text
    }

    /// Record a diagnostic unless this node already reported it.
    fn record(&mut self, path: NodePath, kind: DiagnosticKind) {
        let diagnostic = match kind {
            DiagnosticKind::MalformedCondition { .. } => Diagnostic::error(path, kind),
            _ => Diagnostic::warning(path, kind),
        };
        if self.warnings.contains(&diagnostic) {
            return;
        }

        match &diagnostic.kind {
            DiagnosticKind::MissingParameterValue { parameter_id } => warn!(
                template_id = %self.template_id,
                node = %diagnostic.path,
                parameter_id = %parameter_id,
                "no value for parameter"
            ),
            DiagnosticKind::MalformedCondition { reason } => warn!(
                template_id = %self.template_id,
                node = %diagnostic.path,
                reason = %reason,
                "malformed condition excludes node"
            ),
            other => warn!(
                template_id = %self.template_id,
                node = %diagnostic.path,
                "{}",
                other
            ),
        }
        self.warnings.push(diagnostic);
    }
}

/// Distinct missing parameter ids, in order of first report.
fn missing_parameters(warnings: &[Diagnostic]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for warning in warnings {
        if let DiagnosticKind::MissingParameterValue { parameter_id } = &warning.kind {
            if !missing.contains(parameter_id) {
                missing.push(parameter_id.clone());
            }
        }
    }
    missing
}
