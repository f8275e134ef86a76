//! Tests for the template tree model.

use super::*;
use crate::condition::{CompareOp, LogicalOp};
use crate::diagnostics::DiagnosticKind;
use crate::error::EngineError;
use crate::test_support::{employment_catalog, employment_template};

fn clause_ids(template: &Template) -> Vec<&str> {
    template
        .clauses_in_order()
        .into_iter()
        .map(|c| c.id.as_str())
        .collect()
}

fn paragraph_ids<'a>(template: &'a Template, clause_id: &str) -> Vec<&'a str> {
    template
        .clause(clause_id)
        .expect("clause exists")
        .paragraphs_in_order()
        .into_iter()
        .map(|p| p.id.as_str())
        .collect()
}

fn assert_dense(template: &Template) {
    let regular: Vec<i64> = template
        .clauses_in_order()
        .into_iter()
        .filter(|c| !c.is_introduction())
        .map(|c| c.order)
        .collect();
    assert_eq!(regular, (0..regular.len() as i64).collect::<Vec<_>>());
    for clause in &template.clauses {
        let orders: Vec<i64> = clause.paragraphs_in_order().iter().map(|p| p.order).collect();
        assert_eq!(orders, (0..orders.len() as i64).collect::<Vec<_>>());
    }
}

// =============================================================================
// Parsing and traversal
// =============================================================================

#[test]
fn test_parse_template_yaml() {
    let yaml = r#"
id: nda
title: Mutual NDA
version: 2
clauses:
  - id: term
    title: Term
    content: Lasts @term_years years.
    order: 1
  - id: intro
    title: Introduction
    content: Between @party_a and @party_b.
    order: -1
  - id: scope
    title: Scope
    order: 0
    condition: "@mutual is true"
    paragraphs:
      - id: p2
        content: Second.
        order: 1
      - id: p1
        content: First.
        order: 0
        condition:
          type: compare
          parameterId: region
          operator: oneOf
          value: [EU, UK]
"#;
    let template = Template::from_yaml(yaml).expect("parse");
    assert_eq!(template.version, 2);
    assert_eq!(clause_ids(&template), vec!["intro", "scope", "term"]);
    assert_eq!(paragraph_ids(&template, "scope"), vec!["p1", "p2"]);
    assert_eq!(template.introduction().map(|c| c.id.as_str()), Some("intro"));

    let scope = template.clause("scope").expect("scope");
    assert_eq!(scope.condition, Some(Condition::is_true("mutual")));
    let p1 = scope.paragraph("p1").expect("p1");
    assert_eq!(
        p1.condition,
        Some(Condition::one_of("region", ["EU", "UK"]))
    );
}

#[test]
fn test_empty_condition_forms_are_absent() {
    let yaml = r#"
id: t
clauses:
  - id: a
    condition: null
  - id: b
    condition: ""
    order: 1
  - id: c
    condition: {}
    order: 2
"#;
    let template = Template::from_yaml(yaml).expect("parse");
    assert!(template.clauses.iter().all(|c| c.condition.is_none()));
}

#[test]
fn test_unknown_operator_is_preserved_on_round_trip() {
    let yaml = r#"
id: t
clauses:
  - id: a
    condition:
      type: compare
      parameterId: x
      operator: greaterThan
      value: 3
"#;
    let template = Template::from_yaml(yaml).expect("parse");
    assert!(matches!(
        template.clauses[0].condition,
        Some(Condition::Malformed { .. })
    ));

    let saved = template.to_yaml().expect("serialize");
    assert!(saved.contains("greaterThan"));
    let reloaded = Template::from_yaml(&saved).expect("reparse");
    assert_eq!(reloaded, template);
}

#[test]
fn test_unknown_fields_are_preserved() {
    let yaml = "id: t\nowner: legal-team\nclauses: []\n";
    let template = Template::from_yaml(yaml).expect("parse");
    assert_eq!(
        template.extra.get("owner"),
        Some(&serde_yaml::Value::String("legal-team".to_string()))
    );
    assert!(template.to_yaml().expect("serialize").contains("owner: legal-team"));
}

#[test]
fn test_parse_template_json() {
    let json = r#"{
        "id": "t",
        "title": "T",
        "clauses": [
            {"id": "a", "order": 0, "condition": {"type": "logical", "operator": "and", "conditions": [
                {"type": "compare", "parameterId": "x", "operator": "isTrue"},
                "@y == 'b'"
            ]}}
        ]
    }"#;
    let template = Template::from_json(json).expect("parse");
    let Some(Condition::Logical { operator, children }) = &template.clauses[0].condition else {
        panic!("expected logical condition");
    };
    assert_eq!(*operator, LogicalOp::And);
    assert_eq!(children.len(), 2);
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Template::from_yaml("id: [unclosed").unwrap_err();
    assert!(matches!(err, EngineError::UserError(_)));
    assert!(err.to_string().contains("Fix:"));
}

#[test]
fn test_coerce_conditions_types_operands() {
    let mut template = Template::new("t", "T");
    template.clauses.push(
        Clause::new("a", "", "").with_condition(Condition::equals("salary", "95000")),
    );
    template.coerce_conditions(&employment_catalog());
    let Some(Condition::Compare { operator, operand, .. }) = &template.clauses[0].condition else {
        panic!("expected compare");
    };
    assert_eq!(*operator, CompareOp::Equals);
    assert_eq!(*operand, crate::condition::Operand::Single(95000.0.into()));
}

// =============================================================================
// Structure checks
// =============================================================================

#[test]
fn test_fixture_is_structurally_valid() {
    let template = employment_template();
    assert!(template.check_structure().is_ok());
    assert!(template.structural_defects().is_empty());
}

#[test]
fn test_duplicate_clause_id_rejected() {
    let mut template = employment_template();
    template
        .clauses
        .push(Clause::new("duties", "Again", "").with_order(3));
    let err = template.check_structure().unwrap_err();
    let EngineError::InvalidTemplate { defects, .. } = &err else {
        panic!("expected InvalidTemplate, got {err:?}");
    };
    assert!(defects
        .iter()
        .any(|d| d.kind == DiagnosticKind::DuplicateId { id: "duties".to_string() }));
}

#[test]
fn test_duplicate_order_and_multiple_introductions() {
    let mut template = employment_template();
    template
        .clauses
        .push(Clause::new("preamble", "Preamble", "").with_order(-1));
    template
        .clauses
        .push(Clause::new("extra", "Extra", "").with_order(1));
    let defects = template.structural_defects();
    assert!(defects
        .iter()
        .any(|d| d.kind == DiagnosticKind::MultipleIntroductions { count: 2 }));
    assert!(defects
        .iter()
        .any(|d| d.kind == DiagnosticKind::DuplicateOrder { order: 1 }));
    assert!(template.check_structure().is_err());
}

#[test]
fn test_negative_order_rejected() {
    let mut template = employment_template();
    template.clauses[1].order = -3;
    let defects = template.structural_defects();
    assert!(defects
        .iter()
        .any(|d| d.kind == DiagnosticKind::NegativeOrder { order: -3 } && d.is_error()));
}

#[test]
fn test_order_gap_is_warning_only() {
    let mut template = employment_template();
    template.clauses[3].order = 7;
    let defects = template.structural_defects();
    assert_eq!(defects.len(), 1);
    assert!(!defects[0].is_error());
    assert_eq!(
        defects[0].kind,
        DiagnosticKind::OrderGap {
            expected: 2,
            found: 7
        }
    );
    assert!(template.check_structure().is_ok());
}

#[test]
fn test_duplicate_paragraph_id_rejected() {
    let mut template = employment_template();
    let duties = template.clause_mut("duties").expect("duties");
    duties
        .paragraphs
        .push(Paragraph::new("hours", "", "").with_order(2));
    let defects = template.structural_defects();
    assert!(defects
        .iter()
        .any(|d| d.kind == DiagnosticKind::DuplicateId { id: "hours".to_string() }
            && d.path.paragraph_id.as_deref() == Some("hours")));
}

// =============================================================================
// Mutations
// =============================================================================

#[test]
fn test_insert_clause_at_position() {
    let mut template = employment_template();
    template
        .insert_clause(Clause::new("leave", "Leave", "Annual leave applies."), 1)
        .expect("insert");
    assert_eq!(
        clause_ids(&template),
        vec!["intro", "duties", "leave", "remuneration", "probation"]
    );
    assert_dense(&template);
}

#[test]
fn test_insert_clause_appends_at_end() {
    let mut template = employment_template();
    template
        .insert_clause(Clause::new("signatures", "Signatures", ""), 3)
        .expect("insert");
    assert_eq!(clause_ids(&template).last(), Some(&"signatures"));
    assert_dense(&template);
}

#[test]
fn test_insert_clause_with_intro_order_becomes_regular() {
    let mut template = employment_template();
    template
        .insert_clause(Clause::new("x", "", "").with_order(-1), 0)
        .expect("insert");
    assert_eq!(template.introduction().map(|c| c.id.as_str()), Some("intro"));
    assert_eq!(clause_ids(&template)[1], "x");
}

#[test]
fn test_insert_clause_duplicate_id_leaves_tree_unchanged() {
    let mut template = employment_template();
    let before = template.clone();
    let err = template
        .insert_clause(Clause::new("duties", "", ""), 0)
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateIdentifier { .. }));
    assert_eq!(template, before);
}

#[test]
fn test_insert_clause_out_of_range() {
    let mut template = employment_template();
    let err = template
        .insert_clause(Clause::new("x", "", ""), 4)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidPosition {
            position: 4,
            max: 3
        }
    ));
}

#[test]
fn test_set_introduction_replaces_existing() {
    let mut template = employment_template();
    let old = template
        .set_introduction(Clause::new("recitals", "Recitals", "Whereas..."))
        .expect("set");
    assert_eq!(old.map(|c| c.id), Some("intro".to_string()));
    assert_eq!(clause_ids(&template)[0], "recitals");
    assert!(template.clause("intro").is_none());
    assert!(template.check_structure().is_ok());
}

#[test]
fn test_set_introduction_may_reuse_replaced_id() {
    let mut template = employment_template();
    template
        .set_introduction(Clause::new("intro", "Preamble", ""))
        .expect("set");
    assert_eq!(template.introduction().map(|c| c.title.as_str()), Some("Preamble"));
}

#[test]
fn test_set_introduction_rejects_regular_id() {
    let mut template = employment_template();
    let err = template
        .set_introduction(Clause::new("duties", "", ""))
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateIdentifier { .. }));
}

#[test]
fn test_insert_and_delete_paragraph() {
    let mut template = employment_template();
    template
        .insert_paragraph("duties", Paragraph::new("location", "Location", ""), 0)
        .expect("insert");
    assert_eq!(paragraph_ids(&template, "duties"), vec!["location", "hours", "casual"]);
    assert_dense(&template);

    let removed = template.delete_paragraph("duties", "hours").expect("delete");
    assert_eq!(removed.id, "hours");
    assert_eq!(paragraph_ids(&template, "duties"), vec!["location", "casual"]);
    assert_dense(&template);
}

#[test]
fn test_insert_paragraph_errors() {
    let mut template = employment_template();
    assert!(matches!(
        template.insert_paragraph("nope", Paragraph::new("x", "", ""), 0),
        Err(EngineError::NodeNotFound(_))
    ));
    assert!(matches!(
        template.insert_paragraph("duties", Paragraph::new("hours", "", ""), 0),
        Err(EngineError::DuplicateIdentifier { .. })
    ));
    assert!(matches!(
        template.insert_paragraph("duties", Paragraph::new("x", "", ""), 3),
        Err(EngineError::InvalidPosition { position: 3, max: 2 })
    ));
}

#[test]
fn test_delete_clause_renumbers() {
    let mut template = employment_template();
    let removed = template.delete_clause("duties").expect("delete");
    assert_eq!(removed.paragraphs.len(), 2);
    assert_eq!(clause_ids(&template), vec!["intro", "remuneration", "probation"]);
    assert_dense(&template);
    assert!(matches!(
        template.delete_clause("duties"),
        Err(EngineError::NodeNotFound(_))
    ));
}

#[test]
fn test_move_clause() {
    let mut template = employment_template();
    template.move_clause("probation", 0).expect("move");
    assert_eq!(
        clause_ids(&template),
        vec!["intro", "probation", "duties", "remuneration"]
    );
    assert_dense(&template);
}

#[test]
fn test_move_clause_rejects_introduction_and_bad_position() {
    let mut template = employment_template();
    assert!(matches!(
        template.move_clause("intro", 1),
        Err(EngineError::UserError(_))
    ));
    assert!(matches!(
        template.move_clause("duties", 3),
        Err(EngineError::InvalidPosition { position: 3, max: 2 })
    ));
}

#[test]
fn test_move_paragraph_within_clause() {
    let mut template = employment_template();
    template.move_paragraph("duties", "casual", 0).expect("move");
    assert_eq!(paragraph_ids(&template, "duties"), vec!["casual", "hours"]);
    assert_dense(&template);
}

#[test]
fn test_move_paragraph_to_other_clause() {
    let mut template = employment_template();
    template
        .move_paragraph_to("duties", "casual", "remuneration", 0)
        .expect("move");
    assert_eq!(paragraph_ids(&template, "duties"), vec!["hours"]);
    assert_eq!(paragraph_ids(&template, "remuneration"), vec!["casual", "bonus"]);
    assert_dense(&template);
}

#[test]
fn test_move_paragraph_to_collision_leaves_tree_unchanged() {
    let mut template = employment_template();
    template
        .insert_paragraph("remuneration", Paragraph::new("hours", "", ""), 0)
        .expect("insert");
    let before = template.clone();
    let err = template
        .move_paragraph_to("duties", "hours", "remuneration", 0)
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateIdentifier { .. }));
    assert_eq!(template, before);
}

#[test]
fn test_merge_clauses_preserves_gating() {
    let mut template = employment_template();
    template.merge_clauses("remuneration", "probation").expect("merge");

    assert!(template.clause("probation").is_none());
    assert_eq!(
        paragraph_ids(&template, "remuneration"),
        vec!["bonus", "probation", "review"]
    );
    assert_dense(&template);

    let remuneration = template.clause("remuneration").expect("remuneration");
    let leading = remuneration.paragraph("probation").expect("leading paragraph");
    assert_eq!(leading.title, "Probation");
    assert_eq!(leading.condition, Some(Condition::is_true("has_probation")));
    let review = remuneration.paragraph("review").expect("review");
    assert_eq!(review.condition, Some(Condition::is_true("has_probation")));
}

#[test]
fn test_merge_ands_source_condition_with_paragraph_condition() {
    let mut template = employment_template();
    template.clauses[2].condition = Some(Condition::is_true("x"));
    template.merge_clauses("duties", "remuneration").expect("merge");
    let bonus = template
        .clause("duties")
        .and_then(|c| c.paragraph("bonus"))
        .expect("bonus moved");
    assert_eq!(
        bonus.condition,
        Some(Condition::and(vec![
            Condition::is_true("x"),
            Condition::is_true("has_bonus")
        ]))
    );
}

#[test]
fn test_merge_collision_aborts_unchanged() {
    let mut template = employment_template();
    template
        .insert_paragraph("duties", Paragraph::new("review", "", ""), 0)
        .expect("insert");
    let before = template.clone();
    let err = template.merge_clauses("duties", "probation").unwrap_err();
    assert!(matches!(err, EngineError::DuplicateIdentifier { .. }));
    assert_eq!(template, before);
}

#[test]
fn test_merge_into_self_rejected() {
    let mut template = employment_template();
    assert!(template.merge_clauses("duties", "duties").is_err());
}

#[test]
fn test_renumber_closes_gaps() {
    let mut template = employment_template();
    template.clauses[1].order = 10;
    template.clauses[2].order = 20;
    template.clauses[3].order = 30;
    template.renumber();
    assert_eq!(
        template.clauses.iter().map(|c| c.order).collect::<Vec<_>>(),
        vec![-1, 0, 1, 2]
    );
}

// =============================================================================
// Repair
// =============================================================================

#[test]
fn test_repair_keeps_first_occurrence() {
    let mut template = employment_template();
    template
        .clauses
        .push(Clause::new("duties", "Second Duties", "").with_order(0));
    template
        .clause_mut("remuneration")
        .expect("remuneration")
        .paragraphs
        .push(Paragraph::new("bonus", "Second Bonus", "").with_order(0));

    let report = template.repair();
    assert_eq!(report.removed_clauses, vec!["duties"]);
    assert_eq!(
        report.removed_paragraphs,
        vec![("remuneration".to_string(), "bonus".to_string())]
    );
    assert_eq!(template.clause("duties").map(|c| c.title.as_str()), Some("Duties"));
    assert!(template.check_structure().is_ok());
}

#[test]
fn test_repair_demotes_extra_introductions_to_end() {
    let mut template = employment_template();
    template
        .clauses
        .push(Clause::new("preamble", "Preamble", "").with_order(-1));
    let report = template.repair();
    assert_eq!(report.demoted_introductions, vec!["preamble"]);
    assert_eq!(
        clause_ids(&template),
        vec!["intro", "duties", "remuneration", "probation", "preamble"]
    );
    assert_dense(&template);
    assert!(template.check_structure().is_ok());
}

#[test]
fn test_repair_with_extreme_order_demotes_after_existing() {
    let mut template = Template::new("t", "T");
    template.clauses = vec![
        Clause::new("first", "First", "").with_order(-1),
        Clause::new("last", "Last", "").with_order(i64::MAX),
        Clause::new("second", "Second", "").with_order(-1),
        Clause::new("middle", "Middle", "").with_order(3),
    ];

    let report = template.repair();

    assert_eq!(report.demoted_introductions, vec!["second"]);
    assert!(report.renumbered);
    assert_eq!(clause_ids(&template), vec!["first", "middle", "last", "second"]);
    assert_eq!(template.clause("second").map(|c| c.order), Some(2));
    assert!(template.check_structure().is_ok());
}

#[test]
fn test_repair_with_max_order_and_single_introduction() {
    let mut template = Template::new("t", "T");
    template.clauses = vec![Clause::new("a", "A", "").with_order(i64::MAX)];

    let report = template.repair();

    assert!(report.demoted_introductions.is_empty());
    assert_eq!(template.clause("a").map(|c| c.order), Some(0));
}

#[test]
fn test_repair_on_canonical_tree_is_empty() {
    let mut template = employment_template();
    let report = template.repair();
    assert!(report.is_empty());
    assert_eq!(report.to_string(), "nothing to repair\n");
}

#[test]
fn test_repair_reports_renumbering() {
    let mut template = employment_template();
    template.clauses[3].order = 9;
    let report = template.repair();
    assert!(report.renumbered);
    assert!(report.to_string().contains("renumbered"));
}
