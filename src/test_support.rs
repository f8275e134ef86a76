//! Shared fixtures for unit tests.

use crate::catalog::{Catalog, Parameter, ParameterValues};
use crate::condition::Condition;
use crate::template::{Clause, Paragraph, Template};

/// Catalog used by the employment fixtures.
pub fn employment_catalog() -> Catalog {
    Catalog::new([
        Parameter::text("employee_name"),
        Parameter::text("employer_name"),
        Parameter::boolean("has_bonus"),
        Parameter::boolean("has_probation"),
        Parameter::number("salary"),
        Parameter::number("bonus_pct"),
        Parameter::date("start_date"),
        Parameter::enumeration("contract_type", ["permanent", "fixed_term", "casual"]),
    ])
}

/// Employment agreement with an Introduction, a conditional clause and
/// conditional paragraphs.
pub fn employment_template() -> Template {
    let mut template = Template::new("employment", "Employment Agreement");
    template.clauses = vec![
        Clause::new(
            "intro",
            "Introduction",
            "This agreement is between @employer_name and @employee_name.",
        )
        .with_order(-1),
        Clause::new("duties", "Duties", "The employee will perform the duties of the role.")
            .with_order(0)
            .with_paragraph(Paragraph::new("hours", "Hours", "Standard hours apply."))
            .with_paragraph(
                Paragraph::new("casual", "Casual Work", "Hours are offered as available.")
                    .with_condition(Condition::equals("contract_type", "casual")),
            ),
        Clause::new("remuneration", "Remuneration", "The salary is @salary per year.")
            .with_order(1)
            .with_paragraph(
                Paragraph::new("bonus", "Bonus", "A bonus of @bonus_pct% is payable.")
                    .with_condition(Condition::is_true("has_bonus")),
            ),
        Clause::new(
            "probation",
            "Probation",
            "A probation period applies from @start_date.",
        )
        .with_order(2)
        .with_condition(Condition::is_true("has_probation"))
        .with_paragraph(Paragraph::new(
            "review",
            "Review",
            "Performance is reviewed at the end of probation.",
        )),
    ];
    template
}

/// Values that include every section of [`employment_template`] except the
/// casual-work paragraph.
pub fn employment_values() -> ParameterValues {
    ParameterValues::new()
        .with("employee_name", "Jordan Lee")
        .with("employer_name", "Acme Pty Ltd")
        .with("has_bonus", true)
        .with("has_probation", true)
        .with("salary", 95000.0)
        .with("bonus_pct", 10.0)
        .with(
            "start_date",
            chrono::NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"),
        )
        .with("contract_type", "permanent")
}
