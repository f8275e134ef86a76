//! `@parameter` reference extraction and substitution.
//!
//! Free text in titles and content may embed references of the form
//! `@identifier`, where the identifier starts with an ASCII letter or an
//! underscore and continues with ASCII letters, digits or underscores.
//!
//! Matching is case-sensitive, leftmost-first, and whole-identifier only:
//! `@p1x` is a reference to `p1x`, never to `p1`.
//!
//! # Example
//!
//! ```
//! use clausekit::catalog::ParameterValues;
//! use clausekit::reference::{find_references, substitute};
//!
//! let text = "Salary of @salary paid by @employer.";
//! let ids: Vec<_> = find_references(text).into_iter().collect();
//! assert_eq!(ids, vec!["employer".to_string(), "salary".to_string()]);
//!
//! let values = ParameterValues::new().with("salary", 100000.0);
//! assert_eq!(substitute(text, &values), "Salary of 100000 paid by @employer.");
//! ```


use crate::catalog::ParameterValues;
use crate::config::RenderOptions;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid reference regex")
});

/// Whether `c` may start a parameter identifier.
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` may continue a parameter identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `id` is a well-formed parameter identifier.
pub fn is_valid_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_char),
        _ => false,
    }
}

/// One `@token` occurrence in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Referenced parameter id, without the `@`.
    pub parameter_id: String,
    /// Byte offset of the `@`.
    pub start: usize,
    /// Byte offset just past the identifier.
    pub end: usize,
}

/// Result of [`substitute_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Text with every resolvable token replaced.
    pub text: String,
    /// Ids of tokens left verbatim, in order of first appearance.
    pub unresolved: Vec<String>,
}

impl Substitution {
    /// Whether every token was resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Distinct parameter ids referenced in `text`.
pub fn find_references(text: &str) -> BTreeSet<String> {
    REFERENCE_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every reference in `text` with its byte span, left to right.
pub fn find_reference_spans(text: &str) -> Vec<Reference> {
    REFERENCE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Reference {
                parameter_id: caps[1].to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Replace resolvable references with their default rendering.
///
/// Tokens whose parameter has no value are left verbatim.
pub fn substitute(text: &str, values: &ParameterValues) -> String {
    substitute_with(text, values, &RenderOptions::default()).text
}

/// Replace resolvable references using `options`, reporting the rest.
///
/// # Arguments
///
/// * `text` - Title or content containing `@identifier` tokens
/// * `values` - Parameter values for this assembly
/// * `options` - How booleans and dates are rendered
///
/// # Returns
///
/// The substituted text and the ids of tokens that had no value.
pub fn substitute_with(
    text: &str,
    values: &ParameterValues,
    options: &RenderOptions,
) -> Substitution {
    let mut unresolved: Vec<String> = Vec::new();

    let replaced = REFERENCE_REGEX.replace_all(text, |caps: &Captures| {
        let id = &caps[1];
        match values.get(id) {
            Some(value) => value.render(options),
            None => {
                if !unresolved.iter().any(|u| u == id) {
                    unresolved.push(id.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    Substitution {
        text: replaced.into_owned(),
        unresolved,
    }
}
