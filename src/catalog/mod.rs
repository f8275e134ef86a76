//! Parameter catalog and parameter values.
//!
//! The catalog is the set of parameters a template may reference: each has a
//! stable id, a declared type and, for enums, the allowed options. Parameter
//! values are the concrete answers for one document, coerced to the declared
//! types once at ingestion.
//!
//! # Catalog File Format
//!
//! ```text
//! - id: has_bonus
//!   type: boolean
//! - id: contract_type
//!   type: enum
//!   options: [fixed_term, permanent]
//! ```

mod value;


pub use value::Value;

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[serde(alias = "bool")]
    Boolean,
    Enum,
    Text,
    Number,
    Date,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::Boolean => write!(f, "boolean"),
            ParameterType::Enum => write!(f, "enum"),
            ParameterType::Text => write!(f, "text"),
            ParameterType::Number => write!(f, "number"),
            ParameterType::Date => write!(f, "date"),
        }
    }
}

/// A named, typed input referenced by conditions and `@tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ParameterType,

    /// Allowed values, in display order (enum parameters only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Human-facing name shown by editors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Parameter {
    pub fn new(id: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            id: id.into(),
            kind,
            options: Vec::new(),
            label: None,
        }
    }

    pub fn boolean(id: impl Into<String>) -> Self {
        Self::new(id, ParameterType::Boolean)
    }

    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, ParameterType::Text)
    }

    pub fn number(id: impl Into<String>) -> Self {
        Self::new(id, ParameterType::Number)
    }

    pub fn date(id: impl Into<String>) -> Self {
        Self::new(id, ParameterType::Date)
    }

    pub fn enumeration<I, S>(id: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::new(id, ParameterType::Enum)
        }
    }
}

/// The set of parameters known to one template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct Catalog {
    parameters: BTreeMap<String, Parameter>,
}

impl Catalog {
    /// Build a catalog; when an id repeats, the first declaration wins.
    pub fn new<I: IntoIterator<Item = Parameter>>(parameters: I) -> Self {
        let mut map = BTreeMap::new();
        for parameter in parameters {
            map.entry(parameter.id.clone()).or_insert(parameter);
        }
        Self { parameters: map }
    }

    pub fn get(&self, id: &str) -> Option<&Parameter> {
        self.parameters.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parameters.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameters in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }
}

impl From<Vec<Parameter>> for Catalog {
    fn from(parameters: Vec<Parameter>) -> Self {
        Catalog::new(parameters)
    }
}

impl From<Catalog> for Vec<Parameter> {
    fn from(catalog: Catalog) -> Self {
        catalog.parameters.into_values().collect()
    }
}

/// Concrete values for one document, keyed by parameter id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterValues {
    values: BTreeMap<String, Value>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(id.into(), value.into())
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Coerce a raw id → JSON map into typed values.
    ///
    /// Parameters known to `catalog` are coerced to their declared type and a
    /// value that does not fit is an error. Parameters the catalog does not
    /// know keep an inferred type so they can still be substituted. `null`
    /// entries mean "no value" and are skipped.
    pub fn from_json_map(
        raw: &BTreeMap<String, serde_json::Value>,
        catalog: Option<&Catalog>,
    ) -> Result<Self> {
        let mut values = ParameterValues::new();

        for (id, raw_value) in raw {
            let declared = catalog.and_then(|c| c.get(id));
            let value = match declared {
                Some(parameter) => Value::coerce(raw_value, parameter).map_err(|reason| {
                    EngineError::InvalidValue {
                        parameter_id: id.clone(),
                        reason,
                    }
                })?,
                None => {
                    if !raw_value.is_null() && Value::infer(raw_value).is_none() {
                        return Err(EngineError::InvalidValue {
                            parameter_id: id.clone(),
                            reason: "expected a scalar value".to_string(),
                        });
                    }
                    Value::infer(raw_value)
                }
            };

            if let Some(value) = value {
                values.values.insert(id.clone(), value);
            }
        }

        Ok(values)
    }
}

impl FromIterator<(String, Value)> for ParameterValues {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
