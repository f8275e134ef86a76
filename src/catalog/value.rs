//! Typed parameter values.

use super::{Parameter, ParameterType};
use crate::config::RenderOptions;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A concrete value for a parameter.
///
/// Raw JSON/YAML values are coerced into this union once, against the
/// parameter's declared type, so comparisons never re-inspect loose JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Text(String),
    Number(f64),
    Date(NaiveDate),
    EnumOption(String),
}

impl Value {
    /// Infer a value from raw JSON without a declared type.
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn infer(raw: &serde_json::Value) -> Option<Value> {
        match raw {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            _ => None,
        }
    }

    /// Coerce raw JSON into a value of the parameter's declared type.
    ///
    /// `Ok(None)` means the raw value is `null`, i.e. no value is assigned.
    pub fn coerce(
        raw: &serde_json::Value,
        parameter: &Parameter,
    ) -> std::result::Result<Option<Value>, String> {
        use serde_json::Value as Json;

        if raw.is_null() {
            return Ok(None);
        }

        let value = match (parameter.kind, raw) {
            (ParameterType::Boolean, Json::Bool(b)) => Value::Bool(*b),
            (ParameterType::Boolean, Json::String(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(format!("expected a boolean, found \"{}\"", s)),
            },
            (ParameterType::Number, Json::Number(n)) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => return Err(format!("number {} is out of range", n)),
            },
            (ParameterType::Number, Json::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Value::Number(f),
                _ => return Err(format!("expected a number, found \"{}\"", s)),
            },
            (ParameterType::Date, Json::String(s)) => {
                match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                    Ok(d) => Value::Date(d),
                    Err(_) => {
                        return Err(format!(
                            "expected a date in YYYY-MM-DD form, found \"{}\"",
                            s
                        ));
                    }
                }
            }
            (ParameterType::Enum, Json::String(s)) => {
                if parameter.options.iter().any(|o| o == s) {
                    Value::EnumOption(s.clone())
                } else {
                    return Err(format!(
                        "\"{}\" is not one of the declared options [{}]",
                        s,
                        parameter.options.join(", ")
                    ));
                }
            }
            (ParameterType::Text, Json::String(s)) => Value::Text(s.clone()),
            (ParameterType::Text, Json::Number(n)) => Value::Text(n.to_string()),
            (ParameterType::Text, Json::Bool(b)) => Value::Text(b.to_string()),
            (_, Json::Array(_)) | (_, Json::Object(_)) => {
                return Err("expected a scalar value".to_string());
            }
            (kind, other) => {
                return Err(format!("expected a {} value, found {}", kind, other));
            }
        };

        Ok(Some(value))
    }

    /// Re-type an inferred value against a declared parameter, if possible.
    ///
    /// Used when condition operands were read without a catalog at hand.
    pub fn coerce_to(&self, parameter: &Parameter) -> Option<Value> {
        if self.fits(parameter) {
            return match (parameter.kind, self) {
                (ParameterType::Enum, Value::Text(s)) => Some(Value::EnumOption(s.clone())),
                _ => Some(self.clone()),
            };
        }
        Value::coerce(&self.to_json(), parameter).ok().flatten()
    }

    /// Whether this value is representable by the parameter's declared type.
    pub fn fits(&self, parameter: &Parameter) -> bool {
        match (parameter.kind, self) {
            (ParameterType::Boolean, Value::Bool(_)) => true,
            (ParameterType::Number, Value::Number(_)) => true,
            (ParameterType::Date, Value::Date(_)) => true,
            (ParameterType::Text, Value::Text(_) | Value::EnumOption(_)) => true,
            (ParameterType::Enum, Value::EnumOption(s) | Value::Text(s)) => {
                parameter.options.iter().any(|o| o == s)
            }
            _ => false,
        }
    }

    /// The string payload of text and enum values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::EnumOption(s) => Some(s),
            _ => None,
        }
    }

    /// Type-aware equality used by `equals`, `notEquals` and `oneOf`.
    ///
    /// Text and enum options compare by string; other kinds only match
    /// values of the same kind.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => match (self.as_str(), other.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Short name of the value's kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::EnumOption(_) => "enum",
        }
    }

    /// Convert back to raw JSON (dates as `YYYY-MM-DD`).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) | Value::EnumOption(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => match integral(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
        }
    }

    /// Human-readable rendering used when substituting `@tokens`.
    pub fn render(&self, options: &RenderOptions) -> String {
        match self {
            Value::Bool(true) => options.true_label.clone(),
            Value::Bool(false) => options.false_label.clone(),
            Value::Text(s) | Value::EnumOption(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Date(d) => {
                let mut out = String::new();
                if write!(out, "{}", d.format(&options.date_format)).is_err() {
                    out = d.format(DATE_FORMAT).to_string();
                }
                out
            }
        }
    }
}

fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        Some(n as i64)
    } else {
        None
    }
}

fn format_number(n: f64) -> String {
    match integral(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
