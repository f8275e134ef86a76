//! JSON ingestion and canonical serialization of conditions.
//!
//! Accepted object shapes:
//!
//! ```text
//! {"type": "compare", "parameterId": "has_bonus", "operator": "isTrue"}
//! {"type": "compare", "parameterId": "kind", "operator": "oneOf", "value": ["a", "b"]}
//! {"type": "logical", "operator": "AND", "conditions": [ ... ]}
//! ```
//!
//! `condition`/`group` are accepted as type aliases, `parameter_id`/`parameter`
//! for the id, `children` for the child list and `values` for oneOf candidates.
//! Objects without `type` are logical when they carry a child list. A JSON
//! string is parsed as the textual form.

use super::{CompareOp, Condition, LogicalOp, Operand};
use crate::catalog::Value;
use crate::reference::is_valid_identifier;
use serde_json::{Map, Value as Json, json};

const PARAMETER_KEYS: [&str; 3] = ["parameterId", "parameter_id", "parameter"];
const CHILDREN_KEYS: [&str; 2] = ["conditions", "children"];

impl Condition {
    /// Normalize a raw JSON condition into the canonical tree.
    ///
    /// Never fails: nodes that cannot be understood become
    /// [`Condition::Malformed`] in place, leaving their siblings intact.
    pub fn from_json(raw: &Json) -> Condition {
        match raw {
            Json::String(text) => Condition::parse(text),
            Json::Object(map) => from_object(map, raw),
            other => Condition::malformed(
                format!("expected an object or a condition string, found {}", other),
                other.clone(),
            ),
        }
    }

    /// Canonical JSON tree form.
    pub fn to_json(&self) -> Json {
        match self {
            Condition::Compare {
                parameter_id,
                operator,
                operand,
            } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("compare"));
                map.insert("parameterId".to_string(), json!(parameter_id));
                map.insert("operator".to_string(), json!(operator.as_str()));
                match operand {
                    Operand::None => {}
                    Operand::Single(v) => {
                        map.insert("value".to_string(), v.to_json());
                    }
                    Operand::List(values) => {
                        let list = values.iter().map(Value::to_json).collect();
                        map.insert("value".to_string(), Json::Array(list));
                    }
                }
                Json::Object(map)
            }
            Condition::Logical { operator, children } => json!({
                "type": "logical",
                "operator": operator.as_str(),
                "conditions": children.iter().map(Condition::to_json).collect::<Vec<_>>(),
            }),
            Condition::Malformed { source, .. } => source.clone(),
        }
    }
}

fn first_of<'a>(map: &'a Map<String, Json>, keys: &[&str]) -> Option<&'a Json> {
    keys.iter().find_map(|k| map.get(*k))
}

fn from_object(map: &Map<String, Json>, raw: &Json) -> Condition {
    let is_logical = match map.get("type").and_then(Json::as_str) {
        Some("logical" | "group") => true,
        Some("compare" | "condition" | "comparison") => false,
        Some(other) => {
            return Condition::malformed(format!("unknown condition type '{}'", other), raw.clone());
        }
        None => first_of(map, &CHILDREN_KEYS).is_some(),
    };

    if is_logical {
        logical_from_object(map, raw)
    } else {
        compare_from_object(map, raw)
    }
}

fn logical_from_object(map: &Map<String, Json>, raw: &Json) -> Condition {
    let operator = match map.get("operator").and_then(Json::as_str) {
        Some(name) => match LogicalOp::from_str(name) {
            Some(op) => op,
            None => {
                return Condition::malformed(
                    format!("unknown logical operator '{}'", name),
                    raw.clone(),
                );
            }
        },
        None => return Condition::malformed("logical node without operator", raw.clone()),
    };

    let children = match first_of(map, &CHILDREN_KEYS) {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items.iter().map(Condition::from_json).collect(),
        Some(_) => {
            return Condition::malformed("logical children must be a list", raw.clone());
        }
    };

    Condition::Logical { operator, children }
}

fn compare_from_object(map: &Map<String, Json>, raw: &Json) -> Condition {
    let parameter_id = match first_of(map, &PARAMETER_KEYS).and_then(Json::as_str) {
        Some(id) => id.trim().trim_start_matches('@'),
        None => return Condition::malformed("comparison without parameter id", raw.clone()),
    };
    if parameter_id.is_empty() {
        return Condition::malformed("comparison without parameter id", raw.clone());
    }
    if !is_valid_identifier(parameter_id) {
        return Condition::malformed(
            format!("invalid parameter id '{}'", parameter_id),
            raw.clone(),
        );
    }
    let parameter_id = parameter_id.to_string();

    let operator = match map.get("operator").and_then(Json::as_str) {
        Some(name) => match CompareOp::from_str(name) {
            Some(op) => op,
            None => {
                return Condition::malformed(
                    format!("unknown comparison operator '{}'", name),
                    raw.clone(),
                );
            }
        },
        None => return Condition::malformed("comparison without operator", raw.clone()),
    };

    let operand_raw = map.get("value").or_else(|| map.get("values"));

    let operand = match operator {
        CompareOp::IsTrue | CompareOp::IsFalse => Operand::None,
        CompareOp::Equals | CompareOp::NotEquals => match operand_raw {
            None | Some(Json::Null) => Operand::None,
            Some(v) => match Value::infer(v) {
                Some(value) => Operand::Single(value),
                None => {
                    return Condition::malformed(
                        format!("{} expects a single scalar value", operator),
                        raw.clone(),
                    );
                }
            },
        },
        CompareOp::OneOf => match operand_raw {
            None | Some(Json::Null) => Operand::None,
            Some(Json::Array(items)) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match Value::infer(item) {
                        Some(value) => values.push(value),
                        None => {
                            return Condition::malformed(
                                "oneOf candidates must be scalar values",
                                raw.clone(),
                            );
                        }
                    }
                }
                Operand::List(values)
            }
            Some(single) => match Value::infer(single) {
                Some(value) => Operand::List(vec![value]),
                None => {
                    return Condition::malformed(
                        "oneOf candidates must be scalar values",
                        raw.clone(),
                    );
                }
            },
        },
    };

    Condition::Compare {
        parameter_id,
        operator,
        operand,
    }
}
