//! Classification of JSON condition documents into [`Condition`] trees.
//!
//! Plain JSON is classified structurally: arrays are `OR` groups, objects are
//! `AND` groups keyed by field, everything else is a scalar. Objects whose keys
//! all start with `$` are operator objects:
//!
//! | Key | Meaning |
//! |---|---|
//! | `$and` | object, explicit `AND` |
//! | `$or`, `$xor` | array, explicit `OR` / `XOR` |
//! | `$not` | any condition |
//! | `$eq` `$gt` `$gte` `$lt` `$lte` | comparison with a value |
//! | `$startsWith` `$endsWith` `$contains` | string match |
//! | `$in` | array membership |
//! | `$regex` `$iregex` | pattern match, `$iregex` is case-insensitive |
//! | `$between` | `[lower, upper]` or `{lower, upper, lowerInclusive, upperInclusive}` |
//! | `$hasLabel` | label name |
//! | `$exists` `$isNull` | `true` |
//!
//! A comparison value of the form `{"$field": "n.other"}` is rendered as a
//! reference to another field instead of a parameter.

use serde_json::{Map, Value};
use thiserror::Error;

use super::comparators::{self, Comparator};
use super::conditions::Condition;

/// Default nesting limit for untrusted condition documents.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("Invalid conditions: {reason}")]
    InvalidConditions { reason: String },
}

fn invalid(reason: impl Into<String>) -> ConditionError {
    ConditionError::InvalidConditions {
        reason: reason.into(),
    }
}

/// A comparison operand, possibly a field reference.
fn operand(value: &Value) -> (Value, bool) {
    if let Value::Object(map) = value {
        if map.len() == 1 {
            if let Some(Value::String(reference)) = map.get("$field") {
                return (Value::String(reference.clone()), true);
            }
        }
    }
    (value.clone(), false)
}

fn with_reference(comparator: Comparator, field_reference: bool) -> Comparator {
    if field_reference {
        comparator.use_field_reference()
    } else {
        comparator
    }
}

fn binary_comparator(op: &str, value: &Value) -> Result<Option<Comparator>, ConditionError> {
    let (value, reference) = operand(value);
    let comparator = match op {
        "$eq" => comparators::equals(value),
        "$gt" => comparators::greater_than(value),
        "$gte" => comparators::greater_equal_to(value),
        "$lt" => comparators::less_than(value),
        "$lte" => comparators::less_equal_to(value),
        "$startsWith" => comparators::starts_with(value),
        "$endsWith" => comparators::ends_with(value),
        "$contains" => comparators::contains(value),
        "$in" => {
            if !reference && !value.is_array() {
                return Err(invalid("$in expects an array"));
            }
            comparators::in_array(value)
        }
        "$regex" | "$iregex" => {
            let pattern = value
                .as_str()
                .ok_or_else(|| invalid(format!("{} expects a string pattern", op)))?;
            let comparator = comparators::regexp(pattern, op == "$iregex");
            return Ok(Some(with_reference(comparator, reference)));
        }
        _ => return Ok(None),
    };
    Ok(Some(with_reference(comparator, reference)))
}

fn between_comparator(value: &Value) -> Result<Comparator, ConditionError> {
    let (lower, upper, lower_inclusive, upper_inclusive) = match value {
        Value::Array(bounds) if bounds.len() == 2 => (&bounds[0], &bounds[1], true, None),
        Value::Object(bounds) => {
            let lower = bounds
                .get("lower")
                .ok_or_else(|| invalid("$between requires a lower bound"))?;
            let upper = bounds
                .get("upper")
                .ok_or_else(|| invalid("$between requires an upper bound"))?;
            let flag = |key: &str| -> Result<Option<bool>, ConditionError> {
                match bounds.get(key) {
                    None => Ok(None),
                    Some(Value::Bool(b)) => Ok(Some(*b)),
                    Some(_) => Err(invalid(format!("$between {} must be a boolean", key))),
                }
            };
            let lower_inclusive = flag("lowerInclusive")?.unwrap_or(true);
            (lower, upper, lower_inclusive, flag("upperInclusive")?)
        }
        _ => return Err(invalid("$between expects [lower, upper] or an object")),
    };

    let (lower, lower_ref) = operand(lower);
    let (upper, upper_ref) = operand(upper);
    if lower_ref != upper_ref {
        return Err(invalid("$between bounds must both be values or both be field references"));
    }

    let comparator = comparators::between_with(
        lower,
        upper,
        lower_inclusive,
        upper_inclusive.unwrap_or(lower_inclusive),
    );
    Ok(with_reference(comparator, lower_ref))
}

fn expect_true(op: &str, value: &Value) -> Result<(), ConditionError> {
    match value {
        Value::Bool(true) => Ok(()),
        _ => Err(invalid(format!("{} expects true", op))),
    }
}

struct Classifier {
    max_depth: usize,
}

impl Classifier {
    fn classify(&self, value: &Value, depth: usize) -> Result<Condition, ConditionError> {
        if depth > self.max_depth {
            return Err(invalid(format!(
                "nesting exceeds the maximum depth of {}",
                self.max_depth
            )));
        }

        match value {
            Value::Array(items) => Ok(Condition::List(self.classify_items(items, depth)?)),
            Value::Object(map) if is_operator_object(map) => self.classify_operator(map, depth),
            Value::Object(map) => {
                if map.keys().any(|k| k.starts_with('$')) {
                    return Err(invalid("operator keys cannot be mixed with field keys"));
                }
                Ok(Condition::Map(self.classify_pairs(map, depth)?))
            }
            scalar => Ok(Condition::Scalar(scalar.clone())),
        }
    }

    fn classify_items(&self, items: &[Value], depth: usize) -> Result<Vec<Condition>, ConditionError> {
        items.iter().map(|v| self.classify(v, depth + 1)).collect()
    }

    fn classify_pairs(
        &self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Vec<(String, Condition)>, ConditionError> {
        map.iter()
            .map(|(k, v)| Ok((k.clone(), self.classify(v, depth + 1)?)))
            .collect()
    }

    fn classify_operator(
        &self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Condition, ConditionError> {
        // Several operators in one object are combined with AND on the same field
        let mut conditions = map
            .iter()
            .map(|(op, value)| self.classify_single_operator(op, value, depth))
            .collect::<Result<Vec<_>, _>>()?;

        if conditions.len() == 1 {
            Ok(conditions.remove(0))
        } else {
            Ok(Condition::And(
                conditions.into_iter().map(|c| (String::new(), c)).collect(),
            ))
        }
    }

    fn classify_single_operator(
        &self,
        op: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Condition, ConditionError> {
        match op {
            "$and" => match value {
                Value::Object(map) => Ok(Condition::And(self.classify_pairs(map, depth)?)),
                _ => Err(invalid("$and expects an object")),
            },
            "$or" | "$xor" => match value {
                Value::Array(items) => {
                    let items = self.classify_items(items, depth)?;
                    Ok(if op == "$or" {
                        Condition::Or(items)
                    } else {
                        Condition::Xor(items)
                    })
                }
                _ => Err(invalid(format!("{} expects an array", op))),
            },
            "$not" => Ok(Condition::Not(Box::new(self.classify(value, depth + 1)?))),
            "$between" => Ok(Condition::Comparator(between_comparator(value)?)),
            "$hasLabel" => match value {
                Value::String(label) => Ok(Condition::Comparator(comparators::has_label(label.as_str()))),
                _ => Err(invalid("$hasLabel expects a string")),
            },
            "$exists" => {
                expect_true(op, value)?;
                Ok(Condition::Comparator(comparators::exists()))
            }
            "$isNull" => {
                expect_true(op, value)?;
                Ok(Condition::Comparator(comparators::is_null()))
            }
            _ => binary_comparator(op, value)?
                .map(Condition::Comparator)
                .ok_or_else(|| invalid(format!("unknown operator {}", op))),
        }
    }
}

fn is_operator_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

impl Condition {
    /// Classify a JSON document with the default nesting limit.
    pub fn from_json(value: &Value) -> Result<Condition, ConditionError> {
        Self::from_json_with_limit(value, DEFAULT_MAX_DEPTH)
    }

    /// Classify a JSON document, rejecting trees nested deeper than `max_depth`.
    pub fn from_json_with_limit(value: &Value, max_depth: usize) -> Result<Condition, ConditionError> {
        Classifier { max_depth }.classify(value, 1)
    }
}
