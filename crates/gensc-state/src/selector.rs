//! Rich-query evaluation for the in-memory backend.
//!
//! Queries are JSON documents in the Mango style understood by document
//! state databases:
//!
//! ```json
//! {"selector": {"docType": "IOTdevice", "Value": {"$gte": 100}}, "limit": 10}
//! ```
//!
//! Supported selector forms:
//! - implicit equality: `{"field": value}`
//! - nested fields, either as `{"a.b": v}` or `{"a": {"b": v}}`
//! - operators `$eq $ne $gt $gte $lt $lte $in $nin $exists`
//! - combinators `$and $or` over arrays of selectors

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{StateError, StateResult};

/// A parsed rich query.
#[derive(Clone, Debug, PartialEq)]
pub struct RichQuery {
    selector: Selector,
    limit: Option<usize>,
}

impl RichQuery {
    /// Parse a query document.
    pub fn parse(query: &str) -> StateResult<Self> {
        let document: Value = serde_json::from_str(query)
            .map_err(|e| StateError::InvalidQuery(format!("query is not JSON: {e}")))?;
        let document = document
            .as_object()
            .ok_or_else(|| StateError::InvalidQuery("query must be a JSON object".into()))?;

        let selector = match document.get("selector") {
            Some(Value::Object(fields)) => Selector::parse_object(fields, &[])?,
            Some(_) => return Err(StateError::InvalidQuery("selector must be an object".into())),
            None => return Err(StateError::InvalidQuery("query has no selector".into())),
        };

        let limit = match document.get("limit") {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .ok_or_else(|| StateError::InvalidQuery("limit must be a non-negative integer".into()))?
                    as usize,
            ),
        };

        Ok(Self { selector, limit })
    }

    /// Maximum number of results requested by the query itself.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if `document` satisfies the selector.
    pub fn matches(&self, document: &Value) -> bool {
        self.selector.matches(document)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Selector {
    And(Vec<Selector>),
    Or(Vec<Selector>),
    Field { path: Vec<String>, condition: Condition },
}

#[derive(Clone, Debug, PartialEq)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
}

impl Selector {
    fn parse_object(fields: &Map<String, Value>, base: &[String]) -> StateResult<Self> {
        let mut clauses = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match name.as_str() {
                "$and" => clauses.push(Self::And(Self::parse_list(name, value, base)?)),
                "$or" => clauses.push(Self::Or(Self::parse_list(name, value, base)?)),
                op if op.starts_with('$') => {
                    return Err(StateError::InvalidQuery(format!(
                        "operator {op} is not valid at field level"
                    )))
                }
                field => {
                    let mut path = base.to_vec();
                    path.extend(field.split('.').map(str::to_string));
                    clauses.push(Self::parse_field(path, value)?);
                }
            }
        }
        Ok(match clauses.len() {
            1 => clauses.remove(0),
            _ => Self::And(clauses),
        })
    }

    fn parse_list(op: &str, value: &Value, base: &[String]) -> StateResult<Vec<Self>> {
        let items = value
            .as_array()
            .ok_or_else(|| StateError::InvalidQuery(format!("{op} expects an array")))?;
        items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Self::parse_object(fields, base),
                _ => Err(StateError::InvalidQuery(format!("{op} items must be objects"))),
            })
            .collect()
    }

    fn parse_field(path: Vec<String>, value: &Value) -> StateResult<Self> {
        let operators = match value {
            Value::Object(map) if !map.is_empty() => map,
            _ => {
                return Ok(Self::Field {
                    path,
                    condition: Condition::Eq(value.clone()),
                })
            }
        };

        // A sub-object without operators descends into the field.
        if !operators.keys().any(|k| k.starts_with('$')) {
            return Self::parse_object(operators, &path);
        }

        let mut clauses = Vec::with_capacity(operators.len());
        for (op, operand) in operators {
            let condition = Condition::parse(op, operand)?;
            clauses.push(Self::Field {
                path: path.clone(),
                condition,
            });
        }
        Ok(match clauses.len() {
            1 => clauses.remove(0),
            _ => Self::And(clauses),
        })
    }

    fn matches(&self, document: &Value) -> bool {
        match self {
            Self::And(clauses) => clauses.iter().all(|c| c.matches(document)),
            Self::Or(clauses) => clauses.iter().any(|c| c.matches(document)),
            Self::Field { path, condition } => condition.matches(lookup(document, path)),
        }
    }
}

impl Condition {
    fn parse(op: &str, operand: &Value) -> StateResult<Self> {
        let list = |operand: &Value| {
            operand
                .as_array()
                .cloned()
                .ok_or_else(|| StateError::InvalidQuery(format!("{op} expects an array")))
        };
        Ok(match op {
            "$eq" => Self::Eq(operand.clone()),
            "$ne" => Self::Ne(operand.clone()),
            "$gt" => Self::Gt(operand.clone()),
            "$gte" => Self::Gte(operand.clone()),
            "$lt" => Self::Lt(operand.clone()),
            "$lte" => Self::Lte(operand.clone()),
            "$in" => Self::In(list(operand)?),
            "$nin" => Self::Nin(list(operand)?),
            "$exists" => Self::Exists(
                operand
                    .as_bool()
                    .ok_or_else(|| StateError::InvalidQuery("$exists expects a boolean".into()))?,
            ),
            other => return Err(StateError::InvalidQuery(format!("unsupported operator {other}"))),
        })
    }

    fn matches(&self, field: Option<&Value>) -> bool {
        match (self, field) {
            (Self::Exists(expected), field) => field.is_some() == *expected,
            (Self::Ne(v), field) => field.map_or(true, |f| !equal(f, v)),
            (Self::Nin(vs), field) => field.map_or(true, |f| !vs.iter().any(|v| equal(f, v))),
            (_, None) => false,
            (Self::Eq(v), Some(f)) => equal(f, v),
            (Self::Gt(v), Some(f)) => compare(f, v) == Some(Ordering::Greater),
            (Self::Gte(v), Some(f)) => {
                matches!(compare(f, v), Some(Ordering::Greater | Ordering::Equal))
            }
            (Self::Lt(v), Some(f)) => compare(f, v) == Some(Ordering::Less),
            (Self::Lte(v), Some(f)) => matches!(compare(f, v), Some(Ordering::Less | Ordering::Equal)),
            (Self::In(vs), Some(f)) => vs.iter().any(|v| equal(f, v)),
        }
    }
}

fn lookup<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}

fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Ordering between values of the same JSON type; mixed types are unordered.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
