//! Condition normalization.
//!
//! Callers describe filters with loosely-typed JSON shapes:
//!
//! ```text
//! {"department": "test", "age": [">", 30]}           keyed form
//! {"department": ["in", ["test", "develop"]]}        keyed membership
//! [["age", ">=", 18], ["age", "<", 30]]              sequence form
//! ["age", ">=", 18]                                  single tuple
//! ```
//!
//! [`ConditionSet::from_json`] resolves every shape once into an ordered list
//! of [`Condition`]s. Shapes that match none of the forms are dropped (and
//! logged at debug level), so callers are expected to validate input first.

use log::debug;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt;

pub mod clauses;
pub mod expr;

pub use clauses::{Columns, Groups, Having, Havings, Limits, Orders, SimpleSelect};

/// Comparison operators accepted in condition tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
}

impl Operator {
    /// Parse an operator token, ignoring case and surrounding whitespace.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        let token = token.split_whitespace().collect::<Vec<_>>().join(" ");
        match token.as_str() {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "not like" => Some(Self::NotLike),
            "in" => Some(Self::In),
            "not in" => Some(Self::NotIn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }

    /// Whether the operator expects a sequence of values.
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a condition joins the conditions before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

/// The test a condition applies to its column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Plain equality, produced by keyed scalars and `[column, value]` pairs.
    Equals(JsonValue),
    /// An explicit scalar comparison.
    Compare(Operator, JsonValue),
    In(Vec<JsonValue>),
    NotIn(Vec<JsonValue>),
}

/// A normalized filter: column, predicate and the logic joining it to the
/// previous condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub predicate: Predicate,
    pub logic: Logic,
}

impl Condition {
    /// Build a condition from an operator and value.
    ///
    /// Returns `None` when the value does not fit the operator: membership
    /// operators need an array, scalar operators need a scalar.
    pub fn new(column: impl Into<String>, operator: Operator, value: JsonValue) -> Option<Self> {
        let column = column.into();
        if column.trim().is_empty() {
            return None;
        }

        let predicate = match (operator, value) {
            (Operator::In, JsonValue::Array(values)) => Predicate::In(values),
            (Operator::NotIn, JsonValue::Array(values)) => Predicate::NotIn(values),
            (Operator::In | Operator::NotIn, _) => return None,
            (_, JsonValue::Array(_) | JsonValue::Object(_)) => return None,
            (operator, value) => Predicate::Compare(operator, value),
        };

        Some(Self {
            column,
            predicate,
            logic: Logic::And,
        })
    }

    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            column: column.into(),
            predicate: Predicate::Equals(value.into()),
            logic: Logic::And,
        }
    }

    pub fn is_in<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Self {
            column: column.into(),
            predicate: Predicate::In(values.into_iter().map(Into::into).collect()),
            logic: Logic::And,
        }
    }

    pub fn not_in<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Self {
            column: column.into(),
            predicate: Predicate::NotIn(values.into_iter().map(Into::into).collect()),
            logic: Logic::And,
        }
    }

    /// Mark this condition as joined with `OR`.
    pub fn or(self) -> Self {
        self.with_logic(Logic::Or)
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Parse an explicit tuple: `[column, value]`, `[column, operator, value]`
    /// or `[column, operator, value, logic]`.
    pub fn from_tuple(parts: &[JsonValue]) -> Option<Self> {
        match parts {
            [column, value] => {
                let column = column.as_str()?;
                if column.trim().is_empty() || value.is_array() || value.is_object() {
                    return None;
                }
                Some(Self::eq(column, value.clone()))
            }
            [column, operator, value] => {
                let operator = Operator::parse(operator.as_str()?)?;
                Self::new(column.as_str()?, operator, value.clone())
            }
            [column, operator, value, logic] => {
                let logic = match logic {
                    JsonValue::Null => Logic::And,
                    JsonValue::String(token) if token.trim().is_empty() => Logic::And,
                    JsonValue::String(token) => Logic::parse(token)?,
                    _ => return None,
                };
                let operator = Operator::parse(operator.as_str()?)?;
                Some(Self::new(column.as_str()?, operator, value.clone())?.with_logic(logic))
            }
            _ => None,
        }
    }

    /// Parse one keyed entry: `column => scalar` or `column => [operator, value, logic?]`.
    fn from_keyed(column: &str, tail: &JsonValue) -> Option<Self> {
        match tail {
            JsonValue::Array(parts) if parts.len() >= 2 => {
                let mut tuple = Vec::with_capacity(parts.len() + 1);
                tuple.push(JsonValue::String(column.to_string()));
                tuple.extend(parts.iter().cloned());
                Self::from_tuple(&tuple)
            }
            JsonValue::Array(_) | JsonValue::Object(_) => None,
            _ if column.trim().is_empty() => None,
            scalar => Some(Self::eq(column, scalar.clone())),
        }
    }
}

/// An ordered list of normalized conditions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a keyed mapping, a sequence of tuples or a single tuple.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => map
                .iter()
                .filter_map(|(column, tail)| Condition::from_keyed(column, tail).or_else(|| skipped(tail)))
                .collect(),
            JsonValue::Array(items) if items.first().is_some_and(JsonValue::is_array) => items
                .iter()
                .filter_map(|item| match item {
                    JsonValue::Array(parts) => Condition::from_tuple(parts).or_else(|| skipped(item)),
                    other => skipped(other),
                })
                .collect(),
            JsonValue::Array(parts) if !parts.is_empty() => Condition::from_tuple(parts)
                .or_else(|| skipped(value))
                .into_iter()
                .collect(),
            JsonValue::Null | JsonValue::Array(_) => Self::new(),
            other => skipped(other).into_iter().collect(),
        }
    }

    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    /// Tag every condition with `OR`.
    pub fn into_or(self) -> Self {
        self.0.into_iter().map(Condition::or).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Condition] {
        &self.0
    }
}

fn skipped(shape: &JsonValue) -> Option<Condition> {
    debug!("Ignoring unrecognized condition shape: {}", shape);
    None
}

impl From<JsonValue> for ConditionSet {
    fn from(value: JsonValue) -> Self {
        Self::from_json(&value)
    }
}

impl From<&JsonValue> for ConditionSet {
    fn from(value: &JsonValue) -> Self {
        Self::from_json(value)
    }
}

impl From<Condition> for ConditionSet {
    fn from(condition: Condition) -> Self {
        Self(vec![condition])
    }
}

impl From<Vec<Condition>> for ConditionSet {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ConditionSet {
    type Item = Condition;
    type IntoIter = std::vec::IntoIter<Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
