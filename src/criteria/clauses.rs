//! Select, limit, order, group and having clause descriptions.
//!
//! Each type accepts the loose JSON shape a caller would send as well as
//! typed constructors, and is applied to a query by
//! [`Query`](crate::repositories::Query).

use log::debug;
use sea_orm::Order;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{Condition, ConditionSet};

/// Columns to select.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "JsonValue")]
pub enum Columns {
    /// Every entity column (`*`).
    #[default]
    All,
    /// Named columns, replacing the default selection.
    List(Vec<String>),
    /// A raw select list such as `"name as label, age"`.
    Raw(String),
}

impl Columns {
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if names.iter().all(|name| name == "*") {
            Self::All
        } else {
            Self::List(names)
        }
    }

    pub fn raw(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        match expr.trim() {
            "" | "*" => Self::All,
            _ => Self::Raw(expr),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<&str> for Columns {
    fn from(expr: &str) -> Self {
        Self::raw(expr)
    }
}

impl From<String> for Columns {
    fn from(expr: String) -> Self {
        Self::raw(expr)
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(names: [&str; N]) -> Self {
        Self::list(names)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(names: Vec<&str>) -> Self {
        Self::list(names)
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Self::list(names)
    }
}

impl From<JsonValue> for Columns {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::String(expr) => Self::raw(expr),
            JsonValue::Array(items) => Self::list(items.iter().filter_map(JsonValue::as_str)),
            _ => Self::All,
        }
    }
}

/// Offset and row count for a query.
///
/// A single number is a length with offset 0; a pair is `(offset, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "JsonValue")]
pub struct Limits {
    pub offset: u64,
    pub length: u64,
}

impl Limits {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    pub fn take(length: u64) -> Self {
        Self { offset: 0, length }
    }

    /// Nothing to apply: no offset and no length.
    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

macro_rules! limits_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Limits {
                fn from(length: $int) -> Self {
                    Self::take(u64::try_from(length).unwrap_or(0))
                }
            }

            impl From<($int, $int)> for Limits {
                fn from((offset, length): ($int, $int)) -> Self {
                    Self::new(u64::try_from(offset).unwrap_or(0), u64::try_from(length).unwrap_or(0))
                }
            }

            impl From<[$int; 2]> for Limits {
                fn from([offset, length]: [$int; 2]) -> Self {
                    Self::from((offset, length))
                }
            }
        )*
    };
}

limits_from_int!(i32, i64, u32, u64, usize);

impl From<JsonValue> for Limits {
    fn from(value: JsonValue) -> Self {
        match &value {
            JsonValue::Number(length) => Self::take(length.as_u64().unwrap_or(0)),
            JsonValue::Array(pair) => match pair.as_slice() {
                [offset, length] => Self::new(offset.as_u64().unwrap_or(0), length.as_u64().unwrap_or(0)),
                [length] => Self::take(length.as_u64().unwrap_or(0)),
                _ => Self::default(),
            },
            _ => Self::default(),
        }
    }
}

/// Ordering clauses.
///
/// Structured `column => direction` pairs and raw textual clauses are kept
/// apart: a single value is one or the other.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub enum Orders {
    Keyed(Vec<(String, Order)>),
    Raw(Vec<String>),
}

impl Orders {
    pub fn keyed<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Order)>,
        S: Into<String>,
    {
        Self::Keyed(pairs.into_iter().map(|(column, order)| (column.into(), order)).collect())
    }

    pub fn raw<I, S>(clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Raw(clauses.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Keyed(pairs) => pairs.is_empty(),
            Self::Raw(clauses) => clauses.is_empty(),
        }
    }
}

impl Default for Orders {
    fn default() -> Self {
        Self::Keyed(Vec::new())
    }
}

/// Parse `asc`/`desc`, ignoring case.
pub fn parse_direction(token: &str) -> Option<Order> {
    match token.trim().to_ascii_lowercase().as_str() {
        "asc" => Some(Order::Asc),
        "desc" => Some(Order::Desc),
        _ => None,
    }
}

/// Split a raw clause like `"age desc"` into its expression and direction.
pub fn split_raw_order(clause: &str) -> (String, Order) {
    let clause = clause.trim();
    if let Some((expr, direction)) = clause.rsplit_once(char::is_whitespace) {
        if let Some(order) = parse_direction(direction) {
            return (expr.trim_end().to_string(), order);
        }
    }
    (clause.to_string(), Order::Asc)
}

impl From<JsonValue> for Orders {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::Keyed(
                map.into_iter()
                    .filter_map(|(column, direction)| {
                        let order = direction.as_str().and_then(parse_direction);
                        if order.is_none() {
                            debug!("Ignoring order on {} with direction {}", column, direction);
                        }
                        order.map(|order| (column, order))
                    })
                    .collect(),
            ),
            JsonValue::Array(items) => Self::Raw(
                items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .filter(|clause| !clause.trim().is_empty())
                    .collect(),
            ),
            JsonValue::String(clause) if !clause.trim().is_empty() => Self::Raw(vec![clause]),
            _ => Self::default(),
        }
    }
}

/// Grouping clauses: column names, or raw SQL expressions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "JsonValue")]
pub enum Groups {
    Columns(Vec<String>),
    Raw(Vec<String>),
}

impl Groups {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn raw<I, S>(exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Raw(exprs.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Columns(columns) => columns.is_empty(),
            Self::Raw(exprs) => exprs.is_empty(),
        }
    }
}

impl Default for Groups {
    fn default() -> Self {
        Self::Columns(Vec::new())
    }
}

impl<const N: usize> From<[&str; N]> for Groups {
    fn from(columns: [&str; N]) -> Self {
        Self::columns(columns)
    }
}

impl From<Vec<&str>> for Groups {
    fn from(columns: Vec<&str>) -> Self {
        Self::columns(columns)
    }
}

impl From<Vec<String>> for Groups {
    fn from(columns: Vec<String>) -> Self {
        Self::columns(columns)
    }
}

impl From<JsonValue> for Groups {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => Self::columns(items.iter().filter_map(JsonValue::as_str)),
            JsonValue::String(column) => Self::columns([column]),
            _ => Self::default(),
        }
    }
}

/// One `HAVING` predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Having {
    Raw(String),
    Condition(Condition),
}

/// `HAVING` predicates, all joined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub struct Havings(Vec<Having>);

impl Havings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, predicate: impl Into<String>) -> Self {
        self.0.push(Having::Raw(predicate.into()));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.0.push(Having::Condition(condition));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Having> {
        self.0.iter()
    }
}

impl IntoIterator for Havings {
    type Item = Having;
    type IntoIter = std::vec::IntoIter<Having>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Having>> for Havings {
    fn from(havings: Vec<Having>) -> Self {
        Self(havings)
    }
}

impl From<JsonValue> for Havings {
    fn from(value: JsonValue) -> Self {
        let items = match value {
            JsonValue::Array(items) => items,
            JsonValue::String(predicate) => vec![JsonValue::String(predicate)],
            _ => Vec::new(),
        };

        let havings = items
            .into_iter()
            .filter_map(|item| match &item {
                JsonValue::String(predicate) if !predicate.trim().is_empty() => Some(Having::Raw(predicate.clone())),
                JsonValue::Array(parts) if parts.len() == 3 => Condition::from_tuple(parts).map(Having::Condition),
                _ => {
                    debug!("Ignoring unrecognized having shape: {}", item);
                    None
                }
            })
            .collect();
        Self(havings)
    }
}

/// Everything a one-call select needs.
///
/// Empty parts are skipped when applied. Deserializes from JSON such as
/// `{"wheres": {"department": "test"}, "columns": ["age", "name"], "limits": 15}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimpleSelect {
    pub wheres: ConditionSet,
    pub columns: Columns,
    pub limits: Limits,
    pub orders: Orders,
    pub groups: Groups,
    pub havings: Havings,
}

impl SimpleSelect {
    pub fn new(wheres: impl Into<ConditionSet>) -> Self {
        Self {
            wheres: wheres.into(),
            ..Self::default()
        }
    }

    pub fn from_json(value: JsonValue) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn columns(mut self, columns: impl Into<Columns>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn limits(mut self, limits: impl Into<Limits>) -> Self {
        self.limits = limits.into();
        self
    }

    pub fn orders(mut self, orders: impl Into<Orders>) -> Self {
        self.orders = orders.into();
        self
    }

    pub fn groups(mut self, groups: impl Into<Groups>) -> Self {
        self.groups = groups.into();
        self
    }

    pub fn havings(mut self, havings: impl Into<Havings>) -> Self {
        self.havings = havings.into();
        self
    }
}
