//! Translation of normalized conditions into SeaORM expressions.

use sea_orm::sea_query::{Alias, Expr, IntoColumnRef, SimpleExpr};
use sea_orm::{EntityTrait, Value};
use serde_json::Value as JsonValue;
use std::str::FromStr;

use super::{Condition, Logic, Operator, Predicate};

/// Resolve a column name against entity `E`.
///
/// Entity columns are table-qualified, `table.column` becomes a qualified
/// identifier, and anything else (aliases, aggregate names) stays bare.
pub fn column_expr<E: EntityTrait>(name: &str) -> SimpleExpr {
    let name = name.trim();
    if let Ok(column) = E::Column::from_str(name) {
        return SimpleExpr::Column((E::default(), column).into_column_ref());
    }
    match name.split_once('.') {
        Some((table, column)) => SimpleExpr::Column((Alias::new(table), Alias::new(column)).into_column_ref()),
        None => SimpleExpr::Column(Alias::new(name).into_column_ref()),
    }
}

/// Name a selected column is returned under.
pub fn output_name(name: &str) -> String {
    let name = name.trim();
    name.rsplit_once('.').map_or(name, |(_, column)| column).to_string()
}

/// Convert a JSON scalar into a bindable database value.
pub fn db_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Option::<String>::None.into(),
        JsonValue::Bool(flag) => (*flag).into(),
        JsonValue::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.into()
            } else if let Some(uint) = number.as_u64() {
                uint.into()
            } else {
                number.as_f64().unwrap_or_default().into()
            }
        }
        JsonValue::String(text) => text.as_str().into(),
        other => other.to_string().into(),
    }
}

fn like_pattern(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Build the SQL expression for one condition on entity `E`.
pub fn condition_expr<E: EntityTrait>(condition: &Condition) -> SimpleExpr {
    let lhs = Expr::expr(column_expr::<E>(&condition.column));
    match &condition.predicate {
        Predicate::Equals(JsonValue::Null) | Predicate::Compare(Operator::Eq, JsonValue::Null) => lhs.is_null(),
        Predicate::Compare(Operator::Ne, JsonValue::Null) => lhs.is_not_null(),
        Predicate::Equals(value) => lhs.eq(db_value(value)),
        Predicate::Compare(operator, value) => match operator {
            Operator::Eq => lhs.eq(db_value(value)),
            Operator::Ne => lhs.ne(db_value(value)),
            Operator::Gt => lhs.gt(db_value(value)),
            Operator::Gte => lhs.gte(db_value(value)),
            Operator::Lt => lhs.lt(db_value(value)),
            Operator::Lte => lhs.lte(db_value(value)),
            Operator::Like => lhs.like(like_pattern(value)),
            Operator::NotLike => lhs.not_like(like_pattern(value)),
            Operator::In => lhs.is_in([db_value(value)]),
            Operator::NotIn => lhs.is_not_in([db_value(value)]),
        },
        Predicate::In(values) => lhs.is_in(values.iter().map(db_value)),
        Predicate::NotIn(values) => lhs.is_not_in(values.iter().map(db_value)),
    }
}

/// Fold conditions into one SeaORM condition with SQL precedence.
///
/// Runs of `AND` conditions become conjunctions and each `OR` condition
/// opens a new disjunct, so `a AND b OR c` reads `(a AND b) OR c`. The logic
/// of the first condition is ignored.
pub fn fold_conditions<E: EntityTrait>(conditions: &[Condition]) -> sea_orm::Condition {
    let mut disjuncts = Vec::new();
    let mut current = sea_orm::Condition::all();

    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 && condition.logic == Logic::Or {
            disjuncts.push(std::mem::replace(&mut current, sea_orm::Condition::all()));
        }
        current = current.add(condition_expr::<E>(condition));
    }

    if disjuncts.is_empty() {
        return current;
    }
    disjuncts.push(current);
    disjuncts
        .into_iter()
        .fold(sea_orm::Condition::any(), |any, conjunction| any.add(conjunction))
}
