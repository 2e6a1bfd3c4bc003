//! Fluent query chains.

use log::debug;
use sea_orm::sea_query::{Alias, Expr, SelectStatement};
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Statement};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::base::Repository;
use super::page::Page;
use crate::criteria::clauses::split_raw_order;
use crate::criteria::expr::{column_expr, condition_expr, fold_conditions, output_name};
use crate::criteria::{Columns, Condition, ConditionSet, Groups, Having, Havings, Limits, Orders, SimpleSelect};
use crate::error::Result;

/// One fluent chain over entity `E`.
///
/// Clause methods append to the chain and hand it back. Terminal methods
/// (`get`, `first`, `count`, `pluck`, `value`, `paginate`, `chunk`,
/// `delete`, and the typed `get_models`/`first_model`) consume it, so a
/// finished chain can never leak conditions into the next one.
#[must_use = "a query does nothing until a terminal method runs it"]
pub struct Query<'r, E, C>
where
    E: EntityTrait,
{
    repo: &'r Repository<'r, E, C>,
    builder: Select<E>,
    conditions: Vec<Condition>,
    custom_columns: bool,
}

impl<'r, E, C> Query<'r, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    pub(crate) fn new(repo: &'r Repository<'r, E, C>) -> Self {
        Self {
            repo,
            builder: E::find(),
            conditions: Vec::new(),
            custom_columns: false,
        }
    }

    /// Add one condition, keeping its own logic.
    pub fn and_where(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add one condition joined with `OR`.
    pub fn or_where(mut self, condition: Condition) -> Self {
        self.conditions.push(condition.or());
        self
    }

    pub fn wheres(mut self, wheres: impl Into<ConditionSet>) -> Self {
        self.conditions.extend(wheres.into());
        self
    }

    /// Add conditions, every one joined with `OR`.
    pub fn or_wheres(mut self, wheres: impl Into<ConditionSet>) -> Self {
        self.conditions.extend(wheres.into().into_or());
        self
    }

    /// Choose the selected columns.
    ///
    /// A column list replaces the current selection; a raw list is appended
    /// to it.
    pub fn select(mut self, columns: impl Into<Columns>) -> Self {
        match columns.into() {
            Columns::All => {}
            Columns::List(names) => {
                let mut builder = self.builder.select_only();
                for name in &names {
                    builder = if name == "*" {
                        builder.expr(Expr::cust("*"))
                    } else {
                        builder.expr(column_expr::<E>(name))
                    };
                }
                self.builder = builder;
                self.custom_columns = true;
            }
            Columns::Raw(raw) => {
                if !self.custom_columns {
                    self.builder = self.builder.select_only();
                    self.custom_columns = true;
                }
                self.builder = self.builder.expr(Expr::cust(raw));
            }
        }
        self
    }

    pub fn limits(mut self, limits: impl Into<Limits>) -> Self {
        let limits = limits.into();
        if limits.offset > 0 {
            self.builder = self.builder.offset(limits.offset);
        }
        // A zero length only moves the offset.
        if limits.length > 0 {
            self.builder = self.builder.limit(limits.length);
        }
        self
    }

    pub fn orders(mut self, orders: impl Into<Orders>) -> Self {
        match orders.into() {
            Orders::Keyed(pairs) => {
                for (column, order) in pairs {
                    self.builder = self.builder.order_by(column_expr::<E>(&column), order);
                }
            }
            Orders::Raw(clauses) => {
                for clause in clauses {
                    let (expr, order) = split_raw_order(&clause);
                    self.builder = self.builder.order_by(Expr::cust(expr), order);
                }
            }
        }
        self
    }

    pub fn groups(mut self, groups: impl Into<Groups>) -> Self {
        match groups.into() {
            Groups::Columns(columns) => {
                for column in columns {
                    self.builder = self.builder.group_by(column_expr::<E>(&column));
                }
            }
            Groups::Raw(exprs) => {
                for expr in exprs {
                    self.builder = self.builder.group_by(Expr::cust(expr));
                }
            }
        }
        self
    }

    pub fn havings(mut self, havings: impl Into<Havings>) -> Self {
        for having in havings.into() {
            self.builder = match having {
                Having::Raw(predicate) => self.builder.having(Expr::cust(predicate)),
                Having::Condition(condition) => self.builder.having(condition_expr::<E>(&condition)),
            };
        }
        self
    }

    /// Apply every non-empty part of a [`SimpleSelect`].
    pub fn apply(self, spec: SimpleSelect) -> Self {
        let SimpleSelect {
            wheres,
            columns,
            limits,
            orders,
            groups,
            havings,
        } = spec;

        let mut query = self;
        if !wheres.is_empty() {
            query = query.wheres(wheres);
        }
        if !columns.is_all() {
            query = query.select(columns);
        }
        if !limits.is_empty() {
            query = query.limits(limits);
        }
        if !orders.is_empty() {
            query = query.orders(orders);
        }
        if !groups.is_empty() {
            query = query.groups(groups);
        }
        if !havings.is_empty() {
            query = query.havings(havings);
        }
        query
    }

    /// Conditions collected so far.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Render the statement this chain would run, without running it.
    pub fn statement(&self) -> Statement {
        let backend = self.repo.connection().get_database_backend();
        with_conditions::<E, _>(self.builder.clone(), &self.conditions).build(backend)
    }

    /// The underlying SeaORM select with all conditions applied.
    pub fn into_select(self) -> Select<E> {
        with_conditions::<E, _>(self.builder, &self.conditions)
    }

    fn finish(self) -> (&'r Repository<'r, E, C>, Select<E>) {
        let select = with_conditions::<E, _>(self.builder, &self.conditions);
        (self.repo, select)
    }

    /// Fetch all matching rows as JSON objects keyed by column name.
    pub async fn get(self) -> Result<Vec<JsonValue>> {
        let (repo, select) = self.finish();
        repo.record(&select);
        Ok(select.into_json().all(repo.connection()).await?)
    }

    pub async fn first(self) -> Result<Option<JsonValue>> {
        let (repo, select) = self.finish();
        let select = select.limit(1);
        repo.record(&select);
        Ok(select.into_json().one(repo.connection()).await?)
    }

    /// Fetch matching rows as entity models.
    ///
    /// Fails if the selection leaves out columns the model needs.
    pub async fn get_models(self) -> Result<Vec<E::Model>> {
        let (repo, select) = self.finish();
        repo.record(&select);
        Ok(select.all(repo.connection()).await?)
    }

    pub async fn first_model(self) -> Result<Option<E::Model>> {
        let (repo, select) = self.finish();
        let select = select.limit(1);
        repo.record(&select);
        Ok(select.one(repo.connection()).await?)
    }

    /// Count matching rows. Limits and offsets are ignored.
    pub async fn count(self) -> Result<u64> {
        let (repo, select) = self.finish();
        count_rows(repo, &select).await
    }

    /// One column of every matching row.
    pub async fn pluck(self, column: &str) -> Result<Vec<JsonValue>> {
        let key = output_name(column);
        let (repo, select) = self.finish();
        let select = select.select_only().column_as(column_expr::<E>(column), key.clone());
        repo.record(&select);

        let rows = select.into_json().all(repo.connection()).await?;
        Ok(rows.into_iter().map(|mut row| take_field(&mut row, &key)).collect())
    }

    /// One column of the first matching row.
    pub async fn value(self, column: &str) -> Result<Option<JsonValue>> {
        let key = output_name(column);
        let (repo, select) = self.finish();
        let select = select
            .select_only()
            .column_as(column_expr::<E>(column), key.clone())
            .limit(1);
        repo.record(&select);

        let row = select.into_json().one(repo.connection()).await?;
        Ok(row.map(|mut row| take_field(&mut row, &key)))
    }

    /// Fetch one page. `page` is 1-based; a `per_page` of 0 uses the
    /// configured default.
    pub async fn paginate(self, per_page: u64, page: u64) -> Result<Page<JsonValue>> {
        let (repo, select) = self.finish();
        let config = repo.config();
        let per_page = if per_page == 0 { config.per_page } else { per_page };
        let page = page.max(1);

        let total = count_rows(repo, &select).await?;
        let select = select.limit(per_page).offset(per_page.saturating_mul(page - 1));
        repo.record(&select);
        let items = select.into_json().all(repo.connection()).await?;
        debug!("Fetched page {} of {} rows ({} per page)", page, total, per_page);

        Ok(Page::new(items, total, per_page, page, config.page_name.clone()))
    }

    /// Paginate using the page number found under the configured page
    /// parameter in `params`.
    pub async fn paginate_from_query(self, per_page: u64, params: &HashMap<String, String>) -> Result<Page<JsonValue>> {
        let page = Page::<JsonValue>::page_from_query(params, &self.repo.config().page_name);
        self.paginate(per_page, page).await
    }

    /// Walk matching rows `size` at a time, one statement per page.
    ///
    /// Stops early and returns `false` as soon as `callback` returns `false`.
    pub async fn chunk<F>(self, size: u64, mut callback: F) -> Result<bool>
    where
        F: FnMut(Vec<JsonValue>) -> bool,
    {
        let (repo, select) = self.finish();
        let size = size.max(1);
        let mut offset = 0;

        loop {
            let page = select.clone().limit(size).offset(offset);
            repo.record(&page);

            let rows = page.into_json().all(repo.connection()).await?;
            if rows.is_empty() {
                return Ok(true);
            }
            let last = (rows.len() as u64) < size;
            if !callback(rows) {
                return Ok(false);
            }
            if last {
                return Ok(true);
            }
            offset += size;
        }
    }

    /// Delete every row matching the chain's conditions.
    ///
    /// With no conditions this deletes the whole table.
    pub async fn delete(self) -> Result<u64> {
        let delete = with_conditions::<E, _>(E::delete_many(), &self.conditions);
        self.repo.record(&delete);

        let deleted = delete.exec(self.repo.connection()).await?.rows_affected;
        debug!("Deleted {} rows from '{}'", deleted, self.repo.entity_name());
        Ok(deleted)
    }
}

fn with_conditions<E, Q>(query: Q, conditions: &[Condition]) -> Q
where
    E: EntityTrait,
    Q: QueryFilter,
{
    if conditions.is_empty() {
        query
    } else {
        query.filter(fold_conditions::<E>(conditions))
    }
}

/// `SELECT COUNT(*)` over `select` with its limit, offset and ordering dropped.
fn count_statement(select: &SelectStatement) -> SelectStatement {
    let mut inner = select.clone();
    inner.reset_limit().reset_offset().clear_order_by();

    SelectStatement::new()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("num_items"))
        .from_subquery(inner, Alias::new("sub_query"))
        .to_owned()
}

async fn count_rows<E, C>(repo: &Repository<'_, E, C>, select: &Select<E>) -> Result<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let conn = repo.connection();
    let statement = conn.get_database_backend().build(&count_statement(select.as_query()));
    repo.record_statement(&statement);

    let total = match conn.query_one(statement).await? {
        Some(row) => row.try_get::<i64>("", "num_items")?,
        None => 0,
    };
    Ok(u64::try_from(total).unwrap_or(0))
}

fn take_field(row: &mut JsonValue, key: &str) -> JsonValue {
    row.get_mut(key).map(JsonValue::take).unwrap_or(JsonValue::Null)
}
