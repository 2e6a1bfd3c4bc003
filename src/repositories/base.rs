//! The generic repository.

use log::debug;
use sea_orm::{ConnectionTrait, EntityName, EntityTrait, QueryTrait, Statement};
use serde_json::Value as JsonValue;

use super::messages::ErrorMessages;
use super::page::Page;
use super::query::Query;
use crate::config::RepositoryConfig;
use crate::criteria::{Columns, Condition, ConditionSet, Groups, Havings, Limits, Orders, SimpleSelect};
use crate::error::Result;
use crate::query_log::QueryLog;

/// Repository for one entity over one connection or transaction.
///
/// ```ignore
/// let repo = Repository::new(employee::Entity, &db);
/// let rows = repo
///     .simple_select(
///         SimpleSelect::new(json!({"department": "test", "age": [">", 30]}))
///             .columns(["age", "name"])
///             .limits(15),
///     )
///     .await?;
/// ```
pub struct Repository<'c, E, C> {
    entity: E,
    conn: &'c C,
    config: RepositoryConfig,
    query_log: Option<QueryLog>,
    messages: ErrorMessages,
}

impl<'c, E, C> Repository<'c, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    pub fn new(entity: E, conn: &'c C) -> Self {
        Self::with_config(entity, conn, RepositoryConfig::default())
    }

    /// Create a repository with explicit settings.
    ///
    /// The statement log is switched on here, from `config.debug` or
    /// `APP_DEBUG`, and cannot be toggled afterwards.
    pub fn with_config(entity: E, conn: &'c C, config: RepositoryConfig) -> Self {
        let query_log = config.debug_enabled().then(QueryLog::new);
        debug!(
            "Repository for '{}' ready (statement log {})",
            entity.table_name(),
            if query_log.is_some() { "on" } else { "off" }
        );

        Self {
            entity,
            conn,
            config,
            query_log,
            messages: ErrorMessages::new(),
        }
    }

    /// Share an existing statement log, e.g. between repositories of one request.
    pub fn with_query_log(mut self, query_log: QueryLog) -> Self {
        self.query_log = Some(query_log);
        self
    }

    /// Table name of the bound entity.
    pub fn entity_name(&self) -> &str {
        self.entity.table_name()
    }

    pub fn connection(&self) -> &'c C {
        self.conn
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn query_log(&self) -> Option<&QueryLog> {
        self.query_log.as_ref()
    }

    pub fn add_err_msg(&mut self, message: impl Into<String>) {
        self.messages.push(message);
    }

    /// Most recently added error message, removing it.
    pub fn get_err_msg(&mut self) -> Option<String> {
        self.messages.pop()
    }

    /// Statements executed through this repository, oldest first.
    ///
    /// Empty unless debug mode was on at construction.
    pub fn sql_dump(&self) -> Vec<String> {
        self.query_log.as_ref().map(QueryLog::statements).unwrap_or_default()
    }

    /// Start a fresh, empty query chain.
    pub fn query(&self) -> Query<'_, E, C> {
        Query::new(self)
    }

    pub fn and_where(&self, condition: Condition) -> Query<'_, E, C> {
        self.query().and_where(condition)
    }

    pub fn or_where(&self, condition: Condition) -> Query<'_, E, C> {
        self.query().or_where(condition)
    }

    pub fn wheres(&self, wheres: impl Into<ConditionSet>) -> Query<'_, E, C> {
        self.query().wheres(wheres)
    }

    pub fn or_wheres(&self, wheres: impl Into<ConditionSet>) -> Query<'_, E, C> {
        self.query().or_wheres(wheres)
    }

    pub fn select(&self, columns: impl Into<Columns>) -> Query<'_, E, C> {
        self.query().select(columns)
    }

    pub fn limits(&self, limits: impl Into<Limits>) -> Query<'_, E, C> {
        self.query().limits(limits)
    }

    pub fn orders(&self, orders: impl Into<Orders>) -> Query<'_, E, C> {
        self.query().orders(orders)
    }

    pub fn groups(&self, groups: impl Into<Groups>) -> Query<'_, E, C> {
        self.query().groups(groups)
    }

    pub fn havings(&self, havings: impl Into<Havings>) -> Query<'_, E, C> {
        self.query().havings(havings)
    }

    /// Filter, shape and fetch in one call.
    pub async fn simple_select(&self, spec: SimpleSelect) -> Result<Vec<JsonValue>> {
        self.query().apply(spec).get().await
    }

    /// Alias of [`Repository::simple_select`].
    pub async fn search(&self, spec: SimpleSelect) -> Result<Vec<JsonValue>> {
        self.simple_select(spec).await
    }

    /// Paginate every row. A `per_page` of 0 uses the configured default.
    pub async fn paginate(&self, per_page: u64, page: u64) -> Result<Page<JsonValue>> {
        self.query().paginate(per_page, page).await
    }

    /// Log a query, as built for this connection, before it runs.
    pub(crate) fn record<Q: QueryTrait>(&self, query: &Q) {
        self.record_statement(&query.build(self.conn.get_database_backend()));
    }

    pub(crate) fn record_statement(&self, statement: &Statement) {
        debug!("{}", statement);
        if let Some(query_log) = &self.query_log {
            query_log.record(statement.to_string());
        }
    }
}
