//! Driver handle: dialect + transport + table prefix.
//!
//! A [`Driver`] is the factory for every statement builder and the single
//! place where compiled text meets the wire. It is single-threaded: the
//! transport sits behind a `RefCell`, and builders borrow the driver.

mod config;
mod registry;

pub use config::{DEFAULT_LOG_SQL_MAX_LEN, DriverConfig, expand_env_vars};
pub use registry::DriverRegistry;

use crate::condition::{Condition, JoinOp};
use crate::data_type::{DataType, TypeId};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::query::{
    AlterQuery, CreateQuery, DeleteQuery, DropKind, DropQuery, InsertQuery, Query, QueryKind,
    SelectQuery, TruncateQuery, UpdateQuery,
};
use crate::transport::{QueryOutcome, Transport};
use crate::vars::Variables;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Truncate to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A builder of any kind, as returned by [`Driver::create_query`].
#[derive(Debug, Clone)]
pub enum AnyQuery<'d> {
    Select(SelectQuery<'d>),
    Insert(InsertQuery<'d>),
    Update(UpdateQuery<'d>),
    Delete(DeleteQuery<'d>),
    Create(CreateQuery<'d>),
    Truncate(TruncateQuery<'d>),
    Alter(AlterQuery<'d>),
    Drop(DropQuery<'d>),
}

impl<'d> AnyQuery<'d> {
    fn inner(&self) -> &dyn Query {
        match self {
            AnyQuery::Select(q) => q,
            AnyQuery::Insert(q) => q,
            AnyQuery::Update(q) => q,
            AnyQuery::Delete(q) => q,
            AnyQuery::Create(q) => q,
            AnyQuery::Truncate(q) => q,
            AnyQuery::Alter(q) => q,
            AnyQuery::Drop(q) => q,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Query {
        match self {
            AnyQuery::Select(q) => q,
            AnyQuery::Insert(q) => q,
            AnyQuery::Update(q) => q,
            AnyQuery::Delete(q) => q,
            AnyQuery::Create(q) => q,
            AnyQuery::Truncate(q) => q,
            AnyQuery::Alter(q) => q,
            AnyQuery::Drop(q) => q,
        }
    }
}

impl Query for AnyQuery<'_> {
    fn kind(&self) -> QueryKind {
        self.inner().kind()
    }

    fn compile(&self) -> DbResult<String> {
        self.inner().compile()
    }

    fn state(&self) -> &crate::query::QueryState {
        self.inner().state()
    }

    fn state_mut(&mut self) -> &mut crate::query::QueryState {
        self.inner_mut().state_mut()
    }

    fn driver(&self) -> &Driver {
        self.inner().driver()
    }

    fn tables(&self) -> Vec<String> {
        self.inner().tables()
    }
}

/// Connected handle for one backend.
pub struct Driver {
    dialect: Arc<dyn Dialect>,
    transport: RefCell<Box<dyn Transport>>,
    table_prefix: String,
    log_sql_max_len: usize,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("dialect", &self.dialect.name())
            .field("table_prefix", &self.table_prefix)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Wrap an already-open transport.
    pub fn new(dialect: Arc<dyn Dialect>, transport: Box<dyn Transport>) -> Self {
        Self {
            dialect,
            transport: RefCell::new(transport),
            table_prefix: String::new(),
            log_sql_max_len: DEFAULT_LOG_SQL_MAX_LEN,
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_log_sql_max_len(mut self, len: usize) -> Self {
        self.log_sql_max_len = len;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Table name with the prefix applied.
    pub fn prefixed(&self, table: &str) -> String {
        format!("{}{table}", self.table_prefix)
    }

    pub fn select(&self, table: &str) -> SelectQuery<'_> {
        SelectQuery::new(self, self.prefixed(table), None)
    }

    pub fn select_as(&self, table: &str, alias: &str) -> SelectQuery<'_> {
        SelectQuery::new(self, self.prefixed(table), Some(alias.to_string()))
    }

    pub fn insert(&self, table: &str) -> InsertQuery<'_> {
        InsertQuery::new(self, self.prefixed(table))
    }

    pub fn update(&self, table: &str) -> UpdateQuery<'_> {
        UpdateQuery::new(self, self.prefixed(table))
    }

    pub fn delete(&self, table: &str) -> DeleteQuery<'_> {
        DeleteQuery::new(self, self.prefixed(table))
    }

    pub fn truncate(&self, table: &str) -> TruncateQuery<'_> {
        TruncateQuery::new(self, self.prefixed(table))
    }

    pub fn create(&self, table: &str) -> CreateQuery<'_> {
        CreateQuery::new(self, self.prefixed(table))
    }

    /// Database names are never prefixed.
    pub fn drop(&self, name: &str, kind: DropKind) -> DropQuery<'_> {
        let name = match kind {
            DropKind::Table => self.prefixed(name),
            DropKind::Database => name.to_string(),
        };
        DropQuery::new(self, name, kind)
    }

    pub fn alter(&self, table: &str) -> AlterQuery<'_> {
        AlterQuery::new(self, self.prefixed(table))
    }

    /// Builder factory keyed by statement kind. `alias` only applies to
    /// selects; `Drop` creates a table drop.
    pub fn create_query(&self, kind: QueryKind, table: &str, alias: Option<&str>) -> AnyQuery<'_> {
        match kind {
            QueryKind::Select => AnyQuery::Select(SelectQuery::new(
                self,
                self.prefixed(table),
                alias.map(str::to_string),
            )),
            QueryKind::Insert => AnyQuery::Insert(self.insert(table)),
            QueryKind::Update => AnyQuery::Update(self.update(table)),
            QueryKind::Delete => AnyQuery::Delete(self.delete(table)),
            QueryKind::Create => AnyQuery::Create(self.create(table)),
            QueryKind::Truncate => AnyQuery::Truncate(self.truncate(table)),
            QueryKind::Alter => AnyQuery::Alter(self.alter(table)),
            QueryKind::Drop => AnyQuery::Drop(self.drop(table, DropKind::Table)),
        }
    }

    pub fn and_condition(&self) -> Condition {
        Condition::and()
    }

    pub fn or_condition(&self) -> Condition {
        Condition::or()
    }

    pub fn create_condition(&self, join: JoinOp) -> Condition {
        Condition::new(join)
    }

    pub fn data_type(&self, id: TypeId) -> DataType {
        DataType::new(id)
    }

    /// Send raw statement text.
    pub fn query(&self, sql: &str) -> DbResult<QueryOutcome> {
        self.execute(None, sql)
    }

    /// Substitute `vars` into `sql`, then send it.
    pub fn query_with(&self, sql: &str, vars: &Variables) -> DbResult<QueryOutcome> {
        self.execute(None, &vars.substitute(sql))
    }

    pub fn select_database(&self, name: &str) -> DbResult<()> {
        let mut transport = self.transport_mut()?;
        transport.select_database(name)?;
        tracing::debug!(target: "dbforge.driver", database = name, "database selected");
        Ok(())
    }

    pub(crate) fn send_compiled(&self, kind: QueryKind, sql: &str) -> DbResult<QueryOutcome> {
        self.execute(Some(kind), sql)
    }

    fn transport_mut(&self) -> DbResult<std::cell::RefMut<'_, Box<dyn Transport>>> {
        self.transport
            .try_borrow_mut()
            .map_err(|_| DbError::driver("transport is already in use"))
    }

    fn execute(&self, kind: Option<QueryKind>, sql: &str) -> DbResult<QueryOutcome> {
        let shown = truncate_sql_bytes(sql, self.log_sql_max_len);
        let kind = kind.map_or("RAW", QueryKind::as_str);
        let start = Instant::now();
        let result = self
            .transport_mut()
            .map_err(|e| with_query(e, sql))?
            .query(sql)
            .map_err(|e| with_query(e, sql));
        let elapsed_us = start.elapsed().as_micros() as u64;
        match &result {
            Ok(outcome) => tracing::debug!(
                target: "dbforge.sql",
                kind,
                dialect = self.dialect.name(),
                elapsed_us,
                rows = outcome.is_rows(),
                sql = %shown,
            ),
            Err(e) => tracing::debug!(
                target: "dbforge.sql",
                kind,
                dialect = self.dialect.name(),
                elapsed_us,
                error = %e,
                sql = %shown,
            ),
        }
        result
    }
}

/// Attach the sent statement to a driver error that lacks one.
fn with_query(err: DbError, sql: &str) -> DbError {
    match err {
        DbError::Driver { message, query } if query.is_empty() => {
            DbError::driver_with_query(message, sql)
        }
        other => other,
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.transport.get_mut().disconnect();
        tracing::debug!(target: "dbforge.driver", dialect = self.dialect.name(), "disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use crate::transport::MemoryConnector;

    fn driver() -> (Driver, MemoryConnector) {
        let mem = MemoryConnector::new();
        let driver = Driver::new(Arc::new(MySqlDialect), Box::new(mem.transport()));
        (driver, mem)
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("abc", 10), "abc");
        assert_eq!(truncate_sql_bytes("abcdef", 3), "abc");
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn raw_query_is_sent_verbatim() {
        let (driver, mem) = driver();
        driver.query("SELECT 1").unwrap();
        assert_eq!(mem.sent(), vec!["SELECT 1"]);
    }

    #[test]
    fn query_with_substitutes_variables() {
        let (driver, mem) = driver();
        let vars = Variables::from_sigiled([("!t", "users"), ("@n", "<x>")]);
        driver
            .query_with("SELECT * FROM !t WHERE name = '@n'", &vars)
            .unwrap();
        assert_eq!(
            mem.last_sent().unwrap(),
            "SELECT * FROM users WHERE name = '&lt;x&gt;'"
        );
    }

    #[test]
    fn transport_error_carries_statement() {
        let (driver, mem) = driver();
        mem.push_failure("syntax error");
        let err = driver.query("SELEC 1").unwrap_err();
        assert_eq!(err.query_text(), Some("SELEC 1"));
    }

    #[test]
    fn prefix_applies_to_tables_not_databases() {
        let (driver, _mem) = driver();
        let driver = driver.with_table_prefix("app_");
        assert_eq!(driver.insert("users").state().table(), "app_users");
        assert_eq!(
            driver.drop("users", DropKind::Table).compile().unwrap(),
            "DROP TABLE app_users"
        );
        assert_eq!(
            driver.drop("shop", DropKind::Database).compile().unwrap(),
            "DROP DATABASE shop"
        );
    }

    #[test]
    fn factory_by_kind() {
        let (driver, _mem) = driver();
        let q = driver.create_query(QueryKind::Select, "users", Some("u"));
        assert_eq!(q.kind(), QueryKind::Select);
        assert_eq!(q.compile().unwrap(), "SELECT u.* FROM users AS u");
        let q = driver.create_query(QueryKind::Truncate, "logs", None);
        assert_eq!(q.compile().unwrap(), "TRUNCATE TABLE logs");
    }

    #[test]
    fn drop_disconnects() {
        let (driver, mem) = driver();
        assert!(mem.is_connected());
        drop(driver);
        assert!(!mem.is_connected());
    }
}
