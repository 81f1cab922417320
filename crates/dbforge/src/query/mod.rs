//! Statement builders.
//!
//! Every builder is created from a [`Driver`](crate::Driver) and borrows it
//! for its whole life. Builders are consuming and fluent: every mutator takes
//! `self`, marks the builder dirty and returns it.
//!
//! ```ignore
//! use dbforge::{Condition, Query};
//!
//! let mut q = driver
//!     .select_as("users", "u")
//!     .columns(["id", "name"])
//!     .condition(Condition::and().with_predicate("u.id", 5, "=")?)
//!     .limit(0, 10);
//! let rows = q.send()?;
//! ```
//!
//! [`Query::compile`] is pure and always renders from scratch.
//! [`Query::send`] keeps the last compiled text and recompiles only after a
//! mutation, so re-sending an unchanged builder costs no compilation.

mod alter;
mod create;
mod delete;
mod drop;
mod insert;
mod select;
mod truncate;
mod update;


pub use alter::{AlterAction, AlterQuery};
pub use create::{CreateQuery, ForeignKey, UniqueKey};
pub use delete::DeleteQuery;
pub use drop::{DropKind, DropQuery};
pub use insert::InsertQuery;
pub use select::{ColumnRef, Expression, IntoColumns, JoinKind, Order, SelectQuery};
pub use truncate::TruncateQuery;
pub use update::UpdateQuery;

use crate::driver::Driver;
use crate::error::DbResult;
use crate::transport::QueryOutcome;
use std::fmt;

/// Statement kind, used for logging and by the driver's query factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Truncate,
    Alter,
    Drop,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::Create => "CREATE",
            QueryKind::Truncate => "TRUNCATE",
            QueryKind::Alter => "ALTER",
            QueryKind::Drop => "DROP",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and compile cache shared by every builder.
#[derive(Debug, Clone)]
pub struct QueryState {
    table: String,
    alias: Option<String>,
    dirty: bool,
    cache: Option<String>,
    compilations: usize,
}

impl QueryState {
    pub(crate) fn new(table: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.filter(|a| !a.is_empty()),
            dirty: true,
            cache: None,
            compilations: 0,
        }
    }

    /// Primary table (prefix applied).
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used to qualify this statement's columns: the alias, or the table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// `table` or `table AS alias`.
    pub(crate) fn table_ref(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {alias}", self.table),
            None => self.table.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Text produced by the last compilation performed by `send`.
    pub fn cached(&self) -> Option<&str> {
        self.cache.as_deref()
    }

    /// Number of compilations performed by `send`.
    pub fn compilations(&self) -> usize {
        self.compilations
    }

    pub(crate) fn touch(&mut self) {
        self.dirty = true;
    }

    fn needs_compile(&self) -> bool {
        self.dirty || self.cache.is_none()
    }

    fn store(&mut self, sql: String) {
        self.cache = Some(sql);
        self.dirty = false;
        self.compilations += 1;
    }
}

/// Shared contract of every statement builder.
pub trait Query {
    fn kind(&self) -> QueryKind;

    /// Render the statement. Pure: never touches the cache.
    fn compile(&self) -> DbResult<String>;

    fn state(&self) -> &QueryState;

    fn state_mut(&mut self) -> &mut QueryState;

    /// Driver this builder sends through.
    fn driver(&self) -> &Driver;

    /// Tables touched by the statement.
    fn tables(&self) -> Vec<String> {
        vec![self.state().table().to_string()]
    }

    fn compilations(&self) -> usize {
        self.state().compilations()
    }

    /// Compile if dirty (or never compiled) and hand the text to the driver.
    fn send(&mut self) -> DbResult<QueryOutcome> {
        if self.state().needs_compile() {
            let sql = self.compile()?;
            self.state_mut().store(sql);
        }
        let sql = self.state().cached().unwrap_or_default();
        self.driver().send_compiled(self.kind(), sql)
    }
}
