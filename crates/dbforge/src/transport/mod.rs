//! Backend wire contracts.
//!
//! A [`Connector`] opens a [`Transport`] from a [`DriverConfig`]; the
//! transport executes raw statement text and reports either a tabular result
//! or success. Transport failures are [`DbError::Driver`](crate::DbError)
//! values carrying the statement text (empty when no statement was involved).

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::{MemoryConnector, MemoryTransport};
#[cfg(feature = "postgres")]
pub use postgres::{PgConnector, PgTransport};

use crate::driver::DriverConfig;
use crate::error::DbResult;
use crate::result::QueryResult;
use std::fmt;

/// Outcome of a successfully executed statement.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The statement produced rows.
    Rows(Box<dyn QueryResult>),
    /// The statement succeeded without a result set.
    Done { affected_rows: u64 },
}

impl QueryOutcome {
    pub fn is_rows(&self) -> bool {
        matches!(self, QueryOutcome::Rows(_))
    }

    /// Result handle, if the statement produced rows.
    pub fn rows(&mut self) -> Option<&mut dyn QueryResult> {
        match self {
            QueryOutcome::Rows(result) => Some(result.as_mut()),
            QueryOutcome::Done { .. } => None,
        }
    }

    pub fn into_rows(self) -> Option<Box<dyn QueryResult>> {
        match self {
            QueryOutcome::Rows(result) => Some(result),
            QueryOutcome::Done { .. } => None,
        }
    }

    /// Affected row count for statements without a result set.
    pub fn affected_rows(&self) -> Option<u64> {
        match self {
            QueryOutcome::Done { affected_rows } => Some(*affected_rows),
            QueryOutcome::Rows(_) => None,
        }
    }
}

/// An open connection to a backend.
pub trait Transport: fmt::Debug {
    /// Execute raw statement text.
    fn query(&mut self, sql: &str) -> DbResult<QueryOutcome>;

    fn select_database(&mut self, name: &str) -> DbResult<()>;

    /// Close the connection. Must be safe to call more than once.
    fn disconnect(&mut self);
}

/// Opens transports for a backend.
pub trait Connector: fmt::Debug + Send + Sync {
    fn connect(&self, config: &DriverConfig) -> DbResult<Box<dyn Transport>>;
}
