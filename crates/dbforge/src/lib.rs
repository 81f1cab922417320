//! # dbforge
//!
//! Backend-agnostic SQL statement builders compiled by pluggable dialects.
//!
//! ## Features
//!
//! - **Condition trees**: AND/OR groups of predicates; empty branches vanish
//! - **Composable selects**: joined statements contribute their columns,
//!   expressions, conditions and joins to the root statement, recursively
//! - **Lazy compilation**: `send()` recompiles only after a mutation
//! - **Variable filtering**: escaped or raw substitution into raw SQL text
//! - **Dialects**: MySQL and PostgreSQL rendering rules behind one trait
//! - **Pluggable transports**: in-memory for tests, PostgreSQL via the
//!   `postgres` feature
//!
//! ## Example
//!
//! ```ignore
//! use dbforge::{Condition, DriverConfig, DriverRegistry, JoinKind, Query, col};
//!
//! let registry = DriverRegistry::with_builtin();
//! let driver = registry.open(&DriverConfig::load("dbforge.toml")?)?;
//!
//! let posts = driver
//!     .select_as("posts", "p")
//!     .columns(["title"])
//!     .condition(Condition::and().with_predicate("p.published", true, "=")?);
//!
//! let mut q = driver
//!     .select_as("users", "u")
//!     .columns(["id", "name"])
//!     .join(
//!         posts,
//!         Condition::and().with_predicate("p.user_id", col("u.id"), "=")?,
//!         JoinKind::Left,
//!     )
//!     .limit(0, 10);
//!
//! let mut outcome = q.send()?;
//! ```

pub mod condition;
pub mod data_type;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod query;
pub mod result;
pub mod transport;
pub mod value;
pub mod vars;

pub use condition::{CmpOp, Condition, JoinOp, Predicate};
pub use data_type::{COLUMN_PLACEHOLDER, DataType, TypeId};
pub use dialect::{Dialect, MySqlDialect, PostgresDialect};
pub use driver::{AnyQuery, Driver, DriverConfig, DriverRegistry};
pub use error::{DbError, DbResult};
pub use query::{
    AlterAction, AlterQuery, ColumnRef, CreateQuery, DeleteQuery, DropKind, DropQuery,
    Expression, ForeignKey, InsertQuery, IntoColumns, JoinKind, Order, Query, QueryKind,
    QueryState, SelectQuery, TruncateQuery, UniqueKey, UpdateQuery,
};
pub use result::{MemoryResult, QueryResult, Row, RowIndex};
pub use transport::{Connector, MemoryConnector, MemoryTransport, QueryOutcome, Transport};
pub use value::{Operand, Value, col};
pub use vars::{Filter, Var, Variables, html_escape};

#[cfg(feature = "postgres")]
pub use transport::{PgConnector, PgTransport};
