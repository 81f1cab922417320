use super::{Query, QueryKind, QueryState};
use crate::driver::Driver;
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// INSERT statement builder.
///
/// Column order in the output equals insertion order.
#[derive(Debug, Clone)]
pub struct InsertQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    values: Vec<(String, Value)>,
}

impl<'d> InsertQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
            values: Vec::new(),
        }
    }

    /// Append `(column, value)` pairs.
    pub fn values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.state.touch();
        self
    }

    /// Append a single column value.
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self.state.touch();
        self
    }
}

impl Query for InsertQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Insert
    }

    fn compile(&self) -> DbResult<String> {
        if self.values.is_empty() {
            return Err(DbError::compile(format!(
                "INSERT INTO {} has no values",
                self.state.table()
            )));
        }
        let dialect = self.driver.dialect();
        let columns = self
            .values
            .iter()
            .map(|(c, _)| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let values = self
            .values
            .iter()
            .map(|(_, v)| dialect.render_value(v))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "INSERT INTO {}({columns}) VALUES({values})",
            self.state.table()
        ))
    }

    fn state(&self) -> &QueryState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }

    fn driver(&self) -> &Driver {
        self.driver
    }
}
