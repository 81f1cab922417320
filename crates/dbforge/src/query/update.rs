use super::{Query, QueryKind, QueryState};
use crate::condition::Condition;
use crate::driver::Driver;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use crate::vars::Variables;

/// UPDATE statement builder.
#[derive(Debug, Clone)]
pub struct UpdateQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    values: Vec<(String, Value)>,
    condition: Condition,
}

impl<'d> UpdateQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
            values: Vec::new(),
            condition: Condition::and(),
        }
    }

    /// Set new values. A column that is already set keeps its position and
    /// takes the new value; unknown columns are appended.
    pub fn values<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .fold(self, |q, (column, value)| q.set(column, value))
    }

    /// Like [`UpdateQuery::values`], substituting `vars` into text values.
    pub fn values_with<I, K, V>(self, pairs: I, vars: &Variables) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs.into_iter().fold(self, |q, (column, value)| {
            let value: Value = value.into();
            q.set(column, value.substitute(vars))
        })
    }

    /// Set one column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((column, value)),
        }
        self.state.touch();
        self
    }

    /// AND a condition into the WHERE clause.
    pub fn condition(mut self, cond: Condition) -> Self {
        self.condition.push_child(cond);
        self.state.touch();
        self
    }
}

impl Query for UpdateQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Update
    }

    fn compile(&self) -> DbResult<String> {
        if self.values.is_empty() {
            return Err(DbError::compile(format!(
                "UPDATE {} has no values to set",
                self.state.table()
            )));
        }
        let dialect = self.driver.dialect();
        let assignments = self
            .values
            .iter()
            .map(|(c, v)| format!("{c}={}", dialect.render_value(v)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {assignments}", self.state.table());
        if !self.condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.condition.compile(dialect)?);
        }
        Ok(sql)
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
