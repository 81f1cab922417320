use super::{Query, QueryKind, QueryState};
use crate::condition::Condition;
use crate::driver::Driver;
use crate::error::DbResult;

/// DELETE statement builder.
///
/// Without a condition the statement deletes every row.
#[derive(Debug, Clone)]
pub struct DeleteQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    condition: Condition,
}

impl<'d> DeleteQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
            condition: Condition::and(),
        }
    }

    /// AND a condition into the WHERE clause.
    pub fn condition(mut self, cond: Condition) -> Self {
        self.condition.push_child(cond);
        self.state.touch();
        self
    }
}

impl Query for DeleteQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Delete
    }

    fn compile(&self) -> DbResult<String> {
        let mut sql = format!("DELETE FROM {}", self.state.table());
        if !self.condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.condition.compile(self.driver.dialect())?);
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
