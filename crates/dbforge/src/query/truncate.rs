use super::{Query, QueryKind, QueryState};
use crate::driver::Driver;
use crate::error::DbResult;

/// TRUNCATE statement builder.
#[derive(Debug, Clone)]
pub struct TruncateQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
}

impl<'d> TruncateQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
        }
    }
}

impl Query for TruncateQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Truncate
    }

    fn compile(&self) -> DbResult<String> {
        Ok(self.driver.dialect().truncate_statement(self.state.table()))
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
