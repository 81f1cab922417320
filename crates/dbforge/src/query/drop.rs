use super::{Query, QueryKind, QueryState};
use crate::driver::Driver;
use crate::error::DbResult;

/// What a DROP statement removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropKind {
    #[default]
    Table,
    Database,
}

/// DROP TABLE / DROP DATABASE statement builder.
#[derive(Debug, Clone)]
pub struct DropQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    kind: DropKind,
    if_exists: bool,
}

impl<'d> DropQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, name: String, kind: DropKind) -> Self {
        Self {
            driver,
            state: QueryState::new(name, None),
            kind,
            if_exists: false,
        }
    }

    pub fn if_exists(mut self, on: bool) -> Self {
        self.if_exists = on;
        self.state.touch();
        self
    }

    pub fn drop_kind(&self) -> DropKind {
        self.kind
    }
}

impl Query for DropQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Drop
    }

    fn compile(&self) -> DbResult<String> {
        let object = match self.kind {
            DropKind::Table => "TABLE",
            DropKind::Database => "DATABASE",
        };
        let if_exists = if self.if_exists { "IF EXISTS " } else { "" };
        Ok(format!("DROP {object} {if_exists}{}", self.state.table()))
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

    fn tables(&self) -> Vec<String> {
        match self.kind {
            DropKind::Table => vec![self.state.table().to_string()],
            DropKind::Database => Vec::new(),
        }
    }
}
