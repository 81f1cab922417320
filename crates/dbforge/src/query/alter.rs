use super::{Query, QueryKind, QueryState};
use crate::data_type::DataType;
use crate::driver::Driver;
use crate::error::{DbError, DbResult};

/// A single ALTER TABLE action.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn { name: String, ty: DataType },
    DropColumn { name: String },
    /// Rename and/or retype a column.
    ChangeColumn { old: String, new: String, ty: DataType },
}

/// ALTER TABLE statement builder.
///
/// Several actions compile into one statement, separated by commas.
#[derive(Debug, Clone)]
pub struct AlterQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    actions: Vec<AlterAction>,
}

impl<'d> AlterQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: AlterAction) -> Self {
        self.actions.push(action);
        self.state.touch();
        self
    }

    pub fn add_column(self, name: impl Into<String>, ty: DataType) -> Self {
        self.action(AlterAction::AddColumn {
            name: name.into(),
            ty,
        })
    }

    pub fn drop_column(self, name: impl Into<String>) -> Self {
        self.action(AlterAction::DropColumn { name: name.into() })
    }

    pub fn change_column(
        self,
        old: impl Into<String>,
        new: impl Into<String>,
        ty: DataType,
    ) -> Self {
        self.action(AlterAction::ChangeColumn {
            old: old.into(),
            new: new.into(),
            ty,
        })
    }
}

impl Query for AlterQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Alter
    }

    fn compile(&self) -> DbResult<String> {
        if self.actions.is_empty() {
            return Err(DbError::compile(format!(
                "ALTER TABLE {} has no actions",
                self.state.table()
            )));
        }
        let dialect = self.driver.dialect();
        let mut parts = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            let part = match action {
                AlterAction::AddColumn { name, ty } => {
                    format!("ADD COLUMN {}", ty.column_definition(name, dialect)?)
                }
                AlterAction::DropColumn { name } => format!("DROP COLUMN {name}"),
                AlterAction::ChangeColumn { old, new, ty } => {
                    dialect.change_column(old, new, ty)?
                }
            };
            parts.push(part);
        }
        Ok(format!(
            "ALTER TABLE {} {}",
            self.state.table(),
            parts.join(", ")
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
