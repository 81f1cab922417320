use super::{Query, QueryKind, QueryState};
use crate::data_type::DataType;
use crate::driver::Driver;
use crate::error::{DbError, DbResult};

/// Target of a table-level foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    /// Constraint name; unnamed when `None`.
    pub name: Option<String>,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Table-level unique key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniqueKey {
    pub name: Option<String>,
}

impl UniqueKey {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// CREATE TABLE statement builder.
///
/// Columns, foreign keys and unique keys are keyed by column name: adding a
/// name twice replaces the earlier entry in place.
#[derive(Debug, Clone)]
pub struct CreateQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    columns: Vec<(String, DataType)>,
    primary_key: Option<String>,
    foreign_keys: Vec<(String, ForeignKey)>,
    unique_keys: Vec<(String, UniqueKey)>,
    if_not_exists: bool,
}

fn upsert<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key, value)),
    }
}

impl<'d> CreateQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String) -> Self {
        Self {
            driver,
            state: QueryState::new(table, None),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            unique_keys: Vec::new(),
            if_not_exists: false,
        }
    }

    pub fn if_not_exists(mut self, on: bool) -> Self {
        self.if_not_exists = on;
        self.state.touch();
        self
    }

    /// Add column definitions.
    pub fn columns<I, K>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, DataType)>,
        K: Into<String>,
    {
        for (name, ty) in columns {
            upsert(&mut self.columns, name.into(), ty);
        }
        self.state.touch();
        self
    }

    pub fn column(self, name: impl Into<String>, ty: DataType) -> Self {
        self.columns([(name.into(), ty)])
    }

    /// Table primary key; a second call replaces the first.
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self.state.touch();
        self
    }

    pub fn foreign_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = (K, ForeignKey)>,
        K: Into<String>,
    {
        for (column, key) in keys {
            upsert(&mut self.foreign_keys, column.into(), key);
        }
        self.state.touch();
        self
    }

    pub fn foreign_key(self, column: impl Into<String>, key: ForeignKey) -> Self {
        self.foreign_keys([(column.into(), key)])
    }

    pub fn unique_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = (K, UniqueKey)>,
        K: Into<String>,
    {
        for (column, key) in keys {
            upsert(&mut self.unique_keys, column.into(), key);
        }
        self.state.touch();
        self
    }

    pub fn unique_key(self, column: impl Into<String>, key: UniqueKey) -> Self {
        self.unique_keys([(column.into(), key)])
    }
}

fn constraint_prefix(name: Option<&str>) -> String {
    name.map(|n| format!("CONSTRAINT {n} ")).unwrap_or_default()
}

impl Query for CreateQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Create
    }

    fn compile(&self) -> DbResult<String> {
        if self.columns.is_empty() {
            return Err(DbError::compile(format!(
                "CREATE TABLE {} has no columns",
                self.state.table()
            )));
        }
        let dialect = self.driver.dialect();

        let mut defs = Vec::with_capacity(self.columns.len() + 4);
        for (name, ty) in &self.columns {
            defs.push(ty.column_definition(name, dialect)?);
        }
        if let Some(pk) = &self.primary_key {
            defs.push(format!("PRIMARY KEY({pk})"));
        }
        for (column, fk) in &self.foreign_keys {
            defs.push(format!(
                "{}FOREIGN KEY({column}) REFERENCES {}({})",
                constraint_prefix(fk.name.as_deref()),
                fk.table,
                fk.column
            ));
        }
        for (column, uk) in &self.unique_keys {
            defs.push(format!(
                "{}UNIQUE({column})",
                constraint_prefix(uk.name.as_deref())
            ));
        }

        let if_not_exists = if self.if_not_exists {
            "IF NOT EXISTS "
        } else {
            ""
        };
        Ok(format!(
            "CREATE TABLE {if_not_exists}{}({}){}",
            self.state.table(),
            defs.join(", "),
            dialect.create_table_options(&self.columns)
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

    fn tables(&self) -> Vec<String> {
        let mut out = vec![self.state.table().to_string()];
        for (_, fk) in &self.foreign_keys {
            if !out.contains(&fk.table) {
                out.push(fk.table.clone());
            }
        }
        out
    }
}
