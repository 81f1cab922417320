//! Tabular results returned by a transport.

use crate::error::{DbError, DbResult};
use std::fmt;
use std::sync::Arc;

/// How a fetched row may be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowIndex {
    /// By column position only.
    Num,
    /// By column name only.
    #[default]
    Name,
    /// By position and by name.
    Both,
}

/// One fetched row. Cells are text as reported by the backend; SQL `NULL`
/// is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    mode: RowIndex,
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    pub fn new(mode: RowIndex, columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self {
            mode,
            columns,
            values,
        }
    }

    pub fn mode(&self) -> RowIndex {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cell by position. Fails for name-indexed rows or out of range.
    pub fn get(&self, index: usize) -> DbResult<Option<&str>> {
        if self.mode == RowIndex::Name {
            return Err(DbError::column(format!(
                "row is indexed by name, cannot read position {index}"
            )));
        }
        self.values
            .get(index)
            .map(|v| v.as_deref())
            .ok_or_else(|| DbError::column(format!("no column at position {index}")))
    }

    /// Cell by column name. Fails for position-indexed rows or unknown names.
    pub fn get_named(&self, name: &str) -> DbResult<Option<&str>> {
        if self.mode == RowIndex::Num {
            return Err(DbError::column(format!(
                "row is indexed by position, cannot read '{name}'"
            )));
        }
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
            .map(|v| v.as_deref())
            .ok_or_else(|| DbError::column(format!("no column named '{name}'")))
    }

    /// Cells in column order.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }
}

/// Cursor over a tabular result.
pub trait QueryResult: fmt::Debug {
    /// Next row, or `None` at the end of data.
    fn fetch_row(&mut self, mode: RowIndex) -> Option<Row>;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn column_names(&self) -> &[String];
}

/// Fully buffered result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryResult {
    columns: Arc<[String]>,
    rows: Vec<Vec<Option<String>>>,
    cursor: usize,
}

impl MemoryResult {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a row; short rows are padded with `NULL`, long rows truncated.
    pub fn push_row(&mut self, mut values: Vec<Option<String>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(values);
    }

    /// Append a row of non-null text cells.
    pub fn with_row<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(values.into_iter().map(|v| Some(v.into())).collect());
        self
    }

    /// Rewind the cursor to the first row.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl QueryResult for MemoryResult {
    fn fetch_row(&mut self, mode: RowIndex) -> Option<Row> {
        let values = self.rows.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Row::new(mode, Arc::clone(&self.columns), values))
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }
}
