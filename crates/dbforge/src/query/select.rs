//! SELECT builder with recursive join flattening.

use super::{Query, QueryKind, QueryState};
use crate::condition::Condition;
use crate::driver::Driver;
use crate::error::DbResult;
use crate::vars::Variables;
use std::collections::HashSet;

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// A selected column with an optional output alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: String,
    pub alias: Option<String>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// A raw expression selected under a unique alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub expression: String,
    pub alias: String,
}

/// Argument accepted by [`SelectQuery::columns`].
///
/// `"*"` selects every column of the table; a name, a list of names or a list
/// of `(name, alias)` pairs adds enumerated columns.
pub trait IntoColumns {
    fn into_columns(self) -> Vec<ColumnRef>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<ColumnRef> {
        vec![ColumnRef::new(self)]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<ColumnRef> {
        vec![ColumnRef::new(self)]
    }
}

impl IntoColumns for ColumnRef {
    fn into_columns(self) -> Vec<ColumnRef> {
        vec![self]
    }
}

impl IntoColumns for Vec<ColumnRef> {
    fn into_columns(self) -> Vec<ColumnRef> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter().map(ColumnRef::new).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter().map(ColumnRef::new).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter().map(ColumnRef::new).collect()
    }
}

impl IntoColumns for Vec<(&str, &str)> {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter()
            .map(|(name, alias)| ColumnRef::aliased(name, alias))
            .collect()
    }
}

impl<const N: usize> IntoColumns for [(&str, &str); N] {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter()
            .map(|(name, alias)| ColumnRef::aliased(name, alias))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Join<'d> {
    query: SelectQuery<'d>,
    on: Condition,
    kind: JoinKind,
}

/// SELECT statement builder.
///
/// Joined statements keep their own columns, expressions, conditions and
/// joins; compilation merges them (recursively) into the root statement.
#[derive(Debug, Clone)]
pub struct SelectQuery<'d> {
    driver: &'d Driver,
    state: QueryState,
    distinct: bool,
    all_columns: bool,
    columns: Vec<ColumnRef>,
    expressions: Vec<Expression>,
    auto_aliases: usize,
    ordering: Vec<(String, Order)>,
    offset: u64,
    count: u64,
    joins: Vec<Join<'d>>,
    condition: Condition,
}

impl<'d> SelectQuery<'d> {
    pub(crate) fn new(driver: &'d Driver, table: String, alias: Option<String>) -> Self {
        Self {
            driver,
            state: QueryState::new(table, alias),
            distinct: false,
            all_columns: false,
            columns: Vec::new(),
            expressions: Vec::new(),
            auto_aliases: 0,
            ordering: Vec::new(),
            offset: 0,
            count: 0,
            joins: Vec::new(),
            condition: Condition::and(),
        }
    }

    /// Add columns; `"*"` switches to all-columns mode for this table.
    pub fn columns(mut self, columns: impl IntoColumns) -> Self {
        for column in columns.into_columns() {
            if column.name == "*" {
                self.all_columns = true;
            } else {
                self.columns.push(column);
            }
        }
        self.state.touch();
        self
    }

    /// Select every column of this table (`qualifier.*`).
    pub fn all_columns(mut self) -> Self {
        self.all_columns = true;
        self.state.touch();
        self
    }

    /// Add a raw expression. Without an alias one is generated as
    /// `expression_N`, skipping aliases already in use. Re-using an alias
    /// replaces the earlier expression in place.
    pub fn expression(mut self, text: impl Into<String>, alias: Option<&str>) -> Self {
        let alias = match alias.filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => self.next_alias(),
        };
        let text = text.into();
        match self.expressions.iter_mut().find(|e| e.alias == alias) {
            Some(existing) => existing.expression = text,
            None => self.expressions.push(Expression {
                expression: text,
                alias,
            }),
        }
        self.state.touch();
        self
    }

    /// Like [`SelectQuery::expression`], substituting `vars` into the text first.
    pub fn expression_with(
        self,
        text: impl Into<String>,
        alias: Option<&str>,
        vars: &Variables,
    ) -> Self {
        let text = vars.substitute(&text.into());
        self.expression(text, alias)
    }

    fn next_alias(&mut self) -> String {
        loop {
            let alias = format!("expression_{}", self.auto_aliases);
            self.auto_aliases += 1;
            if !self.expressions.iter().any(|e| e.alias == alias) {
                return alias;
            }
        }
    }

    /// AND a condition into the WHERE clause.
    pub fn condition(mut self, cond: Condition) -> Self {
        self.condition.push_child(cond);
        self.state.touch();
        self
    }

    pub fn order(mut self, column: impl Into<String>, order: Order) -> Self {
        self.ordering.push((column.into(), order));
        self.state.touch();
        self
    }

    /// Row window. A zero `count` means no upper bound.
    pub fn limit(mut self, offset: u64, count: u64) -> Self {
        self.offset = offset;
        self.count = count;
        self.state.touch();
        self
    }

    pub fn distinct(mut self, on: bool) -> Self {
        self.distinct = on;
        self.state.touch();
        self
    }

    /// Join another select statement. Its columns, expressions, conditions
    /// and joins surface in this statement's output.
    pub fn join(mut self, query: SelectQuery<'d>, on: Condition, kind: JoinKind) -> Self {
        self.joins.push(Join { query, on, kind });
        self.state.touch();
        self
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// `(qualified name, alias)` for this statement and every joined one,
    /// depth first.
    fn flattened_columns(&self) -> Vec<(String, Option<&str>)> {
        let qualifier = self.state.qualifier();
        let mut out = Vec::new();
        if self.all_columns {
            out.push((format!("{qualifier}.*"), None));
        } else {
            for column in &self.columns {
                let name = if column.name.contains('.') {
                    column.name.clone()
                } else {
                    format!("{qualifier}.{}", column.name)
                };
                out.push((name, column.alias.as_deref()));
            }
        }
        for join in &self.joins {
            out.extend(join.query.flattened_columns());
        }
        out
    }

    fn flattened_expressions(&self) -> Vec<&Expression> {
        let mut out: Vec<&Expression> = self.expressions.iter().collect();
        for join in &self.joins {
            out.extend(join.query.flattened_expressions());
        }
        out
    }

    /// Own joins first, then the joins of each joined statement.
    fn flattened_joins(&self) -> Vec<&Join<'d>> {
        let mut out: Vec<&Join<'d>> = self.joins.iter().collect();
        for join in &self.joins {
            out.extend(join.query.flattened_joins());
        }
        out
    }

    /// Own condition tree plus every non-empty joined tree as a child.
    fn flattened_condition(&self) -> Condition {
        let mut cond = self.condition.clone();
        for join in &self.joins {
            let nested = join.query.flattened_condition();
            if !nested.is_empty() {
                cond.push_child(nested);
            }
        }
        cond
    }
}

/// Aliases are unique per statement only; a joined statement may reuse one
/// already taken by the outer statement. Later repeats get a `_N` suffix.
fn distinct_aliases(expressions: &[&Expression]) -> Vec<String> {
    let mut used: HashSet<String> = expressions.iter().map(|e| e.alias.clone()).collect();
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(expressions.len());
    for e in expressions {
        if emitted.insert(e.alias.as_str()) {
            out.push(e.alias.clone());
            continue;
        }
        let mut n = 1;
        while used.contains(&format!("{}_{n}", e.alias)) {
            n += 1;
        }
        let alias = format!("{}_{n}", e.alias);
        used.insert(alias.clone());
        out.push(alias);
    }
    out
}

impl Query for SelectQuery<'_> {
    fn kind(&self) -> QueryKind {
        QueryKind::Select
    }

    fn compile(&self) -> DbResult<String> {
        let dialect = self.driver.dialect();
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        let mut items: Vec<String> = self
            .flattened_columns()
            .into_iter()
            .map(|(name, alias)| match alias {
                Some(alias) => format!("{name} AS {alias}"),
                None => name,
            })
            .collect();
        let expressions = self.flattened_expressions();
        items.extend(
            expressions
                .iter()
                .zip(distinct_aliases(&expressions))
                .map(|(e, alias)| format!("{} AS {alias}", e.expression)),
        );
        if items.is_empty() {
            items.push(format!("{}.*", self.state.qualifier()));
        }
        sql.push_str(&items.join(", "));

        sql.push_str(" FROM ");
        sql.push_str(&self.state.table_ref());

        for join in self.flattened_joins() {
            sql.push(' ');
            sql.push_str(dialect.join_keyword(join.kind)?);
            sql.push(' ');
            sql.push_str(&join.query.state.table_ref());
            if !join.on.is_empty() {
                sql.push_str(" ON ");
                sql.push_str(&join.on.compile(dialect)?);
            }
        }

        let cond = self.flattened_condition();
        if !cond.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&cond.compile(dialect)?);
        }

        if !self.ordering.is_empty() {
            let order = self
                .ordering
                .iter()
                .map(|(column, dir)| format!("{column} {}", dir.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if self.offset != 0 || self.count != 0 {
            sql.push(' ');
            sql.push_str(&dialect.limit_clause(self.offset, self.count));
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

    fn tables(&self) -> Vec<String> {
        let mut out = vec![self.state.table().to_string()];
        for join in &self.joins {
            out.extend(join.query.tables());
        }
        out
    }
}
