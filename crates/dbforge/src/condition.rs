//! Condition trees for WHERE and ON clauses.
//!
//! A [`Condition`] node carries an optional leaf predicate
//! (`left OPERATOR right`) and an ordered list of child nodes. The node's
//! [`JoinOp`] is placed between its own predicate and the first child, and
//! between successive children. Every child renders parenthesized as a unit.
//!
//! ```ignore
//! use dbforge::Condition;
//!
//! let cond = Condition::or()
//!     .add_child(Condition::and().with_predicate("role", "admin", "=")?)
//!     .add_child(Condition::and().with_predicate("id", [1, 2, 3], "IN")?);
//! // (role = 'admin') OR (id IN (1, 2, 3))
//! ```
//!
//! Empty nodes (no predicate and no non-empty descendants) compile to the
//! empty string and are skipped by their parents, so they never contribute
//! parentheses or a dangling boolean operator.

use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::value::{Operand, Value};
use crate::vars::Variables;
use std::fmt;
use std::str::FromStr;

/// Boolean operator joining a node's predicate and children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOp {
    #[default]
    And,
    Or,
}

impl JoinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinOp::And => "AND",
            JoinOp::Or => "OR",
        }
    }
}

impl fmt::Display for JoinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Between,
    NotBetween,
    Like,
    NotLike,
    /// Case-insensitive LIKE (not every dialect supports it)
    Ilike,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Gte => ">=",
            CmpOp::Lte => "<=",
            CmpOp::Between => "BETWEEN",
            CmpOp::NotBetween => "NOT BETWEEN",
            CmpOp::Like => "LIKE",
            CmpOp::NotLike => "NOT LIKE",
            CmpOp::Ilike => "ILIKE",
            CmpOp::In => "IN",
            CmpOp::NotIn => "NOT IN",
            CmpOp::Is => "IS",
            CmpOp::IsNot => "IS NOT",
        }
    }

    /// `IN` / `NOT IN`
    pub fn is_membership(self) -> bool {
        matches!(self, CmpOp::In | CmpOp::NotIn)
    }

    /// `BETWEEN` / `NOT BETWEEN`
    pub fn is_range(self) -> bool {
        matches!(self, CmpOp::Between | CmpOp::NotBetween)
    }

    /// Operators whose right operand must be a list.
    pub fn takes_list(self) -> bool {
        self.is_membership() || self.is_range()
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CmpOp {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "" | "=" => CmpOp::Eq,
            "<>" | "!=" => CmpOp::Ne,
            ">" => CmpOp::Gt,
            "<" => CmpOp::Lt,
            ">=" => CmpOp::Gte,
            "<=" => CmpOp::Lte,
            "BETWEEN" => CmpOp::Between,
            "NOT BETWEEN" => CmpOp::NotBetween,
            "LIKE" => CmpOp::Like,
            "NOT LIKE" => CmpOp::NotLike,
            "ILIKE" => CmpOp::Ilike,
            "IN" => CmpOp::In,
            "NOT IN" => CmpOp::NotIn,
            "IS" => CmpOp::Is,
            "IS NOT" => CmpOp::IsNot,
            _ => return Err(DbError::malformed(format!("unknown operator '{s}'"))),
        };
        Ok(op)
    }
}

/// Leaf predicate `left OP right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub left: String,
    pub right: Operand,
    pub op: CmpOp,
}

impl Predicate {
    fn new(left: String, right: Operand, op: CmpOp) -> DbResult<Self> {
        match (&right, op) {
            (Operand::Single(_), op) if op.takes_list() => {
                return Err(DbError::malformed(format!(
                    "operator {op} on '{left}' requires a list of values"
                )));
            }
            (Operand::List(_), op) if !op.takes_list() => {
                return Err(DbError::malformed(format!(
                    "operator {op} on '{left}' takes a single value, got a list"
                )));
            }
            (Operand::List(vals), op) if op.is_range() && vals.len() < 2 => {
                return Err(DbError::malformed(format!(
                    "operator {op} on '{left}' requires two values, got {}",
                    vals.len()
                )));
            }
            _ => {}
        }
        Ok(Self { left, right, op })
    }

    fn compile(&self, dialect: &dyn Dialect) -> DbResult<String> {
        if !dialect.supports_operator(self.op) {
            return Err(DbError::compile(format!(
                "operator {} is not supported by the {} dialect",
                self.op,
                dialect.name()
            )));
        }

        let left = &self.left;
        let op = self.op;
        let sql = match &self.right {
            Operand::Single(v) => format!("{left} {op} {}", dialect.render_value(v)),
            Operand::List(vals) if op.is_membership() => {
                if vals.is_empty() {
                    // Empty list: IN is always false, NOT IN always true.
                    let constant = if op == CmpOp::In { "1=0" } else { "1=1" };
                    return Ok(constant.to_string());
                }
                format!("{left} {op} ({})", render_list(dialect, vals, ", "))
            }
            // Range: only the first two values take part.
            Operand::List(vals) => {
                format!("{left} {op} {}", render_list(dialect, &vals[..2], " AND "))
            }
        };
        Ok(sql)
    }
}

fn render_list(dialect: &dyn Dialect, vals: &[Value], sep: &str) -> String {
    vals.iter()
        .map(|v| dialect.render_value(v))
        .collect::<Vec<_>>()
        .join(sep)
}

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    join: JoinOp,
    predicate: Option<Predicate>,
    children: Vec<Condition>,
}

impl Condition {
    /// Create an empty node with the given join operator.
    pub fn new(join: JoinOp) -> Self {
        Self {
            join,
            predicate: None,
            children: Vec::new(),
        }
    }

    /// Create an empty AND node.
    pub fn and() -> Self {
        Self::new(JoinOp::And)
    }

    /// Create an empty OR node.
    pub fn or() -> Self {
        Self::new(JoinOp::Or)
    }

    /// Set (or replace) this node's leaf predicate.
    ///
    /// `op` is the textual operator (`=`, `<>`, `IN`, `BETWEEN`, ...). List
    /// operators require a list operand and every other operator a scalar;
    /// a mismatch is reported here, not at compile time.
    pub fn with_predicate(
        self,
        left: impl Into<String>,
        right: impl Into<Operand>,
        op: &str,
    ) -> DbResult<Self> {
        let op = op.parse::<CmpOp>()?;
        self.with_cmp(left, right, op)
    }

    /// Like [`Condition::with_predicate`] with a typed operator.
    pub fn with_cmp(
        mut self,
        left: impl Into<String>,
        right: impl Into<Operand>,
        op: CmpOp,
    ) -> DbResult<Self> {
        self.predicate = Some(Predicate::new(left.into(), right.into(), op)?);
        Ok(self)
    }

    /// Like [`Condition::with_predicate`], substituting `vars` into the left
    /// operand and into text values of the right operand.
    pub fn with_predicate_vars(
        self,
        left: impl Into<String>,
        right: impl Into<Operand>,
        op: &str,
        vars: &Variables,
    ) -> DbResult<Self> {
        let left = vars.substitute(&left.into());
        let right = right.into().substitute(vars);
        self.with_predicate(left, right, op)
    }

    /// Append a subtree (consuming form).
    pub fn add_child(mut self, child: Condition) -> Self {
        self.children.push(child);
        self
    }

    /// Append a subtree in place.
    pub fn push_child(&mut self, child: Condition) {
        self.children.push(child);
    }

    pub fn join_op(&self) -> JoinOp {
        self.join
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn children(&self) -> &[Condition] {
        &self.children
    }

    fn has_predicate(&self) -> bool {
        self.predicate.as_ref().is_some_and(|p| !p.left.is_empty())
    }

    /// `true` when the node has no predicate and no non-empty descendant.
    pub fn is_empty(&self) -> bool {
        !self.has_predicate() && self.children.iter().all(Condition::is_empty)
    }

    /// Render the tree for the given dialect.
    ///
    /// Pure and deterministic: compiling an unchanged tree twice yields the
    /// same text.
    pub fn compile(&self, dialect: &dyn Dialect) -> DbResult<String> {
        let mut children = Vec::with_capacity(self.children.len());
        for child in self.children.iter().filter(|c| !c.is_empty()) {
            children.push(child.compile(dialect)?);
        }

        let mut out = String::new();
        if let Some(pred) = self.predicate.as_ref().filter(|_| self.has_predicate()) {
            let leaf = pred.compile(dialect)?;
            if children.is_empty() {
                return Ok(leaf);
            }
            out.push('(');
            out.push_str(&leaf);
            out.push_str(") ");
            out.push_str(self.join.as_str());
            out.push(' ');
        }

        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(self.join.as_str());
                out.push(' ');
            }
            out.push('(');
            out.push_str(child);
            out.push(')');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::value::col;

    fn mysql(cond: &Condition) -> String {
        cond.compile(&MySqlDialect).unwrap()
    }

    #[test]
    fn leaf_without_children_is_bare() {
        let c = Condition::and().with_predicate("id", 5, "=").unwrap();
        assert_eq!(mysql(&c), "id = 5");
    }

    #[test]
    fn text_is_quoted_numbers_are_not() {
        let c = Condition::and().with_predicate("name", "Ann", "=").unwrap();
        assert_eq!(mysql(&c), "name = 'Ann'");
        let c = Condition::and().with_predicate("price", 9.5, ">").unwrap();
        assert_eq!(mysql(&c), "price > 9.5");
    }

    #[test]
    fn between_renders_two_values() {
        let c = Condition::and().with_predicate("id", [5, 9], "BETWEEN").unwrap();
        assert_eq!(mysql(&c), "id BETWEEN 5 AND 9");
    }

    #[test]
    fn between_ignores_values_past_the_second() {
        let c = Condition::and()
            .with_predicate("id", [5, 9, 12], "BETWEEN")
            .unwrap();
        assert_eq!(mysql(&c), "id BETWEEN 5 AND 9");
    }

    #[test]
    fn in_renders_parenthesized_list() {
        let c = Condition::and().with_predicate("id", [1, 2, 3], "IN").unwrap();
        assert_eq!(mysql(&c), "id IN (1, 2, 3)");
        let c = Condition::and()
            .with_predicate("tag", vec!["a", "b"], "not in")
            .unwrap();
        assert_eq!(mysql(&c), "tag NOT IN ('a', 'b')");
    }

    #[test]
    fn empty_membership_lists_collapse_to_constants() {
        let c = Condition::and()
            .with_predicate("id", Vec::<i32>::new(), "IN")
            .unwrap();
        assert_eq!(mysql(&c), "1=0");
        let c = Condition::and()
            .with_predicate("id", Vec::<i32>::new(), "NOT IN")
            .unwrap();
        assert_eq!(mysql(&c), "1=1");
    }

    #[test]
    fn list_operator_rejects_scalar() {
        let err = Condition::and().with_predicate("id", 5, "IN").unwrap_err();
        assert!(err.is_malformed_condition());
        let err = Condition::and().with_predicate("id", 5, "BETWEEN").unwrap_err();
        assert!(err.is_malformed_condition());
    }

    #[test]
    fn scalar_operator_rejects_list() {
        let err = Condition::and().with_predicate("id", [1, 2], "=").unwrap_err();
        assert!(err.is_malformed_condition());
    }

    #[test]
    fn between_needs_two_values() {
        let err = Condition::and()
            .with_predicate("id", [1], "BETWEEN")
            .unwrap_err();
        assert!(err.is_malformed_condition());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = Condition::and().with_predicate("id", 1, "=~").unwrap_err();
        assert!(err.is_malformed_condition());
    }

    #[test]
    fn operator_parsing_is_lenient_about_case_and_spacing() {
        assert_eq!("not   like".parse::<CmpOp>().unwrap(), CmpOp::NotLike);
        assert_eq!("!=".parse::<CmpOp>().unwrap(), CmpOp::Ne);
        assert_eq!("".parse::<CmpOp>().unwrap(), CmpOp::Eq);
    }

    #[test]
    fn children_are_parenthesized_and_joined() {
        let c = Condition::or()
            .add_child(Condition::and().with_predicate("a", 1, "=").unwrap())
            .add_child(Condition::and().with_predicate("b", 2, "=").unwrap());
        assert_eq!(mysql(&c), "(a = 1) OR (b = 2)");
    }

    #[test]
    fn leaf_with_children_is_grouped() {
        let c = Condition::and()
            .with_predicate("a", 1, "=")
            .unwrap()
            .add_child(Condition::or().with_predicate("b", 2, "=").unwrap())
            .add_child(Condition::or().with_predicate("c", 3, "=").unwrap());
        assert_eq!(mysql(&c), "(a = 1) AND (b = 2) AND (c = 3)");
    }

    #[test]
    fn nested_trees_render_recursively() {
        let inner = Condition::or()
            .add_child(Condition::and().with_predicate("role", "admin", "=").unwrap())
            .add_child(Condition::and().with_predicate("role", "owner", "=").unwrap());
        let c = Condition::and()
            .with_predicate("active", 1, "=")
            .unwrap()
            .add_child(inner);
        assert_eq!(
            mysql(&c),
            "(active = 1) AND ((role = 'admin') OR (role = 'owner'))"
        );
    }

    #[test]
    fn empty_node_compiles_to_empty_string() {
        let c = Condition::and();
        assert!(c.is_empty());
        assert_eq!(mysql(&c), "");
    }

    #[test]
    fn empty_children_are_absorbed() {
        let c = Condition::and()
            .add_child(Condition::or())
            .add_child(Condition::and().with_predicate("a", 1, "=").unwrap())
            .add_child(Condition::and().add_child(Condition::or()));
        assert_eq!(mysql(&c), "(a = 1)");

        let c = Condition::and()
            .with_predicate("a", 1, "=")
            .unwrap()
            .add_child(Condition::or());
        assert_eq!(mysql(&c), "a = 1");
    }

    #[test]
    fn node_with_only_empty_children_is_empty() {
        let c = Condition::and().add_child(Condition::or().add_child(Condition::and()));
        assert!(c.is_empty());
        assert_eq!(mysql(&c), "");
    }

    #[test]
    fn empty_left_operand_counts_as_unset() {
        let c = Condition::and().with_predicate("", 1, "=").unwrap();
        assert!(c.is_empty());
        assert_eq!(mysql(&c), "");
    }

    #[test]
    fn compile_is_idempotent() {
        let c = Condition::or()
            .add_child(Condition::and().with_predicate("x", [1, 2], "IN").unwrap())
            .add_child(Condition::and().with_predicate("y", "z", "LIKE").unwrap());
        assert_eq!(mysql(&c), mysql(&c));
    }

    #[test]
    fn column_operands_are_not_quoted() {
        let c = Condition::and()
            .with_predicate("u.id", col("p.user_id"), "=")
            .unwrap();
        assert_eq!(mysql(&c), "u.id = p.user_id");
    }

    #[test]
    fn null_comparison() {
        let c = Condition::and()
            .with_predicate("deleted_at", Value::Null, "IS")
            .unwrap();
        assert_eq!(mysql(&c), "deleted_at IS NULL");
    }

    #[test]
    fn ilike_depends_on_dialect() {
        let c = Condition::and().with_predicate("name", "%a%", "ILIKE").unwrap();
        assert!(c.compile(&MySqlDialect).unwrap_err().is_compile());
        assert_eq!(c.compile(&PostgresDialect).unwrap(), "name ILIKE '%a%'");
    }

    #[test]
    fn variables_are_substituted_into_operands() {
        let vars = Variables::from_sigiled([("!t", "users"), ("@v", "<x>")]);
        let c = Condition::and()
            .with_predicate_vars("!t.name", "@v", "=", &vars)
            .unwrap();
        assert_eq!(mysql(&c), "users.name = '&lt;x&gt;'");
    }

    #[test]
    fn with_predicate_replaces_previous_predicate() {
        let c = Condition::and()
            .with_predicate("a", 1, "=")
            .unwrap()
            .with_predicate("b", 2, "=")
            .unwrap();
        assert_eq!(mysql(&c), "b = 2");
    }
}
