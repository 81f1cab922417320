//! Per-backend text rendering rules.
//!
//! Builders hold dialect-agnostic state; a [`Dialect`] supplies only what
//! differs between backends: literal quoting, operator support, join and
//! limit syntax, physical column types and a few DDL forms.

mod mysql;
mod postgres;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;

use crate::condition::CmpOp;
use crate::data_type::DataType;
use crate::error::DbResult;
use crate::query::JoinKind;
use crate::value::Value;
use std::fmt;

/// Text rendering capability of a backend.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Human-readable dialect name (used in error messages and logs).
    fn name(&self) -> &'static str;

    /// Registry keys this dialect answers to (lowercase).
    fn supported_dbs(&self) -> &'static [&'static str];

    /// Escape text for embedding between single quotes.
    fn escape_text(&self, text: &str) -> String;

    fn render_bool(&self, value: bool) -> &'static str;

    /// Render a literal. Numbers are unquoted, text is quoted and escaped,
    /// raw values are emitted verbatim.
    fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.render_bool(*b).to_string(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(f) if f.is_finite() => f.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::Text(s) => format!("'{}'", self.escape_text(s)),
            Value::Raw(s) => s.clone(),
        }
    }

    /// Whether a comparison operator can be compiled.
    fn supports_operator(&self, op: CmpOp) -> bool {
        op != CmpOp::Ilike
    }

    fn join_keyword(&self, kind: JoinKind) -> DbResult<&'static str>;

    /// Limit clause for a window; only called when `offset` or `count` is
    /// non-zero. A zero `count` means no upper bound.
    fn limit_clause(&self, offset: u64, count: u64) -> String;

    fn truncate_statement(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    /// Physical column fragment containing the column placeholder.
    fn compile_data_type(&self, ty: &DataType) -> DbResult<String>;

    /// Column definition with `column` substituted for the placeholder.
    fn column_definition(&self, column: &str, ty: &DataType) -> DbResult<String> {
        Ok(DataType::name_fragment(self.compile_data_type(ty)?, column))
    }

    /// Body of an `ALTER TABLE t ...` that changes a column's name or type.
    fn change_column(&self, old: &str, new: &str, ty: &DataType) -> DbResult<String>;

    /// Trailing table options of a CREATE TABLE statement (leading space
    /// included), or an empty string.
    fn create_table_options(&self, _columns: &[(String, DataType)]) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_value_rendering() {
        let d = MySqlDialect;
        assert_eq!(d.render_value(&Value::Null), "NULL");
        assert_eq!(d.render_value(&Value::Int(-3)), "-3");
        assert_eq!(d.render_value(&Value::UInt(7)), "7");
        assert_eq!(d.render_value(&Value::Float(2.5)), "2.5");
        assert_eq!(d.render_value(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(d.render_value(&Value::raw("NOW()")), "NOW()");
    }

    #[test]
    fn booleans_differ_per_dialect() {
        assert_eq!(MySqlDialect.render_value(&Value::Bool(true)), "1");
        assert_eq!(PostgresDialect.render_value(&Value::Bool(false)), "FALSE");
    }

    #[test]
    fn quoting_differs_per_dialect() {
        let v = Value::from("O'Brien\\");
        assert_eq!(MySqlDialect.render_value(&v), "'O\\'Brien\\\\'");
        assert_eq!(PostgresDialect.render_value(&v), "'O''Brien\\'");
    }

    #[test]
    fn limit_syntax() {
        assert_eq!(MySqlDialect.limit_clause(0, 10), "LIMIT 0,10");
        assert_eq!(
            MySqlDialect.limit_clause(20, 0),
            "LIMIT 20,18446744073709551615"
        );
        assert_eq!(PostgresDialect.limit_clause(20, 10), "LIMIT 10 OFFSET 20");
        assert_eq!(PostgresDialect.limit_clause(0, 10), "LIMIT 10");
        assert_eq!(PostgresDialect.limit_clause(20, 0), "OFFSET 20");
    }

    #[test]
    fn join_keywords() {
        assert_eq!(MySqlDialect.join_keyword(JoinKind::Left).unwrap(), "LEFT JOIN");
        assert!(MySqlDialect.join_keyword(JoinKind::Full).unwrap_err().is_compile());
        assert_eq!(
            PostgresDialect.join_keyword(JoinKind::Full).unwrap(),
            "FULL OUTER JOIN"
        );
    }
}
