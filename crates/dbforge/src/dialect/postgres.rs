use super::Dialect;
use crate::condition::CmpOp;
use crate::data_type::{COLUMN_PLACEHOLDER, DataType, TypeId};
use crate::error::{DbError, DbResult};
use crate::query::JoinKind;

/// PostgreSQL rendering rules.
///
/// Assumes `standard_conforming_strings = on` (the server default), so only
/// single quotes need escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Physical type name; `column` feeds the enum CHECK constraint.
    fn physical_name(&self, ty: &DataType, column: &str) -> DbResult<String> {
        let name = match ty.id() {
            TypeId::Undefined => return Err(DbError::compile("data type is undefined")),
            TypeId::Int8 | TypeId::Int16 => "SMALLINT".to_string(),
            TypeId::Int24 | TypeId::Int32 => "INTEGER".to_string(),
            TypeId::Int64 => "BIGINT".to_string(),
            TypeId::Float32 => "REAL".to_string(),
            TypeId::Float64 => "DOUBLE PRECISION".to_string(),
            TypeId::Decimal if ty.get_size() > 0 => {
                format!("NUMERIC({},{})", ty.get_size(), ty.get_scale())
            }
            TypeId::Decimal => "NUMERIC".to_string(),
            TypeId::Text8 | TypeId::Text16 | TypeId::Text24 | TypeId::Text32 => {
                "TEXT".to_string()
            }
            TypeId::Blob8 | TypeId::Blob16 | TypeId::Blob24 | TypeId::Blob32 => {
                "BYTEA".to_string()
            }
            TypeId::Char => format!("CHAR({})", ty.get_size().max(1)),
            TypeId::Varchar if ty.get_size() == 0 => "VARCHAR".to_string(),
            TypeId::Varchar => format!("VARCHAR({})", ty.get_size()),
            TypeId::Enum => {
                let longest = ty
                    .members()
                    .iter()
                    .map(|m| m.chars().count())
                    .max()
                    .unwrap_or(1);
                let width = (ty.get_size() as usize).max(longest);
                format!(
                    "VARCHAR({width}) CHECK ({column} IN ({}))",
                    ty.member_list(self)
                )
            }
            TypeId::Set => {
                return Err(DbError::compile("SET data type is not supported by PostgreSQL"));
            }
            TypeId::Date => "DATE".to_string(),
            TypeId::Time => "TIME".to_string(),
            TypeId::DateTime => "TIMESTAMP".to_string(),
            TypeId::Timestamp => "TIMESTAMPTZ".to_string(),
        };
        Ok(name)
    }

    fn fragment(&self, ty: &DataType, column: &str) -> DbResult<String> {
        ty.check_common()?;
        let physical = self.physical_name(ty, column)?;
        let identity = match ty.increment_start() {
            Some(_) if !ty.id().is_integer() => {
                return Err(DbError::compile(format!(
                    "auto increment requires an integer type, got {:?}",
                    ty.id()
                )));
            }
            Some(start) if start > 1 => Some(format!(
                "GENERATED BY DEFAULT AS IDENTITY (START WITH {start})"
            )),
            Some(_) => Some("GENERATED BY DEFAULT AS IDENTITY".to_string()),
            None => None,
        };
        Ok(ty.assemble(&physical, false, identity.as_deref(), self))
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn supported_dbs(&self) -> &'static [&'static str] {
        &["postgres", "postgresql", "pgsql"]
    }

    fn escape_text(&self, text: &str) -> String {
        text.replace('\'', "''")
    }

    fn render_bool(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn supports_operator(&self, _op: CmpOp) -> bool {
        true
    }

    fn join_keyword(&self, kind: JoinKind) -> DbResult<&'static str> {
        Ok(match kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        })
    }

    fn limit_clause(&self, offset: u64, count: u64) -> String {
        match (count, offset) {
            (0, offset) => format!("OFFSET {offset}"),
            (count, 0) => format!("LIMIT {count}"),
            (count, offset) => format!("LIMIT {count} OFFSET {offset}"),
        }
    }

    fn compile_data_type(&self, ty: &DataType) -> DbResult<String> {
        self.fragment(ty, COLUMN_PLACEHOLDER)
    }

    fn column_definition(&self, column: &str, ty: &DataType) -> DbResult<String> {
        Ok(DataType::name_fragment(self.fragment(ty, column)?, column))
    }

    fn change_column(&self, old: &str, new: &str, ty: &DataType) -> DbResult<String> {
        if old != new {
            return Err(DbError::compile(format!(
                "PostgreSQL cannot rename '{old}' to '{new}' while changing its type"
            )));
        }
        ty.check_common()?;
        let physical = self.physical_name(ty, old)?;
        let mut parts = vec![format!("ALTER COLUMN {old} TYPE {physical}")];
        parts.push(if ty.is_nullable() {
            format!("ALTER COLUMN {old} DROP NOT NULL")
        } else {
            format!("ALTER COLUMN {old} SET NOT NULL")
        });
        if let Some(default) = ty.default_val() {
            parts.push(format!(
                "ALTER COLUMN {old} SET DEFAULT {}",
                self.render_value(default)
            ));
        }
        Ok(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn text_classes_collapse() {
        let ty = DataType::new(TypeId::Text32).nullable(true);
        assert_eq!(PostgresDialect.compile_data_type(&ty).unwrap(), "!col TEXT");
        let ty = DataType::new(TypeId::Blob8);
        assert_eq!(
            PostgresDialect.compile_data_type(&ty).unwrap(),
            "!col BYTEA NOT NULL"
        );
    }

    #[test]
    fn identity_requires_integer() {
        let ty = DataType::new(TypeId::Varchar).size(8).increment(1);
        assert!(PostgresDialect.compile_data_type(&ty).unwrap_err().is_compile());
    }

    #[test]
    fn change_column_type_in_place() {
        let ty = DataType::new(TypeId::Int64).default_value(Value::Int(0));
        assert_eq!(
            PostgresDialect.change_column("hits", "hits", &ty).unwrap(),
            "ALTER COLUMN hits TYPE BIGINT, ALTER COLUMN hits SET NOT NULL, \
             ALTER COLUMN hits SET DEFAULT 0"
        );
    }

    #[test]
    fn change_column_rejects_rename() {
        let ty = DataType::new(TypeId::Int64);
        assert!(
            PostgresDialect
                .change_column("a", "b", &ty)
                .unwrap_err()
                .is_compile()
        );
    }
}
