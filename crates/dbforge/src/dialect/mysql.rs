use super::Dialect;
use crate::data_type::{DataType, TypeId};
use crate::error::{DbError, DbResult};
use crate::query::JoinKind;

/// MySQL / MariaDB rendering rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    fn physical_name(&self, ty: &DataType) -> DbResult<String> {
        let name = match ty.id() {
            TypeId::Undefined => return Err(DbError::compile("data type is undefined")),
            TypeId::Int8 => "TINYINT".to_string(),
            TypeId::Int16 => "SMALLINT".to_string(),
            TypeId::Int24 => "MEDIUMINT".to_string(),
            TypeId::Int32 => "INT".to_string(),
            TypeId::Int64 => "BIGINT".to_string(),
            TypeId::Float32 => "FLOAT".to_string(),
            TypeId::Float64 => "DOUBLE".to_string(),
            TypeId::Decimal if ty.get_size() > 0 => {
                format!("DECIMAL({},{})", ty.get_size(), ty.get_scale())
            }
            TypeId::Decimal => "DECIMAL".to_string(),
            TypeId::Text8 => "TINYTEXT".to_string(),
            TypeId::Text16 => "TEXT".to_string(),
            TypeId::Text24 => "MEDIUMTEXT".to_string(),
            TypeId::Text32 => "LONGTEXT".to_string(),
            TypeId::Blob8 => "TINYBLOB".to_string(),
            TypeId::Blob16 => "BLOB".to_string(),
            TypeId::Blob24 => "MEDIUMBLOB".to_string(),
            TypeId::Blob32 => "LONGBLOB".to_string(),
            TypeId::Char => format!("CHAR({})", ty.get_size().max(1)),
            TypeId::Varchar if ty.get_size() == 0 => {
                return Err(DbError::compile("VARCHAR requires a size on MySQL"));
            }
            TypeId::Varchar => format!("VARCHAR({})", ty.get_size()),
            TypeId::Enum => format!("ENUM({})", ty.member_list(self)),
            TypeId::Set => format!("SET({})", ty.member_list(self)),
            TypeId::Date => "DATE".to_string(),
            TypeId::Time => "TIME".to_string(),
            TypeId::DateTime => "DATETIME".to_string(),
            TypeId::Timestamp => "TIMESTAMP".to_string(),
        };
        Ok(name)
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supported_dbs(&self) -> &'static [&'static str] {
        &["mysql", "mariadb"]
    }

    fn escape_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\x1a' => out.push_str("\\Z"),
                c => out.push(c),
            }
        }
        out
    }

    fn render_bool(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn join_keyword(&self, kind: JoinKind) -> DbResult<&'static str> {
        match kind {
            JoinKind::Inner => Ok("INNER JOIN"),
            JoinKind::Left => Ok("LEFT JOIN"),
            JoinKind::Right => Ok("RIGHT JOIN"),
            JoinKind::Full => Err(DbError::compile("FULL JOIN is not supported by MySQL")),
        }
    }

    fn limit_clause(&self, offset: u64, count: u64) -> String {
        // MySQL has no offset-only form; the documented idiom is the maximum row count.
        let count = if count == 0 { u64::MAX } else { count };
        format!("LIMIT {offset},{count}")
    }

    fn compile_data_type(&self, ty: &DataType) -> DbResult<String> {
        ty.check_common()?;
        let physical = self.physical_name(ty)?;
        let unsigned = ty.is_unsigned() && ty.id().is_numeric();
        if ty.increment_start().is_some() && !ty.id().is_integer() {
            return Err(DbError::compile(format!(
                "AUTO_INCREMENT requires an integer type, got {:?}",
                ty.id()
            )));
        }
        let auto = ty.increment_start().map(|_| "AUTO_INCREMENT");
        Ok(ty.assemble(&physical, unsigned, auto, self))
    }

    fn change_column(&self, old: &str, new: &str, ty: &DataType) -> DbResult<String> {
        let def = ty.column_definition(new, self)?;
        Ok(format!("CHANGE COLUMN {old} {def}"))
    }

    fn create_table_options(&self, columns: &[(String, DataType)]) -> String {
        columns
            .iter()
            .filter_map(|(_, ty)| ty.increment_start())
            .find(|start| *start > 1)
            .map(|start| format!(" AUTO_INCREMENT={start}"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(
            MySqlDialect.escape_text("a\nb\r\0\x1a"),
            "a\\nb\\r\\0\\Z"
        );
    }

    #[test]
    fn unsigned_only_on_numbers() {
        let ty = DataType::new(TypeId::Varchar).size(10).unsigned(true);
        assert_eq!(
            MySqlDialect.compile_data_type(&ty).unwrap(),
            "!col VARCHAR(10) NOT NULL"
        );
    }

    #[test]
    fn auto_increment_requires_integer() {
        let ty = DataType::new(TypeId::Varchar).size(10).increment(1);
        assert!(MySqlDialect.compile_data_type(&ty).unwrap_err().is_compile());
        let ty = DataType::new(TypeId::Int24).increment(1);
        assert_eq!(
            MySqlDialect.compile_data_type(&ty).unwrap(),
            "!col MEDIUMINT NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn change_column_renames() {
        let ty = DataType::new(TypeId::Varchar).size(80);
        assert_eq!(
            MySqlDialect.change_column("name", "full_name", &ty).unwrap(),
            "CHANGE COLUMN name full_name VARCHAR(80) NOT NULL"
        );
    }

    #[test]
    fn auto_increment_table_option() {
        let cols = vec![
            ("id".to_string(), DataType::new(TypeId::Int32).increment(1000)),
            ("name".to_string(), DataType::new(TypeId::Text16)),
        ];
        assert_eq!(MySqlDialect.create_table_options(&cols), " AUTO_INCREMENT=1000");
        let cols = vec![("id".to_string(), DataType::new(TypeId::Int32).increment(1))];
        assert_eq!(MySqlDialect.create_table_options(&cols), "");
    }
}
