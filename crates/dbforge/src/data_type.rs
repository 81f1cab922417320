//! Logical column types.
//!
//! A [`DataType`] describes a column independently of any backend. The active
//! [`Dialect`] turns it into a physical definition fragment in which the
//! column name is still the [`COLUMN_PLACEHOLDER`] token; CREATE and ALTER
//! statements substitute the real name when embedding the fragment.

use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// Token standing in for the column name inside a compiled type fragment.
pub const COLUMN_PLACEHOLDER: &str = "!col";

/// Logical type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeId {
    /// Not yet chosen; compiling it is an error.
    #[default]
    Undefined,
    Int8,
    Int16,
    Int24,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text8,
    Text16,
    Text24,
    Text32,
    Blob8,
    Blob16,
    Blob24,
    Blob32,
    Char,
    Varchar,
    Enum,
    Set,
    Date,
    Time,
    DateTime,
    Timestamp,
}

impl TypeId {
    /// Parse a schema-file type name (`int32`, `varchar`, `datetime`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let id = match name.to_ascii_lowercase().as_str() {
            "int8" | "tinyint" => TypeId::Int8,
            "int16" | "smallint" => TypeId::Int16,
            "int24" | "mediumint" => TypeId::Int24,
            "int32" | "int" | "integer" => TypeId::Int32,
            "int64" | "bigint" => TypeId::Int64,
            "float32" | "float" => TypeId::Float32,
            "float64" | "double" => TypeId::Float64,
            "decimal" | "numeric" => TypeId::Decimal,
            "text8" | "tinytext" => TypeId::Text8,
            "text16" | "text" => TypeId::Text16,
            "text24" | "mediumtext" => TypeId::Text24,
            "text32" | "longtext" => TypeId::Text32,
            "blob8" | "tinyblob" => TypeId::Blob8,
            "blob16" | "blob" => TypeId::Blob16,
            "blob24" | "mediumblob" => TypeId::Blob24,
            "blob32" | "longblob" => TypeId::Blob32,
            "char" => TypeId::Char,
            "varchar" => TypeId::Varchar,
            "enum" => TypeId::Enum,
            "set" => TypeId::Set,
            "date" => TypeId::Date,
            "time" => TypeId::Time,
            "datetime" => TypeId::DateTime,
            "timestamp" => TypeId::Timestamp,
            _ => return None,
        };
        Some(id)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeId::Int8 | TypeId::Int16 | TypeId::Int24 | TypeId::Int32 | TypeId::Int64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, TypeId::Float32 | TypeId::Float64 | TypeId::Decimal)
    }
}

/// Logical column type plus its modifiers.
///
/// Columns are `NOT NULL` unless [`DataType::nullable`] is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataType {
    id: TypeId,
    unsigned: bool,
    nullable: bool,
    default: Option<Value>,
    increment: Option<u64>,
    size: u32,
    scale: u32,
    members: Vec<String>,
    primary_key: bool,
    unique: bool,
    references: Option<(String, String)>,
}

impl DataType {
    pub fn new(id: TypeId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Change the logical type.
    pub fn type_id(mut self, id: TypeId) -> Self {
        self.id = id;
        self
    }

    /// Mark as unsigned (ignored by dialects without unsigned types).
    pub fn unsigned(mut self, on: bool) -> Self {
        self.unsigned = on;
        self
    }

    pub fn nullable(mut self, on: bool) -> Self {
        self.nullable = on;
        self
    }

    /// Set the column default; `None` removes it.
    pub fn default_value(mut self, value: impl Into<Option<Value>>) -> Self {
        self.default = value.into();
        self
    }

    /// Enable auto increment starting at `start`.
    pub fn increment(mut self, start: u64) -> Self {
        self.increment = Some(start);
        self
    }

    pub fn no_increment(mut self) -> Self {
        self.increment = None;
        self
    }

    /// Length for CHAR/VARCHAR, precision for DECIMAL.
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Digits after the decimal point for DECIMAL.
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Member list for ENUM and SET.
    pub fn values<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn primary_key(mut self, on: bool) -> Self {
        self.primary_key = on;
        self
    }

    pub fn unique(mut self, on: bool) -> Self {
        self.unique = on;
        self
    }

    /// Inline foreign-key reference `REFERENCES table(column)`.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some((table.into(), column.into()));
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_val(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn increment_start(&self) -> Option<u64> {
        self.increment
    }

    pub fn get_size(&self) -> u32 {
        self.size
    }

    pub fn get_scale(&self) -> u32 {
        self.scale
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn referenced(&self) -> Option<(&str, &str)> {
        self.references
            .as_ref()
            .map(|(t, c)| (t.as_str(), c.as_str()))
    }

    /// Compile to a dialect fragment still containing [`COLUMN_PLACEHOLDER`].
    pub fn compile(&self, dialect: &dyn Dialect) -> DbResult<String> {
        dialect.compile_data_type(self)
    }

    /// Compile with the real column name in place of the leading placeholder.
    pub fn column_definition(&self, column: &str, dialect: &dyn Dialect) -> DbResult<String> {
        dialect.column_definition(column, self)
    }

    /// Shared error checks every dialect applies before naming the type.
    pub(crate) fn check_common(&self) -> DbResult<()> {
        match self.id {
            TypeId::Undefined => Err(DbError::compile("data type is undefined")),
            TypeId::Enum | TypeId::Set if self.members.is_empty() => Err(DbError::compile(
                format!("{:?} data type requires at least one value", self.id),
            )),
            _ => Ok(()),
        }
    }

    /// Assemble `!col TYPE [UNSIGNED] [NOT NULL] [DEFAULT v] [AUTO] [PRIMARY KEY]
    /// [UNIQUE] [REFERENCES t(c)]` around a dialect's physical type name.
    pub(crate) fn assemble(
        &self,
        physical: &str,
        unsigned: bool,
        auto_increment: Option<&str>,
        dialect: &dyn Dialect,
    ) -> String {
        let mut parts = vec![COLUMN_PLACEHOLDER.to_string(), physical.to_string()];
        if unsigned {
            parts.push("UNSIGNED".into());
        }
        if !self.nullable {
            parts.push("NOT NULL".into());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", dialect.render_value(default)));
        }
        if let Some(auto) = auto_increment {
            parts.push(auto.to_string());
        }
        if self.primary_key {
            parts.push("PRIMARY KEY".into());
        }
        if self.unique {
            parts.push("UNIQUE".into());
        }
        if let Some((table, column)) = &self.references {
            parts.push(format!("REFERENCES {table}({column})"));
        }
        parts.join(" ")
    }

    /// Swap the leading placeholder of a compiled fragment for `column`.
    /// Literals later in the fragment are left alone.
    pub(crate) fn name_fragment(fragment: String, column: &str) -> String {
        match fragment.strip_prefix(COLUMN_PLACEHOLDER) {
            Some(rest) => format!("{column}{rest}"),
            None => fragment,
        }
    }

    /// Members rendered as a quoted, comma-separated list.
    pub(crate) fn member_list(&self, dialect: &dyn Dialect) -> String {
        self.members
            .iter()
            .map(|m| format!("'{}'", dialect.escape_text(m)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
