//! `dbforge ddl`: TOML table schema → CREATE TABLE statements.
//!
//! ```toml
//! [[tables]]
//! name = "posts"
//! primary_key = "id"
//!
//! [[tables.columns]]
//! name = "id"
//! type = "int64"
//! increment = 1
//!
//! [[tables.columns]]
//! name = "author_id"
//! type = "int32"
//! unsigned = true
//!
//! [[tables.foreign_keys]]
//! column = "author_id"
//! table = "authors"
//! references = "id"
//! ```

use crate::cli::DdlArgs;
use dbforge::{
    DataType, Driver, DriverConfig, DriverRegistry, ForeignKey, MemoryConnector, MySqlDialect,
    PostgresDialect, Query, TypeId, UniqueKey, Value,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub if_not_exists: bool,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDef>,
    #[serde(default)]
    pub unique_keys: Vec<UniqueKeyDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub scale: u32,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub nullable: bool,
    pub default: Option<toml::Value>,
    pub increment: Option<u64>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    /// `table.column`
    pub references: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForeignKeyDef {
    pub column: String,
    pub table: String,
    pub references: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniqueKeyDef {
    pub column: String,
    pub name: Option<String>,
}

impl ColumnDef {
    fn data_type(&self, table: &str) -> anyhow::Result<DataType> {
        let Some(id) = TypeId::from_name(&self.type_name) else {
            anyhow::bail!(
                "{table}.{}: unknown column type '{}'",
                self.name,
                self.type_name
            );
        };

        let mut ty = DataType::new(id)
            .unsigned(self.unsigned)
            .nullable(self.nullable)
            .size(self.size)
            .scale(self.scale)
            .values(self.values.iter().cloned())
            .primary_key(self.primary_key)
            .unique(self.unique);
        if let Some(start) = self.increment {
            ty = ty.increment(start);
        }
        if let Some(default) = &self.default {
            ty = ty.default_value(literal(default).map_err(|e| {
                anyhow::anyhow!("{table}.{}: {e}", self.name)
            })?);
        }
        if let Some(target) = &self.references {
            let Some((ref_table, ref_column)) = target.split_once('.') else {
                anyhow::bail!(
                    "{table}.{}: references must be `table.column`, got '{target}'",
                    self.name
                );
            };
            ty = ty.references(ref_table, ref_column);
        }
        Ok(ty)
    }
}

fn literal(value: &toml::Value) -> anyhow::Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::Text(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        other => anyhow::bail!("unsupported default value: {other}"),
    })
}

/// Driver over a memory transport; only its dialect is used.
fn offline_driver(dialect: &str) -> anyhow::Result<Driver> {
    let mem = MemoryConnector::new();
    let registry = DriverRegistry::new()
        .with(Arc::new(MySqlDialect), Arc::new(mem.clone()))
        .with(Arc::new(PostgresDialect), Arc::new(mem));
    Ok(registry.open(&DriverConfig::new(dialect))?)
}

/// One CREATE TABLE statement per table, in file order.
pub fn render(schema: &SchemaFile, dialect: &str, if_not_exists: bool) -> anyhow::Result<Vec<String>> {
    let db = offline_driver(dialect)?;
    let mut out = Vec::with_capacity(schema.tables.len());

    for table in &schema.tables {
        let mut q = db
            .create(&table.name)
            .if_not_exists(if_not_exists || table.if_not_exists);
        for column in &table.columns {
            q = q.column(&column.name, column.data_type(&table.name)?);
        }
        if let Some(pk) = &table.primary_key {
            q = q.primary_key(pk);
        }
        for fk in &table.foreign_keys {
            let mut key = ForeignKey::new(&fk.table, &fk.references);
            if let Some(name) = &fk.name {
                key = key.named(name);
            }
            q = q.foreign_key(&fk.column, key);
        }
        for uk in &table.unique_keys {
            let key = match &uk.name {
                Some(name) => UniqueKey::named(name),
                None => UniqueKey::default(),
            };
            q = q.unique_key(&uk.column, key);
        }

        let sql = q
            .compile()
            .map_err(|e| anyhow::anyhow!("table {}: {e}", table.name))?;
        out.push(sql);
    }

    Ok(out)
}

pub fn run(args: DdlArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.schema)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", args.schema.display()))?;
    let schema: SchemaFile = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", args.schema.display()))?;
    if schema.tables.is_empty() {
        anyhow::bail!("no tables found in {}", args.schema.display());
    }

    for sql in render(&schema, &args.dialect, args.if_not_exists)? {
        println!("{sql};");
    }
    Ok(())
}
