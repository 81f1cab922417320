//! Example: create a table, write to it, read it back, drop it.
//!
//! Run with: cargo run --example postgres_roundtrip -p dbforge --features postgres
//!
//! Point DBFORGE_CONFIG at a driver config file (default `dbforge.toml`), e.g.
//!
//! ```toml
//! driver = "postgres"
//! host = "localhost"
//! database = "dbforge_example"
//! user = "postgres"
//! password = "${PGPASSWORD}"
//! table_prefix = "demo_"
//! ```
//!
//! `.env` is loaded first, so PGPASSWORD may live there.

use dbforge::{
    Condition, DataType, DbError, DriverConfig, DriverRegistry, DropKind, Order, Query, RowIndex,
    TypeId, Value,
};
use std::env;

fn main() -> Result<(), DbError> {
    dotenvy::dotenv().ok();

    let path = env::var("DBFORGE_CONFIG").unwrap_or_else(|_| "dbforge.toml".to_string());
    let config = DriverConfig::load(&path)?;
    let registry = DriverRegistry::with_builtin();
    let db = registry.open(&config)?;

    db.drop("notes", DropKind::Table).if_exists(true).send()?;
    db.create("notes")
        .column("id", DataType::new(TypeId::Int64).increment(1).primary_key(true))
        .column("title", DataType::new(TypeId::Varchar).size(120))
        .column(
            "pinned",
            DataType::new(TypeId::Int8).default_value(Value::Int(0)),
        )
        .send()?;

    for (title, pinned) in [("groceries", 0), ("rent", 1), ("dentist", 1)] {
        db.insert("notes")
            .value("title", title)
            .value("pinned", pinned)
            .send()?;
    }

    let mut q = db
        .select_as("notes", "n")
        .columns(["id", "title"])
        .condition(Condition::and().with_predicate("n.pinned", 1, "=")?)
        .order("n.title", Order::Asc);
    let mut outcome = q.send()?;
    println!("{}", q.state().cached().unwrap_or_default());

    if let Some(rows) = outcome.rows() {
        while let Some(row) = rows.fetch_row(RowIndex::Name) {
            println!(
                "{:>4}  {}",
                row.get_named("id")?.unwrap_or("NULL"),
                row.get_named("title")?.unwrap_or("NULL")
            );
        }
    }

    db.drop("notes", DropKind::Table).send()?;
    Ok(())
}
