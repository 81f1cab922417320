use dbforge::{
    DataType, Driver, DropKind, ForeignKey, MemoryConnector, MySqlDialect, PostgresDialect, Query,
    TypeId, UniqueKey, Value,
};
use std::sync::Arc;

fn mysql() -> (Driver, MemoryConnector) {
    let mem = MemoryConnector::new();
    let driver = Driver::new(Arc::new(MySqlDialect), Box::new(mem.transport()));
    (driver, mem)
}

fn postgres() -> (Driver, MemoryConnector) {
    let mem = MemoryConnector::new();
    let driver = Driver::new(Arc::new(PostgresDialect), Box::new(mem.transport()));
    (driver, mem)
}

fn status() -> DataType {
    DataType::new(TypeId::Enum)
        .values(["draft", "published"])
        .default_value(Value::from("draft"))
}

#[test]
fn enum_columns_per_dialect() {
    let (my, _) = mysql();
    assert_eq!(
        my.create("posts").column("status", status()).compile().unwrap(),
        "CREATE TABLE posts(status ENUM('draft', 'published') NOT NULL DEFAULT 'draft')"
    );

    let (pg, _) = postgres();
    assert_eq!(
        pg.create("posts").column("status", status()).compile().unwrap(),
        "CREATE TABLE posts(status VARCHAR(9) CHECK (status IN ('draft', 'published')) \
         NOT NULL DEFAULT 'draft')"
    );
}

#[test]
fn schema_lifecycle_is_sent_in_order() {
    let (db, mem) = mysql();
    let db = db.with_table_prefix("blog_");

    db.create("authors")
        .if_not_exists(true)
        .column("id", DataType::new(TypeId::Int32).unsigned(true).increment(1))
        .column("email", DataType::new(TypeId::Varchar).size(190))
        .primary_key("id")
        .unique_key("email", UniqueKey::named("uq_email"))
        .send()
        .unwrap();
    db.create("articles")
        .column("id", DataType::new(TypeId::Int64).increment(1).primary_key(true))
        .column("author_id", DataType::new(TypeId::Int32).unsigned(true))
        .column("body", DataType::new(TypeId::Text32).nullable(true))
        .foreign_key("author_id", ForeignKey::new("blog_authors", "id"))
        .send()
        .unwrap();
    db.alter("articles")
        .add_column("views", DataType::new(TypeId::Int32).default_value(Value::Int(0)))
        .send()
        .unwrap();
    db.truncate("articles").send().unwrap();
    db.drop("articles", DropKind::Table).if_exists(true).send().unwrap();

    assert_eq!(
        mem.sent(),
        vec![
            "CREATE TABLE IF NOT EXISTS blog_authors(\
             id INT UNSIGNED NOT NULL AUTO_INCREMENT, \
             email VARCHAR(190) NOT NULL, \
             PRIMARY KEY(id), \
             CONSTRAINT uq_email UNIQUE(email))",
            "CREATE TABLE blog_articles(\
             id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             author_id INT UNSIGNED NOT NULL, \
             body LONGTEXT, \
             FOREIGN KEY(author_id) REFERENCES blog_authors(id))",
            "ALTER TABLE blog_articles ADD COLUMN views INT NOT NULL DEFAULT 0",
            "TRUNCATE TABLE blog_articles",
            "DROP TABLE IF EXISTS blog_articles",
        ]
    );
}

#[test]
fn postgres_alter_changes_type_in_place() {
    let (pg, _) = postgres();
    let q = pg.alter("articles").change_column(
        "views",
        "views",
        DataType::new(TypeId::Int64).nullable(true),
    );
    assert_eq!(
        q.compile().unwrap(),
        "ALTER TABLE articles ALTER COLUMN views TYPE BIGINT, ALTER COLUMN views DROP NOT NULL"
    );
}

#[test]
fn postgres_identity_start() {
    let (pg, _) = postgres();
    let q = pg
        .create("tickets")
        .column("id", DataType::new(TypeId::Int32).increment(1000))
        .primary_key("id");
    assert_eq!(
        q.compile().unwrap(),
        "CREATE TABLE tickets(id INTEGER NOT NULL GENERATED BY DEFAULT AS IDENTITY \
         (START WITH 1000), PRIMARY KEY(id))"
    );
}

#[test]
fn unsupported_types_fail_before_sending() {
    let (pg, mem) = postgres();
    let err = pg
        .create("t")
        .column("flags", DataType::new(TypeId::Set).values(["a", "b"]))
        .send()
        .unwrap_err();
    assert!(err.is_compile());

    let (my, _) = mysql();
    let err = my
        .create("t")
        .column("name", DataType::new(TypeId::Varchar))
        .compile()
        .unwrap_err();
    assert!(err.is_compile());

    assert!(mem.sent().is_empty());
}

#[test]
fn drop_database_ignores_prefix() {
    let (db, mem) = mysql();
    let db = db.with_table_prefix("blog_");
    db.drop("blog", DropKind::Database).send().unwrap();
    assert_eq!(mem.last_sent().unwrap(), "DROP DATABASE blog");
}
