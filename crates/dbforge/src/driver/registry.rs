use super::{Driver, DriverConfig};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::transport::Connector;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    dialect: Arc<dyn Dialect>,
    connector: Arc<dyn Connector>,
}

/// Name → driver lookup.
///
/// Built once at startup and passed explicitly to whatever opens drivers;
/// after registration it is only read. Keys are matched case-insensitively.
///
/// ```ignore
/// use dbforge::{DriverConfig, DriverRegistry};
///
/// let registry = DriverRegistry::with_builtin();
/// let driver = registry.open(&DriverConfig::load("dbforge.toml")?)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    entries: HashMap<String, Entry>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the drivers compiled into this build.
    pub fn with_builtin() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "postgres")]
        registry.register(
            Arc::new(crate::dialect::PostgresDialect),
            Arc::new(crate::transport::PgConnector),
        );
        registry
    }

    /// Register a driver under every name its dialect supports. Later
    /// registrations replace earlier ones with the same name.
    pub fn register(&mut self, dialect: Arc<dyn Dialect>, connector: Arc<dyn Connector>) {
        for name in dialect.supported_dbs() {
            self.entries.insert(
                name.to_ascii_lowercase(),
                Entry {
                    dialect: Arc::clone(&dialect),
                    connector: Arc::clone(&connector),
                },
            );
        }
    }

    /// Consuming form of [`DriverRegistry::register`].
    pub fn with(mut self, dialect: Arc<dyn Dialect>, connector: Arc<dyn Connector>) -> Self {
        self.register(dialect, connector);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn dialect(&self, name: &str) -> DbResult<Arc<dyn Dialect>> {
        self.entry(name).map(|e| Arc::clone(&e.dialect))
    }

    fn entry(&self, name: &str) -> DbResult<&Entry> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| DbError::UnknownDriver(name.to_string()))
    }

    /// Connect the driver named by `config.driver` and select
    /// `config.database` when it is set.
    pub fn open(&self, config: &DriverConfig) -> DbResult<Driver> {
        let entry = self.entry(&config.driver)?;
        let transport = entry.connector.connect(config)?;
        let driver = Driver::new(Arc::clone(&entry.dialect), transport)
            .with_table_prefix(config.table_prefix.clone())
            .with_log_sql_max_len(config.log_sql_max_len);
        tracing::debug!(
            target: "dbforge.driver",
            driver = %config.driver,
            dialect = entry.dialect.name(),
            host = %config.host,
            "driver opened"
        );
        if !config.database.is_empty() {
            driver.select_database(&config.database)?;
        }
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::transport::MemoryConnector;

    fn registry(mem: &MemoryConnector) -> DriverRegistry {
        DriverRegistry::new()
            .with(Arc::new(MySqlDialect), Arc::new(mem.clone()))
            .with(Arc::new(PostgresDialect), Arc::new(mem.clone()))
    }

    #[test]
    fn every_supported_name_is_registered() {
        let reg = registry(&MemoryConnector::new());
        assert_eq!(
            reg.names(),
            vec!["mariadb", "mysql", "pgsql", "postgres", "postgresql"]
        );
        assert!(reg.contains("MySQL"));
        assert_eq!(reg.dialect("pgsql").unwrap().name(), "postgres");
    }

    #[test]
    fn unknown_driver_fails() {
        let reg = registry(&MemoryConnector::new());
        let err = reg.open(&DriverConfig::new("oracle")).unwrap_err();
        assert!(err.is_unknown_driver());
        assert_eq!(err.to_string(), "Database driver 'oracle' does not exist");
    }

    #[test]
    fn open_selects_database_and_applies_prefix() {
        let mem = MemoryConnector::new();
        let reg = registry(&mem);
        let config = DriverConfig::new("mysql").database("shop").table_prefix("s_");
        let driver = reg.open(&config).unwrap();
        assert_eq!(mem.database().as_deref(), Some("shop"));
        assert_eq!(driver.prefixed("items"), "s_items");
    }

    #[test]
    fn open_without_database_selects_nothing() {
        let mem = MemoryConnector::new();
        let _driver = registry(&mem).open(&DriverConfig::new("mysql")).unwrap();
        assert_eq!(mem.database(), None);
    }

    #[test]
    fn connect_failure_has_empty_query_text() {
        let mem = MemoryConnector::new().refuse_connections("connection refused");
        let err = registry(&mem).open(&DriverConfig::new("mysql")).unwrap_err();
        assert!(err.is_driver());
        assert_eq!(err.query_text(), Some(""));
    }
}
