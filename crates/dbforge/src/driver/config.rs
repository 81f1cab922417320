//! Driver configuration.
//!
//! ```toml
//! driver = "postgres"
//! host = "localhost"
//! port = 5432
//! database = "app"
//! user = "app"
//! password = "${APP_DB_PASSWORD}"
//! table_prefix = "app_"
//!
//! [options]
//! application_name = "dbforge"
//! ```
//!
//! `${VAR}` references in string values are expanded from the process
//! environment when the file is loaded.

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default number of bytes of statement text kept in log events.
pub const DEFAULT_LOG_SQL_MAX_LEN: usize = 200;

/// Connection and naming settings for a driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Registry key of the driver (`mysql`, `postgres`, ...).
    pub driver: String,
    pub host: String,
    pub port: Option<u16>,
    /// Database selected after connecting; empty selects nothing.
    pub database: String,
    pub user: String,
    pub password: String,
    /// Prepended to every table name (not to database names).
    pub table_prefix: String,
    /// Statement text in log events is truncated to this many bytes.
    pub log_sql_max_len: usize,
    /// Driver-specific options.
    pub options: BTreeMap<String, String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver: String::new(),
            host: String::new(),
            port: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            table_prefix: String::new(),
            log_sql_max_len: DEFAULT_LOG_SQL_MAX_LEN,
            options: BTreeMap::new(),
        }
    }
}

impl DriverConfig {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn log_sql_max_len(mut self, len: usize) -> Self {
        self.log_sql_max_len = len;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Parse TOML and expand `${VAR}` references.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let mut config: Self = toml::from_str(raw)
            .map_err(|e| DbError::config(format!("failed to parse driver config: {e}")))?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    fn expand_env(&mut self) -> DbResult<()> {
        for field in [
            &mut self.driver,
            &mut self.host,
            &mut self.database,
            &mut self.user,
            &mut self.password,
            &mut self.table_prefix,
        ] {
            *field = expand_env_vars(field)?;
        }
        for value in self.options.values_mut() {
            *value = expand_env_vars(value)?;
        }
        Ok(())
    }

    fn validate(&self) -> DbResult<()> {
        if self.driver.trim().is_empty() {
            return Err(DbError::config("driver must not be empty"));
        }
        Ok(())
    }
}

/// Replace `${VAR}` with the value of environment variable `VAR`.
pub fn expand_env_vars(input: &str) -> DbResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(DbError::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(DbError::config("invalid env var reference: ${}"));
            }

            let value = std::env::var(&key).map_err(|_| {
                DbError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&value);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg = DriverConfig::from_toml_str(r#"driver = "mysql""#).unwrap();
        assert_eq!(cfg.driver, "mysql");
        assert_eq!(cfg.log_sql_max_len, DEFAULT_LOG_SQL_MAX_LEN);
        assert!(cfg.table_prefix.is_empty());
        assert_eq!(cfg.port, None);
    }

    #[test]
    fn full_file_parses() {
        let cfg = DriverConfig::from_toml_str(
            r#"
            driver = "postgres"
            host = "db"
            port = 5433
            database = "app"
            table_prefix = "app_"

            [options]
            application_name = "dbforge"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, Some(5433));
        assert_eq!(cfg.table_prefix, "app_");
        assert_eq!(cfg.options["application_name"], "dbforge");
    }

    #[test]
    fn missing_driver_is_rejected() {
        let err = DriverConfig::from_toml_str("host = 'x'").unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[test]
    fn env_expansion() {
        // PATH is set in every test environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("a${PATH}b").unwrap(), format!("a{path}b"));
        assert_eq!(expand_env_vars("$PATH").unwrap(), "$PATH");
        assert!(expand_env_vars("${UNCLOSED").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${DBFORGE_SURELY_UNSET_VAR}").is_err());
    }

    #[test]
    fn builder_setters() {
        let cfg = DriverConfig::new("mysql")
            .host("localhost")
            .database("shop")
            .table_prefix("s_")
            .option("charset", "utf8mb4");
        assert_eq!(cfg.database, "shop");
        assert_eq!(cfg.options.get("charset").map(String::as_str), Some("utf8mb4"));
    }
}
