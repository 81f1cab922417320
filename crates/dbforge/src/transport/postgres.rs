//! PostgreSQL transport over `tokio-postgres`.
//!
//! Statements run through the simple query protocol on a private
//! current-thread runtime, so the transport stays synchronous from the
//! caller's point of view. The connection task is spawned onto that runtime
//! and makes progress whenever a statement is being awaited.

use super::{Connector, QueryOutcome, Transport};
use crate::driver::DriverConfig;
use crate::error::{DbError, DbResult};
use crate::result::MemoryResult;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

/// Render a backend error, keeping the SQLSTATE when the server sent one.
fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db_err) => format!("{}: {}", db_err.code().code(), db_err.message()),
        None => err.to_string(),
    }
}

fn pg_config(config: &DriverConfig, database: Option<&str>) -> tokio_postgres::Config {
    let mut pg = tokio_postgres::Config::new();
    pg.host(if config.host.is_empty() {
        "localhost"
    } else {
        &config.host
    });
    pg.port(config.port.unwrap_or(5432));
    if !config.user.is_empty() {
        pg.user(&config.user);
    }
    if !config.password.is_empty() {
        pg.password(&config.password);
    }
    if let Some(db) = database.filter(|d| !d.is_empty()) {
        pg.dbname(db);
    }
    if let Some(name) = config.options.get("application_name") {
        pg.application_name(name);
    }
    if let Some(secs) = config
        .options
        .get("connect_timeout")
        .and_then(|s| s.parse::<u64>().ok())
    {
        pg.connect_timeout(Duration::from_secs(secs));
    }
    pg
}

/// Opens [`PgTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl Connector for PgConnector {
    fn connect(&self, config: &DriverConfig) -> DbResult<Box<dyn Transport>> {
        Ok(Box::new(PgTransport::connect(config)?))
    }
}

/// A synchronous PostgreSQL connection.
pub struct PgTransport {
    runtime: Runtime,
    config: DriverConfig,
    client: Option<Client>,
}

impl std::fmt::Debug for PgTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransport")
            .field("host", &self.config.host)
            .field("database", &self.config.database)
            .field("connected", &self.client.is_some())
            .finish()
    }
}

impl PgTransport {
    /// Connect to the configured database.
    pub fn connect(config: &DriverConfig) -> DbResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::driver(format!("failed to start runtime: {e}")))?;
        let mut transport = Self {
            runtime,
            config: config.clone(),
            client: None,
        };
        transport.client = Some(transport.open(Some(config.database.as_str()))?);
        Ok(transport)
    }

    /// Open a new session without touching the current one.
    fn open(&self, database: Option<&str>) -> DbResult<Client> {
        let pg = pg_config(&self.config, database);
        let (client, connection) = self
            .runtime
            .block_on(pg.connect(NoTls))
            .map_err(|e| DbError::driver(describe(&e)))?;
        self.runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(
                    target: "dbforge.driver",
                    error = %e,
                    "postgres connection closed with error"
                );
            }
        });
        Ok(client)
    }
}

impl Transport for PgTransport {
    fn query(&mut self, sql: &str) -> DbResult<QueryOutcome> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DbError::driver_with_query("not connected", sql))?;
        let messages = self
            .runtime
            .block_on(client.simple_query(sql))
            .map_err(|e| DbError::driver_with_query(describe(&e), sql))?;

        let mut result: Option<MemoryResult> = None;
        let mut affected_rows = 0;
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    if result.is_none() {
                        result = Some(MemoryResult::new(
                            columns.iter().map(|c| c.name().to_string()),
                        ));
                    }
                }
                SimpleQueryMessage::Row(row) => {
                    let target = result.get_or_insert_with(|| {
                        MemoryResult::new(row.columns().iter().map(|c| c.name().to_string()))
                    });
                    let cells = (0..row.len()).map(|i| row.get(i).map(str::to_string));
                    target.push_row(cells.collect());
                }
                SimpleQueryMessage::CommandComplete(n) => affected_rows = n,
                _ => {}
            }
        }

        Ok(match result {
            Some(result) => QueryOutcome::Rows(Box::new(result)),
            None => QueryOutcome::Done { affected_rows },
        })
    }

    /// PostgreSQL cannot switch databases on a live session; reconnect instead.
    fn select_database(&mut self, name: &str) -> DbResult<()> {
        if self.client.is_some() && self.config.database == name {
            return Ok(());
        }
        let client = self.open(Some(name))?;
        self.client = Some(client);
        self.config.database = name.to_string();
        Ok(())
    }

    fn disconnect(&mut self) {
        self.client = None;
    }
}
