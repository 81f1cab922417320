use super::{Connector, QueryOutcome, Transport};
use crate::driver::DriverConfig;
use crate::error::{DbError, DbResult};
use crate::result::MemoryResult;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
enum Scripted {
    Rows(MemoryResult),
    Done(u64),
    Fail(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    sent: Vec<String>,
    database: Option<String>,
    connected: bool,
    connects: usize,
    refuse: Option<String>,
    responses: VecDeque<Scripted>,
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory backend: records every statement and replays scripted outcomes.
///
/// Clones share state, so a test can keep a handle after giving one to a
/// [`DriverRegistry`](crate::DriverRegistry) and inspect what was sent.
/// Statements without a scripted outcome succeed with zero affected rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every connection attempt fail with `message`.
    pub fn refuse_connections(self, message: impl Into<String>) -> Self {
        lock(&self.state).refuse = Some(message.into());
        self
    }

    /// Queue a result set for the next statement.
    pub fn push_rows(&self, result: MemoryResult) {
        lock(&self.state).responses.push_back(Scripted::Rows(result));
    }

    /// Queue a success for the next statement.
    pub fn push_done(&self, affected_rows: u64) {
        lock(&self.state)
            .responses
            .push_back(Scripted::Done(affected_rows));
    }

    /// Queue a backend failure for the next statement.
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.state)
            .responses
            .push_back(Scripted::Fail(message.into()));
    }

    /// Every statement received so far, in order.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    pub fn last_sent(&self) -> Option<String> {
        lock(&self.state).sent.last().cloned()
    }

    /// Currently selected database.
    pub fn database(&self) -> Option<String> {
        lock(&self.state).database.clone()
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    /// Number of successful connects.
    pub fn connects(&self) -> usize {
        lock(&self.state).connects
    }

    /// Transport sharing this connector's state, without going through `connect`.
    pub fn transport(&self) -> MemoryTransport {
        let mut state = lock(&self.state);
        state.connected = true;
        state.connects += 1;
        MemoryTransport {
            state: Arc::clone(&self.state),
        }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _config: &DriverConfig) -> DbResult<Box<dyn Transport>> {
        if let Some(message) = lock(&self.state).refuse.clone() {
            return Err(DbError::driver(message));
        }
        Ok(Box::new(self.transport()))
    }
}

/// Connection half of [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl Transport for MemoryTransport {
    fn query(&mut self, sql: &str) -> DbResult<QueryOutcome> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(DbError::driver_with_query("not connected", sql));
        }
        state.sent.push(sql.to_string());
        match state.responses.pop_front() {
            Some(Scripted::Rows(result)) => Ok(QueryOutcome::Rows(Box::new(result))),
            Some(Scripted::Done(affected_rows)) => Ok(QueryOutcome::Done { affected_rows }),
            Some(Scripted::Fail(message)) => Err(DbError::driver_with_query(message, sql)),
            None => Ok(QueryOutcome::Done { affected_rows: 0 }),
        }
    }

    fn select_database(&mut self, name: &str) -> DbResult<()> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(DbError::driver("not connected"));
        }
        state.database = Some(name.to_string());
        Ok(())
    }

    fn disconnect(&mut self) {
        lock(&self.state).connected = false;
    }
}
