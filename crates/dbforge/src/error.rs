//! Error types for dbforge

use thiserror::Error;

/// Result type alias for dbforge operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for building, compiling, and sending statements
#[derive(Debug, Error)]
pub enum DbError {
    /// No driver is registered under the requested name
    #[error("Database driver '{0}' does not exist")]
    UnknownDriver(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A condition was built with an operand shape its operator cannot take
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// Builder state the active dialect cannot render
    #[error("Compile error: {0}")]
    Compile(String),

    /// A row cell was requested by a position or name the row does not expose
    #[error("Column error: {0}")]
    Column(String),

    /// Failure reported by the backend transport.
    ///
    /// `query` holds the exact text that was sent, or is empty when the
    /// failure happened before any statement was submitted (e.g. on connect).
    #[error("Driver error: {message}")]
    Driver { message: String, query: String },
}

impl DbError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed condition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCondition(message.into())
    }

    /// Create a compile error
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    /// Create a column access error
    pub fn column(message: impl Into<String>) -> Self {
        Self::Column(message.into())
    }

    /// Create a driver error that did not originate from a statement
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
            query: String::new(),
        }
    }

    /// Create a driver error carrying the statement that failed
    pub fn driver_with_query(message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
            query: query.into(),
        }
    }

    /// Statement text attached to a driver error.
    ///
    /// Returns `None` for every other variant.
    pub fn query_text(&self) -> Option<&str> {
        match self {
            Self::Driver { query, .. } => Some(query),
            _ => None,
        }
    }

    /// Check if this is a driver (transport) error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Check if this is a compile error
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Check if this is a malformed condition error
    pub fn is_malformed_condition(&self) -> bool {
        matches!(self, Self::MalformedCondition(_))
    }

    /// Check if this is an unknown driver error
    pub fn is_unknown_driver(&self) -> bool {
        matches!(self, Self::UnknownDriver(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_keeps_query_text() {
        let err = DbError::driver_with_query("syntax error", "SELEC 1");
        assert!(err.is_driver());
        assert_eq!(err.query_text(), Some("SELEC 1"));
        assert_eq!(err.to_string(), "Driver error: syntax error");
    }

    #[test]
    fn connect_error_has_empty_query_text() {
        let err = DbError::driver("connection refused");
        assert_eq!(err.query_text(), Some(""));
    }

    #[test]
    fn non_driver_errors_have_no_query_text() {
        assert_eq!(DbError::compile("x").query_text(), None);
        assert!(DbError::UnknownDriver("oracle".into()).is_unknown_driver());
        assert_eq!(
            DbError::UnknownDriver("oracle".into()).to_string(),
            "Database driver 'oracle' does not exist"
        );
    }
}
