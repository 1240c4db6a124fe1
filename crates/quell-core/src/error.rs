//! Error types for quell operations.

use std::fmt;

/// The primary error type for all quell operations.
#[derive(Debug)]
pub enum Error {
    /// A dialect lacks a requested capability. Raised synchronously at
    /// build time, before any I/O.
    Unsupported {
        feature: &'static str,
        dialect: &'static str,
    },
    /// An operation that needs a primary key was attempted on an entity
    /// without one. Raised synchronously at build time.
    MissingPrimaryKey { table: String },
    /// The connection handle rejected or errored. Carries the fully
    /// rendered SQL alongside the driver error.
    Query(QueryError),
    /// A zero-row result where exactly one row was required.
    NotFound { table: String },
    /// Placeholder token count diverged from the parameter count. This is
    /// an internal invariant violation, never suppressed or retried.
    PlaceholderMismatch { expected: usize, found: usize },
    /// Type conversion errors
    Type(TypeError),
    /// Custom error with message
    Custom(String),
}

/// An execution failure wrapping the driver error.
#[derive(Debug)]
pub struct QueryError {
    /// The fully rendered SQL that was sent to the driver.
    pub sql: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// The underlying driver error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A value-to-type conversion failure.
#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

impl Error {
    /// Get the SQL that caused this error, if available.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for a not-found failure on the given table.
    pub fn not_found(table: impl Into<String>) -> Self {
        Error::NotFound {
            table: table.into(),
        }
    }

    /// Shorthand for a missing-primary-key failure on the given table.
    pub fn missing_primary_key(table: impl Into<String>) -> Self {
        Error::MissingPrimaryKey {
            table: table.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unsupported { feature, dialect } => {
                write!(f, "{feature} is not supported by the {dialect} dialect")
            }
            Error::MissingPrimaryKey { table } => {
                write!(f, "table '{table}' declares no primary key")
            }
            Error::Query(e) => match &e.sql {
                Some(sql) => write!(f, "query failed: {} (sql: {sql})", e.message),
                None => write!(f, "query failed: {}", e.message),
            },
            Error::NotFound { table } => write!(f, "no matching row in '{table}'"),
            Error::PlaceholderMismatch { expected, found } => write!(
                f,
                "placeholder count mismatch: {expected} parameters, {found} tokens"
            ),
            Error::Type(e) => match &e.column {
                Some(col) => write!(
                    f,
                    "type error in column '{}': expected {}, found {}",
                    col, e.expected, e.actual
                ),
                None => write!(f, "type error: expected {}, found {}", e.expected, e.actual),
            },
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for quell operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_carries_sql() {
        let err = Error::Query(QueryError {
            sql: Some("SELECT 1".to_string()),
            message: "boom".to_string(),
            source: None,
        });
        assert_eq!(err.sql(), Some("SELECT 1"));
        assert!(err.to_string().contains("SELECT 1"));
    }

    #[test]
    fn unsupported_display_names_the_dialect() {
        let err = Error::Unsupported {
            feature: "regular expression matching",
            dialect: "sqlite",
        };
        let msg = err.to_string();
        assert!(msg.contains("regular expression matching"));
        assert!(msg.contains("sqlite"));
    }

    #[test]
    fn placeholder_mismatch_display() {
        let err = Error::PlaceholderMismatch {
            expected: 3,
            found: 2,
        };
        assert!(err.to_string().contains("3 parameters"));
        assert!(err.to_string().contains("2 tokens"));
    }

    #[test]
    fn type_error_mentions_column() {
        let err = Error::Type(TypeError {
            expected: "i64",
            actual: "TEXT".to_string(),
            column: Some("age".to_string()),
        });
        assert!(err.to_string().contains("age"));
    }
}
