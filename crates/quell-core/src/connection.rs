//! Database connection abstraction.
//!
//! The query core performs I/O through exactly one seam: a [`Connection`]
//! handle supplied by the caller. Drivers differ in what their native call
//! convention hands back - some return the row set directly, some wrap it
//! in a result object with execution metadata, and some only report an
//! affected-row count. [`Payload`] captures those shapes so the executor
//! can normalize all of them into one ordered row sequence.
//!
//! All operations are async and take a `Cx` context; cancellation and
//! timeouts are inherited from the context and the driver, never imposed
//! here.

use crate::error::Error;
use crate::row::Row;
use crate::value::Value;
use asupersync::{Cx, Outcome};
use std::future::Future;

/// A driver result in its native shape.
#[derive(Debug, Clone)]
pub enum Payload {
    /// The driver returned the row set directly.
    Rows(Vec<Row>),
    /// The driver wrapped the rows in a result object.
    Wrapped {
        rows: Vec<Row>,
        rows_affected: u64,
    },
    /// The driver only reported an affected-row count.
    Affected(u64),
}

impl Payload {
    /// Normalize into an ordered row sequence.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Payload::Rows(rows) | Payload::Wrapped { rows, .. } => rows,
            Payload::Affected(_) => Vec::new(),
        }
    }

    /// The affected-row count, when the driver reported one.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        match self {
            Payload::Rows(_) => 0,
            Payload::Wrapped { rows_affected, .. } | Payload::Affected(rows_affected) => {
                *rows_affected
            }
        }
    }
}

/// A database connection capable of executing parameterized SQL.
///
/// Implementations must be `Send + Sync` for use across async boundaries.
/// The SQL handed to a connection is already rendered in the dialect's
/// concrete placeholder syntax; parameters are bound by the driver, never
/// interpolated into the text.
pub trait Connection: Send + Sync {
    /// Execute a query and return the driver's native result shape.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Payload, Error>> + Send;

    /// Execute a statement (UPDATE, DELETE) and return rows affected.
    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, Error>> + Send;
}
