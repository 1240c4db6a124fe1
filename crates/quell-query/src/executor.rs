//! Query execution.
//!
//! The executor is the only suspension point in the crate. It finalizes
//! placeholder tokens, dispatches through the supplied [`Connection`], and
//! normalizes the driver's native result shape into an ordered row
//! sequence. On failure, the fully-rendered SQL is logged and attached to
//! the error before it propagates; nothing is retried.

use crate::dialect::Dialect;
use crate::finalize::finalize;
use asupersync::{Cx, Outcome};
use quell_core::{Connection, Error, QueryError, Row, Value};

/// Execute a row-returning query and normalize the result.
pub async fn fetch<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    sql: &str,
    params: &[Value],
) -> Outcome<Vec<Row>, Error> {
    let rendered = match finalize(sql, dialect, 0, params.len()) {
        Ok(sql) => sql,
        Err(e) => return Outcome::Err(e),
    };

    tracing::debug!(sql = %rendered, params = params.len(), "executing query");

    match conn.query(cx, &rendered, params).await {
        Outcome::Ok(payload) => Outcome::Ok(payload.into_rows()),
        Outcome::Err(e) => Outcome::Err(wrap(rendered, e)),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}

/// Execute a mutating statement and return rows affected.
pub async fn execute<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    sql: &str,
    params: &[Value],
) -> Outcome<u64, Error> {
    let rendered = match finalize(sql, dialect, 0, params.len()) {
        Ok(sql) => sql,
        Err(e) => return Outcome::Err(e),
    };

    tracing::debug!(sql = %rendered, params = params.len(), "executing statement");

    match conn.execute(cx, &rendered, params).await {
        Outcome::Ok(affected) => Outcome::Ok(affected),
        Outcome::Err(e) => Outcome::Err(wrap(rendered, e)),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}

fn wrap(sql: String, source: Error) -> Error {
    tracing::error!(sql = %sql, error = %source, "query failed");
    Error::Query(QueryError {
        message: source.to_string(),
        sql: Some(sql),
        source: Some(Box::new(source)),
    })
}
