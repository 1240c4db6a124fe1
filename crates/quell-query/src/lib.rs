//! Dialect-aware query construction and row materialization for quell.
//!
//! `quell-query` is the query layer: a fluent builder that accumulates
//! clause fragments, renders them into dialect-correct parameterized SQL,
//! executes them through a pluggable connection, and reconstitutes raw
//! rows into entity graphs with relations attached.
//!
//! # Role In The Architecture
//!
//! - **Clause templates**: pure functions rendering WHERE/JOIN/footer
//!   fragments with dialect-neutral placeholder tokens.
//! - **Builder**: the chainable accumulator, including nested boolean
//!   groups, consumed by a terminal operation.
//! - **Finalizer + executor**: one-shot placeholder rendering, dispatch
//!   through the `Connection` trait, driver-shape normalization.
//! - **Hydrator + relation loader**: rows become `Entity` instances;
//!   requested relations load in one batched query per relation.
//!
//! Untrusted values never reach the SQL text; every value travels as a
//! bound parameter.

pub mod builder;
pub mod dialect;
pub mod executor;
pub mod finalize;
pub mod fragment;
pub mod hydrate;
pub mod loader;
pub mod ops;
pub mod template;

pub use builder::{OrderDir, QueryBuilder};
pub use dialect::Dialect;
pub use finalize::finalize;
pub use fragment::{Connective, Fragment, PARAM_TOKEN};
pub use ops::{AGGREGATE_ALIAS, Page, PageMeta};
pub use template::{JoinKind, Op};

use asupersync::{Cx, Outcome};
use quell_core::{Connection, Error, Row, Value};

/// Raw SQL query execution, for statements the builder cannot express.
///
/// The SQL is passed through untouched (it must already be in the
/// dialect's concrete placeholder syntax); the driver's result shape is
/// normalized into rows.
pub async fn raw_query<C: Connection>(
    cx: &Cx,
    conn: &C,
    sql: &str,
    params: &[Value],
) -> Outcome<Vec<Row>, Error> {
    match conn.query(cx, sql, params).await {
        Outcome::Ok(payload) => Outcome::Ok(payload.into_rows()),
        Outcome::Err(e) => Outcome::Err(e),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}

/// Raw SQL statement execution.
pub async fn raw_execute<C: Connection>(
    cx: &Cx,
    conn: &C,
    sql: &str,
    params: &[Value],
) -> Outcome<u64, Error> {
    conn.execute(cx, sql, params).await
}
