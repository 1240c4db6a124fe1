//! quell - the query-construction and result-materialization core of a
//! multi-dialect relational database client.
//!
//! quell renders fluent builder chains into dialect-correct parameterized
//! SQL (Postgres, MySQL, SQLite), executes them through a pluggable
//! connection handle, and reconstitutes raw rows into typed entity graphs
//! with relations attached.
//!
//! # Quick Start
//!
//! ```ignore
//! use quell::prelude::*;
//!
//! static TEAM: EntityInfo = EntityInfo::new("teams")
//!     .primary_key("id")
//!     .columns(&[
//!         ColumnDef::new("id", SqlType::BigInt),
//!         ColumnDef::new("name", SqlType::Text),
//!     ]);
//!
//! async fn example(cx: &Cx, conn: &impl Connection) -> Result<()> {
//!     let teams = QueryBuilder::new(&TEAM, Dialect::Postgres)
//!         .filter("name", Op::Like, "A%")
//!         .order_by("name", OrderDir::Asc)
//!         .all(cx, conn)
//!         .await;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **One builder, three dialects**: the dialect is a strategy value
//!   resolved at construction, not a class hierarchy.
//! - **Strict parameter order**: fragments carry their own parameter
//!   slices; token order equals parameter order by construction.
//! - **Nested boolean groups**: parenthesized sub-clauses through child
//!   builders, with tagged connectives instead of string surgery.
//! - **Batched relation loading**: one follow-up query per relation, keyed
//!   by the distinct parent key set.
//! - **Structured concurrency**: built on asupersync; the executor is the
//!   only suspension point.

// Re-export the public surface from the sub-crates
pub use quell_core::{
    Attached, ColumnDef, ColumnInfo, Connection, Cx, DynamicColumn, Entity, EntityInfo, Error,
    FromValue, Hooks, NameStyle, Outcome, Payload, PivotInfo, QueryError, RelationInfo,
    RelationKind, Result, Row, SqlType, TypeError, Value,
};
pub use quell_query::{
    AGGREGATE_ALIAS, Connective, Dialect, Fragment, JoinKind, Op, OrderDir, PARAM_TOKEN, Page,
    PageMeta, QueryBuilder, finalize, raw_execute, raw_query,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use quell_core::{
        ColumnDef, Connection, Cx, DynamicColumn, Entity, EntityInfo, Error, Hooks, NameStyle,
        Outcome, Payload, PivotInfo, RelationInfo, RelationKind, Result, Row, SqlType, Value,
    };
    pub use quell_query::{Dialect, JoinKind, Op, OrderDir, Page, PageMeta, QueryBuilder};
}
