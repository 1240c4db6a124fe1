//! Core types and traits for quell.
//!
//! This crate provides the foundational abstractions shared by the query
//! layer:
//!
//! - `Value` and `Row` for dynamically-typed SQL data
//! - `EntityInfo` metadata consumed (read-only) by the query builder,
//!   hydrator, and relation loader
//! - `Entity`, the materialized instance with its overflow bag and
//!   relation slots
//! - `Connection`, the single I/O seam, with `Payload` normalizing driver
//!   result shapes
//! - `Cx`/`Outcome` re-exports from asupersync for cancel-correct
//!   operations

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod connection;
pub mod entity;
pub mod error;
pub mod meta;
pub mod naming;
pub mod row;
pub mod value;

pub use connection::{Connection, Payload};
pub use entity::{Attached, Entity};
pub use error::{Error, QueryError, Result, TypeError};
pub use meta::{
    ColumnDef, DynamicColumn, EntityInfo, Hooks, PivotInfo, RelationInfo, RelationKind, SqlType,
};
pub use naming::NameStyle;
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;
