//! Entity metadata.
//!
//! Metadata is declared by the host application (or generated by an outer
//! layer) as `static` values and consumed read-only by the query core. The
//! shape mirrors what a declarative registration layer produces: table name,
//! optional primary key, declared columns, two naming conventions, declared
//! relations, computed columns, and lifecycle hooks.

use crate::Result;
use crate::entity::Entity;
use crate::naming::NameStyle;
use crate::value::Value;

/// The semantic type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bool,
    Int,
    BigInt,
    Double,
    Text,
    Bytes,
    Timestamp,
    Uuid,
    Json,
}

/// A declared column: host field name plus semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Host-convention field name.
    pub name: &'static str,
    /// Semantic type, used to coerce driver values during hydration.
    pub sql_type: SqlType,
}

impl ColumnDef {
    /// Create a new column definition.
    #[must_use]
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type }
    }
}

/// The kind of relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// This entity holds a foreign key to a single parent.
    BelongsTo,
    /// One related row holds a foreign key back to this entity.
    HasOne,
    /// Many related rows hold foreign keys back to this entity.
    HasMany,
    /// Related rows are linked through a pivot table.
    ManyToMany,
}

/// The pivot table backing a many-to-many relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotInfo {
    /// The pivot table name.
    pub table: &'static str,
    /// Column in the pivot pointing at this entity.
    pub local_column: &'static str,
    /// Column in the pivot pointing at the related entity.
    pub remote_column: &'static str,
}

impl PivotInfo {
    /// Create a new pivot definition.
    #[must_use]
    pub const fn new(
        table: &'static str,
        local_column: &'static str,
        remote_column: &'static str,
    ) -> Self {
        Self {
            table,
            local_column,
            remote_column,
        }
    }
}

/// Metadata about a relation between entities.
///
/// The related entity is reached through a function pointer so that
/// metadata stays `static` and mutually-referencing entities can still be
/// declared without runtime registration.
#[derive(Debug, Clone, Copy)]
pub struct RelationInfo {
    /// Name of the relation.
    pub name: &'static str,
    /// Kind of relation.
    pub kind: RelationKind,
    /// The related entity's metadata.
    pub related: fn() -> &'static EntityInfo,
    /// Foreign-key column on this entity (`BelongsTo`), or this entity's
    /// key column override for the other kinds. Database convention.
    pub local_key: Option<&'static str>,
    /// Key column on the related table. Database convention.
    pub foreign_key: Option<&'static str>,
    /// Pivot table for `ManyToMany` relations.
    pub pivot: Option<PivotInfo>,
}

impl RelationInfo {
    /// Create a new relation with required fields.
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: RelationKind,
        related: fn() -> &'static EntityInfo,
    ) -> Self {
        Self {
            name,
            kind,
            related,
            local_key: None,
            foreign_key: None,
            pivot: None,
        }
    }

    /// Set the local key column.
    #[must_use]
    pub const fn local_key(mut self, key: &'static str) -> Self {
        self.local_key = Some(key);
        self
    }

    /// Set the foreign key column on the related table.
    #[must_use]
    pub const fn foreign_key(mut self, key: &'static str) -> Self {
        self.foreign_key = Some(key);
        self
    }

    /// Set the pivot table metadata (`ManyToMany`).
    #[must_use]
    pub const fn pivot(mut self, pivot: PivotInfo) -> Self {
        self.pivot = Some(pivot);
        self
    }
}

/// A computed column: resolved against the hydrated instance after all
/// declared and overflow assignment is done.
#[derive(Debug, Clone, Copy)]
pub struct DynamicColumn {
    /// Name under which the result is attached.
    pub name: &'static str,
    /// Resolver invoked with the hydrated instance.
    pub resolve: fn(&Entity) -> Value,
}

impl DynamicColumn {
    /// Create a new dynamic column.
    #[must_use]
    pub const fn new(name: &'static str, resolve: fn(&Entity) -> Value) -> Self {
        Self { name, resolve }
    }
}

/// Lifecycle hooks invoked around terminal operations.
///
/// Hooks are plain callbacks into the metadata layer. They are never
/// retried; an error aborts the enclosing operation and propagates
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hooks {
    /// Runs before a fetching operation issues its query.
    pub before_fetch: Option<fn() -> Result<()>>,
    /// Runs once per hydrated entity, after relation loading.
    pub after_fetch: Option<fn(&mut Entity) -> Result<()>>,
    /// Runs before a mutating operation issues its statement.
    pub before_mutate: Option<fn() -> Result<()>>,
}

impl Hooks {
    /// No hooks.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            before_fetch: None,
            after_fetch: None,
            before_mutate: None,
        }
    }

    /// Set the before-fetch hook.
    #[must_use]
    pub const fn before_fetch(mut self, hook: fn() -> Result<()>) -> Self {
        self.before_fetch = Some(hook);
        self
    }

    /// Set the after-fetch hook.
    #[must_use]
    pub const fn after_fetch(mut self, hook: fn(&mut Entity) -> Result<()>) -> Self {
        self.after_fetch = Some(hook);
        self
    }

    /// Set the before-mutate hook.
    #[must_use]
    pub const fn before_mutate(mut self, hook: fn() -> Result<()>) -> Self {
        self.before_mutate = Some(hook);
        self
    }
}

/// Metadata describing one entity: the unit the query core consumes.
#[derive(Debug, Clone, Copy)]
pub struct EntityInfo {
    /// The database table name.
    pub table: &'static str,
    /// The primary-key column name, if one is declared. Database
    /// convention.
    pub primary_key: Option<&'static str>,
    /// Declared columns.
    pub columns: &'static [ColumnDef],
    /// Naming convention for host field names.
    pub field_style: NameStyle,
    /// Naming convention for database column names.
    pub column_style: NameStyle,
    /// Declared relations.
    pub relations: &'static [RelationInfo],
    /// Declared computed columns.
    pub dynamic: &'static [DynamicColumn],
    /// Lifecycle hooks.
    pub hooks: Hooks,
}

impl EntityInfo {
    /// Create metadata for a table with defaults: no primary key, no
    /// columns, snake_case on both sides, no relations, no hooks.
    #[must_use]
    pub const fn new(table: &'static str) -> Self {
        Self {
            table,
            primary_key: None,
            columns: &[],
            field_style: NameStyle::Snake,
            column_style: NameStyle::Snake,
            relations: &[],
            dynamic: &[],
            hooks: Hooks::none(),
        }
    }

    /// Set the primary-key column name.
    #[must_use]
    pub const fn primary_key(mut self, column: &'static str) -> Self {
        self.primary_key = Some(column);
        self
    }

    /// Set the declared columns.
    #[must_use]
    pub const fn columns(mut self, columns: &'static [ColumnDef]) -> Self {
        self.columns = columns;
        self
    }

    /// Set the field/column naming conventions.
    #[must_use]
    pub const fn conventions(mut self, field: NameStyle, column: NameStyle) -> Self {
        self.field_style = field;
        self.column_style = column;
        self
    }

    /// Set the declared relations.
    #[must_use]
    pub const fn relations(mut self, relations: &'static [RelationInfo]) -> Self {
        self.relations = relations;
        self
    }

    /// Set the declared dynamic columns.
    #[must_use]
    pub const fn dynamic(mut self, dynamic: &'static [DynamicColumn]) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Set the lifecycle hooks.
    #[must_use]
    pub const fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Find a declared column by host field name.
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == field)
    }

    /// Convert a caller-supplied column reference into the database
    /// convention. A `table.column` qualifier is preserved.
    #[must_use]
    pub fn column_of(&self, name: &str) -> String {
        match name.rsplit_once('.') {
            Some((table, column)) => format!("{table}.{}", self.column_style.apply(column)),
            None => self.column_style.apply(name),
        }
    }

    /// Convert a database column name into the host field convention.
    #[must_use]
    pub fn field_of(&self, column: &str) -> String {
        self.field_style.apply(column)
    }

    /// Find a declared relation by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationInfo> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Find a declared dynamic column by name.
    #[must_use]
    pub fn dynamic_column(&self, name: &str) -> Option<&DynamicColumn> {
        self.dynamic.iter().find(|d| d.name == name)
    }
}
