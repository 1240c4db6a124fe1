//! Batched relation loading.
//!
//! Given a set of hydrated parents and a list of requested relation names,
//! the loader issues one follow-up query per relation, keyed by the
//! distinct set of parent keys, and attaches the matching children. It
//! never issues one query per parent row; batching by distinct key set is
//! the defining invariant of this component.

use crate::builder::QueryBuilder;
use crate::dialect::Dialect;
use crate::{executor, hydrate, template};
use asupersync::{Cx, Outcome};
use quell_core::{
    Connection, Entity, EntityInfo, Error, RelationInfo, RelationKind, Value,
};

/// The reserved alias under which a many-to-many child carries its parent
/// key. It lands in the child's overflow bag.
pub const PIVOT_KEY: &str = "_pivot_key";

/// Load the requested relations and attach children to `parents`.
pub async fn attach<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    info: &'static EntityInfo,
    parents: &mut [Entity],
    names: &[String],
) -> Outcome<(), Error> {
    for name in names {
        let Some(relation) = info.relation(name) else {
            return Outcome::Err(Error::Custom(format!(
                "unknown relation '{name}' on '{}'",
                info.table
            )));
        };
        tracing::debug!(
            relation = name.as_str(),
            parents = parents.len(),
            "loading relation"
        );
        let outcome = match relation.kind {
            RelationKind::BelongsTo => belongs_to(cx, conn, dialect, info, parents, relation).await,
            RelationKind::HasOne | RelationKind::HasMany => {
                has_related(cx, conn, dialect, info, parents, relation).await
            }
            RelationKind::ManyToMany => {
                many_to_many(cx, conn, dialect, info, parents, relation).await
            }
        };
        match outcome {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
    }
    Outcome::Ok(())
}

/// Attach a single parent per child foreign key: one query keyed by the
/// distinct set of the parents' local foreign-key values.
async fn belongs_to<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    info: &EntityInfo,
    parents: &mut [Entity],
    relation: &RelationInfo,
) -> Outcome<(), Error> {
    let related = (relation.related)();
    let Some(local) = relation.local_key else {
        return Outcome::Err(Error::Custom(format!(
            "relation '{}' on '{}' declares no local key",
            relation.name, info.table
        )));
    };
    let foreign = match relation.foreign_key.or(related.primary_key) {
        Some(key) => key,
        None => return Outcome::Err(Error::missing_primary_key(related.table)),
    };

    let local_field = info.field_of(local);
    let keys = distinct_keys(parents, &local_field);
    if keys.is_empty() {
        for parent in parents.iter_mut() {
            parent.attach_one(relation.name, None);
        }
        return Outcome::Ok(());
    }

    let children = match fetch_children(cx, conn, dialect, related, foreign, keys).await {
        Outcome::Ok(children) => children,
        Outcome::Err(e) => return Outcome::Err(e),
        Outcome::Cancelled(r) => return Outcome::Cancelled(r),
        Outcome::Panicked(p) => return Outcome::Panicked(p),
    };

    let foreign_field = related.field_of(foreign);
    for parent in parents.iter_mut() {
        let child = parent.get(&local_field).and_then(|key| {
            children
                .iter()
                .find(|c| c.get(&foreign_field).is_some_and(|v| key_eq(v, key)))
                .cloned()
        });
        parent.attach_one(relation.name, child);
    }
    Outcome::Ok(())
}

/// Attach one (`HasOne`) or many (`HasMany`) children per parent: one
/// query keyed by the distinct set of the parents' primary-key values.
async fn has_related<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    info: &EntityInfo,
    parents: &mut [Entity],
    relation: &RelationInfo,
) -> Outcome<(), Error> {
    let related = (relation.related)();
    let local = match relation.local_key.or(info.primary_key) {
        Some(key) => key,
        None => return Outcome::Err(Error::missing_primary_key(info.table)),
    };
    let Some(foreign) = relation.foreign_key else {
        return Outcome::Err(Error::Custom(format!(
            "relation '{}' on '{}' declares no foreign key",
            relation.name, info.table
        )));
    };

    let local_field = info.field_of(local);
    let keys = distinct_keys(parents, &local_field);
    if keys.is_empty() {
        for parent in parents.iter_mut() {
            match relation.kind {
                RelationKind::HasOne => parent.attach_one(relation.name, None),
                _ => parent.attach_many(relation.name, Vec::new()),
            }
        }
        return Outcome::Ok(());
    }

    let children = match fetch_children(cx, conn, dialect, related, foreign, keys).await {
        Outcome::Ok(children) => children,
        Outcome::Err(e) => return Outcome::Err(e),
        Outcome::Cancelled(r) => return Outcome::Cancelled(r),
        Outcome::Panicked(p) => return Outcome::Panicked(p),
    };

    let foreign_field = related.field_of(foreign);
    for parent in parents.iter_mut() {
        let Some(key) = parent.get(&local_field).cloned() else {
            match relation.kind {
                RelationKind::HasOne => parent.attach_one(relation.name, None),
                _ => parent.attach_many(relation.name, Vec::new()),
            }
            continue;
        };
        let matches: Vec<Entity> = children
            .iter()
            .filter(|c| c.get(&foreign_field).is_some_and(|v| key_eq(v, &key)))
            .cloned()
            .collect();
        match relation.kind {
            RelationKind::HasOne => {
                parent.attach_one(relation.name, matches.into_iter().next());
            }
            _ => parent.attach_many(relation.name, matches),
        }
    }
    Outcome::Ok(())
}

/// Attach many children per parent through the pivot table: one join
/// query projecting the pivot's local column under [`PIVOT_KEY`].
async fn many_to_many<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    info: &EntityInfo,
    parents: &mut [Entity],
    relation: &RelationInfo,
) -> Outcome<(), Error> {
    let related = (relation.related)();
    let Some(pivot) = relation.pivot else {
        return Outcome::Err(Error::Custom(format!(
            "relation '{}' on '{}' declares no pivot table",
            relation.name, info.table
        )));
    };
    let local = match relation.local_key.or(info.primary_key) {
        Some(key) => key,
        None => return Outcome::Err(Error::missing_primary_key(info.table)),
    };
    let child_pk = match related.primary_key {
        Some(key) => key,
        None => return Outcome::Err(Error::missing_primary_key(related.table)),
    };

    let local_field = info.field_of(local);
    let keys = distinct_keys(parents, &local_field);
    if keys.is_empty() {
        for parent in parents.iter_mut() {
            parent.attach_many(relation.name, Vec::new());
        }
        return Outcome::Ok(());
    }

    let sql = format!(
        "SELECT {related_table}.*, {pivot_table}.{local_col} AS {PIVOT_KEY} \
         FROM {related_table} \
         INNER JOIN {pivot_table} ON {pivot_table}.{remote_col} = {related_table}.{child_pk} \
         WHERE {pivot_table}.{local_col} IN ({binds})",
        related_table = related.table,
        pivot_table = pivot.table,
        local_col = pivot.local_column,
        remote_col = pivot.remote_column,
        binds = template::bind_list(keys.len()),
    );

    let rows = match executor::fetch(cx, conn, dialect, &sql, &keys).await {
        Outcome::Ok(rows) => rows,
        Outcome::Err(e) => return Outcome::Err(e),
        Outcome::Cancelled(r) => return Outcome::Cancelled(r),
        Outcome::Panicked(p) => return Outcome::Panicked(p),
    };
    let children = match hydrate::hydrate_all(related, &rows, &[]) {
        Ok(children) => children,
        Err(e) => return Outcome::Err(e),
    };

    for parent in parents.iter_mut() {
        let Some(key) = parent.get(&local_field).cloned() else {
            parent.attach_many(relation.name, Vec::new());
            continue;
        };
        let matches: Vec<Entity> = children
            .iter()
            .filter(|c| c.extra(PIVOT_KEY).is_some_and(|v| key_eq(v, &key)))
            .cloned()
            .collect();
        parent.attach_many(relation.name, matches);
    }
    Outcome::Ok(())
}

/// One batched `WHERE column IN (..)` query against the related table,
/// hydrated into entities.
async fn fetch_children<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: Dialect,
    related: &'static EntityInfo,
    column: &str,
    keys: Vec<Value>,
) -> Outcome<Vec<Entity>, Error> {
    let query = QueryBuilder::new(related, dialect).filter_in(column, keys);
    let (sql, params) = query.build();
    match executor::fetch(cx, conn, dialect, &sql, &params).await {
        Outcome::Ok(rows) => match hydrate::hydrate_all(related, &rows, &[]) {
            Ok(children) => Outcome::Ok(children),
            Err(e) => Outcome::Err(e),
        },
        Outcome::Err(e) => Outcome::Err(e),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}

/// The distinct non-null values of `field` across the parents, in first
/// appearance order.
fn distinct_keys(parents: &[Entity], field: &str) -> Vec<Value> {
    let mut keys = Vec::new();
    for parent in parents {
        if let Some(value) = parent.get(field) {
            if !value.is_null() && !keys.contains(value) {
                keys.push(value.clone());
            }
        }
    }
    keys
}

/// Key equality across driver integer widths.
fn key_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    a == b
}
