//! Terminal operations.
//!
//! A terminal call consumes the builder: hooks fire, the placeholder
//! finalizer renders the accumulated SQL, the executor runs it, rows are
//! hydrated, requested relations are attached, and after-hooks run over
//! the finished entities. Mutating operations reuse the accumulated
//! WHERE/JOIN fragments.

use crate::builder::QueryBuilder;
use crate::fragment::PARAM_TOKEN;
use crate::{executor, hydrate, loader};
use asupersync::{Cx, Outcome};
use quell_core::{Connection, Entity, Error, Result, Value};

/// The alias under which aggregate terminal operations read their result
/// from the overflow bag.
pub const AGGREGATE_ALIAS: &str = "aggregate";

/// One page of results plus derived pagination metadata.
#[derive(Debug, Clone)]
pub struct Page {
    pub entities: Vec<Entity>,
    pub meta: PageMeta,
}

/// Derived, read-only pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
    pub has_more_pages: bool,
    pub is_empty: bool,
}

impl PageMeta {
    /// Compute metadata from a total row count, page number and page size.
    #[must_use]
    pub fn new(total: u64, page: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        Self {
            total,
            page,
            per_page,
            last_page,
            has_more_pages: page < last_page,
            is_empty: total == 0,
        }
    }
}

impl QueryBuilder {
    fn run_before_fetch(&self) -> Result<()> {
        if self.skip_hooks {
            return Ok(());
        }
        if let Some(hook) = self.info.hooks.before_fetch {
            hook()?;
        }
        Ok(())
    }

    fn run_before_mutate(&self) -> Result<()> {
        if self.skip_hooks {
            return Ok(());
        }
        if let Some(hook) = self.info.hooks.before_mutate {
            hook()?;
        }
        Ok(())
    }

    /// Execute the accumulated query and return every matching entity,
    /// hydrated, with requested relations and dynamic columns applied.
    pub async fn all<C: Connection>(self, cx: &Cx, conn: &C) -> Outcome<Vec<Entity>, Error> {
        if let Err(e) = self.run_before_fetch() {
            return Outcome::Err(e);
        }

        let (sql, params) = self.build();
        let rows = match executor::fetch(cx, conn, self.dialect, &sql, &params).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let mut entities = match hydrate::hydrate_all(self.info, &rows, &self.dynamic) {
            Ok(entities) => entities,
            Err(e) => return Outcome::Err(e),
        };

        if !self.relations.is_empty() {
            let attach = loader::attach(
                cx,
                conn,
                self.dialect,
                self.info,
                &mut entities,
                &self.relations,
            )
            .await;
            match attach {
                Outcome::Ok(()) => {}
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        if !self.skip_hooks {
            if let Some(hook) = self.info.hooks.after_fetch {
                for entity in &mut entities {
                    if let Err(e) = hook(entity) {
                        return Outcome::Err(e);
                    }
                }
            }
        }

        Outcome::Ok(entities)
    }

    /// Execute with a forced `LIMIT 1` and return the first entity, if
    /// any.
    pub async fn one<C: Connection>(self, cx: &Cx, conn: &C) -> Outcome<Option<Entity>, Error> {
        let query = self.limit(1);
        match query.all(cx, conn).await {
            Outcome::Ok(mut entities) => {
                if entities.is_empty() {
                    Outcome::Ok(None)
                } else {
                    Outcome::Ok(Some(entities.remove(0)))
                }
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Like [`QueryBuilder::one`], but a zero-row result is a not-found
    /// failure, distinguishable from an execution failure.
    pub async fn one_or_fail<C: Connection>(self, cx: &Cx, conn: &C) -> Outcome<Entity, Error> {
        let table = self.info.table;
        match self.one(cx, conn).await {
            Outcome::Ok(Some(entity)) => Outcome::Ok(entity),
            Outcome::Ok(None) => Outcome::Err(Error::not_found(table)),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Count matching rows, honoring the accumulated clauses.
    ///
    /// Piggybacks on [`QueryBuilder::one`] through an aggregate alias read
    /// from the overflow bag.
    pub async fn count<C: Connection>(mut self, cx: &Cx, conn: &C) -> Outcome<u64, Error> {
        self.select = vec![format!("COUNT(*) AS {AGGREGATE_ALIAS}")];
        self.relations.clear();
        self.dynamic.clear();
        self.order_by.clear();
        self.offset = None;
        match self.one(cx, conn).await {
            Outcome::Ok(Some(entity)) => {
                let count = entity
                    .extra(AGGREGATE_ALIAS)
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                Outcome::Ok(count.max(0) as u64)
            }
            Outcome::Ok(None) => Outcome::Ok(0),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Sum a column over matching rows, honoring the accumulated clauses.
    pub async fn sum<C: Connection>(
        mut self,
        cx: &Cx,
        conn: &C,
        column: &str,
    ) -> Outcome<f64, Error> {
        let column = self.info.column_of(column);
        self.select = vec![format!("SUM({column}) AS {AGGREGATE_ALIAS}")];
        self.relations.clear();
        self.dynamic.clear();
        self.order_by.clear();
        self.offset = None;
        match self.one(cx, conn).await {
            Outcome::Ok(Some(entity)) => {
                let sum = entity
                    .extra(AGGREGATE_ALIAS)
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                Outcome::Ok(sum)
            }
            Outcome::Ok(None) => Outcome::Ok(0.0),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Count every row of the bare table, ignoring accumulated clauses
    /// and skipping hooks.
    pub async fn quick_count<C: Connection>(self, cx: &Cx, conn: &C) -> Outcome<u64, Error> {
        let sql = format!("SELECT COUNT(*) AS {AGGREGATE_ALIAS} FROM {}", self.info.table);
        read_aggregate(cx, conn, self.dialect, &sql)
            .await
            .map(|v| v.and_then(|v| v.as_i64()).unwrap_or(0).max(0) as u64)
    }

    /// Sum a column over the bare table, ignoring accumulated clauses and
    /// skipping hooks.
    pub async fn quick_sum<C: Connection>(
        self,
        cx: &Cx,
        conn: &C,
        column: &str,
    ) -> Outcome<f64, Error> {
        let column = self.info.column_of(column);
        let sql = format!(
            "SELECT SUM({column}) AS {AGGREGATE_ALIAS} FROM {}",
            self.info.table
        );
        read_aggregate(cx, conn, self.dialect, &sql)
            .await
            .map(|v| v.and_then(|v| v.as_f64()).unwrap_or(0.0))
    }

    /// Execute a count pass and a data pass, returning one page plus
    /// derived metadata. `offset = (page - 1) * size`.
    pub async fn paginate<C: Connection>(
        self,
        cx: &Cx,
        conn: &C,
        page: u64,
        size: u64,
    ) -> Outcome<Page, Error> {
        let page = page.max(1);
        let size = size.max(1);

        let total = match self.copy().count(cx, conn).await {
            Outcome::Ok(total) => total,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let entities = match self.limit(size).offset((page - 1) * size).all(cx, conn).await {
            Outcome::Ok(entities) => entities,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        Outcome::Ok(Page {
            entities,
            meta: PageMeta::new(total, page, size),
        })
    }

    /// Assemble and execute an UPDATE reusing the accumulated WHERE/JOIN
    /// fragments. `sets` pairs host-convention column names with values.
    pub async fn update<C: Connection>(
        self,
        cx: &Cx,
        conn: &C,
        sets: &[(&str, Value)],
    ) -> Outcome<u64, Error> {
        if let Err(e) = self.run_before_mutate() {
            return Outcome::Err(e);
        }
        if sets.is_empty() {
            return Outcome::Err(Error::Custom("update with no assignments".to_string()));
        }

        let mut sql = format!("UPDATE {}", self.info.table);
        let mut params = Vec::new();

        let (join_sql, join_params) = self.join_clause();
        sql.push_str(&join_sql);
        params.extend(join_params);

        sql.push_str(" SET ");
        let assignments: Vec<String> = sets
            .iter()
            .map(|(column, _)| format!("{} = {PARAM_TOKEN}", self.info.column_of(column)))
            .collect();
        sql.push_str(&assignments.join(", "));
        params.extend(sets.iter().map(|(_, value)| value.clone()));

        let (where_sql, where_params) = self.where_clause();
        sql.push_str(&where_sql);
        params.extend(where_params);

        executor::execute(cx, conn, self.dialect, &sql, &params).await
    }

    /// Assemble and execute a DELETE reusing the accumulated WHERE/JOIN
    /// fragments.
    pub async fn delete<C: Connection>(self, cx: &Cx, conn: &C) -> Outcome<u64, Error> {
        if let Err(e) = self.run_before_mutate() {
            return Outcome::Err(e);
        }

        let mut sql = format!("DELETE FROM {}", self.info.table);
        let mut params = Vec::new();

        let (join_sql, join_params) = self.join_clause();
        sql.push_str(&join_sql);
        params.extend(join_params);

        let (where_sql, where_params) = self.where_clause();
        sql.push_str(&where_sql);
        params.extend(where_params);

        executor::execute(cx, conn, self.dialect, &sql, &params).await
    }

    /// Soft delete: sugar for an UPDATE setting the caller's timestamp
    /// column to the caller's value. The column name and the "now" value
    /// come from the caller's environment, not from this core.
    pub async fn soft_delete<C: Connection>(
        self,
        cx: &Cx,
        conn: &C,
        column: &str,
        value: Value,
    ) -> Outcome<u64, Error> {
        self.update(cx, conn, &[(column, value)]).await
    }
}

/// Run a bare-table aggregate query, bypassing hooks and accumulated
/// state, and return the aliased value from the first row.
async fn read_aggregate<C: Connection>(
    cx: &Cx,
    conn: &C,
    dialect: crate::dialect::Dialect,
    sql: &str,
) -> Outcome<Option<Value>, Error> {
    match executor::fetch(cx, conn, dialect, sql, &[]).await {
        Outcome::Ok(rows) => Outcome::Ok(
            rows.first()
                .and_then(|row| row.get_by_name(AGGREGATE_ALIAS).cloned()),
        ),
        Outcome::Err(e) => Outcome::Err(e),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}
