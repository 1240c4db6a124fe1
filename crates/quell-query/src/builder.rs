//! The fluent query builder.
//!
//! A [`QueryBuilder`] is a single-owner, write-once accumulator: fluent
//! calls append clause fragments (each fragment bringing its own parameter
//! slice along in the same call), and a terminal operation consumes the
//! builder. Reuse after a terminal call is not a thing; callers that need
//! to branch take a [`QueryBuilder::copy`] first.
//!
//! Dialect-gated predicates (`filter_regex`) and key-dependent joins
//! return `Result<Self>` so unsupported-feature and missing-primary-key
//! errors surface synchronously, before any I/O.

use crate::dialect::Dialect;
use crate::fragment::{self, Connective, Fragment};
use crate::template::{self, JoinKind, Op};
use quell_core::{EntityInfo, Result, Value};

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDir {
    #[default]
    Asc,
    Desc,
}

impl OrderDir {
    const fn as_str(self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

/// A fluent, dialect-aware SELECT/mutation builder over one entity.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) info: &'static EntityInfo,
    pub(crate) dialect: Dialect,
    pub(crate) select: Vec<String>,
    pub(crate) joins: Vec<Fragment>,
    pub(crate) wheres: Vec<Fragment>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<String>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) relations: Vec<String>,
    pub(crate) dynamic: Vec<String>,
    pub(crate) skip_hooks: bool,
}

impl QueryBuilder {
    /// Create a builder for the given entity and dialect.
    ///
    /// The dialect is resolved here, once; everything downstream treats it
    /// as data.
    pub fn new(info: &'static EntityInfo, dialect: Dialect) -> Self {
        Self {
            info,
            dialect,
            select: Vec::new(),
            joins: Vec::new(),
            wheres: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            relations: Vec::new(),
            dynamic: Vec::new(),
            skip_hooks: false,
        }
    }

    /// The dialect this builder renders for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The entity this builder queries.
    pub fn info(&self) -> &'static EntityInfo {
        self.info
    }

    // ==================== SELECT ====================

    /// Select specific columns (host-convention names).
    pub fn select(mut self, columns: &[&str]) -> Self {
        let info = self.info;
        self.select
            .extend(columns.iter().map(|c| info.column_of(c)));
        self
    }

    /// Select a raw expression (aliases, aggregates).
    pub fn select_raw(mut self, expr: impl Into<String>) -> Self {
        self.select.push(expr.into());
        self
    }

    // ==================== WHERE ====================

    /// Add a comparison predicate, joined with AND.
    pub fn filter(mut self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        let fragment = template::comparison(
            self.info,
            self.dialect,
            Connective::And,
            column,
            op,
            value.into(),
        );
        self.wheres.push(fragment);
        self
    }

    /// Alias of [`QueryBuilder::filter`].
    #[inline]
    pub fn and_filter(self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.filter(column, op, value)
    }

    /// Add a comparison predicate, joined with OR.
    pub fn or_filter(mut self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        let fragment = template::comparison(
            self.info,
            self.dialect,
            Connective::Or,
            column,
            op,
            value.into(),
        );
        self.wheres.push(fragment);
        self
    }

    /// Add a BETWEEN predicate, joined with AND.
    pub fn filter_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        let fragment = template::between(
            self.info,
            Connective::And,
            column,
            low.into(),
            high.into(),
            false,
        );
        self.wheres.push(fragment);
        self
    }

    /// Add a NOT BETWEEN predicate, joined with AND.
    pub fn filter_not_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        let fragment = template::between(
            self.info,
            Connective::And,
            column,
            low.into(),
            high.into(),
            true,
        );
        self.wheres.push(fragment);
        self
    }

    /// Alias of [`QueryBuilder::filter_between`].
    #[inline]
    pub fn and_filter_between(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.filter_between(column, low, high)
    }

    /// Add a BETWEEN predicate, joined with OR.
    pub fn or_filter_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        let fragment = template::between(
            self.info,
            Connective::Or,
            column,
            low.into(),
            high.into(),
            false,
        );
        self.wheres.push(fragment);
        self
    }

    /// Add an IN predicate, joined with AND.
    pub fn filter_in(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        let fragment = template::in_list(self.info, Connective::And, column, values, false);
        self.wheres.push(fragment);
        self
    }

    /// Add a NOT IN predicate, joined with AND.
    pub fn filter_not_in(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        let fragment = template::in_list(self.info, Connective::And, column, values, true);
        self.wheres.push(fragment);
        self
    }

    /// Alias of [`QueryBuilder::filter_in`].
    #[inline]
    pub fn and_filter_in(
        self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.filter_in(column, values)
    }

    /// Add an IN predicate, joined with OR.
    pub fn or_filter_in(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        let fragment = template::in_list(self.info, Connective::Or, column, values, false);
        self.wheres.push(fragment);
        self
    }

    /// Add an IS NULL predicate, joined with AND.
    pub fn filter_null(mut self, column: &str) -> Self {
        let fragment = template::null_check(self.info, Connective::And, column, false);
        self.wheres.push(fragment);
        self
    }

    /// Add an IS NOT NULL predicate, joined with AND.
    pub fn filter_not_null(mut self, column: &str) -> Self {
        let fragment = template::null_check(self.info, Connective::And, column, true);
        self.wheres.push(fragment);
        self
    }

    /// Alias of [`QueryBuilder::filter_null`].
    #[inline]
    pub fn and_filter_null(self, column: &str) -> Self {
        self.filter_null(column)
    }

    /// Add an IS NULL predicate, joined with OR.
    pub fn or_filter_null(mut self, column: &str) -> Self {
        let fragment = template::null_check(self.info, Connective::Or, column, false);
        self.wheres.push(fragment);
        self
    }

    /// Add an IS NOT NULL predicate, joined with OR.
    pub fn or_filter_not_null(mut self, column: &str) -> Self {
        let fragment = template::null_check(self.info, Connective::Or, column, true);
        self.wheres.push(fragment);
        self
    }

    /// Add a regex-match predicate, joined with AND.
    ///
    /// Fails fast on dialects without a native regex operator.
    pub fn filter_regex(mut self, column: &str, pattern: &str) -> Result<Self> {
        let fragment =
            template::regex(self.info, self.dialect, Connective::And, column, pattern)?;
        self.wheres.push(fragment);
        Ok(self)
    }

    /// Alias of [`QueryBuilder::filter_regex`].
    #[inline]
    pub fn and_filter_regex(self, column: &str, pattern: &str) -> Result<Self> {
        self.filter_regex(column, pattern)
    }

    /// Add a regex-match predicate, joined with OR.
    pub fn or_filter_regex(mut self, column: &str, pattern: &str) -> Result<Self> {
        let fragment =
            template::regex(self.info, self.dialect, Connective::Or, column, pattern)?;
        self.wheres.push(fragment);
        Ok(self)
    }

    /// Add a raw predicate (SQL authored with [`crate::PARAM_TOKEN`]
    /// placeholders), joined with AND.
    pub fn filter_raw(mut self, sql: &str, params: Vec<Value>) -> Self {
        self.wheres.push(template::raw(Connective::And, sql, params));
        self
    }

    /// Alias of [`QueryBuilder::filter_raw`].
    #[inline]
    pub fn and_filter_raw(self, sql: &str, params: Vec<Value>) -> Self {
        self.filter_raw(sql, params)
    }

    /// Add a raw predicate, joined with OR.
    pub fn or_filter_raw(mut self, sql: &str, params: Vec<Value>) -> Self {
        self.wheres.push(template::raw(Connective::Or, sql, params));
        self
    }

    // ==================== Nested groups ====================

    /// Add a parenthesized predicate group, joined with AND.
    ///
    /// The closure receives a child builder; its accumulated predicates
    /// are rendered with the first one bare (no leading connective inside
    /// the parentheses) and spliced into this builder along with their
    /// parameters, in order.
    pub fn filter_group(self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.push_group(Connective::And, f)
    }

    /// Alias of [`QueryBuilder::filter_group`].
    #[inline]
    pub fn and_filter_group(self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.filter_group(f)
    }

    /// Add a parenthesized predicate group, joined with OR.
    pub fn or_filter_group(self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.push_group(Connective::Or, f)
    }

    fn push_group(
        mut self,
        connective: Connective,
        f: impl FnOnce(QueryBuilder) -> QueryBuilder,
    ) -> Self {
        let child = f(QueryBuilder::new(self.info, self.dialect));
        if child.wheres.is_empty() {
            return self;
        }
        let (body, params) = fragment::render_predicates(&child.wheres);
        self.wheres
            .push(Fragment::new(connective, format!("({body})"), params));
        self
    }

    // ==================== JOIN ====================

    /// Add an INNER JOIN. The local column defaults to the declared
    /// primary key.
    pub fn join(self, table: &str, foreign: &str, local: Option<&str>) -> Result<Self> {
        self.push_join(JoinKind::Inner, table, foreign, local)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: &str, foreign: &str, local: Option<&str>) -> Result<Self> {
        self.push_join(JoinKind::Left, table, foreign, local)
    }

    /// Add a RIGHT JOIN.
    pub fn right_join(self, table: &str, foreign: &str, local: Option<&str>) -> Result<Self> {
        self.push_join(JoinKind::Right, table, foreign, local)
    }

    /// Add a FULL JOIN.
    pub fn full_join(self, table: &str, foreign: &str, local: Option<&str>) -> Result<Self> {
        self.push_join(JoinKind::Full, table, foreign, local)
    }

    /// Add a CROSS JOIN (no ON condition).
    pub fn cross_join(mut self, table: &str) -> Self {
        // Cross joins cannot fail: no key resolution happens.
        match template::join(self.info, JoinKind::Cross, table, "", None) {
            Ok(fragment) => self.joins.push(fragment),
            Err(_) => unreachable!("cross join resolves no keys"),
        }
        self
    }

    /// Add a NATURAL JOIN (no ON condition).
    pub fn natural_join(mut self, table: &str) -> Self {
        match template::join(self.info, JoinKind::Natural, table, "", None) {
            Ok(fragment) => self.joins.push(fragment),
            Err(_) => unreachable!("natural join resolves no keys"),
        }
        self
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: &str,
        foreign: &str,
        local: Option<&str>,
    ) -> Result<Self> {
        let fragment = template::join(self.info, kind, table, foreign, local)?;
        self.joins.push(fragment);
        Ok(self)
    }

    // ==================== Footer ====================

    /// Add a GROUP BY column. Repeatable; columns accumulate.
    pub fn group_by(mut self, column: &str) -> Self {
        let column = self.info.column_of(column);
        self.group_by.push(column);
        self
    }

    /// Add a raw GROUP BY expression.
    pub fn group_by_raw(mut self, expr: impl Into<String>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Add an ORDER BY column. Repeatable; columns accumulate.
    pub fn order_by(mut self, column: &str, dir: OrderDir) -> Self {
        let column = self.info.column_of(column);
        self.order_by.push(format!("{column} {}", dir.as_str()));
        self
    }

    /// Add a raw ORDER BY expression.
    pub fn order_by_raw(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Requests & guards ====================

    /// Request relations to load after hydration.
    pub fn with_relations(mut self, names: &[&str]) -> Self {
        self.relations.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Request dynamic (computed) columns to resolve after hydration.
    pub fn with_dynamic(mut self, names: &[&str]) -> Self {
        self.dynamic.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Run `f` against the builder only when `value` is present. A `None`
    /// leaves the finalized SQL shape untouched.
    pub fn when<T>(self, value: Option<T>, f: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }

    /// Suppress hooks for this builder's terminal operation.
    pub fn without_hooks(mut self) -> Self {
        self.skip_hooks = true;
        self
    }

    /// Produce an independent clone: the original and the copy share no
    /// mutable state and evolve separately afterwards.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    // ==================== Rendering ====================

    /// Render the accumulated SELECT statement with neutral placeholder
    /// tokens plus its ordered parameter list.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT ");
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(self.info.table);

        let mut params = Vec::new();
        for join in &self.joins {
            sql.push_str(&join.sql);
            params.extend(join.params.iter().cloned());
        }

        let (where_sql, where_params) = self.where_clause();
        sql.push_str(&where_sql);
        params.extend(where_params);

        sql.push_str(&template::footer(
            &self.group_by,
            &self.order_by,
            self.limit,
            self.offset,
        ));
        (sql, params)
    }

    /// Render the accumulated WHERE clause (with leading ` WHERE `), or
    /// nothing when no predicates were added.
    pub(crate) fn where_clause(&self) -> (String, Vec<Value>) {
        if self.wheres.is_empty() {
            return (String::new(), Vec::new());
        }
        let (body, params) = fragment::render_predicates(&self.wheres);
        (format!(" WHERE {body}"), params)
    }

    /// Render the join fragments.
    pub(crate) fn join_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        for join in &self.joins {
            sql.push_str(&join.sql);
            params.extend(join.params.iter().cloned());
        }
        (sql, params)
    }
}
