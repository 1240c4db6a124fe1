//! Clause templates.
//!
//! Pure functions that render one clause - a WHERE predicate, a JOIN, the
//! statement footer - into a [`Fragment`] carrying [`PARAM_TOKEN`]
//! placeholders and the ordered parameter slice for that clause. Dialect
//! branching happens here, driven by the [`Dialect`] strategy value;
//! concrete marker syntax does not (that is the finalizer's job).

use crate::dialect::Dialect;
use crate::fragment::{Connective, Fragment, PARAM_TOKEN};
use quell_core::{EntityInfo, Error, Result, Value};

/// A comparison operator accepted by the predicate templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl Op {
    /// Get the SQL representation of this operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
        }
    }
}

/// A JOIN form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
}

impl JoinKind {
    /// Get the SQL keyword for this join form.
    pub const fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Natural => "NATURAL JOIN",
        }
    }
}

/// Render a comparison predicate.
///
/// A JSON operand is never compared with the plain operator: the template
/// swaps in the dialect's structural comparison (unquote-and-extract for
/// MySQL/SQLite, a jsonb cast for Postgres) so structure is tested rather
/// than string identity of a serialized blob.
pub fn comparison(
    info: &EntityInfo,
    dialect: Dialect,
    connective: Connective,
    column: &str,
    op: Op,
    value: Value,
) -> Fragment {
    let column = info.column_of(column);
    let sql = if matches!(value, Value::Json(_)) {
        match dialect {
            Dialect::Postgres => {
                format!("{column}::jsonb {} {PARAM_TOKEN}::jsonb", op.as_str())
            }
            Dialect::Mysql | Dialect::Sqlite => format!(
                "JSON_EXTRACT({column}, '$') {} JSON_EXTRACT({PARAM_TOKEN}, '$')",
                op.as_str()
            ),
        }
    } else {
        format!("{column} {} {PARAM_TOKEN}", op.as_str())
    };
    Fragment::new(connective, sql, vec![value])
}

/// Render a BETWEEN / NOT BETWEEN predicate.
pub fn between(
    info: &EntityInfo,
    connective: Connective,
    column: &str,
    low: Value,
    high: Value,
    negated: bool,
) -> Fragment {
    let keyword = if negated { "NOT BETWEEN" } else { "BETWEEN" };
    let sql = format!(
        "{} {keyword} {PARAM_TOKEN} AND {PARAM_TOKEN}",
        info.column_of(column)
    );
    Fragment::new(connective, sql, vec![low, high])
}

/// Render an IN / NOT IN predicate.
///
/// An empty IN list can never match, and an empty NOT IN list always
/// matches; both fold to a constant predicate instead of invalid SQL.
pub fn in_list(
    info: &EntityInfo,
    connective: Connective,
    column: &str,
    values: Vec<Value>,
    negated: bool,
) -> Fragment {
    if values.is_empty() {
        let sql = if negated { "1 = 1" } else { "1 = 0" };
        return Fragment::new(connective, sql, Vec::new());
    }
    let keyword = if negated { "NOT IN" } else { "IN" };
    let sql = format!(
        "{} {keyword} ({})",
        info.column_of(column),
        bind_list(values.len())
    );
    Fragment::new(connective, sql, values)
}

/// Render an IS NULL / IS NOT NULL predicate.
pub fn null_check(
    info: &EntityInfo,
    connective: Connective,
    column: &str,
    negated: bool,
) -> Fragment {
    let keyword = if negated { "IS NOT NULL" } else { "IS NULL" };
    let sql = format!("{} {keyword}", info.column_of(column));
    Fragment::new(connective, sql, Vec::new())
}

/// Render a regex-match predicate.
///
/// Dialect-gated: SQLite has no native operator and the template fails
/// fast instead of degrading silently.
pub fn regex(
    info: &EntityInfo,
    dialect: Dialect,
    connective: Connective,
    column: &str,
    pattern: &str,
) -> Result<Fragment> {
    let Some(op) = dialect.regex_operator() else {
        return Err(Error::Unsupported {
            feature: "regular expression matching",
            dialect: dialect.name(),
        });
    };
    let sql = format!("{} {op} {PARAM_TOKEN}", info.column_of(column));
    Ok(Fragment::new(
        connective,
        sql,
        vec![Value::Text(pattern.to_string())],
    ))
}

/// Wrap caller-authored SQL (containing [`PARAM_TOKEN`] placeholders) as a
/// predicate fragment.
pub fn raw(connective: Connective, sql: &str, params: Vec<Value>) -> Fragment {
    Fragment::new(connective, sql, params)
}

/// Render a JOIN clause.
///
/// When the local column is omitted it falls back to the entity's declared
/// primary key; an entity with neither raises a missing-primary-key error.
/// CROSS and NATURAL joins take no ON condition.
pub fn join(
    info: &EntityInfo,
    kind: JoinKind,
    table: &str,
    foreign: &str,
    local: Option<&str>,
) -> Result<Fragment> {
    let sql = match kind {
        JoinKind::Cross | JoinKind::Natural => format!(" {} {table}", kind.as_str()),
        _ => {
            let local = match local {
                Some(column) => info.column_of(column),
                None => info
                    .primary_key
                    .map(str::to_string)
                    .ok_or_else(|| Error::missing_primary_key(info.table))?,
            };
            format!(
                " {} {table} ON {}.{local} = {table}.{}",
                kind.as_str(),
                info.table,
                info.column_of(foreign)
            )
        }
    };
    Ok(Fragment::plain(sql, Vec::new()))
}

/// Render the statement footer.
///
/// The four subclauses concatenate in fixed order - group, order, limit,
/// offset - regardless of the order the builder accumulated them in.
pub fn footer(
    group_by: &[String],
    order_by: &[String],
    limit: Option<u64>,
    offset: Option<u64>,
) -> String {
    let mut sql = String::new();
    if !group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&group_by.join(", "));
    }
    if !order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by.join(", "));
    }
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }
    if let Some(n) = offset {
        sql.push_str(&format!(" OFFSET {n}"));
    }
    sql
}

/// A comma-separated run of `n` placeholder tokens.
pub fn bind_list(n: usize) -> String {
    vec![PARAM_TOKEN; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quell_core::{ColumnDef, SqlType};

    static USER: EntityInfo = EntityInfo::new("users").primary_key("id").columns(&[
        ColumnDef::new("id", SqlType::BigInt),
        ColumnDef::new("name", SqlType::Text),
        ColumnDef::new("meta", SqlType::Json),
    ]);

    static NO_PK: EntityInfo = EntityInfo::new("logs");

    #[test]
    fn comparison_emits_neutral_token() {
        let fragment = comparison(
            &USER,
            Dialect::Postgres,
            Connective::And,
            "name",
            Op::Eq,
            Value::from("Ada"),
        );
        assert_eq!(fragment.sql, "name = $?");
        assert_eq!(fragment.params, vec![Value::Text("Ada".to_string())]);
    }

    #[test]
    fn comparison_like() {
        let fragment = comparison(
            &USER,
            Dialect::Mysql,
            Connective::And,
            "name",
            Op::Like,
            Value::from("A%"),
        );
        assert_eq!(fragment.sql, "name LIKE $?");
    }

    #[test]
    fn json_operand_swaps_structural_comparison() {
        let value = Value::Json(serde_json::json!({"a": 1}));

        let pg = comparison(
            &USER,
            Dialect::Postgres,
            Connective::And,
            "meta",
            Op::Eq,
            value.clone(),
        );
        assert_eq!(pg.sql, "meta::jsonb = $?::jsonb");

        let my = comparison(
            &USER,
            Dialect::Mysql,
            Connective::And,
            "meta",
            Op::Eq,
            value.clone(),
        );
        assert_eq!(
            my.sql,
            "JSON_EXTRACT(meta, '$') = JSON_EXTRACT($?, '$')"
        );

        let lite = comparison(&USER, Dialect::Sqlite, Connective::And, "meta", Op::Eq, value);
        assert_eq!(
            lite.sql,
            "JSON_EXTRACT(meta, '$') = JSON_EXTRACT($?, '$')"
        );
    }

    #[test]
    fn between_binds_low_and_high_in_order() {
        let fragment = between(
            &USER,
            Connective::And,
            "id",
            Value::Int(1),
            Value::Int(9),
            false,
        );
        assert_eq!(fragment.sql, "id BETWEEN $? AND $?");
        assert_eq!(fragment.params, vec![Value::Int(1), Value::Int(9)]);

        let negated = between(
            &USER,
            Connective::And,
            "id",
            Value::Int(1),
            Value::Int(9),
            true,
        );
        assert_eq!(negated.sql, "id NOT BETWEEN $? AND $?");
    }

    #[test]
    fn in_list_renders_one_token_per_value() {
        let fragment = in_list(
            &USER,
            Connective::And,
            "id",
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            false,
        );
        assert_eq!(fragment.sql, "id IN ($?, $?, $?)");
        assert_eq!(fragment.params.len(), 3);
    }

    #[test]
    fn empty_in_list_folds_to_constant() {
        let never = in_list(&USER, Connective::And, "id", vec![], false);
        assert_eq!(never.sql, "1 = 0");
        assert!(never.params.is_empty());

        let always = in_list(&USER, Connective::And, "id", vec![], true);
        assert_eq!(always.sql, "1 = 1");
    }

    #[test]
    fn null_checks() {
        assert_eq!(
            null_check(&USER, Connective::And, "name", false).sql,
            "name IS NULL"
        );
        assert_eq!(
            null_check(&USER, Connective::And, "name", true).sql,
            "name IS NOT NULL"
        );
    }

    #[test]
    fn regex_is_dialect_gated() {
        let pg = regex(&USER, Dialect::Postgres, Connective::And, "name", "^A").unwrap();
        assert_eq!(pg.sql, "name ~ $?");

        let my = regex(&USER, Dialect::Mysql, Connective::And, "name", "^A").unwrap();
        assert_eq!(my.sql, "name REGEXP $?");

        let lite = regex(&USER, Dialect::Sqlite, Connective::And, "name", "^A");
        assert!(matches!(
            lite,
            Err(Error::Unsupported {
                dialect: "sqlite",
                ..
            })
        ));
    }

    #[test]
    fn join_defaults_to_declared_primary_key() {
        let fragment = join(&USER, JoinKind::Left, "posts", "user_id", None).unwrap();
        assert_eq!(
            fragment.sql,
            " LEFT JOIN posts ON users.id = posts.user_id"
        );
    }

    #[test]
    fn join_with_explicit_local_column() {
        let fragment = join(&USER, JoinKind::Inner, "posts", "user_id", Some("uid")).unwrap();
        assert_eq!(
            fragment.sql,
            " INNER JOIN posts ON users.uid = posts.user_id"
        );
    }

    #[test]
    fn join_without_primary_key_fails() {
        let result = join(&NO_PK, JoinKind::Inner, "posts", "log_id", None);
        assert!(matches!(result, Err(Error::MissingPrimaryKey { .. })));
    }

    #[test]
    fn cross_and_natural_joins_take_no_condition() {
        assert_eq!(
            join(&NO_PK, JoinKind::Cross, "posts", "", None).unwrap().sql,
            " CROSS JOIN posts"
        );
        assert_eq!(
            join(&NO_PK, JoinKind::Natural, "posts", "", None)
                .unwrap()
                .sql,
            " NATURAL JOIN posts"
        );
    }

    #[test]
    fn footer_orders_subclauses_regardless_of_input() {
        let sql = footer(
            &["team".to_string()],
            &["name ASC".to_string(), "id DESC".to_string()],
            Some(10),
            Some(20),
        );
        assert_eq!(
            sql,
            " GROUP BY team ORDER BY name ASC, id DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn footer_empty_is_empty() {
        assert_eq!(footer(&[], &[], None, None), "");
    }

    #[test]
    fn bind_list_counts() {
        assert_eq!(bind_list(1), "$?");
        assert_eq!(bind_list(3), "$?, $?, $?");
    }
}
