//! Placeholder finalization.
//!
//! Templates emit the dialect-neutral [`PARAM_TOKEN`]; this pass rewrites
//! every token into the dialect's concrete marker syntax exactly once, at
//! execution time. It is a pure string transform with no knowledge of the
//! parameter values.

use crate::dialect::Dialect;
use crate::fragment::PARAM_TOKEN;
use quell_core::{Error, Result};

/// Rewrite placeholder tokens left-to-right into the dialect's marker
/// syntax.
///
/// Postgres renders sequential numbered markers starting at `start + 1`;
/// `start` is nonzero only when the statement is embedded in a larger
/// statement whose earlier parameters already consumed indices. MySQL and
/// SQLite render the repeated positional marker.
///
/// The transform must consume exactly `param_count` tokens; a divergence
/// is an internal invariant violation, reported as
/// [`Error::PlaceholderMismatch`] and never repaired.
pub fn finalize(sql: &str, dialect: Dialect, start: usize, param_count: usize) -> Result<String> {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    let mut seen = 0usize;

    while let Some(pos) = rest.find(PARAM_TOKEN) {
        out.push_str(&rest[..pos]);
        seen += 1;
        if dialect.numbered_placeholders() {
            out.push('$');
            out.push_str(&(start + seen).to_string());
        } else {
            out.push('?');
        }
        rest = &rest[pos + PARAM_TOKEN.len()..];
    }
    out.push_str(rest);

    if seen != param_count {
        return Err(Error::PlaceholderMismatch {
            expected: param_count,
            found: seen,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_renders_sequential_markers() {
        let sql = finalize("a = $? AND b = $? AND c = $?", Dialect::Postgres, 0, 3).unwrap();
        assert_eq!(sql, "a = $1 AND b = $2 AND c = $3");
    }

    #[test]
    fn mysql_and_sqlite_render_repeated_markers() {
        for dialect in [Dialect::Mysql, Dialect::Sqlite] {
            let sql = finalize("a = $? AND b = $? AND c = $?", dialect, 0, 3).unwrap();
            assert_eq!(sql, "a = ? AND b = ? AND c = ?");
        }
    }

    #[test]
    fn start_offsets_numbering_for_embedded_statements() {
        let sql = finalize("x = $? AND y = $?", Dialect::Postgres, 4, 2).unwrap();
        assert_eq!(sql, "x = $5 AND y = $6");
    }

    #[test]
    fn token_free_sql_passes_through() {
        let sql = finalize("SELECT * FROM users", Dialect::Postgres, 0, 0).unwrap();
        assert_eq!(sql, "SELECT * FROM users");
    }

    #[test]
    fn too_few_params_is_a_mismatch() {
        let result = finalize("a = $? AND b = $?", Dialect::Postgres, 0, 1);
        assert!(matches!(
            result,
            Err(Error::PlaceholderMismatch {
                expected: 1,
                found: 2,
            })
        ));
    }

    #[test]
    fn too_many_params_is_a_mismatch() {
        let result = finalize("a = $?", Dialect::Mysql, 0, 2);
        assert!(matches!(
            result,
            Err(Error::PlaceholderMismatch {
                expected: 2,
                found: 1,
            })
        ));
    }
}
