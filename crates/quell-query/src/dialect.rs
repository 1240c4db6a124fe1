//! SQL dialect strategy.
//!
//! A [`Dialect`] value is chosen once, when a builder is constructed, and
//! threaded through the clause templates and the placeholder finalizer as
//! plain data. Every dialect-specific branch in the crate keys off this
//! enum; nothing re-detects the dialect later.

/// One target SQL variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// PostgreSQL (sequential `$1, $2, ..` placeholders)
    #[default]
    Postgres,
    /// MySQL family (repeated `?` placeholders)
    Mysql,
    /// SQLite (repeated `?` placeholders)
    Sqlite,
}

impl Dialect {
    /// Lowercase dialect name, for error messages and logging.
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether this dialect renders sequential numbered placeholders
    /// (`$1, $2, ..`) rather than a repeated positional marker (`?`).
    pub const fn numbered_placeholders(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// The native regex-match operator, if the dialect has one.
    ///
    /// SQLite has no native operator; callers must fail fast rather than
    /// degrade to LIKE.
    pub const fn regex_operator(self) -> Option<&'static str> {
        match self {
            Dialect::Postgres => Some("~"),
            Dialect::Mysql => Some("REGEXP"),
            Dialect::Sqlite => None,
        }
    }

    /// Quote an identifier for this dialect.
    ///
    /// Embedded quote characters are escaped by doubling them.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Postgres | Dialect::Sqlite => {
                format!("\"{}\"", name.replace('"', "\"\""))
            }
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Dialect::Postgres.name(), "postgres");
        assert_eq!(Dialect::Mysql.name(), "mysql");
        assert_eq!(Dialect::Sqlite.name(), "sqlite");
    }

    #[test]
    fn placeholder_classes() {
        assert!(Dialect::Postgres.numbered_placeholders());
        assert!(!Dialect::Mysql.numbered_placeholders());
        assert!(!Dialect::Sqlite.numbered_placeholders());
    }

    #[test]
    fn regex_support_is_gated() {
        assert_eq!(Dialect::Postgres.regex_operator(), Some("~"));
        assert_eq!(Dialect::Mysql.regex_operator(), Some("REGEXP"));
        assert_eq!(Dialect::Sqlite.regex_operator(), None);
    }

    #[test]
    fn identifier_quoting_escapes_embedded_quotes() {
        assert_eq!(Dialect::Postgres.quote_identifier("users"), "\"users\"");
        assert_eq!(
            Dialect::Postgres.quote_identifier("we\"ird"),
            "\"we\"\"ird\""
        );
        assert_eq!(Dialect::Mysql.quote_identifier("users"), "`users`");
        assert_eq!(Dialect::Mysql.quote_identifier("we`ird"), "`we``ird`");
    }
}
