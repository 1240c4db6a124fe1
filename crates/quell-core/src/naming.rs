//! Naming-convention conversion between host fields and database columns.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// A naming convention for identifiers.
///
/// Every entity carries two of these: one for host-language field names and
/// one for database column names. The hydrator and the clause templates
/// convert between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// `snake_case`
    #[default]
    Snake,
    /// `camelCase`
    Camel,
    /// `PascalCase`
    Pascal,
    /// Leave names untouched.
    Preserve,
}

impl NameStyle {
    /// Convert a name into this style.
    ///
    /// Applying a style to a name already in that style is a no-op, so
    /// metadata keys declared in the database convention pass through
    /// unchanged.
    pub fn apply(self, name: &str) -> String {
        match self {
            NameStyle::Snake => name.to_snake_case(),
            NameStyle::Camel => name.to_lower_camel_case(),
            NameStyle::Pascal => name.to_upper_camel_case(),
            NameStyle::Preserve => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_conversion() {
        assert_eq!(NameStyle::Snake.apply("createdAt"), "created_at");
        assert_eq!(NameStyle::Snake.apply("created_at"), "created_at");
    }

    #[test]
    fn camel_conversion() {
        assert_eq!(NameStyle::Camel.apply("created_at"), "createdAt");
        assert_eq!(NameStyle::Camel.apply("createdAt"), "createdAt");
    }

    #[test]
    fn pascal_conversion() {
        assert_eq!(NameStyle::Pascal.apply("created_at"), "CreatedAt");
    }

    #[test]
    fn preserve_keeps_input() {
        assert_eq!(NameStyle::Preserve.apply("WeIrD_name"), "WeIrD_name");
    }
}
