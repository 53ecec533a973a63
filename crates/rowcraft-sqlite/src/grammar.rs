//! SQLite grammar.

use rowcraft_core::Grammar;

const OPERATORS: &[&str] = &[
    "=",
    "<",
    ">",
    "<=",
    ">=",
    "<>",
    "!=",
    "is null",
    "is not null",
    "in",
    "not in",
    "like",
    "not like",
    "ilike",
    "&",
    "|",
    "<<",
    ">>",
];

/// SQLite grammar: the generic comparison set plus `ilike` and the bitwise
/// operators.
///
/// SQLite has no `ILIKE`; it is rendered as `like`, which already ignores
/// ASCII case.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SqliteGrammar;

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Grammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn operators(&self) -> &'static [&'static str] {
        OPERATORS
    }

    fn compile_operator(&self, operator: &str) -> String {
        if operator.eq_ignore_ascii_case("ilike") {
            String::from("like")
        } else {
            String::from(operator)
        }
    }
}

#[cfg(test)]
mod tests {
    use rowcraft_core::clause::{Expression, Logic};

    use super::*;

    #[test]
    fn test_sqlite_grammar() {
        let grammar = SqliteGrammar::new();
        assert_eq!(grammar.name(), "sqlite");
        assert!(!grammar.invalid_operator("ILIKE"));
        assert!(!grammar.invalid_operator("<<"));
        assert!(!grammar.invalid_operator("|"));
        assert!(grammar.invalid_operator("||"));
        assert!(grammar.invalid_operator("regexp"));
    }

    #[test]
    fn test_bitwise_expression() {
        let exp = Expression::basic(Logic::And, "flags", "&", 4);
        assert_eq!(exp.compile(&SqliteGrammar), "and `flags` & '4'");
    }

    #[test]
    fn test_ilike_renders_as_like() {
        let exp = Expression::basic(Logic::Or, "title", "ILIKE", "hello%");
        assert_eq!(exp.compile(&SqliteGrammar), "or `title` like 'hello%'");
        assert_eq!(SqliteGrammar.compile_operator("<<"), "<<");
    }
}
