//! Generic SQL grammar.

use super::Grammar;

/// Operators accepted by [`GenericGrammar`].
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
];

/// Dialect-neutral grammar with the common comparison operators.
///
/// Useful for compiling statements that are never sent to a specific
/// database, e.g. in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericGrammar;

impl Grammar for GenericGrammar {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn operators(&self) -> &'static [&'static str] {
        OPERATORS
    }
}
