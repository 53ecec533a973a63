//! Identifier and literal escaping.
//!
//! Statements are compiled to plain text with inlined literals, so these
//! functions are the only injection defense: identifiers are wrapped in
//! backticks and text literals have their single quotes doubled.
//!
//! Only literals are safe for untrusted input. Backticks inside an
//! identifier are not escaped, so table, column and alias names must
//! never come from user input.

use crate::value::SqlValue;

/// Keyword used when a null literal has to appear in statement text.
pub const NULL_KEYWORD: &str = "null";

/// Quotes an identifier.
///
/// - `*` passes through unescaped.
/// - `table.column` escapes each segment: `` `table`.`column` ``.
/// - `column as alias` (case-insensitive `as`) escapes both sides.
/// - Anything else is trimmed and wrapped in backticks.
///
/// Embedded backticks are kept as is: `name` must not come from user input.
///
/// # Example
///
/// ```rust
/// use rowcraft_core::escape::safe_name;
///
/// assert_eq!(safe_name("user.id as uid"), "`user`.`id` as `uid`");
/// assert_eq!(safe_name("user.*"), "`user`.*");
/// ```
#[must_use]
pub fn safe_name(name: &str) -> String {
    if name == "*" {
        return String::from("*");
    }
    let name = name.trim();
    if let Some((table, column)) = name.split_once('.') {
        return format!("{}.{}", safe_name(table), safe_name(column));
    }
    if let Some(at) = name.to_ascii_lowercase().find(" as ") {
        let (left, right) = (&name[..at], &name[at + 4..]);
        return format!("{} as {}", safe_name(left), safe_name(right));
    }
    format!("`{name}`")
}

/// Quotes a literal value.
///
/// Returns `None` for NULL: callers must decide how a null is rendered
/// (comparisons are rewritten to `is null` before reaching this point).
#[must_use]
pub fn safe_value(value: &SqlValue) -> Option<String> {
    let quoted = match value {
        SqlValue::Null => return None,
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        SqlValue::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
            format!("X'{hex}'")
        }
        SqlValue::Bool(b) => format!("'{b}'"),
        SqlValue::Int(n) => format!("'{n}'"),
        SqlValue::Float(f) => format!("'{f}'"),
    };
    Some(quoted)
}

/// Quotes a literal value, rendering NULL as the bare `null` keyword.
#[must_use]
pub fn safe_literal(value: &SqlValue) -> String {
    safe_value(value).unwrap_or_else(|| String::from(NULL_KEYWORD))
}

/// Quotes each value of a list, see [`safe_literal`].
#[must_use]
pub fn safe_values(values: &[SqlValue]) -> Vec<String> {
    values.iter().map(safe_literal).collect()
}
