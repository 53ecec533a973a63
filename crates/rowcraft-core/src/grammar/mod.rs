//! SQL grammar support.
//!
//! A [`Grammar`] is the dialect-specific policy object: it states which
//! comparison operators are legal and compiles clause lists into text. Only
//! [`Grammar::name`] and [`Grammar::operators`] are required; every compiler
//! is a provided method so a dialect states policy and overrides only what
//! differs.

mod generic;

pub use generic::GenericGrammar;

use crate::clause::{
    strip_leading_logic, ExprKind, Expression, GroupBy, Join, OrderBy, Selection, IS_NOT_NULL,
    IS_NULL,
};
use crate::error::{QueryError, Result};
use crate::escape;
use crate::value::{make_db_value, Params, SqlValue};

/// Sentinel for an unset `limit` / `offset`.
pub const UNSET: i64 = i64::MIN;

/// Trait for dialect-specific SQL compilation.
pub trait Grammar: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the legal comparison operators, lower-case.
    fn operators(&self) -> &'static [&'static str];

    /// Returns `true` if `operator` is not in the legal set (case-insensitive).
    fn invalid_operator(&self, operator: &str) -> bool {
        let operator = operator.to_lowercase();
        !self.operators().iter().any(|legal| *legal == operator)
    }

    /// Spelling of a legal operator in statement text.
    ///
    /// Dialects override this to map an accepted operator onto their own
    /// syntax.
    fn compile_operator(&self, operator: &str) -> String {
        String::from(operator)
    }

    /// Quotes an identifier, see [`escape::safe_name`].
    fn safe_name(&self, name: &str) -> String {
        escape::safe_name(name)
    }

    /// Quotes a literal, see [`escape::safe_value`].
    fn safe_value(&self, value: &SqlValue) -> Option<String> {
        escape::safe_value(value)
    }

    /// Quotes a literal, rendering NULL as `null`.
    fn safe_literal(&self, value: &SqlValue) -> String {
        self.safe_value(value)
            .unwrap_or_else(|| String::from(escape::NULL_KEYWORD))
    }

    /// Quotes every value of a list.
    fn safe_values(&self, values: &[SqlValue]) -> Vec<String> {
        values.iter().map(|value| self.safe_literal(value)).collect()
    }

    /// Rewrites null comparisons.
    ///
    /// With a null operand, `=` becomes `is null` and `!=` / `<>` become
    /// `is not null`; any other operator is rejected. Raw expressions and
    /// expressions already shaped as null checks are left untouched.
    fn fix_grammar(&self, expression: &mut Expression) -> Result<()> {
        if expression.kind != ExprKind::Basic || !expression.operand.is_null() {
            return Ok(());
        }
        match expression.operator.to_lowercase().as_str() {
            "=" | IS_NULL => {
                expression.operator = String::from(IS_NULL);
                expression.kind = ExprKind::Null;
            }
            "!=" | "<>" | IS_NOT_NULL => {
                expression.operator = String::from(IS_NOT_NULL);
                expression.kind = ExprKind::NotNull;
            }
            _ => {
                return Err(QueryError::NullComparison {
                    column: expression.name.clone(),
                    operator: expression.operator.clone(),
                })
            }
        }
        Ok(())
    }

    /// Compiles the select list. Empty yields `*`.
    fn compile_selects(&self, selections: &[Selection]) -> String {
        if selections.is_empty() {
            return String::from("*");
        }
        let items: Vec<String> = selections.iter().map(|s| s.compile(self)).collect();
        items.join(", ")
    }

    /// Compiles `distinct`.
    fn compile_distinct(&self, distinct: bool) -> String {
        if distinct {
            String::from("distinct")
        } else {
            String::new()
        }
    }

    /// Compiles `<prefix> <conditions>`, dropping the first boolean keyword.
    ///
    /// Yields an empty string for an empty list.
    fn compile_bool_expression(&self, prefix: &str, expressions: &[Expression]) -> String {
        if expressions.is_empty() {
            return String::new();
        }
        let items: Vec<String> = expressions.iter().map(|e| e.compile(self)).collect();
        format!("{prefix} {}", strip_leading_logic(&items.join(" ")))
    }

    /// Compiles a `where` clause.
    fn compile_wheres(&self, wheres: &[Expression]) -> String {
        self.compile_bool_expression("where", wheres)
    }

    /// Compiles a `having` clause.
    fn compile_having(&self, havings: &[Expression]) -> String {
        self.compile_bool_expression("having", havings)
    }

    /// Compiles join clauses, space separated.
    fn compile_joins(&self, joins: &[Join]) -> String {
        let items: Vec<String> = joins.iter().map(|j| j.compile(self)).collect();
        items.join(" ")
    }

    /// Compiles a `group by` clause.
    fn compile_group_bys(&self, group_bys: &[GroupBy]) -> String {
        if group_bys.is_empty() {
            return String::new();
        }
        let items: Vec<String> = group_bys.iter().map(|g| g.compile(self)).collect();
        format!("group by {}", items.join(", "))
    }

    /// Compiles an `order by` clause.
    fn compile_order_bys(&self, order_bys: &[OrderBy]) -> String {
        if order_bys.is_empty() {
            return String::new();
        }
        let items: Vec<String> = order_bys.iter().map(|o| o.compile(self)).collect();
        format!("order by {}", items.join(", "))
    }

    /// Compiles `limit N`; [`UNSET`] suppresses the clause.
    fn compile_limit(&self, limit: i64) -> String {
        if limit == UNSET {
            String::new()
        } else {
            format!("limit {limit}")
        }
    }

    /// Compiles `offset N`; [`UNSET`] suppresses the clause.
    fn compile_offset(&self, offset: i64) -> String {
        if offset == UNSET {
            String::new()
        } else {
            format!("offset {offset}")
        }
    }

    /// Compiles an insert statement. An empty map yields an empty string.
    fn compile_insert_query(&self, table: &str, params: &Params) -> String {
        if params.is_empty() {
            return String::new();
        }
        let names: Vec<String> = params.columns().map(|c| self.safe_name(c)).collect();
        let values: Vec<String> = params
            .iter()
            .map(|(_, v)| self.safe_literal(&make_db_value(v.clone())))
            .collect();
        format!(
            "insert into {} ({}) values ({})",
            self.safe_name(table),
            names.join(", "),
            values.join(", ")
        )
    }

    /// Compiles an update statement from a precompiled `where` clause.
    fn compile_update_query(&self, table: &str, params: &Params, where_clause: &str) -> String {
        let sets: Vec<String> = params
            .iter()
            .map(|(c, v)| {
                format!(
                    "{} = {}",
                    self.safe_name(c),
                    self.safe_literal(&make_db_value(v.clone()))
                )
            })
            .collect();
        format!(
            "update {} set {} {where_clause}",
            self.safe_name(table),
            sets.join(", ")
        )
        .trim()
        .to_string()
    }

    /// Compiles a delete statement from a precompiled `where` clause.
    fn compile_delete_query(&self, table: &str, where_clause: &str) -> String {
        format!("delete from {} {where_clause}", self.safe_name(table))
            .trim()
            .to_string()
    }
}
