//! Clause model.
//!
//! Small value objects accumulated by [`Query`](crate::Query). Each one
//! compiles itself to a text fragment through a [`Grammar`]; callers never
//! pre-escape names.

use std::fmt;

use crate::grammar::Grammar;
use crate::value::{make_db_value, SqlValue, ToSqlValue};

/// Boolean keyword joining an expression to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// `and`
    And,
    /// `or`
    Or,
}

impl Logic {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Shape of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    /// `<name> <op> <value>`
    Basic,
    /// `<name> is null`
    Null,
    /// `<name> is not null`
    NotNull,
    /// `<name> in (<values>)`
    In,
    /// `<name> not in (<values>)`
    NotIn,
    /// Literal SQL.
    Raw,
}

/// Right-hand side of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand (`is null`, raw).
    None,
    /// A single value.
    Value(SqlValue),
    /// A value list for `in` / `not in`.
    List(Vec<SqlValue>),
}

impl Operand {
    /// Returns `true` if the operand carries no value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::None | Self::Value(SqlValue::Null))
    }
}

/// A single boolean condition, e.g. `` and `user`.`age` >= '18' ``.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub(crate) logic: Logic,
    pub(crate) kind: ExprKind,
    pub(crate) name: String,
    pub(crate) operator: String,
    pub(crate) operand: Operand,
}

impl Expression {
    /// `<name> <operator> <value>`
    pub fn basic(logic: Logic, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        Self {
            logic,
            kind: ExprKind::Basic,
            name: String::from(name),
            operator: String::from(operator),
            operand: Operand::Value(value.to_sql_value()),
        }
    }

    /// `<name> is null`
    #[must_use]
    pub fn null(logic: Logic, name: &str) -> Self {
        Self {
            logic,
            kind: ExprKind::Null,
            name: String::from(name),
            operator: String::from(IS_NULL),
            operand: Operand::None,
        }
    }

    /// `<name> is not null`
    #[must_use]
    pub fn not_null(logic: Logic, name: &str) -> Self {
        Self {
            logic,
            kind: ExprKind::NotNull,
            name: String::from(name),
            operator: String::from(IS_NOT_NULL),
            operand: Operand::None,
        }
    }

    /// `<name> in (<values>)`
    pub fn in_list<I, V>(logic: Logic, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        Self::list(logic, ExprKind::In, "in", name, values)
    }

    /// `<name> not in (<values>)`
    pub fn not_in_list<I, V>(logic: Logic, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        Self::list(logic, ExprKind::NotIn, "not in", name, values)
    }

    fn list<I, V>(logic: Logic, kind: ExprKind, operator: &str, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        Self {
            logic,
            kind,
            name: String::from(name),
            operator: String::from(operator),
            operand: Operand::List(values.into_iter().map(ToSqlValue::to_sql_value).collect()),
        }
    }

    /// Literal SQL, emitted unescaped.
    ///
    /// **Warning**: never build `sql` from user input.
    #[must_use]
    pub fn raw(logic: Logic, sql: &str) -> Self {
        Self {
            logic,
            kind: ExprKind::Raw,
            name: String::from(sql),
            operator: String::new(),
            operand: Operand::None,
        }
    }

    /// Boolean keyword of this expression.
    #[must_use]
    pub const fn logic(&self) -> Logic {
        self.logic
    }

    /// Shape of this expression.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }

    /// Column name, or the raw SQL for [`ExprKind::Raw`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comparison operator.
    #[must_use]
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Right-hand side.
    #[must_use]
    pub const fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Compiles to `<logic> <condition>`.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        format!("{} {}", self.logic.as_str(), self.compile_condition(grammar))
    }

    fn compile_condition<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        if self.kind == ExprKind::Raw {
            return self.name.clone();
        }
        let name = grammar.safe_name(&self.name);
        let operator = grammar.compile_operator(&self.operator);
        match (&self.kind, &self.operand) {
            (ExprKind::Null | ExprKind::NotNull, _) | (_, Operand::None) => {
                format!("{name} {operator}")
            }
            (_, Operand::List(values)) => {
                let values: Vec<SqlValue> = values.iter().cloned().map(make_db_value).collect();
                format!("{name} {operator} ({})", grammar.safe_values(&values).join(", "))
            }
            (_, Operand::Value(value)) => {
                let value = make_db_value(value.clone());
                format!("{name} {operator} {}", grammar.safe_literal(&value))
            }
        }
    }
}

pub(crate) const IS_NULL: &str = "is null";
pub(crate) const IS_NOT_NULL: &str = "is not null";

/// Removes the leading `and` / `or` keyword of a compiled condition list.
pub(crate) fn strip_leading_logic(clause: &str) -> &str {
    let clause = clause.trim();
    clause
        .strip_prefix("and")
        .or_else(|| clause.strip_prefix("or"))
        .unwrap_or(clause)
        .trim()
}

/// A compound join condition: an ordered list of expressions.
///
/// # Example
///
/// ```rust
/// use rowcraft_core::clause::Joiner;
///
/// let joiner = Joiner::new()
///     .where_("event.level", ">=", 3)
///     .or_where_null("event.deleted_at");
/// assert_eq!(joiner.expressions().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Joiner {
    expressions: Vec<Expression>,
}

impl Joiner {
    /// Creates an empty joiner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expressions: Vec::new(),
        }
    }

    fn push(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// `and <first> = <second>`, where `second` is compared as a value.
    #[must_use]
    pub fn on(self, first: &str, second: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::And, first, "=", second))
    }

    /// `and <first> <operator> <second>`, where `second` is compared as a value.
    #[must_use]
    pub fn on_op(self, first: &str, operator: &str, second: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::And, first, operator, second))
    }

    /// `and <name> = <value>`
    #[must_use]
    pub fn where_eq(self, name: &str, value: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::And, name, "=", value))
    }

    /// `or <name> = <value>`
    #[must_use]
    pub fn or_where_eq(self, name: &str, value: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::Or, name, "=", value))
    }

    /// `and <name> <operator> <value>`
    #[must_use]
    pub fn where_(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::And, name, operator, value))
    }

    /// `or <name> <operator> <value>`
    #[must_use]
    pub fn or_where(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push(Expression::basic(Logic::Or, name, operator, value))
    }

    /// `and <name> is null`
    #[must_use]
    pub fn where_null(self, name: &str) -> Self {
        self.push(Expression::null(Logic::And, name))
    }

    /// `or <name> is null`
    #[must_use]
    pub fn or_where_null(self, name: &str) -> Self {
        self.push(Expression::null(Logic::Or, name))
    }

    /// `and <name> is not null`
    #[must_use]
    pub fn where_not_null(self, name: &str) -> Self {
        self.push(Expression::not_null(Logic::And, name))
    }

    /// `or <name> is not null`
    #[must_use]
    pub fn or_where_not_null(self, name: &str) -> Self {
        self.push(Expression::not_null(Logic::Or, name))
    }

    /// `and <name> in (<values>)`
    #[must_use]
    pub fn where_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.push(Expression::in_list(Logic::And, name, values))
    }

    /// `or <name> in (<values>)`
    #[must_use]
    pub fn or_where_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.push(Expression::in_list(Logic::Or, name, values))
    }

    /// `and <name> not in (<values>)`
    #[must_use]
    pub fn where_not_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.push(Expression::not_in_list(Logic::And, name, values))
    }

    /// `or <name> not in (<values>)`
    #[must_use]
    pub fn or_where_not_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.push(Expression::not_in_list(Logic::Or, name, values))
    }

    /// `and <sql>`
    #[must_use]
    pub fn where_raw(self, sql: &str) -> Self {
        self.push(Expression::raw(Logic::And, sql))
    }

    /// `or <sql>`
    #[must_use]
    pub fn or_where_raw(self, sql: &str) -> Self {
        self.push(Expression::raw(Logic::Or, sql))
    }

    /// Registered expressions in insertion order.
    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub(crate) fn expressions_mut(&mut self) -> &mut Vec<Expression> {
        &mut self.expressions
    }

    /// Compiles the condition list without its leading keyword.
    ///
    /// Yields an empty string when no expression was registered.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        if self.expressions.is_empty() {
            return String::new();
        }
        let clauses: Vec<String> = self
            .expressions
            .iter()
            .map(|exp| exp.compile(grammar))
            .collect();
        strip_leading_logic(&clauses.join(" ")).to_string()
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `left join`
    Left,
    /// `right join`
    Right,
    /// `inner join`
    Inner,
}

impl JoinType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Inner => "inner",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ON condition of a [`Join`].
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// `<first> <operator> <second>`, both sides identifiers.
    Single {
        /// Left column.
        first: String,
        /// Comparison operator.
        operator: String,
        /// Right column.
        second: String,
    },
    /// A compound condition.
    Multiple(Joiner),
}

/// A join clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    join_type: JoinType,
    table: String,
    condition: JoinCondition,
}

impl Join {
    /// Creates a join with a single column-to-column condition.
    #[must_use]
    pub fn single(join_type: JoinType, table: &str, first: &str, operator: &str, second: &str) -> Self {
        Self {
            join_type,
            table: String::from(table),
            condition: JoinCondition::Single {
                first: String::from(first),
                operator: String::from(operator),
                second: String::from(second),
            },
        }
    }

    /// Creates a join with a compound condition.
    #[must_use]
    pub fn multiple(join_type: JoinType, table: &str, joiner: Joiner) -> Self {
        Self {
            join_type,
            table: String::from(table),
            condition: JoinCondition::Multiple(joiner),
        }
    }

    /// Join flavor.
    #[must_use]
    pub const fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Joined table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// ON condition.
    #[must_use]
    pub const fn condition(&self) -> &JoinCondition {
        &self.condition
    }

    /// Compiles to `<type> join <table> on <condition>`.
    ///
    /// An empty compound condition omits the `on` part.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        let table = grammar.safe_name(&self.table);
        let condition = match &self.condition {
            JoinCondition::Multiple(joiner) => joiner.compile(grammar),
            JoinCondition::Single {
                first,
                operator,
                second,
            } => format!(
                "{} {operator} {}",
                grammar.safe_name(first),
                grammar.safe_name(second)
            ),
        };
        if condition.is_empty() {
            format!("{} join {table}", self.join_type)
        } else {
            format!("{} join {table} on {condition}", self.join_type)
        }
    }
}

/// A selected column or raw select expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A column name, escaped when compiled.
    Basic(String),
    /// A raw expression with an optional alias.
    Raw {
        /// Literal SQL, e.g. `count(id)`.
        raw: String,
        /// Alias for the expression.
        alias: Option<String>,
    },
}

impl Selection {
    /// Compiles the selection.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        match self {
            Self::Basic(name) => grammar.safe_name(name),
            Self::Raw { raw, alias: None } => raw.clone(),
            Self::Raw {
                raw,
                alias: Some(alias),
            } => format!("({raw}) as {}", grammar.safe_name(alias)),
        }
    }
}

/// A group-by entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// A column name.
    Basic(String),
    /// Literal SQL.
    Raw(String),
}

impl GroupBy {
    /// Compiles the entry.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        match self {
            Self::Basic(name) => grammar.safe_name(name),
            Self::Raw(sql) => sql.clone(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// An order-by entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    raw: bool,
    name: String,
    direction: Direction,
}

impl OrderBy {
    /// Orders by an escaped column name.
    #[must_use]
    pub fn column(name: &str, direction: Direction) -> Self {
        Self {
            raw: false,
            name: String::from(name),
            direction,
        }
    }

    /// Orders by literal SQL.
    #[must_use]
    pub fn raw(sql: &str, direction: Direction) -> Self {
        Self {
            raw: true,
            name: String::from(sql),
            direction,
        }
    }

    /// Sort direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Compiles to `<name> <direction>`.
    #[must_use]
    pub fn compile<G: Grammar + ?Sized>(&self, grammar: &G) -> String {
        let name = if self.raw {
            self.name.clone()
        } else {
            grammar.safe_name(&self.name)
        };
        format!("{name} {}", self.direction.as_str())
    }
}
