//! Query builder.
//!
//! [`Query`] accumulates clauses for one table and compiles them with the
//! connection's [`Grammar`]. Chaining methods never fail: the first
//! registration error (illegal operator, null compared with `>`, ...) is
//! kept and returned by the next terminal operation.
//!
//! # Example
//!
//! ```rust
//! use rowcraft_core::{Connection, GenericGrammar, Grammar, Query, Result, Row};
//!
//! struct Offline;
//!
//! impl Connection for Offline {
//!     fn grammar(&self) -> &dyn Grammar {
//!         &GenericGrammar
//!     }
//!     fn execute(&self, _sql: &str) -> Result<()> {
//!         Ok(())
//!     }
//!     fn fetch(&self, _sql: &str) -> Result<Vec<Row>> {
//!         Ok(Vec::new())
//!     }
//!     fn last_insert_rowid(&self) -> Result<i64> {
//!         Ok(0)
//!     }
//! }
//!
//! let conn = Offline;
//! let sql = Query::<Row>::new(&conn, "user")
//!     .select(&["id", "name"])
//!     .where_("age", ">", 18)
//!     .order_by_desc("id")
//!     .limit(10)
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "select `id`, `name` from `user` where `age` > '18' order by `id` desc limit 10"
//! );
//! ```

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::clause::{
    Direction, ExprKind, Expression, GroupBy, Join, JoinType, Joiner, Logic, OrderBy, Selection,
};
use crate::connection::{Connection, Row};
use crate::error::{QueryError, Result};
use crate::grammar::{Grammar, UNSET};
use crate::record::Record;
use crate::value::{Params, ToSqlValue};

/// A statement builder bound to one table, one connection and one row type.
///
/// `R` is the record type produced by [`Query::get`] and [`Query::first`].
/// Reusing a builder is legal; clauses keep accumulating.
pub struct Query<'c, R = Row> {
    connection: &'c dyn Connection,
    grammar: &'c dyn Grammar,
    table: String,
    selects: Vec<Selection>,
    distinct: bool,
    joins: Vec<Join>,
    wheres: Vec<Expression>,
    group_bys: Vec<GroupBy>,
    havings: Vec<Expression>,
    order_bys: Vec<OrderBy>,
    limit: i64,
    offset: i64,
    strict: bool,
    error: Option<QueryError>,
    record: PhantomData<fn() -> R>,
}

impl<'c, R> Query<'c, R> {
    /// Creates a query on `table` using the connection's grammar.
    #[must_use]
    pub fn new(connection: &'c dyn Connection, table: &str) -> Self {
        Self::with_grammar(connection, connection.grammar(), table)
    }

    /// Creates a query on `table` with an explicit grammar.
    #[must_use]
    pub fn with_grammar(
        connection: &'c dyn Connection,
        grammar: &'c dyn Grammar,
        table: &str,
    ) -> Self {
        Self {
            connection,
            grammar,
            table: String::from(table),
            selects: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            wheres: Vec::new(),
            group_bys: Vec::new(),
            havings: Vec::new(),
            order_bys: Vec::new(),
            limit: UNSET,
            offset: UNSET,
            strict: true,
            error: None,
            record: PhantomData,
        }
    }

    /// Replaces the target table.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.table = String::from(table);
        self
    }

    /// Enables or disables strict mode (enabled by default).
    ///
    /// Strict mode refuses an update without any where clause.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns whether strict mode is enabled.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Target table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Grammar compiling this query.
    #[must_use]
    pub fn grammar(&self) -> &'c dyn Grammar {
        self.grammar
    }

    /// Connection running this query.
    #[must_use]
    pub fn connection(&self) -> &'c dyn Connection {
        self.connection
    }

    /// Registered where expressions.
    #[must_use]
    pub fn wheres(&self) -> &[Expression] {
        &self.wheres
    }

    /// Returns the first registration error, if any.
    ///
    /// # Errors
    ///
    /// Returns a clone of the retained error.
    pub fn check(&self) -> Result<()> {
        self.error.clone().map_or(Ok(()), Err)
    }

    // Selection

    /// Selects one or more columns.
    #[must_use]
    pub fn select(mut self, names: &[&str]) -> Self {
        self.selects
            .extend(names.iter().map(|name| Selection::Basic(String::from(*name))));
        self
    }

    /// Selects a raw expression, optionally aliased as `(<raw>) as <alias>`.
    ///
    /// **Warning**: `raw` is emitted unescaped.
    #[must_use]
    pub fn select_raw(mut self, raw: &str, alias: Option<&str>) -> Self {
        self.selects.push(Selection::Raw {
            raw: String::from(raw),
            alias: alias.map(String::from),
        });
        self
    }

    /// Adds `distinct`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // Joins

    /// `inner join <table> on <first> = <second>`
    #[must_use]
    pub fn join(self, table: &str, first: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Inner, table, first, "=", second)
    }

    /// `inner join <table> on <first> <operator> <second>`
    #[must_use]
    pub fn join_on(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Inner, table, first, operator, second)
    }

    /// `left join <table> on <first> = <second>`
    #[must_use]
    pub fn left_join(self, table: &str, first: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Left, table, first, "=", second)
    }

    /// `left join <table> on <first> <operator> <second>`
    #[must_use]
    pub fn left_join_on(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Left, table, first, operator, second)
    }

    /// `right join <table> on <first> = <second>`
    #[must_use]
    pub fn right_join(self, table: &str, first: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Right, table, first, "=", second)
    }

    /// `right join <table> on <first> <operator> <second>`
    #[must_use]
    pub fn right_join_on(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.register_single_join(JoinType::Right, table, first, operator, second)
    }

    /// Inner join with a compound condition built by `build`.
    ///
    /// ```rust
    /// # use rowcraft_core::{Connection, GenericGrammar, Grammar, Query, Result, Row};
    /// # struct Offline;
    /// # impl Connection for Offline {
    /// #     fn grammar(&self) -> &dyn Grammar { &GenericGrammar }
    /// #     fn execute(&self, _sql: &str) -> Result<()> { Ok(()) }
    /// #     fn fetch(&self, _sql: &str) -> Result<Vec<Row>> { Ok(Vec::new()) }
    /// #     fn last_insert_rowid(&self) -> Result<i64> { Ok(0) }
    /// # }
    /// # let conn = Offline;
    /// let sql = Query::<Row>::new(&conn, "user")
    ///     .join_with("event", |on| on.where_("event.level", ">=", 3).where_null("event.deleted_at"))
    ///     .to_sql()
    ///     .unwrap();
    /// assert_eq!(
    ///     sql,
    ///     "select * from `user` inner join `event` on `event`.`level` >= '3' and `event`.`deleted_at` is null"
    /// );
    /// ```
    #[must_use]
    pub fn join_with<F>(self, table: &str, build: F) -> Self
    where
        F: FnOnce(Joiner) -> Joiner,
    {
        self.register_multiple_join(JoinType::Inner, table, build(Joiner::new()))
    }

    /// Left join with a compound condition built by `build`.
    #[must_use]
    pub fn left_join_with<F>(self, table: &str, build: F) -> Self
    where
        F: FnOnce(Joiner) -> Joiner,
    {
        self.register_multiple_join(JoinType::Left, table, build(Joiner::new()))
    }

    /// Right join with a compound condition built by `build`.
    #[must_use]
    pub fn right_join_with<F>(self, table: &str, build: F) -> Self
    where
        F: FnOnce(Joiner) -> Joiner,
    {
        self.register_multiple_join(JoinType::Right, table, build(Joiner::new()))
    }

    fn register_single_join(
        mut self,
        join_type: JoinType,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> Self {
        let operator = operator.trim();
        if self.grammar.invalid_operator(operator) {
            self.fail(QueryError::InvalidOperator(String::from(operator)));
            return self;
        }
        self.joins.push(Join::single(
            join_type,
            table,
            first.trim(),
            operator,
            second.trim(),
        ));
        self
    }

    fn register_multiple_join(mut self, join_type: JoinType, table: &str, mut joiner: Joiner) -> Self {
        let expressions = std::mem::take(joiner.expressions_mut());
        for expression in expressions {
            match self.prepare(expression) {
                Ok(expression) => joiner.expressions_mut().push(expression),
                Err(err) => self.fail(err),
            }
        }
        self.joins.push(Join::multiple(join_type, table, joiner));
        self
    }

    // Where

    /// `and <name> = <value>`
    #[must_use]
    pub fn where_eq(self, name: &str, value: impl ToSqlValue) -> Self {
        self.register_where(Expression::basic(Logic::And, name, "=", value))
    }

    /// `and <name> <operator> <value>`
    ///
    /// A null value with `=` / `!=` / `<>` becomes `is null` / `is not null`.
    #[must_use]
    pub fn where_(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.register_where(Expression::basic(Logic::And, name, operator, value))
    }

    /// `or <name> = <value>`
    #[must_use]
    pub fn or_where_eq(self, name: &str, value: impl ToSqlValue) -> Self {
        self.register_where(Expression::basic(Logic::Or, name, "=", value))
    }

    /// `or <name> <operator> <value>`
    #[must_use]
    pub fn or_where(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.register_where(Expression::basic(Logic::Or, name, operator, value))
    }

    /// `and <name> is null`
    #[must_use]
    pub fn where_null(self, name: &str) -> Self {
        self.register_where(Expression::null(Logic::And, name))
    }

    /// `or <name> is null`
    #[must_use]
    pub fn or_where_null(self, name: &str) -> Self {
        self.register_where(Expression::null(Logic::Or, name))
    }

    /// `and <name> is not null`
    #[must_use]
    pub fn where_not_null(self, name: &str) -> Self {
        self.register_where(Expression::not_null(Logic::And, name))
    }

    /// `or <name> is not null`
    #[must_use]
    pub fn or_where_not_null(self, name: &str) -> Self {
        self.register_where(Expression::not_null(Logic::Or, name))
    }

    /// `and <name> in (<values>)`
    #[must_use]
    pub fn where_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.register_where(Expression::in_list(Logic::And, name, values))
    }

    /// `or <name> in (<values>)`
    #[must_use]
    pub fn or_where_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.register_where(Expression::in_list(Logic::Or, name, values))
    }

    /// `and <name> not in (<values>)`
    #[must_use]
    pub fn where_not_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.register_where(Expression::not_in_list(Logic::And, name, values))
    }

    /// `or <name> not in (<values>)`
    #[must_use]
    pub fn or_where_not_in<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.register_where(Expression::not_in_list(Logic::Or, name, values))
    }

    /// `and <sql>`
    ///
    /// **Warning**: `sql` is emitted unescaped.
    #[must_use]
    pub fn where_raw(self, sql: &str) -> Self {
        self.register_where(Expression::raw(Logic::And, sql))
    }

    /// `or <sql>`
    ///
    /// **Warning**: `sql` is emitted unescaped.
    #[must_use]
    pub fn or_where_raw(self, sql: &str) -> Self {
        self.register_where(Expression::raw(Logic::Or, sql))
    }

    // Group by / having

    /// `group by <names>`
    #[must_use]
    pub fn group_by(mut self, names: &[&str]) -> Self {
        self.group_bys
            .extend(names.iter().map(|name| GroupBy::Basic(String::from(*name))));
        self
    }

    /// `group by <sql>`
    #[must_use]
    pub fn group_by_raw(mut self, sql: &str) -> Self {
        self.group_bys.push(GroupBy::Raw(String::from(sql)));
        self
    }

    /// `having <name> <operator> <value>`
    #[must_use]
    pub fn having(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.register_having(Expression::basic(Logic::And, name, operator, value))
    }

    /// `or <name> <operator> <value>` in the having clause.
    #[must_use]
    pub fn or_having(self, name: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.register_having(Expression::basic(Logic::Or, name, operator, value))
    }

    /// `and <sql>` in the having clause.
    #[must_use]
    pub fn having_raw(self, sql: &str) -> Self {
        self.register_having(Expression::raw(Logic::And, sql))
    }

    /// `or <sql>` in the having clause.
    #[must_use]
    pub fn or_having_raw(self, sql: &str) -> Self {
        self.register_having(Expression::raw(Logic::Or, sql))
    }

    // Order by / pagination

    /// `order by <name> asc`
    #[must_use]
    pub fn order_by(self, name: &str) -> Self {
        self.order_by_dir(name, Direction::Asc)
    }

    /// `order by <name> asc`
    #[must_use]
    pub fn order_by_asc(self, name: &str) -> Self {
        self.order_by_dir(name, Direction::Asc)
    }

    /// `order by <name> desc`
    #[must_use]
    pub fn order_by_desc(self, name: &str) -> Self {
        self.order_by_dir(name, Direction::Desc)
    }

    /// `order by <name> <direction>`
    #[must_use]
    pub fn order_by_dir(mut self, name: &str, direction: Direction) -> Self {
        self.order_bys.push(OrderBy::column(name, direction));
        self
    }

    /// `order by <sql> asc`
    #[must_use]
    pub fn order_by_raw(mut self, sql: &str) -> Self {
        self.order_bys.push(OrderBy::raw(sql, Direction::Asc));
        self
    }

    /// `order by <sql> desc`
    #[must_use]
    pub fn order_by_raw_desc(mut self, sql: &str) -> Self {
        self.order_bys.push(OrderBy::raw(sql, Direction::Desc));
        self
    }

    /// `limit <limit>`; no bounds validation.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// `offset <offset>`; no bounds validation.
    #[must_use]
    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    // Registration

    fn fail(&mut self, err: QueryError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Trims, validates and null-fixes an expression.
    fn prepare(&self, mut expression: Expression) -> Result<Expression> {
        expression.name = String::from(expression.name.trim());
        if expression.kind == ExprKind::Raw {
            return Ok(expression);
        }
        expression.operator = String::from(expression.operator.trim());
        if self.grammar.invalid_operator(&expression.operator) {
            return Err(QueryError::InvalidOperator(expression.operator));
        }
        if expression.kind == ExprKind::Basic
            && matches!(
                expression.operator.to_lowercase().as_str(),
                "in" | "not in"
            )
        {
            return Err(QueryError::InvalidOperand {
                column: expression.name,
                operator: expression.operator,
            });
        }
        self.grammar.fix_grammar(&mut expression)?;
        Ok(expression)
    }

    fn register_where(mut self, expression: Expression) -> Self {
        match self.prepare(expression) {
            Ok(expression) => self.wheres.push(expression),
            Err(err) => self.fail(err),
        }
        self
    }

    fn register_having(mut self, expression: Expression) -> Self {
        match self.prepare(expression) {
            Ok(expression) => self.havings.push(expression),
            Err(err) => self.fail(err),
        }
        self
    }

    // Compilation

    /// Compiles the select statement without running it.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn to_sql(&self) -> Result<String> {
        self.check()?;
        let grammar = self.grammar;
        let segments = [
            String::from("select"),
            grammar.compile_distinct(self.distinct),
            grammar.compile_selects(&self.selects),
            String::from("from"),
            grammar.safe_name(&self.table),
            grammar.compile_joins(&self.joins),
            grammar.compile_wheres(&self.wheres),
            grammar.compile_group_bys(&self.group_bys),
            grammar.compile_having(&self.havings),
            grammar.compile_order_bys(&self.order_bys),
            grammar.compile_limit(self.limit),
            grammar.compile_offset(self.offset),
        ];
        let segments: Vec<String> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        Ok(segments.join(" "))
    }

    /// Compiles an insert statement.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, or [`QueryError::EmptyInsert`]
    /// when `params` is empty.
    pub fn compile_insert(&self, params: &Params) -> Result<String> {
        self.check()?;
        if params.is_empty() {
            return Err(QueryError::EmptyInsert(self.table.clone()));
        }
        Ok(self.grammar.compile_insert_query(&self.table, params))
    }

    /// Compiles an update statement restricted by the where clauses.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, [`QueryError::EmptyUpdate`]
    /// when `params` is empty, or [`QueryError::UnconditionalUpdate`] in
    /// strict mode without any where clause.
    pub fn compile_update(&self, params: &Params) -> Result<String> {
        self.check()?;
        if params.is_empty() {
            return Err(QueryError::EmptyUpdate(self.table.clone()));
        }
        if self.strict && self.wheres.is_empty() {
            return Err(QueryError::UnconditionalUpdate(self.table.clone()));
        }
        let where_clause = self.grammar.compile_wheres(&self.wheres);
        Ok(self
            .grammar
            .compile_update_query(&self.table, params, &where_clause))
    }

    /// Compiles a delete statement restricted by the where clauses.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn compile_delete(&self) -> Result<String> {
        self.check()?;
        let where_clause = self.grammar.compile_wheres(&self.wheres);
        Ok(self.grammar.compile_delete_query(&self.table, &where_clause))
    }

    // Execution

    /// Runs the select statement and returns raw rows.
    ///
    /// # Errors
    ///
    /// Returns the first registration error or a connection error.
    pub fn fetch_rows(&self) -> Result<Vec<Row>> {
        let sql = self.to_sql()?;
        debug!(sql = %sql, "running query");
        self.connection.fetch(&sql)
    }

    /// Compiles and runs the insert statement.
    ///
    /// # Errors
    ///
    /// See [`Query::compile_insert`]; connection errors propagate.
    pub fn insert(&self, params: &Params) -> Result<()> {
        let sql = self.compile_insert(params)?;
        self.run(&sql)
    }

    /// Compiles and runs the update statement.
    ///
    /// # Errors
    ///
    /// See [`Query::compile_update`]; connection errors propagate.
    pub fn update(&self, params: &Params) -> Result<()> {
        let sql = self.compile_update(params)?;
        self.run(&sql)
    }

    /// Compiles and runs the delete statement.
    ///
    /// Without any where clause every row of the table is deleted.
    ///
    /// # Errors
    ///
    /// See [`Query::compile_delete`]; connection errors propagate.
    pub fn delete(&self) -> Result<()> {
        let sql = self.compile_delete()?;
        if self.wheres.is_empty() {
            warn!(table = %self.table, "deleting without any condition");
        }
        self.run(&sql)
    }

    /// Runs an arbitrary statement on this query's connection.
    ///
    /// # Errors
    ///
    /// Returns connection errors unchanged.
    pub fn run(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "executing statement");
        self.connection.execute(sql)
    }
}

impl<R: Record> Query<'_, R> {
    /// Runs the select statement and materializes every row.
    ///
    /// # Errors
    ///
    /// Returns the first registration error or a connection error.
    pub fn get(&self) -> Result<Vec<R>> {
        let sql = self.to_sql()?;
        debug!(sql = %sql, "running query");
        self.connection.query::<R>(&sql)
    }

    /// Sets `limit 1` and returns the first row, if any.
    ///
    /// # Errors
    ///
    /// See [`Query::get`].
    pub fn first(mut self) -> Result<Option<R>> {
        self.limit = 1;
        Ok(self.get()?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::grammar::GenericGrammar;
    use crate::record::{ColumnInfo, FieldError, FieldKind};
    use crate::value::SqlValue;

    #[derive(Default)]
    struct Recorder {
        statements: RefCell<Vec<String>>,
        rows: Vec<Row>,
    }

    impl Connection for Recorder {
        fn grammar(&self) -> &dyn Grammar {
            &GenericGrammar
        }

        fn execute(&self, sql: &str) -> Result<()> {
            self.statements.borrow_mut().push(String::from(sql));
            Ok(())
        }

        fn fetch(&self, sql: &str) -> Result<Vec<Row>> {
            self.statements.borrow_mut().push(String::from(sql));
            Ok(self.rows.clone())
        }

        fn last_insert_rowid(&self) -> Result<i64> {
            Ok(0)
        }
    }

    fn query<'c>(conn: &'c Recorder, table: &str) -> Query<'c> {
        Query::new(conn, table)
    }

    #[test]
    fn test_end_to_end_select() {
        let conn = Recorder::default();
        let sql = query(&conn, "user")
            .select(&["id", "name"])
            .where_("age", ">", 18)
            .order_by_desc("id")
            .limit(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select `id`, `name` from `user` where `age` > '18' order by `id` desc limit 10"
        );
    }

    #[test]
    fn test_select_all_segments() {
        let conn = Recorder::default();
        let sql = query(&conn, "user")
            .distinct()
            .select(&["user.city"])
            .select_raw("count(*)", Some("total"))
            .left_join("event", "user.id", "event.user_id")
            .where_not_null("user.city")
            .group_by(&["user.city"])
            .having_raw("count(*) > 1")
            .order_by_raw_desc("count(*)")
            .limit(5)
            .offset(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select distinct `user`.`city`, (count(*)) as `total` from `user` \
             left join `event` on `user`.`id` = `event`.`user_id` \
             where `user`.`city` is not null group by `user`.`city` \
             having count(*) > 1 order by count(*) desc limit 5 offset 10"
        );
    }

    #[test]
    fn test_default_select_star() {
        let conn = Recorder::default();
        assert_eq!(query(&conn, "user").to_sql().unwrap(), "select * from `user`");
    }

    #[test]
    fn test_where_logic_chain() {
        let conn = Recorder::default();
        let sql = query(&conn, "user")
            .where_eq("a", 1)
            .or_where_eq("b", 2)
            .where_in("c", [3, 4])
            .or_where_not_in("d", vec!["x"])
            .or_where_null("e")
            .where_raw("f > 0")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select * from `user` where `a` = '1' or `b` = '2' and `c` in ('3', '4') \
             or `d` not in ('x') or `e` is null and f > 0"
        );
    }

    #[test]
    fn test_null_value_is_rewritten() {
        let conn = Recorder::default();
        let sql = query(&conn, "user")
            .where_eq("deleted_at", SqlValue::Null)
            .where_("banned_at", "!=", None::<i64>)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select * from `user` where `deleted_at` is null and `banned_at` is not null"
        );
    }

    #[test]
    fn test_null_with_ordering_operator_fails() {
        let conn = Recorder::default();
        let err = query(&conn, "user")
            .where_("age", ">", SqlValue::Null)
            .fetch_rows()
            .unwrap_err();
        assert!(matches!(err, QueryError::NullComparison { .. }));
    }

    #[test]
    fn test_invalid_operator_is_kept_until_terminal() {
        let conn = Recorder::default();
        let q = query(&conn, "user")
            .where_("age", "=>", 3)
            .where_("age", "~", 4)
            .where_eq("name", "ok");
        let err = q.to_sql().unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperator(ref op) if op == "=>"));
        assert!(q.delete().is_err());
        assert!(conn.statements.borrow().is_empty());
    }

    #[test]
    fn test_operator_is_trimmed_and_case_insensitive() {
        let conn = Recorder::default();
        let sql = query(&conn, "user")
            .where_(" name ", " LIKE ", "a%")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "select * from `user` where `name` LIKE 'a%'");
    }

    #[test]
    fn test_scalar_in_is_rejected() {
        let conn = Recorder::default();
        let err = query(&conn, "user").where_("id", "in", 3).to_sql().unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { .. }));
    }

    #[test]
    fn test_join_with_validates_expressions() {
        let conn = Recorder::default();
        let err = query(&conn, "user")
            .join_with("event", |on| on.where_("event.at", "<", SqlValue::Null))
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, QueryError::NullComparison { .. }));

        let sql = query(&conn, "user")
            .right_join_with("event", |on| on.on("event.kind", "login").or_where_eq("event.at", None::<i64>))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select * from `user` right join `event` on `event`.`kind` = 'login' or `event`.`at` is null"
        );
    }

    #[test]
    fn test_single_join_rejects_bad_operator() {
        let conn = Recorder::default();
        let err = query(&conn, "user")
            .join_on("event", "user.id", "==", "event.user_id")
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperator(_)));
    }

    #[test]
    fn test_insert() {
        let conn = Recorder::default();
        let q = query(&conn, "user");
        q.insert(&Params::new().with("name", "Ann").with("active", false))
            .unwrap();
        assert_eq!(
            conn.statements.borrow()[0],
            "insert into `user` (`name`, `active`) values ('Ann', '0')"
        );
        let err = q.insert(&Params::new()).unwrap_err();
        assert!(matches!(err, QueryError::EmptyInsert(ref t) if t == "user"));
    }

    #[test]
    fn test_update_strict_mode() {
        let conn = Recorder::default();
        let params = Params::new().with("name", "Bob");

        let err = query(&conn, "user").update(&params).unwrap_err();
        assert!(matches!(err, QueryError::UnconditionalUpdate(_)));
        assert!(conn.statements.borrow().is_empty());

        query(&conn, "user").strict(false).update(&params).unwrap();
        query(&conn, "user").where_eq("id", 7).update(&params).unwrap();
        let statements = conn.statements.borrow();
        assert_eq!(statements[0], "update `user` set `name` = 'Bob'");
        assert_eq!(statements[1], "update `user` set `name` = 'Bob' where `id` = '7'");
    }

    #[test]
    fn test_update_requires_params() {
        let conn = Recorder::default();
        let err = query(&conn, "user")
            .where_eq("id", 1)
            .update(&Params::new())
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyUpdate(_)));
    }

    #[test]
    fn test_delete() {
        let conn = Recorder::default();
        query(&conn, "user").where_in("id", [1, 2]).delete().unwrap();
        query(&conn, "user").delete().unwrap();
        let statements = conn.statements.borrow();
        assert_eq!(statements[0], "delete from `user` where `id` in ('1', '2')");
        assert_eq!(statements[1], "delete from `user`");
    }

    #[derive(Debug, Default)]
    struct Id {
        id: i64,
    }

    impl Record for Id {
        fn columns() -> &'static [ColumnInfo] {
            const COLUMNS: &[ColumnInfo] = &[ColumnInfo {
                name: "id",
                field: "id",
                kind: FieldKind::Long,
                table_column: true,
            }];
            COLUMNS
        }

        fn value(&self, column: &str) -> Option<SqlValue> {
            (column == "id").then(|| SqlValue::Int(self.id))
        }

        fn set_value(&mut self, column: &str, value: SqlValue) -> std::result::Result<(), FieldError> {
            match (column, value) {
                ("id", SqlValue::Int(id)) => {
                    self.id = id;
                    Ok(())
                }
                (column, _) => Err(FieldError::UnknownColumn(String::from(column))),
            }
        }
    }

    #[test]
    fn test_first_forces_limit_one() {
        let conn = Recorder {
            rows: vec![
                Row::from_pairs([("id", SqlValue::Int(4))]),
                Row::from_pairs([("id", SqlValue::Int(5))]),
            ],
            ..Recorder::default()
        };
        let found = Query::<Id>::new(&conn, "user")
            .where_eq("id", 4)
            .limit(50)
            .first()
            .unwrap();
        assert_eq!(found.map(|r| r.id), Some(4));
        assert_eq!(
            conn.statements.borrow()[0],
            "select * from `user` where `id` = '4' limit 1"
        );
    }

    #[test]
    fn test_get_materializes_rows() {
        let conn = Recorder {
            rows: vec![
                Row::from_pairs([("id", SqlValue::Int(1))]),
                Row::from_pairs([("id", SqlValue::Int(2))]),
            ],
            ..Recorder::default()
        };
        let ids: Vec<i64> = Query::<Id>::new(&conn, "user")
            .get()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_clauses_accumulate_on_reuse() {
        let conn = Recorder::default();
        let q = query(&conn, "user").where_eq("a", 1);
        let first = q.to_sql().unwrap();
        let q = q.where_eq("b", 2);
        assert_ne!(first, q.to_sql().unwrap());
        assert!(q.to_sql().unwrap().ends_with("where `a` = '1' and `b` = '2'"));
    }
}
