//! SQLite UPSERT (`INSERT ... ON CONFLICT`).

use rowcraft_core::{make_db_value, Connection, Grammar, Params, Query, QueryError, SqlValue};
use rowcraft_orm::Model;

/// Compiles an upsert on the query's table.
///
/// Produces `insert into <t> (<cols>) values (<vals>) on conflict (<keys>)
/// do update set <col> = <val>, ...`; an empty `update_params` yields
/// `do nothing` instead.
///
/// # Errors
///
/// Returns the query's first registration error, or
/// [`QueryError::EmptyInsert`] when `insert_params` is empty.
pub fn compile_upsert<R>(
    query: &Query<'_, R>,
    insert_params: &Params,
    update_params: &Params,
    primary_keys: &[&str],
) -> rowcraft_core::Result<String> {
    query.check()?;
    if insert_params.is_empty() {
        return Err(QueryError::EmptyInsert(String::from(query.table_name())));
    }
    let grammar = query.grammar();
    let literal = |value: &SqlValue| grammar.safe_literal(&make_db_value(value.clone()));

    let columns: Vec<String> = insert_params.columns().map(|c| grammar.safe_name(c)).collect();
    let values: Vec<String> = insert_params.iter().map(|(_, v)| literal(v)).collect();
    let keys: Vec<String> = primary_keys.iter().map(|k| grammar.safe_name(k)).collect();

    let action = if update_params.is_empty() {
        String::from("do nothing")
    } else {
        let sets: Vec<String> = update_params
            .iter()
            .map(|(c, v)| format!("{} = {}", grammar.safe_name(c), literal(v)))
            .collect();
        format!("do update set {}", sets.join(", "))
    };

    Ok(format!(
        "insert into {} ({}) values ({}) on conflict ({}) {action}",
        grammar.safe_name(query.table_name()),
        columns.join(", "),
        values.join(", "),
        keys.join(", "),
    ))
}

/// Compiles and runs an upsert on the query's table.
///
/// # Errors
///
/// See [`compile_upsert`]; connection errors propagate.
pub fn upsert<R>(
    query: &Query<'_, R>,
    insert_params: &Params,
    update_params: &Params,
    primary_keys: &[&str],
) -> rowcraft_core::Result<()> {
    let sql = compile_upsert(query, insert_params, update_params, primary_keys)?;
    query.run(&sql)
}

/// Upsert support for models stored in SQLite.
pub trait SqliteModelExt: Model {
    /// Inserts the model, or updates its non-key columns when a row with
    /// the same primary key already exists.
    ///
    /// A stored auto-increment model carries its row id in the insert
    /// values so it can hit the conflict target. An unsaved one is always
    /// inserted and does not receive the generated id.
    ///
    /// # Errors
    ///
    /// Propagates parameter computation and query errors.
    fn upsert(&self, connection: &dyn Connection) -> rowcraft_orm::Result<()> {
        let mut insert_params = self.calc_insert_params()?;
        if Self::auto_increment() && self.exists() {
            let row_id = Self::row_id_column()?;
            let mut with_id = Params::new().with(row_id, self.read(row_id)?);
            for (column, value) in insert_params {
                with_id.insert(column, value);
            }
            insert_params = with_id;
        }
        let update_params = self.calc_update_params()?;
        let query = Self::query(connection);
        upsert(&query, &insert_params, &update_params, Self::primary_keys())?;
        Ok(())
    }
}

impl<M: Model> SqliteModelExt for M {}
