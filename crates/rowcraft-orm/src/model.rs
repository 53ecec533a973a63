//! Model trait.
//!
//! A [`Model`] is a [`Record`] bound to a table. One instance stands for one
//! row, existing or prospective. Configuration lives in associated
//! functions with defaults matching the common case: a single auto-increment
//! `id` primary key, every column assignable, strict mode on.

use std::any::type_name;

use rowcraft_core::{
    field_index, make_db_value, Connection, Params, Query, Record, SqlValue, ToSqlValue,
};
use tracing::debug;

use crate::error::{OrmError, Result};

/// Default row id column of auto-increment models.
pub const DEFAULT_ROW_ID: &str = "id";

/// A record persisted in a table.
///
/// # Example
///
/// ```rust
/// use rowcraft_derive::Record;
/// use rowcraft_orm::Model;
///
/// #[derive(Debug, Default, Record)]
/// struct Membership {
///     #[column]
///     user_id: i64,
///     #[column]
///     group_id: i64,
///     #[column]
///     role: String,
/// }
///
/// impl Model for Membership {
///     fn table_name() -> &'static str {
///         "membership"
///     }
///
///     fn primary_keys() -> &'static [&'static str] {
///         &["user_id", "group_id"]
///     }
///
///     fn auto_increment() -> bool {
///         false
///     }
/// }
///
/// let m = Membership { user_id: 1, group_id: 2, role: String::from("owner") };
/// let params = m.calc_update_params().unwrap();
/// assert_eq!(params.columns().collect::<Vec<_>>(), vec!["role"]);
/// assert!(Membership::row_id_column().is_err());
/// ```
pub trait Model: Record {
    /// Table this model is stored in.
    fn table_name() -> &'static str;

    /// Primary key columns.
    fn primary_keys() -> &'static [&'static str] {
        &[DEFAULT_ROW_ID]
    }

    /// Whitelist of assignable columns. Takes precedence over [`Model::guarded`].
    fn fillable() -> Option<&'static [&'static str]> {
        None
    }

    /// Blacklist of assignable columns.
    fn guarded() -> Option<&'static [&'static str]> {
        None
    }

    /// Columns left out of the select list of [`Model::query`].
    fn hidden() -> &'static [&'static str] {
        &[]
    }

    /// Whether the table generates the row id.
    fn auto_increment() -> bool {
        true
    }

    /// Strict mode rejects empty parameter and condition sets.
    fn strict_mode() -> bool {
        true
    }

    /// Whether this instance is already stored, deciding between insert and
    /// update in [`Model::save`].
    ///
    /// By default every primary key must hold a non-null, non-zero,
    /// non-empty value.
    fn exists(&self) -> bool {
        Self::primary_keys().iter().all(|pk| {
            !matches!(
                self.value(pk),
                None | Some(SqlValue::Null | SqlValue::Int(0))
            ) && self.value(pk) != Some(SqlValue::Text(String::new()))
        })
    }

    /// Called before insert parameters are computed.
    fn on_insert(&mut self) {}

    /// Called before update parameters are computed.
    fn on_update(&mut self) {}

    /// Row id column.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::RowIdUnavailable`] unless auto-increment is
    /// enabled.
    fn row_id_column() -> Result<&'static str> {
        if Self::auto_increment() {
            Ok(DEFAULT_ROW_ID)
        } else {
            Err(OrmError::RowIdUnavailable(type_name::<Self>()))
        }
    }

    /// Whether `column` may be written by insert or update.
    #[must_use]
    fn is_assignable(column: &str) -> bool {
        match (Self::fillable(), Self::guarded()) {
            (Some(fillable), _) => fillable.contains(&column),
            (None, Some(guarded)) => !guarded.contains(&column),
            (None, None) => true,
        }
    }

    /// Computes insert parameters from the current state.
    ///
    /// Alias columns and unassignable columns are skipped, as is the row id
    /// of auto-increment models.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::EmptyInsertParams`] in strict mode when nothing
    /// is left to insert.
    fn calc_insert_params(&self) -> Result<Params> {
        let row_id = Self::auto_increment().then_some(DEFAULT_ROW_ID);
        let index = field_index::<Self>();
        let mut params = Params::new();
        for column in index.table_columns() {
            if !Self::is_assignable(column.name) || row_id == Some(column.name) {
                continue;
            }
            params.insert(column.name, self.read(column.name)?);
        }
        if Self::strict_mode() && params.is_empty() {
            return Err(OrmError::EmptyInsertParams(type_name::<Self>()));
        }
        Ok(params)
    }

    /// Computes the primary key conditions identifying this row.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::EmptyPrimaryKeys`] without primary keys,
    /// [`OrmError::MissingColumn`] when a primary key is not mapped, and
    /// [`OrmError::EmptyUpdateConditions`] in strict mode when no condition
    /// remains.
    fn calc_update_conditions(&self) -> Result<Params> {
        let primary_keys = Self::primary_keys();
        if primary_keys.is_empty() {
            return Err(OrmError::EmptyPrimaryKeys(type_name::<Self>()));
        }
        let index = field_index::<Self>();
        let mut conditions = Params::new();
        for pk in primary_keys {
            let column = index.get(pk).ok_or_else(|| OrmError::MissingColumn {
                model: type_name::<Self>(),
                column: String::from(*pk),
            })?;
            if column.table_column {
                conditions.insert(column.name, self.read(column.name)?);
            }
        }
        if Self::strict_mode() && conditions.is_empty() {
            return Err(OrmError::EmptyUpdateConditions(type_name::<Self>()));
        }
        Ok(conditions)
    }

    /// Computes update parameters from the current state.
    ///
    /// Primary keys are never updated.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::EmptyPrimaryKeys`] without primary keys and
    /// [`OrmError::EmptyUpdateParams`] in strict mode when nothing is left
    /// to update.
    fn calc_update_params(&self) -> Result<Params> {
        let primary_keys = Self::primary_keys();
        if primary_keys.is_empty() {
            return Err(OrmError::EmptyPrimaryKeys(type_name::<Self>()));
        }
        let index = field_index::<Self>();
        let mut params = Params::new();
        for column in index.table_columns() {
            if !Self::is_assignable(column.name) || primary_keys.contains(&column.name) {
                continue;
            }
            params.insert(column.name, self.read(column.name)?);
        }
        if Self::strict_mode() && params.is_empty() {
            return Err(OrmError::EmptyUpdateParams(type_name::<Self>()));
        }
        Ok(params)
    }

    /// Reads the storage value of a mapped column.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::MissingColumn`] if no field is mapped to `column`.
    fn read(&self, column: &str) -> Result<SqlValue> {
        self.value(column)
            .map(make_db_value)
            .ok_or_else(|| OrmError::MissingColumn {
                model: type_name::<Self>(),
                column: String::from(column),
            })
    }

    /// Opens a query on the model's table.
    ///
    /// With hidden columns configured, the select list holds every other
    /// table column.
    fn query(connection: &dyn Connection) -> Query<'_, Self> {
        let query = Query::new(connection, Self::table_name()).strict(Self::strict_mode());
        let hidden = Self::hidden();
        if hidden.is_empty() {
            return query;
        }
        let visible: Vec<&str> = field_index::<Self>()
            .table_columns()
            .map(|column| column.name)
            .filter(|name| !hidden.contains(name))
            .collect();
        query.select(&visible)
    }

    /// Finds the row whose row id equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::RowIdUnavailable`] for models without
    /// auto-increment; query errors propagate.
    fn find(connection: &dyn Connection, id: impl ToSqlValue) -> Result<Option<Self>> {
        let row_id = Self::row_id_column()?;
        Ok(Self::query(connection).where_eq(row_id, id).first()?)
    }

    /// Inserts this model.
    ///
    /// Auto-increment models receive the generated row id.
    ///
    /// # Errors
    ///
    /// Propagates parameter computation, query and field errors.
    fn insert(&mut self, connection: &dyn Connection) -> Result<()> {
        self.on_insert();
        let params = self.calc_insert_params()?;
        if params.is_empty() {
            debug!(model = type_name::<Self>(), "nothing to insert");
            return Ok(());
        }
        Self::query(connection).insert(&params)?;

        if Self::auto_increment() {
            let id = connection.last_insert_rowid()?;
            self.set_value(Self::row_id_column()?, SqlValue::Int(id))?;
        }
        Ok(())
    }

    /// Updates the row identified by this model's primary keys.
    ///
    /// # Errors
    ///
    /// Propagates parameter computation and query errors.
    fn update(&mut self, connection: &dyn Connection) -> Result<()> {
        self.on_update();
        let conditions = self.calc_update_conditions()?;
        let params = self.calc_update_params()?;
        if params.is_empty() {
            debug!(model = type_name::<Self>(), "nothing to update");
            return Ok(());
        }
        let mut query = Self::query(connection);
        for (column, value) in conditions {
            query = query.where_eq(&column, value);
        }
        query.update(&params)?;
        Ok(())
    }

    /// Updates the row if [`Model::exists`], inserts it otherwise.
    ///
    /// # Errors
    ///
    /// See [`Model::insert`] and [`Model::update`].
    fn save(&mut self, connection: &dyn Connection) -> Result<()> {
        if self.exists() {
            self.update(connection)
        } else {
            self.insert(connection)
        }
    }

    /// Deletes the row identified by this model's primary keys.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnconditionalDelete`] when no primary key value
    /// is available; query errors propagate.
    fn delete(&self, connection: &dyn Connection) -> Result<()> {
        let conditions = self.calc_update_conditions()?;
        if conditions.is_empty() {
            return Err(OrmError::UnconditionalDelete(type_name::<Self>()));
        }
        let mut query = Self::query(connection);
        for (column, value) in conditions {
            query = query.where_eq(&column, value);
        }
        query.delete()?;
        Ok(())
    }
}
