//! Blocking SQLite connection over sqlx.
//!
//! sqlx is async; [`SqliteConnection`] owns a private current-thread tokio
//! runtime and blocks on it for every call, so it can serve the synchronous
//! [`Connection`] contract.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rowcraft_core::{Connection, Grammar, QueryError, Row, SqlValue};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Column as _, ConnectOptions as _, Connection as _, Row as _, TypeInfo as _, ValueRef as _};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, trace};

use crate::config::SqliteConfig;
use crate::error::Result;
use crate::grammar::SqliteGrammar;

/// A single SQLite session.
pub struct SqliteConnection {
    inner: Mutex<sqlx::SqliteConnection>,
    runtime: Runtime,
    grammar: SqliteGrammar,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("grammar", &self.grammar)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Opens a connection with `config`.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot start, the URL is malformed or the
    /// database cannot be opened.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys)
            .busy_timeout(config.busy_timeout());

        debug!(url = %config.url, "opening sqlite connection");
        let inner = runtime.block_on(options.connect())?;

        Ok(Self {
            inner: Mutex::new(inner),
            runtime,
            grammar: SqliteGrammar,
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// See [`SqliteConnection::open`].
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::default())
    }

    /// Closes the session, flushing pending work.
    ///
    /// # Errors
    ///
    /// Returns the driver error raised while closing.
    pub fn close(self) -> Result<()> {
        let inner = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        self.runtime.block_on(inner.close())?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, sqlx::SqliteConnection> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connection for SqliteConnection {
    fn grammar(&self) -> &dyn Grammar {
        &self.grammar
    }

    fn execute(&self, sql: &str) -> rowcraft_core::Result<()> {
        let mut conn = self.lock();
        let result = self
            .runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut *conn))
            .map_err(QueryError::connection)?;
        trace!(rows_affected = result.rows_affected(), "statement executed");
        Ok(())
    }

    fn fetch(&self, sql: &str) -> rowcraft_core::Result<Vec<Row>> {
        let mut conn = self.lock();
        let rows = self
            .runtime
            .block_on(sqlx::query(sql).fetch_all(&mut *conn))
            .map_err(QueryError::connection)?;
        trace!(rows = rows.len(), "query fetched");
        rows.iter()
            .map(convert_row)
            .collect::<std::result::Result<_, sqlx::Error>>()
            .map_err(QueryError::connection)
    }

    fn last_insert_rowid(&self) -> rowcraft_core::Result<i64> {
        let mut conn = self.lock();
        self.runtime
            .block_on(sqlx::query_scalar::<_, i64>("select last_insert_rowid()").fetch_one(&mut *conn))
            .map_err(QueryError::connection)
    }
}

/// Converts a driver row by the storage class of each value.
fn convert_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        let storage = {
            let raw = row.try_get_raw(i)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_uppercase())
            }
        };
        let value = match storage.as_deref() {
            None | Some("NULL") => SqlValue::Null,
            Some("INTEGER" | "INT8" | "BIGINT" | "BOOLEAN") => {
                SqlValue::Int(row.try_get_unchecked::<i64, _>(i)?)
            }
            Some("REAL" | "FLOAT" | "DOUBLE") => SqlValue::Float(row.try_get_unchecked::<f64, _>(i)?),
            Some("BLOB") => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(i)?),
            Some(_) => SqlValue::Text(row.try_get_unchecked::<String, _>(i)?),
        };
        columns.push(String::from(column.name()));
        values.push(value);
    }
    Ok(Row::new(columns, values))
}
