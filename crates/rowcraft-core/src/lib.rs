//! # rowcraft-core
//!
//! An injection-safe SQL query builder with dialect grammars and explicit
//! record mapping.
//!
//! This crate provides:
//! - A chainable [`Query`] builder compiling select, insert, update and
//!   delete statements through a dialect [`Grammar`]
//! - Escaping of every identifier and literal inlined into statement text
//! - A [`Record`] trait with a process-wide, per-type field index cache
//! - A row materializer turning raw result rows into typed records
//!
//! ## Building Queries
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
//!     .where_eq("deleted_at", None::<i64>)
//!     .where_in("role", ["admin", "staff"])
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "select * from `user` where `deleted_at` is null and `role` in ('admin', 'staff')"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Statements are plain text with inlined literals. Identifiers are wrapped
//! in backticks and text literals have their single quotes doubled:
//!
//! ```rust
//! use rowcraft_core::escape::{safe_literal, safe_name};
//! use rowcraft_core::SqlValue;
//!
//! let user_input = SqlValue::Text(String::from("'; DROP TABLE users; --"));
//! assert_eq!(safe_literal(&user_input), "'''; DROP TABLE users; --'");
//! assert_eq!(safe_name("users.name"), "`users`.`name`");
//! ```
//!
//! Raw clauses (`where_raw`, `select_raw`, `order_by_raw`, ...) are emitted
//! unescaped and must never carry user input.

pub mod clause;
pub mod connection;
pub mod error;
pub mod escape;
pub mod grammar;
pub mod materialize;
pub mod query;
pub mod record;
pub mod value;

pub use clause::{Direction, Expression, Join, JoinType, Joiner, Logic};
pub use connection::{Connection, Row};
pub use error::{QueryError, Result};
pub use grammar::{GenericGrammar, Grammar, UNSET};
pub use materialize::{materialize, materialize_all};
pub use query::Query;
pub use record::{field_index, ColumnInfo, FieldError, FieldIndex, FieldKind, FieldValue, Record};
pub use value::{make_db_value, Params, SqlValue, ToSqlValue};
