//! # rowcraft-sqlite
//!
//! SQLite backend for rowcraft.
//!
//! This crate provides:
//! - [`SqliteGrammar`]: the generic operator set plus `ilike` (rendered as
//!   `like`) and the bitwise operators `&`, `|`, `<<`, `>>`
//! - [`SqliteConnection`]: a blocking [`Connection`](rowcraft_core::Connection)
//!   over sqlx, configured through [`SqliteConfig`]
//! - [`upsert`] and [`SqliteModelExt::upsert`] for `INSERT ... ON CONFLICT`
//!
//! # How SQLite differs from other dialects
//!
//! - **[UPSERT]**: SQLite supports `INSERT ... ON CONFLICT DO NOTHING` and
//!   `ON CONFLICT DO UPDATE SET ...` (since SQLite 3.24.0). The conflict
//!   target must be covered by a primary key or unique index.
//! - **Identifier quoting**: SQLite accepts backticks as well as double
//!   quotes and square brackets. See [SQLite keywords].
//! - **[Type affinity]**: quoted literals such as `'42'` are converted to the
//!   declared affinity of the column they are stored in or compared with,
//!   which is why every value can be rendered as a string literal.
//! - **`last_insert_rowid()`**: generated ids are per connection, so the
//!   insert and the id lookup must share a session.
//!
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//! [SQLite keywords]: https://www.sqlite.org/lang_keywords.html
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use rowcraft_core::{Connection, Params, Query, Row};
//! use rowcraft_sqlite::{upsert, SqliteConnection};
//!
//! let conn = SqliteConnection::open_in_memory().unwrap();
//! conn.execute("create table users (id integer primary key, name text)").unwrap();
//!
//! let query: Query<'_> = Query::new(&conn, "users");
//! let insert = Params::new().with("id", 1).with("name", "Alice");
//! let update = Params::new().with("name", "Alice");
//! upsert(&query, &insert, &update, &["id"]).unwrap();
//! upsert(&query, &insert, &Params::new().with("name", "Alicia"), &["id"]).unwrap();
//!
//! let rows = Query::<'_, Row>::new(&conn, "users").fetch_rows().unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].get("name").and_then(|v| v.to_text()).as_deref(), Some("Alicia"));
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod grammar;
pub mod upsert;

pub use config::SqliteConfig;
pub use connection::SqliteConnection;
pub use error::{Result, SqliteError};
pub use grammar::SqliteGrammar;
pub use upsert::{compile_upsert, upsert, SqliteModelExt};
