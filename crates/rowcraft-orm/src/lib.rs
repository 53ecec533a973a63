//! # rowcraft-orm
//!
//! Active-record style models for rowcraft.
//!
//! This crate provides:
//! - The [`Model`] trait: table binding, primary keys, fillable/guarded/hidden
//!   column policies and lifecycle hooks
//! - Insert/update parameter computation from live model state
//! - `insert`, `update`, `save`, `find` and `delete` driven through
//!   [`rowcraft_core::Query`]
//!
//! ## Quick Start
//!
//! ```rust
//! use rowcraft_derive::Record;
//! use rowcraft_orm::Model;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[column]
//!     id: i64,
//!     #[column]
//!     name: String,
//!     #[column]
//!     password: String,
//! }
//!
//! impl Model for User {
//!     fn table_name() -> &'static str {
//!         "user"
//!     }
//!
//!     fn guarded() -> Option<&'static [&'static str]> {
//!         Some(&["password"])
//!     }
//! }
//!
//! let user = User { id: 0, name: String::from("ann"), password: String::from("x") };
//! let params = user.calc_insert_params().unwrap();
//! assert_eq!(params.columns().collect::<Vec<_>>(), vec!["name"]);
//! assert!(!user.exists());
//! ```

pub mod error;
pub mod model;

pub use error::{OrmError, Result};
pub use model::{Model, DEFAULT_ROW_ID};
