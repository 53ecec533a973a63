//! Record mapping.
//!
//! A [`Record`] is a row type with an explicit, ordered list of column
//! descriptors. The mapping is usually generated with
//! `#[derive(Record)]` from `rowcraft-derive`:
//!
//! ```rust
//! use rowcraft_core::{Record, SqlValue};
//! use rowcraft_derive::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[column(name = "id")]
//!     id: i64,
//!     #[column(name = "name")]
//!     name: String,
//!     #[column(name = "post_count", alias)]
//!     posts: i32,
//!     // Not mapped, invisible to queries.
//!     cache: Vec<u8>,
//! }
//!
//! let user = User { id: 1, name: String::from("Ann"), ..Default::default() };
//! assert_eq!(User::columns().len(), 3);
//! assert_eq!(user.value("name"), Some(SqlValue::Text(String::from("Ann"))));
//! assert!(!User::columns()[2].table_column);
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;
use tracing::trace;

use crate::value::SqlValue;

/// Declared type of a mapped field, driving row coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// `i16`
    Short,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `String`
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Mapping of one struct field to one result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name in the database or result set.
    pub name: &'static str,
    /// Rust field name.
    pub field: &'static str,
    /// Declared field type.
    pub kind: FieldKind,
    /// `false` for computed or alias-only columns, which are read from
    /// results but never written by insert or update.
    pub table_column: bool,
}

/// Errors raised while assigning a value to a record field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The record has no field mapped to this column.
    #[error("no field mapped to column `{0}`")]
    UnknownColumn(String),

    /// The value cannot be represented by the field type.
    #[error("cannot assign {value:?} to {kind} column `{column}`")]
    Mismatch {
        /// Target column.
        column: String,
        /// Declared field type.
        kind: FieldKind,
        /// Rejected value.
        value: SqlValue,
    },
}

/// A row type with an explicit field/column mapping.
pub trait Record: Default + 'static {
    /// Mapped columns, in declaration order.
    fn columns() -> &'static [ColumnInfo];

    /// Current value of the field mapped to `column`.
    fn value(&self, column: &str) -> Option<SqlValue>;

    /// Assigns `value` to the field mapped to `column`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] if no field is mapped to `column` or the value
    /// does not fit the field type.
    fn set_value(&mut self, column: &str, value: SqlValue) -> Result<(), FieldError>;
}

/// A Rust type usable as a mapped field.
pub trait FieldValue: Sized {
    /// Declared kind of the field.
    const KIND: FieldKind;

    /// Converts the field to a value.
    fn to_sql_value(&self) -> SqlValue;

    /// Converts a value back, or `None` if it does not fit.
    fn from_sql_value(value: SqlValue) -> Option<Self>;
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(b),
            SqlValue::Int(n) => Some(n != 0),
            SqlValue::Text(s) => parse_bool(&s),
            _ => None,
        }
    }
}

/// Parses `1`/`0`/`true`/`false`, case-insensitive.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text == "1" || text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text == "0" || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

macro_rules! int_field_value {
    ($($ty:ty => $kind:ident),*) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Int(i64::from(*self))
                }

                fn from_sql_value(value: SqlValue) -> Option<Self> {
                    match value {
                        SqlValue::Int(n) => <$ty>::try_from(n).ok(),
                        SqlValue::Bool(b) => Some(<$ty>::from(b)),
                        SqlValue::Text(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_field_value!(i16 => Short, i32 => Int, i64 => Long);

impl FieldValue for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(f) => Some(f as Self),
            SqlValue::Int(n) => Some(n as Self),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Double;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(f) => Some(f),
            SqlValue::Int(n) => Some(n as Self),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_sql_value(value: SqlValue) -> Option<Self> {
        value.to_text()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, FieldValue::to_sql_value)
    }

    fn from_sql_value(value: SqlValue) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_sql_value(value).map(Some)
    }
}

/// Cached lookup structure over [`Record::columns`].
#[derive(Debug)]
pub struct FieldIndex {
    columns: &'static [ColumnInfo],
    by_name: HashMap<&'static str, usize>,
}

impl FieldIndex {
    fn new(columns: &'static [ColumnInfo]) -> Self {
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name, i))
            .collect();
        Self { columns, by_name }
    }

    /// Mapped columns in declaration order.
    #[must_use]
    pub const fn columns(&self) -> &'static [ColumnInfo] {
        self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'static ColumnInfo> {
        let columns = self.columns;
        self.by_name.get(column).map(|&i| &columns[i])
    }

    /// Returns whether a field is mapped to `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.by_name.contains_key(column)
    }

    /// Iterates the columns written by insert and update.
    pub fn table_columns(&self) -> impl Iterator<Item = &'static ColumnInfo> {
        self.columns.iter().filter(|column| column.table_column)
    }
}

type IndexCache = RwLock<HashMap<TypeId, Arc<FieldIndex>>>;

static FIELD_INDEXES: OnceLock<IndexCache> = OnceLock::new();

/// Returns the field index of `R`, building it on first access.
///
/// Population happens once per type under the write lock; later calls only
/// take the read lock.
pub fn field_index<R: Record>() -> Arc<FieldIndex> {
    let cache = FIELD_INDEXES.get_or_init(IndexCache::default);
    let key = TypeId::of::<R>();

    if let Some(index) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(index);
    }

    let mut indexes = cache.write().unwrap_or_else(PoisonError::into_inner);
    let index = indexes.entry(key).or_insert_with(|| {
        trace!(record = type_name::<R>(), "populating field index");
        Arc::new(FieldIndex::new(R::columns()))
    });
    Arc::clone(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Pair {
        left: i32,
        right: Option<String>,
    }

    impl Record for Pair {
        fn columns() -> &'static [ColumnInfo] {
            const COLUMNS: &[ColumnInfo] = &[
                ColumnInfo {
                    name: "left",
                    field: "left",
                    kind: FieldKind::Int,
                    table_column: true,
                },
                ColumnInfo {
                    name: "right_value",
                    field: "right",
                    kind: FieldKind::Text,
                    table_column: false,
                },
            ];
            COLUMNS
        }

        fn value(&self, column: &str) -> Option<SqlValue> {
            match column {
                "left" => Some(self.left.to_sql_value()),
                "right_value" => Some(self.right.to_sql_value()),
                _ => None,
            }
        }

        fn set_value(&mut self, column: &str, value: SqlValue) -> Result<(), FieldError> {
            match column {
                "left" => {
                    self.left = FieldValue::from_sql_value(value.clone()).ok_or(
                        FieldError::Mismatch {
                            column: String::from(column),
                            kind: FieldKind::Int,
                            value,
                        },
                    )?;
                    Ok(())
                }
                _ => Err(FieldError::UnknownColumn(String::from(column))),
            }
        }
    }

    #[test]
    fn test_field_index_is_cached() {
        let first = field_index::<Pair>();
        let second = field_index::<Pair>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.columns().len(), 2);
        assert_eq!(first.get("right_value").map(|c| c.field), Some("right"));
        assert!(!first.contains("right"));
        let table: Vec<&str> = first.table_columns().map(|c| c.name).collect();
        assert_eq!(table, vec!["left"]);
    }

    #[test]
    fn test_field_index_concurrent_first_access() {
        #[derive(Default)]
        struct Fresh;

        impl Record for Fresh {
            fn columns() -> &'static [ColumnInfo] {
                &[]
            }

            fn value(&self, _column: &str) -> Option<SqlValue> {
                None
            }

            fn set_value(&mut self, column: &str, _value: SqlValue) -> Result<(), FieldError> {
                Err(FieldError::UnknownColumn(String::from(column)))
            }
        }

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(field_index::<Fresh>))
            .collect();
        let indexes: Vec<Arc<FieldIndex>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(indexes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_set_value_mismatch() {
        let mut pair = Pair::default();
        let err = pair
            .set_value("left", SqlValue::Int(i64::MAX))
            .unwrap_err();
        assert!(matches!(err, FieldError::Mismatch { kind: FieldKind::Int, .. }));
        assert_eq!(pair.left, 0);
        assert!(pair.right.is_none());
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(bool::from_sql_value(SqlValue::Text(String::from("TRUE"))), Some(true));
        assert_eq!(bool::from_sql_value(SqlValue::Int(0)), Some(false));
        assert_eq!(bool::from_sql_value(SqlValue::Text(String::from("yes"))), None);
        assert_eq!(i16::from_sql_value(SqlValue::Int(70_000)), None);
        assert_eq!(i64::from_sql_value(SqlValue::Text(String::from(" 42 "))), Some(42));
        assert_eq!(f64::from_sql_value(SqlValue::Int(3)), Some(3.0));
        assert_eq!(Option::<i32>::from_sql_value(SqlValue::Null), Some(None));
        assert_eq!(i32::from_sql_value(SqlValue::Null), None);
        assert_eq!(
            String::from_sql_value(SqlValue::Int(5)),
            Some(String::from("5"))
        );
        assert_eq!(<Option<f32> as FieldValue>::KIND, FieldKind::Float);
    }
}
