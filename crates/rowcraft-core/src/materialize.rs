//! Row materialization.
//!
//! Turns raw [`Row`]s into typed records through the cached
//! [`FieldIndex`](crate::record::FieldIndex). Coercion failures are isolated
//! per field: they are logged and the field keeps its default.

use std::any::type_name;

use tracing::{trace, warn};

use crate::connection::Row;
use crate::record::{field_index, parse_bool, FieldKind, Record};
use crate::value::SqlValue;

/// Builds one `R` from `row`.
///
/// Mapped columns absent from the row are skipped. NULL is assigned as
/// [`SqlValue::Null`], so `Option` fields become `None` and other fields
/// keep their default.
#[must_use]
pub fn materialize<R: Record>(row: &Row) -> R {
    let index = field_index::<R>();
    let mut record = R::default();

    for column in index.columns() {
        let Some(value) = row.get(column.name) else {
            continue;
        };
        let Some(text) = value.to_text() else {
            // Non-optional fields reject null and stay at their default.
            if let Err(err) = record.set_value(column.name, SqlValue::Null) {
                trace!(
                    record = type_name::<R>(),
                    column = column.name,
                    error = %err,
                    "null column left field at its default"
                );
            }
            continue;
        };
        let assigned = coerce(column.kind, &text)
            .map(|coerced| record.set_value(column.name, coerced));
        match assigned {
            Some(Ok(())) => {}
            Some(Err(err)) => warn!(
                record = type_name::<R>(),
                column = column.name,
                value = %text,
                error = %err,
                "failed to assign column value"
            ),
            None => warn!(
                record = type_name::<R>(),
                column = column.name,
                value = %text,
                kind = %column.kind,
                "failed to coerce column value"
            ),
        }
    }
    record
}

/// Builds one `R` per row, in order.
#[must_use]
pub fn materialize_all<R: Record>(rows: &[Row]) -> Vec<R> {
    rows.iter().map(materialize::<R>).collect()
}

/// Parses the textual form of a column according to the field kind.
fn coerce(kind: FieldKind, text: &str) -> Option<SqlValue> {
    let trimmed = text.trim();
    match kind {
        FieldKind::Bool => parse_bool(trimmed).map(SqlValue::Bool),
        FieldKind::Short => trimmed.parse::<i16>().ok().map(|n| SqlValue::Int(n.into())),
        FieldKind::Int => trimmed.parse::<i32>().ok().map(|n| SqlValue::Int(n.into())),
        FieldKind::Long => trimmed.parse::<i64>().ok().map(SqlValue::Int),
        FieldKind::Float => trimmed.parse::<f32>().ok().map(|f| SqlValue::Float(f.into())),
        FieldKind::Double => trimmed.parse::<f64>().ok().map(SqlValue::Float),
        FieldKind::Text => Some(SqlValue::Text(String::from(text))),
    }
}
