//! Tests for the `#[derive(Record)]` macro output and row materialization.

mod common;

use common::{text, RecordingConnection};
use rowcraft_core::{
    field_index, materialize, FieldError, FieldKind, Query, Record, Row, SqlValue,
};
use rowcraft_derive::Record;

#[derive(Debug, Default, PartialEq, Record)]
pub struct Account {
    #[column]
    pub id: i64,
    #[column(name = "user_name")]
    pub name: String,
    #[column(name = "is_active")]
    pub active: bool,
    #[column]
    pub level: i16,
    #[column]
    pub score: f64,
    #[column]
    pub ratio: f32,
    #[column]
    pub nickname: Option<String>,
    #[column(name = "post_count", alias)]
    pub posts: i32,
    pub transient: Vec<u8>,
}

// =============================================================================
// Mapping
// =============================================================================

#[test]
fn test_columns_in_declaration_order() {
    let names: Vec<&str> = Account::columns().iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec!["id", "user_name", "is_active", "level", "score", "ratio", "nickname", "post_count"]
    );
}

#[test]
fn test_column_kinds() {
    let kinds: Vec<FieldKind> = Account::columns().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Long,
            FieldKind::Text,
            FieldKind::Bool,
            FieldKind::Short,
            FieldKind::Double,
            FieldKind::Float,
            FieldKind::Text,
            FieldKind::Int,
        ]
    );
}

#[test]
fn test_alias_column_is_not_a_table_column() {
    let index = field_index::<Account>();
    let posts = index.get("post_count").unwrap();
    assert_eq!(posts.field, "posts");
    assert!(!posts.table_column);
    assert_eq!(index.table_columns().count(), 7);
}

#[test]
fn test_unannotated_field_is_invisible() {
    assert!(!field_index::<Account>().contains("transient"));
    let account = Account::default();
    assert_eq!(account.value("transient"), None);
}

#[test]
fn test_value_reads_fields() {
    let account = Account {
        id: 3,
        name: String::from("ann"),
        active: true,
        nickname: None,
        ..Account::default()
    };
    assert_eq!(account.value("id"), Some(SqlValue::Int(3)));
    assert_eq!(account.value("user_name"), Some(text("ann")));
    assert_eq!(account.value("is_active"), Some(SqlValue::Bool(true)));
    assert_eq!(account.value("nickname"), Some(SqlValue::Null));
}

#[test]
fn test_set_value_errors() {
    let mut account = Account::default();
    assert_eq!(
        account.set_value("nope", SqlValue::Int(1)),
        Err(FieldError::UnknownColumn(String::from("nope")))
    );
    assert!(matches!(
        account.set_value("level", SqlValue::Int(100_000)),
        Err(FieldError::Mismatch { kind: FieldKind::Short, .. })
    ));
    account.set_value("nickname", text("al")).unwrap();
    assert_eq!(account.nickname.as_deref(), Some("al"));
}

// =============================================================================
// Materialization
// =============================================================================

#[test]
fn test_materialize_coerces_text_values() {
    let row = Row::from_pairs([
        ("id", text("12")),
        ("user_name", text("bob")),
        ("is_active", text("TRUE")),
        ("level", SqlValue::Int(2)),
        ("score", text("9.5")),
        ("ratio", SqlValue::Float(0.25)),
        ("nickname", text("b")),
        ("post_count", SqlValue::Int(40)),
    ]);
    let account: Account = materialize(&row);
    assert_eq!(
        account,
        Account {
            id: 12,
            name: String::from("bob"),
            active: true,
            level: 2,
            score: 9.5,
            ratio: 0.25,
            nickname: Some(String::from("b")),
            posts: 40,
            transient: Vec::new(),
        }
    );
}

#[test]
fn test_materialize_skips_absent_columns() {
    let row = Row::from_pairs([("id", SqlValue::Int(1)), ("unrelated", text("x"))]);
    let account: Account = materialize(&row);
    assert_eq!(account.id, 1);
    assert_eq!(account.name, "");
}

#[test]
fn test_materialize_failure_keeps_default() {
    let row = Row::from_pairs([
        ("id", text("not a number")),
        ("is_active", SqlValue::Int(7)),
        ("user_name", text("kept")),
    ]);
    let account: Account = materialize(&row);
    assert_eq!(account.id, 0);
    assert!(!account.active);
    assert_eq!(account.name, "kept");
}

#[test]
fn test_materialize_null() {
    let row = Row::from_pairs([
        ("id", SqlValue::Null),
        ("nickname", SqlValue::Null),
        ("is_active", SqlValue::Int(1)),
    ]);
    let account: Account = materialize(&row);
    assert_eq!(account.id, 0);
    assert_eq!(account.nickname, None);
    assert!(account.active);
}

// =============================================================================
// Query integration
// =============================================================================

#[test]
fn test_get_returns_typed_records() {
    let conn = RecordingConnection::with_rows(vec![
        Row::from_pairs([("id", SqlValue::Int(1)), ("user_name", text("a"))]),
        Row::from_pairs([("id", SqlValue::Int(2)), ("user_name", text("b"))]),
    ]);
    let accounts = Query::<Account>::new(&conn, "account")
        .select(&["id", "user_name"])
        .where_eq("is_active", true)
        .get()
        .unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].name, "b");
    assert_eq!(
        conn.last_statement(),
        "select `id`, `user_name` from `account` where `is_active` = '1'"
    );
}

#[test]
fn test_first_on_empty_result() {
    let conn = RecordingConnection::new();
    let found = Query::<Account>::new(&conn, "account")
        .where_eq("id", 99)
        .first()
        .unwrap();
    assert!(found.is_none());
    assert_eq!(
        conn.last_statement(),
        "select * from `account` where `id` = '99' limit 1"
    );
}
