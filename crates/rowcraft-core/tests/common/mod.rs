#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use rowcraft_core::{Connection, GenericGrammar, Grammar, Result, Row, SqlValue};

/// In-memory connection recording every statement and replaying canned rows.
#[derive(Default)]
pub struct RecordingConnection {
    statements: RefCell<Vec<String>>,
    rows: RefCell<Vec<Row>>,
    last_id: Cell<i64>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned by every subsequent fetch.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        let conn = Self::default();
        conn.rows.replace(rows);
        conn
    }

    pub fn set_last_id(&self, id: i64) {
        self.last_id.set(id);
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn last_statement(&self) -> String {
        self.statements
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("no statement was recorded"))
    }
}

impl Connection for RecordingConnection {
    fn grammar(&self) -> &dyn Grammar {
        &GenericGrammar
    }

    fn execute(&self, sql: &str) -> Result<()> {
        self.statements.borrow_mut().push(String::from(sql));
        Ok(())
    }

    fn fetch(&self, sql: &str) -> Result<Vec<Row>> {
        self.statements.borrow_mut().push(String::from(sql));
        Ok(self.rows.borrow().clone())
    }

    fn last_insert_rowid(&self) -> Result<i64> {
        Ok(self.last_id.get())
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}
