#![allow(dead_code)]

use rowcraft_core::Connection;
use rowcraft_derive::Record;
use rowcraft_orm::Model;
use rowcraft_sqlite::{SqliteConfig, SqliteConnection};

pub const SCHEMA: &str = "
    create table post (
        id integer primary key autoincrement,
        title text not null,
        is_published integer not null default 0,
        rating real not null default 0,
        note text
    );
    create table tag (
        label text primary key,
        color text not null
    );
";

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Post {
    #[column]
    pub id: i64,
    #[column]
    pub title: String,
    #[column(name = "is_published")]
    pub published: bool,
    #[column]
    pub rating: f64,
    #[column]
    pub note: Option<String>,
}

impl Model for Post {
    fn table_name() -> &'static str {
        "post"
    }
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Tag {
    #[column]
    pub label: String,
    #[column]
    pub color: String,
}

impl Model for Tag {
    fn table_name() -> &'static str {
        "tag"
    }

    fn primary_keys() -> &'static [&'static str] {
        &["label"]
    }

    fn auto_increment() -> bool {
        false
    }
}

/// Opens an in-memory database with the test schema.
pub fn setup() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().unwrap();
    conn.execute(SCHEMA).unwrap();
    conn
}

/// Opens a file database at `url` with the test schema.
pub fn setup_file(url: &str) -> SqliteConnection {
    let conn = SqliteConnection::open(&SqliteConfig::new(url)).unwrap();
    conn.execute(SCHEMA).unwrap();
    conn
}

pub fn post(title: &str) -> Post {
    Post {
        title: String::from(title),
        ..Post::default()
    }
}
