//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Dynascrape database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl batches
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    site_count INTEGER NOT NULL,
    status TEXT NOT NULL
);

-- Extracted articles
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_title TEXT,
    article_author TEXT,
    article_source_name TEXT,
    article_summary TEXT,
    article_content TEXT,
    article_subject TEXT,
    article_tags TEXT,
    article_main_pic TEXT,
    article_publish_date TEXT,
    article_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(article_url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
