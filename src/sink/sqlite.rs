//! SQLite record sink
//!
//! Records are written one row per `accept` call into the `articles` table;
//! batches are tracked in `runs`.

use crate::crawler::ExtractedRecord;
use crate::sink::article::ArticleRow;
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use crate::sink::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite sink backend
pub struct SqliteSink {
    conn: Mutex<Connection>,
    delimiter: String,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `delimiter` - Separator used when joining list fields
    pub fn new(path: &Path, delimiter: &str) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            delimiter: delimiter.to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory(delimiter: &str) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            delimiter: delimiter.to_string(),
        })
    }

    fn lock(&self) -> SinkResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SinkError::Lock(format!("Failed to lock connection: {}", e)))
    }

    /// Counts stored articles
    pub fn count_articles(&self) -> SinkResult<u64> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Loads every stored article in insertion order
    pub fn articles(&self) -> SinkResult<Vec<ArticleRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT article_title, article_author, article_source_name, article_summary,
             article_content, article_subject, article_tags, article_main_pic,
             article_publish_date, article_url
             FROM articles ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ArticleRow {
                    title: row.get(0)?,
                    author: row.get(1)?,
                    source_name: row.get(2)?,
                    summary: row.get(3)?,
                    content: row.get(4)?,
                    subject: row.get(5)?,
                    tags: row.get(6)?,
                    main_pic: row.get(7)?,
                    publish_date: row.get(8)?,
                    url: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> SinkResult<Option<RunRecord>> {
        let conn = self.lock()?;
        let run = conn
            .query_row(
                "SELECT id, started_at, finished_at, site_count, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    /// Gets the most recent run
    pub fn latest_run(&self) -> SinkResult<Option<RunRecord>> {
        let conn = self.lock()?;
        let run = conn
            .query_row(
                "SELECT id, started_at, finished_at, site_count, status FROM runs
                 ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    /// Counts runs by status
    pub fn count_runs(&self, status: RunStatus) -> SinkResult<u64> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM runs WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        site_count: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
    })
}

impl RecordSink for SqliteSink {
    fn accept(&self, record: &ExtractedRecord) -> SinkResult<()> {
        let row = ArticleRow::from_record(record, &self.delimiter);
        self.lock()?.execute(
            "INSERT INTO articles (article_title, article_author, article_source_name,
             article_summary, article_content, article_subject, article_tags,
             article_main_pic, article_publish_date, article_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.title,
                row.author,
                row.source_name,
                row.summary,
                row.content,
                row.subject,
                row.tags,
                row.main_pic,
                row.publish_date,
                row.url
            ],
        )?;
        Ok(())
    }

    fn begin_batch(&self, site_count: usize) -> SinkResult<i64> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO runs (started_at, site_count, status) VALUES (?1, ?2, ?3)",
            params![now, site_count as i64, RunStatus::Running.to_db_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn finish_batch(&self, run_id: i64, status: RunStatus) -> SinkResult<()> {
        let now = Utc::now().to_rfc3339();
        self.lock()?.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        Ok(())
    }
}
