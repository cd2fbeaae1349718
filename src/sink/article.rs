//! Fixed article row written by storage sinks

use crate::crawler::{ExtractedRecord, FieldValue};
use serde::Serialize;

/// Stored in place of a scalar field the page did not provide
pub const ABSENT_SCALAR: &str = "-";

/// A record flattened onto the article columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRow {
    pub title: String,
    pub author: String,
    pub source_name: String,
    pub summary: String,
    pub content: String,
    pub subject: String,
    pub tags: String,
    pub main_pic: String,
    pub publish_date: String,
    pub url: String,
}

impl ArticleRow {
    /// Maps `article_*` fields onto the row
    ///
    /// Absent scalars become `"-"`; absent tags become an empty string. List
    /// values are joined with `delimiter`. Fields outside the fixed set are
    /// ignored.
    pub fn from_record(record: &ExtractedRecord, delimiter: &str) -> Self {
        let scalar = |field: &str| {
            record
                .get(field)
                .and_then(|value| joined(value, delimiter))
                .unwrap_or_else(|| ABSENT_SCALAR.to_string())
        };

        Self {
            title: scalar("article_title"),
            author: scalar("article_author"),
            source_name: scalar("article_source_name"),
            summary: scalar("article_summary"),
            content: scalar("article_content"),
            subject: scalar("article_subject"),
            tags: record
                .get("article_tags")
                .and_then(|value| joined(value, delimiter))
                .unwrap_or_default(),
            main_pic: scalar("article_main_pic"),
            publish_date: scalar("article_publish_date"),
            url: record.article_url().to_string(),
        }
    }
}

fn joined(value: &FieldValue, delimiter: &str) -> Option<String> {
    match value {
        FieldValue::Single(value) => value.clone(),
        FieldValue::Many(values) if values.is_empty() => None,
        FieldValue::Many(values) => Some(values.join(delimiter)),
    }
}
