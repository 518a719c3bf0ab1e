//! Book data and its persisted record form

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokenizer::tokenize;

/// An imported book: identity, text, and the words derived from it once.
#[derive(Clone, Debug)]
pub struct Book {
    id: String,
    content: Arc<str>,
    words: Arc<[String]>,
    added_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content: String = content.into();
        let words: Arc<[String]> = tokenize(&content).into();
        Self {
            id: id.into(),
            content: content.into(),
            words,
            added_at: None,
        }
    }

    pub fn with_added_at(mut self, added_at: DateTime<Utc>) -> Self {
        self.added_at = Some(added_at);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Shared handle to the word sequence; cloning does not copy the words.
    pub fn words(&self) -> Arc<[String]> {
        Arc::clone(&self.words)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.added_at
    }

    pub fn to_record(&self) -> BookRecord {
        BookRecord {
            id: self.id.clone(),
            content: self.content().to_string(),
            added_at: self.added_at,
        }
    }
}

/// On-disk representation of a book.
///
/// Older records stored the identifier under `name`, which is still accepted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(alias = "name")]
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl BookRecord {
    /// Parse a stored record, rejecting anything without an id or text.
    pub fn parse(raw: &str) -> Option<Self> {
        let record: BookRecord = serde_json::from_str(raw).ok()?;
        if record.id.is_empty() || record.content.is_empty() {
            return None;
        }
        Some(record)
    }

    pub fn into_book(self) -> Book {
        let book = Book::new(self.id, self.content);
        match self.added_at {
            Some(added_at) => book.with_added_at(added_at),
            None => book,
        }
    }
}
