//! Stored books: save, enumerate, load and delete

use std::sync::Arc;

use anyhow::{bail, Result};

use super::book::{Book, BookRecord};
use super::progress::ProgressStore;
use super::storage::{Namespace, Storage};

#[derive(Clone)]
pub struct BookLibrary {
    storage: Arc<dyn Storage>,
    progress: ProgressStore,
}

impl BookLibrary {
    pub fn new(storage: Arc<dyn Storage>, progress: ProgressStore) -> Self {
        Self { storage, progress }
    }

    /// Store a book under its id, replacing any book with the same id.
    pub fn save(&self, book: &Book) -> Result<()> {
        if book.id().is_empty() {
            bail!("Book has no name");
        }
        let raw = serde_json::to_string(&book.to_record())?;
        self.storage.write(Namespace::Books, book.id(), &raw)?;
        tracing::info!(book_id = book.id(), words = book.word_count(), "Book saved to library");
        Ok(())
    }

    pub fn load(&self, book_id: &str) -> Option<Book> {
        match self.storage.read(Namespace::Books, book_id) {
            Ok(Some(raw)) => BookRecord::parse(&raw).map(BookRecord::into_book),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(book_id, error = %e, "Failed to read book");
                None
            }
        }
    }

    /// All readable books, newest first. Malformed records are left out.
    pub fn list(&self) -> Vec<Book> {
        let keys = match self.storage.list(Namespace::Books) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list library");
                return Vec::new();
            }
        };

        let mut books: Vec<Book> = keys
            .iter()
            .filter_map(|key| {
                let book = self.load(key);
                if book.is_none() {
                    tracing::warn!(key = %key, "Skipping invalid book record");
                }
                book
            })
            .collect();

        books.sort_by(|a, b| b.added_at().cmp(&a.added_at()).then_with(|| a.id().cmp(b.id())));
        books
    }

    /// Remove a book together with its reading progress.
    pub fn delete(&self, book_id: &str) -> Result<()> {
        self.storage.delete(Namespace::Books, book_id)?;
        self.progress.clear(book_id);
        tracing::info!(book_id, "Book deleted from library");
        Ok(())
    }
}
