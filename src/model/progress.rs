//! Per-book reading progress persistence
//!
//! Storage failures stop here: callers always get an index back and writes
//! never fail from their point of view.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::storage::{Namespace, Storage};

/// Notification emitted by the playback engine whenever its index changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub book_id: String,
    pub index: usize,
}

#[derive(Clone)]
pub struct ProgressStore {
    storage: Arc<dyn Storage>,
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Saved word index for `book_id`, or 0 when missing or unreadable.
    pub fn get(&self, book_id: &str) -> usize {
        match self.storage.read(Namespace::Progress, book_id) {
            Ok(Some(raw)) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::debug!(book_id, raw = %raw.trim(), "Malformed progress record, starting from 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(book_id, error = %e, "Failed to read progress");
                0
            }
        }
    }

    pub fn set(&self, book_id: &str, index: usize) {
        if let Err(e) = self
            .storage
            .write(Namespace::Progress, book_id, &index.to_string())
        {
            tracing::warn!(book_id, index, error = %e, "Failed to save progress");
        } else {
            tracing::trace!(book_id, index, "Progress saved");
        }
    }

    pub fn clear(&self, book_id: &str) {
        if let Err(e) = self.storage.delete(Namespace::Progress, book_id) {
            tracing::warn!(book_id, error = %e, "Failed to clear progress");
        }
    }

    /// Persist engine notifications until every sender is gone.
    pub fn spawn_writer(&self, mut updates: UnboundedReceiver<ProgressUpdate>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                store.set(&update.book_id, update.index);
            }
            tracing::debug!("Progress writer finished");
        })
    }
}
