//! Core type definitions for the application

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::book::Book;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Reader,
    Library,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Reader => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Reader,
        }
    }
}

/// A stored book as shown in the library sidebar
#[derive(Clone, Debug)]
pub struct LibraryItem {
    pub id: String,
    pub word_count: usize,
    pub progress: usize,
    pub added_at: Option<DateTime<Utc>>,
}

impl LibraryItem {
    pub fn from_book(book: &Book, progress: usize) -> Self {
        Self {
            id: book.id().to_string(),
            word_count: book.word_count(),
            progress,
            added_at: book.added_at(),
        }
    }

    pub fn percent(&self) -> u16 {
        if self.word_count == 0 {
            return 0;
        }
        ((self.progress as f64 / self.word_count as f64) * 100.0).min(100.0) as u16
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub library_items: Vec<LibraryItem>,
    pub library_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    /// Path being typed in the import prompt, when it is open
    pub import_input: Option<String>,
    pub status_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Library,
            library_items: vec![],
            library_selected: 0,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            import_input: None,
            status_message: None,
        }
    }
}
