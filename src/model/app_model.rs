//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use super::book::Book;
use super::engine::{TickOutcome, TickToken};
use super::library::BookLibrary;
use super::progress::{ProgressStore, ProgressUpdate};
use super::session::{ReaderSnapshot, ReadingSession};
use super::settings::ReaderSettings;
use super::storage::Storage;
use super::types::{ActiveSection, LibraryItem, UiState};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel {
    storage: Arc<dyn Storage>,
    progress: ProgressStore,
    library: BookLibrary,
    session: Arc<Mutex<ReadingSession>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(
        storage: Arc<dyn Storage>,
        wpm: u32,
        ticks: UnboundedSender<TickToken>,
        progress_updates: UnboundedSender<ProgressUpdate>,
    ) -> Self {
        let progress = ProgressStore::new(storage.clone());
        let library = BookLibrary::new(storage.clone(), progress.clone());
        let session = ReadingSession::new(progress.clone(), wpm, ticks, progress_updates);
        Self {
            storage,
            progress,
            library,
            session: Arc::new(Mutex::new(session)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn progress_store(&self) -> ProgressStore {
        self.progress.clone()
    }

    // ========================================================================
    // Reading session
    // ========================================================================

    pub async fn get_reader_snapshot(&self) -> ReaderSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn open_book(&self, book: &Book, start_index: Option<usize>) {
        self.session.lock().await.open_book(book, start_index);
        let mut state = self.ui_state.lock().await;
        state.active_section = ActiveSection::Reader;
        state.status_message = None;
    }

    pub async fn close_book(&self) {
        self.session.lock().await.close();
        self.refresh_library().await;
        self.set_active_section(ActiveSection::Library).await;
    }

    pub async fn has_open_book(&self) -> bool {
        self.session.lock().await.is_open()
    }

    pub async fn toggle_playback(&self) -> bool {
        self.session.lock().await.toggle()
    }

    pub async fn pause(&self) {
        self.session.lock().await.pause();
    }

    pub async fn reset_playback(&self) {
        self.session.lock().await.reset();
    }

    pub async fn seek_forward(&self) {
        self.session.lock().await.seek_forward();
    }

    pub async fn seek_backward(&self) {
        self.session.lock().await.seek_backward();
    }

    pub async fn tick(&self, token: TickToken) -> TickOutcome {
        self.session.lock().await.tick(token)
    }

    /// Change the speed by `delta` wpm and remember it for the next start.
    pub async fn adjust_wpm(&self, delta: i32) -> u32 {
        let wpm = self.session.lock().await.adjust_wpm(delta);
        ReaderSettings { wpm }.save(&self.storage);
        wpm
    }

    // ========================================================================
    // Library
    // ========================================================================

    /// Save an imported book, stamping it with the import time.
    pub fn add_book(&self, id: &str, text: String) -> Result<Book> {
        let book = Book::new(id, text).with_added_at(Utc::now());
        self.library.save(&book)?;
        Ok(book)
    }

    pub async fn refresh_library(&self) {
        let items: Vec<LibraryItem> = self
            .library
            .list()
            .iter()
            .map(|book| LibraryItem::from_book(book, self.progress.get(book.id())))
            .collect();

        let mut state = self.ui_state.lock().await;
        state.library_selected = state.library_selected.min(items.len().saturating_sub(1));
        state.library_items = items;
    }

    pub async fn get_selected_library_item(&self) -> Option<LibraryItem> {
        let state = self.ui_state.lock().await;
        state.library_items.get(state.library_selected).cloned()
    }

    pub fn load_book(&self, book_id: &str) -> Option<Book> {
        self.library.load(book_id)
    }

    /// Delete a stored book; an open session on it is closed first.
    pub async fn delete_book(&self, book_id: &str) -> Result<()> {
        {
            let mut session = self.session.lock().await;
            if session.book_id() == Some(book_id) {
                session.close();
            }
        }
        let result = self.library.delete(book_id);
        crate::log_storage_result!("delete_book", result);
        self.refresh_library().await;
        result
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.library_selected > 0 {
            state.library_selected -= 1;
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.library_selected < state.library_items.len().saturating_sub(1) {
            state.library_selected += 1;
        }
    }

    pub async fn set_status(&self, message: String) {
        self.ui_state.lock().await.status_message = Some(message);
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn open_import_prompt(&self) {
        self.ui_state.lock().await.import_input = Some(String::new());
    }

    pub async fn close_import_prompt(&self) {
        self.ui_state.lock().await.import_input = None;
    }

    pub async fn is_import_prompt_open(&self) -> bool {
        self.ui_state.lock().await.import_input.is_some()
    }

    pub async fn append_to_import(&self, c: char) {
        if let Some(input) = self.ui_state.lock().await.import_input.as_mut() {
            input.push(c);
        }
    }

    pub async fn backspace_import(&self) {
        if let Some(input) = self.ui_state.lock().await.import_input.as_mut() {
            input.pop();
        }
    }

    /// Close the prompt and hand back what was typed.
    pub async fn take_import_input(&self) -> Option<String> {
        self.ui_state.lock().await.import_input.take()
    }
}
