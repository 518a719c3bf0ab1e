//! Reading session: binds the open book and the chosen speed to an engine

use tokio::sync::mpsc::UnboundedSender;

use super::book::Book;
use super::engine::{PlaybackEngine, PlaybackState, TickOutcome, TickToken, SEEK_STEP};
use super::progress::{ProgressStore, ProgressUpdate};

pub const DEFAULT_WPM: u32 = 300;
pub const MIN_WPM: u32 = 100;
pub const MAX_WPM: u32 = 1500;
pub const WPM_STEP: i32 = 10;

/// Clamp a requested speed to what the reader offers.
pub fn clamp_wpm(wpm: u32) -> u32 {
    wpm.clamp(MIN_WPM, MAX_WPM)
}

/// Everything the reader view needs for one frame
#[derive(Clone, Debug)]
pub struct ReaderSnapshot {
    pub book_id: Option<String>,
    pub word: String,
    pub index: usize,
    pub total_words: usize,
    pub percent: f64,
    pub wpm: u32,
    pub state: PlaybackState,
}

impl ReaderSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

pub struct ReadingSession {
    engine: Option<PlaybackEngine>,
    wpm: u32,
    store: ProgressStore,
    ticks: UnboundedSender<TickToken>,
    progress: UnboundedSender<ProgressUpdate>,
}

impl ReadingSession {
    pub fn new(
        store: ProgressStore,
        wpm: u32,
        ticks: UnboundedSender<TickToken>,
        progress: UnboundedSender<ProgressUpdate>,
    ) -> Self {
        Self {
            engine: None,
            wpm: clamp_wpm(wpm),
            store,
            ticks,
            progress,
        }
    }

    /// Replace the current engine with one for `book`.
    ///
    /// An explicit `start_index` wins over the stored progress.
    pub fn open_book(&mut self, book: &Book, start_index: Option<usize>) {
        self.close();

        let start = start_index.unwrap_or_else(|| self.store.get(book.id()));
        tracing::info!(
            book_id = book.id(),
            start,
            explicit = start_index.is_some(),
            words = book.word_count(),
            "Opening book"
        );

        self.engine = Some(PlaybackEngine::new(
            book.id(),
            book.words(),
            start,
            self.wpm,
            self.ticks.clone(),
            self.progress.clone(),
        ));
    }

    /// Stop the timer, save the final position and drop the engine.
    ///
    /// The position is written directly so that reopening the book or
    /// listing the library sees it even before the writer task catches up.
    pub fn close(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
            self.store.set(engine.book_id(), engine.index());
            tracing::debug!(book_id = engine.book_id(), index = engine.index(), "Closed book");
        }
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    pub fn book_id(&self) -> Option<&str> {
        self.engine.as_ref().map(PlaybackEngine::book_id)
    }

    pub fn set_wpm(&mut self, wpm: u32) -> u32 {
        self.wpm = clamp_wpm(wpm);
        if let Some(engine) = self.engine.as_mut() {
            engine.set_wpm(self.wpm);
        }
        tracing::debug!(wpm = self.wpm, "Reading speed changed");
        self.wpm
    }

    pub fn adjust_wpm(&mut self, delta: i32) -> u32 {
        self.set_wpm(self.wpm.saturating_add_signed(delta))
    }

    pub fn toggle(&mut self) -> bool {
        self.engine.as_mut().is_some_and(PlaybackEngine::toggle)
    }

    pub fn pause(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
        }
    }

    pub fn reset(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
    }

    pub fn seek_forward(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.seek_forward(SEEK_STEP);
        }
    }

    pub fn seek_backward(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.seek_backward(SEEK_STEP);
        }
    }

    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        match self.engine.as_mut() {
            Some(engine) => engine.tick(token),
            None => TickOutcome::Ignored,
        }
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        match &self.engine {
            Some(engine) => ReaderSnapshot {
                book_id: Some(engine.book_id().to_string()),
                word: engine.current_word().to_string(),
                index: engine.index(),
                total_words: engine.len(),
                percent: engine.percent_complete(),
                wpm: engine.wpm(),
                state: engine.state(),
            },
            None => ReaderSnapshot {
                book_id: None,
                word: String::new(),
                index: 0,
                total_words: 0,
                percent: 0.0,
                wpm: self.wpm,
                state: PlaybackState::Stopped,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use crate::model::engine::DONE_SENTINEL;
    use crate::model::storage::MemoryStorage;

    fn numbered(count: usize) -> String {
        (0..count).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn session() -> (ReadingSession, ProgressStore, UnboundedReceiver<ProgressUpdate>) {
        let store = ProgressStore::new(Arc::new(MemoryStorage::new()));
        let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let session = ReadingSession::new(store.clone(), DEFAULT_WPM, tick_tx, progress_tx);
        (session, store, progress_rx)
    }

    #[test]
    fn resumes_from_stored_progress() {
        let (mut session, store, _rx) = session();
        let book = Book::new("long.pdf", numbered(100));
        store.set("long.pdf", 50);

        session.open_book(&book, None);
        assert_eq!(session.snapshot().index, 50);
        assert_eq!(session.snapshot().word, "w50");
    }

    #[test]
    fn explicit_start_index_overrides_stored_progress() {
        let (mut session, store, _rx) = session();
        let book = Book::new("long.pdf", numbered(100));
        store.set("long.pdf", 50);

        session.open_book(&book, Some(0));
        assert_eq!(session.snapshot().index, 0);
    }

    #[tokio::test]
    async fn switching_books_cancels_the_old_timer() {
        let (mut session, _store, _rx) = session();
        let first = Book::new("first.pdf", numbered(10));
        let second = Book::new("second.pdf", numbered(10));

        session.open_book(&first, Some(0));
        assert!(session.toggle());
        let stale = session.engine.as_ref().and_then(PlaybackEngine::active_token).unwrap();

        session.open_book(&second, Some(4));
        assert_eq!(session.tick(stale), TickOutcome::Ignored);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.book_id.as_deref(), Some("second.pdf"));
        assert_eq!(snapshot.index, 4);
        assert!(!snapshot.is_playing());
    }

    #[tokio::test]
    async fn close_stops_playback_and_ignores_ticks() {
        let (mut session, _store, _rx) = session();
        session.open_book(&Book::new("a.pdf", numbered(10)), None);
        assert!(session.toggle());
        let token = session.engine.as_ref().and_then(PlaybackEngine::active_token).unwrap();

        session.close();
        assert!(!session.is_open());
        assert_eq!(session.tick(token), TickOutcome::Ignored);
        assert!(session.snapshot().book_id.is_none());
    }

    #[tokio::test]
    async fn reset_is_persisted_through_the_writer() {
        let store = ProgressStore::new(Arc::new(MemoryStorage::new()));
        store.set("a.pdf", 7);
        let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let writer = store.spawn_writer(progress_rx);

        let mut session = ReadingSession::new(store.clone(), DEFAULT_WPM, tick_tx, progress_tx);
        session.open_book(&Book::new("a.pdf", numbered(20)), None);
        assert_eq!(session.snapshot().index, 7);
        session.seek_forward();
        session.reset();
        drop(session);
        writer.await.unwrap();

        assert_eq!(store.get("a.pdf"), 0);
    }

    #[test]
    fn reopening_sees_position_before_the_writer_runs() {
        let (mut session, store, _rx) = session();
        let book = Book::new("a.pdf", numbered(30));

        session.open_book(&book, None);
        session.seek_forward();
        session.close();
        assert_eq!(store.get("a.pdf"), 10);

        session.open_book(&book, None);
        assert_eq!(session.snapshot().index, 10);
    }

    #[test]
    fn switching_books_saves_the_one_left_behind() {
        let (mut session, store, _rx) = session();
        let first = Book::new("first.pdf", numbered(30));
        let second = Book::new("second.pdf", numbered(30));

        session.open_book(&first, None);
        session.seek_forward();
        session.seek_forward();
        session.open_book(&second, None);

        assert_eq!(store.get("first.pdf"), 20);
        session.open_book(&first, None);
        assert_eq!(session.snapshot().index, 20);
    }

    #[test]
    fn speed_is_clamped_to_reader_range() {
        let (mut session, _store, _rx) = session();
        assert_eq!(session.set_wpm(0), MIN_WPM);
        assert_eq!(session.set_wpm(10_000), MAX_WPM);
        assert_eq!(session.set_wpm(450), 450);
        assert_eq!(session.adjust_wpm(WPM_STEP), 460);
        assert_eq!(session.adjust_wpm(-1000), MIN_WPM);
    }

    #[test]
    fn commands_without_a_book_are_noops() {
        let (mut session, _store, mut rx) = session();
        assert!(!session.toggle());
        session.seek_forward();
        session.reset();
        assert!(rx.try_recv().is_err());
        assert_eq!(session.snapshot().total_words, 0);
    }

    #[test]
    fn empty_book_shows_done_and_cannot_play() {
        let (mut session, _store, _rx) = session();
        session.open_book(&Book::new("empty.pdf", ""), None);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.word, DONE_SENTINEL);
        assert_eq!(snapshot.percent, 0.0);
        assert!(!session.toggle());
    }
}
