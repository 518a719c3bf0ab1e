//! Word pacing engine
//!
//! Owns the position within a book's word sequence, the play/pause state and
//! the repeating timer that advances it. Timer tasks never touch the engine
//! directly: they send [`TickToken`]s to the event loop, which hands them back
//! through [`PlaybackEngine::tick`]. Every `play()` issues a fresh token, so a
//! tick that was already queued when playback was paused, restarted or torn
//! down no longer matches and is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::progress::ProgressUpdate;

/// Shown in place of a word once nothing is left to read
pub const DONE_SENTINEL: &str = "Done!";
/// Words skipped by a single seek
pub const SEEK_STEP: usize = 10;

static NEXT_TICK_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies the timer started by one `play()` call. Unique per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

impl TickToken {
    fn issue() -> Self {
        Self(NEXT_TICK_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    /// Reached by running out of words; behaves like `Stopped`.
    Finished,
}

/// What a delivered tick did to the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(usize),
    Finished,
    Ignored,
}

/// Time between two words at `wpm` words per minute.
pub fn tick_period(wpm: u32) -> Duration {
    Duration::from_micros(60_000_000 / u64::from(wpm.max(1)))
}

/// Next index after one tick, or `None` when the sequence is exhausted.
fn next_index(index: usize, len: usize) -> Option<usize> {
    let next = index + 1;
    (next < len).then_some(next)
}

struct TickTimer {
    token: TickToken,
    handle: JoinHandle<()>,
}

impl TickTimer {
    fn start(token: TickToken, period: Duration, ticks: UnboundedSender<TickToken>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(token).is_err() {
                    break;
                }
            }
        });
        Self { token, handle }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct PlaybackEngine {
    book_id: String,
    words: Arc<[String]>,
    index: usize,
    state: PlaybackState,
    wpm: u32,
    timer: Option<TickTimer>,
    ticks: UnboundedSender<TickToken>,
    progress: UnboundedSender<ProgressUpdate>,
}

impl PlaybackEngine {
    /// Build a stopped engine. `start_index` is clamped to the word count.
    pub fn new(
        book_id: impl Into<String>,
        words: Arc<[String]>,
        start_index: usize,
        wpm: u32,
        ticks: UnboundedSender<TickToken>,
        progress: UnboundedSender<ProgressUpdate>,
    ) -> Self {
        let index = start_index.min(words.len());
        Self {
            book_id: book_id.into(),
            words,
            index,
            state: PlaybackState::Stopped,
            wpm: wpm.max(1),
            timer: None,
            ticks,
            progress,
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn current_word(&self) -> &str {
        if self.state == PlaybackState::Finished {
            return DONE_SENTINEL;
        }
        self.words
            .get(self.index)
            .map(String::as_str)
            .unwrap_or(DONE_SENTINEL)
    }

    /// Share of the book already read, in percent. An empty book is at 0.
    pub fn percent_complete(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.index as f64 / self.words.len() as f64 * 100.0).min(100.0)
    }

    #[cfg(test)]
    pub(crate) fn active_token(&self) -> Option<TickToken> {
        self.timer.as_ref().map(|timer| timer.token)
    }

    /// Start (or restart) advancing. Returns `false` when there is no next word.
    pub fn play(&mut self) -> bool {
        if next_index(self.index, self.words.len()).is_none() {
            tracing::debug!(book_id = %self.book_id, index = self.index, "Nothing left to play");
            return false;
        }

        let token = TickToken::issue();
        // Replacing the timer drops (and aborts) the previous one
        self.timer = Some(TickTimer::start(token, tick_period(self.wpm), self.ticks.clone()));
        self.state = PlaybackState::Playing;
        tracing::debug!(book_id = %self.book_id, index = self.index, wpm = self.wpm, "Playback started");
        true
    }

    pub fn pause(&mut self) {
        self.cancel_timer();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
            tracing::debug!(book_id = %self.book_id, index = self.index, "Playback paused");
        }
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    pub fn reset(&mut self) {
        self.cancel_timer();
        self.state = PlaybackState::Stopped;
        self.index = 0;
        self.emit_progress();
        tracing::debug!(book_id = %self.book_id, "Playback reset");
    }

    /// Jump ahead, never past the last word.
    pub fn seek_forward(&mut self, step: usize) {
        let last = self.words.len().saturating_sub(1);
        self.index = self.index.saturating_add(step).min(last);
        self.after_seek();
    }

    pub fn seek_backward(&mut self, step: usize) {
        self.index = self.index.saturating_sub(step);
        self.after_seek();
    }

    /// Change the rate. A running timer restarts at the new period.
    pub fn set_wpm(&mut self, wpm: u32) {
        let wpm = wpm.max(1);
        if wpm == self.wpm {
            return;
        }
        self.wpm = wpm;
        if self.is_playing() {
            self.play();
        }
    }

    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        let current = self.timer.as_ref().map(|timer| timer.token);
        if self.state != PlaybackState::Playing || current != Some(token) {
            tracing::trace!(book_id = %self.book_id, ?token, "Ignoring stale tick");
            return TickOutcome::Ignored;
        }

        match next_index(self.index, self.words.len()) {
            Some(next) => {
                self.index = next;
                self.emit_progress();
                TickOutcome::Advanced(next)
            }
            None => {
                self.cancel_timer();
                self.state = PlaybackState::Finished;
                tracing::info!(book_id = %self.book_id, words = self.words.len(), "Reached end of book");
                TickOutcome::Finished
            }
        }
    }

    /// Cancel the timer without touching the position (view teardown).
    pub fn stop(&mut self) {
        self.cancel_timer();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
        }
    }

    fn after_seek(&mut self) {
        if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Stopped;
        }
        self.emit_progress();
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    fn emit_progress(&self) {
        let update = ProgressUpdate {
            book_id: self.book_id.clone(),
            index: self.index,
        };
        if self.progress.send(update).is_err() {
            tracing::warn!(book_id = %self.book_id, index = self.index, "Progress writer is gone, position not saved");
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    struct Harness {
        engine: PlaybackEngine,
        ticks: UnboundedReceiver<TickToken>,
        progress: UnboundedReceiver<ProgressUpdate>,
    }

    impl Harness {
        fn new(text: &str, start_index: usize, wpm: u32) -> Self {
            let words: Arc<[String]> = crate::model::tokenizer::tokenize(text).into();
            let (tick_tx, ticks) = mpsc::unbounded_channel();
            let (progress_tx, progress) = mpsc::unbounded_channel();
            let engine = PlaybackEngine::new("book.pdf", words, start_index, wpm, tick_tx, progress_tx);
            Self { engine, ticks, progress }
        }

        fn fire(&mut self) -> TickOutcome {
            let token = self.engine.active_token().expect("timer running");
            self.engine.tick(token)
        }

        fn saved(&mut self) -> Vec<usize> {
            let mut saved = Vec::new();
            while let Ok(update) = self.progress.try_recv() {
                saved.push(update.index);
            }
            saved
        }
    }

    fn numbered(count: usize) -> String {
        (0..count).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn tick_period_follows_wpm() {
        assert_eq!(tick_period(300), Duration::from_millis(200));
        assert_eq!(tick_period(600), Duration::from_millis(100));
        assert_eq!(tick_period(0), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn ticks_advance_one_word_each_and_stop_on_last_word() {
        let mut h = Harness::new("the quick brown fox", 0, 600);
        assert!(h.engine.play());

        for expected in 1..=3 {
            assert_eq!(h.fire(), TickOutcome::Advanced(expected));
        }
        assert_eq!(h.engine.index(), 3);
        assert_eq!(h.engine.current_word(), "fox");
        assert!(h.engine.is_playing());

        assert_eq!(h.fire(), TickOutcome::Finished);
        assert!(!h.engine.is_playing());
        assert_eq!(h.engine.state(), PlaybackState::Finished);
        assert_eq!(h.engine.index(), 3);
        assert_eq!(h.engine.current_word(), DONE_SENTINEL);
        assert_eq!(h.engine.active_token(), None);

        // The terminal tick is not persisted
        assert_eq!(h.saved(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_per_period() {
        let mut h = Harness::new("the quick brown fox", 0, 600);
        let started = Instant::now();
        assert!(h.engine.play());

        for _ in 0..3 {
            let token = h.ticks.recv().await.unwrap();
            h.engine.tick(token);
        }

        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert_eq!(h.engine.index(), 3);
        assert_eq!(h.engine.current_word(), "fox");

        let token = h.ticks.recv().await.unwrap();
        assert_eq!(h.engine.tick(token), TickOutcome::Finished);
        assert!(!h.engine.is_playing());
        assert_eq!(h.engine.index(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_pending_ticks() {
        let mut h = Harness::new(&numbered(10), 0, 600);
        assert!(h.engine.play());
        let token = h.engine.active_token().unwrap();

        h.engine.pause();
        assert_eq!(h.engine.tick(token), TickOutcome::Ignored);
        assert_eq!(h.engine.index(), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.ticks.try_recv().is_err());
    }

    #[tokio::test]
    async fn restarting_invalidates_the_previous_token() {
        let mut h = Harness::new(&numbered(10), 0, 300);
        assert!(h.engine.play());
        let first = h.engine.active_token().unwrap();
        assert!(h.engine.play());
        let second = h.engine.active_token().unwrap();

        assert_ne!(first, second);
        assert_eq!(h.engine.tick(first), TickOutcome::Ignored);
        assert_eq!(h.engine.tick(second), TickOutcome::Advanced(1));
    }

    #[tokio::test]
    async fn pause_is_idempotent() {
        let mut h = Harness::new(&numbered(5), 2, 300);
        assert!(h.engine.play());
        h.engine.pause();
        h.engine.pause();
        assert_eq!(h.engine.state(), PlaybackState::Stopped);
        assert_eq!(h.engine.index(), 2);
        assert!(h.saved().is_empty());
    }

    #[tokio::test]
    async fn reset_returns_to_start_from_any_state() {
        let mut h = Harness::new(&numbered(5), 0, 300);
        assert!(h.engine.play());
        h.fire();
        h.fire();
        h.engine.reset();
        assert_eq!(h.engine.index(), 0);
        assert_eq!(h.engine.state(), PlaybackState::Stopped);
        assert_eq!(h.saved(), vec![1, 2, 0]);

        let mut finished = Harness::new("one two", 0, 300);
        assert!(finished.engine.play());
        finished.fire();
        finished.fire();
        assert_eq!(finished.engine.state(), PlaybackState::Finished);
        finished.engine.reset();
        assert_eq!(finished.engine.index(), 0);
        assert_eq!(finished.engine.current_word(), "one");
        assert_eq!(finished.saved(), vec![1, 0]);
    }

    #[test]
    fn seeks_clamp_to_real_words() {
        let mut h = Harness::new(&numbered(20), 5, 300);
        h.engine.seek_backward(SEEK_STEP);
        assert_eq!(h.engine.index(), 0);

        let mut h = Harness::new(&numbered(20), 15, 300);
        h.engine.seek_forward(SEEK_STEP);
        assert_eq!(h.engine.index(), 19);
        h.engine.seek_forward(SEEK_STEP);
        assert_eq!(h.engine.index(), 19);
        assert_eq!(h.saved(), vec![19, 19]);
    }

    #[tokio::test]
    async fn seeking_keeps_playing() {
        let mut h = Harness::new(&numbered(30), 0, 300);
        assert!(h.engine.play());
        let token = h.engine.active_token().unwrap();
        h.engine.seek_forward(SEEK_STEP);
        assert!(h.engine.is_playing());
        assert_eq!(h.engine.tick(token), TickOutcome::Advanced(11));
    }

    #[test]
    fn empty_book_is_done_immediately() {
        let mut h = Harness::new("", 0, 300);
        assert_eq!(h.engine.len(), 0);
        assert_eq!(h.engine.percent_complete(), 0.0);
        assert_eq!(h.engine.current_word(), DONE_SENTINEL);
        assert!(!h.engine.play());
        assert_eq!(h.engine.state(), PlaybackState::Stopped);

        h.engine.seek_forward(SEEK_STEP);
        h.engine.seek_backward(SEEK_STEP);
        assert_eq!(h.engine.index(), 0);
    }

    #[test]
    fn play_on_last_word_is_rejected() {
        let mut h = Harness::new("one two three", 2, 300);
        assert!(!h.engine.play());
        assert_eq!(h.engine.state(), PlaybackState::Stopped);
        assert_eq!(h.engine.current_word(), "three");
    }

    #[test]
    fn start_index_is_clamped_to_word_count() {
        let h = Harness::new("one two three", 99, 300);
        assert_eq!(h.engine.index(), 3);
        assert_eq!(h.engine.current_word(), DONE_SENTINEL);
        assert_eq!(h.engine.percent_complete(), 100.0);
    }

    #[test]
    fn percent_complete_tracks_index() {
        let h = Harness::new("the quick brown fox", 3, 300);
        assert_eq!(h.engine.percent_complete(), 75.0);
        let h = Harness::new("the quick brown fox", 0, 300);
        assert_eq!(h.engine.percent_complete(), 0.0);
    }

    #[tokio::test]
    async fn rate_change_restarts_running_timer() {
        let mut h = Harness::new(&numbered(10), 0, 300);
        assert!(h.engine.play());
        let before = h.engine.active_token().unwrap();

        h.engine.set_wpm(600);
        assert_eq!(h.engine.wpm(), 600);
        assert!(h.engine.is_playing());
        assert_ne!(h.engine.active_token(), Some(before));

        h.engine.set_wpm(0);
        assert_eq!(h.engine.wpm(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_engine_stops_its_timer() {
        let mut h = Harness::new(&numbered(10), 0, 600);
        assert!(h.engine.play());
        let Harness { engine, mut ticks, .. } = h;
        drop(engine);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(ticks.try_recv().is_err());
    }
}
