//! Playback control methods

use crate::model::{TickOutcome, TickToken, WPM_STEP};

use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        let model = self.model.lock().await;
        if !model.has_open_book().await {
            model.set_status("Open a book from the library first".to_string()).await;
            return;
        }

        let was_playing = model.get_reader_snapshot().await.is_playing();
        let playing = model.toggle_playback().await;
        let snapshot = model.get_reader_snapshot().await;
        if playing {
            tracing::info!(book_id = ?snapshot.book_id, index = snapshot.index, wpm = snapshot.wpm, "Playback resumed");
        } else if was_playing {
            tracing::info!(book_id = ?snapshot.book_id, index = snapshot.index, "Playback paused");
        } else {
            model.set_status("Nothing left to read. Press r to start over".to_string()).await;
        }
    }

    pub async fn seek_forward(&self) {
        let model = self.model.lock().await;
        model.seek_forward().await;
    }

    pub async fn seek_backward(&self) {
        let model = self.model.lock().await;
        model.seek_backward().await;
    }

    pub async fn reset_playback(&self) {
        let model = self.model.lock().await;
        model.reset_playback().await;
        tracing::info!("Reading position reset");
    }

    pub async fn speed_up(&self) {
        let model = self.model.lock().await;
        let wpm = model.adjust_wpm(WPM_STEP).await;
        model.set_status(format!("{} wpm", wpm)).await;
    }

    pub async fn slow_down(&self) {
        let model = self.model.lock().await;
        let wpm = model.adjust_wpm(-WPM_STEP).await;
        model.set_status(format!("{} wpm", wpm)).await;
    }

    /// Deliver a timer tick to the session.
    pub async fn handle_tick(&self, token: TickToken) {
        let model = self.model.lock().await;
        if model.tick(token).await == TickOutcome::Finished {
            model.set_status("Finished! Press r to read again".to_string()).await;
        }
    }
}
