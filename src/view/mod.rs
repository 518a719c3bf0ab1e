//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists, centering)
//! - `layout`: Main layout structure (top bar, library sidebar)
//! - `reader`: The flashing word
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod reader;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ReaderSnapshot, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, snapshot: &ReaderSnapshot, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Book title / import prompt + speed
                Constraint::Min(0),    // Main content (sidebar + reader)
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], snapshot, ui_state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Library
                Constraint::Percentage(70), // Reader
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, snapshot.book_id.as_deref());
        reader::render_reader(frame, main_chunks[1], snapshot, ui_state);

        progress::render_progress_bar(
            frame,
            chunks[2],
            snapshot,
            ui_state.status_message.as_deref(),
        );

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::model::PlaybackState;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_current_word_and_progress() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let snapshot = ReaderSnapshot {
            book_id: Some("fox.txt".to_string()),
            word: "brown".to_string(),
            index: 2,
            total_words: 4,
            percent: 50.0,
            wpm: 300,
            state: PlaybackState::Playing,
        };
        let ui_state = UiState::default();

        terminal
            .draw(|f| AppView::render(f, &snapshot, &ui_state))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("brown"));
        assert!(text.contains("50% completed"));
        assert!(text.contains("300 wpm"));
        assert!(text.contains("fox.txt"));
    }

    #[test]
    fn renders_help_over_everything() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let snapshot = ReaderSnapshot {
            book_id: None,
            word: String::new(),
            index: 0,
            total_words: 0,
            percent: 0.0,
            wpm: 300,
            state: PlaybackState::Stopped,
        };
        let ui_state = UiState {
            show_help_popup: true,
            ..UiState::default()
        };

        terminal
            .draw(|f| AppView::render(f, &snapshot, &ui_state))
            .unwrap();

        assert!(buffer_text(&terminal).contains("Help (H or Esc to close)"));
    }
}
