//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackState, ReaderSnapshot};
use super::utils::{format_remaining, whole_percent};

pub fn progress_label(snapshot: &ReaderSnapshot) -> String {
    format!("{}% completed", whole_percent(snapshot.percent))
}

pub fn render_progress_bar(
    frame: &mut Frame,
    area: Rect,
    snapshot: &ReaderSnapshot,
    status_message: Option<&str>,
) {
    let status_text = match (&snapshot.book_id, snapshot.state) {
        (None, _) => " No book open".to_string(),
        (Some(book), PlaybackState::Playing) => format!(" ▶ {}", book),
        (Some(book), PlaybackState::Stopped) => format!(" ⏸ {}", book),
        (Some(book), PlaybackState::Finished) => format!(" ■ {}", book),
    };

    let position = if snapshot.total_words > 0 {
        let words_left = snapshot.total_words.saturating_sub(snapshot.index + 1);
        format!(
            " Word {} / {} | {} left ",
            (snapshot.index + 1).min(snapshot.total_words),
            snapshot.total_words,
            format_remaining(words_left, snapshot.wpm)
        )
    } else {
        String::new()
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ", status_text))
        .title_bottom(Line::from(position).right_aligned());
    if let Some(status) = status_message {
        block = block.title_bottom(Line::from(format!(" {} ", status)).left_aligned());
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((snapshot.percent / 100.0).clamp(0.0, 1.0))
        .label(progress_label(snapshot));

    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_shows_whole_percent() {
        let snapshot = ReaderSnapshot {
            book_id: Some("fox.txt".to_string()),
            word: "fox".to_string(),
            index: 3,
            total_words: 4,
            percent: 75.0,
            wpm: 300,
            state: PlaybackState::Finished,
        };
        assert_eq!(progress_label(&snapshot), "75% completed");
    }
}
