//! Reader pane: the flashing word

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, PlaybackState, ReaderSnapshot, UiState};

/// Index of the letter the eye should rest on.
pub fn focus_letter(word: &str) -> usize {
    match word.chars().count() {
        0..=1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// The word split around its focus letter, padded so the focus letter
/// lands on column `center`.
fn focused_word(word: &str, center: usize) -> Line<'static> {
    let chars: Vec<char> = word.chars().collect();
    let focus = focus_letter(word).min(chars.len().saturating_sub(1));

    let before: String = chars[..focus].iter().collect();
    let pivot: String = chars.get(focus).map(|c| c.to_string()).unwrap_or_default();
    let after: String = chars.iter().skip(focus + 1).collect();
    let padding = " ".repeat(center.saturating_sub(focus));

    let word_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::raw(padding),
        Span::styled(before, word_style),
        Span::styled(pivot, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::styled(after, word_style),
    ])
}

pub fn render_reader(frame: &mut Frame, area: Rect, snapshot: &ReaderSnapshot, ui_state: &UiState) {
    let border_style = if ui_state.active_section == ActiveSection::Reader {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Reader ")
        .title_alignment(Alignment::Center)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }
    let center_y = inner.y + inner.height / 2;
    let word_row = Rect::new(inner.x, center_y, inner.width, 1);

    if snapshot.book_id.is_none() {
        let hint = Paragraph::new("Select a book in the library and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, word_row);
        return;
    }

    if snapshot.state == PlaybackState::Finished {
        let done = Paragraph::new(snapshot.word.clone())
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(done, word_row);
        return;
    }

    // Guides above and below the focus column
    let center_x = inner.width / 2;
    let marker_style = Style::default().fg(Color::DarkGray);
    if center_y >= inner.y + 2 {
        let marker = Paragraph::new("|").style(marker_style);
        frame.render_widget(marker, Rect::new(inner.x + center_x, center_y - 2, 1, 1));
    }
    if center_y + 2 < inner.y + inner.height {
        let marker = Paragraph::new("|").style(marker_style);
        frame.render_widget(marker, Rect::new(inner.x + center_x, center_y + 2, 1, 1));
    }

    let word = Paragraph::new(focused_word(&snapshot.word, center_x as usize));
    frame.render_widget(word, word_row);
}
