//! Layout rendering (top bar, library sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, ReaderSnapshot, UiState};
use super::utils::{render_scrollable_list, truncate_string};

pub fn render_top_bar(frame: &mut Frame, area: Rect, snapshot: &ReaderSnapshot, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Book title / import prompt
            Constraint::Length(14), // Speed
        ])
        .split(area);

    let (title, text, style) = match &ui_state.import_input {
        Some(input) => (
            " Import (Enter to open, Esc to cancel) ",
            format!("{}▏", input),
            Style::default().fg(Color::Green),
        ),
        None => (
            " Book ",
            snapshot
                .book_id
                .clone()
                .unwrap_or_else(|| "No book open. Press o to import one".to_string()),
            Style::default().fg(Color::White),
        ),
    };

    let book = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(if ui_state.import_input.is_some() {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(book, chunks[0]);

    let speed = Paragraph::new(format!("{} wpm", snapshot.wpm))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Speed "));
    frame.render_widget(speed, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, open_book: Option<&str>) {
    let is_focused = ui_state.active_section == ActiveSection::Library;
    // borders + padding + " 100%"
    let name_width = (area.width as usize).saturating_sub(4 + 5);

    let items: Vec<ListItem> = ui_state
        .library_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ui_state.library_selected && is_focused {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if open_book == Some(item.id.as_str()) {
                Style::default().fg(Color::Cyan)
            } else if i == ui_state.library_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let text = format!(
                "{}{:>4}%",
                truncate_string(&item.id, name_width),
                item.percent()
            );
            ListItem::new(text).style(style)
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if items.is_empty() {
        let empty = Paragraph::new("No books yet.\n\nPress o to import\na text file.")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Library ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Library ({}) ", ui_state.library_items.len()))
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    let selected = ui_state.library_items.get(ui_state.library_selected);
    if let Some(added_at) = selected.and_then(|item| item.added_at) {
        let added = format!(" added {} ", added_at.format("%Y-%m-%d"));
        block = block.title_bottom(Line::from(added).right_aligned());
    }

    render_scrollable_list(frame, area, items, ui_state.library_selected, block);
}
