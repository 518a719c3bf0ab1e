//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Ctrl+C always quits, even from overlays
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle import prompt: every printable key goes into the path
        if model.is_import_prompt_open().await {
            match key.code {
                KeyCode::Enter => {
                    drop(model);
                    self.submit_import().await;
                }
                KeyCode::Esc => {
                    model.close_import_prompt().await;
                }
                KeyCode::Backspace => {
                    model.backspace_import().await;
                }
                KeyCode::Char(c) => {
                    model.append_to_import(c).await;
                }
                _ => {}
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        if ui_state.active_section == ActiveSection::Library {
            match key.code {
                KeyCode::Up => {
                    model.move_selection_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.move_selection_down().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    drop(model);
                    self.open_selected_book().await;
                    return Ok(());
                }
                KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                    drop(model);
                    self.delete_selected_book().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        if ui_state.active_section == ActiveSection::Reader {
            match key.code {
                KeyCode::Char(' ') => {
                    drop(model);
                    self.toggle_playback().await;
                    return Ok(());
                }
                KeyCode::Left => {
                    drop(model);
                    self.seek_backward().await;
                    return Ok(());
                }
                KeyCode::Right => {
                    drop(model);
                    self.seek_forward().await;
                    return Ok(());
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    drop(model);
                    self.reset_playback().await;
                    return Ok(());
                }
                KeyCode::Esc => {
                    drop(model);
                    self.close_book().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                model.cycle_section().await;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                model.open_import_prompt().await;
            }
            // Speed up
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.speed_up().await;
            }
            // Slow down
            KeyCode::Char('-') => {
                drop(model);
                self.slow_down().await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
