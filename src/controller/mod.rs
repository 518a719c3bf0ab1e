//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the reading session.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Play/pause, seeking, speed and timer ticks
//! - `navigation`: Library browsing, importing and deleting books

mod input;
mod playback;
mod navigation;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::extract::ExtractError;
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>) -> Self {
        Self { model }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        if let Some(extract_error) = error.downcast_ref::<ExtractError>() {
            return match extract_error {
                ExtractError::UnsupportedFormat(detail) => format!("Cannot import: {}", detail),
                ExtractError::InvalidEncoding => {
                    "Cannot import: the file is not readable text.".to_string()
                }
                ExtractError::Document(detail) => {
                    format!("Could not extract text from this document ({})", detail)
                }
            };
        }

        if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
            return match io_error.kind() {
                std::io::ErrorKind::NotFound => "File not found.".to_string(),
                std::io::ErrorKind::PermissionDenied => "Permission denied.".to_string(),
                _ => format!("Error: {}", io_error),
            };
        }

        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_get_friendly_messages() {
        let error = anyhow::Error::from(ExtractError::InvalidEncoding);
        assert_eq!(
            AppController::format_error(&error),
            "Cannot import: the file is not readable text."
        );
    }

    #[test]
    fn missing_files_are_reported_plainly() {
        let error = anyhow::Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(AppController::format_error(&error), "File not found.");
    }

    #[test]
    fn other_errors_fall_back_to_their_message() {
        let error = anyhow::anyhow!("Book has no name");
        assert_eq!(AppController::format_error(&error), "Error: Book has no name");
    }
}
