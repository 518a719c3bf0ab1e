//! Library navigation, importing and deleting books

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::extract;
use super::AppController;

/// Book id for an imported file: its file name.
fn book_id_for(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("Cannot import {}: no file name", path.display()))
}

impl AppController {
    pub async fn load_library(&self) {
        let model = self.model.lock().await;
        model.refresh_library().await;
        let count = model.get_ui_state().await.library_items.len();
        tracing::info!(books = count, "Library loaded");
    }

    pub async fn open_selected_book(&self) {
        let model = self.model.lock().await;
        let Some(item) = model.get_selected_library_item().await else {
            return;
        };

        match model.load_book(&item.id) {
            Some(book) => model.open_book(&book, None).await,
            None => {
                tracing::warn!(book_id = %item.id, "Selected book could not be loaded");
                model.set_error(format!("Could not open {}", item.id)).await;
                model.refresh_library().await;
            }
        }
    }

    pub async fn delete_selected_book(&self) {
        let model = self.model.lock().await;
        let Some(item) = model.get_selected_library_item().await else {
            return;
        };

        match model.delete_book(&item.id).await {
            Ok(()) => model.set_status(format!("Deleted {}", item.id)).await,
            Err(e) => model.set_error(Self::format_error(&e)).await,
        }
    }

    pub async fn close_book(&self) {
        let model = self.model.lock().await;
        model.close_book().await;
    }

    /// Submit the import prompt.
    pub async fn submit_import(&self) {
        let input = {
            let model = self.model.lock().await;
            model.take_import_input().await
        };
        let Some(input) = input else {
            return;
        };
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        self.import_file(&PathBuf::from(input)).await;
    }

    /// Extract a document, store it as a book and start reading it.
    ///
    /// Any failure is reported once and leaves the library untouched.
    pub async fn import_file(&self, path: &Path) {
        tracing::info!(path = %path.display(), "Importing document");

        match self.try_import(path).await {
            Ok(book_id) => {
                tracing::info!(book_id = %book_id, "Document imported");
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Import failed");
                let model = self.model.lock().await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    async fn try_import(&self, path: &Path) -> Result<String> {
        let book_id = book_id_for(path)?;
        // Extraction can be slow; the model stays unlocked meanwhile
        let text = extract::extract_file(path).await?;

        let model = self.model.lock().await;
        let book = model.add_book(&book_id, text)?;
        model.refresh_library().await;
        model.open_book(&book, None).await;
        Ok(book_id)
    }
}
