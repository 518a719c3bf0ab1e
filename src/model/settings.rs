//! Reader settings that survive a restart

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::session::{clamp_wpm, DEFAULT_WPM};
use super::storage::{Namespace, Storage};

const READER_SETTINGS_KEY: &str = "reader";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderSettings {
    pub wpm: u32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self { wpm: DEFAULT_WPM }
    }
}

impl ReaderSettings {
    /// Stored settings, or defaults when missing or unreadable.
    pub fn load(storage: &Arc<dyn Storage>) -> Self {
        let raw = match storage.read(Namespace::Settings, READER_SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read settings, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<ReaderSettings>(&raw) {
            Ok(settings) => Self {
                wpm: clamp_wpm(settings.wpm),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Malformed settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &Arc<dyn Storage>) {
        let result = serde_json::to_string(self)
            .map_err(anyhow::Error::from)
            .and_then(|raw| {
                storage
                    .write(Namespace::Settings, READER_SETTINGS_KEY, &raw)
                    .map_err(anyhow::Error::from)
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to save settings");
        }
    }
}
