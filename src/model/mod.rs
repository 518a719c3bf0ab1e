//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `tokenizer`: Splitting book text into words
//! - `book`: Book data and its stored record
//! - `storage`: Namespaced key-value storage (files or memory)
//! - `progress`: Per-book reading position persistence
//! - `library`: Saving, listing and deleting books
//! - `settings`: Reader settings that survive a restart
//! - `engine`: Word pacing state machine and its tick timer
//! - `session`: The open book bound to a pacing engine
//! - `types`: UI state types
//! - `app_model`: Main application model with state management methods

mod tokenizer;
mod book;
mod storage;
mod progress;
mod library;
mod settings;
mod engine;
mod session;
mod types;
mod app_model;

pub use book::Book;

pub use storage::{FileStorage, MemoryStorage, Storage};

pub use settings::ReaderSettings;

pub use engine::{PlaybackState, TickOutcome, TickToken};

pub use session::{clamp_wpm, ReaderSnapshot, WPM_STEP};

pub use types::{ActiveSection, LibraryItem, UiState};

pub use app_model::AppModel;
