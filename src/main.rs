mod config;
mod controller;
mod extract;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use config::Cli;
use controller::AppController;
use model::{clamp_wpm, AppModel, FileStorage, MemoryStorage, ReaderSettings, Storage, TickToken};
use view::AppView;

/// Redraw at least this often so timed overlays expire without input.
const IDLE_REDRAW: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_dir()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== PulseRead Starting ===");

    let storage: Arc<dyn Storage> = match std::fs::create_dir_all(&cli.data_dir) {
        Ok(()) => {
            let storage = FileStorage::new(&cli.data_dir);
            tracing::debug!(root = %storage.root().display(), "Using file storage");
            Arc::new(storage)
        }
        Err(e) => {
            tracing::error!(data_dir = %cli.data_dir.display(), error = %e, "Data directory unavailable, nothing will be saved");
            eprintln!("Warning: {} is not writable, progress will not be saved", cli.data_dir.display());
            Arc::new(MemoryStorage::new())
        }
    };

    let settings = ReaderSettings::load(&storage);
    let wpm = cli.wpm.map(clamp_wpm).unwrap_or(settings.wpm);
    tracing::info!(wpm, data_dir = %cli.data_dir.display(), "Reader configured");

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();

    let app_model = AppModel::new(storage, wpm, tick_tx, progress_tx);
    let progress_writer = app_model.progress_store().spawn_writer(progress_rx);

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone());

    controller.load_library().await;
    if let Some(path) = &cli.file {
        controller.import_file(path).await;
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller, tick_rx).await;

    // Restore terminal, but save progress before reporting any failure
    let restored = restore_terminal(&mut terminal);
    if let Err(err) = &restored {
        tracing::error!(error = %err, "Failed to restore terminal");
    }

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    flush_progress(model, progress_writer).await;

    tracing::info!("PulseRead shutting down");
    restored?;
    res
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Drop the model and wait for the writer to persist every queued position.
///
/// Dropping the last model handle stops playback and closes the progress
/// channel, which ends the writer once it has drained.
async fn flush_progress(model: Arc<Mutex<AppModel>>, writer: JoinHandle<()>) {
    drop(model);
    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "Progress writer did not finish cleanly");
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    mut ticks: UnboundedReceiver<TickToken>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(IDLE_REDRAW);

    loop {
        // Get current state
        let (snapshot, ui_state, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_reader_snapshot().await,
                model_guard.get_ui_state().await,
                model_guard.should_quit().await,
            )
        };

        if should_quit {
            break;
        }

        terminal.draw(|f| {
            AppView::render(f, &snapshot, &ui_state);
        })?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if let Err(e) = controller.handle_key_event(key).await {
                        tracing::warn!(error = %e, "Key handling failed");
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(token) = ticks.recv() => {
                controller.handle_tick(token).await;
            }
            _ = redraw.tick() => {}
        }
    }

    // Stop the timer so no tick outlives the loop
    model.lock().await.pause().await;

    Ok(())
}
