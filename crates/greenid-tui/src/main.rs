//! greenid - terminal admin shell for the green finance identification system.
//!
//! Provides login, a permission-filtered page menu, multi-page tabs and an
//! automatic logout after 30 minutes without keyboard or mouse activity.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use greenid_core::auth::{MemoryStorage, SessionStorage};
use greenid_core::{Config, SessionStore};

use app::{App, AppState};
use ui::input::{activity_for, handle_input};
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// How often the announcement ticker advances
const TICKER_INTERVAL: Duration = Duration::from_secs(5);

/// Log file prefix in the data directory
const LOG_FILE_PREFIX: &str = "greenid.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a daily file in the data directory; the terminal belongs to
/// the UI. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

fn print_usage() {
    eprintln!("Usage: greenid [--ephemeral | --logout]");
    eprintln!();
    eprintln!("  --ephemeral  keep the session in memory only");
    eprintln!("  --logout     clear the saved session and exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let flag = args.get(1).map(String::as_str);
    if matches!(flag, Some("--help") | Some("-h")) {
        print_usage();
        return Ok(());
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config ({}), using defaults", e);
            Config::default()
        }
    };

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let _log_guard = init_tracing(&data_dir);
    info!(api = %config.api_base_url, "greenid starting");

    if flag == Some("--logout") {
        let mut session = SessionStore::load(config.open_storage()?, config.inactivity_timeout());
        session.logout();
        eprintln!("Saved session cleared.");
        return Ok(());
    }

    let storage: Box<dyn SessionStorage> = if flag == Some("--ephemeral") {
        Box::new(MemoryStorage::new())
    } else {
        config.open_storage()?
    };

    let mut app = App::new(config, storage)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        warn!(error = %e, "Exited with error");
        eprintln!("Error: {}", e);
    }

    info!("greenid shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut last_ticker = Instant::now();

    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            let event = event::read()?;

            if let Some(activity) = activity_for(&event) {
                app.record_activity(activity);
            }

            if let Event::Key(key) = event {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Expiry and background results
        app.tick();

        if last_ticker.elapsed() >= TICKER_INTERVAL {
            app.advance_ticker();
            last_ticker = Instant::now();
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
