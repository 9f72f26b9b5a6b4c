use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beehive_core::{ensure_data_dir, BeehiveConfig, BeehiveError, CliErrorDisplay, Session, Wiring};

mod app;
mod events;
mod forms;
mod theme;
mod ui;

use app::App;

fn main() -> Result<()> {
    let config = BeehiveConfig::load().context("Failed to load configuration")?;
    let session = match config.session() {
        Ok(session) => session,
        Err(e) => {
            eprint!("{}", CliErrorDisplay::new(&BeehiveError::from(e)));
            std::process::exit(1);
        }
    };

    setup_logging(&config)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &config, session);
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Application error: {e}");
        return Err(e);
    }

    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file.
fn setup_logging(config: &BeehiveConfig) -> Result<()> {
    let path = if config.logging.file_path.is_empty() {
        ensure_data_dir()?.join("beehive-tui.log")
    } else {
        PathBuf::from(&config.logging.file_path)
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json_format {
        registry
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &BeehiveConfig,
    session: Session,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let wiring = Wiring::new(config, session)?;
        let mut app = App::new(config, &wiring);
        app.run(terminal).await
    })
}
