//! opac-tui - terminal client for the OPAC task tracker.
//!
//! Dashboard, projects, kanban and timeline boards over the task tracker's
//! REST API, or over an in-memory backend with `--demo`.

mod app;
mod theme;
mod ui;

use std::fs::File;
use std::io::{self, stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use opac_tui::config::{Cli, ClientConfig};
use opac_tui::transport::{HttpTransport, MemoryTransport, Transport};
use opac_tui::worker::{run_board_worker, BoardCommand, BoardEvent, Boards};
use opac_tui::{ApiClient, Synchronizer};

use app::{App, Tab};

/// Approximately 30 FPS
const FRAME_DURATION: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    let config = ClientConfig::from(Cli::parse());
    init_logging(config.log_file.as_deref())?;
    run_tui(config).await
}

/// Log to a file when one is given. The terminal belongs to the TUI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("OPAC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    if config.demo {
        info!("using in-memory demo backend");
        return Ok(Arc::new(MemoryTransport::demo()));
    }
    info!(url = %config.api_url, "using HTTP backend");
    let transport = HttpTransport::new(config.api_url.as_str(), config.timeout)
        .context("Failed to create HTTP client")?;
    Ok(Arc::new(transport))
}

async fn run_tui(config: ClientConfig) -> Result<()> {
    let api = ApiClient::new(build_transport(&config)?);
    let boards = Boards::new(Synchronizer::new(api), config.project);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (event_tx, mut event_rx) = mpsc::channel::<BoardEvent>(32);
    let (cmd_tx, cmd_rx) = mpsc::channel::<BoardCommand>(32);
    let worker = tokio::spawn(run_board_worker(boards, event_tx, cmd_rx));

    let start_tab = if config.project.is_some() {
        Tab::Kanban
    } else {
        Tab::Dashboard
    };
    let mut app = App::new(start_tab);
    cmd_tx.send(app.refresh_all()).await.ok();

    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx, &cmd_tx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    worker.abort();
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<BoardEvent>,
    cmd_tx: &mpsc::Sender<BoardCommand>,
) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key) {
                        cmd_tx.send(cmd).await.ok();
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
