mod app;
mod config;
mod ui;

use anyhow::{Context, Result};
use app::{Action, App};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tasklist_client::TaskServiceClient;
use tasklist_core::{Command, Outcome, TaskApi};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tasklist_tui=info,tasklist_core=info,tasklist_client=info";

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Terminal client for the task list service", long_about = None)]
struct Cli {
    /// Server URL (overrides the config file)
    #[arg(short, long, env = "TASKLIST_SERVER_URL")]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "TASKLIST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = Some(secs);
    }

    let log_path = match cli.log_file {
        Some(path) => path,
        None => Config::log_path()?,
    };
    init_tracing(&log_path)?;
    info!("Using task service at {}", config.server_url);

    let client: Arc<dyn TaskApi> = Arc::new(
        TaskServiceClient::from_config(&config.client_config())
            .context("Failed to create task service client")?,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.show_cursor()?;

    let res = run_app(&mut terminal, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    info!("Exiting");
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(log_path: &Path) -> Result<()> {
    if let Some(log_dir) = log_path.parent() {
        std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<dyn TaskApi>,
) -> Result<()> {
    let mut app = App::new();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;
        terminal.backend_mut().flush()?;

        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                // Windows also reports releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        Action::Quit => return Ok(()),
                        Action::Dispatch(command) => {
                            dispatch(&mut app, &api, &outcome_tx, command)
                        }
                        Action::Continue => {}
                    }
                }
            }
        }

        while let Ok(outcome) = outcome_rx.try_recv() {
            if let Some(command) = app.apply(outcome) {
                dispatch(&mut app, &api, &outcome_tx, command);
            }
        }
    }
}

/// Run a command off the UI task and feed its outcome back through the channel.
fn dispatch(
    app: &mut App,
    api: &Arc<dyn TaskApi>,
    outcome_tx: &mpsc::UnboundedSender<Outcome>,
    command: Command,
) {
    app.in_flight += 1;
    let api = Arc::clone(api);
    let outcome_tx = outcome_tx.clone();
    tokio::spawn(async move {
        let outcome = command.run(api.as_ref()).await;
        if outcome_tx.send(outcome).is_err() {
            debug!("UI closed before the outcome arrived");
        }
    });
}
