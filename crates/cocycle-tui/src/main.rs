//! Cocycle - terminal preview of a group ride.
//!
//! `cocycle <ride-id>` shows one ride with its host, riders and route map.
//! `cocycle --upcoming [lat lng radius]` prints the upcoming ride list.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cocycle_core::api::{ApiClient, UpcomingFilter};
use cocycle_core::cache::{QueryCache, RideQueries};
use cocycle_core::config::Config;
use cocycle_core::view::{format_countdown, format_distance, format_ride_date, format_ride_time};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const APP_NAME: &str = "cocycle";

const USAGE: &str = "usage: cocycle <ride-id>\n       cocycle --upcoming [lat lng radius]";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Ride(String),
    Upcoming(UpcomingFilter),
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => bail!("missing ride id\n{}", USAGE),
        [flag, ..] if flag == "-h" || flag == "--help" => Ok(Command::Help),
        [flag, rest @ ..] if flag == "--upcoming" => match rest {
            [] => Ok(Command::Upcoming(UpcomingFilter::default())),
            [lat, lng, radius] => {
                let parse = |name: &str, value: &str| {
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid {}: '{}'", name, value))
                };
                Ok(Command::Upcoming(UpcomingFilter::near(
                    parse("lat", lat)?,
                    parse("lng", lng)?,
                    parse("radius", radius)?,
                )))
            }
            _ => bail!("--upcoming takes no arguments or lat lng radius\n{}", USAGE),
        },
        [id] if !id.starts_with('-') => Ok(Command::Ride(id.clone())),
        _ => bail!("unrecognised arguments\n{}", USAGE),
    }
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize file logging. The returned guard flushes on drop and must be
/// held for the life of the program.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // The terminal belongs to the UI, so logs go to a daily file
    let appender = tracing_appender::rolling::daily(log_dir(), "cocycle.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let _log_guard = init_tracing();
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(api_url = %config.api_url, "cocycle starting");

    match command {
        Command::Help => Ok(()),
        Command::Upcoming(filter) => print_upcoming(&config, filter).await,
        Command::Ride(id) => run_ride(config, id).await,
    }
}

async fn print_upcoming(config: &Config, filter: UpcomingFilter) -> Result<()> {
    let api = ApiClient::new(config.api_url.clone())?;
    let queries = RideQueries::new(api, QueryCache::new());
    let rides = queries
        .upcoming(filter)
        .await
        .context("Failed to fetch upcoming rides")?;

    if rides.is_empty() {
        println!("No upcoming rides");
        return Ok(());
    }

    let now = Utc::now();
    for ride in rides.iter() {
        println!(
            "{:<20} {:<9} {:<32} {:>8}  {}/{}  {}",
            format_ride_date(ride.start_time, &Local),
            format_ride_time(ride.start_time, &Local),
            ride.title,
            format_distance(ride.distance),
            ride.current_participants,
            ride.max_participants,
            format_countdown(ride.start_time, now).unwrap_or_default(),
        );
        println!("    {}", ride.id);
    }
    Ok(())
}

async fn run_ride(config: Config, ride_id: String) -> Result<()> {
    let mut app = App::new(config, ride_id)?;
    app.load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("cocycle shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
