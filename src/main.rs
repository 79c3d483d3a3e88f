mod app;
mod card;
mod config;
mod data;
mod dates;
mod filter;
mod logos;
mod model;
mod ui;
mod week;

use std::{io, sync::Arc, time::Duration};

use anyhow::Result;
use app::{App, AppEvent, Command};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use data::{DataClient, ScheduleSource};
use dates::CalendarDate;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Buffer size for results coming back from fetch tasks
const EVENT_CHANNEL_BUFFER_SIZE: usize = 100;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse the basketball schedule one day at a time", long_about = None)]
struct Args {
    /// Base URL of the schedule API
    #[arg(long)]
    api_url: Option<String>,

    /// Date to open on, YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    date: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long)]
    log_level: Option<String>,

    /// Log file path (default: /dev/null for no logging)
    #[arg(short = 'F', long)]
    log_file: Option<String>,

    /// Don't download team logos
    #[arg(long)]
    no_logos: bool,
}

/// Command-line flags win over the config file.
fn resolve_settings(args: &Args, file: Config) -> Config {
    Config {
        api_url: args.api_url.clone().unwrap_or(file.api_url),
        log_level: args.log_level.clone().unwrap_or(file.log_level),
        log_file: args.log_file.clone().unwrap_or(file.log_file),
        show_logos: file.show_logos && !args.no_logos,
    }
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(log_level: &str, log_file: &str) {
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file, e);
            return;
        }
    };
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Spawns the background work the app asks for.
struct Dispatcher {
    source: Arc<dyn ScheduleSource>,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    fetch_logos: bool,
}

impl Dispatcher {
    fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::FetchGames(request) => {
                    tokio::spawn(data::load_games(self.source.clone(), request, self.tx.clone()));
                }
                Command::FetchLogo(abbreviation) if self.fetch_logos => {
                    tokio::spawn(logos::load_logo(self.http.clone(), abbreviation, self.tx.clone()));
                }
                Command::FetchLogo(_) => {}
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = resolve_settings(&args, config::read());
    init_logging(&settings.log_level, &settings.log_file);

    let mut app = App::new(args.date.clone(), CalendarDate::today(), settings.show_logos);
    info!(
        api_url = %settings.api_url,
        date = %dates::to_api_string(&app.date_input),
        "starting"
    );

    let (tx, mut rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL_BUFFER_SIZE);
    let client = DataClient::new(&settings.api_url);
    let dispatcher = Dispatcher {
        http: client.http().clone(),
        source: Arc::new(client),
        tx: tx.clone(),
        fetch_logos: settings.show_logos,
    };

    // Teams only populate the filter; games for the opening date load alongside.
    tokio::spawn(data::load_teams(dispatcher.source.clone(), tx));
    let first = app.refresh();
    dispatcher.dispatch(vec![Command::FetchGames(first)]);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut rx, &dispatcher).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        return Err(err.into());
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
    dispatcher: &Dispatcher,
) -> io::Result<()> {
    loop {
        app.today = CalendarDate::today();
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        app.should_quit = true;
                    } else {
                        dispatcher.dispatch(app.on_key(key.code));
                    }
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            dispatcher.dispatch(app.on_event(event));
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
