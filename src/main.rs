use aimhq::{
    ai::{self, GameMode, Generator, PlayStyle},
    app::{App, Services},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::TrainerLog,
    presets::PresetList,
    runtime::{AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    store::Persistence,
};
use chrono::{Local, TimeZone};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 50;

/// free fire command center: sensitivity configs, tactical briefs and aim practice
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// key-value store to use instead of the default location
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// debug-level logging
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// print a tactical brief as JSON
    Brief {
        #[clap(short, long, value_enum, default_value_t = Mode::BattleRoyale)]
        mode: Mode,
        #[clap(short, long, value_enum, default_value_t = Style::Rusher)]
        style: Style,
    },
    /// print a sensitivity config for a device as JSON
    Sensitivity { device: String },
    /// list saved presets
    Presets,
    /// erase every stored value
    Reset,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Mode {
    BattleRoyale,
    ClashSquad,
    LoneWolf,
}

impl From<Mode> for GameMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::BattleRoyale => GameMode::BattleRoyale,
            Mode::ClashSquad => GameMode::ClashSquad,
            Mode::LoneWolf => GameMode::LoneWolf,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Style {
    Rusher,
    Support,
    Igl,
    Flanker,
    Recon,
    Demolition,
}

impl From<Style> for PlayStyle {
    fn from(s: Style) -> Self {
        match s {
            Style::Rusher => PlayStyle::Rusher,
            Style::Support => PlayStyle::Support,
            Style::Igl => PlayStyle::Igl,
            Style::Flanker => PlayStyle::Flanker,
            Style::Recon => PlayStyle::Recon,
            Style::Demolition => PlayStyle::Demolition,
        }
    }
}

/// Log to a file in the state dir; stdout belongs to the terminal UI
fn init_logging(cli: &Cli, config: &Config) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let fallback = if cli.verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_env("AIMHQ_LOG")
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn open_store(cli: &Cli) -> Persistence {
    match cli.db.clone().or_else(AppDirs::db_path) {
        Some(path) => Persistence::open_or_memory(path),
        None => Persistence::in_memory(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load().with_env().sanitized();
    init_logging(&cli, &config);

    match cli.command.clone() {
        Some(Command::Brief { mode, style }) => {
            let brief = ai::from_config(&config).tactical_brief(mode.into(), style.into())?;
            println!("{}", serde_json::to_string_pretty(&brief)?);
            return Ok(());
        }
        Some(Command::Sensitivity { device }) => {
            let cfg = ai::from_config(&config).sensitivity_config(device.trim())?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            return Ok(());
        }
        Some(Command::Presets) => {
            let presets = PresetList::load(&open_store(&cli));
            if presets.is_empty() {
                println!("no saved presets");
            }
            for p in presets.items() {
                let saved = Local
                    .timestamp_millis_opt(p.timestamp)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<24} {:<20} dpi {:<5} {}",
                    p.name, p.config.device_name, p.config.dpi, saved
                );
            }
            return Ok(());
        }
        Some(Command::Reset) => {
            open_store(&cli).clear();
            tracing::info!("store cleared from the command line");
            println!("all saved data erased");
            return Ok(());
        }
        None => {}
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store(&cli);
    let services = Services::terminal(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let size = terminal.size()?;
    let mut app = App::new(
        store,
        config,
        services,
        events.job_sender(),
        (size.width, size.height),
        TrainerLog::new(),
    );
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        app.handle(runner.step());
        if app.should_quit() {
            tracing::info!("quit");
            return Ok(());
        }
    }
}
