mod ui;

use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    rc::Rc,
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use dikr::{
    app_dirs::AppDirs,
    backup,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    feedback::TerminalFeedback,
    logging,
    models::{DikrItem, SessionMode},
    runtime::{self, AppEvent, EventSource, FixedTicker, Runner, Ticker},
    session::DikrSession,
    stats::{format_time, stats_for, Period},
    store::{KeyValueStore, SqliteStore},
};

use crate::ui::{
    modal::{self, ConfirmAction, Modal},
    screen::current_screen,
};

/// calibrate one repetition, then let the clock do the counting
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal repetition counter. Time a few repetitions of a dikr once, then run free or target sessions where the count is derived from elapsed time."
)]
pub struct Cli {
    /// sqlite file holding items, history and the active session
    #[clap(long)]
    db: Option<PathBuf>,

    /// json config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// display refresh interval in milliseconds (overrides the config)
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// write a json backup of items, history and preferences
    Export {
        /// defaults to dikr-backup-YYYY-MM-DD.json
        file: Option<PathBuf>,
    },
    /// replace items and history with a json backup
    Import { file: PathBuf },
    /// write the history as csv
    ExportCsv { file: PathBuf },
    /// print totals for today, this week and all time
    Stats,
}

impl Cli {
    fn load_config(&self) -> Config {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        let mut cfg = store.load();
        if let Some(ms) = self.tick_rate_ms {
            cfg.tick_rate_ms = ms;
        }
        cfg
    }

    fn open_store(&self) -> Result<Box<dyn KeyValueStore>, Box<dyn Error>> {
        let store = match &self.db {
            Some(path) => SqliteStore::open(path)?,
            None => SqliteStore::new()?,
        };
        Ok(Box::new(store))
    }
}

#[derive(Debug)]
pub struct App {
    pub session: DikrSession,
    pub feedback: Rc<TerminalFeedback>,
    /// cursor in the item list
    pub home_row: usize,
    /// cursor in the history table
    pub history_row: usize,
    pub modal: Option<Modal>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: DikrSession, feedback: Rc<TerminalFeedback>) -> Self {
        Self {
            session,
            feedback,
            home_row: 0,
            history_row: 0,
            modal: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn highlighted_dikr(&self) -> Option<&DikrItem> {
        self.session.registry().items().get(self.home_row)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clamp_rows(&mut self) {
        let items = self.session.registry().len();
        self.home_row = self.home_row.min(items.saturating_sub(1));
        let records = self
            .session
            .history()
            .filtered(self.session.history_filter())
            .count();
        self.history_row = self.history_row.min(records.saturating_sub(1));
    }

    /// Start a session, asking before replacing one that is in progress
    pub fn begin(&mut self, dikr_id: String, mode: SessionMode, target: Option<u64>) {
        let mut question = None;
        let started = self.session.start_session(&dikr_id, mode, target, |msg| {
            question = Some(msg.to_string());
            false
        });
        match started {
            Ok(true) => self.status = None,
            Ok(false) => {
                self.modal = Some(Modal::confirm(
                    question.unwrap_or_default(),
                    ConfirmAction::ReplaceSession {
                        dikr_id,
                        mode,
                        target,
                    },
                ))
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn on_tick(&mut self) {
        self.session.tick();
        self.collect_notice();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.modal.is_some() {
            modal::on_key(self, key);
        } else {
            let mut screen = current_screen(self.session.screen());
            screen.on_key(key, self);
        }
        self.clamp_rows();
        self.collect_notice();
    }

    fn collect_notice(&mut self) {
        if let Some(notice) = self.feedback.take_notice() {
            self.status = Some(notice);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(command) = cli.command.clone() {
        logging::init_stderr();
        let config = cli.load_config();
        let mut session = build_session(&cli, config)?.0;
        return run_command(&command, &mut session, &mut io::stdout());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init_file(&path) {
            eprintln!("logging disabled: {e}");
        }
    }
    log::info!("dikr starting");

    let config = cli.load_config();
    let ticker = FixedTicker::from_millis(config.tick_rate_ms);
    let (session, feedback) = build_session(&cli, config)?;
    let mut app = App::new(session, feedback);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(runtime::terminal_events(), ticker);
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn build_session(
    cli: &Cli,
    config: Config,
) -> Result<(DikrSession, Rc<TerminalFeedback>), Box<dyn Error>> {
    let store = cli.open_store()?;
    let feedback = Rc::new(TerminalFeedback::new(&config));
    let session = DikrSession::new(store, Box::new(SystemClock), feedback.clone(), config);
    Ok((session, feedback))
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => app.on_key(key),
        }

        if app.should_quit {
            break;
        }
    }

    log::info!("dikr exiting");
    Ok(())
}

fn run_command<W: Write>(
    command: &Command,
    session: &mut DikrSession,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Export { file } => {
            let path = file
                .clone()
                .unwrap_or_else(|| PathBuf::from(backup::default_file_name(session.now())));
            backup::write_file(&path, &session.export_bundle())?;
            writeln!(out, "exported to {}", path.display())?;
        }
        Command::Import { file } => {
            let bundle = backup::read_file(file)?;
            let (items, records) = (bundle.dikrs.len(), bundle.history.len());
            session.import_bundle(bundle);
            writeln!(out, "imported {items} items and {records} records")?;
        }
        Command::ExportCsv { file } => {
            backup::write_csv_file(file, session.history())?;
            writeln!(out, "wrote {} records to {}", session.history().len(), file.display())?;
        }
        Command::Stats => {
            let now = session.now();
            for period in [Period::Today, Period::Week, Period::All] {
                let s = stats_for(session.history().records(), period, now);
                writeln!(
                    out,
                    "{:<6} {:>6} reps  {:>12}  {} targets",
                    period.to_string(),
                    s.count,
                    format_time(s.time_ms, session.lang()),
                    s.targets_reached
                )?;
            }
        }
    }
    Ok(())
}
