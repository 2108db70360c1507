mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use molequiz::{
    app_dirs::AppDirs,
    clock::{SystemClock, TimeSource},
    config::{ConfigStore, FileConfigStore, GameConfig},
    content::QuestionBank,
    engine::{Cue, GameObserver, QuizEngine},
    error::{BankError, ContentError},
    runtime::{
        Command, CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker,
    },
    session::Phase,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    cell::RefCell,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const TICK_RATE_MS: u64 = 50;
const LOG_ENV: &str = "MOLEQUIZ_LOG";

/// whack-a-mole quiz arcade for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Moles pop up carrying answers. Hit the one with the right answer before the clock runs out; faster hits earn bonus points."
)]
pub struct Cli {
    /// question bank to load from a JSON file
    #[clap(long, conflicts_with = "builtin")]
    bank: Option<PathBuf>,

    /// built-in question bank to play
    #[clap(long, value_enum, default_value_t = BuiltinBank::Fruit)]
    builtin: BuiltinBank,

    /// number of mole holes on the board
    #[clap(short = 'm', long)]
    moles: Option<usize>,

    /// session length in seconds
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// delay before the moles pop up each round
    #[clap(long)]
    reveal_delay_ms: Option<u64>,

    /// base points for a correct hit
    #[clap(long)]
    points: Option<u32>,

    /// bonus points per second left in the bonus window
    #[clap(long)]
    bonus_per_second: Option<f64>,

    /// length of the speed bonus window in seconds
    #[clap(long)]
    max_bonus_secs: Option<f64>,

    /// shuffle the question order once per session
    #[clap(long)]
    shuffle: bool,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// print the final report as JSON after exiting
    #[clap(long)]
    json: bool,

    /// list the built-in question banks and exit
    #[clap(long)]
    list_banks: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum BuiltinBank {
    Fruit,
    Animals,
    Sky,
}

impl BuiltinBank {
    fn file_stem(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl Cli {
    /// Command line flags win over the stored settings.
    fn apply(&self, stored: GameConfig) -> GameConfig {
        GameConfig {
            option_slots: self.moles.unwrap_or(stored.option_slots),
            session_duration_secs: self.secs.unwrap_or(stored.session_duration_secs),
            round_reveal_delay_ms: self.reveal_delay_ms.unwrap_or(stored.round_reveal_delay_ms),
            base_points_per_correct: self.points.unwrap_or(stored.base_points_per_correct),
            bonus_per_second: self.bonus_per_second.unwrap_or(stored.bonus_per_second),
            max_bonus_window_secs: self.max_bonus_secs.unwrap_or(stored.max_bonus_window_secs),
            shuffle_questions: self.shuffle || stored.shuffle_questions,
        }
    }

    fn load_bank(&self) -> Result<QuestionBank, BankError> {
        match &self.bank {
            Some(path) => QuestionBank::from_path(path),
            None => QuestionBank::builtin(&self.builtin.file_stem()),
        }
    }
}

/// What the status line shows besides the engine's own state
#[derive(Debug, Default)]
pub struct StatusBoard {
    pub last_cue: Option<Cue>,
    pub skipped: usize,
}

impl GameObserver for StatusBoard {
    fn on_cue(&mut self, cue: Cue) {
        self.last_cue = Some(cue);
    }

    fn on_content_error(&mut self, _err: &ContentError) {
        self.skipped += 1;
    }
}

pub struct App<C: TimeSource = SystemClock> {
    pub engine: QuizEngine<C>,
    pub bank_name: String,
    pub status: Rc<RefCell<StatusBoard>>,
}

impl<C: TimeSource> App<C> {
    pub fn new(config: GameConfig, bank: QuestionBank, clock: C) -> Self {
        let status = Rc::new(RefCell::new(StatusBoard::default()));
        let bank_name = bank.name.clone();
        let engine = QuizEngine::new(config, bank.into_sequence(), clock)
            .with_observer(Box::new(status.clone()));
        Self {
            engine,
            bank_name,
            status,
        }
    }

    /// Returns false when the player asked to quit.
    pub fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Start => {
                if self.engine.phase() != Phase::Active {
                    self.status.borrow_mut().skipped = 0;
                    if let Err(err) = self.engine.start() {
                        tracing::error!(%err, "cannot start session");
                    }
                }
            }
            Command::Restart => {
                if self.engine.phase() != Phase::Idle {
                    self.status.borrow_mut().skipped = 0;
                    if let Err(err) = self.engine.restart() {
                        tracing::error!(%err, "cannot restart session");
                    }
                }
            }
            Command::Home => self.engine.reset(),
            Command::Hit(slot) => {
                self.engine.select_slot(slot);
            }
            Command::Ignore => {}
        }
        true
    }
}

fn init_logging() -> Option<WorkerGuard> {
    let Some(dir) = AppDirs::log_dir() else {
        eprintln!("molequiz: no state directory found, logging disabled");
        return None;
    };
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!(
            "molequiz: cannot create log directory {}: {err}, logging disabled",
            dir.display()
        );
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "molequiz.log"));
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok()?;
    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_banks {
        for name in QuestionBank::builtin_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let _log_guard = init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if let Err(err) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, err).exit();
    }
    if cli.save_config {
        store.save(&config)?;
    }

    let bank = match cli.load_bank() {
        Ok(bank) => bank,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, err).exit();
        }
    };
    for problem in bank.check() {
        tracing::warn!(%problem, "question will be skipped");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, bank, SystemClock);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    if cli.json {
        if let Some(report) = app.engine.report() {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }

    Ok(())
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker, C: TimeSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step_until(app.engine.next_timer_due()) {
            GameEvent::Tick => app.engine.pump(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                app.engine.pump();
                if !app.on_command(Command::from_key(&key)) {
                    break;
                }
                app.engine.pump();
            }
        }
    }

    Ok(())
}

fn ui<C: TimeSource>(app: &App<C>, f: &mut Frame) {
    ui::screen::current_screen(app.engine.phase()).render(app, f);
}
