use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the app loop reacts to
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// nothing arrived in time; pump the engine's timers
    Tick,
}

/// Source of terminal events
pub trait GameEventSource: Send + 'static {
    /// Wait up to `timeout` for the next event; `Err(Timeout)` when none came.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // key repeat and release events would double-hit a hole on some terminals
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(GameEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(GameEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed event source for headless runs and tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one tick interval; `Tick` on timeout.
    pub fn step(&self) -> GameEvent {
        self.wait(self.ticker.interval())
    }

    /// Like [`step`](Self::step), but wakes early for a timer due at `deadline`
    /// so reveals and countdown steps are not held back by the tick rate.
    pub fn step_until(&self, deadline: Option<Instant>) -> GameEvent {
        let interval = self.ticker.interval();
        let timeout = deadline
            .map(|d| d.saturating_duration_since(Instant::now()).min(interval))
            .unwrap_or(interval);
        self.wait(timeout)
    }

    fn wait(&self, timeout: Duration) -> GameEvent {
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// A key press, as the game understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// start from the title screen or play again from results
    Start,
    Restart,
    Home,
    /// hit hole `n` (0-based)
    Hit(usize),
    Ignore,
}

impl Command {
    /// Holes are numbered on screen from 1, so `1` hits slot 0.
    pub fn from_key(key: &KeyEvent) -> Self {
        match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => Command::Start,
            KeyCode::Char('r') => Command::Restart,
            KeyCode::Char('h') | KeyCode::Backspace => Command::Home,
            KeyCode::Char(c @ '1'..='9') => Command::Hit(c as usize - '1' as usize),
            _ => Command::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert_matches!(runner.step(), GameEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        assert_matches!(runner.step(), GameEvent::Resize);
    }

    #[test]
    fn step_until_past_deadline_does_not_wait_a_full_tick() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_secs(30)),
        );
        let started = Instant::now();
        assert_matches!(runner.step_until(Some(Instant::now())), GameEvent::Tick);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn digits_map_to_holes() {
        assert_eq!(Command::from_key(&key(KeyCode::Char('1'))), Command::Hit(0));
        assert_eq!(Command::from_key(&key(KeyCode::Char('9'))), Command::Hit(8));
        assert_eq!(Command::from_key(&key(KeyCode::Char('0'))), Command::Ignore);
    }

    #[test]
    fn control_keys() {
        assert_eq!(Command::from_key(&key(KeyCode::Esc)), Command::Quit);
        assert_eq!(
            Command::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Command::Quit
        );
        assert_eq!(Command::from_key(&key(KeyCode::Char('c'))), Command::Ignore);
        assert_eq!(Command::from_key(&key(KeyCode::Enter)), Command::Start);
        assert_eq!(Command::from_key(&key(KeyCode::Char(' '))), Command::Start);
        assert_eq!(Command::from_key(&key(KeyCode::Char('r'))), Command::Restart);
        assert_eq!(Command::from_key(&key(KeyCode::Backspace)), Command::Home);
    }
}
