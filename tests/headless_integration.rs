use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use molequiz::clock::ManualClock;
use molequiz::config::GameConfig;
use molequiz::content::QuestionBank;
use molequiz::engine::QuizEngine;
use molequiz::report::ReportOutcome;
use molequiz::runtime::{Command, FixedTicker, GameEvent, Runner, TestEventSource};
use molequiz::session::Phase;

// Each runner tick stands for this much game time on the manual clock.
const TICK_MS: u64 = 100;

fn press(tx: &mpsc::Sender<GameEvent>, code: KeyCode) {
    tx.send(GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

fn runner(rx: mpsc::Receiver<GameEvent>) -> Runner<TestEventSource, FixedTicker> {
    Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    )
}

/// Feeds events to the engine the way the binary does, with logical time
/// advancing only on ticks. Stops on quit or after `max_steps`.
fn drive(
    engine: &mut QuizEngine<ManualClock>,
    clock: &ManualClock,
    runner: &Runner<TestEventSource, FixedTicker>,
    max_steps: u32,
) {
    for _ in 0..max_steps {
        match runner.step() {
            GameEvent::Tick => {
                clock.advance_ms(TICK_MS);
                engine.pump();
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => match Command::from_key(&key) {
                Command::Quit => return,
                Command::Start => {
                    engine.start().unwrap();
                }
                Command::Hit(slot) => {
                    engine.select_slot(slot);
                }
                Command::Restart => {
                    engine.restart().unwrap();
                }
                Command::Home => engine.reset(),
                Command::Ignore => {}
            },
        }
        if engine.phase() == Phase::Ended {
            return;
        }
    }
}

#[test]
fn headless_session_runs_out_of_time() {
    let clock = ManualClock::new();
    let bank = QuestionBank::builtin("fruit").unwrap();
    let config = GameConfig {
        session_duration_secs: 2,
        ..GameConfig::default()
    };
    let mut engine = QuizEngine::new(config, bank.into_sequence(), clock.clone());

    let (tx, rx) = mpsc::channel();
    press(&tx, KeyCode::Enter);
    drive(&mut engine, &clock, &runner(rx), 200);

    assert_eq!(engine.phase(), Phase::Ended);
    let report = engine.report().unwrap();
    assert_eq!(report.total_questions, 0);
    assert_eq!(report.time_used_secs, 2);
    assert_eq!(report.outcome(), ReportOutcome::TimeUp);
}

#[test]
fn headless_hits_are_scored_through_key_presses() {
    let clock = ManualClock::new();
    let bank = QuestionBank::builtin("fruit").unwrap();
    let mut engine =
        QuizEngine::new(GameConfig::default(), bank.into_sequence(), clock.clone()).with_seed(9);

    let (tx, rx) = mpsc::channel();
    let runner = runner(rx);
    press(&tx, KeyCode::Enter);
    // start, then six ticks: prepare at 100 ms, reveal at 600 ms
    drive(&mut engine, &clock, &runner, 7);
    assert!(engine.round_view().unwrap().is_live());

    let correct = engine.round_view().unwrap().correct_slot().unwrap();
    let digit = char::from_digit(correct as u32 + 1, 10).unwrap();
    press(&tx, KeyCode::Char(digit));
    drive(&mut engine, &clock, &runner, 1);

    assert_eq!(engine.state().questions_correct, 1);
    assert_eq!(engine.score(), 200);
}

#[test]
fn headless_escape_stops_the_loop() {
    let clock = ManualClock::new();
    let mut engine = QuizEngine::new(
        GameConfig::default(),
        QuestionBank::builtin("sky").unwrap().into_sequence(),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    press(&tx, KeyCode::Enter);
    press(&tx, KeyCode::Esc);
    drive(&mut engine, &clock, &runner(rx), 1000);

    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn headless_home_key_discards_session() {
    let clock = ManualClock::new();
    let mut engine = QuizEngine::new(
        GameConfig::default(),
        QuestionBank::builtin("animals").unwrap().into_sequence(),
        clock.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let runner = runner(rx);
    press(&tx, KeyCode::Enter);
    drive(&mut engine, &clock, &runner, 20);
    press(&tx, KeyCode::Char('h'));
    drive(&mut engine, &clock, &runner, 1);

    assert_eq!(engine.phase(), Phase::Idle);
    assert!(engine.report().is_none());
    assert_eq!(engine.pending_timers(), 0);
}
