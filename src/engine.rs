//! The session controller: one quiz session from start to report.
//!
//! Single-threaded and timer driven. Nothing blocks; every delay is a
//! timer in the controller's queue, and the host calls [`QuizEngine::pump`]
//! to fire whatever is due. Each fired timer runs at its own due instant,
//! so a host that pumps late still sees ticks and reveals in order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::clock::{SystemClock, TimeSource};
use crate::config::GameConfig;
use crate::content::QuestionSequence;
use crate::error::{ConfigError, ContentError};
use crate::report::{GameReport, ReportBuilder, ReportOutcome};
use crate::resolver::{resolve, Debouncer, Resolution};
use crate::scheduler::{RoundPlan, RoundScheduler, RoundView};
use crate::session::{
    FeedbackKind, Phase, PointPopup, SessionState, FEEDBACK_DURATION, POPUP_LIFETIME,
};
use crate::time_series::ScorePoint;
use crate::timers::{Timer, TimerHandle, TimerKind, TimerQueue};

/// Pause between `start()` and the first round being prepared
pub const INITIAL_SETTLE_DELAY: Duration = Duration::from_millis(100);
/// Pause after a hit before the next round is prepared
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);
/// Interval between countdown ticks of the session clock
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Fire-and-forget requests for sound or animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct { points: u32 },
    Wrong,
    Final { outcome: ReportOutcome },
}

/// Presentation hooks. Every method defaults to doing nothing.
pub trait GameObserver {
    fn on_state_changed(&mut self, _state: &SessionState) {}
    fn on_round_revealed(&mut self, _view: &RoundView) {}
    fn on_cue(&mut self, _cue: Cue) {}
    fn on_content_error(&mut self, _err: &ContentError) {}
    /// Called exactly once per session, when it ends with a report.
    fn on_complete(&mut self, _report: &GameReport) {}
}

pub struct NullObserver;

impl GameObserver for NullObserver {}

/// Adapts a closure into a completion-only observer.
pub struct OnComplete<F>(pub F);

impl<F: FnMut(&GameReport)> GameObserver for OnComplete<F> {
    fn on_complete(&mut self, report: &GameReport) {
        (self.0)(report)
    }
}

impl<T: GameObserver + ?Sized> GameObserver for Rc<RefCell<T>> {
    fn on_state_changed(&mut self, state: &SessionState) {
        self.borrow_mut().on_state_changed(state)
    }

    fn on_round_revealed(&mut self, view: &RoundView) {
        self.borrow_mut().on_round_revealed(view)
    }

    fn on_cue(&mut self, cue: Cue) {
        self.borrow_mut().on_cue(cue)
    }

    fn on_content_error(&mut self, err: &ContentError) {
        self.borrow_mut().on_content_error(err)
    }

    fn on_complete(&mut self, report: &GameReport) {
        self.borrow_mut().on_complete(report)
    }
}

pub struct QuizEngine<C: TimeSource = SystemClock> {
    config: GameConfig,
    questions: QuestionSequence,
    sequence: QuestionSequence,
    scheduler: RoundScheduler,
    state: SessionState,
    round: Option<RoundView>,
    timers: TimerQueue,
    generation: u64,
    debouncer: Debouncer,
    feedback: FeedbackKind,
    feedback_timer: Option<TimerHandle>,
    popups: Vec<PointPopup>,
    next_popup_id: u64,
    report: Option<GameReport>,
    observer: Box<dyn GameObserver>,
    rng: StdRng,
    clock: C,
}

impl<C: TimeSource> QuizEngine<C> {
    pub fn new(config: GameConfig, questions: impl Into<QuestionSequence>, clock: C) -> Self {
        let questions = questions.into();
        Self {
            scheduler: RoundScheduler::new(&config),
            config,
            sequence: questions.clone(),
            questions,
            state: SessionState::default(),
            round: None,
            timers: TimerQueue::new(),
            generation: 0,
            debouncer: Debouncer::default(),
            feedback: FeedbackKind::None,
            feedback_timer: None,
            popups: Vec::new(),
            next_popup_id: 0,
            report: None,
            observer: Box::new(NullObserver),
            rng: StdRng::from_entropy(),
            clock,
        }
    }

    /// Makes board and question shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Starts a session from `Idle` or `Ended`. Ignored while a session is
    /// running; use [`restart`](Self::restart) for that.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.state.is_active() {
            debug!("start ignored: session already active");
            return Ok(());
        }
        self.begin()
    }

    /// Throws away whatever is running and starts over.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.begin()
    }

    /// Back to home: stops everything and returns to `Idle` without a report.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset(&mut self) {
        self.teardown();
        self.state = SessionState::default();
        debug!("session reset to idle");
        self.observer.on_state_changed(&self.state);
    }

    /// The player hit hole `slot`. Returns how the hit was judged, or
    /// `None` if it was ignored (no session, locked, debounced, or no mole there).
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn select_slot(&mut self, slot: usize) -> Option<Resolution> {
        // judge the hit against a board with every due timer applied
        self.pump();
        let now = self.clock.now();

        if !self.state.is_active() {
            debug!(phase = %self.state.phase, "selection ignored: no active session");
            return None;
        }
        if !self.debouncer.would_accept(now) {
            debug!("selection ignored: inside debounce window");
            return None;
        }
        if self.state.round_locked {
            debug!("selection ignored: round locked");
            return None;
        }

        let (resolution, next_view, elapsed) = {
            let Some(view) = self.round.as_ref() else {
                debug!("selection ignored: no round on the board");
                return None;
            };
            let Some(revealed_at) = view.revealed_at() else {
                debug!("selection ignored: moles not up yet");
                return None;
            };
            let elapsed = now.saturating_duration_since(revealed_at);
            let Some(resolution) = resolve(view, slot, &self.config, elapsed) else {
                debug!("selection ignored: no mole in that hole");
                return None;
            };
            let next_view = if resolution.is_correct() {
                view.all_lowered()
            } else {
                view.with_lowered(resolution.slot())
            };
            (resolution, next_view, elapsed)
        };

        self.debouncer.record(now);
        self.state.round_locked = true;
        self.round = Some(next_view);
        self.state.reaction_secs.push(elapsed.as_secs_f64());

        match resolution {
            Resolution::Correct { slot, points } => {
                self.state.questions_correct += 1;
                self.state.score_total = self.state.score_total.saturating_add(points);
                self.state.score_timeline.push(ScorePoint::new(
                    self.state.seconds_since_start(now),
                    self.state.score_total,
                ));
                self.add_popup(slot, points, now);
                self.show_feedback(FeedbackKind::Correct, now);
                self.observer.on_cue(Cue::Correct { points });
                info!(slot, points, score = self.state.score_total, "correct hit");
            }
            Resolution::Wrong { slot, ref answer_id } => {
                self.show_feedback(FeedbackKind::Wrong, now);
                self.observer.on_cue(Cue::Wrong);
                info!(slot, answer_id = %answer_id, "wrong hit");
            }
            Resolution::Miss { slot } => {
                self.show_feedback(FeedbackKind::Wrong, now);
                self.observer.on_cue(Cue::Wrong);
                info!(slot, "hit an empty hole");
            }
        }

        self.state.questions_asked += 1;
        self.state.current_question_index += 1;

        if self.state.current_question_index >= self.sequence.len() {
            self.finalize_at(now);
        } else {
            self.timers.schedule(
                now + SETTLE_DELAY,
                TimerKind::PrepareRound {
                    index: self.state.current_question_index,
                },
                self.generation,
            );
            self.observer.on_state_changed(&self.state);
        }

        Some(resolution)
    }

    /// Ends the running session and builds its report. A no-op unless a
    /// session is active, so calling it twice changes nothing.
    pub fn finalize(&mut self) {
        let now = self.clock.now();
        self.finalize_at(now);
    }

    /// Fires every timer that is due. Call on each host tick.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        while let Some(timer) = self.timers.pop_due(now) {
            self.fire(timer);
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score_total
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.time_remaining_secs
    }

    /// The board for the current round; holes read empty until it is revealed.
    pub fn round_view(&self) -> Option<&RoundView> {
        self.round.as_ref()
    }

    /// `(question number on screen, total questions)`
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sequence.len();
        let current = match self.state.phase {
            Phase::Idle => 0,
            Phase::Active | Phase::Ended => (self.state.current_question_index + 1).min(total),
        };
        (current, total)
    }

    pub fn report(&self) -> Option<&GameReport> {
        self.report.as_ref()
    }

    pub fn feedback(&self) -> FeedbackKind {
        self.feedback
    }

    pub fn popups(&self) -> &[PointPopup] {
        &self.popups
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// When the host next needs to call `pump`, if anything is scheduled.
    pub fn next_timer_due(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    fn begin(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.teardown();

        let now = self.clock.now();
        self.sequence = if self.config.shuffle_questions {
            self.questions.shuffled(&mut self.rng)
        } else {
            self.questions.clone()
        };
        self.scheduler = RoundScheduler::new(&self.config);
        self.state = SessionState::fresh(self.config.session_duration_secs, now);

        self.timers
            .schedule(now + CLOCK_PERIOD, TimerKind::ClockTick, self.generation);
        self.timers.schedule(
            now + INITIAL_SETTLE_DELAY,
            TimerKind::PrepareRound { index: 0 },
            self.generation,
        );

        info!(
            generation = self.generation,
            questions = self.sequence.len(),
            duration_secs = self.config.session_duration_secs,
            "session started"
        );
        self.observer.on_state_changed(&self.state);
        Ok(())
    }

    /// Cancels every pending timer and invalidates any that already escaped.
    fn teardown(&mut self) {
        self.timers.clear();
        self.generation += 1;
        self.round = None;
        self.report = None;
        self.feedback = FeedbackKind::None;
        self.feedback_timer = None;
        self.popups.clear();
        self.debouncer.reset();
    }

    fn fire(&mut self, timer: Timer) {
        if timer.generation != self.generation {
            debug!(?timer, current = self.generation, "dropping stale timer");
            return;
        }
        match timer.kind {
            TimerKind::ClockTick => self.on_clock_tick(timer.due),
            TimerKind::PrepareRound { index } => self.on_prepare_round(index, timer.due),
            TimerKind::RevealRound { index } => self.on_reveal_round(index, timer.due),
            TimerKind::ClearFeedback => {
                self.feedback = FeedbackKind::None;
                self.feedback_timer = None;
            }
            TimerKind::ExpirePopup { id } => self.popups.retain(|p| p.id != id),
        }
    }

    fn on_clock_tick(&mut self, at: Instant) {
        if !self.state.is_active() {
            return;
        }
        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        if self.state.time_remaining_secs == 0 {
            info!("time is up");
            self.finalize_at(at);
            return;
        }
        self.timers
            .schedule(at + CLOCK_PERIOD, TimerKind::ClockTick, self.generation);
        self.observer.on_state_changed(&self.state);
    }

    fn on_prepare_round(&mut self, mut index: usize, at: Instant) {
        if !self.state.is_active() {
            return;
        }
        self.state.round_locked = false;

        loop {
            match self.scheduler.prepare(&self.sequence, index, &mut self.rng) {
                RoundPlan::Ready(view) => {
                    debug!(index, question = %view.question().id, "round prepared");
                    self.state.current_question_index = index;
                    self.round = Some(view);
                    self.timers.schedule(
                        self.scheduler.reveal_due(at),
                        TimerKind::RevealRound { index },
                        self.generation,
                    );
                    self.observer.on_state_changed(&self.state);
                    return;
                }
                RoundPlan::Exhausted => {
                    self.state.current_question_index = index;
                    self.round = None;
                    self.finalize_at(at);
                    return;
                }
                RoundPlan::Skipped(err) => {
                    warn!(index, %err, "skipping malformed question");
                    self.observer.on_content_error(&err);
                    index += 1;
                }
            }
        }
    }

    fn on_reveal_round(&mut self, index: usize, at: Instant) {
        if !self.state.is_active() {
            return;
        }
        let Some(view) = self.round.as_ref() else {
            return;
        };
        if view.question_index() != index || view.is_live() {
            return;
        }
        let live = view.revealed(at);
        debug!(index, "moles up");
        self.observer.on_round_revealed(&live);
        self.round = Some(live);
    }

    fn finalize_at(&mut self, at: Instant) {
        if !self.state.is_active() {
            return;
        }
        self.state.phase = Phase::Ended;
        self.state.round_locked = true;
        self.round = self.round.as_ref().map(RoundView::all_lowered);
        self.timers.retain(|t| t.kind.is_cosmetic());

        let report = ReportBuilder::build(&self.state, &self.config, self.sequence.len());
        info!(
            score = report.final_score,
            asked = report.total_questions,
            correct = report.correct_answers,
            accuracy = report.accuracy_percent,
            completed = report.is_completed,
            seconds_in = self.state.seconds_since_start(at),
            "session finished"
        );

        self.observer.on_cue(Cue::Final {
            outcome: report.outcome(),
        });
        self.observer.on_complete(&report);
        self.report = Some(report);
        self.observer.on_state_changed(&self.state);
    }

    fn show_feedback(&mut self, kind: FeedbackKind, now: Instant) {
        if let Some(handle) = self.feedback_timer.take() {
            self.timers.cancel(handle);
        }
        self.feedback = kind;
        self.feedback_timer = Some(self.timers.schedule(
            now + FEEDBACK_DURATION,
            TimerKind::ClearFeedback,
            self.generation,
        ));
    }

    fn add_popup(&mut self, slot: usize, points: u32, now: Instant) {
        let id = self.next_popup_id;
        self.next_popup_id += 1;
        self.popups.push(PointPopup { id, slot, points });
        self.timers.schedule(
            now + POPUP_LIFETIME,
            TimerKind::ExpirePopup { id },
            self.generation,
        );
    }
}
