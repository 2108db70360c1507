//! Classifying a hit against the live round and scoring it.

use std::time::{Duration, Instant};

use crate::config::GameConfig;
use crate::scheduler::{RoundView, Slot};
use crate::util::round_points;

/// Minimum gap between two accepted hits; a duplicate input event inside
/// this window is dropped without any effect.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    pub fn would_accept(&self, now: Instant) -> bool {
        self.last_accepted
            .map_or(true, |last| now.saturating_duration_since(last) >= self.window)
    }

    pub fn record(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Correct { slot: usize, points: u32 },
    Wrong { slot: usize, answer_id: String },
    /// an empty hole; consumes the round without points
    Miss { slot: usize },
}

impl Resolution {
    pub fn slot(&self) -> usize {
        match self {
            Resolution::Correct { slot, .. }
            | Resolution::Wrong { slot, .. }
            | Resolution::Miss { slot } => *slot,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Resolution::Correct { .. })
    }
}

/// `base + round(bonus_per_second * max(0, window - elapsed))`
pub fn points_for(config: &GameConfig, elapsed: Duration) -> u32 {
    let bonus_secs = (config.max_bonus_window_secs - elapsed.as_secs_f64()).max(0.0);
    config
        .base_points_per_correct
        .saturating_add(round_points(config.bonus_per_second * bonus_secs))
}

/// Classifies a hit on `slot` of a live round. `None` means there is no
/// mole there (out of range, not yet revealed, or already lowered).
pub fn resolve(
    view: &RoundView,
    slot: usize,
    config: &GameConfig,
    elapsed: Duration,
) -> Option<Resolution> {
    if !view.is_up(slot) {
        return None;
    }
    let resolution = match view.slot(slot)? {
        Slot::Empty => Resolution::Miss { slot },
        Slot::Answer(answer) if view.question().is_correct(answer) => Resolution::Correct {
            slot,
            points: points_for(config, elapsed),
        },
        Slot::Answer(answer) => Resolution::Wrong {
            slot,
            answer_id: answer.id.clone(),
        },
    };
    Some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AnswerOption, Question, QuestionSequence};
    use crate::scheduler::{RoundPlan, RoundScheduler};
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scenario_config() -> GameConfig {
        GameConfig {
            option_slots: 4,
            session_duration_secs: 60,
            base_points_per_correct: 100,
            bonus_per_second: 10.0,
            max_bonus_window_secs: 10.0,
            ..GameConfig::default()
        }
    }

    fn live_view(config: &GameConfig, answers: &[&str], correct: &str) -> RoundView {
        let seq = QuestionSequence::new(vec![Question::new(
            "q1",
            "?",
            answers.iter().map(|a| AnswerOption::text(*a, *a)).collect(),
            correct,
        )]);
        let mut rng = StdRng::seed_from_u64(42);
        match RoundScheduler::new(config).prepare(&seq, 0, &mut rng) {
            RoundPlan::Ready(view) => view.revealed(Instant::now()),
            other => panic!("unexpected plan {other:?}"),
        }
    }

    fn slot_of(view: &RoundView, id: &str) -> usize {
        view.slots()
            .iter()
            .position(|s| s.answer().is_some_and(|a| a.id == id))
            .unwrap()
    }

    #[test]
    fn fast_correct_hit_earns_time_bonus() {
        let cfg = scenario_config();
        assert_eq!(points_for(&cfg, Duration::from_secs(2)), 180);
    }

    #[test]
    fn slow_correct_hit_earns_base_only() {
        let cfg = scenario_config();
        assert_eq!(points_for(&cfg, Duration::from_secs(10)), 100);
        assert_eq!(points_for(&cfg, Duration::from_secs(45)), 100);
    }

    #[test]
    fn bonus_is_rounded() {
        let cfg = GameConfig {
            bonus_per_second: 3.0,
            ..scenario_config()
        };
        // 3 * 8.75 = 26.25
        assert_eq!(points_for(&cfg, Duration::from_millis(1250)), 126);
        // 3 * 8.5 = 25.5
        assert_eq!(points_for(&cfg, Duration::from_millis(1500)), 126);
    }

    #[test]
    fn correct_slot_resolves_correct() {
        let cfg = scenario_config();
        let view = live_view(&cfg, &["a1", "a2", "a3", "a4"], "a3");
        let slot = slot_of(&view, "a3");

        assert_eq!(
            resolve(&view, slot, &cfg, Duration::from_secs(2)),
            Some(Resolution::Correct { slot, points: 180 })
        );
    }

    #[test]
    fn wrong_slot_resolves_wrong() {
        let cfg = scenario_config();
        let view = live_view(&cfg, &["a1", "a2", "a3", "a4"], "a3");
        let slot = slot_of(&view, "a1");

        assert_matches!(
            resolve(&view, slot, &cfg, Duration::ZERO),
            Some(Resolution::Wrong { answer_id, .. }) if answer_id == "a1"
        );
    }

    #[test]
    fn empty_slot_is_a_miss() {
        let cfg = scenario_config();
        let view = live_view(&cfg, &["a1", "a2"], "a2");
        let empty = view.slots().iter().position(|s| s.is_empty()).unwrap();

        assert_eq!(
            resolve(&view, empty, &cfg, Duration::ZERO),
            Some(Resolution::Miss { slot: empty })
        );
    }

    #[test]
    fn no_mole_means_no_resolution() {
        let cfg = scenario_config();
        let view = live_view(&cfg, &["a1", "a2", "a3", "a4"], "a3");

        assert_eq!(resolve(&view, 4, &cfg, Duration::ZERO), None);
        assert_eq!(resolve(&view, usize::MAX, &cfg, Duration::ZERO), None);

        let lowered = view.with_lowered(0);
        assert_eq!(resolve(&lowered, 0, &cfg, Duration::ZERO), None);
    }

    #[test]
    fn resolution_accessors() {
        let hit = Resolution::Correct { slot: 2, points: 5 };
        assert_eq!(hit.slot(), 2);
        assert!(hit.is_correct());
        assert!(!Resolution::Miss { slot: 0 }.is_correct());
    }

    #[test]
    fn debouncer_drops_hits_inside_window() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();

        assert!(d.would_accept(t0));
        d.record(t0);
        assert!(!d.would_accept(t0));
        assert!(!d.would_accept(t0 + Duration::from_millis(49)));
        assert!(d.would_accept(t0 + DEBOUNCE_WINDOW));

        d.reset();
        assert!(d.would_accept(t0));
    }
}
