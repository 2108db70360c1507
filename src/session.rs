use serde::Serialize;
use std::time::{Duration, Instant};

use crate::time_series::ScorePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Ended,
}

/// Counters owned by the session controller
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub score_total: u32,
    pub time_remaining_secs: u32,
    pub questions_asked: u32,
    pub questions_correct: u32,
    pub current_question_index: usize,
    pub round_locked: bool,
    pub started_at: Option<Instant>,
    // Reaction samples for the report
    pub reaction_secs: Vec<f64>,
    pub score_timeline: Vec<ScorePoint>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            score_total: 0,
            time_remaining_secs: 0,
            questions_asked: 0,
            questions_correct: 0,
            current_question_index: 0,
            round_locked: false,
            started_at: None,
            reaction_secs: Vec::new(),
            score_timeline: Vec::new(),
        }
    }
}

impl SessionState {
    pub fn fresh(duration_secs: u32, now: Instant) -> Self {
        Self {
            phase: Phase::Active,
            time_remaining_secs: duration_secs,
            started_at: Some(now),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn seconds_since_start(&self, now: Instant) -> f64 {
        self.started_at
            .map(|s| now.saturating_duration_since(s).as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// One-shot cue shown after a hit; clears itself after `FEEDBACK_DURATION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackKind {
    Correct,
    Wrong,
    #[default]
    None,
}

pub const FEEDBACK_DURATION: Duration = Duration::from_millis(500);
pub const POPUP_LIFETIME: Duration = Duration::from_millis(1000);

/// "+points" bubble floating over the hole that was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointPopup {
    pub id: u64,
    pub slot: usize,
    pub points: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_zeroed() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.score_total, 0);
        assert_eq!(state.questions_asked, 0);
        assert!(!state.round_locked);
        assert!(!state.is_active());
    }

    #[test]
    fn fresh_state_is_active_with_full_clock() {
        let now = Instant::now();
        let state = SessionState::fresh(60, now);
        assert!(state.is_active());
        assert_eq!(state.time_remaining_secs, 60);
        assert_eq!(state.seconds_since_start(now + Duration::from_millis(2500)), 2.5);
    }

    #[test]
    fn phase_and_feedback_names() {
        assert_eq!(Phase::Active.to_string(), "Active");
        assert_eq!(FeedbackKind::Wrong.to_string(), "wrong");
        assert_eq!(FeedbackKind::default(), FeedbackKind::None);
    }
}
