use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::GameConfig;
use crate::session::SessionState;
use crate::time_series::ScorePoint;
use crate::util::{mean, percent, std_dev};

/// How a finished session ended, for the front end's headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum ReportOutcome {
    /// every question asked was answered correctly
    Perfect,
    /// ran out of questions
    Completed,
    /// ran out of time
    TimeUp,
}

/// Summary of one finished session. Built once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    pub final_score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy_percent: u32,
    pub session_duration_secs: u32,
    pub time_used_secs: u32,
    pub is_completed: bool,
    pub mean_reaction_secs: Option<f64>,
    pub reaction_std_dev_secs: Option<f64>,
    pub score_timeline: Vec<ScorePoint>,
    pub finished_at: DateTime<Local>,
}

impl GameReport {
    pub fn outcome(&self) -> ReportOutcome {
        if self.total_questions > 0 && self.correct_answers == self.total_questions {
            ReportOutcome::Perfect
        } else if self.is_completed {
            ReportOutcome::Completed
        } else {
            ReportOutcome::TimeUp
        }
    }
}

pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(state: &SessionState, config: &GameConfig, sequence_len: usize) -> GameReport {
        GameReport {
            final_score: state.score_total,
            total_questions: state.questions_asked,
            correct_answers: state.questions_correct,
            accuracy_percent: percent(state.questions_correct, state.questions_asked),
            session_duration_secs: config.session_duration_secs,
            time_used_secs: config
                .session_duration_secs
                .saturating_sub(state.time_remaining_secs),
            is_completed: state.current_question_index >= sequence_len,
            mean_reaction_secs: mean(&state.reaction_secs),
            reaction_std_dev_secs: std_dev(&state.reaction_secs),
            score_timeline: state.score_timeline.clone(),
            finished_at: Local::now(),
        }
    }
}
