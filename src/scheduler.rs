//! Round preparation: which question comes next and what the moles carry.

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::config::GameConfig;
use crate::content::{AnswerOption, Question, QuestionSequence};
use crate::error::ContentError;

/// One hole on the board
#[derive(Debug, Clone)]
pub enum Slot {
    Answer(AnswerOption),
    /// padding when a question has fewer answers than holes
    Empty,
}

impl Slot {
    pub fn answer(&self) -> Option<&AnswerOption> {
        match self {
            Slot::Answer(a) => Some(a),
            Slot::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// What the board shows for one round.
///
/// Views are replaced, never edited: revealing or lowering moles yields a
/// new view.
#[derive(Debug, Clone)]
pub struct RoundView {
    question_index: usize,
    question: Question,
    slots: Vec<Slot>,
    revealed_at: Option<Instant>,
    lowered: Vec<bool>,
}

impl RoundView {
    fn new(question_index: usize, question: Question, slots: Vec<Slot>) -> Self {
        let lowered = vec![false; slots.len()];
        Self {
            question_index,
            question,
            slots,
            revealed_at: None,
            lowered,
        }
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Moles are up and selectable once the reveal delay has passed.
    pub fn is_live(&self) -> bool {
        self.revealed_at.is_some()
    }

    pub fn revealed_at(&self) -> Option<Instant> {
        self.revealed_at
    }

    pub fn is_up(&self, index: usize) -> bool {
        self.is_live() && self.lowered.get(index).is_some_and(|lowered| !lowered)
    }

    pub fn correct_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.answer().is_some_and(|a| self.question.is_correct(a)))
    }

    /// What a renderer may show in each hole; all holes are empty until reveal.
    pub fn visible(&self) -> Vec<Option<&AnswerOption>> {
        (0..self.slots.len())
            .map(|i| {
                if self.is_up(i) {
                    self.slots[i].answer()
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn revealed(&self, at: Instant) -> Self {
        Self {
            revealed_at: Some(at),
            ..self.clone()
        }
    }

    pub fn with_lowered(&self, index: usize) -> Self {
        let mut lowered = self.lowered.clone();
        if let Some(l) = lowered.get_mut(index) {
            *l = true;
        }
        Self {
            lowered,
            ..self.clone()
        }
    }

    pub fn all_lowered(&self) -> Self {
        Self {
            lowered: vec![true; self.slots.len()],
            ..self.clone()
        }
    }
}

#[derive(Debug)]
pub enum RoundPlan {
    Ready(RoundView),
    /// no question at that index; the session must finalize
    Exhausted,
    /// the question cannot be asked; move on to the next index
    Skipped(ContentError),
}

#[derive(Debug, Clone, Copy)]
pub struct RoundScheduler {
    option_slots: usize,
    reveal_delay: Duration,
}

impl RoundScheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            option_slots: config.option_slots,
            reveal_delay: Duration::from_millis(config.round_reveal_delay_ms),
        }
    }

    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    /// When a round prepared at `prepared_at` should pop up.
    pub fn reveal_due(&self, prepared_at: Instant) -> Instant {
        prepared_at + self.reveal_delay
    }

    /// Builds the board for `sequence[index]`: the correct answer, then
    /// distractors in source order, padded with empty holes, then shuffled
    /// once as a whole.
    pub fn prepare<R: Rng + ?Sized>(
        &self,
        sequence: &QuestionSequence,
        index: usize,
        rng: &mut R,
    ) -> RoundPlan {
        let Some(question) = sequence.get(index) else {
            return RoundPlan::Exhausted;
        };

        let correct = match question.correct_answer() {
            Ok(correct) => correct.clone(),
            Err(err) => return RoundPlan::Skipped(err),
        };

        let mut slots: Vec<Slot> = std::iter::once(Slot::Answer(correct))
            .chain(
                question
                    .distractors()
                    .take(self.option_slots.saturating_sub(1))
                    .cloned()
                    .map(Slot::Answer),
            )
            .pad_using(self.option_slots, |_| Slot::Empty)
            .collect();
        slots.shuffle(rng);

        RoundPlan::Ready(RoundView::new(index, question.clone(), slots))
    }
}
