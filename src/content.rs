//! Question content: answers, questions, and the banks they come from.
//!
//! Content is read-only input to the engine. Banks are JSON documents,
//! either embedded in the binary or loaded from a file:
//!
//! ```json
//! { "name": "fruit", "questions": [
//!   { "id": "q1", "prompt_text": "Which one is yellow?", "correct_answer_id": "banana",
//!     "answers": [ { "id": "banana", "display_text": "Banana" },
//!                  { "id": "apple", "display_text": "Apple" } ] } ] }
//! ```

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{BankError, ContentError};

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/banks");

/// One answer a mole can carry. Identity is `id` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_image_ref: Option<String>,
}

impl AnswerOption {
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_text: Some(text.into()),
            display_image_ref: None,
        }
    }

    /// What a text-only front end shows: the display text, else the id.
    pub fn label(&self) -> &str {
        self.display_text.as_deref().unwrap_or(&self.id)
    }

    pub fn same_answer(&self, other: &AnswerOption) -> bool {
        self.id == other.id
    }
}

/// How a front end should present a question's answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    TextOnly,
    ImageOnly,
    TextAndImage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_image_ref: Option<String>,
    #[serde(default)]
    pub display_mode: DisplayMode,
    pub answers: Vec<AnswerOption>,
    pub correct_answer_id: String,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        answers: Vec<AnswerOption>,
        correct_answer_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt_text: Some(prompt.into()),
            prompt_image_ref: None,
            display_mode: DisplayMode::default(),
            answers,
            correct_answer_id: correct_answer_id.into(),
        }
    }

    /// Resolves the correct answer, checking the answer set is usable.
    pub fn correct_answer(&self) -> Result<&AnswerOption, ContentError> {
        if self.answers.is_empty() {
            return Err(ContentError::EmptyAnswers {
                question: self.id.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(self.answers.len());
        if let Some(dup) = self.answers.iter().find(|a| !seen.insert(a.id.as_str())) {
            return Err(ContentError::DuplicateAnswerId {
                question: self.id.clone(),
                answer: dup.id.clone(),
            });
        }

        self.answers
            .iter()
            .find(|a| a.id == self.correct_answer_id)
            .ok_or_else(|| ContentError::MissingCorrectAnswer {
                question: self.id.clone(),
                answer: self.correct_answer_id.clone(),
            })
    }

    /// Answers other than the correct one, in source order.
    pub fn distractors(&self) -> impl Iterator<Item = &AnswerOption> {
        self.answers
            .iter()
            .filter(move |a| a.id != self.correct_answer_id)
    }

    pub fn is_correct(&self, answer: &AnswerOption) -> bool {
        answer.id == self.correct_answer_id
    }
}

/// The ordered questions a session asks, front to back
#[derive(Debug, Clone, Default)]
pub struct QuestionSequence {
    questions: Vec<Question>,
}

impl QuestionSequence {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// A copy permuted once; used at session start, never mid-session.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut questions = self.questions.clone();
        questions.shuffle(rng);
        Self { questions }
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

impl From<Vec<Question>> for QuestionSequence {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub name: String,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn from_json_str(s: &str) -> Result<Self, BankError> {
        serde_json::from_str(s).map_err(|source| BankError::Parse { source })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BankError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| BankError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&data)?;
        tracing::info!(?path, name = %bank.name, questions = bank.questions.len(), "loaded question bank");
        Ok(bank)
    }

    /// Loads a bank compiled into the binary, by file stem.
    pub fn builtin(name: &str) -> Result<Self, BankError> {
        let contents = BANK_DIR
            .get_file(format!("{name}.json"))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| BankError::UnknownBuiltin {
                name: name.to_string(),
            })?;
        Self::from_json_str(contents)
    }

    pub fn builtin_names() -> Vec<String> {
        let mut names: Vec<String> = BANK_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Content problems, one per malformed question.
    pub fn check(&self) -> Vec<ContentError> {
        self.questions
            .iter()
            .filter_map(|q| q.correct_answer().err())
            .collect()
    }

    pub fn into_sequence(self) -> QuestionSequence {
        QuestionSequence::new(self.questions)
    }
}
