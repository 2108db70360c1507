//! Error types for configuration, content, and question bank loading

use std::path::PathBuf;
use thiserror::Error;

/// A `GameConfig` that cannot drive a session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("option_slots must be greater than zero")]
    ZeroOptionSlots,

    #[error("session_duration_secs must be greater than zero")]
    ZeroDuration,

    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidNumber { field: &'static str, value: f64 },
}

/// A question whose content cannot produce a round
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("question {question} has no answers")]
    EmptyAnswers { question: String },

    #[error("question {question} names correct answer {answer}, which is not among its answers")]
    MissingCorrectAnswer { question: String, answer: String },

    #[error("question {question} lists answer id {answer} more than once")]
    DuplicateAnswerId { question: String, answer: String },
}

/// Errors while loading a question bank
#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse question bank JSON")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("no built-in question bank named {name}")]
    UnknownBuiltin { name: String },
}
