// Library surface: the quiz engine and everything a front end needs to drive it.
// Terminal rendering stays bin-only in main.rs/ui.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod report;
pub mod resolver;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod time_series;
pub mod timers;
pub mod util;

pub use engine::{Cue, GameObserver, QuizEngine};
