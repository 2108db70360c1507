use molequiz::{clock::TimeSource, session::Phase};
use ratatui::Frame;

use crate::{
    ui::{render_game, render_results, render_start},
    App,
};

/// A UI screen boundary, chosen by the session phase
pub trait Screen<C: TimeSource> {
    fn render(&self, app: &App<C>, f: &mut Frame);
}

/// Title screen shown while idle
pub struct StartScreen;

impl<C: TimeSource> Screen<C> for StartScreen {
    fn render(&self, app: &App<C>, f: &mut Frame) {
        let area = f.area();
        render_start(app, area, f.buffer_mut());
    }
}

/// Prompt, clock and the mole board
pub struct GameScreen;

impl<C: TimeSource> Screen<C> for GameScreen {
    fn render(&self, app: &App<C>, f: &mut Frame) {
        let area = f.area();
        render_game(app, area, f.buffer_mut());
    }
}

pub struct ResultsScreen;

impl<C: TimeSource> Screen<C> for ResultsScreen {
    fn render(&self, app: &App<C>, f: &mut Frame) {
        let area = f.area();
        render_results(app, area, f.buffer_mut());
    }
}

pub fn current_screen<C: TimeSource>(phase: Phase) -> Box<dyn Screen<C>> {
    match phase {
        Phase::Idle => Box::new(StartScreen),
        Phase::Active => Box::new(GameScreen),
        Phase::Ended => Box::new(ResultsScreen),
    }
}
