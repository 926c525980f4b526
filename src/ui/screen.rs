use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use dikr::models::Screen as View;

use crate::{
    ui::{
        calibration::CalibrationScreen, history::HistoryScreen, home::HomeScreen,
        onboarding::OnboardingScreen, session::SessionScreen,
    },
    App,
};

/// A UI Screen boundary: responsible for rendering and its own keys
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
    /// Returns true if the key was handled
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Onboarding => Box::new(OnboardingScreen),
        View::Home => Box::new(HomeScreen),
        View::Calibration => Box::new(CalibrationScreen),
        View::Session => Box::new(SessionScreen),
        View::History => Box::new(HistoryScreen),
    }
}
