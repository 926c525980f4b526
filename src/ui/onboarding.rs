use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{accent, bold, dim, keys_line, screen::Screen};
use crate::App;

const STEPS: [(&str, &str); 3] = [
    (
        "Add",
        "Create an item for each dikr you repeat. New items go to the top of the list.",
    ),
    (
        "Calibrate",
        "Time a few repetitions at your natural pace. Their average becomes the item's duration.",
    ),
    (
        "Count",
        "Start a free or target session and just recite. The count is elapsed time divided by the duration; a target pauses and saves itself once reached.",
    ),
];

pub struct OnboardingScreen;

impl Screen for OnboardingScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let [title, body, legend] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("dikr", accent()),
                Span::styled(format!("   {}", app.session.lang()), dim()),
            ])),
            title,
        );

        let lines: Vec<Line> = STEPS
            .iter()
            .enumerate()
            .flat_map(|(i, (head, text))| {
                [
                    Line::from(Span::styled(format!("{}. {head}", i + 1), bold())),
                    Line::from(Span::raw(*text)),
                    Line::default(),
                ]
            })
            .collect();
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), body);

        f.render_widget(
            Paragraph::new(keys_line(&[("enter", "start"), ("l", "language"), ("q", "quit")])),
            legend,
        );
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.session.complete_onboarding(),
            KeyCode::Char('l') => app.session.cycle_language(),
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => return false,
        }
        true
    }
}
