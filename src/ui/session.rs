use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

use dikr::{
    counting::progress_pct,
    models::SessionMode,
    stats::format_clock,
};

use super::{
    accent, bold, dim, keys_line,
    modal::{ConfirmAction, Modal},
    screen::Screen,
};
use crate::App;

const CANCEL_PROMPT: &str = "Cancel this session without saving?";

pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let s = &app.session;
        let Some(item) = s.selected_item() else {
            return;
        };
        let count = s.count().unwrap_or(0);
        let completed = s.is_completed();

        let [title, _, big, clock, gauge, state, _, legend] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(if s.mode() == SessionMode::Target { 1 } else { 0 }),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        let mode = match (s.mode(), s.target()) {
            (SessionMode::Target, Some(t)) => format!("target {t}"),
            (m, _) => m.to_string(),
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(item.name.clone(), accent()),
                Span::styled(format!("   {mode}"), dim()),
            ])),
            title,
        );

        let count_style = if completed {
            bold().fg(Color::Green)
        } else {
            bold()
        };
        f.render_widget(
            Paragraph::new(Span::styled(format!("{count}"), count_style))
                .alignment(Alignment::Center),
            big,
        );
        f.render_widget(
            Paragraph::new(Span::styled(format_clock(s.elapsed_ms()), dim()))
                .alignment(Alignment::Center),
            clock,
        );

        if s.mode() == SessionMode::Target {
            let pct = progress_pct(count, s.target());
            f.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Cyan))
                    .ratio((pct / 100.0).clamp(0.0, 1.0))
                    .label(format!("{count}/{}", s.target().unwrap_or(0))),
                gauge,
            );
        }

        let state_text = if completed {
            Span::styled("target reached", bold().fg(Color::Green))
        } else if s.is_running() {
            Span::styled("counting", bold().fg(Color::Yellow))
        } else if s.elapsed_ms() > 0 {
            Span::styled("paused", dim())
        } else {
            Span::styled("ready", dim())
        };
        f.render_widget(
            Paragraph::new(state_text).alignment(Alignment::Center),
            state,
        );

        let enter = if finishes(app) { "finish" } else { "cancel" };
        f.render_widget(
            Paragraph::new(keys_line(&[
                ("space", "start/pause"),
                ("enter", enter),
                ("x", "cancel"),
                ("b", "back"),
            ])),
            legend,
        );
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char(' ') => app.session.toggle(),
            KeyCode::Enter if finishes(app) => {
                app.session.finish_session(true);
                app.set_status("session saved");
            }
            KeyCode::Enter | KeyCode::Char('x') => {
                app.modal = Some(Modal::confirm(CANCEL_PROMPT, ConfirmAction::CancelSession));
            }
            KeyCode::Char('b') | KeyCode::Esc => app.session.go_home(),
            _ => return false,
        }
        true
    }
}

/// Paused with time on the clock: the main action saves
fn finishes(app: &App) -> bool {
    !app.session.is_running() && app.session.elapsed_ms() > 0
}
