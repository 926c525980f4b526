use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use dikr::util::secs_2dp;

use super::{
    accent, bold, dim, keys_line,
    modal::{ConfirmAction, Modal},
    screen::Screen,
};
use crate::App;

pub struct CalibrationScreen;

/// One bar per attempt, labelled by its index, height in milliseconds
fn attempt_bars(attempts: &[f64]) -> Vec<Bar<'static>> {
    attempts
        .iter()
        .enumerate()
        .map(|(i, ms)| {
            Bar::default()
                .value(ms.round() as u64)
                .label(Line::from(format!("{}", i + 1)))
                .text_value(secs_2dp(*ms))
        })
        .collect()
}

impl Screen for CalibrationScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let s = &app.session;
        let Some(item) = s.selected_item() else {
            return;
        };
        let cal = s.calibration();
        let live = s.elapsed_ms();

        let [title, hint, clock, state, summary, chart, legend] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(item.name.clone(), accent()),
                Span::styled("   calibration", dim()),
            ])),
            title,
        );
        f.render_widget(
            Paragraph::new(Span::styled(
                "Start, say it once at your usual pace, stop. Repeat a few times.",
                dim(),
            )),
            hint,
        );
        f.render_widget(
            Paragraph::new(Span::styled(secs_2dp(live as f64), bold()))
                .alignment(Alignment::Center),
            clock,
        );
        let state_text = if s.is_running() {
            Span::styled("timing", bold().fg(Color::Yellow))
        } else {
            Span::styled("stopped", dim())
        };
        f.render_widget(
            Paragraph::new(state_text).alignment(Alignment::Center),
            state,
        );

        let summary_line = match (cal.average(live), cal.spread(live)) {
            (Some(avg), Some(sd)) => Line::from(vec![
                Span::styled("average ", dim()),
                Span::styled(secs_2dp(avg), bold()),
                Span::styled(format!("  ± {}", secs_2dp(sd)), dim()),
                Span::styled(format!("  over {} attempts", cal.attempts().len()), dim()),
            ]),
            _ => Line::from(Span::styled("no attempt yet", dim())),
        };
        f.render_widget(
            Paragraph::new(summary_line).alignment(Alignment::Center),
            summary,
        );

        if !cal.is_empty() {
            let bars = attempt_bars(cal.attempts());
            f.render_widget(
                BarChart::default()
                    .block(Block::default().borders(Borders::TOP).title("attempts"))
                    .bar_width(6)
                    .bar_gap(1)
                    .bar_style(Style::default().fg(Color::Cyan))
                    .data(BarGroup::default().bars(&bars)),
                chart,
            );
        }

        f.render_widget(
            Paragraph::new(keys_line(&[
                ("space", "start/stop"),
                ("x", "clear"),
                ("s", "save"),
                ("c", "cancel"),
                ("b", "back"),
            ])),
            legend,
        );
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char(' ') => app.session.calibration_toggle(),
            KeyCode::Char('x') => {
                app.session.calibration_clear();
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                let name = app
                    .session
                    .selected_item()
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                match app.session.calibration_commit() {
                    Some(avg) => app.set_status(format!("{name}: {} per repetition", secs_2dp(avg))),
                    None => app.set_status("stop the timer after at least one repetition first"),
                }
            }
            KeyCode::Char('c') => {
                app.modal = Some(Modal::confirm(
                    "Leave calibration without saving?",
                    ConfirmAction::CancelSession,
                ));
            }
            KeyCode::Char('b') | KeyCode::Esc => app.session.go_home(),
            _ => return false,
        }
        true
    }
}
