use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use dikr::{
    models::{SessionMode, SessionRecord},
    stats::{format_date, format_duration, format_time, stats_for, Period},
};

use super::{
    accent, bold, dim, keys_line,
    modal::{ConfirmAction, InputAction, Modal},
    screen::Screen,
};
use crate::App;

pub struct HistoryScreen;

fn count_cell(r: &SessionRecord) -> String {
    match (r.mode, r.target) {
        (SessionMode::Target, Some(t)) => format!("{}/{t}", r.count),
        _ => r.count.to_string(),
    }
}

fn visible(app: &App) -> Vec<&SessionRecord> {
    app.session.history().sorted(app.session.history_filter())
}

/// The filtered item, or the one highlighted on the home list
fn manual_entry_item(app: &App) -> Option<(String, String)> {
    let item = match app.session.history_filter() {
        Some(id) => app.session.registry().get(id),
        None => app.highlighted_dikr(),
    }?;
    Some((item.id.clone(), item.name.clone()))
}

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let [title, table, legend] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let scope = match app.session.history_filter() {
            Some(id) => app
                .session
                .registry()
                .get(id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "deleted item".to_string()),
            None => "all items".to_string(),
        };
        let records = visible(app);
        let totals = stats_for(records.iter().copied(), Period::All, app.session.now());
        f.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("history", accent()),
                    Span::styled(format!("   {scope}   {} sessions", records.len()), dim()),
                ]),
                Line::from(Span::styled(
                    format!(
                        "{} reps · {} · {} targets reached",
                        totals.count,
                        format_time(totals.time_ms, app.session.lang()),
                        totals.targets_reached
                    ),
                    dim(),
                )),
            ]),
            title,
        );

        let rows = records.iter().map(|r| {
            let style = if r.reached_target() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format_date(r.date)),
                Cell::from(r.dikr_name.clone()),
                Cell::from(r.mode.to_string()),
                Cell::from(count_cell(r)),
                Cell::from(format_duration(r.duration_ms)),
            ])
            .style(style)
        });

        let widget = Table::new(
            rows,
            [
                Constraint::Length(13),
                Constraint::Min(10),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(9),
            ],
        )
        .header(Row::new(vec!["date", "item", "mode", "count", "time"]).style(bold()))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state =
            TableState::default().with_selected((!records.is_empty()).then_some(app.history_row));
        f.render_stateful_widget(widget, table, &mut state);

        f.render_widget(
            Paragraph::new(keys_line(&[
                ("d", "delete"),
                ("C", "clear"),
                ("m", "manual entry"),
                ("b", "back"),
            ])),
            legend,
        );
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.history_row = app.history_row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => app.history_row += 1,
            KeyCode::Char('d') => {
                let Some(id) = visible(app).get(app.history_row).map(|r| r.id.clone()) else {
                    return false;
                };
                app.modal = Some(Modal::confirm(
                    "Delete this session?",
                    ConfirmAction::DeleteRecord(id),
                ));
            }
            KeyCode::Char('C') => {
                let msg = if app.session.history_filter().is_some() {
                    "Clear this item's history?"
                } else {
                    "Clear the whole history?"
                };
                app.modal = Some(Modal::confirm(msg, ConfirmAction::ClearHistory));
            }
            KeyCode::Char('m') => match manual_entry_item(app) {
                Some((id, name)) => {
                    app.modal = Some(Modal::input(
                        &format!("Repetitions of {name}"),
                        "",
                        InputAction::ManualCount(id),
                    ));
                }
                None => app.set_status("add an item first"),
            },
            KeyCode::Char('b') | KeyCode::Esc => app.session.go_home(),
            _ => return false,
        }
        true
    }
}
