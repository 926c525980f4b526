use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use dikr::{
    backup,
    models::SessionMode,
    stats::{format_clock, format_time, stats_for, Period},
    util::secs_2dp,
};

use super::{
    accent, bold, dim, fit_width, keys_line,
    modal::{ConfirmAction, InputAction, Modal},
    screen::Screen,
};
use crate::App;

const NAME_COLUMNS: usize = 24;

pub struct HomeScreen;

fn banner(app: &App) -> Option<Line<'static>> {
    if !app.session.has_active_session() {
        return None;
    }
    let item = app.session.selected_item()?;
    let state = if app.session.is_running() {
        "running"
    } else {
        "paused"
    };
    let mut spans = vec![
        Span::styled("● ", Style::default().fg(Color::Yellow)),
        Span::styled(item.name.clone(), bold()),
        Span::raw(format!(
            "  {}  {}  {state}",
            app.session.mode(),
            format_clock(app.session.elapsed_ms())
        )),
    ];
    if let Some(count) = app.session.count() {
        spans.push(Span::raw(format!("  × {count}")));
    }
    spans.push(Span::styled("   (enter) resume", dim()));
    Some(Line::from(spans))
}

impl Screen for HomeScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let banner = banner(app);
        let [title, banner_area, totals, list, legend] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(if banner.is_some() { 2 } else { 0 }),
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .areas(area);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("dikr", accent()),
                Span::styled(format!("   {}", app.session.lang()), dim()),
            ])),
            title,
        );

        if let Some(line) = banner {
            f.render_widget(Paragraph::new(line), banner_area);
        }

        let now = app.session.now();
        let lang = app.session.lang();
        let records = app.session.history().records();
        let summary: Vec<Line> = [Period::Today, Period::Week, Period::All]
            .into_iter()
            .map(|p| {
                let s = stats_for(records, p, now);
                Line::from(vec![
                    Span::styled(format!("{:<6}", p.to_string()), dim()),
                    Span::styled(format!("{:>6} reps", s.count), bold()),
                    Span::raw(format!(
                        "  {:>12}  {} targets",
                        format_time(s.time_ms, lang),
                        s.targets_reached
                    )),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(summary), totals);

        let rows: Vec<ListItem> = app
            .session
            .registry()
            .items()
            .iter()
            .map(|item| {
                let today = stats_for(
                    app.session.history().filtered(Some(&item.id)),
                    Period::Today,
                    now,
                );
                let duration = match item.duration_ms() {
                    Some(ms) => Span::styled(format!("  {}", secs_2dp(ms)), dim()),
                    None => Span::styled("  not calibrated", Style::default().fg(Color::Red)),
                };
                let mut spans = vec![
                    Span::raw(fit_width(&item.name, NAME_COLUMNS)),
                    duration,
                    Span::styled(format!("  today {}", today.count), dim()),
                ];
                if today.targets_reached > 0 {
                    spans.push(Span::styled(
                        format!("  {} targets", today.targets_reached),
                        Style::default().fg(Color::Green),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let empty = rows.is_empty();
        let widget = List::new(rows)
            .block(Block::default().borders(Borders::TOP).title("items"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected((!empty).then_some(app.home_row));
        f.render_stateful_widget(widget, list, &mut state);

        f.render_widget(
            Paragraph::new(vec![
                keys_line(&[
                    ("a", "add"),
                    ("r", "rename"),
                    ("d", "delete"),
                    ("c", "calibrate"),
                    ("f", "free"),
                    ("t", "target"),
                ]),
                keys_line(&[
                    ("h/H", "history"),
                    ("l", "lang"),
                    ("o", "intro"),
                    ("e/i", "export/import"),
                    ("q", "quit"),
                ]),
            ]),
            legend,
        );
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        let highlighted = app.highlighted_dikr().cloned();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.home_row = app.home_row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => app.home_row += 1,
            KeyCode::Char('a') => {
                app.modal = Some(Modal::input("New item", "", InputAction::AddDikr));
            }
            KeyCode::Char('r') => {
                if let Some(item) = highlighted {
                    app.modal = Some(Modal::input(
                        "Rename",
                        &item.name,
                        InputAction::RenameDikr(item.id),
                    ));
                }
            }
            KeyCode::Char('d') => {
                if let Some(item) = highlighted {
                    app.modal = Some(Modal::confirm(
                        format!("Delete {}? Its history is kept.", item.name),
                        ConfirmAction::DeleteDikr(item.id),
                    ));
                }
            }
            KeyCode::Char('c') => {
                if let Some(item) = highlighted {
                    app.begin(item.id, SessionMode::Calibration, None);
                }
            }
            KeyCode::Char('f') => {
                if let Some(item) = highlighted {
                    app.begin(item.id, SessionMode::Free, None);
                }
            }
            KeyCode::Char('t') => {
                if let Some(item) = highlighted {
                    let default = app.session.config().default_target.to_string();
                    app.modal = Some(Modal::input(
                        "Target count",
                        &default,
                        InputAction::TargetCount(item.id),
                    ));
                }
            }
            KeyCode::Char('h') => {
                if let Some(item) = highlighted {
                    app.history_row = 0;
                    app.session.open_history(Some(&item.id));
                }
            }
            KeyCode::Char('H') => {
                app.history_row = 0;
                app.session.open_history(None);
            }
            KeyCode::Char('l') => app.session.cycle_language(),
            KeyCode::Char('o') => app.session.show_onboarding(),
            KeyCode::Char('e') => {
                let name = backup::default_file_name(app.session.now());
                app.modal = Some(Modal::input("Export to", &name, InputAction::ExportPath));
            }
            KeyCode::Char('i') => {
                app.modal = Some(Modal::input("Import from", "", InputAction::ImportPath));
            }
            KeyCode::Enter => {
                if !app.session.resume_session() {
                    return false;
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => return false,
        }
        true
    }
}
