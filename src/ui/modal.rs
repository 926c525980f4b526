//! Text prompts and yes/no questions drawn over the current screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use dikr::{
    backup,
    models::SessionMode,
    stats::{format_day, parse_day},
};

use super::{bold, centered, dim, keys_line};
use crate::App;

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    AddDikr,
    RenameDikr(String),
    TargetCount(String),
    ManualCount(String),
    ManualDate { dikr_id: String, count: u64 },
    ExportPath,
    ImportPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    ReplaceSession {
        dikr_id: String,
        mode: SessionMode,
        target: Option<u64>,
    },
    DeleteDikr(String),
    DeleteRecord(String),
    ClearHistory,
    CancelSession,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Input {
        title: String,
        value: String,
        action: InputAction,
    },
    Confirm {
        message: String,
        action: ConfirmAction,
    },
}

impl Modal {
    pub fn input(title: &str, value: &str, action: InputAction) -> Self {
        Modal::Input {
            title: title.to_string(),
            value: value.to_string(),
            action,
        }
    }

    pub fn confirm(message: impl Into<String>, action: ConfirmAction) -> Self {
        Modal::Confirm {
            message: message.into(),
            action,
        }
    }
}

fn positive(value: &str) -> Option<u64> {
    value.parse::<u64>().ok().filter(|n| *n > 0)
}

pub fn on_key(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.modal.take() else {
        return;
    };
    match modal {
        Modal::Input {
            title,
            mut value,
            action,
        } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => submit(app, action, value.trim()),
            KeyCode::Backspace => {
                value.pop();
                app.modal = Some(Modal::Input {
                    title,
                    value,
                    action,
                });
            }
            KeyCode::Char(c) => {
                value.push(c);
                app.modal = Some(Modal::Input {
                    title,
                    value,
                    action,
                });
            }
            _ => {
                app.modal = Some(Modal::Input {
                    title,
                    value,
                    action,
                })
            }
        },
        Modal::Confirm { message, action } => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => confirm(app, action),
            KeyCode::Char('n') | KeyCode::Esc => {}
            _ => app.modal = Some(Modal::Confirm { message, action }),
        },
    }
}

fn submit(app: &mut App, action: InputAction, value: &str) {
    match action {
        InputAction::AddDikr => {
            if app.session.add_dikr(value).is_some() {
                app.home_row = 0;
            } else {
                app.set_status("name cannot be empty");
            }
        }
        InputAction::RenameDikr(id) => {
            if !app.session.rename_dikr(&id, value) {
                app.set_status("name cannot be empty");
            }
        }
        InputAction::TargetCount(id) => match positive(value) {
            Some(n) => app.begin(id, SessionMode::Target, Some(n)),
            None => app.set_status("target must be a positive number"),
        },
        InputAction::ManualCount(dikr_id) => match positive(value) {
            Some(count) => {
                let today = format_day(app.session.now().timestamp_millis());
                app.modal = Some(Modal::input(
                    "Date (YYYY-MM-DD)",
                    &today,
                    InputAction::ManualDate { dikr_id, count },
                ));
            }
            None => app.set_status("count must be a positive number"),
        },
        InputAction::ManualDate { dikr_id, count } => match parse_day(value) {
            Some(date) => match app.session.add_manual_entry(&dikr_id, count, date) {
                Ok(_) => app.set_status(format!("added {count} repetitions on {value}")),
                Err(e) => app.set_status(e.to_string()),
            },
            None => app.set_status("date must look like YYYY-MM-DD"),
        },
        InputAction::ExportPath => {
            let path = if value.is_empty() {
                backup::default_file_name(app.session.now())
            } else {
                value.to_string()
            };
            match backup::write_file(&path, &app.session.export_bundle()) {
                Ok(()) => app.set_status(format!("exported to {path}")),
                Err(e) => app.set_status(e.to_string()),
            }
        }
        InputAction::ImportPath => match backup::read_file(value) {
            Ok(bundle) => {
                app.session.import_bundle(bundle);
                app.set_status(format!("imported {value}"));
            }
            Err(e) => {
                log::warn!("import of {value} failed: {e}");
                app.set_status(e.to_string());
            }
        },
    }
}

fn confirm(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::ReplaceSession {
            dikr_id,
            mode,
            target,
        } => {
            if let Err(e) = app.session.start_session(&dikr_id, mode, target, |_| true) {
                app.set_status(e.to_string());
            }
        }
        ConfirmAction::DeleteDikr(id) => {
            app.session.delete_dikr(&id);
        }
        ConfirmAction::DeleteRecord(id) => {
            app.session.delete_record(&id);
        }
        ConfirmAction::ClearHistory => app.session.clear_history(),
        ConfirmAction::CancelSession => app.session.cancel_session(),
    }
}

pub fn render(modal: &Modal, f: &mut Frame) {
    let area = centered(f.area(), 56, 7);
    f.render_widget(Clear, area);

    let (title, body, legend) = match modal {
        Modal::Input { title, value, .. } => (
            title.as_str(),
            Line::from(vec![
                Span::styled(value.clone(), bold()),
                Span::styled("_", Style::default().fg(Color::Cyan)),
            ]),
            keys_line(&[("enter", "ok"), ("esc", "cancel")]),
        ),
        Modal::Confirm { message, .. } => (
            "Confirm",
            Line::from(Span::raw(message.clone())),
            keys_line(&[("y", "yes"), ("n", "no")]),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {title} "), bold()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [text_area, _, keys_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    f.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }), text_area);
    f.render_widget(Paragraph::new(legend).style(dim()), keys_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn typing_edits_and_escape_discards() {
        let mut app = test_app();
        app.modal = Some(Modal::input("New item", "", InputAction::AddDikr));
        on_key(&mut app, KeyEvent::from(KeyCode::Char('a')));
        on_key(&mut app, KeyEvent::from(KeyCode::Char('b')));
        on_key(&mut app, KeyEvent::from(KeyCode::Backspace));
        assert_eq!(
            app.modal,
            Some(Modal::input("New item", "a", InputAction::AddDikr))
        );
        on_key(&mut app, KeyEvent::from(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert!(app.session.registry().is_empty());
    }

    #[test]
    fn blank_name_is_refused() {
        let mut app = test_app();
        app.modal = Some(Modal::input("New item", "   ", InputAction::AddDikr));
        on_key(&mut app, KeyEvent::from(KeyCode::Enter));
        assert!(app.session.registry().is_empty());
        assert_eq!(app.status.as_deref(), Some("name cannot be empty"));
    }

    #[test]
    fn other_keys_keep_the_question_open() {
        let mut app = test_app();
        app.modal = Some(Modal::confirm("Sure?", ConfirmAction::ClearHistory));
        on_key(&mut app, KeyEvent::from(KeyCode::Char('x')));
        assert!(app.modal.is_some());
        on_key(&mut app, KeyEvent::from(KeyCode::Char('n')));
        assert!(app.modal.is_none());
    }

    #[test]
    fn export_and_import_through_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let path_str = path.to_str().unwrap();

        let mut app = test_app();
        app.session.add_dikr("kept");
        app.modal = Some(Modal::input("Export to", path_str, InputAction::ExportPath));
        on_key(&mut app, KeyEvent::from(KeyCode::Enter));
        assert!(path.exists());

        let mut other = test_app();
        other.modal = Some(Modal::input("Import from", path_str, InputAction::ImportPath));
        on_key(&mut other, KeyEvent::from(KeyCode::Enter));
        assert_eq!(other.session.registry().items()[0].name, "kept");
    }

    #[test]
    fn positive_counts_only() {
        assert_eq!(positive("12"), Some(12));
        assert_eq!(positive("0"), None);
        assert_eq!(positive("-3"), None);
        assert_eq!(positive("abc"), None);
    }

    #[test]
    fn renders_over_the_screen() {
        let modal = Modal::confirm("Delete x?", ConfirmAction::DeleteDikr("x".into()));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(&modal, f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Delete x?"));
        assert!(content.contains("(y) yes"));
    }
}
