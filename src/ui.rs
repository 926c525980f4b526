pub mod calibration;
pub mod history;
pub mod home;
pub mod modal;
pub mod onboarding;
pub mod screen;
pub mod session;

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn accent() -> Style {
    bold().fg(Color::Cyan)
}

/// Key legend: `(space) start  (b) back`
pub fn keys_line(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (i, (k, label)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("({k})"), bold()));
        spans.push(Span::styled(format!(" {label}"), dim()));
    }
    Line::from(spans)
}

/// Fit `text` into exactly `width` terminal columns, cutting with `…` when too wide
pub fn fit_width(text: &str, width: usize) -> String {
    let used = text.width();
    if used <= width {
        return format!("{text}{}", " ".repeat(width - used));
    }
    let mut out = String::new();
    let mut cols = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if cols + w + 1 > width {
            break;
        }
        out.push(c);
        cols += w;
    }
    out.push('…');
    out.push_str(&" ".repeat(width.saturating_sub(cols + 1)));
    out
}

/// A `width` × `height` box in the middle of `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn ui(app: &mut App, f: &mut Frame) {
    let [body, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)])
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .areas(f.area());

    let screen = screen::current_screen(app.session.screen());
    screen.render(app, f, body);

    if let Some(msg) = &app.status {
        f.render_widget(
            Paragraph::new(Span::styled(
                msg.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )),
            status,
        );
    }

    if let Some(m) = &app.modal {
        modal::render(m, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_formats_pairs() {
        let line = keys_line(&[("space", "start"), ("b", "back")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "(space) start  (b) back");
    }

    #[test]
    fn names_fit_their_column() {
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdefgh", 5), "abcd…");
        // wide glyphs take two columns each
        assert_eq!(fit_width("سُبْحَانَ", 4).width(), 4);
        assert_eq!(fit_width("漢字漢字", 5), "漢字…");
    }

    #[test]
    fn centered_box_fits_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered(area, 40, 6);
        assert_eq!((r.width, r.height), (40, 6));
        assert_eq!((r.x, r.y), (20, 9));

        let small = centered(Rect::new(0, 0, 10, 3), 40, 6);
        assert!(small.width <= 10 && small.height <= 3);
    }
}
