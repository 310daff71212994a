//! Navigation chrome
//!
//! Top bar with the route tabs and a bottom line with global key hints. The
//! chrome never navigates by itself; it turns keys into actions for the root.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use venta_nexus::Action;

/// (key, label, path)
pub const NAV_LINKS: &[(char, &str, &str)] = &[
    ('1', "Inicio", "/"),
    ('2', "Usuarios", "/users"),
    ('3', "404", "/404"),
];

pub struct NavBar<'a> {
    pub current_path: &'a str,
    pub api_label: &'a str,
}

impl<'a> NavBar<'a> {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                " Venta Libre Bolivia ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(self.api_label.chars().count() as u16 + 2)])
            .split(inner);

        let mut spans = Vec::new();
        for (key, label, path) in NAV_LINKS {
            let active = *path == self.current_path;
            let style = if active {
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" [{key}] {label} "), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            self.current_path.to_string(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

        let api = Paragraph::new(self.api_label)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right);
        f.render_widget(api, chunks[1]);
    }

    /// Chords that work on every page, even while a text field has focus.
    /// The root checks these before the page sees the key.
    pub fn global_key(key: &KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        if key.modifiers.contains(KeyModifiers::ALT) {
            return match key.code {
                KeyCode::Left => Some(Action::Back),
                KeyCode::Right => Some(Action::Forward),
                _ => None,
            };
        }
        None
    }

    /// Plain keys the chrome owns. Pages see these first.
    pub fn handle_key(key: &KeyEvent) -> Option<Action> {
        if let Some(action) = Self::global_key(key) {
            return Some(action);
        }
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('b') | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Char('f') => Some(Action::Forward),
            KeyCode::Char(c) => NAV_LINKS
                .iter()
                .find(|(key, _, _)| *key == c)
                .map(|(_, _, path)| Action::Navigate(path.to_string())),
            _ => None,
        }
    }
}

pub struct BottomNav {
    pub can_back: bool,
    pub can_forward: bool,
}

impl BottomNav {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);
        let on = Style::default().fg(Color::Black).bg(Color::Yellow);
        let line = Line::from(vec![
            Span::styled(" 1-3 ", on),
            Span::raw(" páginas  "),
            Span::styled(" b ", if self.can_back { on } else { dim }),
            Span::raw(" atrás  "),
            Span::styled(" f ", if self.can_forward { on } else { dim }),
            Span::raw(" adelante  "),
            Span::styled(" q ", on),
            Span::raw(" salir"),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}
