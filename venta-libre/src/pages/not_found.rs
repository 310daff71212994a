//! Shown for `/404`.

use crate::components::placeholder::render_hints;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use venta_nexus::{Action, Component, Context, Event, EventContext};

#[derive(Debug, Default)]
pub struct NotFoundPage;

impl Component for NotFoundPage {
    fn render(&mut self, frame: &mut Frame, cx: &mut Context<Self>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        let text = vec![
            Line::from(""),
            Line::styled("404", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Line::from(""),
            Line::from("Página no encontrada"),
            Line::styled(
                "La página que buscas no existe o fue movida.",
                Style::default().fg(Color::DarkGray),
            ),
        ];
        let panel = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(panel, rows[0]);
        render_hints(frame, rows[1], &[("Enter", "volver al inicio")]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Key(key) if key.code == KeyCode::Enter || key.code == KeyCode::Char('h') => {
                Some(Action::Navigate("/".to_string()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;
    use venta_nexus::{AppContext, Notifier};

    #[test]
    fn test_enter_goes_home() {
        let (app, _rx) = AppContext::new(Notifier::default());
        let mut cx = Context::new(app, Rect::new(0, 0, 80, 24));
        let mut page = NotFoundPage;
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(page.handle_event(enter, &mut cx), Some(Action::Navigate("/".into())));
        let other = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(page.handle_event(other, &mut cx), None);
    }
}
