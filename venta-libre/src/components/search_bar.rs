//! Single-line text input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct SearchBar<'a> {
    pub title: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    /// Render `value` as asterisks.
    pub masked: bool,
}

impl<'a> SearchBar<'a> {
    pub fn new(title: &'a str, value: &'a str) -> Self {
        Self {
            title,
            value,
            placeholder: "",
            focused: false,
            masked: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border = if self.focused { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.title));

        let text = if self.value.is_empty() && !self.focused {
            Span::styled(self.placeholder, Style::default().fg(Color::DarkGray))
        } else if self.masked {
            Span::raw("*".repeat(self.value.chars().count()))
        } else {
            Span::raw(self.value)
        };

        let mut spans = vec![text];
        if self.focused {
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

/// Applies an editing key to `value`. Returns false for keys that are not
/// edits, so the caller can handle them.
pub fn edit(value: &mut String, key: &KeyEvent) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Char(c) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_appends_and_pops() {
        let mut value = String::from("cel");
        assert!(edit(&mut value, &KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE)));
        assert!(edit(&mut value, &KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)));
        assert_eq!(value, "celuL");
        assert!(edit(&mut value, &KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)));
        assert_eq!(value, "celu");

        assert!(!edit(&mut value, &KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!edit(&mut value, &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert_eq!(value, "celu");
    }
}
