//! Category sidebar

use crate::model::CATEGORIES;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub struct CategoryList<'a> {
    /// Id of the active category.
    pub selected: &'a str,
    pub focused: bool,
}

impl<'a> CategoryList<'a> {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = CATEGORIES
            .iter()
            .map(|c| {
                let active = c.id == self.selected;
                let marker = if active { "●" } else { " " };
                let style = if active {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{marker} [{}] ", c.icon), Style::default().fg(Color::Cyan)),
                    Span::styled(c.name, style),
                ]))
            })
            .collect();

        let border = if self.focused { Color::Yellow } else { Color::DarkGray };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(" Categorías "),
            )
            .highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = ListState::default();
        if self.focused {
            state.select(index_of(self.selected));
        }
        f.render_stateful_widget(list, area, &mut state);
    }
}

/// Position of a category id in the sidebar.
pub fn index_of(id: &str) -> Option<usize> {
    CATEGORIES.iter().position(|c| c.id == id)
}

/// The category `delta` rows away from `id`, wrapping around.
pub fn step(id: &str, delta: isize) -> &'static str {
    let len = CATEGORIES.len() as isize;
    let current = index_of(id).unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len) as usize;
    CATEGORIES[next].id
}
