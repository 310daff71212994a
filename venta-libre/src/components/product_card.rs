//! Product card

use crate::model::{category_name, format_price, Condition, Product};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows a card needs, borders included.
pub const CARD_HEIGHT: u16 = 6;

pub struct ProductCard<'a> {
    pub product: &'a Product,
    pub selected: bool,
}

impl<'a> ProductCard<'a> {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let p = self.product;
        let border = if self.selected { Color::Yellow } else { Color::DarkGray };
        let condition_color = match p.condition {
            Condition::New => Color::Green,
            Condition::Used => Color::Blue,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if self.selected { BorderType::Thick } else { BorderType::Plain })
            .border_style(Style::default().fg(border))
            .title(Span::styled(
                format!(" {} ", p.title),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(format!(" #{} ", p.id)).right_aligned());

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    format_price(p.price),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(format!("[{}]", p.condition.label()), Style::default().fg(condition_color)),
                Span::raw("  "),
                Span::styled(category_name(&p.category).to_string(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(Span::styled(p.description.as_str(), Style::default().fg(Color::Gray))),
            Line::from(vec![
                Span::raw(format!("{} · {} · ", p.seller, p.location)),
                Span::styled(p.distance.as_str(), Style::default().fg(Color::Magenta)),
            ]),
        ];

        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}
