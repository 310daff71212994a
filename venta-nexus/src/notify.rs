//! Transient banner for errors nobody else handled.
//!
//! The run loop owns one `Notifier`; anything holding an `AppContext` can
//! raise a toast through it. Toasts expire by timestamp and are dropped on
//! the next loop tick, so there is no timer to cancel.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default time a toast stays on screen.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// A toast notification that auto-dismisses.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel, duration: Duration) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Check if the toast has expired and should be removed.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Render the toast in the bottom-right corner, on top of everything else.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = match self.level {
            ToastLevel::Info => Color::Cyan,
            ToastLevel::Error => Color::Red,
        };

        // 2 chars padding each side plus borders
        let width = (self.message.chars().count() as u16 + 4)
            .clamp(20, area.width.saturating_sub(4).max(20))
            .min(area.width);
        let height = 3.min(area.height);
        let x = area.right().saturating_sub(width + 2).max(area.x);
        let y = area.bottom().saturating_sub(height + 2).max(area.y);
        let toast_area = Rect::new(x, y, width, height);

        let title = match self.level {
            ToastLevel::Info => " Aviso ",
            ToastLevel::Error => " Error ",
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD));

        let text = Paragraph::new(self.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);

        frame.render_widget(Clear, toast_area);
        frame.render_widget(text, toast_area);
    }
}

/// Shared slot holding the toast currently on screen.
#[derive(Clone)]
pub struct Notifier {
    current: Arc<Mutex<Option<Toast>>>,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            duration,
        }
    }

    /// Show an error toast, replacing whatever is on screen.
    pub fn error(&self, message: impl Into<String>) {
        self.show(Toast::new(message, ToastLevel::Error, self.duration));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(Toast::new(message, ToastLevel::Info, self.duration));
    }

    pub fn show(&self, toast: Toast) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(toast);
        }
    }

    /// The live toast, if any. Expired toasts are not returned.
    pub fn current(&self) -> Option<Toast> {
        let slot = self.current.lock().ok()?;
        slot.as_ref().filter(|t| !t.is_expired()).cloned()
    }

    /// Drop an expired toast. Returns true when one was removed.
    pub fn prune(&self) -> bool {
        let Ok(mut slot) = self.current.lock() else {
            return false;
        };
        if slot.as_ref().is_some_and(Toast::is_expired) {
            *slot = None;
            return true;
        }
        false
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}
