//! Root component
//!
//! Owns the router and the navigation chrome. Global chords such as Ctrl+C
//! are handled here first. Other keys go to the page; a
//! key the page leaves unhandled goes to the chrome.

use crate::api::HttpClient;
use crate::components::{BottomNav, NavBar};
use crate::config::{Config, ProductSource};
use crate::pages::{HomePage, NotFoundPage, ProductFeed, UsersPage};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;
use venta_nexus::{page, Action, AppContext, Component, Context, Event, EventContext, Router};

/// The route table: `/`, `/users` and `/404`.
pub fn build_router(config: &Config) -> Router {
    let client = HttpClient::new(&config.api_url);
    let feed = match config.source {
        ProductSource::Mock => ProductFeed::Mock {
            count: config.mock_products,
            latency: config.mock_latency,
        },
        ProductSource::Api => ProductFeed::Api(client.clone()),
    };

    let mut router = Router::new(&config.start_path).with_policy(config.reload_policy);
    router.add_route("/", page(HomePage::new(feed, config.search_debounce)));
    router.add_route("/users", page(UsersPage::new(client)));
    router.add_route("/404", page(NotFoundPage));
    router
}

pub struct Root {
    router: Router,
    api_label: String,
}

impl Root {
    pub fn new(router: Router, api_label: impl Into<String>) -> Self {
        Self {
            router,
            api_label: api_label.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let label = match config.source {
            ProductSource::Mock => format!("{} (productos de prueba)", config.api_url),
            ProductSource::Api => config.api_url.clone(),
        };
        Self::new(build_router(config), label)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Carry out a navigation action. Only `Quit` goes back to the run loop.
    fn dispatch(&mut self, action: Action, app: &AppContext) -> Option<Action> {
        match action {
            Action::Navigate(path) => {
                self.router.navigate_to(path, app);
            }
            Action::Back => {
                self.router.back(app);
            }
            Action::Forward => {
                self.router.forward(app);
            }
            Action::Reload => {
                self.router.reload(app);
            }
            Action::Quit => return Some(Action::Quit),
            Action::Noop => {}
        }
        None
    }
}

impl Component for Root {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        self.router.init(&cx.app);
    }

    fn on_shutdown(&mut self, cx: &mut Context<Self>) {
        tracing::info!(path = %self.router.current_path(), "shutting down");
        self.router.shutdown(&cx.app);
    }

    fn render(&mut self, frame: &mut Frame, cx: &mut Context<Self>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // nav bar
                Constraint::Min(0),    // page
                Constraint::Length(1), // bottom nav
            ])
            .split(cx.area);

        NavBar {
            current_path: self.router.mounted_path().unwrap_or(self.router.current_path()),
            api_label: &self.api_label,
        }
        .render(frame, rows[0]);

        let mut page_cx = cx.with_area(rows[1]);
        self.router.render(frame, &mut page_cx);

        BottomNav {
            can_back: self.router.can_go_back(),
            can_forward: self.router.can_go_forward(),
        }
        .render(frame, rows[2]);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        if let Event::Key(key) = &event {
            if let Some(action) = NavBar::global_key(key) {
                let app = cx.app.clone();
                return self.dispatch(action, &app);
            }
        }

        let action = match self.router.handle_event(event.clone(), cx) {
            Some(action) => action,
            None => match &event {
                Event::Key(key) => NavBar::handle_key(key)?,
                _ => return None,
            },
        };
        let app = cx.app.clone();
        self.dispatch(action, &app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;
    use std::time::Duration;
    use venta_nexus::Notifier;

    fn config() -> Config {
        Config {
            // Nothing listens on the discard port; user loads fail fast.
            api_url: "http://127.0.0.1:9/api/v1".to_string(),
            mock_latency: Duration::ZERO,
            ..Config::default()
        }
    }

    fn press(root: &mut Root, cx: &mut Context<Root>, code: KeyCode) -> Option<Action> {
        root.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), cx)
    }

    #[tokio::test]
    async fn test_keys_drive_the_router() {
        let (app, _rx) = AppContext::new(Notifier::default());
        let mut cx = Context::new(app, Rect::new(0, 0, 120, 40));
        let mut root = Root::from_config(&config());
        root.on_init(&mut cx);
        assert_eq!(root.router().mounted_path(), Some("/"));

        press(&mut root, &mut cx, KeyCode::Char('2'));
        assert_eq!(root.router().mounted_path(), Some("/users"));

        press(&mut root, &mut cx, KeyCode::Char('3'));
        assert_eq!(root.router().mounted_path(), Some("/404"));

        press(&mut root, &mut cx, KeyCode::Char('b'));
        assert_eq!(root.router().mounted_path(), Some("/users"));

        press(&mut root, &mut cx, KeyCode::Char('f'));
        assert_eq!(root.router().mounted_path(), Some("/404"));

        // The not-found page handles Enter itself.
        press(&mut root, &mut cx, KeyCode::Enter);
        assert_eq!(root.router().mounted_path(), Some("/"));
        assert!(!root.router().can_go_forward());

        assert_eq!(press(&mut root, &mut cx, KeyCode::Char('q')), Some(Action::Quit));
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_focus() {
        let (app, _rx) = AppContext::new(Notifier::default());
        let mut cx = Context::new(app, Rect::new(0, 0, 120, 40));
        let mut root = Root::from_config(&config());
        root.on_init(&mut cx);
        let ctrl_c = || Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(root.router().mounted_path(), Some("/"));
        assert_eq!(root.handle_event(ctrl_c(), &mut cx), Some(Action::Quit));

        // Search box focused: plain keys are text, the chord still quits.
        press(&mut root, &mut cx, KeyCode::Char('/'));
        assert_eq!(press(&mut root, &mut cx, KeyCode::Char('q')), None);
        assert_eq!(root.handle_event(ctrl_c(), &mut cx), Some(Action::Quit));

        let alt_left = Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT));
        press(&mut root, &mut cx, KeyCode::Esc);
        press(&mut root, &mut cx, KeyCode::Char('2'));
        assert_eq!(root.router().mounted_path(), Some("/users"));
        assert_eq!(root.handle_event(alt_left, &mut cx), None);
        assert_eq!(root.router().mounted_path(), Some("/"));
    }

    #[tokio::test]
    async fn test_unknown_start_path_falls_back_home() {
        let (app, _rx) = AppContext::new(Notifier::default());
        let mut cx = Context::new(app, Rect::new(0, 0, 120, 40));
        let mut root = Root::from_config(&Config {
            start_path: "/ofertas".to_string(),
            ..config()
        });
        root.on_init(&mut cx);
        assert_eq!(root.router().current_path(), "/ofertas");
        assert_eq!(root.router().mounted_path(), Some("/ofertas"));

        let home = root.router().current_page().map(|p| p.entity_id());
        press(&mut root, &mut cx, KeyCode::Char('1'));
        assert_eq!(root.router().current_page().map(|p| p.entity_id()), home);
    }
}
