use crate::application::{Context, EventContext};

/// Event type for component interactions.
#[derive(Debug, Clone)]
pub enum Event {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
}

/// Action that a component can return after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Push a path onto the history and load it.
    Navigate(String),
    Back,
    Forward,
    /// Remount the current page.
    Reload,
    Quit,
    Noop,
}

/// The core Component trait for implementers.
///
/// A page is mounted with `on_enter` each time the router makes it current
/// and unmounted with `on_exit` when it stops being current. `render` is
/// called every frame while mounted and must only draw from state.
pub trait Component: Send + Sync + 'static {
    /// Called once, before the first mount.
    fn on_init(&mut self, cx: &mut Context<Self>) {
        let _ = cx;
    }

    /// Called every time the component becomes the current page.
    fn on_enter(&mut self, cx: &mut Context<Self>) {
        let _ = cx;
    }

    /// Called when the component stops being the current page.
    fn on_exit(&mut self, cx: &mut Context<Self>) {
        let _ = cx;
    }

    /// Called when the application is about to shut down.
    fn on_shutdown(&mut self, cx: &mut Context<Self>) {
        let _ = cx;
    }

    /// Render the component into `cx.area`.
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>);

    /// Handle an event, returning an optional action.
    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let _ = event;
        let _ = cx;
        None
    }
}

/// A dyn-compatible version of the Component trait.
pub trait AnyComponent: Send + Sync + 'static {
    fn on_init_any(&mut self, cx: &mut Context<dyn AnyComponent>);
    fn on_enter_any(&mut self, cx: &mut Context<dyn AnyComponent>);
    fn on_exit_any(&mut self, cx: &mut Context<dyn AnyComponent>);
    fn on_shutdown_any(&mut self, cx: &mut Context<dyn AnyComponent>);
    fn render_any(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<dyn AnyComponent>);
    fn handle_event_any(&mut self, event: Event, cx: &mut EventContext<dyn AnyComponent>) -> Option<Action>;
}

impl<T: Component> AnyComponent for T {
    fn on_init_any(&mut self, cx: &mut Context<dyn AnyComponent>) {
        self.on_init(&mut cx.cast());
    }

    fn on_enter_any(&mut self, cx: &mut Context<dyn AnyComponent>) {
        self.on_enter(&mut cx.cast());
    }

    fn on_exit_any(&mut self, cx: &mut Context<dyn AnyComponent>) {
        self.on_exit(&mut cx.cast());
    }

    fn on_shutdown_any(&mut self, cx: &mut Context<dyn AnyComponent>) {
        self.on_shutdown(&mut cx.cast());
    }

    fn render_any(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<dyn AnyComponent>) {
        self.render(frame, &mut cx.cast());
    }

    fn handle_event_any(&mut self, event: Event, cx: &mut EventContext<dyn AnyComponent>) -> Option<Action> {
        self.handle_event(event, &mut cx.cast())
    }
}
