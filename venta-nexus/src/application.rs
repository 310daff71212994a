//! Application run loop and the contexts handed to components.

use crate::component::traits::{Action, AnyComponent, Component, Event};
use crate::notify::{Notifier, DEFAULT_TOAST_DURATION};
use crate::state::Entity;
use crate::task::TaskHandle;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use snafu::ResultExt;
use std::future::Future;
use std::io::{self, stdout};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

type RootSlot = Arc<Mutex<Option<Arc<Mutex<dyn AnyComponent>>>>>;

/// Application context providing access to global services.
#[derive(Clone)]
pub struct AppContext {
    root: RootSlot,
    re_render_tx: mpsc::UnboundedSender<()>,
    notifier: Notifier,
}

impl AppContext {
    /// Build a detached context. The receiver yields one message per
    /// requested redraw.
    pub fn new(notifier: Notifier) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (re_render_tx, re_render_rx) = mpsc::unbounded_channel();
        let cx = Self {
            root: Arc::new(Mutex::new(None)),
            re_render_tx,
            notifier,
        };
        (cx, re_render_rx)
    }

    /// Set the root component of the application.
    pub fn set_root<C: Component>(&self, root: C) -> crate::Result<()> {
        let root: Arc<Mutex<dyn AnyComponent>> = Arc::new(Mutex::new(root));
        let mut guard = self
            .root
            .lock()
            .map_err(|_| crate::Error::LockPoisoned { what: "root slot" })?;
        *guard = Some(root);
        drop(guard);
        self.refresh();
        Ok(())
    }

    /// Trigger a re-render.
    pub fn refresh(&self) {
        let _ = self.re_render_tx.send(());
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Redraw whenever `entity` changes, for as long as it is alive.
    pub fn watch<T>(&self, entity: &Entity<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut rx = entity.subscribe();
        let tx = self.re_render_tx.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
    }

    /// Spawn a fallible background task.
    ///
    /// An `Err` returned by the task is logged and surfaced as an error
    /// toast; the application keeps running.
    pub fn spawn_task<F, Fut>(&self, f: F) -> TaskHandle
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let cx = self.clone();
        let handle = tokio::spawn(async move {
            let reporter = cx.clone();
            if let Err(err) = f(cx).await {
                tracing::error!(error = %format!("{err:#}"), "background task failed");
                reporter.notifier.error(format!("{err:#}"));
                reporter.refresh();
            }
        });
        TaskHandle::new(handle.abort_handle())
    }
}

/// A specialized context passed to component methods.
pub struct Context<V: ?Sized> {
    pub app: AppContext,
    pub area: Rect,
    _view: PhantomData<fn(&V)>,
}

impl<V: ?Sized> Context<V> {
    pub fn new(app: AppContext, area: Rect) -> Self {
        Self {
            app,
            area,
            _view: PhantomData,
        }
    }

    /// Access the underlying AppContext.
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Same app and area, seen from another view type.
    pub fn cast<U: ?Sized>(&self) -> Context<U> {
        Context::new(self.app.clone(), self.area)
    }

    /// Same app, narrowed to a sub-area.
    pub fn with_area(&self, area: Rect) -> Self {
        Context::new(self.app.clone(), area)
    }

    /// See [`AppContext::spawn_task`].
    pub fn spawn_task<F, Fut>(&self, f: F) -> TaskHandle
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.app.spawn_task(f)
    }

    /// Explicitly trigger a re-render.
    pub fn notify(&self) {
        self.app.refresh();
    }
}

/// Event handlers get the same context as render.
pub type EventContext<V> = Context<V>;

/// Main application handle.
pub struct Application {
    toast_duration: Duration,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self {
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }

    /// How long error banners stay on screen.
    pub fn toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// Run the application. `setup` receives the context and must call
    /// [`AppContext::set_root`].
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&AppContext) -> anyhow::Result<()>,
    {
        let rt = Runtime::new().context(crate::error::RuntimeSnafu)?;

        let notifier = Notifier::new(self.toast_duration);
        let (app_context, re_render_rx) = AppContext::new(notifier.clone());
        install_panic_hook(app_context.clone());

        let _guard = rt.enter();
        setup(&app_context)?;
        drop(_guard);

        let root = {
            let guard = app_context
                .root
                .lock()
                .map_err(|_| anyhow::anyhow!("Root mutex poisoned"))?;
            guard.clone()
        };
        let root = root.unwrap_or_else(|| Arc::new(Mutex::new(DummyView)));

        let result = rt.block_on(async move { self.run_loop(app_context, root, re_render_rx).await });
        // Terminal restored; panics go to stderr again.
        let _ = std::panic::take_hook();
        result
    }

    async fn run_loop(
        &self,
        app: AppContext,
        root: Arc<Mutex<dyn AnyComponent>>,
        re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        enable_raw_mode().context(crate::error::TerminalSnafu)?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableFocusChange)
            .context(crate::error::TerminalSnafu)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context(crate::error::TerminalSnafu)?;

        let result = self.start_and_loop(app, &mut terminal, root, re_render_rx).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            event::DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn start_and_loop(
        &self,
        app: AppContext,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        root: Arc<Mutex<dyn AnyComponent>>,
        mut re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        {
            let area = full_area(terminal)?;
            let mut guard = root
                .lock()
                .map_err(|_| anyhow::anyhow!("Root mutex poisoned during on_init"))?;
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), area);
            guard.on_init_any(&mut cx);
        }

        app.refresh();

        loop {
            tokio::select! {
                Some(()) = re_render_rx.recv() => {
                    // Coalesce redraw requests queued since the last frame.
                    while re_render_rx.try_recv().is_ok() {}
                    self.draw(&app, terminal, &root)?;
                }
                event_ready = async { event::poll(Duration::from_millis(100)) } => {
                    if !event_ready? {
                        if app.notifier.prune() {
                            app.refresh();
                        }
                        continue;
                    }
                    let Some(event) = translate(event::read()?) else {
                        continue;
                    };

                    let area = full_area(terminal)?;
                    let mut cx = EventContext::<dyn AnyComponent>::new(app.clone(), area);
                    let mut guard = root
                        .lock()
                        .map_err(|_| anyhow::anyhow!("Root mutex poisoned during event"))?;
                    let action = guard.handle_event_any(event, &mut cx);
                    app.refresh();

                    if action == Some(Action::Quit) {
                        guard.on_shutdown_any(&mut cx);
                        tracing::info!("shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn draw(
        &self,
        app: &AppContext,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        root: &Arc<Mutex<dyn AnyComponent>>,
    ) -> anyhow::Result<()> {
        let mut guard = root
            .lock()
            .map_err(|_| anyhow::anyhow!("Root mutex poisoned during render"))?;
        terminal.draw(|frame| {
            let area = frame.area();
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), area);
            guard.render_any(frame, &mut cx);
            if let Some(toast) = app.notifier.current() {
                toast.render(frame, area);
            }
        })?;
        Ok(())
    }
}

fn full_area(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        CrosstermEvent::FocusGained => Some(Event::FocusGained),
        CrosstermEvent::FocusLost => Some(Event::FocusLost),
        CrosstermEvent::Paste(s) => Some(Event::Paste(s)),
        _ => None,
    }
}

/// Log a panic and raise it as an error toast.
fn report_panic(app: &AppContext, message: &str) {
    tracing::error!(panic = %message, "unhandled panic");
    app.notifier.error(format!("Error inesperado: {message}"));
    app.refresh();
}

/// Panics in background tasks end up in the log and on the banner instead
/// of scribbling over the alternate screen. A panic on the UI thread first
/// restores the terminal, then runs the previous hook so it reaches stderr.
fn install_panic_hook(app: AppContext) {
    let previous = std::panic::take_hook();
    let ui_thread = std::thread::current().id();
    std::panic::set_hook(Box::new(move |info| {
        report_panic(&app, &info.to_string());
        if std::thread::current().id() == ui_thread {
            restore_terminal();
            previous(info);
        }
    }));
}

/// Best effort; the terminal may already be restored.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        event::DisableFocusChange
    );
}

struct DummyView;

impl Component for DummyView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let paragraph = ratatui::widgets::Paragraph::new("No component set")
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, cx.area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLevel;

    #[tokio::test]
    async fn test_failed_task_raises_toast() {
        let (cx, mut rx) = AppContext::new(Notifier::default());
        let handle = cx.spawn_task(|_| async { Err::<(), _>(anyhow::anyhow!("sin conexión")) });
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        let toast = cx.notifier().current().expect("toast raised");
        assert!(toast.message.contains("sin conexión"));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_panic_report_raises_error_toast() {
        let (cx, mut rx) = AppContext::new(Notifier::default());
        report_panic(&cx, "index out of bounds");

        let toast = cx.notifier().current().expect("toast raised");
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.message.contains("index out of bounds"));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_successful_task_is_silent() {
        let (cx, _rx) = AppContext::new(Notifier::default());
        let handle = cx.spawn_task(|_| async { Ok::<(), anyhow::Error>(()) });
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        assert!(cx.notifier().current().is_none());
    }

    #[tokio::test]
    async fn test_watch_forwards_entity_changes() {
        let (cx, mut rx) = AppContext::new(Notifier::default());
        let entity = Entity::new(0u8);
        cx.watch(&entity);
        tokio::task::yield_now().await;
        entity.update(|n| *n = 7).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert_eq!(got.unwrap(), Some(()));
    }
}
