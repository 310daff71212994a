//! Path router.
//!
//! Maps path strings to page instances, keeps a browser-like [`History`] and
//! guarantees that exactly one page is mounted once [`Router::init`] has run.
//! Moving from one page to another always unmounts the outgoing page
//! (`on_exit`) before mounting the incoming one (`on_enter`).

mod history;

pub use history::History;

use crate::application::{AppContext, Context, EventContext};
use crate::component::traits::{Action, AnyComponent, Component, Event};
use crate::state::{Entity, EntityId};
use ratatui::layout::Rect;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A registered page. Identity is the entity id, so one page instance can
/// sit behind several paths.
pub type PageHandle = Entity<dyn AnyComponent>;

impl<T: Component> Entity<T> {
    /// Type-erase a component entity so it can be registered as a route.
    pub fn into_page(self) -> PageHandle {
        Entity {
            id: self.id,
            inner: self.inner,
            tx: self.tx,
        }
    }
}

/// Wrap a fresh component as a page handle.
pub fn page<T: Component>(component: T) -> PageHandle {
    Entity::new(component).into_page()
}

/// When a navigation that resolves to the already-mounted page remounts it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Skip when the resolved page is the mounted instance, whatever the path.
    SameInstance,
    /// Skip only when the requested path equals the mounted path.
    #[default]
    SamePath,
    /// Every navigation remounts.
    Always,
}

impl FromStr for ReloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "same-instance" => Ok(Self::SameInstance),
            "same-path" => Ok(Self::SamePath),
            "always" => Ok(Self::Always),
            other => Err(format!(
                "Unknown reload policy: '{other}'. Available: same-instance, same-path, always"
            )),
        }
    }
}

impl fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SameInstance => "same-instance",
            Self::SamePath => "same-path",
            Self::Always => "always",
        };
        f.write_str(name)
    }
}

struct Mounted {
    /// Location path that was requested, before any fallback.
    path: String,
    page: PageHandle,
}

/// Route table plus mount state.
pub struct Router {
    routes: HashMap<String, PageHandle>,
    history: History,
    fallback: String,
    policy: ReloadPolicy,
    mounted: Option<Mounted>,
    initialized: bool,
    area: Rect,
}

impl Router {
    /// Create an unmounted router whose history starts at `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            routes: HashMap::new(),
            history: History::new(initial),
            fallback: "/".to_string(),
            policy: ReloadPolicy::default(),
            mounted: None,
            initialized: false,
            area: Rect::default(),
        }
    }

    /// Path whose page is shown when nothing matches. Defaults to `/`.
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = path.into();
        self
    }

    pub fn with_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register `page` under the exact path. A later registration for the
    /// same path replaces the earlier one, which is returned.
    pub fn add_route(&mut self, path: impl Into<String>, page: PageHandle) -> Option<PageHandle> {
        let path = path.into();
        tracing::debug!(path = %path, page = %page.entity_id(), "route registered");
        self.routes.insert(path, page)
    }

    /// Page for `path`, falling back to the fallback path's page.
    pub fn resolve(&self, path: &str) -> Option<&PageHandle> {
        self.routes
            .get(path)
            .or_else(|| self.routes.get(&self.fallback))
    }

    /// Run `on_init` on every registered page once, then mount the page for
    /// the current history entry.
    pub fn init(&mut self, app: &AppContext) -> bool {
        if !self.initialized {
            self.initialized = true;
            let mut cx = self.lifecycle_cx(app);
            for page in self.distinct_pages() {
                if let Err(err) = page.update(|p| p.on_init_any(&mut cx)) {
                    tracing::warn!(error = %err, "page init skipped");
                }
            }
        }
        self.load_current_page(app)
    }

    /// Push `path` onto the history and load it.
    pub fn navigate_to(&mut self, path: impl Into<String>, app: &AppContext) -> bool {
        let path = path.into();
        tracing::info!(path = %path, "navigate");
        self.history.push(path);
        self.load_current_page(app)
    }

    /// Mount the page for the current history entry. Returns true when a
    /// mount happened, false when the policy kept the mounted page or no
    /// page resolves at all.
    pub fn load_current_page(&mut self, app: &AppContext) -> bool {
        let path = self.history.current().to_string();
        let Some(page) = self.resolve(&path).cloned() else {
            tracing::warn!(path = %path, fallback = %self.fallback, "no page for path and no fallback page");
            return false;
        };

        if let Some(mounted) = &self.mounted {
            let keep = match self.policy {
                ReloadPolicy::SameInstance => mounted.page.entity_id() == page.entity_id(),
                ReloadPolicy::SamePath => mounted.path == path,
                ReloadPolicy::Always => false,
            };
            if keep {
                tracing::debug!(path = %path, policy = %self.policy, "page already mounted");
                return false;
            }
        }

        self.mount(path, page, app);
        true
    }

    /// History back, then reload. False if there was nothing to go back to.
    pub fn back(&mut self, app: &AppContext) -> bool {
        if !self.history.back() {
            return false;
        }
        self.load_current_page(app);
        true
    }

    /// History forward, then reload.
    pub fn forward(&mut self, app: &AppContext) -> bool {
        if !self.history.forward() {
            return false;
        }
        self.load_current_page(app);
        true
    }

    /// Remount the current page regardless of the reload policy.
    pub fn reload(&mut self, app: &AppContext) -> bool {
        let path = self.history.current().to_string();
        let Some(page) = self.resolve(&path).cloned() else {
            return false;
        };
        self.mount(path, page, app);
        true
    }

    fn mount(&mut self, path: String, page: PageHandle, app: &AppContext) {
        let mut cx = self.lifecycle_cx(app);
        if let Some(previous) = self.mounted.take() {
            if let Err(err) = previous.page.update(|p| p.on_exit_any(&mut cx)) {
                tracing::warn!(error = %err, path = %previous.path, "unmount failed");
            }
        }
        if let Err(err) = page.update(|p| p.on_enter_any(&mut cx)) {
            tracing::warn!(error = %err, path = %path, "mount failed");
        }
        tracing::debug!(path = %path, page = %page.entity_id(), "page mounted");
        self.mounted = Some(Mounted { path, page });
        app.refresh();
    }

    /// Render the mounted page. Draws nothing before `init`.
    pub fn render<V: ?Sized>(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<V>) {
        self.area = cx.area;
        let Some(mounted) = &self.mounted else {
            return;
        };
        let mut cx = cx.cast::<dyn AnyComponent>();
        if let Err(err) = mounted.page.update(|p| p.render_any(frame, &mut cx)) {
            tracing::warn!(error = %err, "render skipped");
        }
    }

    /// Forward an event to the mounted page.
    pub fn handle_event<V: ?Sized>(&mut self, event: Event, cx: &mut EventContext<V>) -> Option<Action> {
        let mounted = self.mounted.as_ref()?;
        let mut cx = cx.cast::<dyn AnyComponent>();
        match mounted.page.update(|p| p.handle_event_any(event, &mut cx)) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(error = %err, "event dropped");
                None
            }
        }
    }

    /// Unmount the current page and shut every page down.
    pub fn shutdown(&mut self, app: &AppContext) {
        let mut cx = self.lifecycle_cx(app);
        if let Some(mounted) = self.mounted.take() {
            let _ = mounted.page.update(|p| p.on_exit_any(&mut cx));
        }
        for page in self.distinct_pages() {
            let _ = page.update(|p| p.on_shutdown_any(&mut cx));
        }
    }

    /// Requested path of the history entry at the cursor.
    pub fn current_path(&self) -> &str {
        self.history.current()
    }

    /// Path the mounted page was mounted for.
    pub fn mounted_path(&self) -> Option<&str> {
        self.mounted.as_ref().map(|m| m.path.as_str())
    }

    pub fn current_page(&self) -> Option<&PageHandle> {
        self.mounted.as_ref().map(|m| &m.page)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    fn lifecycle_cx(&self, app: &AppContext) -> Context<dyn AnyComponent> {
        Context::new(app.clone(), self.area)
    }

    fn distinct_pages(&self) -> Vec<PageHandle> {
        let mut seen: HashSet<EntityId> = HashSet::new();
        let mut pages: Vec<PageHandle> = self
            .routes
            .values()
            .filter(|p| seen.insert(p.entity_id()))
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.entity_id());
        pages
    }
}
