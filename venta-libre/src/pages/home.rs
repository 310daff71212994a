//! Catalog page: categories, debounced search, filter controls and product
//! cards.

use super::LoadState;
use crate::api::{ApiError, HttpClient};
use crate::components::category_list;
use crate::components::placeholder::{render_error, render_hints, render_loading};
use crate::components::product_card::CARD_HEIGHT;
use crate::components::{CategoryList, ProductCard, SearchBar};
use crate::filters::{filter_products, Criteria, Filters};
use crate::mock::generate_products;
use crate::model::{category_name, format_price, Product};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Duration;
use venta_nexus::{Action, Component, Context, Entity, Event, EventContext, TaskHandle, TaskTracker};

const MOCK_SEED: u64 = 2024;
const MIN_PRICE_STEPS: [f64; 4] = [0.0, 100.0, 500.0, 1_000.0];
const MAX_PRICE_STEPS: [f64; 5] = [500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0];
const DISTANCE_STEPS: [f64; 4] = [5.0, 10.0, 25.0, 50.0];

/// Next preset above `current`, wrapping to the first.
fn next_step(steps: &[f64], current: f64) -> f64 {
    steps
        .iter()
        .copied()
        .find(|step| *step > current)
        .or_else(|| steps.first().copied())
        .unwrap_or(current)
}

/// Where the catalog comes from.
#[derive(Debug, Clone)]
pub enum ProductFeed {
    /// Generated locally after a simulated delay.
    Mock { count: usize, latency: Duration },
    /// `GET /products`
    Api(HttpClient),
}

impl ProductFeed {
    pub async fn load(&self) -> Result<Vec<Product>, ApiError> {
        match self {
            ProductFeed::Mock { count, latency } => {
                if !latency.is_zero() {
                    tokio::time::sleep(*latency).await;
                }
                Ok(generate_products(*count, MOCK_SEED))
            }
            ProductFeed::Api(client) => client.list_products().await,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Products,
    Search,
    Categories,
}

#[derive(Debug, Default)]
pub struct HomeState {
    pub load: LoadState,
    pub criteria: Criteria,
    /// What is typed in the search box. Copied into `criteria.search` once
    /// the debounce delay passes.
    pub search_input: String,
    pub focus: Focus,
    pub selected: usize,
    products: Vec<Product>,
    visible: Vec<Product>,
    generation: u64,
}

impl HomeState {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products after filtering and sorting.
    pub fn visible(&self) -> &[Product] {
        &self.visible
    }

    fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.load = LoadState::Loading;
        self.generation
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Applies a load result if it belongs to the current mount.
    fn finish_load(&mut self, generation: u64, result: Result<Vec<Product>, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(products) => {
                self.products = products;
                self.load = LoadState::Ready;
                self.refilter();
            }
            Err(err) => self.load = LoadState::Failed(err.to_string()),
        }
        true
    }

    fn refilter(&mut self) {
        self.visible = filter_products(&self.products, &self.criteria);
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    pub fn set_category(&mut self, id: &str) {
        self.criteria.category = id.to_string();
        self.selected = 0;
        self.refilter();
    }

    pub fn apply_search(&mut self) {
        if self.criteria.search != self.search_input {
            self.criteria.search = self.search_input.clone();
            self.selected = 0;
            self.refilter();
        }
    }

    pub fn update_filters(&mut self, f: impl FnOnce(&mut Filters)) {
        f(&mut self.criteria.filters);
        self.refilter();
    }

    /// Filter record back to defaults. Category and search stay.
    pub fn reset_filters(&mut self) {
        self.update_filters(Filters::reset);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }
}

pub struct HomePage {
    state: Entity<HomeState>,
    feed: ProductFeed,
    debounce: Duration,
    tasks: TaskTracker,
    pending_search: Option<TaskHandle>,
}

impl HomePage {
    pub fn new(feed: ProductFeed, debounce: Duration) -> Self {
        Self {
            state: Entity::new(HomeState::default()),
            feed,
            debounce,
            tasks: TaskTracker::new(),
            pending_search: None,
        }
    }

    pub fn state(&self) -> &Entity<HomeState> {
        &self.state
    }

    pub fn reset_filters(&self) {
        let _ = self.state.update(HomeState::reset_filters);
    }

    fn load<V: ?Sized>(&mut self, cx: &Context<V>) {
        let Ok(generation) = self.state.update(HomeState::begin_load) else {
            return;
        };
        let state = self.state.downgrade();
        let feed = self.feed.clone();
        let handle = cx.spawn_task(move |_app| async move {
            let result = feed.load().await;
            match &result {
                Ok(products) => tracing::debug!(count = products.len(), "products loaded"),
                Err(err) => tracing::warn!(error = %err, "product load failed"),
            }
            state.update(|s| s.finish_load(generation, result)).transpose()?;
            Ok(())
        });
        self.tasks.track(handle);
    }

    fn cancel_search(&mut self) {
        if let Some(pending) = self.pending_search.take() {
            pending.abort();
        }
    }

    /// Restarts the debounce timer for the current search input.
    fn schedule_search<V: ?Sized>(&mut self, cx: &Context<V>) {
        self.cancel_search();
        let state = self.state.downgrade();
        let delay = self.debounce;
        self.pending_search = Some(cx.spawn_task(move |_app| async move {
            tokio::time::sleep(delay).await;
            state.update(HomeState::apply_search).transpose()?;
            Ok(())
        }));
    }

    fn handle_search_key<V: ?Sized>(&mut self, key: &KeyEvent, cx: &Context<V>) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.cancel_search();
                let _ = self.state.update(|s| {
                    s.apply_search();
                    s.focus = Focus::Products;
                });
            }
            _ => {
                let edited = self
                    .state
                    .update(|s| crate::components::search_bar::edit(&mut s.search_input, key))
                    .unwrap_or(false);
                if edited {
                    self.schedule_search(cx);
                }
            }
        }
        // The search box swallows every key while focused.
        Some(Action::Noop)
    }

    fn handle_category_key(&mut self, key: &KeyEvent) -> Option<Action> {
        let delta = match key.code {
            KeyCode::Up | KeyCode::Char('k') => -1,
            KeyCode::Down | KeyCode::Char('j') => 1,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => {
                let _ = self.state.update(|s| s.focus = Focus::Products);
                return Some(Action::Noop);
            }
            _ => return None,
        };
        let _ = self.state.update(|s| {
            let next = category_list::step(&s.criteria.category, delta);
            s.set_category(next);
        });
        Some(Action::Noop)
    }

    fn handle_product_key(&mut self, key: &KeyEvent) -> Option<Action> {
        let state = &self.state;
        let _ = match key.code {
            KeyCode::Up | KeyCode::Char('k') => state.update(|s| s.move_selection(-1)),
            KeyCode::Down | KeyCode::Char('j') => state.update(|s| s.move_selection(1)),
            KeyCode::PageUp => state.update(|s| s.move_selection(-5)),
            KeyCode::PageDown => state.update(|s| s.move_selection(5)),
            KeyCode::Char('/') => state.update(|s| s.focus = Focus::Search),
            KeyCode::Char('c') | KeyCode::Tab => state.update(|s| s.focus = Focus::Categories),
            KeyCode::Char('s') => state.update(|s| s.update_filters(|f| f.sort_by = f.sort_by.next())),
            KeyCode::Char('n') => state.update(|s| s.update_filters(|f| f.condition = f.condition.next())),
            KeyCode::Char('m') => {
                state.update(|s| s.update_filters(|f| f.min_price = next_step(&MIN_PRICE_STEPS, f.min_price)))
            }
            KeyCode::Char('p') => {
                state.update(|s| s.update_filters(|f| f.max_price = next_step(&MAX_PRICE_STEPS, f.max_price)))
            }
            KeyCode::Char('d') => state.update(|s| {
                s.update_filters(|f| f.max_distance = next_step(&DISTANCE_STEPS, f.max_distance))
            }),
            KeyCode::Char('x') => state.update(HomeState::reset_filters),
            KeyCode::Char('r') => return Some(Action::Reload),
            _ => return None,
        };
        Some(Action::Noop)
    }
}

impl Component for HomePage {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        cx.app.watch(&self.state);
    }

    fn on_enter(&mut self, cx: &mut Context<Self>) {
        self.load(cx);
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
        self.cancel_search();
        let _ = self.state.update(HomeState::invalidate);
    }

    fn render(&mut self, frame: &mut Frame, cx: &mut Context<Self>) {
        let area = cx.area;
        let _ = self.state.read(|s| draw(frame, area, s));
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let focus = self.state.read(|s| s.focus).ok()?;
        match focus {
            Focus::Search => self.handle_search_key(&key, cx),
            Focus::Categories => self.handle_category_key(&key),
            Focus::Products => self.handle_product_key(&key),
        }
    }
}

fn draw(f: &mut Frame, area: Rect, s: &HomeState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search
            Constraint::Length(1), // filters
            Constraint::Min(0),    // body
            Constraint::Length(1), // hints
        ])
        .split(area);

    SearchBar::new("Buscar", &s.search_input)
        .placeholder("Presiona / para buscar productos")
        .focused(s.focus == Focus::Search)
        .render(f, rows[0]);

    draw_filter_line(f, rows[1], s);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(0)])
        .split(rows[2]);

    CategoryList {
        selected: &s.criteria.category,
        focused: s.focus == Focus::Categories,
    }
    .render(f, body[0]);

    match &s.load {
        LoadState::Loading => render_loading(f, body[1], "productos"),
        LoadState::Failed(message) => render_error(f, body[1], message),
        LoadState::Ready => draw_cards(f, body[1], s),
    }

    let hints: &[(&str, &str)] = match s.focus {
        Focus::Search => &[("Enter", "aplicar"), ("Esc", "salir")],
        Focus::Categories => &[("↑↓", "categoría"), ("Enter", "listo")],
        Focus::Products => &[
            ("/", "buscar"),
            ("c", "categorías"),
            ("s", "orden"),
            ("n", "estado"),
            ("m/p", "precio"),
            ("d", "distancia"),
            ("x", "limpiar"),
            ("r", "recargar"),
        ],
    };
    render_hints(f, rows[3], hints);
}

fn draw_filter_line(f: &mut Frame, area: Rect, s: &HomeState) {
    let filters = &s.criteria.filters;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(28)])
        .split(area);

    let line = Line::from(vec![
        Span::styled(" Orden: ", label),
        Span::styled(filters.sort_by.label(), value),
        Span::styled("  Estado: ", label),
        Span::styled(filters.condition.label(), value),
        Span::styled("  Precio: ", label),
        Span::styled(
            format!("{} - {}", format_price(filters.min_price), format_price(filters.max_price)),
            value,
        ),
        Span::styled("  Distancia ≤ ", label),
        Span::styled(format!("{} km", filters.max_distance), value),
    ]);
    f.render_widget(Paragraph::new(line), chunks[0]);

    let count = match s.load {
        LoadState::Ready => format!(
            "{} de {} en {}",
            s.visible.len(),
            s.products.len(),
            category_name(&s.criteria.category)
        ),
        _ => String::new(),
    };
    f.render_widget(
        Paragraph::new(count)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn draw_cards(f: &mut Frame, area: Rect, s: &HomeState) {
    if s.visible.is_empty() {
        let empty = Paragraph::new("No hay productos que coincidan con tu búsqueda")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let per_page = (area.height / CARD_HEIGHT).max(1) as usize;
    let first = (s.selected + 1).saturating_sub(per_page);

    for (row, (index, product)) in s.visible.iter().enumerate().skip(first).take(per_page).enumerate() {
        let card = Rect {
            x: area.x,
            y: area.y + row as u16 * CARD_HEIGHT,
            width: area.width,
            height: CARD_HEIGHT.min(area.height),
        };
        ProductCard {
            product,
            selected: index == s.selected,
        }
        .render(f, card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ConditionFilter, SortBy};
    use crate::model::Condition;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use venta_nexus::{AppContext, Notifier};

    fn context() -> Context<HomePage> {
        let (app, _rx) = AppContext::new(Notifier::default());
        Context::new(app, Rect::new(0, 0, 120, 40))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mock(latency_ms: u64) -> ProductFeed {
        ProductFeed::Mock {
            count: 24,
            latency: Duration::from_millis(latency_ms),
        }
    }

    async fn wait_until(page: &HomePage, done: impl Fn(&HomeState) -> bool) {
        for _ in 0..100 {
            if page.state().read(&done).unwrap() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    fn screen(page: &mut HomePage, cx: &mut Context<HomePage>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| page.render(f, cx)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_stale_load_result_is_dropped() {
        let mut state = HomeState::default();
        let first = state.begin_load();
        let second = state.begin_load();
        assert!(!state.finish_load(first, Ok(generate_products(3, 1))));
        assert!(state.load.is_loading());
        assert!(state.finish_load(second, Ok(generate_products(3, 1))));
        assert_eq!(state.load, LoadState::Ready);
        assert_eq!(state.visible().len(), 3);
    }

    #[test]
    fn test_reset_filters_keeps_category_and_search() {
        let mut state = HomeState::default();
        let generation = state.begin_load();
        state.finish_load(generation, Ok(generate_products(40, 3)));
        state.set_category("vehicles");
        state.update_filters(|f| {
            f.sort_by = SortBy::PriceHigh;
            f.condition = ConditionFilter::Only(Condition::New);
            f.max_price = 500.0;
        });
        let narrowed = state.visible().len();

        state.reset_filters();
        assert_eq!(state.criteria.filters, Filters::default());
        assert_eq!(state.criteria.category, "vehicles");
        assert!(state.visible().len() >= narrowed);
        assert!(state.visible().iter().all(|p| p.category == "vehicles"));
    }

    #[test]
    fn test_next_step_wraps() {
        assert_eq!(next_step(&DISTANCE_STEPS, 50.0), 5.0);
        assert_eq!(next_step(&DISTANCE_STEPS, 5.0), 10.0);
        assert_eq!(next_step(&MAX_PRICE_STEPS, 10_000.0), 500.0);
    }

    #[tokio::test]
    async fn test_mount_shows_loading_then_products() {
        let mut page = HomePage::new(mock(50), Duration::from_millis(10));
        let mut cx = context();
        page.on_init(&mut cx);
        page.on_enter(&mut cx);

        assert!(screen(&mut page, &mut cx).contains("Cargando productos"));

        wait_until(&page, |s| s.load == LoadState::Ready).await;
        let count = page.state().read(|s| s.visible().len()).unwrap();
        assert_eq!(count, 24);
        assert!(screen(&mut page, &mut cx).contains("24 de 24"));
    }

    #[tokio::test]
    async fn test_unmount_aborts_pending_load() {
        let mut page = HomePage::new(mock(100), Duration::from_millis(10));
        let mut cx = context();
        page.on_enter(&mut cx);
        assert!(page.tasks.has_active_tasks());

        page.on_exit(&mut cx);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(page.state().read(|s| s.load.is_loading()).unwrap());
        assert!(page.state().read(|s| s.products().is_empty()).unwrap());
    }

    #[tokio::test]
    async fn test_pending_load_does_not_keep_state_alive() {
        let mut page = HomePage::new(mock(100), Duration::from_millis(10));
        let mut cx = context();
        page.on_enter(&mut cx);
        let weak = page.state().downgrade();

        drop(page);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_search_is_debounced() {
        let mut page = HomePage::new(mock(0), Duration::from_millis(50));
        let mut cx = context();
        page.on_enter(&mut cx);
        wait_until(&page, |s| s.load == LoadState::Ready).await;

        assert_eq!(page.handle_event(key(KeyCode::Char('/')), &mut cx), Some(Action::Noop));
        for c in "lego".chars() {
            page.handle_event(key(KeyCode::Char(c)), &mut cx);
        }
        assert_eq!(page.state().read(|s| s.criteria.search.clone()).unwrap(), "");

        wait_until(&page, |s| s.criteria.search == "lego").await;
        let all_match = page
            .state()
            .read(|s| s.visible().iter().all(|p| p.title.to_lowercase().contains("lego")))
            .unwrap();
        assert!(all_match);
    }

    #[tokio::test]
    async fn test_failed_load_offers_reload() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpClient::new(format!("http://127.0.0.1:{port}/api/v1"));
        let mut page = HomePage::new(ProductFeed::Api(client), Duration::from_millis(10));
        let mut cx = context();
        page.on_enter(&mut cx);

        wait_until(&page, |s| matches!(s.load, LoadState::Failed(_))).await;
        assert!(screen(&mut page, &mut cx).contains("para recargar"));
        assert_eq!(page.handle_event(key(KeyCode::Char('r')), &mut cx), Some(Action::Reload));
    }

    #[tokio::test]
    async fn test_unhandled_keys_fall_through() {
        let mut page = HomePage::new(mock(0), Duration::from_millis(10));
        let mut cx = context();
        assert_eq!(page.handle_event(key(KeyCode::Char('1')), &mut cx), None);
        assert_eq!(page.handle_event(key(KeyCode::Char('s')), &mut cx), Some(Action::Noop));
        assert_eq!(
            page.state().read(|s| s.criteria.filters.sort_by).unwrap(),
            SortBy::PriceLow
        );
    }
}
