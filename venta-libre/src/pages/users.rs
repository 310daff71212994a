//! User administration page backed by the `/users` endpoints.

use super::LoadState;
use crate::api::{ApiError, HttpClient};
use crate::components::placeholder::{render_error, render_hints, render_loading};
use crate::components::search_bar::{self, SearchBar};
use crate::model::{NewUser, User, UserUpdate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};
use std::future::Future;
use venta_nexus::{Action, Component, Context, Entity, Event, EventContext, TaskTracker};

#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Loading(i64),
    Ready(User),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Rename(i64),
}

/// The create / rename dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub mode: FormMode,
    pub name: String,
    pub email: String,
    pub password: String,
    pub field: usize,
}

impl UserForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            field: 0,
        }
    }

    pub fn rename(user: &User) -> Self {
        Self {
            mode: FormMode::Rename(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            field: 0,
        }
    }

    /// Rename has no password field.
    fn field_count(&self) -> usize {
        match self.mode {
            FormMode::Create => 3,
            FormMode::Rename(_) => 2,
        }
    }

    fn focus_next(&mut self, delta: isize) {
        let count = self.field_count() as isize;
        self.field = (self.field as isize + delta).rem_euclid(count) as usize;
    }

    fn current_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.name,
            1 => &mut self.email,
            _ => &mut self.password,
        }
    }

    pub fn is_complete(&self) -> bool {
        let filled = !self.name.trim().is_empty() && self.email.contains('@');
        match self.mode {
            FormMode::Create => filled && !self.password.is_empty(),
            FormMode::Rename(_) => filled,
        }
    }
}

#[derive(Debug, Default)]
pub struct UsersState {
    pub load: LoadState,
    pub selected: usize,
    pub detail: Option<Detail>,
    pub form: Option<UserForm>,
    users: Vec<User>,
    generation: u64,
}

impl UsersState {
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.load = LoadState::Loading;
        self.generation
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.detail = None;
        self.form = None;
    }

    /// Replaces the list in full if the result belongs to the current mount.
    fn finish_load(&mut self, generation: u64, result: Result<Vec<User>, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(users) => {
                self.users = users;
                self.selected = self.selected.min(self.users.len().saturating_sub(1));
                self.load = LoadState::Ready;
            }
            Err(err) => self.load = LoadState::Failed(err.to_string()),
        }
        true
    }

    fn finish_detail(&mut self, generation: u64, id: i64, result: Result<User, ApiError>) {
        if generation != self.generation || self.detail != Some(Detail::Loading(id)) {
            return;
        }
        self.detail = Some(match result {
            Ok(user) => Detail::Ready(user),
            Err(err) => Detail::Failed(err.to_string()),
        });
    }

    fn move_selection(&mut self, delta: isize) {
        if self.users.is_empty() {
            return;
        }
        let last = self.users.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
        self.detail = None;
    }
}

pub struct UsersPage {
    state: Entity<UsersState>,
    client: HttpClient,
    tasks: TaskTracker,
}

impl UsersPage {
    pub fn new(client: HttpClient) -> Self {
        Self {
            state: Entity::new(UsersState::default()),
            client,
            tasks: TaskTracker::new(),
        }
    }

    pub fn state(&self) -> &Entity<UsersState> {
        &self.state
    }

    fn load<V: ?Sized>(&mut self, cx: &Context<V>) {
        self.mutate(cx, None, |_client| async { Ok::<(), ApiError>(()) });
    }

    /// Runs `op`, then fetches the list again. The list shows the loading
    /// placeholder meanwhile, and a failure from either step lands in the
    /// error panel.
    fn mutate<V, F, Fut>(&mut self, cx: &Context<V>, done: Option<&'static str>, op: F)
    where
        V: ?Sized,
        F: FnOnce(HttpClient) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let Ok(generation) = self.state.update(UsersState::begin_load) else {
            return;
        };
        let state = self.state.downgrade();
        let client = self.client.clone();
        let handle = cx.spawn_task(move |app| async move {
            let result = match op(client.clone()).await {
                Ok(()) => client.list_users().await,
                Err(err) => Err(err),
            };
            match (&result, done) {
                (Ok(_), Some(message)) => {
                    tracing::info!(change = message, "user change applied");
                    app.notifier().info(message);
                }
                (Err(err), _) => tracing::warn!(error = %err, "users request failed"),
                _ => {}
            }
            state.update(|s| s.finish_load(generation, result)).transpose()?;
            Ok(())
        });
        self.tasks.track(handle);
    }

    fn open_detail<V: ?Sized>(&mut self, cx: &Context<V>) {
        let Ok(Some((id, generation))) = self.state.update(|s| {
            let id = s.selected_user()?.id;
            s.detail = Some(Detail::Loading(id));
            Some((id, s.generation))
        }) else {
            return;
        };
        let state = self.state.downgrade();
        let client = self.client.clone();
        let handle = cx.spawn_task(move |_app| async move {
            let result = client.get_user(id).await;
            state.update(|s| s.finish_detail(generation, id, result)).transpose()?;
            Ok(())
        });
        self.tasks.track(handle);
    }

    fn delete_selected<V: ?Sized>(&mut self, cx: &Context<V>) {
        let Ok(Some(id)) = self.state.read(|s| s.selected_user().map(|u| u.id)) else {
            return;
        };
        self.mutate(cx, Some("Usuario eliminado"), move |client| async move {
            client.delete_user(id).await
        });
    }

    fn submit_form<V: ?Sized>(&mut self, cx: &Context<V>) {
        let Ok(Some(form)) = self.state.update(|s| {
            if s.form.as_ref().is_some_and(UserForm::is_complete) {
                s.form.take()
            } else {
                None
            }
        }) else {
            return;
        };
        match form.mode {
            FormMode::Create => {
                let user = NewUser {
                    name: form.name.trim().to_string(),
                    email: form.email.trim().to_string(),
                    password: form.password,
                };
                self.mutate(cx, Some("Usuario creado"), move |client| async move {
                    client.create_user(&user).await.map(|_| ())
                });
            }
            FormMode::Rename(id) => {
                let update = UserUpdate {
                    name: Some(form.name.trim().to_string()),
                    email: Some(form.email.trim().to_string()),
                    password: None,
                };
                self.mutate(cx, Some("Usuario actualizado"), move |client| async move {
                    client.update_user(id, &update).await.map(|_| ())
                });
            }
        }
    }

    fn handle_form_key<V: ?Sized>(&mut self, key: &KeyEvent, cx: &Context<V>) -> Option<Action> {
        match key.code {
            KeyCode::Enter => self.submit_form(cx),
            KeyCode::Esc => {
                let _ = self.state.update(|s| s.form = None);
            }
            KeyCode::Tab | KeyCode::Down => {
                let _ = self.state.update(|s| s.form.as_mut().map(|f| f.focus_next(1)));
            }
            KeyCode::BackTab | KeyCode::Up => {
                let _ = self.state.update(|s| s.form.as_mut().map(|f| f.focus_next(-1)));
            }
            _ => {
                let _ = self
                    .state
                    .update(|s| s.form.as_mut().map(|f| search_bar::edit(f.current_mut(), key)));
            }
        }
        Some(Action::Noop)
    }
}

impl Component for UsersPage {
    fn on_init(&mut self, cx: &mut Context<Self>) {
        cx.app.watch(&self.state);
    }

    fn on_enter(&mut self, cx: &mut Context<Self>) {
        self.load(cx);
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
        let _ = self.state.update(UsersState::invalidate);
    }

    fn render(&mut self, frame: &mut Frame, cx: &mut Context<Self>) {
        let area = cx.area;
        let _ = self.state.read(|s| draw(frame, area, s));
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        if self.state.read(|s| s.form.is_some()).ok()? {
            return self.handle_form_key(&key, cx);
        }

        let ready = self.state.read(|s| s.load == LoadState::Ready).ok()?;
        match key.code {
            KeyCode::Char('r') => return Some(Action::Reload),
            KeyCode::Up | KeyCode::Char('k') if ready => {
                let _ = self.state.update(|s| s.move_selection(-1));
            }
            KeyCode::Down | KeyCode::Char('j') if ready => {
                let _ = self.state.update(|s| s.move_selection(1));
            }
            KeyCode::Enter if ready => self.open_detail(cx),
            KeyCode::Esc => {
                let _ = self.state.update(|s| s.detail = None);
            }
            KeyCode::Char('d') if ready => self.delete_selected(cx),
            KeyCode::Char('n') if ready => {
                let _ = self.state.update(|s| s.form = Some(UserForm::create()));
            }
            KeyCode::Char('e') if ready => {
                let _ = self
                    .state
                    .update(|s| s.form = s.selected_user().map(UserForm::rename));
            }
            _ => return None,
        }
        Some(Action::Noop)
    }
}

fn draw(f: &mut Frame, area: Rect, s: &UsersState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match &s.load {
        LoadState::Loading => render_loading(f, rows[0], "usuarios"),
        LoadState::Failed(message) => render_error(f, rows[0], message),
        LoadState::Ready => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(rows[0]);
            draw_table(f, cols[0], s);
            draw_detail(f, cols[1], s.detail.as_ref());
        }
    }

    if let Some(form) = &s.form {
        draw_form(f, rows[0], form);
    }

    let hints: &[(&str, &str)] = if s.form.is_some() {
        &[("Tab", "campo"), ("Enter", "guardar"), ("Esc", "cancelar")]
    } else {
        &[
            ("↑↓", "elegir"),
            ("Enter", "detalle"),
            ("n", "nuevo"),
            ("e", "editar"),
            ("d", "eliminar"),
            ("r", "recargar"),
        ]
    };
    render_hints(f, rows[1], hints);
}

fn draw_table(f: &mut Frame, area: Rect, s: &UsersState) {
    let header = Row::new(["ID", "Nombre", "Email", "Rol", "Estado"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = s
        .users
        .iter()
        .map(|u| {
            let (status, status_color) = if u.is_active {
                ("Activo", Color::Green)
            } else {
                ("Inactivo", Color::Red)
            };
            Row::new(vec![
                Cell::from(u.id.to_string()),
                Cell::from(u.name.as_str()),
                Cell::from(u.email.as_str()),
                Cell::from(if u.is_admin { "Admin" } else { "Usuario" }),
                Cell::from(status).style(Style::default().fg(status_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(30),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Usuarios ({}) ", s.users.len())),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !s.users.is_empty() {
        state.select(Some(s.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_detail(f: &mut Frame, area: Rect, detail: Option<&Detail>) {
    let block = Block::default().borders(Borders::ALL).title(" Detalle ");
    let dim = Style::default().fg(Color::DarkGray);

    let lines = match detail {
        None => vec![Line::from(Span::styled("Enter para ver el detalle", dim))],
        Some(Detail::Loading(id)) => vec![Line::from(Span::styled(format!("Cargando usuario #{id}..."), dim))],
        Some(Detail::Failed(message)) => vec![Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ))],
        Some(Detail::Ready(user)) => {
            let field = |label: &'static str, value: String| {
                Line::from(vec![Span::styled(format!("{label:<10}"), dim), Span::raw(value)])
            };
            vec![
                field("ID", user.id.to_string()),
                field("Nombre", user.name.clone()),
                field("Email", user.email.clone()),
                field("Admin", if user.is_admin { "sí" } else { "no" }.to_string()),
                field("Activo", if user.is_active { "sí" } else { "no" }.to_string()),
                field("Creado", user.created_at.clone().unwrap_or_else(|| "-".to_string())),
            ]
        }
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_form(f: &mut Frame, area: Rect, form: &UserForm) {
    let height = 3 * form.field_count() as u16 + 2;
    let popup = centered(area, 50, height);
    f.render_widget(Clear, popup);

    let title = match form.mode {
        FormMode::Create => " Nuevo usuario ".to_string(),
        FormMode::Rename(id) => format!(" Editar usuario #{id} "),
    };
    let border = if form.is_complete() { Color::Green } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); form.field_count()])
        .split(inner);

    let fields = [("Nombre", &form.name, false), ("Email", &form.email, false), ("Contraseña", &form.password, true)];
    for (i, (slot, (title, value, masked))) in slots.iter().zip(fields).enumerate() {
        SearchBar::new(title, value)
            .focused(form.field == i)
            .masked(masked)
            .render(f, *slot);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
