// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use todos_app::{
    AppCommand, AppEvent, AppState, LoadFailure, Overlay, StatusFilter, Todo, TodoId, User, UserId,
};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const SELECTED_MARK: &str = "◉";
const DONE_MARK: &str = "✓";

/// I/O seam between the terminal loop and whatever produces the data.
///
/// The `spawn_*` methods must deliver exactly one [`InternalEvent`] on `tx`.
/// The defaults run the load inline; real runtimes move it to a worker thread
/// so the loop keeps drawing while the request is outstanding.
pub trait AppRuntime {
    fn load_todos(&mut self) -> Result<Vec<Todo>, LoadFailure>;
    fn load_user(&mut self, id: UserId) -> Result<User>;

    fn spawn_load_todos(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.load_todos();
        tx.send(InternalEvent::TodosLoaded(result))
            .map_err(|_| anyhow::anyhow!("load event channel closed"))?;
        Ok(())
    }

    fn spawn_load_user(
        &mut self,
        todo_id: TodoId,
        user_id: UserId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .load_user(user_id)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::OwnerLoaded { todo_id, result })
            .map_err(|_| anyhow::anyhow!("owner event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    TodosLoaded(Result<Vec<Todo>, LoadFailure>),
    OwnerLoaded {
        todo_id: TodoId,
        result: Result<User, String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum InputMode {
    #[default]
    Nav,
    Search,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum OwnerLookup {
    #[default]
    Idle,
    Unassigned,
    Pending(TodoId),
    Ready(TodoId, User),
    Failed(TodoId, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    cursor: usize,
    input: InputMode,
    help_visible: bool,
    owner: OwnerLookup,
    status_token: u64,
    load_started: bool,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => event_loop(&mut terminal, state, runtime),
        Err(error) => Err(error),
    };

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend, R: AppRuntime>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    runtime: &mut R,
) -> Result<()> {
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    start_loader(state, runtime, &mut view_data, &internal_tx);

    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, &view_data))
            .context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read event")?
            && key.kind == KeyEventKind::Press
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn start_loader<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if view_data.load_started {
        return;
    }
    view_data.load_started = true;
    info!(event = "tui.load.started");

    if let Err(error) = runtime.spawn_load_todos(internal_tx.clone()) {
        let failure = LoadFailure::new(format!("{error:#}"));
        apply_load_result(state, view_data, internal_tx, Err(failure));
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::TodosLoaded(result) => {
                apply_load_result(state, view_data, tx, result);
            }
            InternalEvent::OwnerLoaded { todo_id, result } => {
                apply_owner_result(state, view_data, todo_id, result);
            }
        }
    }
}

fn apply_load_result(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    result: Result<Vec<Todo>, LoadFailure>,
) {
    for event in state.settle_load(result, OffsetDateTime::now_utc()) {
        match event {
            AppEvent::Loaded { count } => {
                info!(event = "tui.load.settled", outcome = "loaded", count);
                emit_status(state, view_data, tx, format!("loaded {count} todos"));
            }
            AppEvent::LoadFailed(failure) => {
                warn!(
                    event = "tui.load.settled",
                    outcome = "failed",
                    error = failure.cause()
                );
            }
            _ => {}
        }
    }
    clamp_cursor(state, view_data);
}

fn apply_owner_result(
    state: &AppState,
    view_data: &mut ViewData,
    todo_id: TodoId,
    result: Result<User, String>,
) {
    if state.selected_id() != Some(todo_id) {
        return;
    }
    view_data.owner = match result {
        Ok(user) => OwnerLookup::Ready(todo_id, user),
        Err(error) => OwnerLookup::Failed(todo_id, error),
    };
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.notification().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.dispatch(AppCommand::DismissNotification);
        }
        return false;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.overlay() == Overlay::Shown {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
        ) {
            close_detail(state, view_data);
        }
        return false;
    }

    if view_data.input == InputMode::Search {
        handle_search_key(state, view_data, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('j') | KeyCode::Down, _) => move_cursor(state, view_data, 1),
        (KeyCode::Char('k') | KeyCode::Up, _) => move_cursor(state, view_data, -1),
        (KeyCode::Char('g') | KeyCode::Home, _) => view_data.cursor = 0,
        (KeyCode::Char('G') | KeyCode::End, _) => {
            view_data.cursor = state.visible_todos().len().saturating_sub(1);
        }
        (KeyCode::Char('/'), _) => {
            view_data.input = InputMode::Search;
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::ClearQuery);
            emit_status(state, view_data, internal_tx, "search cleared");
        }
        (KeyCode::Tab, _) => {
            state.dispatch(AppCommand::CycleStatusFilter);
            schedule_status_clear(internal_tx, bump_token(view_data));
        }
        (KeyCode::Char(digit @ '1'..='3'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            if !state
                .dispatch(AppCommand::SetStatusFilter(StatusFilter::ALL[index]))
                .is_empty()
            {
                schedule_status_clear(internal_tx, bump_token(view_data));
            }
        }
        (KeyCode::Enter, _) => open_detail(state, runtime, view_data, internal_tx),
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }

    clamp_cursor(state, view_data);
    false
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.input = InputMode::Nav;
        }
        KeyCode::Backspace => {
            state.dispatch(AppCommand::PopQueryChar);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::ClearQuery);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::PushQueryChar(ch));
        }
        _ => {}
    }
    clamp_cursor(state, view_data);
}

fn bump_token(view_data: &mut ViewData) -> u64 {
    view_data.status_token = view_data.status_token.saturating_add(1);
    view_data.status_token
}

fn open_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.is_loading() {
        emit_status(state, view_data, internal_tx, "still loading");
        return;
    }
    let Some(todo) = state.visible_todos().get(view_data.cursor).map(|todo| (*todo).clone())
    else {
        emit_status(state, view_data, internal_tx, "nothing to open");
        return;
    };

    let todo_id = todo.id;
    let owner = todo.user_id;
    state.dispatch(AppCommand::Select(todo));

    let Some(user_id) = owner else {
        view_data.owner = OwnerLookup::Unassigned;
        return;
    };
    view_data.owner = OwnerLookup::Pending(todo_id);
    if let Err(error) = runtime.spawn_load_user(todo_id, user_id, internal_tx.clone()) {
        view_data.owner = OwnerLookup::Failed(todo_id, format!("{error:#}"));
    }
}

fn close_detail(state: &mut AppState, view_data: &mut ViewData) {
    state.dispatch(AppCommand::ClearSelection);
    view_data.owner = OwnerLookup::Idle;
}

fn move_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let len = state.visible_todos().len();
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = view_data.cursor.saturating_add_signed(delta);
    view_data.cursor = next.min(len - 1);
}

fn clamp_cursor(state: &AppState, view_data: &mut ViewData) {
    let len = state.visible_todos().len();
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("todos").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_filter_bar(frame, layout[1], state, view_data);

    if state.is_loading() {
        let placeholder = Paragraph::new("loading todos…")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, layout[2]);
    } else {
        render_table(frame, layout[2], state, view_data);
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    if let Some(todo) = state.selection() {
        let area = centered_rect(60, 40, frame.area());
        frame.render_widget(Clear, area);
        let detail = Paragraph::new(detail_overlay_text(todo, &view_data.owner))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!("Todo #{}", todo.id))
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(detail, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }

    if let Some(notification) = state.notification() {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{}\n\nenter dismiss", notification.message))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("error")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }
}

fn render_filter_bar(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(36)])
        .split(area);

    let searching = view_data.input == InputMode::Search;
    let border_style = if searching {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_text(state, view_data)).block(
        Block::default()
            .title("search")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(search, columns[0]);

    let selected = StatusFilter::ALL
        .iter()
        .position(|status| *status == state.criteria.status)
        .unwrap_or(0);
    let titles = StatusFilter::ALL
        .iter()
        .enumerate()
        .map(|(index, status)| format!(" {} {} ", index + 1, status.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("status").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, columns[1]);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let visible = state.visible_todos();
    let selected_id = state.selected_id();

    let header = Row::new(["", "id", "title", "status"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = visible.iter().enumerate().map(|(index, todo)| {
        let mark = if selected_id == Some(todo.id) {
            SELECTED_MARK
        } else {
            ""
        };
        let mut style = Style::default();
        if todo.completed {
            style = style.fg(Color::Green);
        }
        if index == view_data.cursor {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        Row::new(vec![
            Cell::from(mark),
            Cell::from(todo.id.to_string()),
            Cell::from(todo.title.clone()),
            Cell::from(status_cell(todo)),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Min(10),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state, visible.len()))
                .borders(Borders::ALL),
        );

    let mut table_state = TableState::default();
    if !visible.is_empty() {
        table_state.select(Some(view_data.cursor));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn status_cell(todo: &Todo) -> String {
    if todo.completed {
        format!("{DONE_MARK} done")
    } else {
        "planned".to_owned()
    }
}

fn table_title(state: &AppState, shown: usize) -> String {
    if state.criteria.is_default() {
        format!("list ({shown})")
    } else {
        format!("list ({shown} of {})", state.todos().len())
    }
}

fn header_text(state: &AppState) -> String {
    if state.is_loading() {
        return "fetching todos".to_owned();
    }
    let total = state.todos().len();
    let done = state.todos().iter().filter(|todo| todo.completed).count();
    let mut text = format!("{total} todos | {done} done | {} active", total - done);
    match state.loaded_at() {
        Some(at) => {
            let stamp = at
                .format(format_description!("[hour]:[minute]:[second]"))
                .unwrap_or_else(|_| "now".to_owned());
            text.push_str(&format!(" | loaded {stamp} UTC"));
        }
        None => text.push_str(" | load failed"),
    }
    text
}

fn search_text(state: &AppState, view_data: &ViewData) -> String {
    let query = &state.criteria.query;
    match view_data.input {
        InputMode::Search => format!("{query}▏"),
        InputMode::Nav if query.is_empty() => "press / to search titles".to_owned(),
        InputMode::Nav => query.clone(),
    }
}

fn detail_overlay_text(todo: &Todo, owner: &OwnerLookup) -> String {
    let owner_line = match owner {
        OwnerLookup::Ready(id, user) if *id == todo.id => {
            format!("owner: {} <{}>", user.name, user.email)
        }
        OwnerLookup::Failed(id, error) if *id == todo.id => {
            format!("owner unavailable: {error}")
        }
        OwnerLookup::Pending(id) if *id == todo.id => "loading owner…".to_owned(),
        OwnerLookup::Unassigned => "owner: unassigned".to_owned(),
        _ => String::new(),
    };

    [
        todo.title.trim().to_owned(),
        String::new(),
        format!("status: {}", todo.progress_label()),
        owner_line,
        String::new(),
        "esc close".to_owned(),
    ]
    .join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
nav: j/k or up/down move | g/G first/last | enter open | q quit\n\
filter: / search | ctrl+u clear search | tab cycle status | 1 all 2 active 3 completed\n\
search: type to filter | backspace delete | enter/esc done\n\
detail: esc/enter/q close\n\
alert: enter/esc dismiss"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = if state.notification().is_some() {
        "ALERT"
    } else if state.overlay() == Overlay::Shown {
        "DETAIL"
    } else {
        match view_data.input {
            InputMode::Nav => "NAV",
            InputMode::Search => "SEARCH",
        }
    };
    let hints = match view_data.input {
        InputMode::Search => "type to filter | enter/esc done | ctrl+u clear",
        InputMode::Nav => "j/k move | enter open | / search | tab status | ? help | q quit",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
