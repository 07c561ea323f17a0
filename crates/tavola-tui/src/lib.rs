// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table};
use std::collections::BTreeSet;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tavola_app::{DisplayItem, Row, RowId, SortDir, SortKey, TableCommand, TableModel};

const CHECKBOX_ON: &str = "[x]";
const CHECKBOX_OFF: &str = "[ ]";
const COLLAPSED_MARK: &str = "—";

/// Result of fetching the signed-in user's saved row set. Absence and
/// malformed content are ordinary outcomes; transport failures travel as
/// `CloudEvent::LoadFailed` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Loaded(Vec<Row>),
    NoSavedData,
    InvalidFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloudEvent {
    LoadCompleted { request_id: u64, result: LoadResult },
    LoadFailed { request_id: u64, error: String },
    SaveCompleted { request_id: u64 },
    SaveFailed { request_id: u64, error: String },
}

impl CloudEvent {
    const fn request_id(&self) -> u64 {
        match self {
            Self::LoadCompleted { request_id, .. }
            | Self::LoadFailed { request_id, .. }
            | Self::SaveCompleted { request_id }
            | Self::SaveFailed { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Cloud(CloudEvent),
}

/// Seam between the UI and its collaborators: the session/auth provider and
/// the row-set persistence service. The `spawn_*` hooks default to running
/// the blocking call inline and delivering the completion through the
/// internal channel; a runtime may override them to run off-thread.
pub trait AppRuntime {
    fn session_email(&self) -> Option<String>;
    fn sign_in(&mut self, email: &str, password: &str) -> Result<()>;
    fn sign_up(&mut self, email: &str, password: &str) -> Result<()>;
    fn sign_out(&mut self) -> Result<()>;
    fn load_row_set(&mut self) -> Result<LoadResult>;
    fn save_row_set(&mut self, rows: &[Row]) -> Result<()>;

    fn spawn_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.load_row_set() {
            Ok(result) => CloudEvent::LoadCompleted { request_id, result },
            Err(error) => CloudEvent::LoadFailed {
                request_id,
                error: error.to_string(),
            },
        };
        tx.send(InternalEvent::Cloud(event))
            .map_err(|_| anyhow::anyhow!("cloud event channel closed"))?;
        Ok(())
    }

    fn spawn_save(
        &mut self,
        request_id: u64,
        rows: &[Row],
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let event = match self.save_row_set(rows) {
            Ok(()) => CloudEvent::SaveCompleted { request_id },
            Err(error) => CloudEvent::SaveFailed {
                request_id,
                error: error.to_string(),
            },
        };
        tx.send(InternalEvent::Cloud(event))
            .map_err(|_| anyhow::anyhow!("cloud event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub status_clear: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            status_clear: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    SignIn,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignInField {
    Email,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignInUiState {
    email: String,
    password: String,
    field: SignInField,
    error: Option<String>,
}

impl Default for SignInUiState {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            field: SignInField::Email,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloudCallKind {
    Load,
    Save,
}

impl CloudCallKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CloudInFlight {
    request_id: u64,
    kind: CloudCallKind,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    screen: Screen,
    sign_in: SignInUiState,
    cursor: usize,
    cloud_in_flight: Option<CloudInFlight>,
    next_request_id: u64,
    session_email: Option<String>,
    status_line: Option<String>,
    status_token: u64,
    help_visible: bool,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            screen: Screen::SignIn,
            sign_in: SignInUiState::default(),
            cursor: 0,
            cloud_in_flight: None,
            next_request_id: 0,
            session_email: None,
            status_line: None,
            status_token: 0,
            help_visible: false,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    model: &mut TableModel,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    initialize(runtime, &mut view_data, &internal_tx, &options);

    let mut result = Ok(());
    loop {
        process_internal_events(model, &mut view_data, &internal_tx, &internal_rx, &options);

        if let Err(error) = terminal.draw(|frame| render(frame, model, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(model, runtime, &mut view_data, &internal_tx, &options, key)
                    {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// One-time startup step: pick the screen from session presence and, when
/// signed in, issue the single initial load.
fn initialize<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    view_data.session_email = runtime.session_email();
    if view_data.session_email.is_some() {
        view_data.screen = Screen::Table;
        start_cloud_call(runtime, view_data, internal_tx, options, CloudCallKind::Load, &[]);
    } else {
        view_data.screen = Screen::SignIn;
    }
}

fn process_internal_events(
    model: &mut TableModel,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
    options: &UiOptions,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Cloud(event) => {
                apply_cloud_event(model, view_data, tx, options, event);
            }
        }
    }
}

fn apply_cloud_event(
    model: &mut TableModel,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    options: &UiOptions,
    event: CloudEvent,
) {
    let Some(in_flight) = view_data.cloud_in_flight else {
        return;
    };
    if event.request_id() != in_flight.request_id {
        return;
    }
    // Both completion and failure clear the busy flag.
    view_data.cloud_in_flight = None;

    match event {
        CloudEvent::LoadCompleted { result, .. } => match result {
            LoadResult::Loaded(rows) => {
                model.dispatch(TableCommand::ReplaceRows(rows));
                clamp_cursor(model, view_data);
                emit_status(view_data, tx, options, "Loaded from cloud.");
            }
            LoadResult::NoSavedData => {
                emit_status(view_data, tx, options, "No saved table found (using demo data).");
            }
            LoadResult::InvalidFormat => {
                emit_status(view_data, tx, options, "Saved data format is invalid.");
            }
        },
        CloudEvent::LoadFailed { .. } => {
            emit_status(view_data, tx, options, "Load failed.");
        }
        CloudEvent::SaveCompleted { .. } => {
            emit_status(view_data, tx, options, "Saved to cloud.");
        }
        CloudEvent::SaveFailed { .. } => {
            emit_status(view_data, tx, options, "Save failed.");
        }
    }
}

fn start_cloud_call<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    kind: CloudCallKind,
    rows: &[Row],
) {
    if view_data.session_email.is_none() {
        emit_status(view_data, internal_tx, options, "Not signed in.");
        return;
    }
    if let Some(in_flight) = view_data.cloud_in_flight {
        emit_status(
            view_data,
            internal_tx,
            options,
            format!("{} in progress", in_flight.kind.label()),
        );
        return;
    }

    let request_id = next_request_id(view_data);
    view_data.cloud_in_flight = Some(CloudInFlight { request_id, kind });

    let spawned = match kind {
        CloudCallKind::Load => runtime.spawn_load(request_id, internal_tx.clone()),
        CloudCallKind::Save => runtime.spawn_save(request_id, rows, internal_tx.clone()),
    };
    if spawned.is_err() {
        view_data.cloud_in_flight = None;
        let message = match kind {
            CloudCallKind::Load => "Load failed.",
            CloudCallKind::Save => "Save failed.",
        };
        emit_status(view_data, internal_tx, options, message);
    }
}

fn next_request_id(view_data: &mut ViewData) -> u64 {
    view_data.next_request_id = view_data.next_request_id.saturating_add(1);
    if view_data.next_request_id == 0 {
        view_data.next_request_id = 1;
    }
    view_data.next_request_id
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, after: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(after);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token, options.status_clear);
}

fn handle_key_event<R: AppRuntime>(
    model: &mut TableModel,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match view_data.screen {
        Screen::SignIn => handle_sign_in_key(model, runtime, view_data, internal_tx, options, key),
        Screen::Table => handle_table_key(model, runtime, view_data, internal_tx, options, key),
    }
    false
}

fn handle_sign_in_key<R: AppRuntime>(
    model: &mut TableModel,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) {
        submit_sign_up(runtime, view_data, internal_tx, options);
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
            view_data.sign_in.field = match view_data.sign_in.field {
                SignInField::Email => SignInField::Password,
                SignInField::Password => SignInField::Email,
            };
        }
        KeyCode::Enter => {
            submit_sign_in(model, runtime, view_data, internal_tx, options);
        }
        KeyCode::Backspace => {
            let field = active_field(&mut view_data.sign_in);
            field.pop();
        }
        KeyCode::Char(ch) if key.modifiers.intersection(KeyModifiers::CONTROL | KeyModifiers::ALT).is_empty() => {
            active_field(&mut view_data.sign_in).push(ch);
        }
        _ => {}
    }
}

fn active_field(sign_in: &mut SignInUiState) -> &mut String {
    match sign_in.field {
        SignInField::Email => &mut sign_in.email,
        SignInField::Password => &mut sign_in.password,
    }
}

fn submit_sign_in<R: AppRuntime>(
    model: &mut TableModel,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    let email = view_data.sign_in.email.clone();
    let password = view_data.sign_in.password.clone();
    match runtime.sign_in(&email, &password) {
        Ok(()) => {
            view_data.sign_in = SignInUiState::default();
            view_data.session_email = runtime.session_email();
            view_data.screen = Screen::Table;
            emit_status(view_data, internal_tx, options, "Signed in.");
            start_cloud_call(runtime, view_data, internal_tx, options, CloudCallKind::Load, &[]);
            clamp_cursor(model, view_data);
        }
        Err(error) => {
            view_data.sign_in.error = Some(error.to_string());
        }
    }
}

fn submit_sign_up<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    let email = view_data.sign_in.email.clone();
    let password = view_data.sign_in.password.clone();
    match runtime.sign_up(&email, &password) {
        Ok(()) => {
            view_data.sign_in.error = None;
            emit_status(
                view_data,
                internal_tx,
                options,
                "Account created successfully. You can now sign in.",
            );
        }
        Err(error) => {
            view_data.sign_in.error = Some(error.to_string());
        }
    }
}

fn handle_table_key<R: AppRuntime>(
    model: &mut TableModel,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => move_cursor(model, view_data, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(model, view_data, 1),
        KeyCode::Char(' ') => toggle_selection_at_cursor(model, view_data, internal_tx, options),
        KeyCode::Char(digit @ '1'..='5') => {
            let index = digit as usize - '1' as usize;
            model.dispatch(TableCommand::CycleSort(SortKey::ALL[index]));
            let message = format!(
                "sort {} {}",
                model.sort_key.as_str(),
                model.sort_dir.as_str()
            );
            emit_status(view_data, internal_tx, options, message);
            clamp_cursor(model, view_data);
        }
        KeyCode::Char('r') => {
            model.dispatch(TableCommand::ResetSort);
            emit_status(view_data, internal_tx, options, "sort reset");
            clamp_cursor(model, view_data);
        }
        KeyCode::Char('c') => {
            if model.selected.is_empty() {
                emit_status(view_data, internal_tx, options, "select rows first");
            } else {
                model.dispatch(TableCommand::CollapseSelected);
                emit_status(view_data, internal_tx, options, "selected groups collapsed");
                clamp_cursor(model, view_data);
            }
        }
        KeyCode::Char('x') => {
            model.dispatch(TableCommand::ClearSelection);
            emit_status(view_data, internal_tx, options, "selection cleared");
        }
        KeyCode::Char('e') | KeyCode::Enter => expand_at_cursor(model, view_data, internal_tx, options),
        KeyCode::Char('E') => {
            model.dispatch(TableCommand::ExpandAll);
            emit_status(view_data, internal_tx, options, "all groups expanded");
            clamp_cursor(model, view_data);
        }
        KeyCode::Char('l') => {
            start_cloud_call(runtime, view_data, internal_tx, options, CloudCallKind::Load, &[]);
        }
        KeyCode::Char('s') => {
            let rows = model.rows.clone();
            start_cloud_call(runtime, view_data, internal_tx, options, CloudCallKind::Save, &rows);
        }
        KeyCode::Char('o') => sign_out(runtime, view_data, internal_tx, options),
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        _ => {}
    }
}

fn move_cursor(model: &TableModel, view_data: &mut ViewData, delta: isize) {
    let len = model.display_items().len();
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let current = view_data.cursor.min(len - 1) as isize;
    view_data.cursor = (current + delta).clamp(0, len as isize - 1) as usize;
}

fn clamp_cursor(model: &TableModel, view_data: &mut ViewData) {
    let len = model.display_items().len();
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn toggle_selection_at_cursor(
    model: &mut TableModel,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    let items = model.display_items();
    match items.get(view_data.cursor) {
        Some(DisplayItem::Row(item)) => {
            model.dispatch(TableCommand::ToggleSelected(item.row.id));
        }
        Some(DisplayItem::Collapsed { .. }) => {
            emit_status(view_data, internal_tx, options, "select a data row");
        }
        None => {}
    }
}

fn expand_at_cursor(
    model: &mut TableModel,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    let items = model.display_items();
    match items.get(view_data.cursor) {
        Some(DisplayItem::Collapsed { group, .. }) => {
            let group = group.clone();
            model.dispatch(TableCommand::ExpandGroup(group.clone()));
            emit_status(view_data, internal_tx, options, format!("group {group} expanded"));
            clamp_cursor(model, view_data);
        }
        _ => {
            emit_status(view_data, internal_tx, options, "not on a collapsed group");
        }
    }
}

fn sign_out<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    if view_data.cloud_in_flight.is_some() {
        emit_status(view_data, internal_tx, options, "cloud call in progress");
        return;
    }
    match runtime.sign_out() {
        Ok(()) => {
            view_data.session_email = None;
            view_data.screen = Screen::SignIn;
            view_data.sign_in = SignInUiState::default();
            emit_status(view_data, internal_tx, options, "Signed out.");
        }
        Err(error) => {
            emit_status(view_data, internal_tx, options, format!("sign out failed: {error}"));
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, model: &TableModel, view_data: &ViewData) {
    match view_data.screen {
        Screen::SignIn => render_sign_in(frame, view_data),
        Screen::Table => render_table_screen(frame, model, view_data),
    }

    if view_data.help_visible {
        let area = centered_rect(70, 66, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_sign_in(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let area = centered_rect(60, 50, frame.area());
    let card = Paragraph::new(sign_in_text(&view_data.sign_in))
        .block(Block::default().title("sign in").borders(Borders::ALL));
    frame.render_widget(card, area);
}

fn sign_in_text(sign_in: &SignInUiState) -> String {
    let email_marker = if sign_in.field == SignInField::Email {
        "> "
    } else {
        "  "
    };
    let password_marker = if sign_in.field == SignInField::Password {
        "> "
    } else {
        "  "
    };
    let masked: String = sign_in.password.chars().map(|_| '*').collect();

    let mut lines = vec![
        "Use your email and password to access the application.".to_owned(),
        String::new(),
        format!("{email_marker}email:    {}", sign_in.email),
        format!("{password_marker}password: {masked}"),
        String::new(),
    ];
    if let Some(error) = &sign_in.error {
        lines.push(error.clone());
        lines.push(String::new());
    }
    lines.push("enter sign in | ctrl-n create account | tab switch field | ctrl-q quit".to_owned());
    lines.join("\n")
}

fn render_table_screen(frame: &mut ratatui::Frame<'_>, model: &TableModel, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let title = Paragraph::new(title_text(model, view_data))
        .block(Block::default().title("tavola").borders(Borders::ALL));
    frame.render_widget(title, layout[0]);

    render_table(frame, layout[1], model, view_data);

    let footer = Paragraph::new(footer_text(model))
        .block(Block::default().title("visible totals").borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);
}

fn title_text(model: &TableModel, view_data: &ViewData) -> String {
    let account = view_data.session_email.as_deref().unwrap_or("not signed in");
    format!(
        "{account} | selected: {} | collapsed groups: {}",
        model.selected.len(),
        model.collapsed.len()
    )
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, model: &TableModel, view_data: &ViewData) {
    let header_cells = std::iter::once("Sel".to_owned())
        .chain(
            SortKey::ALL
                .iter()
                .map(|key| header_label(*key, model.sort_key, model.sort_dir)),
        )
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = TableRow::new(header_cells);

    let items = model.display_items();
    let rows = items.iter().enumerate().map(|(index, item)| {
        let cells = display_item_cells(item, &model.selected);
        let at_cursor = index == view_data.cursor;
        let cells = cells.into_iter().map(|text| {
            let mut style = Style::default();
            if matches!(item, DisplayItem::Collapsed { .. }) {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
            }
            if at_cursor {
                style = style.bg(Color::DarkGray);
            }
            Cell::from(text).style(style)
        });
        TableRow::new(cells)
    });

    let mut widths = vec![Constraint::Length(5)];
    widths.extend(std::iter::repeat_n(Constraint::Min(8), SortKey::ALL.len()));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn header_label(key: SortKey, sort_key: SortKey, sort_dir: SortDir) -> String {
    let arrow = if key != sort_key || sort_dir == SortDir::None {
        "↕"
    } else if sort_dir == SortDir::Asc {
        "↑"
    } else {
        "↓"
    };
    format!("{} {arrow}", key.label())
}

fn display_item_cells(item: &DisplayItem, selected: &BTreeSet<RowId>) -> [String; 6] {
    match item {
        DisplayItem::Row(item) => {
            let checkbox = if selected.contains(&item.row.id) {
                CHECKBOX_ON
            } else {
                CHECKBOX_OFF
            };
            [
                checkbox.to_owned(),
                item.row.group.clone(),
                item.row.name.clone(),
                format_number(item.row.qty),
                format_number(item.row.price),
                format_number(item.total),
            ]
        }
        DisplayItem::Collapsed { group, count } => [
            COLLAPSED_MARK.to_owned(),
            format!("group {group} collapsed ({count} rows hidden)"),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

fn footer_text(model: &TableModel) -> String {
    let totals = model.footer_totals();
    format!(
        "qty {} | value {}",
        format_number(totals.qty),
        format_number(totals.value)
    )
}

fn status_text(view_data: &ViewData) -> String {
    let busy = view_data
        .cloud_in_flight
        .map(|in_flight| format!(" [{}…]", in_flight.kind.label()))
        .unwrap_or_default();
    match &view_data.status_line {
        Some(line) => format!("{line}{busy}"),
        None => format!("? help | ctrl-q quit{busy}"),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn help_overlay_text() -> String {
    "\
up/down or j/k  move cursor\n\
space           toggle row selection\n\
1-5             cycle sort on group/name/qty/price/total\n\
r               reset sorting\n\
c               collapse groups of selected rows\n\
x               clear selection\n\
e or enter      expand collapsed group under cursor\n\
E               expand all groups\n\
l               load table from cloud\n\
s               save table to cloud\n\
o               sign out\n\
esc             close this help\n\
ctrl-q          quit"
        .to_owned()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
