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
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use stockroom_app::{
    Completion, FieldKind, FieldValue, FormIntent, FormPhase, InventoryColumn, InventoryField,
    InventoryService, ListCommand, ListEvent, ListView, SelectAllState, SortDirection, perform,
};

const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const CHECK_ON: &str = "[x]";
const CHECK_OFF: &str = "[ ]";
const CHECK_SOME: &str = "[-]";

/// Cursor and overlay state that only the terminal cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ViewData {
    row: usize,
    column: usize,
    field: usize,
    help_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

pub fn run_app<S>(view: &mut ListView, service: Arc<S>) -> Result<()>
where
    S: InventoryService + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (completion_tx, completion_rx) = mpsc::channel();

    view.dispatch(ListCommand::Mount);
    spawn_pending(view, &service, &completion_tx);

    let mut result = Ok(());
    loop {
        process_completions(view, &mut view_data, &service, &completion_tx, &completion_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, view, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                let outcome = handle_key_event(view, &mut view_data, key);
                spawn_pending(view, &service, &completion_tx);
                if outcome == KeyOutcome::Quit {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    view.dispatch(ListCommand::Unmount);
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Runs each queued request on its own thread; results come back through
/// `tx` in whatever order they finish.
fn spawn_pending<S>(view: &mut ListView, service: &Arc<S>, tx: &Sender<Completion>)
where
    S: InventoryService + 'static,
{
    for request in view.drain_requests() {
        tracing::debug!(request = %request.id, call = request.call.name(), "spawning worker");
        let service = Arc::clone(service);
        let sender = tx.clone();
        thread::spawn(move || {
            let completion = perform(service.as_ref(), request);
            let _ = sender.send(completion);
        });
    }
}

fn process_completions<S>(
    view: &mut ListView,
    view_data: &mut ViewData,
    service: &Arc<S>,
    tx: &Sender<Completion>,
    rx: &Receiver<Completion>,
) where
    S: InventoryService + 'static,
{
    let mut changed = false;
    while let Ok(completion) = rx.try_recv() {
        let events = view.complete(completion);
        changed |= events
            .iter()
            .any(|event| matches!(event, ListEvent::InventoryLoaded(_)));
    }
    if changed {
        clamp_cursor(view, view_data);
    }
    spawn_pending(view, service, tx);
}

fn clamp_cursor(view: &ListView, view_data: &mut ViewData) {
    let rows = view.rows().len();
    view_data.row = view_data.row.min(rows.saturating_sub(1));
}

fn handle_key_event(view: &mut ListView, view_data: &mut ViewData, key: KeyEvent) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            view_data.help_visible = false;
        }
        return KeyOutcome::Continue;
    }

    let modals = view.modals();
    if modals.delete {
        handle_delete_key(view, key);
        return KeyOutcome::Continue;
    }
    if modals.create {
        handle_form_key(view, view_data, FormIntent::Create, key);
        return KeyOutcome::Continue;
    }
    if modals.edit {
        handle_form_key(view, view_data, FormIntent::Edit, key);
        return KeyOutcome::Continue;
    }

    handle_table_key(view, view_data, key)
}

fn handle_table_key(view: &mut ListView, view_data: &mut ViewData, key: KeyEvent) -> KeyOutcome {
    let row_count = view.rows().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.row = (view_data.row + 1).min(row_count.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.row = view_data.row.saturating_sub(1);
        }
        KeyCode::Char('g') => view_data.row = 0,
        KeyCode::Char('G') => view_data.row = row_count.saturating_sub(1),
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.column = view_data.column.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            view_data.column = (view_data.column + 1).min(InventoryColumn::ALL.len() - 1);
        }
        KeyCode::Char('s') => {
            view.dispatch(ListCommand::RequestSort(
                InventoryColumn::ALL[view_data.column],
            ));
        }
        KeyCode::Char(' ') => {
            let id = view
                .rows()
                .get(view_data.row)
                .map(|row| row.record.id.clone());
            if let Some(id) = id {
                view.dispatch(ListCommand::ToggleRow(id));
            }
        }
        KeyCode::Char('a') => {
            let select = view.select_all_state() != SelectAllState::All;
            view.dispatch(ListCommand::SetAllSelected(select));
        }
        KeyCode::Char('n') => {
            view_data.field = 0;
            view.dispatch(ListCommand::OpenCreate);
        }
        KeyCode::Char('e') => {
            view_data.field = 0;
            view.dispatch(ListCommand::OpenEdit);
        }
        KeyCode::Char('d') => {
            view.dispatch(ListCommand::OpenDelete);
        }
        KeyCode::Char('r') => {
            view.dispatch(ListCommand::Refresh);
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_delete_key(view: &mut ListView, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            view.dispatch(ListCommand::ConfirmDelete);
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            view.dispatch(ListCommand::CancelDelete);
        }
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            view.dispatch(ListCommand::CloseModals {
                reset_selection: true,
            });
        }
        _ => {}
    }
}

fn handle_form_key(view: &mut ListView, view_data: &mut ViewData, intent: FormIntent, key: KeyEvent) {
    let fields = InventoryField::ALL;
    let field = fields[view_data.field.min(fields.len() - 1)];
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            view_data.field = (view_data.field + 1) % fields.len();
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.field = (view_data.field + fields.len() - 1) % fields.len();
        }
        KeyCode::Enter => {
            view.dispatch(ListCommand::SubmitForm(intent));
        }
        KeyCode::Esc => {
            view.dispatch(ListCommand::CancelForm(intent));
        }
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            view.dispatch(ListCommand::CloseModals {
                reset_selection: false,
            });
        }
        KeyCode::Left | KeyCode::Right => {
            let step = if key.code == KeyCode::Left { -1 } else { 1 };
            if let Some(value) = cycle_choice(view, intent, field, step) {
                edit_field(view, intent, field, FieldValue::Text(value));
            }
        }
        KeyCode::Char(' ') if field == InventoryField::NeverExpires => {
            let flag = !view.form(intent).values().never_expires;
            edit_field(view, intent, field, FieldValue::Flag(flag));
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(current) = view.form(intent).values().text(field) {
                let mut next = current.to_owned();
                next.push(ch);
                edit_field(view, intent, field, FieldValue::Text(next));
            }
        }
        KeyCode::Backspace => {
            if let Some(current) = view.form(intent).values().text(field) {
                let mut next = current.to_owned();
                next.pop();
                edit_field(view, intent, field, FieldValue::Text(next));
            }
        }
        _ => {}
    }
}

fn edit_field(view: &mut ListView, intent: FormIntent, field: InventoryField, value: FieldValue) {
    view.dispatch(ListCommand::EditField {
        intent,
        field,
        value,
    });
}

/// Next value for a choice field, wrapping at either end.
fn cycle_choice(
    view: &ListView,
    intent: FormIntent,
    field: InventoryField,
    step: isize,
) -> Option<String> {
    let choices: Vec<&str> = match field.constraint().kind {
        FieldKind::ProductChoice => view.product_choices(),
        FieldKind::UnitChoice => view.units().iter().map(|unit| unit.key).collect(),
        _ => return None,
    };
    if choices.is_empty() {
        return None;
    }
    let current = view.form(intent).values().text(field).unwrap_or_default();
    let len = choices.len() as isize;
    let next = match choices.iter().position(|choice| *choice == current) {
        Some(index) => (index as isize + step).rem_euclid(len),
        None if step < 0 => len - 1,
        None => 0,
    };
    Some(choices[next as usize].to_owned())
}

fn render(frame: &mut ratatui::Frame<'_>, view: &ListView, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let toolbar = Paragraph::new(toolbar_text(view))
        .block(Block::default().title("stockroom").borders(Borders::ALL));
    frame.render_widget(toolbar, layout[0]);

    render_table(frame, layout[1], view, view_data);

    let status = Paragraph::new(status_text(view))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = view.active_form() {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(form_overlay_text(view, form.intent(), view_data.field))
            .block(
                Block::default()
                    .title(form.intent().title())
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(overlay, area);
    }

    if view.modals().delete {
        let area = centered_rect(44, 26, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(delete_overlay_text(view)).block(
            Block::default()
                .title("Delete Inventory")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ListView, view_data: &ViewData) {
    let rows = view.rows();
    if rows.is_empty() {
        let message = if view.is_loading() {
            "loading inventory..."
        } else if view.inventory_fetched() {
            "no inventory yet -- press n to add an item"
        } else {
            "inventory unavailable -- press r to retry"
        };
        let empty = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("inventory"));
        frame.render_widget(empty, area);
        return;
    }

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(InventoryColumn::ALL.iter().map(|_| Constraint::Min(8)));

    let mut header_cells = vec![Cell::from(select_all_mark(view.select_all_state()))];
    header_cells.extend(
        header_labels(view)
            .into_iter()
            .enumerate()
            .map(|(index, label)| {
                let mut style = Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                if index == view_data.column {
                    style = style.fg(Color::Cyan);
                }
                Cell::from(label).style(style)
            }),
    );
    let header = Row::new(header_cells);

    let body = rows.iter().enumerate().map(|(row_index, row)| {
        let cursor = row_index == view_data.row;
        let mut cells = vec![Cell::from(if row.selected { CHECK_ON } else { CHECK_OFF })];
        cells.extend(InventoryColumn::ALL.iter().map(|column| {
            let mut style = Style::default();
            if *column == InventoryColumn::UnitOfMeasurement && !row.record.unit_known {
                style = style.fg(Color::DarkGray);
            }
            if cursor {
                style = style.bg(Color::DarkGray);
            }
            Cell::from(row.record.cell(*column)).style(style)
        }));
        Row::new(cells)
    });

    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("inventory ({})", rows.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn select_all_mark(state: SelectAllState) -> &'static str {
    match state {
        SelectAllState::None => CHECK_OFF,
        SelectAllState::Some => CHECK_SOME,
        SelectAllState::All => CHECK_ON,
    }
}

fn header_labels(view: &ListView) -> Vec<String> {
    let sort = view.sort();
    InventoryColumn::ALL
        .iter()
        .map(|column| {
            let mut label = column.label().to_owned();
            if sort.order_by == Some(*column) {
                label.push(' ');
                label.push_str(match sort.direction {
                    SortDirection::Asc => SORT_MARK_ASC,
                    SortDirection::Desc => SORT_MARK_DESC,
                });
            }
            label
        })
        .collect()
}

fn toolbar_text(view: &ListView) -> String {
    let selected = view.selection().len();
    let mut text = format!("{selected} selected");
    if let Some(column) = view.sort().order_by {
        text.push_str(&format!(
            " | sorted by {} {}",
            column.label(),
            view.sort().direction.as_str()
        ));
    }
    text.push_str(" | n new  e edit  d delete  r refresh  ? help");
    text
}

fn status_text(view: &ListView) -> String {
    match view.status() {
        Some(status) => status.to_owned(),
        None if view.is_loading() => "loading...".to_owned(),
        None => String::new(),
    }
}

fn form_overlay_text(view: &ListView, intent: FormIntent, focus: usize) -> String {
    let form = view.form(intent);
    let values = form.values();
    let mut lines = Vec::new();

    for (index, field) in InventoryField::ALL.iter().enumerate() {
        let marker = if index == focus { ">" } else { " " };
        let required = if field.constraint().required { "*" } else { "" };
        let value = match values.text(*field) {
            Some(text) => text.to_owned(),
            None => {
                if values.never_expires {
                    CHECK_ON.to_owned()
                } else {
                    CHECK_OFF.to_owned()
                }
            }
        };
        lines.push(format!("{marker} {}{required}: {value}", field.label()));
        if let Some(error) = form.errors().get(*field) {
            lines.push(format!("    ! {error}"));
        }
    }

    lines.push(String::new());
    match form.phase() {
        FormPhase::Submitting(_) => lines.push("saving...".to_owned()),
        FormPhase::SubmitFailed => {
            if let Some(error) = form.submit_error() {
                lines.push(format!("save failed: {error}"));
            }
        }
        _ => {}
    }
    let save = if form.submit_enabled() {
        "enter save"
    } else {
        "(save disabled)"
    };
    lines.push(format!("{save}  esc cancel  tab next  <-/-> choose"));
    lines.join("\n")
}

fn delete_overlay_text(view: &ListView) -> String {
    let count = view.delete_targets().len();
    let noun = if count == 1 { "item" } else { "items" };
    let mut lines = vec![format!("Delete {count} {noun}?")];
    if view.is_deleting() {
        lines.push("deleting...".to_owned());
    }
    if let Some(error) = view.delete_error() {
        lines.push(format!("delete failed: {error}"));
    }
    lines.push(String::new());
    lines.push("y confirm  n cancel".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> String {
    [
        "j/k      move between rows",
        "h/l      move between columns",
        "s        sort by the highlighted column",
        "space    select the current row",
        "a        select or clear every row",
        "n        new item",
        "e        edit the selected item",
        "d        delete the selected items",
        "r        reload from the server",
        "ctrl+x   dismiss a dialog",
        "q        quit",
    ]
    .join("\n")
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
