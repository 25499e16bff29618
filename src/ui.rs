use crate::cache::FetchCache;
use crate::model::{JournalEntry, Planner, Quote};
use crate::schedule::{apply_template, DayType, Phase, TemplateSet, DAY_NAMES};
use crate::storage::PlannerStore;
use crate::timeline::{project, ItemKind, PlacedItem, TimelineItem, ZoomPan};
use anyhow::{anyhow, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// How long the derived goal-item list stays fresh before it is rebuilt from
/// the planner.
const GOAL_CACHE_TTL_SECS: i64 = 5;
/// Wheel ticks arrive as discrete events; treat each as this many delta units.
const WHEEL_TICK_DELTA: f64 = 20.0;

pub fn run(planner: Planner, store: PlannerStore) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, store);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    planner: Planner,
    store: PlannerStore,
    view: ViewMode,
    mode: Mode,
    status: String,
    last_save: Instant,
    banner_quote: Option<Quote>,
    templates: TemplateSet,
    // Derived goal items; positions are still recomputed on every draw.
    goal_items: FetchCache<Vec<TimelineItem>>,
    // One zoom/pan per timeline surface, never shared.
    goal_zoom: ZoomPan,
    journal_zoom: ZoomPan,
    goal_idx: usize,
    journal_idx: usize,
    schedule_day: u8,
    schedule_phase: usize,
    goal_track_area: Option<Rect>,
    journal_track_area: Option<Rect>,
}

enum Mode {
    Normal,
    CreatingEntry(EntryForm),
    EditingEntry { entry_id: String, form: EntryForm },
    EditingBlock { block_id: String, target: BlockField, field: FieldValue },
    ApplyTemplate { day: u8, selected: usize },
    ConfirmDelete { kind: ItemKind, id: String, label: String },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum BlockField {
    Activity,
    Notes,
}

impl BlockField {
    fn title(&self) -> &'static str {
        match self {
            BlockField::Activity => "Edit Activity",
            BlockField::Notes => "Edit Notes",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BlockField::Activity => "Activity",
            BlockField::Notes => "Notes",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ViewMode {
    Goals,
    Journal,
    Schedule,
}

impl ViewMode {
    fn label(&self) -> &'static str {
        match self {
            ViewMode::Goals => "Goals",
            ViewMode::Journal => "Journal",
            ViewMode::Schedule => "Schedule",
        }
    }
}

struct EntryForm {
    title: FieldValue,
    body: FieldValue,
    date: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Body,
    Date,
}

impl EntryForm {
    fn new(today: NaiveDate) -> Self {
        EntryForm {
            title: FieldValue::new(""),
            body: FieldValue::new(""),
            date: FieldValue::new(&today.format("%Y-%m-%d").to_string()),
            field: FormField::Title,
        }
    }

    fn from_entry(entry: &JournalEntry) -> Self {
        EntryForm {
            title: FieldValue::new(&entry.title),
            body: FieldValue::new(entry.body.as_deref().unwrap_or_default()),
            date: FieldValue::new(&entry.written_on.format("%Y-%m-%d").to_string()),
            field: FormField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Date,
            FormField::Date => FormField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Date,
            FormField::Body => FormField::Title,
            FormField::Date => FormField::Body,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Body => &mut self.body,
            FormField::Date => &mut self.date,
        }
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(planner: Planner, store: PlannerStore) -> Self {
        let status = format!("Loaded planner from {}", store.path().display());
        let banner_quote = planner.random_quote().cloned();
        App {
            planner,
            store,
            view: ViewMode::Goals,
            mode: Mode::Normal,
            status,
            last_save: Instant::now(),
            banner_quote,
            templates: TemplateSet::builtin(),
            goal_items: FetchCache::new(ChronoDuration::seconds(GOAL_CACHE_TTL_SECS)),
            goal_zoom: ZoomPan::new(),
            journal_zoom: ZoomPan::new(),
            goal_idx: 0,
            journal_idx: 0,
            schedule_day: 1,
            schedule_phase: 0,
            goal_track_area: None,
            journal_track_area: None,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    // ---- input -----------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::CreatingEntry(_) | Mode::EditingEntry { .. } => self.handle_form_key(key),
            Mode::EditingBlock { .. } => self.handle_block_edit_key(key),
            Mode::ApplyTemplate { .. } => self.handle_template_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => {
                self.set_view(ViewMode::Goals);
                return Ok(false);
            }
            KeyCode::Char('2') => {
                self.set_view(ViewMode::Journal);
                return Ok(false);
            }
            KeyCode::Char('3') => {
                self.set_view(ViewMode::Schedule);
                return Ok(false);
            }
            _ => {}
        }

        match self.view {
            ViewMode::Goals => self.handle_goals_key(key),
            ViewMode::Journal => self.handle_journal_key(key),
            ViewMode::Schedule => self.handle_schedule_key(key),
        }
    }

    fn handle_goals_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                if self.goal_idx > 0 {
                    self.goal_idx -= 1;
                }
            }
            KeyCode::Right | KeyCode::Char('l') => self.goal_idx += 1,
            KeyCode::Char('+') | KeyCode::Char('=') => self.goal_zoom.zoom_in(),
            KeyCode::Char('-') => self.goal_zoom.zoom_out(),
            KeyCode::Char('[') => {
                self.goal_zoom.drag_start(0.0);
                self.goal_zoom.drag_move(8.0);
                self.goal_zoom.drag_end();
            }
            KeyCode::Char(']') => {
                self.goal_zoom.drag_start(0.0);
                self.goal_zoom.drag_move(-8.0);
                self.goal_zoom.drag_end();
            }
            KeyCode::Char('0') => {
                self.goal_zoom.reset();
                self.status = "Zoom and pan reset".into();
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(item) = self.selected_goal_item() {
                    let (kind, id, title) = (item.kind, item.id.clone(), item.content.clone());
                    match self.planner.toggle_goal(kind, &id) {
                        Ok(done) => self.persist(format!(
                            "{} \"{}\"",
                            if done { "Completed" } else { "Reopened" },
                            title
                        ))?,
                        Err(err) => self.status = format!("Toggle failed: {}", err),
                    }
                } else {
                    self.status = "No goal selected".into();
                }
            }
            KeyCode::Char('d') => {
                if let Some(item) = self.selected_goal_item() {
                    self.mode = Mode::ConfirmDelete {
                        kind: item.kind,
                        id: item.id.clone(),
                        label: item.content.clone(),
                    };
                } else {
                    self.status = "No goal selected to delete".into();
                }
            }
            _ => {}
        }
        self.ensure_bounds();
        Ok(false)
    }

    fn handle_journal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.journal_idx > 0 {
                    self.journal_idx -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.journal_idx += 1,
            KeyCode::Char('+') | KeyCode::Char('=') => self.journal_zoom.zoom_in(),
            KeyCode::Char('-') => self.journal_zoom.zoom_out(),
            KeyCode::Char('0') => {
                self.journal_zoom.reset();
                self.status = "Zoom and pan reset".into();
            }
            KeyCode::Char('n') => {
                self.mode = Mode::CreatingEntry(EntryForm::new(Utc::now().date_naive()));
                self.status =
                    "New entry (Tab moves fields, Ctrl+Enter saves, Esc cancels)".into();
            }
            KeyCode::Char('e') => {
                let selected = self
                    .selected_entry()
                    .map(|entry| (entry.id.clone(), EntryForm::from_entry(entry)));
                if let Some((entry_id, form)) = selected {
                    self.mode = Mode::EditingEntry { entry_id, form };
                    self.status = "Editing entry".into();
                } else {
                    self.status = "No entry selected to edit".into();
                }
            }
            KeyCode::Char('d') => {
                let selected = self
                    .selected_entry()
                    .map(|entry| (entry.id.clone(), entry.title.clone()));
                if let Some((id, label)) = selected {
                    self.mode = Mode::ConfirmDelete {
                        kind: ItemKind::Journal,
                        id,
                        label,
                    };
                } else {
                    self.status = "No entry selected to delete".into();
                }
            }
            _ => {}
        }
        self.ensure_bounds();
        Ok(false)
    }

    fn handle_schedule_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.schedule_day = if self.schedule_day == 0 {
                    6
                } else {
                    self.schedule_day - 1
                };
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.schedule_day = (self.schedule_day + 1) % 7;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.schedule_phase > 0 {
                    self.schedule_phase -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.schedule_phase + 1 < Phase::ALL.len() {
                    self.schedule_phase += 1;
                }
            }
            KeyCode::Char('a') => {
                self.mode = Mode::ApplyTemplate {
                    day: self.schedule_day,
                    selected: 0,
                };
                self.status = "Pick a day type (Enter applies, Esc cancels)".into();
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(block_id) = self.cursor_block_id() {
                    match self.planner.toggle_block(&block_id) {
                        Ok(done) => self.persist(format!(
                            "Block {}",
                            if done { "completed" } else { "reopened" }
                        ))?,
                        Err(err) => self.status = format!("Toggle failed: {}", err),
                    }
                } else {
                    self.status = "No block at cursor".into();
                }
            }
            KeyCode::Char('e') => self.open_block_editor(BlockField::Activity),
            KeyCode::Char('n') => self.open_block_editor(BlockField::Notes),
            _ => {}
        }
        Ok(false)
    }

    fn open_block_editor(&mut self, target: BlockField) {
        if let Some(block_id) = self.cursor_block_id() {
            let current = self
                .planner
                .schedule
                .iter()
                .find(|b| b.id == block_id)
                .map(|b| match target {
                    BlockField::Activity => b.activity.clone(),
                    BlockField::Notes => b.notes.clone(),
                })
                .unwrap_or_default();
            self.mode = Mode::EditingBlock {
                block_id,
                target,
                field: FieldValue::new(&current),
            };
            self.status = format!("{} (Enter saves, Esc cancels)", target.title());
        } else {
            self.status = "No block at cursor; apply a template first".into();
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::CreatingEntry(form) => {
                close_form = self.process_form_key(None, form, key)?;
            }
            Mode::EditingEntry { entry_id, form } => {
                let id = entry_id.clone();
                close_form = self.process_form_key(Some(id), form, key)?;
            }
            _ => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn process_form_key(
        &mut self,
        edit_id: Option<String>,
        form: &mut EntryForm,
        key: KeyEvent,
    ) -> Result<bool> {
        let mut close_form = false;
        match key.code {
            KeyCode::Esc => {
                close_form = true;
                self.status = "Canceled".into();
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.active_field_mut().move_left(),
            KeyCode::Right => form.active_field_mut().move_right(),
            KeyCode::Enter => {
                let control = key.modifiers.contains(KeyModifiers::CONTROL);
                if form.field == FormField::Body && !control {
                    form.active_field_mut().insert_char('\n');
                } else {
                    close_form = match self.submit_entry_form(edit_id.clone(), form) {
                        Ok(()) => true,
                        Err(err) => {
                            self.status = format!("Could not save: {}", err);
                            false
                        }
                    };
                }
            }
            KeyCode::Backspace => form.active_field_mut().backspace(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        Ok(close_form)
    }

    fn handle_block_edit_key(&mut self, key: KeyEvent) -> Result<bool> {
        let (block_id, target, mut field) = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::EditingBlock {
                block_id,
                target,
                field,
            } => (block_id, target, field),
            other => {
                self.mode = other;
                return Ok(false);
            }
        };
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
            }
            KeyCode::Enter => {
                let text = field.value.trim().to_string();
                let result = match target {
                    BlockField::Activity => self.planner.set_block_activity(&block_id, text),
                    BlockField::Notes => self.planner.set_block_note(&block_id, text),
                };
                match result {
                    Ok(()) => self.persist(format!("{} updated", target.label()))?,
                    Err(err) => self.status = format!("Update failed: {}", err),
                }
            }
            KeyCode::Left => {
                field.move_left();
                self.mode = Mode::EditingBlock { block_id, target, field };
            }
            KeyCode::Right => {
                field.move_right();
                self.mode = Mode::EditingBlock { block_id, target, field };
            }
            KeyCode::Backspace => {
                field.backspace();
                self.mode = Mode::EditingBlock { block_id, target, field };
            }
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    field.insert_char(c);
                }
                self.mode = Mode::EditingBlock { block_id, target, field };
            }
            _ => {
                self.mode = Mode::EditingBlock { block_id, target, field };
            }
        }
        Ok(false)
    }

    fn handle_template_key(&mut self, key: KeyEvent) -> Result<bool> {
        let (day, mut selected) = match self.mode {
            Mode::ApplyTemplate { day, selected } => (day, selected),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Canceled".into();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if selected > 0 {
                    selected -= 1;
                }
                self.mode = Mode::ApplyTemplate { day, selected };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if selected + 1 < DayType::ALL.len() {
                    selected += 1;
                }
                self.mode = Mode::ApplyTemplate { day, selected };
            }
            KeyCode::Enter => {
                let day_type = DayType::ALL[selected];
                let applied =
                    apply_template(&mut self.planner.schedule, day, day_type, &self.templates)
                        .map_err(|err| anyhow!(err))?;
                self.mode = Mode::Normal;
                if applied != day_type {
                    self.persist(format!(
                        "Applied {} to {} (weekend substituted for {})",
                        applied, DAY_NAMES[day as usize], day_type
                    ))?;
                } else {
                    self.persist(format!("Applied {} to {}", applied, DAY_NAMES[day as usize]))?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let (kind, id) = match &self.mode {
            Mode::ConfirmDelete { kind, id, .. } => (*kind, id.clone()),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.planner.delete_goal(kind, &id) {
                    Ok(()) => self.persist(format!("Deleted {} {}", kind.label(), id))?,
                    Err(err) => self.status = format!("Delete failed: {}", err),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        self.ensure_bounds();
        Ok(false)
    }

    /// Route wheel and drag gestures to the zoom/pan state of the timeline
    /// surface under the pointer. Wheel without Ctrl is left unconsumed so
    /// list scrolling keeps working.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
        let surface = match self.view {
            ViewMode::Goals => self
                .goal_track_area
                .filter(|area| contains(area, mouse.column, mouse.row))
                .map(|_| &mut self.goal_zoom),
            ViewMode::Journal => self
                .journal_track_area
                .filter(|area| contains(area, mouse.column, mouse.row))
                .map(|_| &mut self.journal_zoom),
            ViewMode::Schedule => None,
        };
        let Some(zoom_pan) = surface else {
            return;
        };
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                zoom_pan.on_wheel(-WHEEL_TICK_DELTA, ctrl);
            }
            MouseEventKind::ScrollDown => {
                zoom_pan.on_wheel(WHEEL_TICK_DELTA, ctrl);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                zoom_pan.drag_start(mouse.column as f64);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                zoom_pan.drag_move(mouse.column as f64);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                zoom_pan.drag_end();
            }
            _ => {}
        }
    }

    // ---- derived state ---------------------------------------------------

    fn set_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.status = format!("Switched to {} view", view.label());
        }
        self.ensure_bounds();
    }

    /// Goal items for projection, rebuilt from the planner when the cache
    /// window lapses or after a mutation.
    fn goal_items(&mut self) -> Vec<TimelineItem> {
        let now = Utc::now();
        if !self.goal_items.is_fresh(now) {
            let items = self.planner.goal_timeline_items();
            self.goal_items.store(items, now);
        }
        self.goal_items.get().cloned().unwrap_or_default()
    }

    fn placed_goals(&mut self, today: NaiveDate) -> Vec<PlacedItem> {
        project(self.goal_items(), today)
    }

    fn placed_journal(&self, today: NaiveDate) -> Vec<PlacedItem> {
        project(self.planner.journal_timeline_items(), today)
    }

    fn selected_goal_item(&mut self) -> Option<TimelineItem> {
        let today = Utc::now().date_naive();
        let placed = self.placed_goals(today);
        placed.get(self.goal_idx).map(|p| p.item.clone())
    }

    fn sorted_entries(&self) -> Vec<&JournalEntry> {
        let mut entries: Vec<&JournalEntry> = self.planner.journal.iter().collect();
        entries.sort_by_key(|e| std::cmp::Reverse((e.written_on, e.created_at)));
        entries
    }

    fn selected_entry(&self) -> Option<&JournalEntry> {
        self.sorted_entries().get(self.journal_idx).copied()
    }

    fn cursor_block_id(&self) -> Option<String> {
        let phase = Phase::ALL[self.schedule_phase];
        self.planner
            .block_for(self.schedule_day, phase)
            .map(|b| b.id.clone())
    }

    fn ensure_bounds(&mut self) {
        let today = Utc::now().date_naive();
        let goal_count = self.placed_goals(today).len();
        if goal_count == 0 {
            self.goal_idx = 0;
        } else {
            self.goal_idx = self.goal_idx.min(goal_count - 1);
        }
        let entry_count = self.planner.journal.len();
        if entry_count == 0 {
            self.journal_idx = 0;
        } else {
            self.journal_idx = self.journal_idx.min(entry_count - 1);
        }
    }

    fn submit_entry_form(&mut self, edit_id: Option<String>, form: &EntryForm) -> Result<()> {
        let title = form.title.value.trim().to_string();
        if title.is_empty() {
            return Err(anyhow!("title is required"));
        }
        let written_on = NaiveDate::parse_from_str(form.date.value.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow!("invalid date (use YYYY-MM-DD): {}", form.date.value.trim()))?;
        let body = if form.body.value.trim().is_empty() {
            None
        } else {
            Some(form.body.value.clone())
        };
        match edit_id {
            Some(id) => {
                let entry = self
                    .planner
                    .journal
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| anyhow!("entry {} not found", id))?;
                entry.title = title;
                entry.body = body;
                entry.written_on = written_on;
                self.persist(format!("Updated entry {}", id))?;
            }
            None => {
                let id = self
                    .planner
                    .add_journal_entry(written_on, title, body)
                    .map_err(|err| anyhow!(err))?;
                self.journal_idx = 0;
                self.persist(format!("Added entry {}", id))?;
            }
        }
        Ok(())
    }

    fn persist(&mut self, message: impl Into<String>) -> Result<()> {
        self.store.save(&self.planner)?;
        self.last_save = Instant::now();
        self.status = message.into();
        self.goal_items.invalidate();
        self.ensure_bounds();
        Ok(())
    }

    // ---- drawing ---------------------------------------------------------

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        // Captured once per frame so every placement in this pass agrees on
        // what "today" is.
        let today = Utc::now().date_naive();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        match self.view {
            ViewMode::Goals => self.draw_goals(f, layout[1], today),
            ViewMode::Journal => self.draw_journal(f, layout[1], today),
            ViewMode::Schedule => self.draw_schedule(f, layout[1]),
        }
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::CreatingEntry(form) => self.draw_entry_form(f, "New Journal Entry", form),
            Mode::EditingEntry { form, .. } => self.draw_entry_form(f, "Edit Journal Entry", form),
            Mode::EditingBlock { target, field, .. } => self.draw_block_editor(f, *target, field),
            Mode::ApplyTemplate { day, selected } => {
                let (day, selected) = (*day, *selected);
                self.draw_template_picker(f, day, selected);
            }
            Mode::ConfirmDelete { kind, label, .. } => {
                let (kind, label) = (*kind, label.clone());
                self.draw_confirm(f, kind, &label);
            }
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let scope = self.store.scope().label();
        let mut spans = vec![
            Span::styled(
                "winday ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                &self.planner.name,
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(scope, Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view.label().to_lowercase()),
                Style::default().fg(Color::Magenta),
            ),
        ];
        if let Some(quote) = &self.banner_quote {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                format!("\"{}\"", truncate_text(&quote.text, 48)),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_goals(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, today: NaiveDate) {
        let placed = self.placed_goals(today);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(area);

        self.goal_track_area = Some(sections[0]);
        draw_timeline_track(
            f,
            sections[0],
            "Goal Timeline",
            &placed,
            &self.goal_zoom,
            Some(self.goal_idx),
        );
        self.draw_goal_list(f, sections[1], &placed);
    }

    fn draw_goal_list(&self, f: &mut ratatui::Frame<'_>, area: Rect, placed: &[PlacedItem]) {
        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        if !placed.is_empty() {
            let selected = self.goal_idx.min(placed.len() - 1);
            let offset = adjust_offset(selected, 0, viewport, 1, placed.len());
            *state.offset_mut() = offset;
            state.select(Some(selected));
        }

        let items = if placed.is_empty() {
            vec![ListItem::new(
                "No dated goals. Add one with `winday milestone \"...\" --date YYYY-MM-DD`.",
            )]
        } else {
            placed.iter().map(goal_list_item).collect()
        };
        let block = Block::default()
            .title(Span::styled(
                format!("Goals ({})", placed.len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_journal(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, today: NaiveDate) {
        let placed = self.placed_journal(today);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(4)])
            .split(area);

        self.journal_track_area = Some(sections[0]);
        let entries = self.sorted_entries();
        let selected_key = entries
            .get(self.journal_idx)
            .map(|e| format!("{}:{}", ItemKind::Journal.label(), e.id));
        let selected_track_idx = selected_key
            .as_deref()
            .and_then(|key| placed.iter().position(|p| p.item.key() == key));
        draw_timeline_track(
            f,
            sections[0],
            "Journal Timeline",
            &placed,
            &self.journal_zoom,
            selected_track_idx,
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(sections[1]);
        self.draw_entry_list(f, columns[0], &entries);
        self.draw_entry_detail(f, columns[1], &entries);
    }

    fn draw_entry_list(&self, f: &mut ratatui::Frame<'_>, area: Rect, entries: &[&JournalEntry]) {
        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        if !entries.is_empty() {
            let selected = self.journal_idx.min(entries.len() - 1);
            let offset = adjust_offset(selected, 0, viewport, 1, entries.len());
            *state.offset_mut() = offset;
            state.select(Some(selected));
        }

        let items = if entries.is_empty() {
            vec![ListItem::new("No entries yet. Press n to write one.")]
        } else {
            entries
                .iter()
                .map(|entry| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            entry.written_on.format("%Y-%m-%d").to_string(),
                            Style::default().fg(Color::LightYellow),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            truncate_text(&entry.title, 48),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]))
                })
                .collect()
        };
        let block = Block::default()
            .title(Span::styled(
                format!("Entries ({})", entries.len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_entry_detail(&self, f: &mut ratatui::Frame<'_>, area: Rect, entries: &[&JournalEntry]) {
        let lines = match entries.get(self.journal_idx) {
            Some(entry) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        entry.title.clone(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        entry.written_on.format("%A, %B %e %Y").to_string(),
                        Style::default().fg(Color::Gray),
                    )),
                    Line::from(""),
                ];
                match &entry.body {
                    Some(body) => {
                        for text_line in body.lines() {
                            lines.push(Line::from(text_line.to_string()));
                        }
                    }
                    None => lines.push(Line::from(Span::styled(
                        "(no body)",
                        Style::default().fg(Color::DarkGray),
                    ))),
                }
                lines
            }
            None => vec![Line::from("No entry selected")],
        };
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(Span::styled(
                    "Entry",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(paragraph, area);
    }

    fn draw_schedule(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let constraints: Vec<Constraint> =
            (0..7).map(|_| Constraint::Percentage(100 / 7)).collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for day in 0u8..7 {
            let blocks: Vec<_> = self
                .planner
                .schedule
                .iter()
                .filter(|b| b.day_of_week == day)
                .collect();
            let day_selected = day == self.schedule_day;
            let accent = if day_selected {
                Color::Cyan
            } else {
                Color::DarkGray
            };
            let mut title = DAY_NAMES[day as usize].to_string();
            if let Some(first) = blocks.first() {
                title.push_str(&format!(" [{}]", first.day_type));
            }

            let mut lines: Vec<Line<'static>> = Vec::new();
            if blocks.is_empty() {
                lines.push(Line::from(Span::styled(
                    "(empty)",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for (phase_idx, phase) in Phase::ALL.iter().enumerate() {
                let Some(block) = blocks.iter().find(|b| b.phase == *phase) else {
                    continue;
                };
                let cursor_here = day_selected && phase_idx == self.schedule_phase;
                let mark = if block.completed { "x" } else { " " };
                let mut style = if block.completed {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::White)
                };
                if cursor_here {
                    style = style
                        .bg(Color::LightCyan)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD);
                }
                lines.push(Line::from(Span::styled(
                    format!("[{}] {}: {}", mark, phase.label(), block.activity),
                    style,
                )));
            }

            let block_widget = Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(accent).add_modifier(if day_selected {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent));
            let paragraph = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(block_widget);
            f.render_widget(paragraph, columns[day as usize]);
        }
    }

    fn draw_footer(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let (detail, title) = self.detail_content();
        let detail = Paragraph::new(detail).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("1", Style::default().fg(Color::LightCyan)),
            Span::raw(" goals  "),
            Span::styled("2", Style::default().fg(Color::LightCyan)),
            Span::raw(" journal  "),
            Span::styled("3", Style::default().fg(Color::LightCyan)),
            Span::raw(" schedule  "),
        ];
        match self.view {
            ViewMode::Goals => spans.extend([
                Span::styled("←→/h l", Style::default().fg(Color::LightCyan)),
                Span::raw(" select  "),
                Span::styled("+/-", Style::default().fg(Color::LightGreen)),
                Span::raw(" zoom  "),
                Span::styled("[ ]", Style::default().fg(Color::LightGreen)),
                Span::raw(" pan  "),
                Span::styled("0", Style::default().fg(Color::LightGreen)),
                Span::raw(" reset  "),
                Span::styled("space", Style::default().fg(Color::LightYellow)),
                Span::raw(" toggle  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
            ViewMode::Journal => spans.extend([
                Span::styled("↑↓/j k", Style::default().fg(Color::LightCyan)),
                Span::raw(" browse  "),
                Span::styled("n", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new  "),
                Span::styled("e", Style::default().fg(Color::LightYellow)),
                Span::raw(" edit  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
                Span::styled("+/-", Style::default().fg(Color::LightGreen)),
                Span::raw(" zoom  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
            ViewMode::Schedule => spans.extend([
                Span::styled("←↑↓→/h j k l", Style::default().fg(Color::LightCyan)),
                Span::raw(" move  "),
                Span::styled("a", Style::default().fg(Color::LightMagenta)),
                Span::raw(" apply day type  "),
                Span::styled("space", Style::default().fg(Color::LightYellow)),
                Span::raw(" toggle  "),
                Span::styled("e", Style::default().fg(Color::LightYellow)),
                Span::raw(" edit activity  "),
                Span::styled("n", Style::default().fg(Color::LightYellow)),
                Span::raw(" note  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
        }
        Line::from(spans)
    }

    fn detail_content(&mut self) -> (Vec<Line<'static>>, String) {
        match self.view {
            ViewMode::Goals => {
                if let Some(item) = self.selected_goal_item() {
                    let mut spans = vec![
                        Span::styled(
                            item.content.clone(),
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            item.kind.label().to_string(),
                            Style::default().fg(kind_color(item.kind)),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            item.target_date.format("%Y-%m-%d").to_string(),
                            Style::default().fg(Color::LightYellow),
                        ),
                    ];
                    if item.completed {
                        spans.push(Span::raw("  "));
                        spans.push(Span::styled("done", Style::default().fg(Color::Green)));
                    }
                    (vec![Line::from(spans)], "Selected".into())
                } else {
                    (vec![Line::from("No goal selected")], "Selected".into())
                }
            }
            ViewMode::Journal => {
                if let Some(entry) = self.selected_entry() {
                    (
                        vec![Line::from(format!(
                            "{}  {}",
                            entry.written_on, entry.title
                        ))],
                        "Selected".into(),
                    )
                } else {
                    (vec![Line::from("No entry selected")], "Selected".into())
                }
            }
            ViewMode::Schedule => {
                let phase = Phase::ALL[self.schedule_phase];
                match self.planner.block_for(self.schedule_day, phase) {
                    Some(block) => {
                        let mut lines = vec![Line::from(format!(
                            "{} {}: {}",
                            DAY_NAMES[block.day_of_week as usize],
                            block.phase.label(),
                            block.activity
                        ))];
                        if !block.notes.is_empty() {
                            lines.push(Line::from(block.notes.clone()));
                        }
                        (lines, "Block".into())
                    }
                    None => (
                        vec![Line::from(format!(
                            "{} {}: no block (press a)",
                            DAY_NAMES[self.schedule_day as usize],
                            phase.label()
                        ))],
                        "Block".into(),
                    ),
                }
            }
        }
    }

    fn draw_entry_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &EntryForm) {
        let area = centered_rect(70, 60, f.size());
        let mut fields = Vec::new();
        fields.extend(field_lines(
            "Title",
            &form.title,
            form.field == FormField::Title,
        ));
        fields.extend(field_lines(
            "Body",
            &form.body,
            form.field == FormField::Body,
        ));
        fields.extend(field_lines(
            "Date (YYYY-MM-DD)",
            &form.date,
            form.field == FormField::Date,
        ));
        fields.push(Line::from(Span::styled(
            "Ctrl+Enter to save • Esc to cancel • Tab to move • Enter adds newline in Body",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_block_editor(&self, f: &mut ratatui::Frame<'_>, target: BlockField, field: &FieldValue) {
        let area = centered_rect(60, 20, f.size());
        let lines = vec![
            Line::from(Span::styled(
                format!("{}: {}", target.label(), field.with_caret()),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(
                    target.title(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_template_picker(&self, f: &mut ratatui::Frame<'_>, day: u8, selected: usize) {
        let area = centered_rect(50, 40, f.size());
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Apply a day type to {}", DAY_NAMES[day as usize]),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (idx, day_type) in DayType::ALL.iter().enumerate() {
            let marker = if idx == selected { "> " } else { "  " };
            let mut label = day_type.to_string();
            if *day_type == DayType::StandardWork && crate::schedule::is_weekend(day) {
                label.push_str(" (becomes weekend on this day)");
            }
            let style = if idx == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!("{}{}", marker, label),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Replaces every block for this day",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(
                    "Apply Template",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, kind: ItemKind, label: &str) {
        let area = centered_rect(50, 30, f.size());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete {} \"{}\"?", kind.label(), label),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

/// Render one timeline surface: an axis row with kind-colored markers, label
/// rows above and below, and a zoom readout. Marker columns come from the
/// projected positions mapped through the surface's zoom/pan; the projection
/// itself is never rescaled here.
fn draw_timeline_track(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    placed: &[PlacedItem],
    zoom_pan: &ZoomPan,
    selected: Option<usize>,
) {
    let block = Block::default()
        .title(Span::styled(
            format!("{} ({})", title, placed.len()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 10 || inner.height < 3 {
        return;
    }

    if placed.is_empty() {
        let msg = Paragraph::new("Nothing to draw yet").alignment(Alignment::Center);
        f.render_widget(msg, inner);
        return;
    }

    let width = inner.width as usize;
    let mut axis: Vec<(char, Style)> = vec![('─', Style::default().fg(Color::DarkGray)); width];
    let label_rows = inner.height.saturating_sub(2).max(1) as usize;
    let mut labels: Vec<Vec<(char, Style)>> =
        vec![vec![(' ', Style::default()); width]; label_rows];

    for (idx, item) in placed.iter().enumerate() {
        let col = zoom_pan.to_column(item.position, inner.width);
        if col < 0 || col >= width as i64 {
            continue;
        }
        let col = col as usize;
        let is_selected = selected == Some(idx);
        let marker_style = if is_selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if item.item.completed {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(kind_color(item.item.kind))
        };
        axis[col] = (marker_char(item.item.kind), marker_style);

        // Alternate label rows so neighbors do not overwrite each other as
        // often; the separation pass keeps markers at least 10 points apart.
        let row = idx % label_rows;
        let text = truncate_text(&item.item.content, 14);
        let label_style = if is_selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        for (offset, ch) in text.chars().enumerate() {
            let target = col + offset;
            if target >= width {
                break;
            }
            labels[row][target] = (ch, label_style);
        }
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    let above = label_rows / 2;
    for row in labels.iter().take(above) {
        lines.push(cells_to_line(row));
    }
    lines.push(cells_to_line(&axis));
    for row in labels.iter().skip(above) {
        lines.push(cells_to_line(row));
    }
    if (lines.len() as u16) < inner.height {
        lines.push(Line::from(Span::styled(
            format!("zoom {:.0}%  pan {:+.0}", zoom_pan.zoom(), zoom_pan.pan()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines);
    f.render_widget(paragraph, inner);
}

fn cells_to_line(cells: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = None;
    for (ch, style) in cells {
        match run_style {
            Some(current) if current == *style => run.push(*ch),
            Some(current) => {
                spans.push(Span::styled(std::mem::take(&mut run), current));
                run.push(*ch);
                run_style = Some(*style);
            }
            None => {
                run.push(*ch);
                run_style = Some(*style);
            }
        }
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

fn kind_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Vision => Color::LightMagenta,
        ItemKind::Bhag => Color::LightBlue,
        ItemKind::Milestone => Color::LightGreen,
        ItemKind::Journal => Color::LightYellow,
    }
}

fn marker_char(kind: ItemKind) -> char {
    match kind {
        ItemKind::Vision => '◆',
        ItemKind::Bhag => '●',
        ItemKind::Milestone => '○',
        ItemKind::Journal => '▪',
    }
}

fn goal_list_item(placed: &PlacedItem) -> ListItem<'static> {
    let item = &placed.item;
    let mark = if item.completed { "x" } else { " " };
    let mut spans = vec![
        Span::styled(
            format!("[{}] ", mark),
            Style::default().fg(if item.completed {
                Color::Green
            } else {
                Color::Gray
            }),
        ),
        Span::styled(
            format!("{:<9}", item.kind.label()),
            Style::default().fg(kind_color(item.kind)),
        ),
        Span::styled(
            truncate_text(&item.content, 44),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            item.target_date.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::LightYellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{:.1}%", placed.position),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if item.completed {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("done", Style::default().fg(Color::Green)));
    }
    ListItem::new(Line::from(spans))
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    let segments: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.split('\n').collect()
    };
    segments
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let mut spans = Vec::new();
            spans.push(Span::styled(
                if idx == 0 {
                    prefix.clone()
                } else {
                    spacer.clone()
                },
                label_style,
            ));
            spans.push(Span::styled((*line).to_string(), value_style));
            Line::from(spans)
        })
        .collect()
}

fn contains(area: &Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.chars().count() >= max.saturating_sub(3) {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    if out.chars().count() > max {
        out.truncate(max);
    }
    out
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_offset_keeps_selection_in_viewport() {
        assert_eq!(adjust_offset(0, 0, 5, 1, 20), 0);
        assert_eq!(adjust_offset(10, 0, 5, 1, 20), 7);
        assert_eq!(adjust_offset(19, 0, 5, 1, 20), 15);
        assert_eq!(adjust_offset(3, 10, 5, 1, 20), 2);
    }

    #[test]
    fn truncate_text_respects_limit() {
        assert_eq!(truncate_text("short", 10), "short");
        let long = truncate_text("a very long goal title", 10);
        assert!(long.chars().count() <= 10);
        assert!(long.ends_with("..."));
    }

    #[test]
    fn cells_to_line_merges_runs_of_equal_style() {
        let style_a = Style::default().fg(Color::Red);
        let style_b = Style::default().fg(Color::Blue);
        let cells = vec![
            ('a', style_a),
            ('b', style_a),
            ('c', style_b),
            ('d', style_a),
        ];
        let line = cells_to_line(&cells);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content.as_ref(), "ab");
        assert_eq!(line.spans[1].content.as_ref(), "c");
    }

    #[test]
    fn contains_checks_rect_bounds() {
        let area = Rect::new(2, 3, 10, 4);
        assert!(contains(&area, 2, 3));
        assert!(contains(&area, 11, 6));
        assert!(!contains(&area, 12, 6));
        assert!(!contains(&area, 5, 7));
    }
}
