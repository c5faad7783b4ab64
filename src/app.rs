//! Application state and event handling.
//!
//! Elm-style state for the terminal front end. Key presses update the
//! [`App`] and may produce a [`BoardCommand`] for the board worker; the
//! worker's [`BoardEvent`]s are folded back in with [`App::handle_event`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use opac_tui::board::{EditSession, Notification, NotificationLevel};
use opac_tui::models::{
    Priority, Project, ProjectDraft, ProjectId, Task, TaskDraft, TaskId, TaskStatus,
};
use opac_tui::view::{BucketOrder, Period, TimelineConfig, ViewConfig};
use opac_tui::worker::{
    BoardCommand, BoardEvent, BoardId, BoardSnapshot, DashboardSnapshot, EditorForm,
    KanbanSnapshot, ProjectsSnapshot, TimelineSnapshot,
};

/// Active tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Projects,
    Kanban,
    Timeline,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Dashboard, Tab::Projects, Tab::Kanban, Tab::Timeline]
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Projects,
            Tab::Projects => Tab::Kanban,
            Tab::Kanban => Tab::Timeline,
            Tab::Timeline => Tab::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Timeline,
            Tab::Projects => Tab::Dashboard,
            Tab::Kanban => Tab::Projects,
            Tab::Timeline => Tab::Kanban,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Projects => "Projects",
            Tab::Kanban => "Kanban",
            Tab::Timeline => "Timeline",
        }
    }

    /// Board rendered by this tab
    pub fn board(&self) -> BoardId {
        match self {
            Tab::Dashboard => BoardId::Dashboard,
            Tab::Projects => BoardId::Projects,
            Tab::Kanban => BoardId::Kanban,
            Tab::Timeline => BoardId::Timeline,
        }
    }
}

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// A form is open
    Editing,
    /// Delete confirmation
    Confirming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Name,
    Description,
    Project,
    Deadline,
    Priority,
    Status,
    /// First day of a custom timeline period
    From,
    /// Last day of a custom timeline period
    To,
    SubmitButton,
    CancelButton,
    DeleteButton,
}

impl FormField {
    pub fn task_fields(session: EditSession) -> &'static [FormField] {
        match session {
            EditSession::Create => &[
                FormField::Title,
                FormField::Description,
                FormField::Project,
                FormField::Deadline,
                FormField::Priority,
                FormField::Status,
                FormField::SubmitButton,
                FormField::CancelButton,
            ],
            EditSession::Edit(_) => &[
                FormField::Title,
                FormField::Description,
                FormField::Project,
                FormField::Deadline,
                FormField::Priority,
                FormField::Status,
                FormField::SubmitButton,
                FormField::CancelButton,
                FormField::DeleteButton,
            ],
        }
    }

    pub fn project_fields() -> &'static [FormField] {
        &[
            FormField::Name,
            FormField::Description,
            FormField::SubmitButton,
            FormField::CancelButton,
        ]
    }

    pub fn period_fields() -> &'static [FormField] {
        &[
            FormField::From,
            FormField::To,
            FormField::SubmitButton,
            FormField::CancelButton,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title:",
            FormField::Name => "Name:",
            FormField::Description => "Description:",
            FormField::Project => "Project:",
            FormField::Deadline => "Deadline:",
            FormField::Priority => "Priority:",
            FormField::Status => "Status:",
            FormField::From => "From:",
            FormField::To => "To:",
            FormField::SubmitButton => "Save",
            FormField::CancelButton => "Cancel",
            FormField::DeleteButton => "Delete",
        }
    }

    pub fn is_text_input(&self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::Name | FormField::Description
        )
    }

    pub fn is_date_picker(&self) -> bool {
        matches!(self, FormField::Deadline | FormField::From | FormField::To)
    }

    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            FormField::Project | FormField::Priority | FormField::Status
        )
    }

    pub fn is_button(&self) -> bool {
        matches!(
            self,
            FormField::SubmitButton | FormField::CancelButton | FormField::DeleteButton
        )
    }
}

/// Values being edited
#[derive(Debug, Clone, PartialEq)]
pub enum FormDraft {
    Task(TaskDraft),
    Project(ProjectDraft),
    /// Custom timeline period, applied on top of `config`
    Period {
        config: TimelineConfig,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// Open form
#[derive(Debug, Clone)]
pub struct FormState {
    /// Board that owns the form
    pub board: BoardId,
    pub session: EditSession,
    pub draft: FormDraft,
    pub focused_field: usize,
    pub fields: &'static [FormField],
    pub error: Option<String>,
    /// Submitted and waiting for the worker to close it
    pub submitting: bool,
}

impl FormState {
    pub fn from_editor(form: EditorForm) -> Self {
        match form {
            EditorForm::Task {
                board,
                session,
                draft,
            } => Self {
                board,
                session,
                draft: FormDraft::Task(draft),
                focused_field: 0,
                fields: FormField::task_fields(session),
                error: None,
                submitting: false,
            },
            EditorForm::Project { session, draft } => Self {
                board: BoardId::Projects,
                session,
                draft: FormDraft::Project(draft),
                focused_field: 0,
                fields: FormField::project_fields(),
                error: None,
                submitting: false,
            },
        }
    }

    /// Custom period form for the timeline, prefilled with the current window
    pub fn custom_period(config: TimelineConfig, today: NaiveDate) -> Self {
        let (start, end) = match config.period {
            Period::Custom { start, end } => (start, end),
            period => period.window(today).unzip(),
        };
        Self {
            board: BoardId::Timeline,
            session: EditSession::Create,
            draft: FormDraft::Period { config, start, end },
            focused_field: 0,
            fields: FormField::period_fields(),
            error: None,
            submitting: false,
        }
    }

    /// Forms the worker knows nothing about
    pub fn is_local(&self) -> bool {
        matches!(self.draft, FormDraft::Period { .. })
    }

    pub fn title(&self) -> &'static str {
        match (&self.draft, self.session) {
            (FormDraft::Period { .. }, _) => " Custom Period ",
            (FormDraft::Task(_), EditSession::Create) => " New Task ",
            (FormDraft::Task(_), EditSession::Edit(_)) => " Edit Task ",
            (FormDraft::Project(_), EditSession::Create) => " New Project ",
            (FormDraft::Project(_), EditSession::Edit(_)) => " Edit Project ",
        }
    }

    pub fn current_field(&self) -> FormField {
        self.fields[self.focused_field]
    }

    pub fn next_field(&mut self) {
        self.focused_field = (self.focused_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self
            .focused_field
            .checked_sub(1)
            .unwrap_or(self.fields.len() - 1);
    }

    pub fn current_text_mut(&mut self) -> Option<&mut String> {
        let field = self.current_field();
        match &mut self.draft {
            FormDraft::Task(draft) => match field {
                FormField::Title => Some(&mut draft.title),
                FormField::Description => Some(&mut draft.description),
                _ => None,
            },
            FormDraft::Project(draft) => match field {
                FormField::Name => Some(&mut draft.name),
                FormField::Description => Some(&mut draft.description),
                _ => None,
            },
            FormDraft::Period { .. } => None,
        }
    }

    /// Date behind the focused date picker
    pub fn current_date(&self) -> Option<Option<NaiveDate>> {
        match (&self.draft, self.current_field()) {
            (FormDraft::Task(draft), FormField::Deadline) => Some(draft.deadline),
            (FormDraft::Period { start, .. }, FormField::From) => Some(*start),
            (FormDraft::Period { end, .. }, FormField::To) => Some(*end),
            _ => None,
        }
    }

    fn current_date_mut(&mut self) -> Option<&mut Option<NaiveDate>> {
        let field = self.current_field();
        match (&mut self.draft, field) {
            (FormDraft::Task(draft), FormField::Deadline) => Some(&mut draft.deadline),
            (FormDraft::Period { start, .. }, FormField::From) => Some(start),
            (FormDraft::Period { end, .. }, FormField::To) => Some(end),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(text) = self.current_text_mut() {
            text.push(c);
        }
    }

    /// Delete a character, or clear the focused date
    pub fn handle_backspace(&mut self) {
        if let Some(date) = self.current_date_mut() {
            *date = None;
            return;
        }
        if let Some(text) = self.current_text_mut() {
            text.pop();
        }
    }

    /// Shift the focused date. An empty date starts from `today`.
    pub fn shift_date(&mut self, days: i64, today: NaiveDate) {
        if let Some(date) = self.current_date_mut() {
            *date = match *date {
                Some(date) => date.checked_add_signed(chrono::Duration::days(days)),
                None => Some(today),
            };
        }
    }

    /// Move a selector one step. `projects` backs the project selector.
    pub fn cycle_selector(&mut self, forward: bool, projects: &[Project]) {
        let field = self.current_field();
        let FormDraft::Task(draft) = &mut self.draft else {
            return;
        };
        match field {
            FormField::Priority => {
                draft.priority = step(Priority::all(), &draft.priority, forward);
            }
            FormField::Status => {
                draft.status = step(TaskStatus::all(), &draft.status, forward);
            }
            FormField::Project => {
                let ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
                if ids.is_empty() {
                    return;
                }
                draft.project_id = Some(match draft.project_id {
                    Some(current) => step(&ids, &current, forward),
                    None => ids[0],
                });
            }
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        match &self.draft {
            FormDraft::Task(draft) => draft.validate(),
            FormDraft::Project(draft) => draft.validate(),
            FormDraft::Period {
                start: Some(start),
                end: Some(end),
                ..
            } if start > end => Err("Start must not be after end"),
            FormDraft::Period { .. } => Ok(()),
        }
    }

    /// Command that saves this form
    pub fn submit_command(&self) -> BoardCommand {
        match &self.draft {
            FormDraft::Task(draft) => BoardCommand::Submit(self.board, draft.clone()),
            FormDraft::Project(draft) => BoardCommand::SaveProject(draft.clone()),
            FormDraft::Period { config, start, end } => {
                BoardCommand::SetTimelineConfig(TimelineConfig {
                    period: Period::Custom {
                        start: *start,
                        end: *end,
                    },
                    ..*config
                })
            }
        }
    }
}

/// Next or previous item of `items`, wrapping. Unknown values restart at the first item.
fn step<T: Copy + PartialEq>(items: &[T], current: &T, forward: bool) -> T {
    let len = items.len();
    let next = match items.iter().position(|item| item == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    items[next]
}

/// What a confirmed delete removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    /// The task whose form is open on this board
    Task(BoardId),
    Project(ProjectId),
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub target: DeleteTarget,
    /// Whether "Yes" is focused (false = "No" is focused)
    pub yes_focused: bool,
}

impl ConfirmDialog {
    pub fn delete_task(board: BoardId, title: &str) -> Self {
        Self {
            title: "Delete Task".to_string(),
            message: format!("Delete \"{title}\"?\nThis cannot be undone."),
            target: DeleteTarget::Task(board),
            yes_focused: false,
        }
    }

    pub fn delete_project(project: &Project) -> Self {
        Self {
            title: "Delete Project".to_string(),
            message: format!(
                "Delete \"{}\" and all of its tasks?\nThis cannot be undone.",
                project.display_name()
            ),
            target: DeleteTarget::Project(project.id),
            yes_focused: false,
        }
    }

    pub fn command(&self) -> BoardCommand {
        match self.target {
            DeleteTarget::Task(board) => BoardCommand::Delete(board),
            DeleteTarget::Project(id) => BoardCommand::DeleteProject(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
    /// Auto-dismiss duration (None for manual dismiss)
    pub auto_dismiss: Option<Duration>,
}

impl ErrorPopup {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
            auto_dismiss: Some(Duration::from_secs(5)),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.auto_dismiss
            .is_some_and(|duration| self.shown_at.elapsed() > duration)
    }
}

/// Line of the log panel
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub message: String,
    pub level: NotificationLevel,
}

impl LogEntry {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

impl From<Notification> for LogEntry {
    fn from(notification: Notification) -> Self {
        Self::new(notification.level, notification.message)
    }
}

/// Cursor positions of every tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// 0 = due soon, 1 = high priority
    pub dashboard_column: usize,
    pub dashboard_row: usize,
    pub projects_row: usize,
    pub kanban_column: TaskStatus,
    pub kanban_row: usize,
    pub timeline_row: usize,
}

/// Main application state
#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub active_tab: Tab,
    pub input_mode: InputMode,

    pub dashboard: Option<DashboardSnapshot>,
    pub projects: Option<ProjectsSnapshot>,
    pub kanban: Option<KanbanSnapshot>,
    pub timeline: Option<TimelineSnapshot>,
    /// Latest known project list, for selectors and names
    pub known_projects: Vec<Project>,

    pub selection: Selection,
    pub error_popup: Option<ErrorPopup>,
    pub form_state: Option<FormState>,
    pub confirm_dialog: Option<ConfirmDialog>,

    pub logs: Vec<LogEntry>,
    max_logs: usize,

    pub api_connected: bool,
    pub last_refresh: Option<Instant>,
    /// Boards with a reload in flight
    loading: HashSet<BoardId>,
    pub show_help: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Tab::Dashboard)
    }
}

impl App {
    pub fn new(active_tab: Tab) -> Self {
        let mut app = Self {
            should_quit: false,
            active_tab,
            input_mode: InputMode::Normal,
            dashboard: None,
            projects: None,
            kanban: None,
            timeline: None,
            known_projects: Vec::new(),
            selection: Selection::default(),
            error_popup: None,
            form_state: None,
            confirm_dialog: None,
            logs: Vec::new(),
            max_logs: 100,
            api_connected: false,
            last_refresh: None,
            loading: HashSet::new(),
            show_help: false,
        };
        app.log(LogEntry::info("Connecting to API..."));
        app
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    pub fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.error_popup = Some(ErrorPopup::new(title, message));
    }

    pub fn dismiss_error(&mut self) {
        self.error_popup = None;
    }

    pub fn is_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    pub fn is_board_loading(&self, board: BoardId) -> bool {
        self.loading.contains(&board)
    }

    /// Reload every board
    pub fn refresh_all(&mut self) -> BoardCommand {
        self.loading.extend(BoardId::all().iter().copied());
        BoardCommand::RefreshAll
    }

    fn refresh(&mut self, board: BoardId) -> BoardCommand {
        self.loading.insert(board);
        BoardCommand::Refresh(board)
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn close_confirm(&mut self) {
        self.confirm_dialog = None;
        self.input_mode = if self.form_state.is_some() {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    fn switch_tab(&mut self, tab: Tab) -> BoardCommand {
        self.active_tab = tab;
        self.refresh(tab.board())
    }

    // ============================================
    // Worker events
    // ============================================

    pub fn handle_event(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            BoardEvent::Notify(notification) => {
                if notification.level == NotificationLevel::Error {
                    self.show_error("Error", notification.message.clone());
                }
                self.log(notification.into());
            }
            BoardEvent::Connection(connected) => {
                if connected != self.api_connected || self.last_refresh.is_none() {
                    self.log(if connected {
                        LogEntry::new(NotificationLevel::Success, "Connected to API")
                    } else {
                        LogEntry::error("API unreachable")
                    });
                }
                self.api_connected = connected;
            }
            BoardEvent::FormOpened(form) => {
                self.form_state = Some(FormState::from_editor(form));
                self.input_mode = InputMode::Editing;
            }
            BoardEvent::FormClosed(board) => {
                if self
                    .form_state
                    .as_ref()
                    .is_some_and(|f| f.board == board && !f.is_local())
                {
                    self.confirm_dialog = None;
                    self.close_form();
                }
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        let board = match &snapshot {
            BoardSnapshot::Dashboard(_) => BoardId::Dashboard,
            BoardSnapshot::Projects(_) => BoardId::Projects,
            BoardSnapshot::Kanban(_) => BoardId::Kanban,
            BoardSnapshot::Timeline(_) => BoardId::Timeline,
        };
        self.loading.remove(&board);
        self.last_refresh = Some(Instant::now());

        match snapshot {
            BoardSnapshot::Dashboard(s) => {
                self.known_projects = s.projects.clone();
                self.dashboard = Some(s);
            }
            BoardSnapshot::Projects(s) => {
                self.known_projects = s.projects.iter().map(|v| v.project.clone()).collect();
                self.projects = Some(s);
            }
            BoardSnapshot::Kanban(s) => self.kanban = Some(s),
            BoardSnapshot::Timeline(s) => {
                self.known_projects = s.projects.clone();
                self.timeline = Some(s);
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let sel = &mut self.selection;
        let dashboard_len = self
            .dashboard
            .as_ref()
            .map_or(0, |d| dashboard_column(d, sel.dashboard_column).len());
        sel.dashboard_row = sel.dashboard_row.min(dashboard_len.saturating_sub(1));

        let projects_len = self.projects.as_ref().map_or(0, |p| p.projects.len());
        sel.projects_row = sel.projects_row.min(projects_len.saturating_sub(1));

        let kanban_len = self
            .kanban
            .as_ref()
            .map_or(0, |k| k.view.columns.column(sel.kanban_column).len());
        sel.kanban_row = sel.kanban_row.min(kanban_len.saturating_sub(1));

        let timeline_len = self.timeline_tasks().count();
        self.selection.timeline_row = self
            .selection
            .timeline_row
            .min(timeline_len.saturating_sub(1));
    }

    // ============================================
    // Selection
    // ============================================

    pub fn project_name(&self, id: Option<ProjectId>) -> &str {
        id.and_then(|id| self.known_projects.iter().find(|p| p.id == id))
            .map_or("No project", |p| p.display_name())
    }

    /// Tasks of the timeline in display order
    pub fn timeline_tasks(&self) -> impl Iterator<Item = &Task> {
        self.timeline
            .iter()
            .flat_map(|t| t.buckets.iter())
            .flat_map(|b| b.tasks.iter())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let sel = &self.selection;
        match self.active_tab {
            Tab::Dashboard => self
                .dashboard
                .as_ref()
                .and_then(|d| dashboard_column(d, sel.dashboard_column).get(sel.dashboard_row)),
            Tab::Kanban => self
                .kanban
                .as_ref()
                .and_then(|k| k.view.columns.column(sel.kanban_column).get(sel.kanban_row)),
            Tab::Timeline => self.timeline_tasks().nth(sel.timeline_row),
            Tab::Projects => None,
        }
    }

    /// Look a task up in whatever the boards last showed
    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        let kanban = self
            .kanban
            .iter()
            .flat_map(|k| TaskStatus::all().iter().map(move |&s| k.view.columns.column(s)))
            .flatten();
        let dashboard = self
            .dashboard
            .iter()
            .flat_map(|d| d.due_soon.iter().chain(d.high_priority.iter()));
        kanban
            .chain(dashboard)
            .chain(self.timeline_tasks())
            .find(|t| t.id == id)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects
            .as_ref()
            .and_then(|p| p.projects.get(self.selection.projects_row))
            .map(|v| &v.project)
    }

    fn list_len(&self) -> usize {
        let sel = &self.selection;
        match self.active_tab {
            Tab::Dashboard => self
                .dashboard
                .as_ref()
                .map_or(0, |d| dashboard_column(d, sel.dashboard_column).len()),
            Tab::Projects => self.projects.as_ref().map_or(0, |p| p.projects.len()),
            Tab::Kanban => self
                .kanban
                .as_ref()
                .map_or(0, |k| k.view.columns.column(sel.kanban_column).len()),
            Tab::Timeline => self.timeline_tasks().count(),
        }
    }

    fn row_mut(&mut self) -> &mut usize {
        match self.active_tab {
            Tab::Dashboard => &mut self.selection.dashboard_row,
            Tab::Projects => &mut self.selection.projects_row,
            Tab::Kanban => &mut self.selection.kanban_row,
            Tab::Timeline => &mut self.selection.timeline_row,
        }
    }

    // ============================================
    // Keys
    // ============================================

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.dismiss_error();
            }
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.show_help = false;
            }
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Editing => self.handle_editing_key(key, chrono::Local::now().date_naive()),
            InputMode::Confirming => self.handle_confirming_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Some(BoardCommand::Shutdown);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Some(BoardCommand::Shutdown);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Char('r') => {
                self.log(LogEntry::info("Refreshing..."));
                return Some(self.refresh_all());
            }
            KeyCode::Tab => return Some(self.switch_tab(self.active_tab.next())),
            KeyCode::BackTab => return Some(self.switch_tab(self.active_tab.previous())),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                return Some(self.switch_tab(Tab::all()[index]));
            }
            KeyCode::Char('c') => return Some(BoardCommand::OpenCreate(self.active_tab.board())),
            _ => {}
        }

        match self.active_tab {
            Tab::Dashboard => self.handle_dashboard_key(key),
            Tab::Projects => self.handle_projects_key(key),
            Tab::Kanban => self.handle_kanban_key(key),
            Tab::Timeline => self.handle_timeline_key(key),
        }
    }

    fn open_selected_card(&self) -> Option<BoardCommand> {
        let task = self.selected_task()?;
        Some(BoardCommand::OpenCard(self.active_tab.board(), task.id))
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right => {
                self.selection.dashboard_column = 1 - self.selection.dashboard_column.min(1);
                self.selection.dashboard_row = 0;
                None
            }
            KeyCode::Enter | KeyCode::Char('e') => self.open_selected_card(),
            _ => {
                self.handle_list_key(key);
                None
            }
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        match key.code {
            KeyCode::Enter => {
                let id = self.selected_project()?.id;
                self.active_tab = Tab::Kanban;
                self.selection.kanban_row = 0;
                self.loading.insert(BoardId::Kanban);
                Some(BoardCommand::OpenProject(Some(id)))
            }
            KeyCode::Char('e') => Some(BoardCommand::EditProject(self.selected_project()?.id)),
            KeyCode::Char('d') | KeyCode::Delete => {
                let dialog = ConfirmDialog::delete_project(self.selected_project()?);
                self.confirm_dialog = Some(dialog);
                self.input_mode = InputMode::Confirming;
                None
            }
            _ => {
                self.handle_list_key(key);
                None
            }
        }
    }

    fn kanban_config(&self) -> ViewConfig {
        self.kanban.as_ref().map(|k| k.config).unwrap_or_default()
    }

    fn handle_kanban_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('H') => self.move_selected_card(false),
            KeyCode::Char('L') => self.move_selected_card(true),
            KeyCode::Left if shift => self.move_selected_card(false),
            KeyCode::Right if shift => self.move_selected_card(true),
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(status) = self.selection.kanban_column.previous() {
                    self.selection.kanban_column = status;
                    self.selection.kanban_row = 0;
                }
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(status) = self.selection.kanban_column.next() {
                    self.selection.kanban_column = status;
                    self.selection.kanban_row = 0;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char('e') => self.open_selected_card(),
            KeyCode::Char('s') => {
                let mut config = self.kanban_config();
                config.sort_key = config.sort_key.cycle();
                Some(BoardCommand::SetKanbanConfig(config))
            }
            KeyCode::Char('o') => {
                let mut config = self.kanban_config();
                config.sort_order = config.sort_order.toggle();
                Some(BoardCommand::SetKanbanConfig(config))
            }
            KeyCode::Char('f') => {
                let mut config = self.kanban_config();
                config.status = config.status.cycle();
                Some(BoardCommand::SetKanbanConfig(config))
            }
            KeyCode::Char('p') => {
                let mut config = self.kanban_config();
                config.priority = config.priority.cycle();
                Some(BoardCommand::SetKanbanConfig(config))
            }
            KeyCode::Char('a') => {
                self.loading.insert(BoardId::Kanban);
                Some(BoardCommand::OpenProject(None))
            }
            _ => {
                self.handle_list_key(key);
                None
            }
        }
    }

    /// Drop the selected card on the neighbouring column and follow it
    fn move_selected_card(&mut self, forward: bool) -> Option<BoardCommand> {
        let task = self.selected_task()?;
        let target = if forward {
            task.status.next()
        } else {
            task.status.previous()
        }?;
        let id = task.id;
        self.selection.kanban_column = target;
        self.selection.kanban_row = 0;
        Some(BoardCommand::Drop(id, target))
    }

    fn timeline_config(&self) -> TimelineConfig {
        self.timeline.as_ref().map(|t| t.config).unwrap_or_default()
    }

    fn handle_timeline_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        let mut config = self.timeline_config();
        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => return self.open_selected_card(),
            KeyCode::Char('v') => config.period = config.period.cycle(),
            KeyCode::Char('C') => {
                let today = chrono::Local::now().date_naive();
                self.form_state = Some(FormState::custom_period(config, today));
                self.input_mode = InputMode::Editing;
                return None;
            }
            KeyCode::Char('x') => config.date_field = config.date_field.cycle(),
            KeyCode::Char('f') => config.status = config.status.cycle(),
            KeyCode::Char('p') => {
                let ids: Vec<ProjectId> = self.known_projects.iter().map(|p| p.id).collect();
                config.project = config.project.cycle(&ids);
            }
            KeyCode::Char('b') => {
                config.bucket_order = match config.bucket_order {
                    BucketOrder::Chronological => BucketOrder::FirstSeen,
                    BucketOrder::FirstSeen => BucketOrder::Chronological,
                }
            }
            _ => {
                self.handle_list_key(key);
                return None;
            }
        }
        self.selection.timeline_row = 0;
        Some(BoardCommand::SetTimelineConfig(config))
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let total = self.list_len();
        if total == 0 {
            return;
        }
        let row = self.row_mut();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => *row = (*row + 1) % total,
            KeyCode::Char('k') | KeyCode::Up => *row = row.checked_sub(1).unwrap_or(total - 1),
            KeyCode::Char('g') => *row = 0,
            KeyCode::Char('G') => *row = total - 1,
            _ => {}
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent, today: NaiveDate) -> Option<BoardCommand> {
        let Some(form) = self.form_state.as_mut() else {
            self.input_mode = InputMode::Normal;
            return None;
        };
        if form.submitting {
            return None;
        }

        let field = form.current_field();
        match key.code {
            KeyCode::Esc => return self.cancel_form(),
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Enter => return self.handle_form_enter(),
            KeyCode::Backspace => form.handle_backspace(),
            // Up raises dates and moves selectors forward
            KeyCode::Up | KeyCode::Down if field.is_date_picker() => {
                form.shift_date(if key.code == KeyCode::Up { 1 } else { -1 }, today);
            }
            KeyCode::Up | KeyCode::Down if field.is_selector() => {
                form.cycle_selector(key.code == KeyCode::Up, &self.known_projects);
            }
            KeyCode::Down => form.next_field(),
            KeyCode::Up => form.prev_field(),
            KeyCode::Left | KeyCode::Right if field.is_date_picker() => {
                let days = if key.code == KeyCode::Right { 7 } else { -7 };
                form.shift_date(days, today);
            }
            KeyCode::Left | KeyCode::Right if field.is_selector() => {
                form.cycle_selector(key.code == KeyCode::Right, &self.known_projects);
            }
            KeyCode::Char(c) => form.handle_char(c),
            _ => {}
        }
        None
    }

    fn handle_form_enter(&mut self) -> Option<BoardCommand> {
        let form = self.form_state.as_mut()?;
        match form.current_field() {
            FormField::CancelButton => self.cancel_form(),
            FormField::DeleteButton => {
                let title = match &form.draft {
                    FormDraft::Task(draft) => draft.title.clone(),
                    FormDraft::Project(draft) => draft.name.clone(),
                    FormDraft::Period { .. } => return None,
                };
                self.confirm_dialog = Some(ConfirmDialog::delete_task(form.board, &title));
                self.input_mode = InputMode::Confirming;
                None
            }
            FormField::SubmitButton => {
                if let Err(reason) = form.validate() {
                    form.error = Some(reason.to_string());
                    return None;
                }
                form.error = None;
                let command = form.submit_command();
                if form.is_local() {
                    self.selection.timeline_row = 0;
                    self.close_form();
                    return Some(command);
                }
                form.submitting = true;
                self.log(LogEntry::info("Saving..."));
                Some(command)
            }
            _ => {
                form.next_field();
                None
            }
        }
    }

    /// Close the open form; worker-owned forms also cancel on their board
    fn cancel_form(&mut self) -> Option<BoardCommand> {
        let form = self.form_state.as_ref()?;
        let command = (!form.is_local()).then_some(BoardCommand::Cancel(form.board));
        self.close_form();
        command
    }

    fn handle_confirming_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        let Some(dialog) = self.confirm_dialog.as_mut() else {
            self.input_mode = InputMode::Normal;
            return None;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.close_confirm();
                None
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                dialog.yes_focused = !dialog.yes_focused;
                None
            }
            KeyCode::Enter if !dialog.yes_focused => {
                self.close_confirm();
                None
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let command = dialog.command();
                self.close_confirm();
                if let Some(form) = self.form_state.as_mut() {
                    form.submitting = true;
                }
                self.log(LogEntry::info("Deleting..."));
                Some(command)
            }
            _ => None,
        }
    }

    /// Called every frame
    pub fn tick(&mut self) {
        if self.error_popup.as_ref().is_some_and(|p| p.should_dismiss()) {
            self.error_popup = None;
        }
    }

    pub fn status_text(&self) -> String {
        let connection = if self.api_connected {
            "Connected"
        } else {
            "Disconnected"
        };
        let loading = if self.is_loading() { " [Loading...]" } else { "" };
        let last_refresh = self
            .last_refresh
            .map(|t| {
                let secs = t.elapsed().as_secs();
                if secs < 60 {
                    format!(" ({secs}s ago)")
                } else {
                    format!(" ({}m ago)", secs / 60)
                }
            })
            .unwrap_or_default();
        format!("{connection}{loading}{last_refresh}")
    }
}

/// Tasks of one dashboard column
pub fn dashboard_column(snapshot: &DashboardSnapshot, column: usize) -> &[Task] {
    if column == 0 {
        &snapshot.due_soon
    } else {
        &snapshot.high_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opac_tui::board::BoardState;
    use opac_tui::models::NewTask;
    use opac_tui::view::{kanban_view, StatusFilter};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: TaskId, status: TaskStatus) -> Task {
        NewTask {
            title: format!("Task {id}"),
            status,
            project_id: Some(1),
            ..NewTask::default()
        }
        .into_task(id)
    }

    fn project(id: ProjectId, name: &str) -> Project {
        opac_tui::models::NewProject {
            name: name.to_string(),
            ..Default::default()
        }
        .into_project(id)
    }

    fn kanban_app(tasks: &[Task]) -> App {
        let mut app = App::new(Tab::Kanban);
        let config = ViewConfig::default();
        app.handle_event(BoardEvent::Snapshot(BoardSnapshot::Kanban(KanbanSnapshot {
            state: BoardState::Ready,
            scope: None,
            project: None,
            view: kanban_view(tasks, &config),
            config,
        })));
        app
    }

    fn task_form(session: EditSession, draft: TaskDraft) -> BoardEvent {
        BoardEvent::FormOpened(EditorForm::Task {
            board: BoardId::Kanban,
            session,
            draft,
        })
    }

    #[test]
    fn test_tab_switch_refreshes_board() {
        let mut app = App::default();
        let command = app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.active_tab, Tab::Projects);
        assert!(matches!(command, Some(BoardCommand::Refresh(BoardId::Projects))));
        assert!(app.is_board_loading(BoardId::Projects));
    }

    #[test]
    fn test_snapshot_clears_loading() {
        let mut app = kanban_app(&[]);
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.is_loading());
        for &board in BoardId::all() {
            let snapshot = match board {
                BoardId::Kanban => BoardSnapshot::Kanban(KanbanSnapshot {
                    state: BoardState::Ready,
                    scope: None,
                    project: None,
                    view: Default::default(),
                    config: Default::default(),
                }),
                BoardId::Projects => BoardSnapshot::Projects(ProjectsSnapshot {
                    state: BoardState::Ready,
                    projects: Vec::new(),
                }),
                BoardId::Dashboard => BoardSnapshot::Dashboard(DashboardSnapshot {
                    state: BoardState::Ready,
                    due_soon: Vec::new(),
                    high_priority: Vec::new(),
                    projects: Vec::new(),
                }),
                BoardId::Timeline => BoardSnapshot::Timeline(TimelineSnapshot {
                    state: BoardState::Ready,
                    buckets: Vec::new(),
                    stats: Default::default(),
                    config: Default::default(),
                    projects: Vec::new(),
                }),
            };
            app.handle_event(BoardEvent::Snapshot(snapshot));
        }
        assert!(!app.is_loading());
    }

    #[test]
    fn test_kanban_move_card_right() {
        let mut app = kanban_app(&[task(1, TaskStatus::Todo)]);
        let command = app.handle_key(key(KeyCode::Char('L')));
        assert!(matches!(
            command,
            Some(BoardCommand::Drop(1, TaskStatus::InProgress))
        ));
        assert_eq!(app.selection.kanban_column, TaskStatus::InProgress);
    }

    #[test]
    fn test_kanban_move_past_last_column_is_ignored() {
        let mut app = kanban_app(&[task(1, TaskStatus::Done)]);
        app.selection.kanban_column = TaskStatus::Done;
        assert!(app.handle_key(key(KeyCode::Char('L'))).is_none());
    }

    #[test]
    fn test_kanban_column_navigation() {
        let mut app = kanban_app(&[task(1, TaskStatus::Todo), task(2, TaskStatus::InProgress)]);
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.selected_task().map(|t| t.id), Some(2));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.selection.kanban_column, TaskStatus::Todo);
    }

    #[test]
    fn test_kanban_filter_key_sends_config() {
        let mut app = kanban_app(&[]);
        match app.handle_key(key(KeyCode::Char('f'))) {
            Some(BoardCommand::SetKanbanConfig(config)) => {
                assert_eq!(config.status, StatusFilter::Active)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_form_is_not_submitted() {
        let mut app = kanban_app(&[]);
        app.handle_event(task_form(EditSession::Create, TaskDraft::blank(Some(1))));
        assert_eq!(app.input_mode, InputMode::Editing);

        let form = app.form_state.as_mut().unwrap();
        form.focused_field = form
            .fields
            .iter()
            .position(|f| *f == FormField::SubmitButton)
            .unwrap();
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(
            app.form_state.as_ref().unwrap().error.as_deref(),
            Some("Title is required")
        );
    }

    #[test]
    fn test_submit_waits_for_form_closed() {
        let mut app = kanban_app(&[]);
        app.handle_event(task_form(EditSession::Create, TaskDraft::blank(Some(1))));
        for c in "Ship".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let form = app.form_state.as_mut().unwrap();
        form.focused_field = form
            .fields
            .iter()
            .position(|f| *f == FormField::SubmitButton)
            .unwrap();

        match app.handle_key(key(KeyCode::Enter)) {
            Some(BoardCommand::Submit(BoardId::Kanban, draft)) => assert_eq!(draft.title, "Ship"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(app.form_state.as_ref().unwrap().submitting);

        app.handle_event(BoardEvent::FormClosed(BoardId::Dashboard));
        assert!(app.form_state.is_some());
        app.handle_event(BoardEvent::FormClosed(BoardId::Kanban));
        assert!(app.form_state.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_escape_cancels_form() {
        let mut app = kanban_app(&[]);
        app.handle_event(task_form(EditSession::Create, TaskDraft::blank(Some(1))));
        let command = app.handle_key(key(KeyCode::Esc));
        assert!(matches!(command, Some(BoardCommand::Cancel(BoardId::Kanban))));
        assert!(app.form_state.is_none());
    }

    #[test]
    fn test_deadline_picker() {
        let mut app = kanban_app(&[]);
        app.handle_event(task_form(EditSession::Create, TaskDraft::blank(Some(1))));
        let form = app.form_state.as_mut().unwrap();
        form.focused_field = form
            .fields
            .iter()
            .position(|f| *f == FormField::Deadline)
            .unwrap();

        let today = date(2025, 3, 10);
        app.handle_editing_key(key(KeyCode::Up), today);
        app.handle_editing_key(key(KeyCode::Right), today);
        app.handle_editing_key(key(KeyCode::Down), today);
        let deadline = match &app.form_state.as_ref().unwrap().draft {
            FormDraft::Task(draft) => draft.deadline,
            _ => None,
        };
        assert_eq!(deadline, Some(date(2025, 3, 16)));

        app.handle_editing_key(key(KeyCode::Backspace), today);
        let cleared = match &app.form_state.as_ref().unwrap().draft {
            FormDraft::Task(draft) => draft.deadline,
            _ => Some(today),
        };
        assert_eq!(cleared, None);
    }

    #[test]
    fn test_project_selector_cycles_known_projects() {
        let mut form = FormState::from_editor(EditorForm::Task {
            board: BoardId::Timeline,
            session: EditSession::Create,
            draft: TaskDraft::blank(None),
        });
        form.focused_field = 2;
        assert_eq!(form.current_field(), FormField::Project);

        let projects = [project(4, "Alpha"), project(9, "Beta")];
        form.cycle_selector(true, &projects);
        form.cycle_selector(true, &projects);
        form.cycle_selector(true, &projects);
        match form.draft {
            FormDraft::Task(draft) => assert_eq!(draft.project_id, Some(4)),
            _ => unreachable!(),
        }
    }

    fn focus(app: &mut App, field: FormField) {
        let form = app.form_state.as_mut().unwrap();
        form.focused_field = form.fields.iter().position(|f| *f == field).unwrap();
    }

    #[test]
    fn test_custom_period_form_sets_timeline_range() {
        let mut app = App::new(Tab::Timeline);
        assert!(app.handle_key(key(KeyCode::Char('C'))).is_none());
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.form_state.as_ref().unwrap().is_local());

        let today = date(2025, 3, 10);
        let base = TimelineConfig {
            status: StatusFilter::Active,
            ..TimelineConfig::default()
        };
        app.form_state = Some(FormState::custom_period(base, today));
        match &app.form_state.as_ref().unwrap().draft {
            FormDraft::Period { start, end, .. } => {
                assert_eq!(*start, Some(date(2025, 3, 1)));
                assert_eq!(*end, Some(date(2025, 3, 31)));
            }
            other => panic!("unexpected draft {other:?}"),
        }

        focus(&mut app, FormField::From);
        app.handle_editing_key(key(KeyCode::Right), today);
        focus(&mut app, FormField::To);
        app.handle_editing_key(key(KeyCode::Backspace), today);

        // Board snapshots do not close a form the worker never opened
        app.handle_event(BoardEvent::FormClosed(BoardId::Timeline));
        assert!(app.form_state.is_some());

        focus(&mut app, FormField::SubmitButton);
        match app.handle_editing_key(key(KeyCode::Enter), today) {
            Some(BoardCommand::SetTimelineConfig(config)) => {
                assert_eq!(
                    config.period,
                    Period::Custom {
                        start: Some(date(2025, 3, 8)),
                        end: None,
                    }
                );
                assert_eq!(config.status, StatusFilter::Active);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(app.form_state.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_custom_period_rejects_reversed_range() {
        let mut app = App::new(Tab::Timeline);
        let config = TimelineConfig {
            period: Period::Custom {
                start: Some(date(2025, 5, 1)),
                end: Some(date(2025, 4, 1)),
            },
            ..TimelineConfig::default()
        };
        app.form_state = Some(FormState::custom_period(config, date(2025, 5, 1)));
        app.input_mode = InputMode::Editing;

        focus(&mut app, FormField::SubmitButton);
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(
            app.form_state.as_ref().unwrap().error.as_deref(),
            Some("Start must not be after end")
        );

        // Nothing to cancel on the worker side
        assert!(app.handle_key(key(KeyCode::Esc)).is_none());
        assert!(app.form_state.is_none());
    }

    #[test]
    fn test_period_key_reaches_custom() {
        let mut app = App::new(Tab::Timeline);
        let mut period = Period::default();
        for _ in 0..2 {
            match app.handle_key(key(KeyCode::Char('v'))) {
                Some(BoardCommand::SetTimelineConfig(config)) => period = config.period,
                other => panic!("unexpected command {other:?}"),
            }
            app.handle_event(BoardEvent::Snapshot(BoardSnapshot::Timeline(TimelineSnapshot {
                state: BoardState::Ready,
                buckets: Vec::new(),
                stats: Default::default(),
                config: TimelineConfig {
                    period,
                    ..TimelineConfig::default()
                },
                projects: Vec::new(),
            })));
        }
        assert_eq!(period, Period::Custom { start: None, end: None });
    }

    #[test]
    fn test_delete_task_from_form() {
        let mut app = kanban_app(&[task(3, TaskStatus::Todo)]);
        let draft = TaskDraft::from_task(&task(3, TaskStatus::Todo));
        app.handle_event(task_form(EditSession::Edit(3), draft));
        let form = app.form_state.as_mut().unwrap();
        form.focused_field = form.fields.len() - 1;
        assert_eq!(form.current_field(), FormField::DeleteButton);

        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.input_mode, InputMode::Confirming);

        let command = app.handle_key(key(KeyCode::Char('y')));
        assert!(matches!(command, Some(BoardCommand::Delete(BoardId::Kanban))));
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.form_state.as_ref().unwrap().submitting);
    }

    #[test]
    fn test_project_delete_confirmation() {
        let mut app = App::new(Tab::Projects);
        app.handle_event(BoardEvent::Snapshot(BoardSnapshot::Projects(ProjectsSnapshot {
            state: BoardState::Ready,
            projects: vec![opac_tui::models::ProjectView::new(project(5, "Alpha"))],
        })));

        assert!(app.handle_key(key(KeyCode::Char('d'))).is_none());
        assert_eq!(app.input_mode, InputMode::Confirming);
        // "No" is focused first
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(app.confirm_dialog.is_none());

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Left));
        let command = app.handle_key(key(KeyCode::Enter));
        assert!(matches!(command, Some(BoardCommand::DeleteProject(5))));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_enter_on_project_opens_kanban() {
        let mut app = App::new(Tab::Projects);
        app.handle_event(BoardEvent::Snapshot(BoardSnapshot::Projects(ProjectsSnapshot {
            state: BoardState::Ready,
            projects: vec![opac_tui::models::ProjectView::new(project(5, "Alpha"))],
        })));
        let command = app.handle_key(key(KeyCode::Enter));
        assert!(matches!(command, Some(BoardCommand::OpenProject(Some(5)))));
        assert_eq!(app.active_tab, Tab::Kanban);
        assert_eq!(app.project_name(Some(5)), "Alpha");
    }

    #[test]
    fn test_error_notification_shows_popup() {
        let mut app = App::default();
        app.handle_event(BoardEvent::Notify(Notification::error("Failed to load tasks")));
        assert!(app.error_popup.is_some());
        assert_eq!(
            app.logs.last().map(|l| l.message.as_str()),
            Some("Failed to load tasks")
        );

        // popup swallows the next key
        assert!(app.handle_key(key(KeyCode::Char('q'))).is_none());
        assert!(app.error_popup.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_step_wraps() {
        assert_eq!(step(&[1, 2, 3], &3, true), 1);
        assert_eq!(step(&[1, 2, 3], &1, false), 3);
        assert_eq!(step(&[1, 2, 3], &7, true), 1);
    }
}
