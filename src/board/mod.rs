//! Board controllers.
//!
//! Each board owns a plain in-memory list reloaded in full from the backend
//! after every mutation, a small state machine, and a queue of user-facing
//! notifications. Card editing (open, submit, drop, delete) behaves the same
//! on every task board and lives in [`BoardCore`].

mod dashboard;
mod kanban;
mod projects;
mod timeline;

pub use dashboard::DashboardBoard;
pub use kanban::KanbanBoard;
pub use projects::ProjectsBoard;
pub use timeline::TimelineBoard;

use tracing::{debug, error, info, warn};

use crate::models::{ProjectId, Task, TaskDraft, TaskId, TaskStatus};
use crate::sync::Synchronizer;

/// Board lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// A form is open
    Editing,
    /// A form was submitted and its calls are running
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient on-screen notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// What the open form is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSession {
    Create,
    Edit(i64),
}

/// State, notifications and the shared task-card operations of a board
#[derive(Debug)]
pub struct BoardCore {
    name: &'static str,
    sync: Synchronizer,
    state: BoardState,
    session: Option<EditSession>,
    notifications: Vec<Notification>,
}

impl BoardCore {
    pub fn new(name: &'static str, sync: Synchronizer) -> Self {
        Self {
            name,
            sync,
            state: BoardState::Idle,
            session: None,
            notifications: Vec::new(),
        }
    }

    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn session(&self) -> Option<EditSession> {
        self.session
    }

    pub(crate) fn set_state(&mut self, state: BoardState) {
        if self.state != state {
            debug!(board = self.name, from = ?self.state, to = ?state, "board state");
            self.state = state;
        }
    }

    pub(crate) fn begin_editing(&mut self, session: EditSession) {
        self.session = Some(session);
        self.set_state(BoardState::Editing);
    }

    /// Close the form and return to `Ready`
    pub(crate) fn finish(&mut self) {
        self.session = None;
        self.set_state(BoardState::Ready);
    }

    /// Queue a notification and mirror it to the log
    pub fn notify(&mut self, notification: Notification) {
        let board = self.name;
        let message = notification.message.as_str();
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => info!(board, "{}", message),
            NotificationLevel::Warning => warn!(board, "{}", message),
            NotificationLevel::Error => error!(board, "{}", message),
        }
        self.notifications.push(notification);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn begin_load(&mut self) {
        self.set_state(BoardState::Loading);
    }

    /// End of a load. An open form stays open.
    pub(crate) fn end_load(&mut self) {
        if self.session.is_some() {
            self.set_state(BoardState::Editing);
        } else {
            self.set_state(BoardState::Ready);
        }
    }

    // ============================================
    // Task cards
    // ============================================

    /// Open an existing card. Unknown ids leave the board untouched.
    pub fn open_card(&mut self, tasks: &[Task], id: TaskId) -> Option<TaskDraft> {
        let task = tasks.iter().find(|t| t.id == id)?;
        self.begin_editing(EditSession::Edit(id));
        Some(TaskDraft::from_task(task))
    }

    pub fn open_create(&mut self, project_id: Option<ProjectId>) -> TaskDraft {
        self.begin_editing(EditSession::Create);
        TaskDraft::blank(project_id)
    }

    pub fn cancel(&mut self) {
        if self.state == BoardState::Editing {
            self.finish();
        }
    }

    /// Submit the open form. Returns true when the board must reload.
    pub async fn submit(&mut self, tasks: &[Task], draft: &TaskDraft) -> bool {
        let Some(session) = self.session.filter(|_| self.state == BoardState::Editing) else {
            self.notify(Notification::warning("No task form is open"));
            return false;
        };
        if let Err(reason) = draft.validate() {
            self.notify(Notification::warning(reason));
            return false;
        }

        self.set_state(BoardState::Submitting);
        match session {
            EditSession::Create => match self.sync.create_task(draft.to_new_task()).await {
                Ok(task) => self.notify(Notification::success(format!(
                    "Task \"{}\" created",
                    task.display_title()
                ))),
                Err(e) => self.notify(Notification::error(format!("Failed to create task: {e}"))),
            },
            EditSession::Edit(id) => match tasks.iter().find(|t| t.id == id) {
                Some(existing) => {
                    let edited = existing.with_draft(draft);
                    self.sync_edit(existing, &edited).await;
                }
                None => self.notify(Notification::error(format!("Task {id} no longer exists"))),
            },
        }
        self.finish();
        true
    }

    async fn sync_edit(&mut self, existing: &Task, edited: &Task) {
        match self.sync.sync_task(existing, edited).await {
            Ok(report) if report.is_noop() => self.notify(Notification::info("No changes to save")),
            Ok(report) if report.all_succeeded() => {
                self.notify(Notification::success("Task updated"))
            }
            Ok(report) => {
                let failures: Vec<String> = report
                    .failures()
                    .map(|(field, e)| format!("Failed to update {field}: {e}"))
                    .collect();
                for message in failures {
                    self.notify(Notification::error(message));
                }
            }
            Err(e) => self.notify(Notification::error(e.to_string())),
        }
    }

    /// Move a card to another column. Returns true when the board must reload.
    pub async fn drop_task(&mut self, tasks: &[Task], id: TaskId, status: TaskStatus) -> bool {
        let Some(task) = tasks.iter().find(|t| t.id == id) else {
            return false;
        };
        if task.status == status {
            return false;
        }
        match self.sync.move_task(task, status).await {
            Ok(report) if report.all_succeeded() => self.notify(Notification::success(format!(
                "\"{}\" moved to {}",
                task.display_title(),
                status
            ))),
            Ok(report) => {
                let failures: Vec<String> = report
                    .failures()
                    .map(|(_, e)| format!("Failed to move task: {e}"))
                    .collect();
                for message in failures {
                    self.notify(Notification::error(message));
                }
            }
            Err(e) => self.notify(Notification::error(e.to_string())),
        }
        true
    }

    /// Delete the card whose form is open. Returns true when the board must reload.
    pub async fn delete_editing(&mut self) -> bool {
        let Some(EditSession::Edit(id)) = self.session.filter(|_| self.state == BoardState::Editing)
        else {
            self.cancel();
            return false;
        };
        self.set_state(BoardState::Submitting);
        match self.sync.delete_task(id).await {
            Ok(()) => self.notify(Notification::success("Task deleted")),
            Err(e) => self.notify(Notification::error(format!("Failed to delete task: {e}"))),
        }
        self.finish();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClient;
    use crate::models::NewTask;
    use crate::transport::MemoryTransport;

    fn core() -> BoardCore {
        let backend = Arc::new(MemoryTransport::new());
        BoardCore::new("test", Synchronizer::new(ApiClient::new(backend)))
    }

    fn task(id: TaskId) -> Task {
        NewTask {
            title: "Task".to_string(),
            project_id: Some(1),
            ..NewTask::default()
        }
        .into_task(id)
    }

    #[test]
    fn test_unknown_card_leaves_board_untouched() {
        let mut core = core();
        core.end_load();

        assert_eq!(core.open_card(&[task(1)], 7), None);
        assert_eq!(core.state(), BoardState::Ready);
        assert_eq!(core.session(), None);
    }

    #[test]
    fn test_reload_keeps_open_form() {
        let mut core = core();
        core.open_card(&[task(1)], 1);

        core.begin_load();
        core.end_load();

        assert_eq!(core.state(), BoardState::Editing);
        assert_eq!(core.session(), Some(EditSession::Edit(1)));
        core.cancel();
        assert_eq!(core.state(), BoardState::Ready);
    }

    #[tokio::test]
    async fn test_submit_without_form_warns() {
        let mut core = core();

        let reload = core.submit(&[], &TaskDraft::blank(Some(1))).await;

        assert!(!reload);
        assert_eq!(
            core.take_notifications(),
            vec![Notification::warning("No task form is open")]
        );
    }

    #[tokio::test]
    async fn test_delete_on_create_form_just_closes() {
        let mut core = core();
        core.open_create(None);

        assert!(!core.delete_editing().await);
        assert_eq!(core.state(), BoardState::Ready);
        assert!(core.take_notifications().is_empty());
    }
}
