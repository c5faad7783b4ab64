//! Board worker.
//!
//! The TUI never talks to the network. It sends [`BoardCommand`]s to a
//! worker task that owns every board and handles one command at a time, so
//! two user actions never interleave. After each command the worker sends
//! back notifications and a fresh [`BoardSnapshot`] of the affected board.

use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::board::{
    BoardState, DashboardBoard, EditSession, KanbanBoard, Notification, ProjectsBoard,
    TimelineBoard,
};
use crate::models::{
    Project, ProjectDraft, ProjectId, ProjectView, Task, TaskDraft, TaskId, TaskStatus,
};
use crate::sync::Synchronizer;
use crate::view::{KanbanView, TimelineBucket, TimelineConfig, TimelineStats, ViewConfig};

/// Identifies a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardId {
    Dashboard,
    Projects,
    Kanban,
    Timeline,
}

impl BoardId {
    pub fn all() -> &'static [BoardId] {
        &[
            BoardId::Dashboard,
            BoardId::Projects,
            BoardId::Kanban,
            BoardId::Timeline,
        ]
    }
}

/// Commands sent from the TUI to the board worker
#[derive(Debug, Clone)]
pub enum BoardCommand {
    /// Reload one board
    Refresh(BoardId),
    /// Check the connection and reload every board
    RefreshAll,
    /// Open the form of an existing task card
    OpenCard(BoardId, TaskId),
    /// Open a blank form (task form, or project form on the projects board)
    OpenCreate(BoardId),
    /// Submit the open task form
    Submit(BoardId, TaskDraft),
    /// Move a kanban card to another column
    Drop(TaskId, TaskStatus),
    /// Delete the task whose form is open
    Delete(BoardId),
    /// Close the open form without saving
    Cancel(BoardId),
    SetKanbanConfig(ViewConfig),
    SetTimelineConfig(TimelineConfig),
    /// Scope the kanban board to a project (`None` shows every task)
    OpenProject(Option<ProjectId>),
    /// Open the form of an existing project
    EditProject(ProjectId),
    /// Submit the open project form
    SaveProject(ProjectDraft),
    /// Delete a project and its tasks
    DeleteProject(ProjectId),
    CheckConnection,
    Shutdown,
}

/// Contents of a form the worker opened
#[derive(Debug, Clone, PartialEq)]
pub enum EditorForm {
    Task {
        board: BoardId,
        session: EditSession,
        draft: TaskDraft,
    },
    Project {
        session: EditSession,
        draft: ProjectDraft,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub state: BoardState,
    pub due_soon: Vec<Task>,
    pub high_priority: Vec<Task>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectsSnapshot {
    pub state: BoardState,
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KanbanSnapshot {
    pub state: BoardState,
    pub scope: Option<ProjectId>,
    pub project: Option<Project>,
    pub view: KanbanView,
    pub config: ViewConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSnapshot {
    pub state: BoardState,
    pub buckets: Vec<TimelineBucket>,
    pub stats: TimelineStats,
    pub config: TimelineConfig,
    pub projects: Vec<Project>,
}

/// Immutable copy of a board's view-model
#[derive(Debug, Clone, PartialEq)]
pub enum BoardSnapshot {
    Dashboard(DashboardSnapshot),
    Projects(ProjectsSnapshot),
    Kanban(KanbanSnapshot),
    Timeline(TimelineSnapshot),
}

/// Messages sent from the board worker to the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Snapshot(BoardSnapshot),
    Notify(Notification),
    Connection(bool),
    FormOpened(EditorForm),
    /// The form of this board is no longer open
    FormClosed(BoardId),
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Every board, sharing one synchronizer
#[derive(Debug)]
pub struct Boards {
    sync: Synchronizer,
    pub dashboard: DashboardBoard,
    pub projects: ProjectsBoard,
    pub kanban: KanbanBoard,
    pub timeline: TimelineBoard,
}

impl Boards {
    pub fn new(sync: Synchronizer, scope: Option<ProjectId>) -> Self {
        let kanban = match scope {
            Some(project_id) => KanbanBoard::scoped(sync.clone(), project_id),
            None => KanbanBoard::new(sync.clone()),
        };
        Self {
            dashboard: DashboardBoard::new(sync.clone()),
            projects: ProjectsBoard::new(sync.clone()),
            kanban,
            timeline: TimelineBoard::new(sync.clone()),
            sync,
        }
    }

    pub async fn load(&mut self, board: BoardId) {
        match board {
            BoardId::Dashboard => self.dashboard.load().await,
            BoardId::Projects => self.projects.load().await,
            BoardId::Kanban => self.kanban.load().await,
            BoardId::Timeline => self.timeline.load().await,
        }
    }

    fn form_open(&self, board: BoardId) -> bool {
        let session = match board {
            BoardId::Dashboard => self.dashboard.session(),
            BoardId::Projects => self.projects.session(),
            BoardId::Kanban => self.kanban.session(),
            BoardId::Timeline => self.timeline.session(),
        };
        session.is_some()
    }

    pub fn snapshot_at(&self, board: BoardId, today: NaiveDate) -> BoardSnapshot {
        match board {
            BoardId::Dashboard => BoardSnapshot::Dashboard(DashboardSnapshot {
                state: self.dashboard.state(),
                due_soon: self.dashboard.due_soon().to_vec(),
                high_priority: self.dashboard.high_priority().to_vec(),
                projects: self.dashboard.projects().to_vec(),
            }),
            BoardId::Projects => BoardSnapshot::Projects(ProjectsSnapshot {
                state: self.projects.state(),
                projects: self.projects.projects().to_vec(),
            }),
            BoardId::Kanban => BoardSnapshot::Kanban(KanbanSnapshot {
                state: self.kanban.state(),
                scope: self.kanban.scope(),
                project: self.kanban.project().cloned(),
                view: self.kanban.view(),
                config: *self.kanban.config(),
            }),
            BoardId::Timeline => BoardSnapshot::Timeline(TimelineSnapshot {
                state: self.timeline.state(),
                buckets: self.timeline.buckets(today),
                stats: self.timeline.stats(today),
                config: *self.timeline.config(),
                projects: self.timeline.projects().to_vec(),
            }),
        }
    }

    fn take_notifications(&mut self) -> Vec<Notification> {
        let mut notifications = self.dashboard.take_notifications();
        notifications.extend(self.projects.take_notifications());
        notifications.extend(self.kanban.take_notifications());
        notifications.extend(self.timeline.take_notifications());
        notifications
    }

    fn open_card(&mut self, board: BoardId, id: TaskId) -> Option<TaskDraft> {
        match board {
            BoardId::Dashboard => self.dashboard.open_card(id),
            BoardId::Kanban => self.kanban.open_card(id),
            BoardId::Timeline => self.timeline.open_card(id),
            BoardId::Projects => None,
        }
    }

    async fn submit(&mut self, board: BoardId, draft: &TaskDraft) {
        match board {
            BoardId::Dashboard => self.dashboard.submit(draft).await,
            BoardId::Kanban => self.kanban.submit(draft).await,
            BoardId::Timeline => self.timeline.submit(draft).await,
            BoardId::Projects => {}
        }
    }

    async fn delete(&mut self, board: BoardId) {
        match board {
            BoardId::Dashboard => self.dashboard.delete_editing().await,
            BoardId::Kanban => self.kanban.delete_editing().await,
            BoardId::Timeline => self.timeline.delete_editing().await,
            BoardId::Projects => self.projects.cancel(),
        }
    }

    fn cancel(&mut self, board: BoardId) {
        match board {
            BoardId::Dashboard => self.dashboard.cancel(),
            BoardId::Projects => self.projects.cancel(),
            BoardId::Kanban => self.kanban.cancel(),
            BoardId::Timeline => self.timeline.cancel(),
        }
    }

    /// Handle one command to completion and return the events it produced
    pub async fn handle(&mut self, command: BoardCommand) -> Vec<BoardEvent> {
        self.handle_at(command, today()).await
    }

    pub async fn handle_at(&mut self, command: BoardCommand, today: NaiveDate) -> Vec<BoardEvent> {
        debug!(?command, "board command");
        let mut events = Vec::new();
        let mut touched: Vec<BoardId> = Vec::new();

        match command {
            BoardCommand::Refresh(board) => {
                self.load(board).await;
                touched.push(board);
            }
            BoardCommand::RefreshAll => {
                let connected = self.sync.api().health().await.is_ok();
                events.push(BoardEvent::Connection(connected));
                for &board in BoardId::all() {
                    self.load(board).await;
                    touched.push(board);
                }
            }
            BoardCommand::OpenCard(board, id) => {
                match self.open_card(board, id) {
                    Some(draft) => events.push(BoardEvent::FormOpened(EditorForm::Task {
                        board,
                        session: EditSession::Edit(id),
                        draft,
                    })),
                    None => events.push(BoardEvent::Notify(Notification::warning(format!(
                        "Task {id} is not on this board"
                    )))),
                }
                touched.push(board);
            }
            BoardCommand::OpenCreate(board) => {
                let form = match board {
                    BoardId::Dashboard => task_form(board, self.dashboard.open_create()),
                    BoardId::Kanban => task_form(board, self.kanban.open_create()),
                    BoardId::Timeline => task_form(board, self.timeline.open_create()),
                    BoardId::Projects => EditorForm::Project {
                        session: EditSession::Create,
                        draft: self.projects.open_create(),
                    },
                };
                events.push(BoardEvent::FormOpened(form));
                touched.push(board);
            }
            BoardCommand::Submit(board, draft) => {
                self.submit(board, &draft).await;
                touched.push(board);
            }
            BoardCommand::Drop(id, status) => {
                self.kanban.drop_task(id, status).await;
                touched.push(BoardId::Kanban);
            }
            BoardCommand::Delete(board) => {
                self.delete(board).await;
                touched.push(board);
            }
            BoardCommand::Cancel(board) => {
                self.cancel(board);
                touched.push(board);
            }
            BoardCommand::SetKanbanConfig(config) => {
                self.kanban.set_config(config);
                touched.push(BoardId::Kanban);
            }
            BoardCommand::SetTimelineConfig(config) => {
                self.timeline.set_config(config);
                touched.push(BoardId::Timeline);
            }
            BoardCommand::OpenProject(scope) => {
                self.kanban.set_scope(scope);
                self.kanban.load().await;
                touched.push(BoardId::Kanban);
            }
            BoardCommand::EditProject(id) => {
                match self.projects.open_edit(id) {
                    Some(draft) => events.push(BoardEvent::FormOpened(EditorForm::Project {
                        session: EditSession::Edit(id),
                        draft,
                    })),
                    None => events.push(BoardEvent::Notify(Notification::warning(format!(
                        "Project {id} is not loaded"
                    )))),
                }
                touched.push(BoardId::Projects);
            }
            BoardCommand::SaveProject(draft) => {
                self.projects.submit(&draft).await;
                touched.push(BoardId::Projects);
            }
            BoardCommand::DeleteProject(id) => {
                let removed = self.projects.delete(id).await;
                touched.push(BoardId::Projects);
                if removed && self.kanban.scope() == Some(id) {
                    self.kanban.set_scope(None);
                    self.kanban.load().await;
                    touched.push(BoardId::Kanban);
                }
            }
            BoardCommand::CheckConnection => {
                let connected = self.sync.api().health().await.is_ok();
                events.push(BoardEvent::Connection(connected));
            }
            BoardCommand::Shutdown => {}
        }

        events.extend(self.take_notifications().into_iter().map(BoardEvent::Notify));
        for board in touched {
            if !self.form_open(board) {
                events.push(BoardEvent::FormClosed(board));
            }
            events.push(BoardEvent::Snapshot(self.snapshot_at(board, today)));
        }
        events
    }
}

fn task_form(board: BoardId, draft: TaskDraft) -> EditorForm {
    EditorForm::Task {
        board,
        session: EditSession::Create,
        draft,
    }
}

/// Run the board worker task until `Shutdown` or until either channel closes
pub async fn run_board_worker(
    mut boards: Boards,
    tx: mpsc::Sender<BoardEvent>,
    mut rx: mpsc::Receiver<BoardCommand>,
) {
    while let Some(command) = rx.recv().await {
        if matches!(command, BoardCommand::Shutdown) {
            break;
        }
        for event in boards.handle(command).await {
            if tx.send(event).await.is_err() {
                return;
            }
        }
    }
    info!("board worker stopped");
}
