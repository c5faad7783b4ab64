//! Kanban board: every task, or the tasks of one project, in three columns.

use super::{BoardCore, BoardState, EditSession, Notification};
use crate::models::{Project, ProjectId, Task, TaskDraft, TaskId, TaskStatus};
use crate::sync::Synchronizer;
use crate::view::{kanban_view, KanbanView, ViewConfig};

#[derive(Debug)]
pub struct KanbanBoard {
    core: BoardCore,
    scope: Option<ProjectId>,
    project: Option<Project>,
    tasks: Vec<Task>,
    config: ViewConfig,
}

impl KanbanBoard {
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            core: BoardCore::new("kanban", sync),
            scope: None,
            project: None,
            tasks: Vec::new(),
            config: ViewConfig::default(),
        }
    }

    /// Board showing only the tasks of `project_id`
    pub fn scoped(sync: Synchronizer, project_id: ProjectId) -> Self {
        let mut board = Self::new(sync);
        board.scope = Some(project_id);
        board
    }

    pub fn scope(&self) -> Option<ProjectId> {
        self.scope
    }

    /// Change the scope. Takes effect on the next load.
    pub fn set_scope(&mut self, scope: Option<ProjectId>) {
        self.scope = scope;
        self.project = None;
    }

    pub fn state(&self) -> BoardState {
        self.core.state()
    }

    pub fn session(&self) -> Option<EditSession> {
        self.core.session()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
    }

    pub fn view(&self) -> KanbanView {
        kanban_view(&self.tasks, &self.config)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.core.take_notifications()
    }

    /// Fetch the scoped project (if any) and the tasks
    pub async fn load(&mut self) {
        self.core.begin_load();
        let api = self.core.sync().api().clone();

        let tasks = match self.scope {
            Some(project_id) => {
                match api.get_project(project_id).await {
                    Ok(project) => self.project = Some(project),
                    Err(e) => {
                        self.project = None;
                        self.core
                            .notify(Notification::error(format!("Failed to load project: {e}")));
                    }
                }
                api.list_project_tasks(project_id).await
            }
            None => api.list_tasks().await,
        };

        match tasks {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => {
                self.tasks.clear();
                self.core
                    .notify(Notification::error(format!("Failed to load tasks: {e}")));
            }
        }
        self.core.end_load();
    }

    pub fn open_card(&mut self, id: TaskId) -> Option<TaskDraft> {
        self.core.open_card(&self.tasks, id)
    }

    /// Blank form, pre-assigned to the scoped project
    pub fn open_create(&mut self) -> TaskDraft {
        self.core.open_create(self.scope)
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    pub async fn submit(&mut self, draft: &TaskDraft) {
        if self.core.submit(&self.tasks, draft).await {
            self.load().await;
        }
    }

    /// Drag-and-drop stand-in
    pub async fn drop_task(&mut self, id: TaskId, status: TaskStatus) {
        if self.core.drop_task(&self.tasks, id, status).await {
            self.load().await;
        }
    }

    pub async fn delete_editing(&mut self) {
        if self.core.delete_editing().await {
            self.load().await;
        }
    }
}
