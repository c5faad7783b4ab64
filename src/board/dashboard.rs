//! Dashboard: the tasks due soon and the unfinished high-priority tasks.

use super::{BoardCore, BoardState, EditSession, Notification};
use crate::error::ApiResult;
use crate::models::{Project, Task, TaskDraft, TaskId};
use crate::sync::Synchronizer;

#[derive(Debug)]
pub struct DashboardBoard {
    core: BoardCore,
    due_soon: Vec<Task>,
    high_priority: Vec<Task>,
    projects: Vec<Project>,
}

/// The backend answers 404 instead of an empty list on the dashboard subsets
fn empty_on_not_found(result: ApiResult<Vec<Task>>) -> ApiResult<Vec<Task>> {
    match result {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

impl DashboardBoard {
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            core: BoardCore::new("dashboard", sync),
            due_soon: Vec::new(),
            high_priority: Vec::new(),
            projects: Vec::new(),
        }
    }

    pub fn state(&self) -> BoardState {
        self.core.state()
    }

    pub fn session(&self) -> Option<EditSession> {
        self.core.session()
    }

    pub fn due_soon(&self) -> &[Task] {
        &self.due_soon
    }

    pub fn high_priority(&self) -> &[Task] {
        &self.high_priority
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.core.take_notifications()
    }

    /// Every card shown, without duplicates
    fn cards(&self) -> Vec<Task> {
        let mut cards = self.due_soon.clone();
        for task in &self.high_priority {
            if !cards.iter().any(|t| t.id == task.id) {
                cards.push(task.clone());
            }
        }
        cards
    }

    pub async fn load(&mut self) {
        self.core.begin_load();
        let api = self.core.sync().api().clone();

        match empty_on_not_found(api.due_soon_tasks().await) {
            Ok(tasks) => self.due_soon = tasks,
            Err(e) => {
                self.due_soon.clear();
                self.core
                    .notify(Notification::error(format!("Failed to load due tasks: {e}")));
            }
        }
        match empty_on_not_found(api.high_priority_tasks().await) {
            Ok(tasks) => self.high_priority = tasks,
            Err(e) => {
                self.high_priority.clear();
                self.core.notify(Notification::error(format!(
                    "Failed to load high priority tasks: {e}"
                )));
            }
        }
        match api.list_projects().await {
            Ok(projects) => self.projects = projects,
            Err(e) => {
                self.projects.clear();
                self.core
                    .notify(Notification::error(format!("Failed to load projects: {e}")));
            }
        }
        self.core.end_load();
    }

    pub fn open_card(&mut self, id: TaskId) -> Option<TaskDraft> {
        let cards = self.cards();
        self.core.open_card(&cards, id)
    }

    pub fn open_create(&mut self) -> TaskDraft {
        let project = self.projects.first().map(|p| p.id);
        self.core.open_create(project)
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    pub async fn submit(&mut self, draft: &TaskDraft) {
        let cards = self.cards();
        if self.core.submit(&cards, draft).await {
            self.load().await;
        }
    }

    pub async fn delete_editing(&mut self) {
        if self.core.delete_editing().await {
            self.load().await;
        }
    }
}
