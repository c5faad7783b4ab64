//! Timeline board: tasks grouped by week or month of a chosen date.

use chrono::NaiveDate;

use super::{BoardCore, BoardState, EditSession, Notification};
use crate::models::{Project, ProjectId, Task, TaskDraft, TaskId};
use crate::sync::Synchronizer;
use crate::view::{ProjectFilter, TimelineBucket, TimelineConfig, TimelineStats};

#[derive(Debug)]
pub struct TimelineBoard {
    core: BoardCore,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    config: TimelineConfig,
}

impl TimelineBoard {
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            core: BoardCore::new("timeline", sync),
            projects: Vec::new(),
            tasks: Vec::new(),
            config: TimelineConfig::default(),
        }
    }

    pub fn state(&self) -> BoardState {
        self.core.state()
    }

    pub fn session(&self) -> Option<EditSession> {
        self.core.session()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn project_name(&self, id: ProjectId) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.display_name())
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TimelineConfig) {
        self.config = config;
    }

    pub fn buckets(&self, today: NaiveDate) -> Vec<TimelineBucket> {
        self.config.buckets(&self.tasks, today)
    }

    /// Counters over the filtered tasks
    pub fn stats(&self, today: NaiveDate) -> TimelineStats {
        TimelineStats::from_tasks(&self.config.filter(&self.tasks, today), today)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.core.take_notifications()
    }

    pub async fn load(&mut self) {
        self.core.begin_load();
        let api = self.core.sync().api().clone();

        match api.list_projects().await {
            Ok(projects) => self.projects = projects,
            Err(e) => {
                self.projects.clear();
                self.core
                    .notify(Notification::error(format!("Failed to load projects: {e}")));
            }
        }
        match api.list_tasks().await {
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

    pub fn open_create(&mut self) -> TaskDraft {
        let project = match self.config.project {
            ProjectFilter::Only(id) => Some(id),
            ProjectFilter::All => self.projects.first().map(|p| p.id),
        };
        self.core.open_create(project)
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    pub async fn submit(&mut self, draft: &TaskDraft) {
        if self.core.submit(&self.tasks, draft).await {
            self.load().await;
        }
    }

    pub async fn delete_editing(&mut self) {
        if self.core.delete_editing().await {
            self.load().await;
        }
    }
}
