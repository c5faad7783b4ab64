//! Projects page: every project with its task statistics.

use tracing::warn;

use super::{BoardCore, BoardState, EditSession, Notification};
use crate::models::{Project, ProjectDraft, ProjectId, ProjectView};
use crate::sync::Synchronizer;

#[derive(Debug)]
pub struct ProjectsBoard {
    core: BoardCore,
    projects: Vec<ProjectView>,
}

impl ProjectsBoard {
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            core: BoardCore::new("projects", sync),
            projects: Vec::new(),
        }
    }

    pub fn state(&self) -> BoardState {
        self.core.state()
    }

    pub fn session(&self) -> Option<EditSession> {
        self.core.session()
    }

    pub fn projects(&self) -> &[ProjectView] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects
            .iter()
            .map(|v| &v.project)
            .find(|p| p.id == id)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.core.take_notifications()
    }

    /// Fetch the projects, then the statistics of each one
    pub async fn load(&mut self) {
        self.core.begin_load();
        let api = self.core.sync().api().clone();

        match api.list_projects().await {
            Ok(projects) => {
                let mut views: Vec<ProjectView> = projects.into_iter().map(ProjectView::new).collect();
                for view in &mut views {
                    if let Err(e) = view.load_stats(&api).await {
                        warn!(project_id = view.project.id, error = %e, "failed to load project stats");
                    }
                }
                self.projects = views;
            }
            Err(e) => {
                self.projects.clear();
                self.core
                    .notify(Notification::error(format!("Failed to load projects: {e}")));
            }
        }
        self.core.end_load();
    }

    pub fn open_edit(&mut self, id: ProjectId) -> Option<ProjectDraft> {
        let draft = ProjectDraft::from_project(self.project(id)?);
        self.core.begin_editing(EditSession::Edit(id));
        Some(draft)
    }

    pub fn open_create(&mut self) -> ProjectDraft {
        self.core.begin_editing(EditSession::Create);
        ProjectDraft::default()
    }

    pub fn cancel(&mut self) {
        self.core.cancel();
    }

    /// Create or field-diff the open project form, then reload
    pub async fn submit(&mut self, draft: &ProjectDraft) {
        let session = match self.core.session() {
            Some(session) if self.core.state() == BoardState::Editing => session,
            _ => {
                self.core
                    .notify(Notification::warning("No project form is open"));
                return;
            }
        };
        if let Err(reason) = draft.validate() {
            self.core.notify(Notification::warning(reason));
            return;
        }

        self.core.set_state(BoardState::Submitting);
        let sync = self.core.sync().clone();
        match session {
            EditSession::Create => match sync.create_project(draft.to_new_project()).await {
                Ok(project) => self.core.notify(Notification::success(format!(
                    "Project \"{}\" created",
                    project.display_name()
                ))),
                Err(e) => self
                    .core
                    .notify(Notification::error(format!("Failed to create project: {e}"))),
            },
            EditSession::Edit(id) => match self.project(id).cloned() {
                Some(existing) => {
                    let edited = existing.with_draft(draft);
                    match sync.sync(&existing, &edited).await {
                        Ok(report) if report.is_noop() => {
                            self.core.notify(Notification::info("No changes to save"))
                        }
                        Ok(report) if report.all_succeeded() => {
                            self.core.notify(Notification::success("Project updated"))
                        }
                        Ok(report) => {
                            for (field, e) in report.failures() {
                                self.core.notify(Notification::error(format!(
                                    "Failed to update {field}: {e}"
                                )));
                            }
                        }
                        Err(e) => self.core.notify(Notification::error(e.to_string())),
                    }
                }
                None => self.core.notify(Notification::error(format!(
                    "Project {id} no longer exists"
                ))),
            },
        }
        self.core.finish();
        self.load().await;
    }

    /// Delete a project and its tasks, reporting each call. Returns true
    /// only when the project itself was removed.
    pub async fn delete(&mut self, id: ProjectId) -> bool {
        if self.core.session().is_some() {
            self.core.notify(Notification::warning(
                "Close the project form before deleting a project",
            ));
            return false;
        }
        self.core.set_state(BoardState::Submitting);
        let sync = self.core.sync().clone();
        let removed = match sync.delete_project(id).await {
            Ok(deletion) if deletion.is_complete() => {
                self.core.notify(Notification::success("Project deleted"));
                true
            }
            Ok(deletion) => {
                if let Err(e) = &deletion.project {
                    self.core
                        .notify(Notification::error(format!("Failed to delete project: {e}")));
                }
                if let Err(e) = &deletion.tasks {
                    self.core.notify(Notification::error(format!(
                        "Failed to delete project tasks: {e}"
                    )));
                }
                deletion.project.is_ok()
            }
            Err(e) => {
                self.core.notify(Notification::error(e.to_string()));
                false
            }
        };
        self.core.finish();
        self.load().await;
        removed
    }
}
