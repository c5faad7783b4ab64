//! Field-level diff and sync.
//!
//! An edit is pushed to the backend as one PATCH per changed field, in a
//! fixed field order. A failing field never stops the remaining ones; the
//! caller gets a [`SyncReport`] listing every attempt. A per-entity
//! in-flight guard rejects a second operation on an entity whose previous
//! one has not settled yet.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::api::{ApiClient, FieldUpdate, ProjectUpdate, TaskUpdate};
use crate::error::{ApiError, ApiResult, EntityKind};
use crate::models::{NewProject, NewTask, Project, ProjectId, Task, TaskId, TaskStatus};

/// An entity that can be pushed to the backend field by field
pub trait Syncable: Send + Sync {
    type Field: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;
    type Update: FieldUpdate;

    const KIND: EntityKind;
    /// Mutable fields, in the order updates are sent
    const FIELDS: &'static [Self::Field];

    fn entity_id(&self) -> i64;

    /// The update that turns `self` into `edited` for `field`, if they differ
    fn diff(&self, edited: &Self, field: Self::Field) -> Option<Self::Update>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Project,
    Title,
    Description,
    Deadline,
    Priority,
    Status,
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskField::Project => write!(f, "project"),
            TaskField::Title => write!(f, "title"),
            TaskField::Description => write!(f, "description"),
            TaskField::Deadline => write!(f, "deadline"),
            TaskField::Priority => write!(f, "priority"),
            TaskField::Status => write!(f, "status"),
        }
    }
}

impl Syncable for Task {
    type Field = TaskField;
    type Update = TaskUpdate;

    const KIND: EntityKind = EntityKind::Task;
    // Status goes last: its success triggers the project progress bump
    const FIELDS: &'static [TaskField] = &[
        TaskField::Project,
        TaskField::Title,
        TaskField::Description,
        TaskField::Deadline,
        TaskField::Priority,
        TaskField::Status,
    ];

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn diff(&self, edited: &Self, field: TaskField) -> Option<TaskUpdate> {
        match field {
            TaskField::Project => (self.project_id != edited.project_id)
                .then_some(TaskUpdate::Project(edited.project_id)),
            TaskField::Title => {
                (self.title != edited.title).then(|| TaskUpdate::Title(edited.title.clone()))
            }
            TaskField::Description => (self.description != edited.description)
                .then(|| TaskUpdate::Description(edited.description.clone())),
            TaskField::Deadline => {
                (self.deadline != edited.deadline).then_some(TaskUpdate::Deadline(edited.deadline))
            }
            TaskField::Priority => {
                (self.priority != edited.priority).then_some(TaskUpdate::Priority(edited.priority))
            }
            TaskField::Status => {
                (self.status != edited.status).then_some(TaskUpdate::Status(edited.status))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectField {
    Name,
    Description,
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectField::Name => write!(f, "name"),
            ProjectField::Description => write!(f, "description"),
        }
    }
}

impl Syncable for Project {
    type Field = ProjectField;
    type Update = ProjectUpdate;

    const KIND: EntityKind = EntityKind::Project;
    const FIELDS: &'static [ProjectField] = &[ProjectField::Name, ProjectField::Description];

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn diff(&self, edited: &Self, field: ProjectField) -> Option<ProjectUpdate> {
        match field {
            ProjectField::Name => {
                (self.name != edited.name).then(|| ProjectUpdate::Name(edited.name.clone()))
            }
            ProjectField::Description => (self.description != edited.description)
                .then(|| ProjectUpdate::Description(edited.description.clone())),
        }
    }
}

// ============================================
// Reports
// ============================================

/// Result of one field update
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome<F> {
    pub field: F,
    pub result: ApiResult<()>,
}

/// Follow-up call advancing a project's last-progress timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBump {
    pub project_id: ProjectId,
    pub result: ApiResult<()>,
}

/// Every update attempted by one sync, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport<F> {
    pub outcomes: Vec<FieldOutcome<F>>,
    /// Set when a status change succeeded and the owning project was bumped
    pub progress: Option<ProgressBump>,
}

impl<F> Default for SyncReport<F> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            progress: None,
        }
    }
}

impl<F: Copy + PartialEq> SyncReport<F> {
    /// True when every attempted field update succeeded (or none was needed).
    /// The progress bump does not count.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Nothing differed, no call was made
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn attempted(&self) -> impl Iterator<Item = F> + '_ {
        self.outcomes.iter().map(|o| o.field)
    }

    pub fn failures(&self) -> impl Iterator<Item = (F, &ApiError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.field, e)))
    }

    pub fn outcome(&self, field: F) -> Option<&ApiResult<()>> {
        self.outcomes
            .iter()
            .find(|o| o.field == field)
            .map(|o| &o.result)
    }
}

/// Outcome of the two calls deleting a project and its tasks
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDeletion {
    pub project: ApiResult<()>,
    pub tasks: ApiResult<()>,
}

impl ProjectDeletion {
    pub fn is_complete(&self) -> bool {
        self.project.is_ok() && self.tasks.is_ok()
    }
}

// ============================================
// Synchronizer
// ============================================

type PendingSet = Arc<Mutex<HashSet<(EntityKind, i64)>>>;

/// Held while an operation on one entity is running
struct InFlightClaim {
    pending: PendingSet,
    key: (EntityKind, i64),
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Pushes edits, creations and deletions to the backend.
///
/// Cheap to clone; clones share the in-flight set.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    api: ApiClient,
    pending: PendingSet,
}

impl Synchronizer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            pending: Arc::default(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn claim(&self, kind: EntityKind, id: i64) -> ApiResult<InFlightClaim> {
        let key = (kind, id);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(key) {
            warn!(%kind, id, "rejected: request already in flight");
            return Err(ApiError::InFlight { kind, id });
        }
        Ok(InFlightClaim {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    pub fn is_in_flight(&self, kind: EntityKind, id: i64) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(kind, id))
    }

    async fn push_fields<E: Syncable>(&self, existing: &E, edited: &E) -> SyncReport<E::Field> {
        let id = existing.entity_id();
        let mut report = SyncReport::default();

        for &field in E::FIELDS {
            let Some(update) = existing.diff(edited, field) else {
                continue;
            };
            let result = self.api.apply_update(id, &update).await;
            match &result {
                Ok(()) => debug!(kind = %E::KIND, id, %field, "field updated"),
                Err(e) => warn!(kind = %E::KIND, id, %field, error = %e, "field update failed"),
            }
            report.outcomes.push(FieldOutcome { field, result });
        }
        report
    }

    /// Push every field of `edited` that differs from `existing`
    pub async fn sync<E: Syncable>(
        &self,
        existing: &E,
        edited: &E,
    ) -> ApiResult<SyncReport<E::Field>> {
        let _claim = self.claim(E::KIND, existing.entity_id())?;
        Ok(self.push_fields(existing, edited).await)
    }

    /// Task sync with the project progress bump after a successful status change
    pub async fn sync_task(
        &self,
        existing: &Task,
        edited: &Task,
    ) -> ApiResult<SyncReport<TaskField>> {
        let _claim = self.claim(EntityKind::Task, existing.id)?;
        let mut report = self.push_fields(existing, edited).await;

        let status_changed = matches!(report.outcome(TaskField::Status), Some(Ok(())));
        if !status_changed {
            return Ok(report);
        }

        let project_moved = !matches!(report.outcome(TaskField::Project), Some(Err(_)));
        let owner = if project_moved {
            edited.project_id
        } else {
            existing.project_id
        };
        match owner {
            Some(project_id) => {
                let result = self.api.bump_project_progress(project_id).await;
                if let Err(e) = &result {
                    warn!(project_id, error = %e, "project progress update failed");
                }
                report.progress = Some(ProgressBump { project_id, result });
            }
            None => debug!(task_id = existing.id, "task has no project, progress not bumped"),
        }
        Ok(report)
    }

    /// Move a task to another column. Same column is a no-op.
    pub async fn move_task(
        &self,
        task: &Task,
        status: TaskStatus,
    ) -> ApiResult<SyncReport<TaskField>> {
        let moved = Task {
            status,
            ..task.clone()
        };
        self.sync_task(task, &moved).await
    }

    /// Single create call; the task comes back with its server id
    pub async fn create_task(&self, new: NewTask) -> ApiResult<Task> {
        let id = self.api.create_task(&new).await?;
        info!(task_id = id, title = %new.title, "task created");
        Ok(new.into_task(id))
    }

    pub async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        let _claim = self.claim(EntityKind::Task, id)?;
        self.api.delete_task(id).await?;
        info!(task_id = id, "task deleted");
        Ok(())
    }

    pub async fn create_project(&self, new: NewProject) -> ApiResult<Project> {
        let id = self.api.create_project(&new).await?;
        info!(project_id = id, name = %new.name, "project created");
        Ok(new.into_project(id))
    }

    /// Delete a project, then its tasks. Both calls are always made.
    pub async fn delete_project(&self, id: ProjectId) -> ApiResult<ProjectDeletion> {
        let _claim = self.claim(EntityKind::Project, id)?;
        let project = self.api.delete_project(id).await;
        let tasks = self.api.delete_project_tasks(id).await;

        if let Err(e) = &project {
            warn!(project_id = id, error = %e, "project delete failed");
        }
        if let Err(e) = &tasks {
            warn!(project_id = id, error = %e, "project tasks delete failed");
        }
        Ok(ProjectDeletion { project, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::transport::{MemoryTransport, Method};

    fn setup() -> (Arc<MemoryTransport>, Synchronizer) {
        let backend = Arc::new(MemoryTransport::new());
        let sync = Synchronizer::new(ApiClient::new(backend.clone()));
        (backend, sync)
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
    fn test_task_diff_follows_field_order() {
        let existing = task(1);
        let edited = Task {
            status: TaskStatus::Done,
            title: "Renamed".to_string(),
            priority: Priority::High,
            ..existing.clone()
        };
        let updates: Vec<TaskUpdate> = Task::FIELDS
            .iter()
            .filter_map(|&f| existing.diff(&edited, f))
            .collect();
        assert_eq!(
            updates,
            vec![
                TaskUpdate::Title("Renamed".to_string()),
                TaskUpdate::Priority(Priority::High),
                TaskUpdate::Status(TaskStatus::Done),
            ]
        );
    }

    #[test]
    fn test_unrecognized_priority_differs_from_medium() {
        let existing = Task {
            priority: Priority::Other,
            ..task(1)
        };
        let edited = Task {
            priority: Priority::Medium,
            ..existing.clone()
        };
        assert_eq!(
            existing.diff(&edited, TaskField::Priority),
            Some(TaskUpdate::Priority(Priority::Medium))
        );
        assert_eq!(existing.diff(&existing, TaskField::Priority), None);
    }

    #[tokio::test]
    async fn test_in_flight_entity_is_rejected_without_calls() {
        let (backend, sync) = setup();
        let existing = task(1);
        let edited = Task {
            title: "Other".to_string(),
            ..existing.clone()
        };

        let claim = sync.claim(EntityKind::Task, 1).unwrap();
        let err = sync.sync_task(&existing, &edited).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::InFlight {
                kind: EntityKind::Task,
                id: 1
            }
        );
        assert!(sync.delete_task(1).await.is_err());
        assert!(backend.calls().is_empty());

        drop(claim);
        assert!(!sync.is_in_flight(EntityKind::Task, 1));
        assert!(sync.sync_task(&existing, &edited).await.is_ok());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_claims_are_per_entity() {
        let (_, sync) = setup();
        let _task = sync.claim(EntityKind::Task, 5).unwrap();
        assert!(sync.claim(EntityKind::Project, 5).is_ok());
        assert!(sync.claim(EntityKind::Task, 6).is_ok());
        assert!(sync.claim(EntityKind::Task, 5).is_err());
    }

    #[tokio::test]
    async fn test_claim_released_after_failure() {
        let (backend, sync) = setup();
        backend.set_unreachable(true);
        assert!(sync.delete_task(3).await.is_err());
        assert!(!sync.is_in_flight(EntityKind::Task, 3));
    }

    #[tokio::test]
    async fn test_move_to_same_status_is_noop() {
        let (backend, sync) = setup();
        let report = sync.move_task(&task(1), TaskStatus::Todo).await.unwrap();
        assert!(report.is_noop());
        assert!(report.all_succeeded());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_targets_old_project_when_move_fails() {
        let (backend, sync) = setup();
        backend.fail_on(
            Method::Patch,
            "/tasks/1/project",
            ApiError::server(Some(500), "FOREIGN KEY constraint failed"),
        );
        let existing = task(1);
        let edited = Task {
            project_id: Some(2),
            status: TaskStatus::Done,
            ..existing.clone()
        };
        let report = sync.sync_task(&existing, &edited).await.unwrap();
        assert!(!report.all_succeeded());
        assert_eq!(report.progress.map(|p| p.project_id), Some(1));
    }
}
