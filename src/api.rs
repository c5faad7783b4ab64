//! API client for the OPAC REST API.
//!
//! A typed facade over a [`Transport`]: one method per backend endpoint,
//! decoding `data` into the domain models. The transport is injected, so the
//! same client drives the real server or the in-memory backend.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::models::{
    Created, NewProject, NewTask, Priority, Project, ProjectId, Task, TaskId, TaskStatus,
    DATE_FORMAT, TIMESTAMP_FORMAT,
};
use crate::transport::{Method, Transport};

/// A single-field update: where it goes and what it carries
pub trait FieldUpdate: fmt::Debug + Send + Sync {
    /// Endpoint path for the entity `id`
    fn path(&self, id: i64) -> String;
    /// JSON body of the PATCH call
    fn body(&self) -> Value;
}

/// Single-field task update (`PATCH /tasks/:id/<field>`)
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Project(Option<ProjectId>),
    Title(String),
    Description(String),
    Deadline(Option<NaiveDate>),
    Status(TaskStatus),
    Priority(Priority),
    Load(f64),
    Responsible(String),
    LastUpdate(NaiveDateTime),
    LastStatusChange(NaiveDateTime),
}

impl TaskUpdate {
    pub fn segment(&self) -> &'static str {
        match self {
            TaskUpdate::Project(_) => "project",
            TaskUpdate::Title(_) => "title",
            TaskUpdate::Description(_) => "description",
            TaskUpdate::Deadline(_) => "deadline",
            TaskUpdate::Status(_) => "status",
            TaskUpdate::Priority(_) => "priority",
            TaskUpdate::Load(_) => "load",
            TaskUpdate::Responsible(_) => "responsible",
            TaskUpdate::LastUpdate(_) => "last-update",
            TaskUpdate::LastStatusChange(_) => "last-status-change",
        }
    }
}

impl FieldUpdate for TaskUpdate {
    fn path(&self, id: TaskId) -> String {
        format!("/tasks/{}/{}", id, self.segment())
    }

    fn body(&self) -> Value {
        match self {
            TaskUpdate::Project(project_id) => json!({ "project_id": project_id }),
            TaskUpdate::Title(title) => json!({ "title": title }),
            TaskUpdate::Description(description) => json!({ "description": description }),
            TaskUpdate::Deadline(deadline) => {
                json!({ "deadline": deadline.map(|d| d.format(DATE_FORMAT).to_string()) })
            }
            TaskUpdate::Status(status) => json!({ "status": status.as_str() }),
            TaskUpdate::Priority(priority) => json!({ "priority": priority.as_str() }),
            TaskUpdate::Load(load) => json!({ "load": load }),
            TaskUpdate::Responsible(responsible) => json!({ "responsible": responsible }),
            TaskUpdate::LastUpdate(ts) => {
                json!({ "last_update_date": ts.format(TIMESTAMP_FORMAT).to_string() })
            }
            TaskUpdate::LastStatusChange(ts) => {
                json!({ "last_status_change_date": ts.format(TIMESTAMP_FORMAT).to_string() })
            }
        }
    }
}

/// Single-field project update (`PATCH /projects/:id/<field>`)
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectUpdate {
    Name(String),
    Description(String),
}

impl FieldUpdate for ProjectUpdate {
    fn path(&self, id: ProjectId) -> String {
        match self {
            ProjectUpdate::Name(_) => format!("/projects/{}/name", id),
            ProjectUpdate::Description(_) => format!("/projects/{}/description", id),
        }
    }

    fn body(&self) -> Value {
        match self {
            ProjectUpdate::Name(name) => json!({ "name": name }),
            ProjectUpdate::Description(description) => json!({ "description": description }),
        }
    }
}

/// API client for the OPAC backend
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let data = self.transport.request(Method::Get, path, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<()> {
        self.transport.request(method, path, body).await.map(|_| ())
    }

    /// Issue one single-field PATCH
    pub async fn apply_update<U: FieldUpdate>(&self, id: i64, update: &U) -> ApiResult<()> {
        self.call(Method::Patch, &update.path(id), Some(update.body()))
            .await
    }

    // ============================================
    // Projects
    // ============================================

    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.fetch("/projects").await
    }

    pub async fn get_project(&self, id: ProjectId) -> ApiResult<Project> {
        self.fetch(&format!("/projects/{}", id)).await
    }

    /// Create a project and return its new id
    pub async fn create_project(&self, project: &NewProject) -> ApiResult<ProjectId> {
        let data = self
            .transport
            .request(Method::Post, "/projects", Some(serde_json::to_value(project)?))
            .await?;
        let created: Created = serde_json::from_value(data)?;
        Ok(created.id)
    }

    pub async fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> ApiResult<()> {
        self.apply_update(id, update).await
    }

    /// Set the project's last-progress timestamp to now
    pub async fn bump_project_progress(&self, id: ProjectId) -> ApiResult<()> {
        self.call(
            Method::Patch,
            &format!("/projects/{}/progress-date", id),
            Some(json!({})),
        )
        .await
    }

    /// Delete one project. Its tasks need a separate [`Self::delete_project_tasks`].
    pub async fn delete_project(&self, id: ProjectId) -> ApiResult<()> {
        self.call(Method::Delete, &format!("/projects/{}", id), None)
            .await
    }

    pub async fn delete_all_projects(&self) -> ApiResult<()> {
        self.call(Method::Delete, "/projects", None).await
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        self.fetch("/tasks").await
    }

    pub async fn list_project_tasks(&self, project_id: ProjectId) -> ApiResult<Vec<Task>> {
        self.fetch(&format!("/tasks?project_id={}", project_id)).await
    }

    pub async fn get_task(&self, id: TaskId) -> ApiResult<Task> {
        self.fetch(&format!("/tasks/{}", id)).await
    }

    /// Unfinished high-priority tasks. The backend answers 404 when there are none.
    pub async fn high_priority_tasks(&self) -> ApiResult<Vec<Task>> {
        self.fetch("/tasks/high-priority").await
    }

    /// Unfinished tasks due within two days. The backend answers 404 when there are none.
    pub async fn due_soon_tasks(&self) -> ApiResult<Vec<Task>> {
        self.fetch("/tasks/due-soon").await
    }

    /// Create a task and return its new id
    pub async fn create_task(&self, task: &NewTask) -> ApiResult<TaskId> {
        let data = self
            .transport
            .request(Method::Post, "/tasks", Some(serde_json::to_value(task)?))
            .await?;
        let created: Created = serde_json::from_value(data)?;
        Ok(created.id)
    }

    pub async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> ApiResult<()> {
        self.apply_update(id, update).await
    }

    pub async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        self.call(Method::Delete, &format!("/tasks/{}", id), None).await
    }

    pub async fn delete_project_tasks(&self, project_id: ProjectId) -> ApiResult<()> {
        self.call(
            Method::Delete,
            &format!("/tasks?project_id={}", project_id),
            None,
        )
        .await
    }

    pub async fn delete_all_tasks(&self) -> ApiResult<()> {
        self.call(Method::Delete, "/tasks", None).await
    }

    // ============================================
    // Utility
    // ============================================

    /// Health check against `GET /health`
    pub async fn health(&self) -> ApiResult<()> {
        self.call(Method::Get, "/health", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::transport::MemoryTransport;

    fn client() -> (Arc<MemoryTransport>, ApiClient) {
        let backend = Arc::new(MemoryTransport::new());
        let api = ApiClient::new(backend.clone());
        (backend, api)
    }

    #[test]
    fn test_task_update_mapping() {
        let update = TaskUpdate::Status(TaskStatus::InProgress);
        assert_eq!(update.path(7), "/tasks/7/status");
        assert_eq!(update.body(), json!({"status": "in-progress"}));

        let update = TaskUpdate::Project(Some(3));
        assert_eq!(update.path(7), "/tasks/7/project");
        assert_eq!(update.body(), json!({"project_id": 3}));

        let update = TaskUpdate::Deadline(None);
        assert_eq!(update.body(), json!({"deadline": null}));
    }

    #[test]
    fn test_project_update_mapping() {
        let update = ProjectUpdate::Name("Ops".to_string());
        assert_eq!(update.path(2), "/projects/2/name");
        assert_eq!(update.body(), json!({"name": "Ops"}));
    }

    #[tokio::test]
    async fn test_create_and_list_projects() {
        let (_, api) = client();
        let id = api
            .create_project(&NewProject {
                name: "Ops".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let projects = api.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, id);
        assert_eq!(projects[0].name, "Ops");
    }

    #[tokio::test]
    async fn test_project_tasks_query() {
        let (backend, api) = client();
        api.list_project_tasks(4).await.unwrap();
        let calls = backend.calls();
        assert!(calls[0].is(Method::Get, "/tasks?project_id=4"));
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let (_, api) = client();
        let err = api.get_task(42).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_single_field_updates() {
        let (backend, api) = client();
        let project = backend.insert_project(NewProject {
            name: "Ops".to_string(),
            description: String::new(),
        });
        let task = backend.insert_task(NewTask {
            title: "Rotate keys".to_string(),
            project_id: Some(project),
            ..NewTask::default()
        });

        api.update_task(task, &TaskUpdate::Status(TaskStatus::Done))
            .await
            .unwrap();
        api.update_project(project, &ProjectUpdate::Description("Infra".to_string()))
            .await
            .unwrap();

        assert_eq!(api.get_task(task).await.unwrap().status, TaskStatus::Done);
        assert_eq!(api.get_project(project).await.unwrap().description, "Infra");
        let paths: Vec<String> = backend
            .take_calls()
            .into_iter()
            .filter(|c| c.method == Method::Patch)
            .map(|c| c.path)
            .collect();
        assert_eq!(paths, vec!["/tasks/1/status", "/projects/1/description"]);
    }

    #[tokio::test]
    async fn test_delete_everything() {
        let (backend, api) = client();
        let project = backend.insert_project(NewProject::default());
        backend.insert_task(NewTask {
            project_id: Some(project),
            ..NewTask::default()
        });

        api.delete_all_tasks().await.unwrap();
        api.delete_all_projects().await.unwrap();

        assert!(api.list_tasks().await.unwrap().is_empty());
        assert!(api.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_reports_network_failure() {
        let (backend, api) = client();
        assert_eq!(api.health().await, Ok(()));
        backend.set_unreachable(true);
        assert!(matches!(api.health().await, Err(ApiError::Network(_))));
    }
}
