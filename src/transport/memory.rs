//! In-memory stand-in for the OPAC backend.
//!
//! Reproduces the REST contract of the real server (routes, envelope data,
//! status codes, cascade on project delete, `404` on empty subsets) without
//! any network. Every call is recorded so tests can assert on exactly what
//! was sent, and failures can be injected per route.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

use super::{Method, Transport};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    parse_date, parse_timestamp, NewProject, NewTask, Priority, Project, ProjectId, Task,
    TaskId, TaskStatus,
};

/// One request as it reached the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RecordedCall {
    pub fn is(&self, method: Method, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

#[derive(Debug, Default)]
struct Backend {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    last_project_id: ProjectId,
    last_task_id: TaskId,
    calls: Vec<RecordedCall>,
    failures: HashMap<(Method, String), ApiError>,
    unreachable: bool,
    frozen_now: Option<NaiveDateTime>,
}

/// Backend double used by the test-suite and by `--demo`
#[derive(Debug, Default)]
pub struct MemoryTransport {
    backend: Mutex<Backend>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with a few projects and tasks around today
    pub fn demo() -> Self {
        let transport = Self::new();
        let today = Utc::now().date_naive();
        let day = |offset: i64| Some(today + Duration::days(offset));

        let website = transport.insert_project(NewProject {
            name: "Website redesign".to_string(),
            description: "New landing page and blog".to_string(),
        });
        let mobile = transport.insert_project(NewProject {
            name: "Mobile app".to_string(),
            description: "First public release".to_string(),
        });
        let ops = transport.insert_project(NewProject {
            name: "Infrastructure".to_string(),
            description: String::new(),
        });

        let seed = [
            (website, "Draft wireframes", TaskStatus::Done, Priority::High, day(-6)),
            (website, "Pick a colour palette", TaskStatus::InProgress, Priority::Low, day(1)),
            (website, "Write blog migration script", TaskStatus::Todo, Priority::Medium, day(9)),
            (website, "Accessibility review", TaskStatus::Todo, Priority::High, day(-1)),
            (mobile, "Set up CI builds", TaskStatus::Done, Priority::Medium, None),
            (mobile, "Login screen", TaskStatus::InProgress, Priority::High, day(2)),
            (mobile, "Push notifications", TaskStatus::Todo, Priority::Medium, day(21)),
            (mobile, "Store listing copy", TaskStatus::Todo, Priority::Low, None),
            (ops, "Rotate TLS certificates", TaskStatus::Todo, Priority::High, day(0)),
            (ops, "Nightly database backups", TaskStatus::InProgress, Priority::Medium, day(40)),
        ];
        for (project_id, title, status, priority, deadline) in seed {
            transport.insert_task(NewTask {
                title: title.to_string(),
                deadline,
                status,
                priority,
                project_id: Some(project_id),
                ..NewTask::default()
            });
        }
        transport
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a project without recording a call
    pub fn insert_project(&self, new: NewProject) -> ProjectId {
        self.backend().create_project(new)
    }

    /// Seed a task without recording a call
    pub fn insert_task(&self, new: NewTask) -> TaskId {
        self.backend().create_task(new)
    }

    /// Freeze the server clock (timestamps and the due-soon window)
    pub fn set_now(&self, now: NaiveDateTime) {
        self.backend().frozen_now = Some(now);
    }

    /// Answer every `method path` call with `error` until cleared
    pub fn fail_on(&self, method: Method, path: impl Into<String>, error: ApiError) {
        self.backend().failures.insert((method, path.into()), error);
    }

    pub fn clear_failures(&self) {
        self.backend().failures.clear();
    }

    /// Simulate a refused connection for every call
    pub fn set_unreachable(&self, unreachable: bool) {
        self.backend().unreachable = unreachable;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.backend().calls.clone()
    }

    /// Return the recorded calls and start a fresh log
    pub fn take_calls(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut self.backend().calls)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.backend().tasks.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.backend().projects.clone()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let mut backend = self.backend();
        backend.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.clone(),
        });
        debug!(%method, path, "memory backend request");

        if backend.unreachable {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        if let Some(error) = backend.failures.get(&(method, path.to_string())) {
            return Err(error.clone());
        }
        backend.route(method, path, body)
    }
}

// ============================================
// Routing
// ============================================

fn not_found(message: &str) -> ApiError {
    ApiError::server(Some(404), message)
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::server(Some(400), message)
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| not_found("Not found"))
}

fn query_project_id(query: &str) -> ApiResult<Option<ProjectId>> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("project_id="))
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.parse().map_err(|_| bad_request("Invalid project_id")))
        .transpose()
}

fn body_field<'a>(body: &'a Option<Value>, key: &str) -> Option<&'a Value> {
    body.as_ref().and_then(|b| b.get(key))
}

fn body_str(body: &Option<Value>, key: &str) -> String {
    body_field(body, key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn to_data<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    Ok(serde_json::to_value(value)?)
}

impl Backend {
    fn now(&self) -> NaiveDateTime {
        self.frozen_now.unwrap_or_else(|| Utc::now().naive_utc())
    }

    fn route(&mut self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = route.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            (Method::Get, ["health"]) => Ok(Value::Null),

            (Method::Get, ["projects"]) => to_data(&self.sorted_projects()),
            (Method::Post, ["projects"]) => {
                let new: NewProject = serde_json::from_value(body.unwrap_or(Value::Null))
                    .map_err(|e| bad_request(e.to_string()))?;
                let id = self.create_project(new);
                Ok(json!({ "id": id }))
            }
            (Method::Delete, ["projects"]) => self.clear_projects(),
            (Method::Get, ["projects", id]) => {
                let id = parse_id(id)?;
                let project = self
                    .projects
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| not_found("Project not found"))?;
                to_data(project)
            }
            (Method::Delete, ["projects", id]) => self.delete_project(parse_id(id)?),
            (Method::Patch, ["projects", id, field]) => {
                self.patch_project(parse_id(id)?, field, &body)
            }

            (Method::Get, ["tasks"]) => {
                let project_id = query_project_id(query)?;
                let tasks: Vec<Task> = self
                    .sorted_tasks()
                    .into_iter()
                    .filter(|t| project_id.is_none() || t.project_id == project_id)
                    .collect();
                to_data(&tasks)
            }
            (Method::Post, ["tasks"]) => {
                let new: NewTask = serde_json::from_value(body.unwrap_or(Value::Null))
                    .map_err(|e| ApiError::server(Some(500), e.to_string()))?;
                self.check_project_exists(new.project_id)?;
                let id = self.create_task(new);
                Ok(json!({ "id": id }))
            }
            (Method::Delete, ["tasks"]) => self.delete_tasks(query_project_id(query)?),
            (Method::Get, ["tasks", "high-priority"]) => {
                let tasks: Vec<&Task> = self
                    .tasks
                    .iter()
                    .filter(|t| t.priority == Priority::High && t.status != TaskStatus::Done)
                    .collect();
                if tasks.is_empty() {
                    return Err(not_found("No high priority tasks"));
                }
                to_data(&tasks)
            }
            (Method::Get, ["tasks", "due-soon"]) => {
                let limit = self.now() + Duration::days(2);
                let mut tasks: Vec<&Task> = self
                    .tasks
                    .iter()
                    .filter(|t| t.status != TaskStatus::Done)
                    .filter(|t| {
                        t.deadline
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                            .is_some_and(|d| d < limit)
                    })
                    .collect();
                if tasks.is_empty() {
                    return Err(not_found("No tasks due soon"));
                }
                tasks.sort_by_key(|t| t.deadline);
                to_data(&tasks)
            }
            (Method::Get, ["tasks", id]) => {
                let id = parse_id(id)?;
                let task = self
                    .tasks
                    .iter()
                    .find(|t| t.id == id)
                    .ok_or_else(|| not_found("Task not found"))?;
                to_data(task)
            }
            (Method::Delete, ["tasks", id]) => {
                let id = parse_id(id)?;
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != id);
                if self.tasks.len() == before {
                    return Err(not_found("Task not found"));
                }
                Ok(Value::Null)
            }
            (Method::Patch, ["tasks", id, field]) => self.patch_task(parse_id(id)?, field, &body),

            _ => Err(not_found("Not found")),
        }
    }

    fn sorted_projects(&self) -> Vec<Project> {
        let mut projects = self.projects.clone();
        projects.sort_by(|a, b| (b.creation_date, b.id).cmp(&(a.creation_date, a.id)));
        projects
    }

    fn sorted_tasks(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| (b.creation_date, b.id).cmp(&(a.creation_date, a.id)));
        tasks
    }

    fn check_project_exists(&self, project_id: Option<ProjectId>) -> ApiResult<()> {
        match project_id {
            Some(id) if !self.projects.iter().any(|p| p.id == id) => Err(ApiError::server(
                Some(500),
                "FOREIGN KEY constraint failed",
            )),
            _ => Ok(()),
        }
    }

    fn create_project(&mut self, new: NewProject) -> ProjectId {
        self.last_project_id += 1;
        let id = self.last_project_id;
        let now = Some(self.now());
        let mut project = new.into_project(id);
        project.creation_date = now;
        project.last_update_date = now;
        project.last_progress_date = now;
        self.projects.push(project);
        id
    }

    fn create_task(&mut self, new: NewTask) -> TaskId {
        self.last_task_id += 1;
        let id = self.last_task_id;
        let now = Some(self.now());
        let mut task = new.into_task(id);
        task.creation_date = now;
        task.last_update_date = now;
        task.last_status_change_date = now;
        self.tasks.push(task);
        id
    }

    fn delete_project(&mut self, id: ProjectId) -> ApiResult<Value> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(not_found("Project not found"));
        }
        self.tasks.retain(|t| t.project_id != Some(id));
        Ok(Value::Null)
    }

    fn clear_projects(&mut self) -> ApiResult<Value> {
        if self.projects.is_empty() {
            return Err(bad_request("Reset failed"));
        }
        let ids: Vec<ProjectId> = self.projects.iter().map(|p| p.id).collect();
        self.projects.clear();
        self.tasks
            .retain(|t| t.project_id.map_or(true, |id| !ids.contains(&id)));
        Ok(Value::Null)
    }

    fn delete_tasks(&mut self, project_id: Option<ProjectId>) -> ApiResult<Value> {
        match project_id {
            Some(id) => self.tasks.retain(|t| t.project_id != Some(id)),
            None => {
                if self.tasks.is_empty() {
                    return Err(bad_request("Reset failed"));
                }
                self.tasks.clear();
            }
        }
        Ok(Value::Null)
    }

    fn patch_project(&mut self, id: ProjectId, field: &str, body: &Option<Value>) -> ApiResult<Value> {
        let now = self.now();
        let update: Box<dyn FnOnce(&mut Project)> = match field {
            "name" => {
                let name = body_str(body, "name");
                if name.is_empty() {
                    return Err(bad_request("A project must have a name."));
                }
                Box::new(move |p| {
                    p.name = name;
                    p.last_update_date = Some(now);
                })
            }
            "description" => {
                let description = body_str(body, "description");
                Box::new(move |p| {
                    p.description = description;
                    p.last_update_date = Some(now);
                })
            }
            "progress-date" => Box::new(move |p| p.last_progress_date = Some(now)),
            _ => return Err(not_found("Not found")),
        };
        // Updating a missing row is not an error for the backend
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            update(project);
        }
        Ok(Value::Null)
    }

    fn patch_task(&mut self, id: TaskId, field: &str, body: &Option<Value>) -> ApiResult<Value> {
        let now = self.now();
        let value = |key: &str| body_field(body, key).cloned().unwrap_or(Value::Null);

        let update: Box<dyn FnOnce(&mut Task)> = match field {
            "title" => {
                let title = body_str(body, "title");
                if title.is_empty() {
                    return Err(bad_request("A task must have a title."));
                }
                Box::new(move |t| t.title = title)
            }
            "description" => {
                let description = body_str(body, "description");
                Box::new(move |t| t.description = description)
            }
            "deadline" => {
                let deadline = value("deadline").as_str().and_then(parse_date);
                Box::new(move |t| t.deadline = deadline)
            }
            "status" => {
                let status: TaskStatus = serde_json::from_value(value("status"))
                    .map_err(|_| bad_request("Invalid status"))?;
                Box::new(move |t| {
                    t.status = status;
                    t.last_status_change_date = Some(now);
                })
            }
            "priority" => {
                let priority = Priority::from(body_str(body, "priority"));
                Box::new(move |t| t.priority = priority)
            }
            "load" => {
                let load = value("load").as_f64().unwrap_or_default();
                Box::new(move |t| t.load = load)
            }
            "responsible" => {
                let responsible = body_str(body, "responsible");
                Box::new(move |t| t.responsible = responsible)
            }
            "project" => {
                let project_id = value("project_id").as_i64();
                self.check_project_exists(project_id)?;
                Box::new(move |t| t.project_id = project_id)
            }
            "last-update" => {
                let ts = value("last_update_date").as_str().and_then(parse_timestamp);
                return Ok(self.touch_task(id, |t| t.last_update_date = ts));
            }
            "last-status-change" => {
                let ts = value("last_status_change_date")
                    .as_str()
                    .and_then(parse_timestamp);
                return Ok(self.touch_task(id, |t| t.last_status_change_date = ts));
            }
            _ => return Err(not_found("Not found")),
        };

        Ok(self.touch_task(id, |t| {
            update(t);
            t.last_update_date = Some(now);
        }))
    }

    fn touch_task(&mut self, id: TaskId, update: impl FnOnce(&mut Task)) -> Value {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            update(task);
        }
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_fetch_task() {
        let backend = MemoryTransport::new();
        let project = backend.insert_project(NewProject {
            name: "P".to_string(),
            ..NewProject::default()
        });
        let created = backend
            .request(
                Method::Post,
                "/tasks",
                Some(json!({"title": "T", "project_id": project})),
            )
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();
        let fetched = backend
            .request(Method::Get, &format!("/tasks/{id}"), None)
            .await
            .unwrap();
        assert_eq!(fetched["title"], "T");
        assert_eq!(fetched["status"], "todo");
        assert_eq!(fetched["priority"], "medium");
        assert!(fetched["creation_date"].is_string());
    }

    #[tokio::test]
    async fn test_due_soon_is_404_when_empty() {
        let backend = MemoryTransport::new();
        backend.set_now(noon(2025, 3, 10));
        let err = backend
            .request(Method::Get, "/tasks/due-soon", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        backend.insert_task(NewTask {
            title: "soon".to_string(),
            deadline: NaiveDate::from_ymd_opt(2025, 3, 12),
            ..NewTask::default()
        });
        backend.insert_task(NewTask {
            title: "later".to_string(),
            deadline: NaiveDate::from_ymd_opt(2025, 3, 20),
            ..NewTask::default()
        });
        let data = backend
            .request(Method::Get, "/tasks/due-soon", None)
            .await
            .unwrap();
        assert_eq!(data.as_array().map(Vec::len), Some(1));
        assert_eq!(data[0]["title"], "soon");
    }

    #[tokio::test]
    async fn test_status_patch_touches_timestamps() {
        let backend = MemoryTransport::new();
        backend.set_now(noon(2025, 1, 1));
        let id = backend.insert_task(NewTask {
            title: "T".to_string(),
            ..NewTask::default()
        });
        backend.set_now(noon(2025, 1, 2));
        backend
            .request(
                Method::Patch,
                &format!("/tasks/{id}/status"),
                Some(json!({"status": "done"})),
            )
            .await
            .unwrap();
        let task = &backend.tasks()[0];
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.last_update_date, Some(noon(2025, 1, 2)));
        assert_eq!(task.last_status_change_date, Some(noon(2025, 1, 2)));
        assert_eq!(task.creation_date, Some(noon(2025, 1, 1)));
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let backend = MemoryTransport::new();
        let id = backend.insert_task(NewTask {
            title: "T".to_string(),
            ..NewTask::default()
        });
        let err = backend
            .request(Method::Patch, &format!("/tasks/{id}/title"), Some(json!({"title": ""})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_project_delete_cascades() {
        let backend = MemoryTransport::new();
        let keep = backend.insert_project(NewProject::default());
        let drop = backend.insert_project(NewProject::default());
        backend.insert_task(NewTask {
            project_id: Some(keep),
            ..NewTask::default()
        });
        backend.insert_task(NewTask {
            project_id: Some(drop),
            ..NewTask::default()
        });
        backend
            .request(Method::Delete, &format!("/projects/{drop}"), None)
            .await
            .unwrap();
        assert_eq!(backend.projects().len(), 1);
        assert_eq!(backend.tasks().len(), 1);

        let err = backend
            .request(Method::Delete, &format!("/projects/{drop}"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_and_unreachable() {
        let backend = MemoryTransport::new();
        backend.fail_on(Method::Get, "/projects", ApiError::server(Some(500), "boom"));
        let err = backend.request(Method::Get, "/projects", None).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        backend.clear_failures();
        backend.set_unreachable(true);
        let err = backend.request(Method::Get, "/projects", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn test_demo_seed() {
        let backend = MemoryTransport::demo();
        assert_eq!(backend.projects().len(), 3);
        assert_eq!(backend.tasks().len(), 10);
    }
}
