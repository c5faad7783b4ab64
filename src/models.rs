//! Domain models for the OPAC task tracker API.
//!
//! These structs match the JSON rows the backend returns and use serde for
//! (de)serialization. Timestamps come from SQLite `CURRENT_TIMESTAMP` (UTC,
//! `YYYY-MM-DD HH:MM:SS`) and are mapped to `NaiveDateTime`; deadlines are
//! mapped to `NaiveDate`.
//! Includes the read models, the write payloads and the form drafts.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::ApiClient;
use crate::error::ApiResult;

pub type ProjectId = i64;
pub type TaskId = i64;

/// Wire format of server timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Wire format of deadlines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest title the task form accepts
pub const TITLE_MAX_LEN: usize = 100;
/// Longest description the task and project forms accept
pub const DESCRIPTION_MAX_LEN: usize = 500;

// ============================================
// Enumerations
// ============================================

/// Kanban column a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub fn all() -> &'static [TaskStatus] {
        &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done]
    }

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    /// Column to the right, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Done),
            TaskStatus::Done => None,
        }
    }

    /// Column to the left, if any
    pub fn previous(&self) -> Option<Self> {
        match self {
            TaskStatus::Todo => None,
            TaskStatus::InProgress => Some(TaskStatus::Todo),
            TaskStatus::Done => Some(TaskStatus::InProgress),
        }
    }

    /// Cycle through statuses (used by form selectors)
    pub fn cycle(&self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    /// `todo` and `in-progress` count as active
    pub fn is_active(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "To do"),
            TaskStatus::InProgress => write!(f, "In progress"),
            TaskStatus::Done => write!(f, "Done"),
        }
    }
}

/// Task priority as stored on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    /// Any other stored value, e.g. the backend's `"haute"` default. Shown
    /// and sorted as medium but never equal to it, so picking medium is
    /// still a change.
    Other,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::Low, Priority::Medium, Priority::High]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium | Priority::Other => "medium",
            Priority::High => "high",
        }
    }

    /// Ordinal used by the priority sort: high=3, medium=2, low=1
    pub fn rank(&self) -> i32 {
        match self {
            Priority::Low => 1,
            Priority::Medium | Priority::Other => 2,
            Priority::High => 3,
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High | Priority::Other => Priority::Low,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            _ => Priority::Other,
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium | Priority::Other => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// Deadline urgency as shown on task cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Undated,
    Normal,
    /// At most two days away and on a working day
    DueSoon,
    Overdue,
}

// ============================================
// Date parsing
// ============================================

/// Parse a server timestamp. Accepts the SQLite format, RFC 3339, the
/// `datetime-local` input format and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parse a deadline. Anything carrying a time keeps only its date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Serde adapter for optional server timestamps
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(super::TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

/// Serde adapter for optional deadlines
pub mod deadline {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(super::DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_date))
    }
}

/// `null` columns read as empty strings
fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================
// Task
// ============================================

/// Task row (read)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, with = "deadline")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub responsible: String,
    #[serde(default)]
    pub load: f64,
    #[serde(default, with = "timestamp")]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub last_update_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub last_status_change_date: Option<NaiveDateTime>,
}

impl Task {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled task"
        } else {
            &self.title
        }
    }

    /// Last modification, falling back to creation
    pub fn last_activity(&self) -> Option<NaiveDateTime> {
        self.last_update_date.or(self.creation_date)
    }

    pub fn due_state(&self, today: NaiveDate) -> DueState {
        let Some(deadline) = self.deadline else {
            return DueState::Undated;
        };
        let days = (deadline - today).num_days();
        if days < 0 {
            DueState::Overdue
        } else if days <= 2 && is_working_day(deadline) {
            DueState::DueSoon
        } else {
            DueState::Normal
        }
    }

    /// Past its deadline and not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.deadline.is_some_and(|d| d < today)
    }

    /// Age of the task, e.g. `"3d 4h"` or `"5h"`
    pub fn lifetime(&self, now: NaiveDateTime) -> Option<String> {
        let created = self.creation_date?;
        let elapsed = now - created;
        let days = elapsed.num_days();
        let hours = elapsed.num_hours() - days * 24;
        Some(if days > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}h", hours.max(0))
        })
    }

    /// Copy of this task carrying the editable values of `draft`
    pub fn with_draft(&self, draft: &TaskDraft) -> Task {
        Task {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            deadline: draft.deadline,
            status: draft.status,
            priority: draft.priority,
            project_id: draft.project_id,
            ..self.clone()
        }
    }
}

/// Create task payload (write)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "deadline")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub load: f64,
    #[serde(default)]
    pub responsible: String,
    pub project_id: Option<ProjectId>,
}

impl NewTask {
    /// Task as the backend stores it right after creation. Timestamps are
    /// only known after the next fetch.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            status: self.status,
            priority: self.priority,
            project_id: self.project_id,
            responsible: self.responsible,
            load: self.load,
            creation_date: None,
            last_update_date: None,
            last_status_change_date: None,
        }
    }
}

/// Editable values of the task modal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Blank draft for the create modal
    pub fn blank(project_id: Option<ProjectId>) -> Self {
        Self {
            project_id,
            ..Self::default()
        }
    }

    /// Draft pre-filled from an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            project_id: task.project_id,
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            priority: task.priority,
            status: task.status,
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required");
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err("Title must be at most 100 characters");
        }
        if self.description.trim().chars().count() > DESCRIPTION_MAX_LEN {
            return Err("Description must be at most 500 characters");
        }
        if self.project_id.is_none() {
            return Err("Project is required");
        }
        Ok(())
    }

    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            deadline: self.deadline,
            status: self.status,
            priority: self.priority,
            load: 0.0,
            responsible: String::new(),
            project_id: self.project_id,
        }
    }
}

// ============================================
// Project
// ============================================

/// Project row (read)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, with = "timestamp")]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub last_update_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub last_progress_date: Option<NaiveDateTime>,
}

impl Project {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed project"
        } else {
            &self.name
        }
    }

    pub fn with_draft(&self, draft: &ProjectDraft) -> Project {
        Project {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Create project payload (write)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewProject {
    pub fn into_project(self, id: ProjectId) -> Project {
        Project {
            id,
            name: self.name,
            description: self.description,
            creation_date: None,
            last_update_date: None,
            last_progress_date: None,
        }
    }
}

/// Editable values of the project modal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

impl ProjectDraft {
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Name is required");
        }
        if self.description.trim().chars().count() > DESCRIPTION_MAX_LEN {
            return Err("Description must be at most 500 characters");
        }
        Ok(())
    }

    pub fn to_new_project(&self) -> NewProject {
        NewProject {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

/// `{ "id": .. }` answer of the create endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

// ============================================
// Derived statistics
// ============================================

/// Task counts per status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl TaskCounts {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            counts.total += 1;
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
            counts
        })
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    /// Share of done tasks, truncated to a whole percent
    pub fn progress_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.done * 100 / self.total) as u8
    }
}

/// Project together with its lazily loaded task statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub project: Project,
    stats: Option<TaskCounts>,
}

impl ProjectView {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            stats: None,
        }
    }

    /// Fetch one project; statistics stay unloaded
    pub async fn load(api: &ApiClient, id: ProjectId) -> ApiResult<Self> {
        Ok(Self::new(api.get_project(id).await?))
    }

    /// Load every task of the project and count them by status
    pub async fn load_stats(&mut self, api: &ApiClient) -> ApiResult<TaskCounts> {
        let tasks = api.list_project_tasks(self.project.id).await?;
        let stats = TaskCounts::from_tasks(&tasks);
        self.stats = Some(stats);
        Ok(stats)
    }

    pub fn stats(&self) -> Option<&TaskCounts> {
        self.stats.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_task_from_server_row() {
        let row = json!({
            "id": 4,
            "title": "Write report",
            "description": null,
            "deadline": "2025-03-14",
            "status": "in-progress",
            "priority": "high",
            "load": 1.5,
            "responsible": null,
            "project_id": 2,
            "creation_date": "2025-03-01 08:30:00",
            "last_update_date": "2025-03-02 09:00:00",
            "last_status_change_date": null
        });
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.deadline, Some(date(2025, 3, 14)));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.project_id, Some(2));
        assert_eq!(
            task.creation_date,
            Some(date(2025, 3, 1).and_hms_opt(8, 30, 0).unwrap())
        );
        assert_eq!(task.last_status_change_date, None);
    }

    #[test]
    fn test_unknown_priority_is_kept_apart_from_medium() {
        let row = json!({"id": 1, "title": "t", "status": "todo", "priority": "haute"});
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.priority, Priority::Other);
        assert_eq!(task.priority.rank(), Priority::Medium.rank());
        assert_eq!(task.priority.to_string(), "Medium");
        assert_ne!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let row = json!({"id": 1, "title": "t", "status": "blocked"});
        assert!(serde_json::from_value::<Task>(row).is_err());
    }

    #[test]
    fn test_deadline_accepts_datetime_and_empty() {
        assert_eq!(parse_date("2025-03-14 10:00:00"), Some(date(2025, 3, 14)));
        assert_eq!(parse_date("2025-03-14T10:00"), Some(date(2025, 3, 14)));
        assert_eq!(parse_date(""), None);
        let row = json!({"id": 1, "title": "t", "status": "todo", "deadline": ""});
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = date(2025, 1, 2).and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2025-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-02T03:04:05.000"), Some(expected));
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn test_new_task_serializes_wire_values() {
        let new = NewTask {
            title: "T".to_string(),
            deadline: Some(date(2025, 5, 1)),
            status: TaskStatus::InProgress,
            priority: Priority::Low,
            project_id: Some(1),
            ..NewTask::default()
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["deadline"], "2025-05-01");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["priority"], "low");
    }

    #[test]
    fn test_due_state() {
        let mut task = NewTask::default().into_task(1);
        // 2025-03-12 is a Wednesday
        let today = date(2025, 3, 12);
        assert_eq!(task.due_state(today), DueState::Undated);

        task.deadline = Some(date(2025, 3, 11));
        assert_eq!(task.due_state(today), DueState::Overdue);

        task.deadline = Some(date(2025, 3, 14));
        assert_eq!(task.due_state(today), DueState::DueSoon);

        // Saturday, two days after Thursday
        assert_eq!(task.due_state(date(2025, 3, 13)), DueState::Normal);
        task.deadline = Some(date(2025, 3, 15));
        assert_eq!(task.due_state(date(2025, 3, 13)), DueState::Normal);

        task.deadline = Some(date(2025, 3, 20));
        assert_eq!(task.due_state(today), DueState::Normal);
    }

    #[test]
    fn test_overdue_ignores_done_tasks() {
        let mut task = NewTask::default().into_task(1);
        task.deadline = Some(date(2025, 1, 1));
        assert!(task.is_overdue(date(2025, 2, 1)));
        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(date(2025, 2, 1)));
    }

    #[test]
    fn test_lifetime() {
        let mut task = NewTask::default().into_task(1);
        assert_eq!(task.lifetime(date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap()), None);
        task.creation_date = date(2025, 1, 1).and_hms_opt(8, 0, 0);
        let now = date(2025, 1, 4).and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(task.lifetime(now).as_deref(), Some("3d 4h"));
        let now = date(2025, 1, 1).and_hms_opt(13, 0, 0).unwrap();
        assert_eq!(task.lifetime(now).as_deref(), Some("5h"));
    }

    #[test]
    fn test_task_draft_validation() {
        let mut draft = TaskDraft::blank(Some(1));
        assert_eq!(draft.validate(), Err("Title is required"));

        draft.title = "x".repeat(101);
        assert!(draft.validate().is_err());

        draft.title = "Ship it".to_string();
        assert!(draft.validate().is_ok());

        draft.project_id = None;
        assert_eq!(draft.validate(), Err("Project is required"));
    }

    #[test]
    fn test_with_draft_trims_and_keeps_metadata() {
        let mut task = NewTask::default().into_task(9);
        task.responsible = "alice".to_string();
        let draft = TaskDraft {
            title: "  New title ".to_string(),
            ..TaskDraft::from_task(&task)
        };
        let edited = task.with_draft(&draft);
        assert_eq!(edited.title, "New title");
        assert_eq!(edited.responsible, "alice");
        assert_eq!(edited.id, 9);
    }

    #[test]
    fn test_task_counts_progress() {
        let mut tasks: Vec<Task> = (0..4).map(|i| NewTask::default().into_task(i)).collect();
        tasks[0].status = TaskStatus::Done;
        tasks[1].status = TaskStatus::InProgress;
        let counts = TaskCounts::from_tasks(&tasks);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.todo, 2);
        assert_eq!(counts.get(TaskStatus::InProgress), 1);
        assert_eq!(counts.progress_percent(), 25);
        assert_eq!(TaskCounts::default().progress_percent(), 0);
    }

    #[tokio::test]
    async fn test_project_view_loads_stats_lazily() {
        let backend = std::sync::Arc::new(crate::transport::MemoryTransport::new());
        let api = ApiClient::new(backend.clone());
        let project_id = backend.insert_project(NewProject {
            name: "Website".to_string(),
            ..NewProject::default()
        });
        for status in [TaskStatus::Todo, TaskStatus::Done] {
            backend.insert_task(NewTask {
                status,
                project_id: Some(project_id),
                ..NewTask::default()
            });
        }

        let mut view = ProjectView::load(&api, project_id).await.unwrap();
        assert_eq!(view.project.name, "Website");
        assert_eq!(view.stats(), None);

        let stats = view.load_stats(&api).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(view.stats().map(|s| s.progress_percent()), Some(50));
    }

    #[test]
    fn test_status_navigation() {
        assert_eq!(TaskStatus::Todo.next(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::Done.next(), None);
        assert_eq!(TaskStatus::Todo.previous(), None);
        assert!(TaskStatus::InProgress.is_active());
        assert!(!TaskStatus::Done.is_active());
    }
}
