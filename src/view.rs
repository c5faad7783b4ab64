//! Collection view engine.
//!
//! Pure functions turning a task list plus a configuration into what the
//! boards display: filtered and sorted kanban columns, and period-grouped
//! timeline buckets. Nothing here touches the network.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Priority, ProjectId, Task, TaskCounts, TaskStatus};

// ============================================
// Filters
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => task.priority == *priority,
        }
    }

    /// All -> Low -> Medium -> High -> All
    pub fn cycle(&self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Low) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High | Priority::Other) => PriorityFilter::All,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PriorityFilter::All => "All".to_string(),
            PriorityFilter::Only(priority) => priority.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// `todo` or `in-progress`
    Active,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => task.status.is_active(),
            StatusFilter::Only(status) => task.status == *status,
        }
    }

    /// All -> Active -> To do -> In progress -> Done -> All
    pub fn cycle(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Only(TaskStatus::Todo),
            StatusFilter::Only(TaskStatus::Todo) => StatusFilter::Only(TaskStatus::InProgress),
            StatusFilter::Only(TaskStatus::InProgress) => StatusFilter::Only(TaskStatus::Done),
            StatusFilter::Only(TaskStatus::Done) => StatusFilter::All,
        }
    }

    pub fn label(&self) -> String {
        match self {
            StatusFilter::All => "All".to_string(),
            StatusFilter::Active => "Active".to_string(),
            StatusFilter::Only(status) => status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    #[default]
    All,
    Only(ProjectId),
}

impl ProjectFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Only(id) => task.project_id == Some(*id),
        }
    }

    /// All -> each id in turn -> All. A stale id restarts at All.
    pub fn cycle(&self, ids: &[ProjectId]) -> Self {
        let next = match self {
            ProjectFilter::All => ids.first(),
            ProjectFilter::Only(current) => ids
                .iter()
                .position(|id| id == current)
                .and_then(|i| ids.get(i + 1)),
        };
        next.map_or(ProjectFilter::All, |id| ProjectFilter::Only(*id))
    }
}

// ============================================
// Sorting
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreationDate,
    Deadline,
    Priority,
    Title,
    LastUpdateDate,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::CreationDate,
            SortKey::Deadline,
            SortKey::Priority,
            SortKey::Title,
            SortKey::LastUpdateDate,
        ]
    }

    pub fn cycle(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|k| k == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortKey::CreationDate => "Created",
            SortKey::Deadline => "Deadline",
            SortKey::Priority => "Priority",
            SortKey::Title => "Title",
            SortKey::LastUpdateDate => "Updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggle(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Lowercase and strip Latin diacritics so `"École"` sorts next to `"ecole"`.
fn fold_title(title: &str) -> String {
    title
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            other => other,
        })
        .collect()
}

/// Board comparator.
///
/// Missing deadlines sort after every dated task in both orders. Priority
/// compares high-first and is then flipped under `Desc`, so `Desc` lists
/// low before high; boards have always behaved this way.
pub fn compare_tasks(a: &Task, b: &Task, key: SortKey, order: SortOrder) -> Ordering {
    match key {
        SortKey::CreationDate => order.apply(a.creation_date.cmp(&b.creation_date)),
        SortKey::LastUpdateDate => order.apply(a.last_activity().cmp(&b.last_activity())),
        SortKey::Deadline => match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => order.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Priority => order.apply(b.priority.rank().cmp(&a.priority.rank())),
        SortKey::Title => order.apply(fold_title(&a.title).cmp(&fold_title(&b.title))),
    }
}

/// Stable in-place sort
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, order: SortOrder) {
    tasks.sort_by(|a, b| compare_tasks(a, b, key, order));
}

// ============================================
// Kanban
// ============================================

/// Filters and ordering of the kanban board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub priority: PriorityFilter,
    pub status: StatusFilter,
    pub project: ProjectFilter,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl ViewConfig {
    pub fn matches(&self, task: &Task) -> bool {
        self.priority.matches(task) && self.status.matches(task) && self.project.matches(task)
    }

    /// Filtered and sorted copy of `tasks`
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut visible: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        sort_tasks(&mut visible, self.sort_key, self.sort_order);
        visible
    }
}

/// Visible tasks split by status, order preserved
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KanbanColumns {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl KanbanColumns {
    pub fn from_sorted(tasks: Vec<Task>) -> Self {
        let mut columns = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => columns.todo.push(task),
                TaskStatus::InProgress => columns.in_progress.push(task),
                TaskStatus::Done => columns.done.push(task),
            }
        }
        columns
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }
}

/// What the kanban board renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KanbanView {
    pub columns: KanbanColumns,
    /// Per-status counters over the unfiltered list
    pub counts: TaskCounts,
}

pub fn kanban_view(tasks: &[Task], config: &ViewConfig) -> KanbanView {
    KanbanView {
        columns: KanbanColumns::from_sorted(config.apply(tasks)),
        counts: TaskCounts::from_tasks(tasks),
    }
}

// ============================================
// Timeline
// ============================================

/// Which date places a task on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    #[default]
    Deadline,
    Creation,
    /// Deadline, falling back to the creation date
    Both,
}

impl DateField {
    pub fn date_of(&self, task: &Task) -> Option<NaiveDate> {
        let created = task.creation_date.map(|ts| ts.date());
        match self {
            DateField::Deadline => task.deadline,
            DateField::Creation => created,
            DateField::Both => task.deadline.or(created),
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            DateField::Deadline => DateField::Creation,
            DateField::Creation => DateField::Both,
            DateField::Both => DateField::Deadline,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DateField::Deadline => "Deadline",
            DateField::Creation => "Created",
            DateField::Both => "Deadline or created",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    /// Open ends default to January 1st and December 31st of the current year
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    All,
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the month `months_ahead` months after `(year, month)`
fn end_of_month(year: i32, month: u32, months_ahead: u32) -> Option<NaiveDate> {
    let index = month - 1 + months_ahead + 1;
    let next = first_of_month(year + (index / 12) as i32, index % 12 + 1)?;
    next.pred_opt()
}

/// Monday of the ISO week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl Period {
    /// Inclusive date window around `today`; `None` means unbounded
    pub fn window(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let (year, month) = (today.year(), today.month());
        match self {
            Period::Week => {
                let start = week_start(today);
                Some((start, start + Duration::days(6)))
            }
            Period::Month => Some((first_of_month(year, month)?, end_of_month(year, month, 0)?)),
            Period::Quarter => {
                let first = (month - 1) / 3 * 3 + 1;
                Some((first_of_month(year, first)?, end_of_month(year, first, 2)?))
            }
            Period::Custom { start, end } => {
                let start = match start {
                    Some(d) => *d,
                    None => first_of_month(year, 1)?,
                };
                let end = match end {
                    Some(d) => *d,
                    None => NaiveDate::from_ymd_opt(year, 12, 31)?,
                };
                Some((start, end))
            }
            Period::All => None,
        }
    }

    /// Week -> Month -> Quarter -> Custom (current year) -> All -> Week
    pub fn cycle(&self) -> Self {
        match self {
            Period::Week => Period::Month,
            Period::Month => Period::Quarter,
            Period::Quarter => Period::Custom {
                start: None,
                end: None,
            },
            Period::Custom { .. } => Period::All,
            Period::All => Period::Week,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Period::Week => "This week",
            Period::Month => "This month",
            Period::Quarter => "This quarter",
            Period::Custom { .. } => "Custom",
            Period::All => "All",
        }
    }

    fn groups_by_week(&self) -> bool {
        matches!(self, Period::Week | Period::Month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketOrder {
    /// Calendar order, undated bucket last
    #[default]
    Chronological,
    /// Order in which each bucket's first task appears in the input
    FirstSeen,
}

/// Filters and grouping of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineConfig {
    pub period: Period,
    pub date_field: DateField,
    pub status: StatusFilter,
    pub project: ProjectFilter,
    pub bucket_order: BucketOrder,
}

/// One group of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBucket {
    pub label: String,
    /// First day covered by the bucket, `None` for the undated bucket
    pub start: Option<NaiveDate>,
    pub tasks: Vec<Task>,
}

pub const UNDATED_LABEL: &str = "No date";

impl TimelineConfig {
    /// Period window first, then status and project filters
    pub fn filter(&self, tasks: &[Task], today: NaiveDate) -> Vec<Task> {
        let window = self.period.window(today);
        tasks
            .iter()
            .filter(|task| match (window, self.date_field.date_of(task)) {
                (None, _) => true,
                (Some((start, end)), Some(date)) => date >= start && date <= end,
                (Some(_), None) => false,
            })
            .filter(|task| self.status.matches(task) && self.project.matches(task))
            .cloned()
            .collect()
    }

    fn bucket_key(&self, date: NaiveDate) -> (NaiveDate, String) {
        if self.period.groups_by_week() {
            let start = week_start(date);
            let end = start + Duration::days(6);
            let label = format!("{} – {}", start.format("%b %-d"), end.format("%b %-d"));
            (start, label)
        } else {
            let start = date.with_day(1).unwrap_or(date);
            (start, start.format("%B %Y").to_string())
        }
    }

    /// Filter, then group by week or month of the chosen date
    pub fn buckets(&self, tasks: &[Task], today: NaiveDate) -> Vec<TimelineBucket> {
        let mut buckets: Vec<TimelineBucket> = Vec::new();

        for task in self.filter(tasks, today) {
            let (start, label) = match self.date_field.date_of(&task) {
                Some(date) => {
                    let (start, label) = self.bucket_key(date);
                    (Some(start), label)
                }
                None => (None, UNDATED_LABEL.to_string()),
            };
            match buckets.iter_mut().find(|b| b.start == start) {
                Some(bucket) => bucket.tasks.push(task),
                None => buckets.push(TimelineBucket {
                    label,
                    start,
                    tasks: vec![task],
                }),
            }
        }

        let field = self.date_field;
        for bucket in &mut buckets {
            bucket.tasks.sort_by_key(|t| field.date_of(t));
        }

        if self.bucket_order == BucketOrder::Chronological {
            buckets.sort_by(|a, b| match (a.start, b.start) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        buckets
    }
}

/// Timeline header counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineStats {
    pub total: usize,
    pub upcoming: usize,
    pub overdue: usize,
    pub done: usize,
}

impl TimelineStats {
    /// Undated unfinished tasks count toward the total only
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            if task.status == TaskStatus::Done {
                stats.done += 1;
            } else if let Some(deadline) = task.deadline {
                if deadline < today {
                    stats.overdue += 1;
                } else {
                    stats.upcoming += 1;
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64) -> Task {
        NewTask {
            title: format!("Task {id}"),
            project_id: Some(1),
            ..NewTask::default()
        }
        .into_task(id)
    }

    fn with_deadline(id: i64, deadline: Option<NaiveDate>) -> Task {
        Task {
            deadline,
            ..task(id)
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_project_filter_cycle() {
        let ids = [4, 9];
        let filter = ProjectFilter::All.cycle(&ids);
        assert_eq!(filter, ProjectFilter::Only(4));
        assert_eq!(filter.cycle(&ids), ProjectFilter::Only(9));
        assert_eq!(ProjectFilter::Only(9).cycle(&ids), ProjectFilter::All);
        assert_eq!(ProjectFilter::Only(7).cycle(&ids), ProjectFilter::All);
        assert_eq!(ProjectFilter::All.cycle(&[]), ProjectFilter::All);
    }

    #[test]
    fn test_deadline_sort_puts_undated_last_in_both_orders() {
        let mut tasks = vec![
            with_deadline(1, None),
            with_deadline(2, Some(date(2025, 3, 10))),
            with_deadline(3, Some(date(2025, 3, 1))),
        ];
        sort_tasks(&mut tasks, SortKey::Deadline, SortOrder::Asc);
        assert_eq!(ids(&tasks), vec![3, 2, 1]);

        sort_tasks(&mut tasks, SortKey::Deadline, SortOrder::Desc);
        assert_eq!(ids(&tasks), vec![2, 3, 1]);
    }

    #[test]
    fn test_priority_desc_lists_low_first() {
        let mut tasks = vec![task(1), task(2), task(3)];
        tasks[0].priority = Priority::Low;
        tasks[1].priority = Priority::High;
        tasks[2].priority = Priority::Medium;
        sort_tasks(&mut tasks, SortKey::Priority, SortOrder::Desc);
        assert_eq!(ids(&tasks), vec![1, 3, 2]);

        sort_tasks(&mut tasks, SortKey::Priority, SortOrder::Asc);
        assert_eq!(ids(&tasks), vec![2, 3, 1]);
    }

    #[test]
    fn test_title_sort_ignores_case_and_accents() {
        let mut tasks = vec![task(1), task(2), task(3)];
        tasks[0].title = "zeta".to_string();
        tasks[1].title = "École".to_string();
        tasks[2].title = "alpha".to_string();
        sort_tasks(&mut tasks, SortKey::Title, SortOrder::Asc);
        assert_eq!(ids(&tasks), vec![3, 2, 1]);
    }

    #[test]
    fn test_last_update_falls_back_to_creation() {
        let mut tasks = vec![task(1), task(2)];
        tasks[0].creation_date = date(2025, 1, 5).and_hms_opt(0, 0, 0);
        tasks[1].creation_date = date(2025, 1, 1).and_hms_opt(0, 0, 0);
        tasks[1].last_update_date = date(2025, 1, 9).and_hms_opt(0, 0, 0);
        sort_tasks(&mut tasks, SortKey::LastUpdateDate, SortOrder::Desc);
        assert_eq!(ids(&tasks), vec![2, 1]);
    }

    #[test]
    fn test_active_filter_is_todo_and_in_progress() {
        let mut tasks = vec![task(1), task(2), task(3)];
        tasks[1].status = TaskStatus::InProgress;
        tasks[2].status = TaskStatus::Done;
        let config = ViewConfig {
            status: StatusFilter::Active,
            sort_order: SortOrder::Asc,
            sort_key: SortKey::Title,
            ..ViewConfig::default()
        };
        assert_eq!(ids(&config.apply(&tasks)), vec![1, 2]);
    }

    #[test]
    fn test_kanban_counts_ignore_filters() {
        let mut tasks = vec![task(1), task(2), task(3)];
        tasks[0].priority = Priority::High;
        tasks[2].status = TaskStatus::Done;
        let config = ViewConfig {
            priority: PriorityFilter::Only(Priority::High),
            ..ViewConfig::default()
        };
        let view = kanban_view(&tasks, &config);
        assert_eq!(ids(&view.columns.todo), vec![1]);
        assert!(view.columns.done.is_empty());
        assert_eq!(view.counts.total, 3);
        assert_eq!(view.counts.done, 1);
    }

    #[test]
    fn test_period_windows() {
        // Wednesday
        let today = date(2025, 5, 14);
        assert_eq!(
            Period::Week.window(today),
            Some((date(2025, 5, 12), date(2025, 5, 18)))
        );
        assert_eq!(
            Period::Month.window(today),
            Some((date(2025, 5, 1), date(2025, 5, 31)))
        );
        assert_eq!(
            Period::Quarter.window(today),
            Some((date(2025, 4, 1), date(2025, 6, 30)))
        );
        assert_eq!(
            Period::Quarter.window(date(2025, 11, 2)),
            Some((date(2025, 10, 1), date(2025, 12, 31)))
        );
        assert_eq!(
            Period::Custom { start: None, end: Some(date(2025, 2, 1)) }.window(today),
            Some((date(2025, 1, 1), date(2025, 2, 1)))
        );
        assert_eq!(Period::All.window(today), None);
    }

    #[test]
    fn test_period_cycle_passes_through_custom() {
        let mut period = Period::Week;
        let mut seen = Vec::new();
        for _ in 0..5 {
            period = period.cycle();
            seen.push(period.name());
        }
        assert_eq!(
            seen,
            vec!["This month", "This quarter", "Custom", "All", "This week"]
        );
    }

    #[test]
    fn test_week_filter_uses_chosen_date_only() {
        let today = date(2025, 5, 14);
        let mut outside = with_deadline(1, Some(date(2025, 5, 30)));
        outside.creation_date = today.and_hms_opt(9, 0, 0);
        let inside = with_deadline(2, Some(date(2025, 5, 16)));
        let undated = with_deadline(3, None);

        let config = TimelineConfig {
            period: Period::Week,
            date_field: DateField::Deadline,
            ..TimelineConfig::default()
        };
        let kept = config.filter(&[outside.clone(), inside, undated], today);
        assert_eq!(ids(&kept), vec![2]);

        let by_creation = TimelineConfig {
            date_field: DateField::Creation,
            ..config
        };
        assert_eq!(ids(&by_creation.filter(&[outside], today)), vec![1]);
    }

    #[test]
    fn test_buckets_chronological_and_first_seen() {
        let today = date(2025, 5, 14);
        let tasks = vec![
            with_deadline(1, Some(date(2025, 7, 3))),
            with_deadline(2, Some(date(2025, 5, 20))),
            with_deadline(3, Some(date(2025, 7, 1))),
            with_deadline(4, None),
        ];
        let config = TimelineConfig {
            period: Period::All,
            ..TimelineConfig::default()
        };

        let buckets = config.buckets(&tasks, today);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["May 2025", "July 2025", UNDATED_LABEL]);
        assert_eq!(ids(&buckets[1].tasks), vec![3, 1]);

        let legacy = TimelineConfig {
            bucket_order: BucketOrder::FirstSeen,
            ..config
        };
        let labels: Vec<String> = legacy
            .buckets(&tasks, today)
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(labels, vec!["July 2025", "May 2025", UNDATED_LABEL]);
    }

    #[test]
    fn test_month_period_groups_by_week() {
        let today = date(2025, 5, 14);
        let tasks = vec![
            with_deadline(1, Some(date(2025, 5, 14))),
            with_deadline(2, Some(date(2025, 5, 12))),
            with_deadline(3, Some(date(2025, 5, 5))),
        ];
        let buckets = TimelineConfig::default().buckets(&tasks, today);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "May 5 – May 11");
        assert_eq!(buckets[1].label, "May 12 – May 18");
        assert_eq!(ids(&buckets[1].tasks), vec![2, 1]);
    }

    #[test]
    fn test_timeline_stats() {
        let today = date(2025, 5, 14);
        let mut tasks = vec![
            with_deadline(1, Some(date(2025, 5, 1))),
            with_deadline(2, Some(date(2025, 5, 20))),
            with_deadline(3, Some(date(2025, 5, 1))),
            with_deadline(4, None),
        ];
        tasks[2].status = TaskStatus::Done;
        let stats = TimelineStats::from_tasks(&tasks, today);
        assert_eq!(
            stats,
            TimelineStats {
                total: 4,
                upcoming: 1,
                overdue: 1,
                done: 1
            }
        );
    }
}
