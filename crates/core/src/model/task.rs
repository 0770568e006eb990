use chrono::NaiveDate;

use crate::model::ids::{SalesPersonId, SchoolId, TaskId};
use crate::model::validation::{DraftErrors, normalize_optional, trimmed};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Unknown or missing values read as pending.
    #[must_use]
    pub fn from_wire(raw: Option<&str>) -> Self {
        Self::parse(raw.unwrap_or_default()).unwrap_or_default()
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// The sales team member a task is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignee {
    pub id: SalesPersonId,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskComment {
    pub author: String,
    pub text: String,
    pub posted_at: String,
}

/// A task an admin assigned to a sales team member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assigned_by: String,
    pub assigned_to: TaskAssignee,
    pub assigned_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub comments: Vec<TaskComment>,
    pub school_id: Option<SchoolId>,
    pub school_name: Option<String>,
}

impl Task {
    /// Past due and not completed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < today)
    }

    /// The task with `update` applied. A blank comment adds nothing.
    #[must_use]
    pub fn with_update(&self, update: &TaskUpdate, author: &str, posted_at: &str) -> Self {
        let mut next = self.clone();
        next.status = update.status;
        if update.priority.is_some() {
            next.priority = update.priority;
        }
        let comment = update.comment.trim();
        if !comment.is_empty() {
            next.comments.push(TaskComment {
                author: author.to_string(),
                text: comment.to_string(),
                posted_at: posted_at.to_string(),
            });
        }
        next
    }
}

/// Status dropdown above the task list. `None` shows every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
    }

    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Per-task edit row: status, priority and a new comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub comment: String,
}

/// Assign-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assignee: Option<SalesPersonId>,
    pub due_date: String,
    pub priority: TaskPriority,
    pub school_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub assignee: SalesPersonId,
    pub assigned_by: String,
    pub assigned_date: NaiveDate,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub school_name: Option<String>,
}

impl TaskDraft {
    /// New tasks start pending, assigned by `assigned_by` on `assigned_on`.
    ///
    /// # Errors
    ///
    /// Returns a missing title or assignee and a missing or unparseable due
    /// date.
    pub fn validate(
        self,
        assigned_by: &str,
        assigned_on: NaiveDate,
    ) -> Result<ValidTask, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("title", "Title", &self.title);
        if self.assignee.is_none() {
            errors.push("assignee", "Please select a salesman");
        }
        errors.require("due_date", "Due date", &self.due_date);
        let due_date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok();
        if due_date.is_none() && !self.due_date.trim().is_empty() {
            errors.push("due_date", "Due date must be a valid date");
        }

        match (self.assignee, due_date) {
            (Some(assignee), Some(due_date)) if errors.is_empty() => Ok(ValidTask {
                title: trimmed(&self.title),
                description: trimmed(&self.description),
                assignee,
                assigned_by: assigned_by.to_string(),
                assigned_date: assigned_on,
                due_date,
                priority: self.priority,
                status: TaskStatus::Pending,
                school_name: normalize_optional(Some(self.school_name)),
            }),
            _ => Err(errors),
        }
    }
}

impl ValidTask {
    #[must_use]
    pub fn into_task(self, id: TaskId, assigned_to: TaskAssignee) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            assigned_by: self.assigned_by,
            assigned_to,
            assigned_date: Some(self.assigned_date),
            due_date: Some(self.due_date),
            priority: Some(self.priority),
            status: self.status,
            comments: Vec::new(),
            school_id: None,
            school_name: self.school_name,
        }
    }
}
