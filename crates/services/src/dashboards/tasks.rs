use std::sync::Arc;

use chrono::NaiveDate;
use olympiad_core::model::{Capability, SessionUser, Task, TaskDraft, TaskUpdate};
use olympiad_core::Clock;
use storage::repository::TaskRepository;
use tracing::{debug, info};

use super::authorize;
use crate::error::DashboardError;

/// Comment timestamps as shown on the task cards.
const COMMENT_TIME_FORMAT: &str = "%d/%m/%Y, %I:%M %p";

/// Tasks admins hand to the sales team.
///
/// Status, priority and comment edits are not sent to the backend; callers
/// patch their list with the returned task.
#[derive(Clone)]
pub struct TaskService {
    clock: Clock,
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    #[must_use]
    pub fn new(clock: Clock, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { clock, tasks }
    }

    /// Admins see every task, sales users only their own.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<Task>, DashboardError> {
        authorize(viewer, Capability::ViewTasks, "You do not have access to tasks")?;
        let tasks = self.tasks.list_tasks().await?;
        if viewer.allows(Capability::AssignTasks) {
            return Ok(tasks);
        }
        Ok(tasks.into_iter().filter(|task| is_assignee(viewer, task)).collect())
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn assign(
        &self,
        viewer: &SessionUser,
        draft: TaskDraft,
    ) -> Result<Task, DashboardError> {
        authorize(viewer, Capability::AssignTasks, "Only admins can assign tasks")?;
        let valid = draft.validate(viewer.name(), self.clock.now().date_naive())?;
        let task = self.tasks.assign_task(&valid).await?;
        info!(task_id = %task.id, assignee = %task.assigned_to.id, "task assigned");
        Ok(task)
    }

    /// Apply a status, priority or comment edit locally.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` when a sales user edits someone
    /// else's task or changes a priority.
    pub fn apply_update(
        &self,
        viewer: &SessionUser,
        task: &Task,
        update: &TaskUpdate,
    ) -> Result<Task, DashboardError> {
        authorize(viewer, Capability::ViewTasks, "You do not have access to tasks")?;
        if !viewer.allows(Capability::AssignTasks) {
            if !is_assignee(viewer, task) {
                return Err(DashboardError::Forbidden("You can only update your own tasks"));
            }
            if update.priority.is_some_and(|priority| task.priority != Some(priority)) {
                return Err(DashboardError::Forbidden("Only admins can change task priority"));
            }
        }
        let posted_at = self.clock.now().format(COMMENT_TIME_FORMAT).to_string();
        let next = task.with_update(update, viewer.name(), &posted_at);
        debug!(task_id = %next.id, status = next.status.as_str(), "task updated locally");
        Ok(next)
    }

    /// Today on the service clock, for overdue badges.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}

fn is_assignee(viewer: &SessionUser, task: &Task) -> bool {
    task.assigned_to.id.value() == viewer.id().value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympiad_core::model::{
        Role, SalesPersonId, TaskAssignee, TaskId, TaskPriority, TaskStatus, UserId,
    };
    use olympiad_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> TaskService {
        TaskService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    fn task_for(assignee: u64) -> Task {
        TaskDraft {
            title: "Visit DPS".into(),
            assignee: Some(SalesPersonId::new(assignee)),
            due_date: "2023-11-20".into(),
            ..TaskDraft::default()
        }
        .validate("Admin", fixed_clock().now().date_naive())
        .unwrap()
        .into_task(TaskId::new("t1"), TaskAssignee {
            id: SalesPersonId::new(assignee),
            name: "Ravi".into(),
            email: None,
        })
    }

    #[test]
    fn sales_user_updates_own_task_without_priority() {
        let sales = SessionUser::new(UserId::new(4), "Ravi", "r@x.in", Role::Salesman);
        let update = TaskUpdate {
            status: TaskStatus::Completed,
            priority: None,
            comment: "Signed up".into(),
        };
        let next = service().apply_update(&sales, &task_for(4), &update).unwrap();
        assert_eq!(next.status, TaskStatus::Completed);
        assert_eq!(next.comments[0].author, "Ravi");
        assert_eq!(next.comments[0].posted_at, "14/11/2023, 10:13 PM");

        let raise = TaskUpdate {
            priority: Some(TaskPriority::High),
            ..update.clone()
        };
        assert_eq!(
            service().apply_update(&sales, &task_for(4), &raise),
            Err(DashboardError::Forbidden("Only admins can change task priority"))
        );
        assert!(service().apply_update(&sales, &task_for(9), &update).is_err());
    }

    #[test]
    fn admin_may_change_priority_on_any_task() {
        let admin = SessionUser::new(UserId::new(1), "Admin", "a@x.in", Role::Admin);
        let update = TaskUpdate {
            status: TaskStatus::InProgress,
            priority: Some(TaskPriority::Low),
            comment: String::new(),
        };
        let next = service().apply_update(&admin, &task_for(9), &update).unwrap();
        assert_eq!(next.priority, Some(TaskPriority::Low));
        assert!(next.comments.is_empty());
    }
}
