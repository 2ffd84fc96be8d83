use chrono::{DateTime, Duration, Utc};

use super::types::{Task, TaskPriority};

/// How close a due time has to be before an open task counts as urgent.
pub fn urgent_window() -> Duration {
    Duration::minutes(10)
}

/// True when the task's due time has already passed.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status.is_open() && task.due < now
}

/// True when the task falls due within the urgent window.
pub fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    task.status.is_open() && task.due <= now + urgent_window()
}

/// Urgency rule used by dashboards: an open task is urgent when it is due
/// within the window (or already overdue) or carries urgent priority.
pub fn is_urgent(task: &Task, now: DateTime<Utc>) -> bool {
    task.status.is_open()
        && (task.due <= now + urgent_window() || task.priority == TaskPriority::Urgent)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clinical::{NewTask, TaskStatus, TaskType};

    fn task_due_at(due: DateTime<Utc>, priority: TaskPriority) -> Task {
        Task::new(NewTask {
            patient_id: "p1".to_string(),
            title: "Check vitals".to_string(),
            task_type: TaskType::Assessment,
            due,
            assignee_id: "n1".to_string(),
            priority: Some(priority),
            recurring: false,
            details: None,
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_due_inside_window_is_urgent() {
        let task = task_due_at(now() + Duration::minutes(5), TaskPriority::Low);
        assert!(is_urgent(&task, now()));
        assert!(is_due_soon(&task, now()));
        assert!(!is_overdue(&task, now()));
    }

    #[test]
    fn test_due_outside_window_is_not_urgent() {
        let task = task_due_at(now() + Duration::minutes(11), TaskPriority::High);
        assert!(!is_urgent(&task, now()));
    }

    #[test]
    fn test_urgent_priority_always_urgent() {
        let task = task_due_at(now() + Duration::hours(6), TaskPriority::Urgent);
        assert!(is_urgent(&task, now()));
    }

    #[test]
    fn test_overdue_task_is_urgent() {
        let task = task_due_at(now() - Duration::minutes(1), TaskPriority::Low);
        assert!(is_overdue(&task, now()));
        assert!(is_urgent(&task, now()));
    }

    #[test]
    fn test_closed_tasks_never_urgent() {
        let mut task = task_due_at(now() - Duration::hours(1), TaskPriority::Urgent);
        task.status = TaskStatus::Done;
        assert!(!is_urgent(&task, now()));
        assert!(!is_overdue(&task, now()));
    }
}
