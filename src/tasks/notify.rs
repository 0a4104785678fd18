//! Derived views over a collection snapshot: aggregate counters and
//! due-date notification strings. Nothing here is stored or delivered;
//! both are recomputed from scratch on every call.

use chrono::{Duration, Utc};
use serde::Serialize;

use super::Task;

/// Aggregate counters for one client's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let now = Utc::now();
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    let overdue_tasks = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date.is_some_and(|due| due < now))
        .count();
    TaskStats {
        total_tasks,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        overdue_tasks,
    }
}

/// One message per incomplete task with a due date, in collection order:
/// overdue if the date has passed, due-soon if it is less than an hour out.
pub fn due_notifications(tasks: &[Task]) -> Vec<String> {
    let now = Utc::now();
    let mut notifications = Vec::new();
    for task in tasks {
        if task.completed {
            continue;
        }
        let Some(due) = task.due_date else {
            continue;
        };
        if now > due {
            notifications.push(format!(
                "Task '{}' (ID: {}) is overdue.",
                task.title, task.id
            ));
        } else if due - now < Duration::hours(1) {
            notifications.push(format!(
                "Task '{}' (ID: {}) is due in less than 1 hour.",
                task.title, task.id
            ));
        }
    }
    notifications
}
