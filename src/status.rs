//! Derived display state.
//!
//! `Overdue` is a view, never a stored status: it is recomputed from
//! `status` + `due_date` on every read and nothing here writes back to the
//! store.

use chrono::{Local, NaiveDate};
use std::fmt;

use crate::models::{Priority, Task, TaskStatus};

pub const STATUSES: [TaskStatus; 3] = [
    TaskStatus::Pending,
    TaskStatus::InProgress,
    TaskStatus::Completed,
];

pub const PRIORITIES: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

/// What the UI shows for a task: the stored status, or `Overdue` when an
/// incomplete task's due date has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayStatus::Pending => "Pending",
            DisplayStatus::InProgress => "In Progress",
            DisplayStatus::Completed => "Completed",
            DisplayStatus::Overdue => "Overdue",
        })
    }
}

impl From<TaskStatus> for DisplayStatus {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => DisplayStatus::Pending,
            TaskStatus::InProgress => DisplayStatus::InProgress,
            TaskStatus::Completed => DisplayStatus::Completed,
        }
    }
}

/// Display status against the current local calendar day.
pub fn display_status(task: &Task) -> DisplayStatus {
    display_status_on(task, Local::now().date_naive())
}

/// Display status against an explicit `today` (deterministic for tests).
///
/// `Completed` always wins. Otherwise the task is `Overdue` iff its due
/// date parses and lies strictly before `today`; a due date we can't parse
/// is never overdue.
pub fn display_status_on(task: &Task, today: NaiveDate) -> DisplayStatus {
    if task.status == TaskStatus::Completed {
        return DisplayStatus::Completed;
    }
    match NaiveDate::parse_from_str(&task.due_date, "%Y-%m-%d") {
        Ok(due) if due < today => DisplayStatus::Overdue,
        _ => task.status.into(),
    }
}

pub fn is_overdue_on(task: &Task, today: NaiveDate) -> bool {
    display_status_on(task, today) == DisplayStatus::Overdue
}

// ── Badge palette ─────────────────────────────────────────────
// Classification strings consumed verbatim by the web UI.

pub fn status_badge_class(status: DisplayStatus) -> &'static str {
    match status {
        DisplayStatus::Completed => {
            "bg-green-100 text-green-800 dark:bg-green-900/50 dark:text-green-300"
        }
        DisplayStatus::InProgress => {
            "bg-yellow-100 text-yellow-800 dark:bg-yellow-900/50 dark:text-yellow-300"
        }
        DisplayStatus::Pending => {
            "bg-blue-100 text-blue-800 dark:bg-blue-900/50 dark:text-blue-300"
        }
        DisplayStatus::Overdue => "bg-red-100 text-red-800 dark:bg-red-900/50 dark:text-red-300",
    }
}

pub fn priority_badge_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "bg-red-100 text-red-800 dark:bg-red-900/50 dark:text-red-300",
        Priority::Medium => {
            "bg-orange-100 text-orange-800 dark:bg-orange-900/50 dark:text-orange-300"
        }
        Priority::Low => "bg-sky-100 text-sky-800 dark:bg-sky-900/50 dark:text-sky-300",
    }
}
