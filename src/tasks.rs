//! Task facade: UI intents over the record store, plus the computed views.
//!
//! Stats and overdue listings are recomputed from the full collection on
//! every call — the Overdue derivation is a view and must never be cached
//! across mutations.

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::models::{Mood, RecordId, Task, TaskStatus};
use crate::records::{NewTask, RecordStore, TaskPatch};
use crate::status::is_overdue_on;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task description is required")]
    MissingText,
    #[error("Due date is required")]
    MissingDueDate,
    #[error("Task not found")]
    NotFound,
    #[error("Failed to delete task")]
    DeleteFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Derived count; a pending task past its due date appears in both
    /// `pending` and `overdue`.
    pub overdue: usize,
}

pub struct TaskService {
    store: RecordStore,
}

impl TaskService {
    pub fn new(store: RecordStore) -> Self {
        TaskService { store }
    }

    pub fn add_task(&self, new: NewTask) -> Result<Task, TaskError> {
        if new.text.trim().is_empty() {
            return Err(TaskError::MissingText);
        }
        if new.due_date.trim().is_empty() {
            return Err(TaskError::MissingDueDate);
        }
        Ok(self.store.insert_task(new))
    }

    pub fn update_task(&self, id: RecordId, patch: TaskPatch) -> Result<Task, TaskError> {
        self.store.update_task(id, patch).ok_or(TaskError::NotFound)
    }

    pub fn delete_task(&self, id: RecordId) -> Result<(), TaskError> {
        if self.store.delete_task(id) {
            Ok(())
        } else {
            Err(TaskError::DeleteFailed)
        }
    }

    /// Staff mood update: mood, remark and `mood_updated_at` move together.
    pub fn set_mood(
        &self,
        id: RecordId,
        mood: Mood,
        remark: Option<String>,
    ) -> Result<Task, TaskError> {
        self.update_task(
            id,
            TaskPatch {
                mood: Some(Some(mood)),
                mood_remark: Some(remark),
                ..TaskPatch::default()
            },
        )
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.store.tasks()
    }

    pub fn tasks_for_user(&self, user_id: RecordId) -> Vec<Task> {
        self.store.tasks_for_user(user_id)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.store
            .tasks()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn overdue_tasks(&self) -> Vec<Task> {
        self.overdue_tasks_on(Local::now().date_naive())
    }

    pub fn overdue_tasks_on(&self, today: NaiveDate) -> Vec<Task> {
        self.store
            .tasks()
            .into_iter()
            .filter(|t| is_overdue_on(t, today))
            .collect()
    }

    /// Move every task from one user to another (or unassign). Returns how
    /// many tasks moved.
    pub fn reassign_tasks(&self, old: RecordId, new: Option<RecordId>) -> usize {
        self.store.reassign_tasks(old, new)
    }

    pub fn stats(&self) -> TaskStats {
        self.stats_on(Local::now().date_naive())
    }

    pub fn stats_on(&self, today: NaiveDate) -> TaskStats {
        let tasks = self.store.tasks();
        let mut stats = TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        };
        for task in &tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            if is_overdue_on(task, today) {
                stats.overdue += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::models::{Priority, Role, User};
    use crate::records::NewUser;
    use std::fs;

    fn temp_service(name: &str) -> (TaskService, RecordStore, String) {
        let path = format!("/tmp/staffboard_tasks_{name}_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);
        let store = RecordStore::open(&path).unwrap();
        (TaskService::new(store.clone()), store, path)
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
    }

    fn draft(text: &str, due: &str) -> NewTask {
        NewTask {
            text: text.to_string(),
            due_date: due.to_string(),
            ..NewTask::default()
        }
    }

    fn staff(store: &RecordStore, email: &str) -> User {
        store.insert_user(NewUser {
            email: email.to_string(),
            username: email.split('@').next().unwrap().to_string(),
            password_hash: hash_password("p"),
            phone: String::new(),
            role: Role::Staff,
        })
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    #[test]
    fn add_task_requires_text_and_due_date() {
        let (svc, _, path) = temp_service("validate");

        assert_eq!(svc.add_task(draft("   ", "2026-09-01")), Err(TaskError::MissingText));
        assert_eq!(svc.add_task(draft("Write report", "")), Err(TaskError::MissingDueDate));

        let task = svc.add_task(draft("Write report", "2026-09-01")).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);

        cleanup(&path);
    }

    #[test]
    fn stats_count_stored_and_derived_status() {
        let (svc, _, path) = temp_service("stats");

        // Overdue-and-pending: counted in both pending and overdue
        svc.add_task(draft("late", "2020-01-01")).unwrap();
        svc.add_task(draft("on track", "2026-12-01")).unwrap();
        let done = svc
            .add_task(NewTask {
                status: Some(TaskStatus::Completed),
                ..draft("done long ago", "2020-01-01")
            })
            .unwrap();
        svc.add_task(NewTask {
            status: Some(TaskStatus::InProgress),
            ..draft("working", "2026-12-01")
        })
        .unwrap();

        let stats = svc.stats_on(today());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(done.status, TaskStatus::Completed);

        cleanup(&path);
    }

    #[test]
    fn stats_are_recomputed_after_mutations() {
        let (svc, _, path) = temp_service("recompute");

        let task = svc.add_task(draft("late", "2020-01-01")).unwrap();
        assert_eq!(svc.stats_on(today()).overdue, 1);

        svc.update_task(
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .unwrap();
        assert_eq!(svc.stats_on(today()).overdue, 0);
        assert_eq!(svc.stats_on(today()).completed, 1);

        cleanup(&path);
    }

    #[test]
    fn overdue_listing_matches_derivation() {
        let (svc, _, path) = temp_service("overdue");

        let late = svc.add_task(draft("late", "2026-08-01")).unwrap();
        svc.add_task(draft("future", "2026-09-01")).unwrap();
        svc.add_task(NewTask {
            status: Some(TaskStatus::Completed),
            ..draft("late but done", "2026-08-01")
        })
        .unwrap();

        let overdue = svc.overdue_tasks_on(today());
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, late.id);
        // The stored status was not rewritten
        assert_eq!(overdue[0].status, TaskStatus::Pending);

        cleanup(&path);
    }

    #[test]
    fn deleting_assignee_keeps_task_in_stats() {
        let (svc, store, path) = temp_service("orphan");

        let user = staff(&store, "x@example.com");
        let task = svc
            .add_task(NewTask {
                assigned_to: Some(user.id),
                ..draft("orphaned", "2026-09-01")
            })
            .unwrap();
        store.delete_user(user.id);

        let stats = svc.stats_on(today());
        assert_eq!(stats.total, 1);
        assert_eq!(svc.all_tasks()[0].assigned_to, Some(user.id));
        assert_eq!(svc.tasks_for_user(user.id)[0].id, task.id);

        cleanup(&path);
    }

    #[test]
    fn set_mood_stamps_the_triple() {
        let (svc, _, path) = temp_service("mood");

        let task = svc.add_task(draft("Review PR", "2026-09-01")).unwrap();
        let updated = svc
            .set_mood(task.id, Mood::Happy, Some("smooth sailing".to_string()))
            .unwrap();

        assert_eq!(updated.mood, Some(Mood::Happy));
        assert_eq!(updated.mood_remark.as_deref(), Some("smooth sailing"));
        assert!(updated.mood_updated_at.is_some());

        cleanup(&path);
    }

    #[test]
    fn filters_are_pure_predicates() {
        let (svc, store, path) = temp_service("filters");

        let user = staff(&store, "x@example.com");
        svc.add_task(NewTask {
            assigned_to: Some(user.id),
            status: Some(TaskStatus::InProgress),
            ..draft("mine", "2026-09-01")
        })
        .unwrap();
        svc.add_task(draft("other", "2026-09-01")).unwrap();

        assert_eq!(svc.tasks_for_user(user.id).len(), 1);
        assert_eq!(svc.tasks_by_status(TaskStatus::InProgress).len(), 1);
        assert_eq!(svc.tasks_by_status(TaskStatus::Pending).len(), 1);
        // Filtering persisted nothing
        assert_eq!(svc.all_tasks().len(), 2);

        cleanup(&path);
    }

    #[test]
    fn delete_task_not_found_is_an_error() {
        let (svc, _, path) = temp_service("delete");
        assert_eq!(svc.delete_task(RecordId(7)), Err(TaskError::DeleteFailed));
        let task = svc.add_task(draft("gone soon", "2026-09-01")).unwrap();
        assert!(svc.delete_task(task.id).is_ok());
        assert!(svc.all_tasks().is_empty());
        cleanup(&path);
    }

    #[test]
    fn update_accepts_string_ids_from_the_ui() {
        let (svc, _, path) = temp_service("stringid");

        let task = svc.add_task(draft("typed id", "2026-09-01")).unwrap();
        // UI edges carry ids as strings; they normalize at the boundary
        let id: RecordId = task.id.to_string().parse().unwrap();
        let updated = svc
            .update_task(
                id,
                TaskPatch {
                    text: Some("renamed".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.text, "renamed");

        cleanup(&path);
    }
}
