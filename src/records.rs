//! The record store: Users and Tasks collections over the key-value store.
//!
//! Collections live whole under prefixed keys (`sms_db_users`,
//! `sms_db_tasks`) and are re-read from storage on every operation — the
//! storage file is the runtime truth, there is no cache to invalidate.
//! Deleting a user never touches their tasks; `assigned_to` is a weak
//! reference and readers tolerate dangling ids.

use chrono::Utc;

use crate::auth::hash_password;
use crate::models::{Mood, Priority, RecordId, Role, Task, TaskStatus, User};
use crate::store::{KvStore, StoreError};

/// Namespace prefix for collection keys, kept from the original deployment
/// so an existing data file keeps working.
pub const DB_PREFIX: &str = "sms_db_";

const USERS_KEY: &str = "users";
const TASKS_KEY: &str = "tasks";

/// Fixed demo credentials seeded on first run.
pub const SEED_ADMIN_EMAIL: &str = "admin@staffboard.local";
pub const SEED_ADMIN_USERNAME: &str = "Admin";
pub const SEED_ADMIN_PASSWORD: &str = "admin";
const SEED_ADMIN_ID: RecordId = RecordId(1);

fn db_key(key: &str) -> String {
    format!("{DB_PREFIX}{key}")
}

// ── Drafts and patches ────────────────────────────────────────

/// Fields for a user about to be created. The password arrives already
/// hashed — the auth facade owns the plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    pub due_date: String,
    pub due_time: Option<String>,
    /// Defaults to `Medium` when absent.
    pub priority: Option<Priority>,
    /// Defaults to `Pending` when absent.
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<RecordId>,
}

/// Shallow-merge patch: `Some` fields overwrite, `None` fields are left
/// alone.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

/// Shallow-merge patch for tasks. Nullable fields use a double `Option`:
/// the outer level is "touch this field at all", `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Option<RecordId>>,
    pub mood: Option<Option<Mood>>,
    pub mood_remark: Option<Option<String>>,
}

impl TaskPatch {
    fn apply(self, task: &mut Task) {
        if let Some(text) = self.text {
            task.text = text;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(mood) = self.mood {
            task.mood = mood;
            task.mood_updated_at = Some(Utc::now());
        }
        if let Some(remark) = self.mood_remark {
            task.mood_remark = remark;
        }
    }
}

// ── The store ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct RecordStore {
    kv: KvStore,
}

impl RecordStore {
    /// Open the store at `path` and seed it if this is the first run.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let store = RecordStore {
            kv: KvStore::open(path)?,
        };
        store.initialize();
        Ok(store)
    }

    /// Handle to the underlying key-value store (the session lives there
    /// too, outside the collection prefix).
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Seed the collections on first use. Idempotent; an unreadable
    /// collection counts as absent and is re-seeded rather than crashing.
    pub fn initialize(&self) {
        if self.kv.get::<Vec<User>>(&db_key(USERS_KEY)).is_none() {
            let now = Utc::now();
            let admin = User {
                id: SEED_ADMIN_ID,
                email: SEED_ADMIN_EMAIL.to_string(),
                username: SEED_ADMIN_USERNAME.to_string(),
                password_hash: hash_password(SEED_ADMIN_PASSWORD),
                phone: String::new(),
                role: Role::Admin,
                created_at: now,
                updated_at: now,
            };
            self.save_users(&[admin]);
            tracing::info!(email = SEED_ADMIN_EMAIL, "seeded default admin user");
        }

        if self.kv.get::<Vec<Task>>(&db_key(TASKS_KEY)).is_none() {
            self.save_tasks(&[]);
        }
    }

    // ── Users ─────────────────────────────────────────────────

    /// Fresh copy of the users collection.
    pub fn users(&self) -> Vec<User> {
        self.kv.get(&db_key(USERS_KEY)).unwrap_or_default()
    }

    pub fn save_users(&self, users: &[User]) -> bool {
        self.kv.set(&db_key(USERS_KEY), users)
    }

    pub fn insert_user(&self, new: NewUser) -> User {
        let mut users = self.users();
        let now = Utc::now();
        let user = User {
            id: RecordId::next(|id| users.iter().any(|u| u.id == id)),
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            phone: new.phone,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        self.save_users(&users);
        user
    }

    pub fn update_user(&self, id: RecordId, patch: UserPatch) -> Option<User> {
        let mut users = self.users();
        let user = users.iter_mut().find(|u| u.id == id)?;
        patch.apply(user);
        user.updated_at = Utc::now();
        let updated = user.clone();
        self.save_users(&users);
        Some(updated)
    }

    /// Remove a user. Tasks assigned to them are left untouched; their
    /// `assigned_to` now dangles and renders as unassigned.
    pub fn delete_user(&self, id: RecordId) -> bool {
        let mut users = self.users();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return false;
        }
        self.save_users(&users)
    }

    pub fn find_user(&self, id: RecordId) -> Option<User> {
        self.users().into_iter().find(|u| u.id == id)
    }

    // ── Tasks ─────────────────────────────────────────────────

    /// Fresh copy of the tasks collection.
    pub fn tasks(&self) -> Vec<Task> {
        self.kv.get(&db_key(TASKS_KEY)).unwrap_or_default()
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> bool {
        self.kv.set(&db_key(TASKS_KEY), tasks)
    }

    pub fn insert_task(&self, new: NewTask) -> Task {
        let mut tasks = self.tasks();
        let now = Utc::now();
        let task = Task {
            id: RecordId::next(|id| tasks.iter().any(|t| t.id == id)),
            text: new.text,
            due_date: new.due_date,
            due_time: new.due_time,
            priority: new.priority.unwrap_or(Priority::Medium),
            status: new.status.unwrap_or(TaskStatus::Pending),
            assigned_to: new.assigned_to,
            mood: None,
            mood_remark: None,
            mood_updated_at: None,
            created_at: now,
            updated_at: now,
        };
        tasks.push(task.clone());
        self.save_tasks(&tasks);
        task
    }

    pub fn update_task(&self, id: RecordId, patch: TaskPatch) -> Option<Task> {
        let mut tasks = self.tasks();
        let task = tasks.iter_mut().find(|t| t.id == id)?;
        patch.apply(task);
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.save_tasks(&tasks);
        Some(updated)
    }

    pub fn delete_task(&self, id: RecordId) -> bool {
        let mut tasks = self.tasks();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return false;
        }
        self.save_tasks(&tasks)
    }

    pub fn find_task(&self, id: RecordId) -> Option<Task> {
        self.tasks().into_iter().find(|t| t.id == id)
    }

    pub fn tasks_for_user(&self, user_id: RecordId) -> Vec<Task> {
        self.tasks()
            .into_iter()
            .filter(|t| t.assigned_to == Some(user_id))
            .collect()
    }

    /// Move every task assigned to `old` onto `new` (or unassign them).
    /// Returns how many tasks changed hands.
    pub fn reassign_tasks(&self, old: RecordId, new: Option<RecordId>) -> usize {
        let mut tasks = self.tasks();
        let now = Utc::now();
        let mut moved = 0;
        for task in tasks.iter_mut() {
            if task.assigned_to == Some(old) {
                task.assigned_to = new;
                task.updated_at = now;
                moved += 1;
            }
        }
        if moved > 0 {
            self.save_tasks(&tasks);
        }
        moved
    }
}
