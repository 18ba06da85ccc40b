//! staffboard — the data layer of a staff task-management tool.
//!
//! Admins create and assign tasks, staff update status and mood, and an
//! external text-generation service drafts notifications. Persistence is a
//! local key-value file (the browser-local-storage analog); everything is
//! synchronous and single-writer, so read-after-write within a session
//! always observes the latest write. Cross-process consistency is out of
//! scope.

//---------------------------------------
pub mod store;
pub mod models;
pub mod records;
//---------------------------------------

//---------------------------------------
pub mod auth;
pub mod tasks;
pub mod status;
pub mod mood;
//---------------------------------------

//---------------------------------------
pub mod ai;
//---------------------------------------

pub use auth::{AddUserRequest, AuthError, AuthService, Session};
pub use models::{Mood, Priority, RecordId, Role, Task, TaskStatus, User};
pub use records::{NewTask, NewUser, RecordStore, TaskPatch, UserPatch};
pub use status::{display_status, display_status_on, DisplayStatus};
pub use store::{KvStore, StoreError};
pub use tasks::{TaskError, TaskService, TaskStats};
