//! Authentication facade and session.
//!
//! A toy credential check over the users collection — linear scan, no
//! lockout, no rate limiting. Passwords are stored as argon2 hashes; the
//! plaintext never leaves this module. The session is an explicit object
//! with a load/save/clear lifecycle, persisted under its own key outside
//! the collection prefix.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use thiserror::Error;

use crate::models::{RecordId, Role, User};
use crate::records::{NewUser, RecordStore, UserPatch};
use crate::store::KvStore;

/// Session key, deliberately outside `DB_PREFIX`.
pub const SESSION_KEY: &str = "loggedInUser";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("A user with this email or username already exists.")]
    DuplicateUser,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("User not found")]
    UserNotFound,
    #[error("Current password is incorrect.")]
    WrongPassword,
    #[error("Failed to delete user")]
    DeleteFailed,
}

// ── Password hashing ──────────────────────────────────────────

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .unwrap_or_default()
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ── Session ───────────────────────────────────────────────────

/// The current logged-in user, mirrored to storage so a reload resumes it.
pub struct Session {
    kv: KvStore,
    current: Option<User>,
}

impl Session {
    pub fn new(kv: KvStore) -> Self {
        Session { kv, current: None }
    }

    /// Resume a persisted session, revalidating it against the live users
    /// collection by id and email. A stale or orphaned session is dropped.
    pub fn load(&mut self, store: &RecordStore) {
        let Some(stored) = self.kv.get::<User>(SESSION_KEY) else {
            self.current = None;
            return;
        };

        let live = store
            .users()
            .into_iter()
            .find(|u| u.id == stored.id && u.email == stored.email);

        match live {
            Some(user) => {
                // Refresh the persisted copy with the live record
                self.kv.set(SESSION_KEY, &user);
                self.current = Some(user);
            }
            None => {
                tracing::debug!("stored session no longer matches a live user, dropping it");
                self.kv.remove(SESSION_KEY);
                self.current = None;
            }
        }
    }

    pub fn save(&mut self, user: User) -> bool {
        let persisted = self.kv.set(SESSION_KEY, &user);
        self.current = Some(user);
        persisted
    }

    pub fn clear(&mut self) {
        self.kv.remove(SESSION_KEY);
        self.current = None;
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }
}

// ── Request shapes ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AddUserRequest {
    pub email: String,
    /// Defaults to the email local-part when absent.
    pub username: Option<String>,
    pub password: String,
    pub phone: String,
    pub role: Role,
}

// ── The facade ────────────────────────────────────────────────

pub struct AuthService {
    store: RecordStore,
    session: Session,
}

impl AuthService {
    /// Wrap a record store and resume any persisted session.
    pub fn new(store: RecordStore) -> Self {
        let mut session = Session::new(store.kv().clone());
        session.load(&store);
        AuthService { store, session }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    pub fn users(&self) -> Vec<User> {
        self.store.users()
    }

    /// Exact-email scan plus hash verification. Success stores the session.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .users()
            .into_iter()
            .find(|u| u.email == email && verify_password(password, &u.password_hash))
            .ok_or(AuthError::InvalidCredentials)?;

        self.session.save(user.clone());
        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(user)
    }

    /// Clear the session. Navigation back to the root route is the UI's job.
    pub fn logout(&mut self) {
        self.session.clear();
    }

    pub fn add_user(&self, request: AddUserRequest) -> Result<User, AuthError> {
        if request.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let username = match request.username {
            Some(name) if !name.trim().is_empty() => name,
            _ => request
                .email
                .split('@')
                .next()
                .unwrap_or(&request.email)
                .to_string(),
        };

        // Case-sensitive exact match, checked here rather than enforced by
        // the store
        let duplicate = self
            .store
            .users()
            .iter()
            .any(|u| u.email == request.email || u.username == username);
        if duplicate {
            return Err(AuthError::DuplicateUser);
        }

        Ok(self.store.insert_user(NewUser {
            email: request.email,
            username,
            password_hash: hash_password(&request.password),
            phone: request.phone,
            role: request.role,
        }))
    }

    /// Update a user; when the target is the session user, the in-memory
    /// and persisted session copies follow.
    pub fn update_user(&mut self, id: RecordId, patch: UserPatch) -> Result<User, AuthError> {
        let updated = self
            .store
            .update_user(id, patch)
            .ok_or(AuthError::UserNotFound)?;

        if self.session.current().is_some_and(|u| u.id == id) {
            self.session.save(updated.clone());
        }
        Ok(updated)
    }

    pub fn change_password(
        &mut self,
        id: RecordId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        if new.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        let user = self.store.find_user(id).ok_or(AuthError::UserNotFound)?;
        if !verify_password(current, &user.password_hash) {
            return Err(AuthError::WrongPassword);
        }

        self.update_user(
            id,
            UserPatch {
                password_hash: Some(hash_password(new)),
                ..UserPatch::default()
            },
        )?;
        Ok(())
    }

    /// Remove a user. Their tasks keep the dangling assignment; warning the
    /// admin about orphans is the UI's job.
    pub fn remove_user(&self, id: RecordId) -> Result<(), AuthError> {
        if self.store.delete_user(id) {
            Ok(())
        } else {
            Err(AuthError::DeleteFailed)
        }
    }
}
