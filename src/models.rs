use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Record ids ────────────────────────────────────────────────

/// Record id: the creation time in milliseconds since the Unix epoch.
///
/// Ids historically reached the data layer both as numbers and as strings
/// (form inputs, route params), so deserialization accepts either shape.
/// Everything past this boundary works with the canonical integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Id for a record created now, bumped past `taken` ids so that two
    /// creations within the same millisecond still get distinct ids.
    pub fn next(taken: impl Fn(RecordId) -> bool) -> RecordId {
        let mut id = RecordId(Utc::now().timestamp_millis());
        while taken(id) {
            id.0 += 1;
        }
        id
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        RecordId(raw)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim().parse().map(RecordId)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(RecordId(n)),
            Raw::Text(s) => s.trim().parse().map(RecordId).map_err(serde::de::Error::custom),
        }
    }
}

// ── Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        })
    }
}

/// Staff mood on a task. Stored emoji-coded, as the browser UI wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "😊")]
    Happy,
    #[serde(rename = "😐")]
    Neutral,
    #[serde(rename = "😤")]
    Frustrated,
    #[serde(rename = "🤔")]
    Thinking,
    #[serde(rename = "💪")]
    Motivated,
}

impl Mood {
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Frustrated => "😤",
            Mood::Thinking => "🤔",
            Mood::Motivated => "💪",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
            Mood::Frustrated => "Frustrated",
            Mood::Thinking => "Thinking",
            Mood::Motivated => "Motivated",
        }
    }
}

// ── Records ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub username: String,
    /// Argon2 hash, never the plaintext password.
    pub password_hash: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task. `assigned_to` is a weak reference: deleting the user leaves the
/// id dangling and readers render it as unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub text: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
