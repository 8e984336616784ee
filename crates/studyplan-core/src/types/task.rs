//! The [`Task`] record and its mutation parameter types.

use serde::{Deserialize, Serialize};

/// Completion status of a task.
///
/// Serialized capitalized (`"Pending"` / `"Complete"`) to match the stored
/// wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not yet done.
    #[default]
    Pending,
    /// Done.
    Complete,
}

impl TaskStatus {
    /// Wire string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
        }
    }

    /// The opposite status (used by the toggle operation).
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Complete,
            Self::Complete => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Complete" => Ok(Self::Complete),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// A planning entry.
///
/// Exclusively owned by the task store; every persisted `Task` satisfies the
/// validation rules in [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique id, minted on creation (`task_<epochMs>_<base36>`).
    pub id: String,
    /// Non-empty title with no surrounding whitespace.
    pub title: String,
    /// Calendar due date, `YYYY-MM-DD`, day granularity.
    pub due_date: String,
    /// Estimated duration in minutes, `0..=1440`, up to 2 decimal places.
    pub duration: f64,
    /// Category tag, non-empty, at most 50 characters.
    pub tag: String,
    /// Completion status.
    pub status: TaskStatus,
    /// RFC 3339 creation timestamp, immutable after creation.
    pub created_at: String,
    /// RFC 3339 last-modified timestamp, refreshed on every field change.
    pub updated_at: String,
}

/// Parameters for creating a task.
///
/// Omitted fields are filled with defaults: `status` becomes `Pending`,
/// `tag` becomes the configured default tag, `duration` becomes 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDraft {
    /// Task title (required).
    pub title: String,
    /// Due date, `YYYY-MM-DD` (required).
    pub due_date: String,
    /// Estimated duration in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Category tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Initial status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskDraft {
    /// Convenience constructor for the two required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: due_date.into(),
            ..Self::default()
        }
    }
}

/// Parameters for updating a task. Every field is optional; unset fields
/// are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// New duration in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// New tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.duration.is_none()
            && self.tag.is_none()
            && self.status.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
