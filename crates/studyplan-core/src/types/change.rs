//! The [`ChangeRecord`] broadcast to subscribers after every mutation.

use serde::{Deserialize, Serialize};

use super::import::ImportSummary;
use super::settings::Settings;
use super::task::Task;
use super::ui::UiState;

/// Tagged description of a completed mutation.
///
/// Delivered to subscribers together with a fresh state snapshot. The serde
/// representation uses a `type` tag with the historical SCREAMING_SNAKE
/// names so recorded change streams stay wire compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeRecord {
    /// A task was created.
    #[serde(rename = "TASK_ADDED")]
    TaskAdded {
        /// The new task.
        task: Task,
    },

    /// A task was modified.
    #[serde(rename = "TASK_UPDATED")]
    TaskUpdated {
        /// The task after the update.
        task: Task,
    },

    /// A task was removed.
    #[serde(rename = "TASK_DELETED")]
    TaskDeleted {
        /// The task as it was at deletion time.
        task: Task,
    },

    /// Settings were changed.
    #[serde(rename = "SETTINGS_UPDATED")]
    SettingsUpdated {
        /// Snapshot before the change.
        previous: Settings,
        /// Snapshot after the change.
        next: Settings,
    },

    /// UI state was changed.
    #[serde(rename = "UI_STATE_UPDATED")]
    UiStateUpdated {
        /// UI state after the change.
        ui: UiState,
    },

    /// The whole state was cleared or replaced wholesale.
    #[serde(rename = "STATE_RESET")]
    StateReset,

    /// An import was applied.
    #[serde(rename = "DATA_IMPORTED")]
    DataImported {
        /// Outcome summary.
        summary: ImportSummary,
    },

    /// Initialization finished; the hub is ready.
    #[serde(rename = "STATE_INITIALIZED")]
    StateInitialized {
        /// Whether the bundled seed data was adopted.
        seeded: bool,
    },
}

impl ChangeRecord {
    /// The wire tag of this record.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskAdded { .. } => "TASK_ADDED",
            Self::TaskUpdated { .. } => "TASK_UPDATED",
            Self::TaskDeleted { .. } => "TASK_DELETED",
            Self::SettingsUpdated { .. } => "SETTINGS_UPDATED",
            Self::UiStateUpdated { .. } => "UI_STATE_UPDATED",
            Self::StateReset => "STATE_RESET",
            Self::DataImported { .. } => "DATA_IMPORTED",
            Self::StateInitialized { .. } => "STATE_INITIALIZED",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
