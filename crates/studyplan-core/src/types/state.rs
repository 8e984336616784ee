//! State snapshot types.
//!
//! [`AppState`] is the in-memory snapshot handed to readers and subscribers;
//! [`PersistedState`] is the blob written under the `<prefix>State` key, with
//! UI state restricted to the persisted subset.

use serde::{Deserialize, Serialize};

use super::settings::Settings;
use super::task::Task;
use super::ui::{UiPrefs, UiState};

/// Full in-memory state of the planner at a given point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// All tasks, in store order.
    pub tasks: Vec<Task>,
    /// Current settings.
    pub settings: Settings,
    /// Current UI state, including transient fields.
    pub ui: UiState,
}

/// The durable state blob.
///
/// Carries `#[serde(default)]` on every section so a partially damaged or
/// older blob still loads, with missing sections filled from defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    /// All tasks.
    pub tasks: Vec<Task>,
    /// Settings.
    pub settings: Settings,
    /// Persisted UI preferences.
    pub ui: UiPrefs,
}

impl AppState {
    /// Reduce to the durable subset (transient UI fields dropped).
    #[must_use]
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.clone(),
            settings: self.settings.clone(),
            ui: self.ui.prefs(),
        }
    }
}

impl PersistedState {
    /// Expand into a live state, transient UI fields reset.
    #[must_use]
    pub fn into_app_state(self) -> AppState {
        AppState {
            tasks: self.tasks,
            settings: self.settings,
            ui: UiState::from_prefs(self.ui),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
