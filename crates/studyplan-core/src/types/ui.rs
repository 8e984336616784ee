//! UI state: the persisted view preferences plus transient session fields.
//!
//! Only [`UiPrefs`] is ever written to storage. The transient fields of
//! [`UiState`] (search query, selection) reset on every load and import.

use serde::{Deserialize, Serialize};

use super::settings::SortKey;

/// Filter applied to the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// No filtering.
    #[default]
    All,
    /// Only pending tasks.
    Pending,
    /// Only completed tasks.
    Completed,
    /// Tasks due today (local calendar).
    Today,
    /// Tasks due in the current local week.
    Week,
    /// Pending tasks whose due date has passed.
    Overdue,
}

/// How the search query is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Literal text (regex metacharacters escaped).
    #[default]
    Text,
    /// Raw regular expression, with substring fallback on compile errors.
    Regex,
}

/// Task list presentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Tabular list.
    #[default]
    Table,
    /// Card grid.
    Card,
}

/// The persisted subset of UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPrefs {
    /// Active task ordering.
    pub sort_by: SortKey,
    /// Active task filter.
    pub filter_by: FilterKind,
    /// Search interpretation mode.
    pub search_mode: SearchMode,
    /// Presentation mode.
    pub view_mode: ViewMode,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            sort_by: SortKey::DateNewest,
            filter_by: FilterKind::All,
            search_mode: SearchMode::Text,
            view_mode: ViewMode::Table,
        }
    }
}

/// Full UI state held by the hub: persisted preferences plus transient
/// session fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    /// Active task ordering.
    pub sort_by: SortKey,
    /// Active task filter.
    pub filter_by: FilterKind,
    /// Search interpretation mode.
    pub search_mode: SearchMode,
    /// Presentation mode.
    pub view_mode: ViewMode,
    /// Current search query (transient).
    pub search_query: String,
    /// Currently selected task ids (transient).
    pub selected_ids: Vec<String>,
}

impl UiState {
    /// Build a fresh state from persisted preferences, transient fields reset.
    #[must_use]
    pub fn from_prefs(prefs: UiPrefs) -> Self {
        Self {
            sort_by: prefs.sort_by,
            filter_by: prefs.filter_by,
            search_mode: prefs.search_mode,
            view_mode: prefs.view_mode,
            search_query: String::new(),
            selected_ids: Vec::new(),
        }
    }

    /// Extract the persisted subset.
    #[must_use]
    pub fn prefs(&self) -> UiPrefs {
        UiPrefs {
            sort_by: self.sort_by,
            filter_by: self.filter_by,
            search_mode: self.search_mode,
            view_mode: self.view_mode,
        }
    }
}

/// Partial update for [`UiState`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPatch {
    /// New task ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
    /// New task filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<FilterKind>,
    /// New search mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    /// New presentation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    /// New search query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// New selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_ids: Option<Vec<String>>,
}

impl UiState {
    /// Return `(next, persisted_changed)`: the patched state and whether any
    /// field of the persisted subset changed (which decides whether the hub
    /// writes to storage).
    #[must_use]
    pub fn with_patch(&self, patch: &UiPatch) -> (Self, bool) {
        let mut next = self.clone();
        if let Some(v) = patch.sort_by {
            next.sort_by = v;
        }
        if let Some(v) = patch.filter_by {
            next.filter_by = v;
        }
        if let Some(v) = patch.search_mode {
            next.search_mode = v;
        }
        if let Some(v) = patch.view_mode {
            next.view_mode = v;
        }
        if let Some(ref v) = patch.search_query {
            next.search_query = v.clone();
        }
        if let Some(ref v) = patch.selected_ids {
            next.selected_ids = v.clone();
        }
        let persisted_changed = next.prefs() != self.prefs();
        (next, persisted_changed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
