//! Import merge modes and the operation summary returned to callers.

use serde::{Deserialize, Serialize};

/// Strategy for combining imported tasks with the existing collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Keep all existing tasks; imported tasks get fresh ids on collision.
    #[default]
    Merge,
    /// Discard existing tasks and adopt the imported set.
    Replace,
    /// Concatenate without id rewriting (ids minted only when missing).
    Append,
}

impl MergeMode {
    /// Wire string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
            Self::Append => "append",
        }
    }
}

/// Result summary of an import operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Whether the import was applied.
    pub ok: bool,
    /// Number of tasks taken from the import payload.
    pub imported_tasks: usize,
    /// Task count in the store after the import.
    pub total_tasks: usize,
    /// Whether settings were applied from the payload.
    pub imported_settings: bool,
    /// Whether UI preferences were applied from the payload.
    #[serde(rename = "importedUI")]
    pub imported_ui: bool,
    /// Merge strategy that was used.
    pub merge_mode: MergeMode,
    /// Human-readable outcome, including validation skips.
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
