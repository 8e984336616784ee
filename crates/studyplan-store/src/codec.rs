//! Versioned import/export codec and seed loading.
//!
//! Exports wrap the state in a `{ version, exportDate, application, data }`
//! envelope; the importer accepts either that envelope or the bare `data`
//! object. Imported tasks are loose JSON bags: normalization fills missing
//! fields with defaults, mints ids, and validates each task, detailing the
//! first few failures and summarizing the rest.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use studyplan_core::errors::PlannerError;
use studyplan_core::ids::mint_task_id;
use studyplan_core::time;
use studyplan_core::types::{
    MergeMode, PersistedState, Settings, Task, TaskStatus, UiPrefs, SETTINGS_KEYS,
};
use studyplan_core::validate::{self, TagRules};

/// Envelope schema version.
pub const EXPORT_VERSION: &str = "1.0";

/// Application name stamped into envelopes.
pub const APPLICATION: &str = "Study Planner";

/// Slug used in export file names.
pub const APP_SLUG: &str = "study-planner";

/// Number of per-task validation failures detailed before summarizing.
const DETAILED_ERROR_LIMIT: usize = 5;

/// Wire names of the persisted UI preference fields.
const UI_PREF_KEYS: [&str; 4] = ["sortBy", "filterBy", "searchMode", "viewMode"];

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

/// The canonical export envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    /// Schema version (`"1.0"`).
    pub version: String,
    /// RFC 3339 export timestamp.
    pub export_date: String,
    /// Producing application.
    pub application: String,
    /// Exported state.
    pub data: ExportPayload,
}

/// The `data` section of an export envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportPayload {
    /// Exported tasks.
    pub tasks: Vec<Task>,
    /// Exported settings (absent in task-only payloads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    /// Exported UI preferences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiPrefs>,
    /// Export metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

/// Counts and provenance stamped into exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Number of exported tasks.
    pub task_count: usize,
    /// Number of exported tasks with `Complete` status.
    pub completed_count: usize,
    /// Producer string.
    pub exported_by: String,
    /// Payload format marker.
    pub format: String,
}

fn envelope(data: ExportPayload) -> ExportEnvelope {
    ExportEnvelope {
        version: EXPORT_VERSION.to_string(),
        export_date: time::now_iso(),
        application: APPLICATION.to_string(),
        data,
    }
}

fn metadata_for(tasks: &[Task]) -> ExportMetadata {
    ExportMetadata {
        task_count: tasks.len(),
        completed_count: tasks.iter().filter(|t| t.status == TaskStatus::Complete).count(),
        exported_by: format!("{APPLICATION} v{EXPORT_VERSION}"),
        format: "json".to_string(),
    }
}

/// Serialize the full state as a 2-space-indented export document.
#[must_use]
pub fn export_all(state: &PersistedState) -> String {
    let payload = ExportPayload {
        metadata: Some(metadata_for(&state.tasks)),
        tasks: state.tasks.clone(),
        settings: Some(state.settings.clone()),
        ui: Some(state.ui.clone()),
    };
    serde_json::to_string_pretty(&envelope(payload)).unwrap_or_else(|_| "{}".to_string())
}

/// Serialize a settings-only export document.
#[must_use]
pub fn export_settings(settings: &Settings) -> String {
    let payload = ExportPayload {
        settings: Some(settings.clone()),
        metadata: Some(metadata_for(&[])),
        ..ExportPayload::default()
    };
    serde_json::to_string_pretty(&envelope(payload)).unwrap_or_else(|_| "{}".to_string())
}

/// File name for an export taken on `date`: `study-planner-YYYY-MM-DD.json`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{APP_SLUG}-{}.json", time::format_due_date(date))
}

// ─────────────────────────────────────────────────────────────────────────────
// Import
// ─────────────────────────────────────────────────────────────────────────────

/// Options controlling an import.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// How imported tasks combine with existing ones.
    pub merge_mode: MergeMode,
    /// Whether to apply settings from the payload.
    pub include_settings: bool,
    /// Whether to apply UI preferences from the payload.
    pub include_ui: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::Merge,
            include_settings: true,
            include_ui: true,
        }
    }
}

/// A parsed import payload, before normalization.
///
/// Tasks stay as loose JSON values here: the source data treats tasks as
/// untyped bags, so every field is re-validated during normalization.
#[derive(Debug, Clone, Default)]
pub struct ImportDocument {
    /// Raw task objects.
    pub tasks: Vec<Value>,
    /// Raw settings object, if present.
    pub settings: Option<Value>,
    /// Raw UI preferences object, if present.
    pub ui: Option<Value>,
}

/// Result of normalizing and validating imported tasks.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTasks {
    /// Tasks that passed validation, defaults filled and ids ensured.
    pub tasks: Vec<Task>,
    /// Per-task failure descriptions, in payload order.
    pub errors: Vec<String>,
}

impl NormalizedTasks {
    /// Human-readable failure summary: the first few errors verbatim, the
    /// rest counted.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let mut parts: Vec<String> =
            self.errors.iter().take(DETAILED_ERROR_LIMIT).cloned().collect();
        let rest = self.errors.len().saturating_sub(DETAILED_ERROR_LIMIT);
        if rest > 0 {
            parts.push(format!("and {rest} more"));
        }
        Some(parts.join("; "))
    }
}

/// Parse import text into an [`ImportDocument`].
///
/// Accepts either the export envelope or the bare `data` object. JSON parse
/// failures and non-object payloads map to
/// [`PlannerError::InvalidFormat`].
pub fn parse_import(text: &str) -> Result<ImportDocument, PlannerError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PlannerError::InvalidFormat(format!("not valid JSON: {e}")))?;

    let Value::Object(mut outer) = value else {
        return Err(PlannerError::InvalidFormat("payload is not a JSON object".into()));
    };
    let map = match outer.remove("data") {
        Some(Value::Object(inner)) => inner,
        Some(Value::Null) | None => outer,
        Some(_) => {
            return Err(PlannerError::InvalidFormat("\"data\" must be an object".into()));
        }
    };

    let tasks = match map.get("tasks") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(PlannerError::InvalidFormat("\"tasks\" must be an array".into()));
        }
    };
    let settings = map.get("settings").filter(|v| v.is_object()).cloned();
    let ui = map.get("ui").filter(|v| v.is_object()).cloned();

    Ok(ImportDocument { tasks, settings, ui })
}

/// Normalize loose task values into validated [`Task`] records.
///
/// Missing `status`, `tag`, `duration`, `createdAt`, and `updatedAt` are
/// filled with defaults; missing ids are minted. Tasks failing validation
/// are skipped and reported in [`NormalizedTasks::errors`].
#[must_use]
pub fn normalize_tasks(raw: &[Value], default_tag: &str) -> NormalizedTasks {
    let mut out = NormalizedTasks::default();
    for (index, value) in raw.iter().enumerate() {
        match normalize_task(value, default_tag) {
            Ok(task) => out.tasks.push(task),
            Err(message) => out.errors.push(format!("task {}: {message}", index + 1)),
        }
    }
    out
}

fn normalize_task(value: &Value, default_tag: &str) -> Result<Task, String> {
    let Value::Object(map) = value else {
        return Err("not an object".to_string());
    };

    let title = string_field(map, "title").unwrap_or_default();
    let due_date = string_field(map, "dueDate").unwrap_or_default();
    let duration = match map.get("duration") {
        None | Some(Value::Null) => 0.0,
        Some(v) => v.as_f64().ok_or("duration is not a number")?,
    };
    let tag = match string_field(map, "tag") {
        Some(tag) if !tag.trim().is_empty() => tag,
        _ => default_tag.to_string(),
    };
    let status = match string_field(map, "status") {
        None => TaskStatus::Pending,
        Some(raw) => raw.parse::<TaskStatus>().map_err(|e| e.to_string())?,
    };
    let created_at = string_field(map, "createdAt").unwrap_or_else(time::now_iso);
    let updated_at = string_field(map, "updatedAt").unwrap_or_else(|| created_at.clone());
    let id = match string_field(map, "id") {
        Some(id) if !id.is_empty() => id,
        _ => mint_task_id(),
    };

    let candidate = Task {
        id,
        title,
        due_date,
        duration,
        tag,
        status,
        created_at,
        updated_at,
    };
    validate::validate_task(&candidate, TagRules::Import).map_err(|errors| errors.to_string())
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// Combine existing and imported tasks under the given merge strategy.
#[must_use]
pub fn merge_tasks(existing: Vec<Task>, imported: Vec<Task>, mode: MergeMode) -> Vec<Task> {
    match mode {
        MergeMode::Replace => imported,
        MergeMode::Append => {
            let mut tasks = existing;
            tasks.extend(imported);
            tasks
        }
        MergeMode::Merge => {
            let mut ids: HashSet<String> = existing.iter().map(|t| t.id.clone()).collect();
            let mut tasks = existing;
            for mut task in imported {
                if task.id.is_empty() || ids.contains(&task.id) {
                    task.id = mint_task_id();
                }
                let _ = ids.insert(task.id.clone());
                tasks.push(task);
            }
            tasks
        }
    }
}

/// Deep-merge `overlay` into `base`. Objects merge recursively; any other
/// value in `overlay` replaces the one in `base`.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Apply imported settings over the current ones.
///
/// Unknown keys are dropped with a warning; a payload that fails to
/// deserialize or validate leaves the current settings untouched and
/// returns `None`.
#[must_use]
pub fn merge_settings(current: &Settings, imported: &Value) -> Option<Settings> {
    let filtered = filter_known_keys(imported, &SETTINGS_KEYS, "settings");
    if filtered.is_empty() {
        return None;
    }
    let base = serde_json::to_value(current).ok()?;
    let merged = deep_merge(base, Value::Object(filtered));
    match serde_json::from_value::<Settings>(merged) {
        Ok(settings) => match validate::validate_settings(&settings) {
            Ok(()) => Some(settings),
            Err(errors) => {
                warn!(%errors, "imported settings failed validation; keeping current settings");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "imported settings malformed; keeping current settings");
            None
        }
    }
}

/// Apply imported UI preferences over the current ones. Unknown keys are
/// dropped with a warning; malformed payloads leave the current preferences
/// untouched and return `None`.
#[must_use]
pub fn merge_ui_prefs(current: &UiPrefs, imported: &Value) -> Option<UiPrefs> {
    let filtered = filter_known_keys(imported, &UI_PREF_KEYS, "ui");
    if filtered.is_empty() {
        return None;
    }
    let base = serde_json::to_value(current).ok()?;
    let merged = deep_merge(base, Value::Object(filtered));
    match serde_json::from_value::<UiPrefs>(merged) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            warn!(error = %e, "imported ui preferences malformed; keeping current");
            None
        }
    }
}

fn filter_known_keys(value: &Value, known: &[&str], section: &str) -> Map<String, Value> {
    let mut filtered = Map::new();
    if let Value::Object(map) = value {
        for (key, entry) in map {
            if known.contains(&key.as_str()) {
                let _ = filtered.insert(key.clone(), entry.clone());
            } else {
                warn!(section, %key, "dropping unknown key from import");
            }
        }
    }
    filtered
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed
// ─────────────────────────────────────────────────────────────────────────────

/// Load a seed document (export-envelope shaped) from `path`.
///
/// Any failure (missing file, bad JSON) is logged and yields `None`; seeds
/// are strictly best-effort.
#[must_use]
pub fn load_seed(path: &Path) -> Option<ImportDocument> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed file unavailable");
            return None;
        }
    };
    match parse_import(&text) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed file unusable");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
