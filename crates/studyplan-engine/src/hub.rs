//! The observable state hub.
//!
//! [`PlannerHub`] is the single in-process owner of `{ tasks, settings, ui }`.
//! Every mutation flows through it: validate, commit in memory, persist the
//! durable subset, then notify subscribers in registration order with a
//! tagged [`ChangeRecord`] and a fresh snapshot.
//!
//! INVARIANT: persistence happens before notification, so after a subscriber
//! observes a change, a reload from storage reflects it (modulo a logged
//! write failure, in which case the in-memory state stays authoritative).
//!
//! Mutations take `&mut self`, so a subscriber callback can never re-enter a
//! mutation while one is in flight; re-entrant work must be deferred by the
//! subscriber itself.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use studyplan_core::errors::Result;
use studyplan_core::time;
use studyplan_core::types::{
    AppState, ChangeRecord, ImportSummary, MergeMode, PersistedState, Settings, SettingsPatch,
    Task, TaskDraft, TaskPatch, TaskStatus, UiPatch, UiState,
};
use studyplan_store::adapter::PersistenceAdapter;
use studyplan_store::backup::{BackupInfo, BackupRing};
use studyplan_store::codec::{self, ImportOptions};
use studyplan_store::errors::StoreError;
use studyplan_store::keys;

use crate::query;
use crate::settings::SettingsStore;
use crate::stats::{self, TaskStats, WeeklyProgress};
use crate::tasks::TaskStore;

/// Host-supplied hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Namespace prefix for all persistent keys.
    pub prefix: String,
    /// Optional seed document adopted when the store is empty.
    pub seed_path: Option<PathBuf>,
    /// Auto-backup default used until the flag key is written.
    pub auto_backup: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            prefix: keys::DEFAULT_PREFIX.to_string(),
            seed_path: None,
            auto_backup: true,
        }
    }
}

/// Handle identifying a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&ChangeRecord, &AppState)>;

/// The observable state hub (see module docs).
pub struct PlannerHub {
    config: HubConfig,
    adapter: PersistenceAdapter,
    backups: BackupRing,
    tasks: TaskStore,
    settings: SettingsStore,
    ui: UiState,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
    ready: bool,
}

impl PlannerHub {
    /// Build a hub over an injected persistence adapter.
    ///
    /// The hub starts with defaults and `ready = false`; call
    /// [`init`](Self::init) to load persisted state and go live.
    #[must_use]
    pub fn new(config: HubConfig, adapter: PersistenceAdapter) -> Self {
        let backups = BackupRing::new(config.prefix.clone());
        Self {
            config,
            adapter,
            backups,
            tasks: TaskStore::new(),
            settings: SettingsStore::new(),
            ui: UiState::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
            ready: false,
        }
    }

    /// Hub over in-memory storage with default config (tests, demos).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(HubConfig::default(), PersistenceAdapter::in_memory())
    }

    // ── initialization ───────────────────────────────────────────────────

    /// Load persisted state (falling back to defaults), adopt the seed
    /// document when the store is empty, persist, and emit
    /// `STATE_INITIALIZED`.
    pub fn init(&mut self) {
        let state_key = keys::state_key(&self.config.prefix);
        if let Some(text) = self.adapter.load_raw(&state_key) {
            match serde_json::from_str::<PersistedState>(&text) {
                Ok(persisted) => {
                    self.tasks = TaskStore::from_loaded(persisted.tasks);
                    self.settings = SettingsStore::from_loaded(persisted.settings);
                    self.ui = UiState::from_prefs(persisted.ui);
                }
                Err(e) => {
                    warn!(error = %e, "persisted state unreadable; starting from defaults");
                }
            }
        }

        let mut seeded = false;
        if self.tasks.is_empty() {
            if let Some(path) = self.config.seed_path.clone() {
                seeded = self.adopt_seed(&path);
            }
        }

        self.ready = true;
        self.persist();
        info!(tasks = self.tasks.len(), seeded, "planner initialized");
        self.emit(&ChangeRecord::StateInitialized { seeded });
    }

    fn adopt_seed(&mut self, path: &std::path::Path) -> bool {
        let Some(doc) = codec::load_seed(path) else { return false };
        let normalized = codec::normalize_tasks(&doc.tasks, &self.settings.get().default_tag);
        if let Some(summary) = normalized.error_summary() {
            warn!(%summary, "seed document had invalid tasks");
        }
        if normalized.tasks.is_empty() {
            return false;
        }
        debug!(count = normalized.tasks.len(), "adopting seed tasks");
        self.tasks.replace_all(normalized.tasks);
        true
    }

    /// Whether initialization has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    // ── subscriptions ────────────────────────────────────────────────────

    /// Register a subscriber. No replay happens on registration; the
    /// callback runs synchronously after each subsequent mutation, in
    /// registration order. A panicking callback is caught and logged
    /// without disturbing sibling subscribers or the mutation itself.
    pub fn subscribe(&mut self, callback: impl FnMut(&ChangeRecord, &AppState) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── readers ──────────────────────────────────────────────────────────

    /// Defensive copy of all tasks.
    #[must_use]
    pub fn get_tasks(&self) -> Vec<Task> {
        self.tasks.snapshot()
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn get_settings(&self) -> Settings {
        self.settings.snapshot()
    }

    /// Current UI state snapshot.
    #[must_use]
    pub fn get_ui_state(&self) -> UiState {
        self.ui.clone()
    }

    /// Full state snapshot.
    #[must_use]
    pub fn state(&self) -> AppState {
        AppState {
            tasks: self.tasks.snapshot(),
            settings: self.settings.snapshot(),
            ui: self.ui.clone(),
        }
    }

    /// Tasks as the current view settings present them
    /// (filter → search → sort).
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<Task> {
        query::apply_view(
            self.tasks.tasks(),
            &self.ui,
            self.settings.get(),
            time::today_local(),
        )
    }

    /// Dashboard statistics for the current snapshot.
    #[must_use]
    pub fn dashboard_stats(&self) -> TaskStats {
        stats::calculate_task_stats(
            self.tasks.tasks(),
            time::today_local(),
            self.settings.get().first_day_of_week,
        )
    }

    /// Weekly progress against the configured target.
    #[must_use]
    pub fn weekly_progress(&self) -> WeeklyProgress {
        let settings = self.settings.get();
        stats::calculate_weekly_progress(
            self.tasks.tasks(),
            settings.weekly_hour_target,
            time::today_local(),
            settings.first_day_of_week,
        )
    }

    // ── task mutations ───────────────────────────────────────────────────

    /// Create a task. Persists, then emits `TASK_ADDED`.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let default_tag = self.settings.get().default_tag.clone();
        let task = self.tasks.add(draft, &default_tag)?;
        self.persist();
        self.emit(&ChangeRecord::TaskAdded { task: task.clone() });
        Ok(task)
    }

    /// Update a task. Persists, then emits `TASK_UPDATED`.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let task = self.tasks.update(id, patch)?;
        self.persist();
        self.emit(&ChangeRecord::TaskUpdated { task: task.clone() });
        Ok(task)
    }

    /// Delete a task. Persists, then emits `TASK_DELETED`.
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.remove(id)?;
        self.persist();
        self.emit(&ChangeRecord::TaskDeleted { task: task.clone() });
        Ok(task)
    }

    /// Flip a task between `Pending` and `Complete`.
    pub fn toggle_task_status(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.toggle(id)?;
        self.persist();
        self.emit(&ChangeRecord::TaskUpdated { task: task.clone() });
        Ok(task)
    }

    /// Set `status` on every task in `ids`. Missing ids are skipped;
    /// returns the number of tasks actually changed. Each change persists
    /// and notifies individually, preserving the per-mutation ordering
    /// guarantees.
    pub fn bulk_update_status(&mut self, ids: &[String], status: TaskStatus) -> usize {
        let mut applied = 0;
        for id in ids {
            match self.update_task(id, &TaskPatch::status(status)) {
                Ok(_) => applied += 1,
                Err(e) => debug!(%id, error = %e, "bulk status update skipped a task"),
            }
        }
        applied
    }

    /// Delete every task in `ids`. Missing ids are skipped; returns the
    /// number of tasks removed.
    pub fn bulk_delete(&mut self, ids: &[String]) -> usize {
        let mut removed = 0;
        for id in ids {
            match self.delete_task(id) {
                Ok(_) => removed += 1,
                Err(e) => debug!(%id, error = %e, "bulk delete skipped a task"),
            }
        }
        removed
    }

    // ── settings mutations ───────────────────────────────────────────────

    /// Apply a settings patch atomically. Persists, then emits
    /// `SETTINGS_UPDATED` with both snapshots.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Settings> {
        let (previous, next) = self.settings.update(patch)?;
        self.persist();
        self.emit(&ChangeRecord::SettingsUpdated { previous, next: next.clone() });
        Ok(next)
    }

    /// Reset all settings to defaults.
    pub fn reset_settings(&mut self) -> Settings {
        let (previous, next) = self.settings.reset();
        self.persist();
        self.emit(&ChangeRecord::SettingsUpdated { previous, next: next.clone() });
        next
    }

    /// Reset one settings field (camelCase wire name) to its default.
    /// Unknown keys are logged and leave state untouched.
    pub fn reset_setting_key(&mut self, key: &str) -> Settings {
        let (previous, next) = self.settings.reset_key(key);
        if previous != next {
            self.persist();
            self.emit(&ChangeRecord::SettingsUpdated { previous, next: next.clone() });
        }
        next
    }

    // ── UI mutations ─────────────────────────────────────────────────────

    /// Apply a UI patch. Persists only when a field of the persisted subset
    /// changed; always emits `UI_STATE_UPDATED`.
    pub fn update_ui_state(&mut self, patch: &UiPatch) -> UiState {
        let (next, persisted_changed) = self.ui.with_patch(patch);
        self.ui = next.clone();
        if persisted_changed {
            self.persist();
        }
        self.emit(&ChangeRecord::UiStateUpdated { ui: next.clone() });
        next
    }

    // ── import / export ──────────────────────────────────────────────────

    /// Export the full state as a 2-space-indented JSON document.
    #[must_use]
    pub fn export_all(&self) -> String {
        codec::export_all(&self.persisted_state())
    }

    /// Export settings only.
    #[must_use]
    pub fn export_settings(&self) -> String {
        codec::export_settings(self.settings.get())
    }

    /// Import a JSON document (envelope or bare data).
    ///
    /// Parse failures reject with `InvalidFormat` before any mutation.
    /// Invalid tasks are skipped and reported in the summary message;
    /// settings and UI preferences deep-merge over the current values with
    /// unknown keys dropped. Persists, then emits `DATA_IMPORTED`.
    pub fn import_all(&mut self, text: &str, options: ImportOptions) -> Result<ImportSummary> {
        let doc = codec::parse_import(text)?;

        if options.merge_mode == MergeMode::Replace && self.auto_backup_enabled() {
            let state = self.persisted_state();
            let _ = self.backups.create_backup(&mut self.adapter, &state);
        }

        let normalized =
            codec::normalize_tasks(&doc.tasks, &self.settings.get().default_tag);
        let imported_tasks = normalized.tasks.len();
        let error_summary = normalized.error_summary();
        let merged =
            codec::merge_tasks(self.tasks.snapshot(), normalized.tasks, options.merge_mode);
        self.tasks.replace_all(merged);

        let mut imported_settings = false;
        if options.include_settings {
            if let Some(ref value) = doc.settings {
                if let Some(next) = codec::merge_settings(self.settings.get(), value) {
                    self.settings.replace(next);
                    imported_settings = true;
                }
            }
        }

        let mut imported_ui = false;
        if options.include_ui {
            if let Some(ref value) = doc.ui {
                if let Some(prefs) = codec::merge_ui_prefs(&self.ui.prefs(), value) {
                    // Transient fields reset alongside the merged prefs.
                    self.ui = UiState::from_prefs(prefs);
                    imported_ui = true;
                }
            }
        }

        let mut message = format!(
            "Imported {imported_tasks} task{} ({} mode)",
            if imported_tasks == 1 { "" } else { "s" },
            options.merge_mode.as_str()
        );
        if let Some(errors) = error_summary {
            message.push_str("; skipped: ");
            message.push_str(&errors);
        }

        let summary = ImportSummary {
            ok: true,
            imported_tasks,
            total_tasks: self.tasks.len(),
            imported_settings,
            imported_ui,
            merge_mode: options.merge_mode,
            message,
        };

        self.persist();
        self.emit(&ChangeRecord::DataImported { summary: summary.clone() });
        Ok(summary)
    }

    // ── backups / destructive operations ─────────────────────────────────

    /// Snapshot the current state into the backup ring.
    pub fn create_manual_backup(&mut self) -> Option<String> {
        let state = self.persisted_state();
        self.backups.create_backup(&mut self.adapter, &state)
    }

    /// All stored backups, newest first.
    #[must_use]
    pub fn list_backups(&self) -> Vec<BackupInfo> {
        self.backups.list_backups(&self.adapter)
    }

    /// Adopt the snapshot stored under `key`, overwriting the main state.
    /// Emits `STATE_RESET` with the restored snapshot in place.
    pub fn restore_from_backup(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        if self.auto_backup_enabled() {
            let state = self.persisted_state();
            let _ = self.backups.create_backup(&mut self.adapter, &state);
        }
        let restored = self.backups.restore_from_backup(&mut self.adapter, key)?;
        self.tasks = TaskStore::from_loaded(restored.tasks);
        self.settings = SettingsStore::from_loaded(restored.settings);
        self.ui = UiState::from_prefs(restored.ui);
        self.persist();
        self.emit(&ChangeRecord::StateReset);
        Ok(())
    }

    /// Back up the current state, remove the durable blob, and reset the
    /// in-memory state to defaults. Emits `STATE_RESET`.
    pub fn clear_data(&mut self) {
        let state = self.persisted_state();
        let _ = self.backups.clear_all(&mut self.adapter, &state);
        self.tasks = TaskStore::new();
        self.settings = SettingsStore::new();
        self.ui = UiState::default();
        self.emit(&ChangeRecord::StateReset);
    }

    /// Whether destructive operations snapshot first.
    ///
    /// Reads the `<prefix>AutoBackup` flag, falling back to the configured
    /// default while the key is unwritten.
    #[must_use]
    pub fn auto_backup_enabled(&self) -> bool {
        match self.adapter.load_raw(&keys::auto_backup_key(&self.config.prefix)) {
            Some(raw) => raw == "true",
            None => self.config.auto_backup,
        }
    }

    /// Persist the auto-backup flag.
    pub fn set_auto_backup(&mut self, enabled: bool) {
        let key = keys::auto_backup_key(&self.config.prefix);
        let _ = self.adapter.save_raw(&key, if enabled { "true" } else { "false" });
    }

    // ── internals ────────────────────────────────────────────────────────

    fn persisted_state(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.snapshot(),
            settings: self.settings.snapshot(),
            ui: self.ui.prefs(),
        }
    }

    /// Write the durable subset. Failures are logged by the adapter and
    /// never abort the mutation; in-memory state stays authoritative.
    fn persist(&mut self) {
        let state = self.persisted_state();
        let key = keys::state_key(&self.config.prefix);
        if !self.adapter.save(&key, &state) {
            warn!(%key, "state not persisted; continuing with in-memory state");
        }
    }

    /// Notify all subscribers in registration order.
    fn emit(&mut self, record: &ChangeRecord) {
        let snapshot = self.state();
        for (id, callback) in &mut self.subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(record, &snapshot)));
            if outcome.is_err() {
                warn!(subscriber = id.0, kind = record.kind(), "subscriber panicked during notification");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
