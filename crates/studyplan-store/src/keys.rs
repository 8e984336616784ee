//! The persistent key schema.
//!
//! All durable data lives in a string-keyed KV namespace under a stable
//! prefix chosen by the host:
//!
//! - `<prefix>State`: the main state blob (`tasks`, `settings`, persisted UI)
//! - `<prefix>Backup_<epochMs>`: one backup envelope per snapshot
//! - `<prefix>AutoBackup`: `"true"` / `"false"` flag

/// Default namespace prefix.
pub const DEFAULT_PREFIX: &str = "studyPlanner";

/// Key of the main state blob.
#[must_use]
pub fn state_key(prefix: &str) -> String {
    format!("{prefix}State")
}

/// Key of the auto-backup flag.
#[must_use]
pub fn auto_backup_key(prefix: &str) -> String {
    format!("{prefix}AutoBackup")
}

/// Prefix shared by all backup keys in the namespace.
#[must_use]
pub fn backup_key_prefix(prefix: &str) -> String {
    format!("{prefix}Backup_")
}

/// Key of a backup snapshot taken at `epoch_ms`.
#[must_use]
pub fn backup_key(prefix: &str, epoch_ms: i64) -> String {
    format!("{prefix}Backup_{epoch_ms}")
}
