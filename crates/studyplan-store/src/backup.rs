//! Rolling backup ring: timestamped state snapshots with retention 5.
//!
//! Each backup lives under `"<prefix>Backup_<epochMs>"` as a
//! [`BackupEnvelope`]. Retention keeps the 5 most recent snapshots by parsed
//! `backupDate`; eviction is best-effort and tolerates keys that another
//! writer already removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use studyplan_core::types::PersistedState;

use crate::adapter::PersistenceAdapter;
use crate::errors::StoreError;
use crate::keys;

/// Maximum number of retained backups.
pub const BACKUP_RETENTION: usize = 5;

/// A stored backup snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    /// The key the snapshot was taken from.
    pub original_key: String,
    /// RFC 3339 creation timestamp.
    pub backup_date: String,
    /// Full state snapshot.
    pub data: PersistedState,
}

/// Listing entry for a stored backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    /// KV key of the backup.
    pub key: String,
    /// RFC 3339 creation timestamp.
    pub date: String,
    /// Creation time as epoch milliseconds (sort key).
    pub timestamp: i64,
}

/// Backup operations over a namespace prefix.
///
/// Stateless besides the prefix; every method operates through the adapter
/// passed in, so the hub and tests can share one adapter instance.
#[derive(Debug, Clone)]
pub struct BackupRing {
    prefix: String,
}

impl BackupRing {
    /// Ring for the given namespace prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Snapshot `state` under a fresh timestamped key.
    ///
    /// Returns the backup key, or `None` when the write failed everywhere.
    /// Afterwards enforces retention, evicting the eldest snapshots.
    pub fn create_backup(
        &self,
        adapter: &mut PersistenceAdapter,
        state: &PersistedState,
    ) -> Option<String> {
        let now = Utc::now();
        let mut epoch_ms = now.timestamp_millis();
        // Two snapshots in the same millisecond would collide on the key;
        // bump until free so every backup keeps a distinct timestamp.
        while adapter.contains(&keys::backup_key(&self.prefix, epoch_ms)) {
            epoch_ms += 1;
        }
        let key = keys::backup_key(&self.prefix, epoch_ms);
        let envelope = BackupEnvelope {
            original_key: keys::state_key(&self.prefix),
            backup_date: DateTime::from_timestamp_millis(epoch_ms)
                .unwrap_or(now)
                .to_rfc3339(),
            data: state.clone(),
        };
        if !adapter.save(&key, &envelope) {
            warn!(%key, "backup write failed");
            return None;
        }
        debug!(%key, "backup created");
        self.enforce_retention(adapter);
        Some(key)
    }

    /// All stored backups, newest first.
    ///
    /// Envelopes that fail to parse are skipped with a warning.
    #[must_use]
    pub fn list_backups(&self, adapter: &PersistenceAdapter) -> Vec<BackupInfo> {
        let key_prefix = keys::backup_key_prefix(&self.prefix);
        let mut backups = Vec::new();
        for key in adapter.keys() {
            if !key.starts_with(&key_prefix) {
                continue;
            }
            let Some(text) = adapter.load_raw(&key) else { continue };
            match serde_json::from_str::<BackupEnvelope>(&text) {
                Ok(envelope) => match DateTime::parse_from_rfc3339(&envelope.backup_date) {
                    Ok(date) => backups.push(BackupInfo {
                        key,
                        date: envelope.backup_date,
                        timestamp: date.timestamp_millis(),
                    }),
                    Err(e) => warn!(%key, error = %e, "backup has unparseable date; skipping"),
                },
                Err(e) => warn!(%key, error = %e, "unreadable backup envelope; skipping"),
            }
        }
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        backups
    }

    /// Load the backup under `key` and overwrite the main state key with its
    /// snapshot. Returns the restored state for the hub to adopt.
    pub fn restore_from_backup(
        &self,
        adapter: &mut PersistenceAdapter,
        key: &str,
    ) -> Result<PersistedState, StoreError> {
        let text = adapter
            .load_raw(key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        let envelope: BackupEnvelope = serde_json::from_str(&text)?;
        let _ = adapter.save(&keys::state_key(&self.prefix), &envelope.data);
        Ok(envelope.data)
    }

    /// Snapshot the current state, then remove the main state key.
    ///
    /// Returns the backup key when the snapshot succeeded.
    pub fn clear_all(
        &self,
        adapter: &mut PersistenceAdapter,
        current: &PersistedState,
    ) -> Option<String> {
        let backup_key = self.create_backup(adapter, current);
        let _ = adapter.remove(&keys::state_key(&self.prefix));
        backup_key
    }

    /// Drop the eldest backups beyond [`BACKUP_RETENTION`]. Missing keys
    /// (already evicted by a concurrent writer) are ignored.
    fn enforce_retention(&self, adapter: &mut PersistenceAdapter) {
        let backups = self.list_backups(adapter);
        for stale in backups.iter().skip(BACKUP_RETENTION) {
            debug!(key = %stale.key, "evicting stale backup");
            let _ = adapter.remove(&stale.key);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ring_and_adapter() -> (BackupRing, PersistenceAdapter) {
        (BackupRing::new("planner"), PersistenceAdapter::in_memory())
    }

    #[test]
    fn create_backup_returns_namespaced_key() {
        let (ring, mut adapter) = ring_and_adapter();
        let key = ring.create_backup(&mut adapter, &PersistedState::default()).unwrap();
        assert!(key.starts_with("plannerBackup_"));
        assert!(adapter.contains(&key));
    }

    #[test]
    fn retention_keeps_five_newest() {
        let (ring, mut adapter) = ring_and_adapter();
        for _ in 0..6 {
            let _ = ring.create_backup(&mut adapter, &PersistedState::default()).unwrap();
        }
        let backups = ring.list_backups(&adapter);
        assert_eq!(backups.len(), BACKUP_RETENTION);
        // Newest first.
        for pair in backups.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
    }

    #[test]
    fn same_millisecond_backups_get_distinct_keys() {
        let (ring, mut adapter) = ring_and_adapter();
        let a = ring.create_backup(&mut adapter, &PersistedState::default()).unwrap();
        let b = ring.create_backup(&mut adapter, &PersistedState::default()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unreadable_envelopes_are_skipped() {
        let (ring, mut adapter) = ring_and_adapter();
        let _ = ring.create_backup(&mut adapter, &PersistedState::default()).unwrap();
        assert!(adapter.save_raw("plannerBackup_1", "not json"));
        let backups = ring.list_backups(&adapter);
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn restore_overwrites_main_key() {
        let (ring, mut adapter) = ring_and_adapter();
        let mut state = PersistedState::default();
        state.settings.weekly_hour_target = 12.0;
        let key = ring.create_backup(&mut adapter, &state).unwrap();

        let restored = ring.restore_from_backup(&mut adapter, &key).unwrap();
        assert!((restored.settings.weekly_hour_target - 12.0).abs() < f64::EPSILON);

        let main: PersistedState = adapter.load(&keys::state_key("planner"), PersistedState::default());
        assert!((main.settings.weekly_hour_target - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_missing_key_errors() {
        let (ring, mut adapter) = ring_and_adapter();
        assert_matches!(
            ring.restore_from_backup(&mut adapter, "plannerBackup_404"),
            Err(StoreError::MissingKey(_))
        );
    }

    #[test]
    fn clear_all_backs_up_then_removes_main_key() {
        let (ring, mut adapter) = ring_and_adapter();
        let state = PersistedState::default();
        assert!(adapter.save(&keys::state_key("planner"), &state));

        let backup_key = ring.clear_all(&mut adapter, &state).unwrap();
        assert!(adapter.contains(&backup_key));
        assert!(!adapter.contains(&keys::state_key("planner")));
    }

    proptest::proptest! {
        /// Any number of snapshots leaves at most the retention count.
        #[test]
        fn retention_bound_holds(count in 0usize..12) {
            let (ring, mut adapter) = ring_and_adapter();
            for _ in 0..count {
                let _ = ring.create_backup(&mut adapter, &PersistedState::default());
            }
            let backups = ring.list_backups(&adapter);
            proptest::prop_assert!(backups.len() <= BACKUP_RETENTION);
            proptest::prop_assert_eq!(backups.len(), count.min(BACKUP_RETENTION));
        }
    }

    #[test]
    fn envelope_wire_format() {
        let envelope = BackupEnvelope {
            original_key: "plannerState".to_string(),
            backup_date: "2025-03-14T10:00:00+00:00".to_string(),
            data: PersistedState::default(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["originalKey"], "plannerState");
        assert!(json.get("backupDate").is_some());
        assert!(json.get("data").is_some());
    }
}
