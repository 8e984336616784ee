//! Filesystem-backed [`KvStore`]: one JSON document per key.
//!
//! Layout: `<dir>/<sanitized-key>.json`. Writes go through a temp file and
//! rename so a crash mid-write never leaves a truncated document behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{Result, StoreError};
use crate::kv::KvStore;

const FILE_EXT: &str = "json";

/// Filesystem store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    available: bool,
}

impl FileStore {
    /// Open a store at `dir`, creating the directory if needed.
    ///
    /// If the directory cannot be created the store is marked unavailable
    /// and every operation returns [`StoreError::Unavailable`]; the
    /// persistence adapter then falls back to its secondary store.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let available = match fs::create_dir_all(&dir) {
            Ok(()) => true,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "file store directory unavailable");
                false
            }
        };
        Self { dir, available }
    }

    /// Open a store in the platform data directory (`<data_dir>/studyplan`).
    #[must_use]
    pub fn in_data_dir() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("studyplan"))
    }

    /// Whether the backing directory is usable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Root directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable(self.dir.display().to_string()))
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{FILE_EXT}", sanitize_key(key)))
    }
}

/// Replace characters that are unsafe in file names.
///
/// Keys in the planner namespace are alphanumeric with underscores, so this
/// is normally the identity; it exists to keep hostile keys from escaping
/// the store directory.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_available()?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_available()?;
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json") {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn put_get_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(store.is_available());

        store.put("plannerState", r#"{"tasks":[]}"#).unwrap();
        assert_eq!(
            store.get("plannerState").unwrap().as_deref(),
            Some(r#"{"tasks":[]}"#)
        );
    }

    #[test]
    fn absent_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn remove_then_get_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.put("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("a").unwrap(); // idempotent
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn keys_strips_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.put("plannerState", "{}").unwrap();
        store.put("plannerBackup_12", "{}").unwrap();
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["plannerBackup_12".to_string(), "plannerState".to_string()]);
    }

    #[test]
    fn hostile_key_stays_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.put("../escape", "x").unwrap();
        // The write landed inside the store directory under a sanitized name.
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![".._escape".to_string()]);
    }

    #[test]
    fn unavailable_store_errors() {
        // A path under a regular *file* cannot be created as a directory.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = FileStore::new(blocker.join("sub"));
        assert!(!store.is_available());
        assert_matches!(store.get("a"), Err(StoreError::Unavailable(_)));
    }

    #[test]
    fn overwrite_is_atomic_rename() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.put("a", "first").unwrap();
        store.put("a", "second").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("second"));
        // No stray temp files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
