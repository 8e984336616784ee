//! # studyplan-store
//!
//! Persistence layer for the Study Planner engine.
//!
//! - **[`kv`]**: the [`kv::KvStore`] capability (`get`/`put`/`remove`/`keys`)
//!   with an in-memory backend, plus the [`file::FileStore`] filesystem
//!   backend (one JSON document per key, atomic writes)
//! - **[`adapter`]**: [`adapter::PersistenceAdapter`], a primary store with a
//!   secondary fallback; write failures degrade to warnings
//! - **[`backup`]**: the rolling [`backup::BackupRing`] of timestamped state
//!   snapshots, retention 5
//! - **[`codec`]**: versioned export envelope, import parsing/normalization,
//!   merge strategies, and seed-file loading
//! - **[`keys`]**: the shared persistent key schema
//!
//! ## Crate Position
//!
//! Depends on `studyplan-core`; used by `studyplan-engine`.

#![deny(unsafe_code)]

pub mod adapter;
pub mod backup;
pub mod codec;
pub mod errors;
pub mod file;
pub mod keys;
pub mod kv;

pub use adapter::PersistenceAdapter;
pub use backup::{BackupEnvelope, BackupInfo, BackupRing, BACKUP_RETENTION};
pub use errors::StoreError;
pub use file::FileStore;
pub use kv::{KvStore, MemoryStore};
