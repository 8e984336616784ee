//! Error hierarchy for the Study Planner engine.
//!
//! Every failure surfaced to callers carries a stable machine-readable kind
//! (see [`PlannerError::kind`]) plus a human-readable message. Persistence
//! failures are deliberately *not* represented here: they are demoted to
//! `tracing::warn!` logs and never abort a mutation.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result alias used across the engine crates.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Errors surfaced by engine operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlannerError {
    /// No task with the given id exists in the store.
    #[error("task not found: {id}")]
    NotFound {
        /// The id that failed to resolve.
        id: String,
    },

    /// Task validation failed; no state was changed.
    #[error("invalid task: {0}")]
    InvalidTask(ValidationErrors),

    /// Settings validation failed; no state was changed.
    #[error("invalid settings: {0}")]
    InvalidSettings(ValidationErrors),

    /// Imported text was not parseable JSON or did not match the schema.
    #[error("invalid import format: {0}")]
    InvalidFormat(String),
}

impl PlannerError {
    /// Stable machine-readable kind for presenters and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTask(_) => "invalid_task",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::InvalidFormat(_) => "invalid_format",
        }
    }
}

/// Per-field validation failures, keyed by the wire-format field name.
///
/// Uses a `BTreeMap` so rendering order is deterministic regardless of the
/// order in which validators ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`. Later entries for the same field win.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let _ = self.errors.insert(field.into(), message.into());
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Iterate `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consume into the underlying map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
