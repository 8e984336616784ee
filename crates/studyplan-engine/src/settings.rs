//! Typed settings store with atomic, validated writes.
//!
//! Every write validates the *resulting* settings value; an invalid patch
//! rejects the whole write and leaves the stored value untouched.

use tracing::warn;

use studyplan_core::errors::{PlannerError, Result};
use studyplan_core::types::{Settings, SettingsPatch};
use studyplan_core::validate;

/// The settings record and its mutation rules.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: Settings,
}

impl SettingsStore {
    /// Store holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from loaded settings, falling back to defaults when the
    /// loaded value no longer validates.
    #[must_use]
    pub fn from_loaded(settings: Settings) -> Self {
        match validate::validate_settings(&settings) {
            Ok(()) => Self { settings },
            Err(errors) => {
                warn!(%errors, "persisted settings invalid; using defaults");
                Self::new()
            }
        }
    }

    /// Borrow the current settings.
    #[must_use]
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Owned copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.settings.clone()
    }

    /// Replace wholesale with an already-validated value (import path).
    pub fn replace(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Apply `patch` atomically. Returns `(previous, next)` snapshots.
    pub fn update(&mut self, patch: &SettingsPatch) -> Result<(Settings, Settings)> {
        let previous = self.settings.clone();
        let next = previous.with_patch(patch);
        validate::validate_settings(&next).map_err(PlannerError::InvalidSettings)?;
        self.settings = next.clone();
        Ok((previous, next))
    }

    /// Reset everything to defaults. Returns `(previous, next)` snapshots.
    pub fn reset(&mut self) -> (Settings, Settings) {
        let previous = std::mem::take(&mut self.settings);
        (previous, self.settings.clone())
    }

    /// Reset a single field (camelCase wire name) to its default.
    ///
    /// Unknown keys are dropped with a warning and leave the settings
    /// unchanged. Returns `(previous, next)` snapshots.
    pub fn reset_key(&mut self, key: &str) -> (Settings, Settings) {
        let previous = self.settings.clone();
        let defaults = Settings::default();
        match key {
            "timeUnit" => self.settings.time_unit = defaults.time_unit,
            "weeklyHourTarget" => self.settings.weekly_hour_target = defaults.weekly_hour_target,
            "defaultTag" => self.settings.default_tag = defaults.default_tag,
            "sortPreference" => self.settings.sort_preference = defaults.sort_preference,
            "searchCaseSensitive" => {
                self.settings.search_case_sensitive = defaults.search_case_sensitive;
            }
            "dateFormat" => self.settings.date_format = defaults.date_format,
            "firstDayOfWeek" => self.settings.first_day_of_week = defaults.first_day_of_week,
            other => warn!(key = other, "ignoring reset of unknown settings key"),
        }
        (previous, self.settings.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
