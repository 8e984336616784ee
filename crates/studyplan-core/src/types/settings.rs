//! User settings: formatting preferences, defaults, and the weekly target.

use serde::{Deserialize, Serialize};

/// Unit used when formatting and parsing durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Always minutes (`90 min`).
    Minutes,
    /// Always fractional hours (`1.5 hr`).
    Hours,
    /// Hours and minutes when at least an hour (`1 hr 30 min`), else minutes.
    Both,
}

impl TimeUnit {
    /// Wire string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Both => "both",
        }
    }
}

/// Available task orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Latest due date first.
    #[default]
    DateNewest,
    /// Earliest due date first.
    DateOldest,
    /// Title A to Z (case-insensitive).
    TitleAsc,
    /// Title Z to A (case-insensitive).
    TitleDesc,
    /// Shortest duration first.
    DurationAsc,
    /// Longest duration first.
    DurationDesc,
}

impl SortKey {
    /// Wire string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateNewest => "date-newest",
            Self::DateOldest => "date-oldest",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
            Self::DurationAsc => "duration-asc",
            Self::DurationDesc => "duration-desc",
        }
    }
}

/// Display format for dates in the presentation layer.
///
/// The engine always *stores* `YYYY-MM-DD`; this setting only drives
/// formatting in the hosting UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    /// ISO `2025-03-14`.
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
    /// US `03/14/2025`.
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    /// European `14/03/2025`.
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
}

/// User preferences controlling formatting, defaults, and targets.
///
/// # JSON Format
///
/// All field names are camelCase. Missing fields deserialize to their
/// defaults. Example:
///
/// ```json
/// { "timeUnit": "both", "weeklyHourTarget": 40, "defaultTag": "General" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Duration display unit.
    pub time_unit: TimeUnit,
    /// Weekly completed-hours target, `0..=168`.
    pub weekly_hour_target: f64,
    /// Tag applied to tasks created without one, at most 50 characters.
    pub default_tag: String,
    /// Preferred task ordering.
    pub sort_preference: SortKey,
    /// Whether text search is case sensitive.
    pub search_case_sensitive: bool,
    /// Display format for dates.
    pub date_format: DateFormat,
    /// First day of the week, `0..=6` where 0 is Sunday.
    pub first_day_of_week: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Both,
            weekly_hour_target: 40.0,
            default_tag: "General".to_string(),
            sort_preference: SortKey::DateNewest,
            search_case_sensitive: false,
            date_format: DateFormat::YearMonthDay,
            first_day_of_week: 0,
        }
    }
}

/// Camel-case wire names of the settings fields, used to detect unknown
/// keys in imported or patched JSON.
pub const SETTINGS_KEYS: [&str; 7] = [
    "timeUnit",
    "weeklyHourTarget",
    "defaultTag",
    "sortPreference",
    "searchCaseSensitive",
    "dateFormat",
    "firstDayOfWeek",
];

/// Typed partial update for [`Settings`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// New duration display unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    /// New weekly target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_hour_target: Option<f64>,
    /// New default tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tag: Option<String>,
    /// New sort preference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_preference: Option<SortKey>,
    /// New case sensitivity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_case_sensitive: Option<bool>,
    /// New date format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<DateFormat>,
    /// New first day of week.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_day_of_week: Option<u8>,
}

impl SettingsPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_unit.is_none()
            && self.weekly_hour_target.is_none()
            && self.default_tag.is_none()
            && self.sort_preference.is_none()
            && self.search_case_sensitive.is_none()
            && self.date_format.is_none()
            && self.first_day_of_week.is_none()
    }
}

impl Settings {
    /// Return a copy with `patch` applied (no validation here; the settings
    /// store validates the result before committing it).
    #[must_use]
    pub fn with_patch(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.time_unit {
            next.time_unit = v;
        }
        if let Some(v) = patch.weekly_hour_target {
            next.weekly_hour_target = v;
        }
        if let Some(ref v) = patch.default_tag {
            next.default_tag = v.clone();
        }
        if let Some(v) = patch.sort_preference {
            next.sort_preference = v;
        }
        if let Some(v) = patch.search_case_sensitive {
            next.search_case_sensitive = v;
        }
        if let Some(v) = patch.date_format {
            next.date_format = v;
        }
        if let Some(v) = patch.first_day_of_week {
            next.first_day_of_week = v;
        }
        next
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
