//! Field-level and whole-entity validation.
//!
//! Field validators return the canonical value (e.g. trimmed title) on
//! success and a [`FieldError`] with a user-facing message on failure.
//! [`validate_task`] composes the field validators into a canonicalized copy
//! of the task or a [`ValidationErrors`] map keyed by wire field name.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ValidationErrors;
use crate::time;
use crate::types::{Settings, Task};

/// Maximum tag length in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Maximum task duration in minutes (24 hours).
pub const MAX_DURATION_MINUTES: f64 = 1440.0;

/// Upper bound for the weekly hour target (hours in a week).
pub const MAX_WEEKLY_TARGET: f64 = 168.0;

/// Shape gate for due dates; real-date parsing happens after the regex.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("date regex is valid")
});

/// Character set allowed for tags entered through forms.
static FORM_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s-]+$").expect("tag regex is valid"));

/// A single-field validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// User-facing message.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Which tag character rules apply at the current boundary.
///
/// Forms enforce the restricted character set; imports accept any non-empty
/// string so existing data is never rejected on re-entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagRules {
    /// Letters, spaces, and hyphens only.
    Form,
    /// Any non-empty string (length still capped).
    Import,
}

/// Validate a title. Returns the trimmed canonical form.
pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("Title is required"));
    }
    Ok(trimmed.to_string())
}

/// Validate a `YYYY-MM-DD` due date: shape via regex, then a real-date parse
/// so inputs like `2025-02-30` are rejected.
pub fn validate_due_date(raw: &str) -> Result<String, FieldError> {
    if !DATE_RE.is_match(raw) {
        return Err(FieldError::new("Due date must be in YYYY-MM-DD format"));
    }
    if time::parse_due_date(raw).is_none() {
        return Err(FieldError::new("Due date is not a valid calendar date"));
    }
    Ok(raw.to_string())
}

/// Validate a duration in minutes: finite, non-negative, at most 24 hours,
/// at most 2 decimal places.
pub fn validate_duration(minutes: f64) -> Result<f64, FieldError> {
    if !minutes.is_finite() {
        return Err(FieldError::new("Duration must be a number"));
    }
    if minutes < 0.0 {
        return Err(FieldError::new("Duration cannot be negative"));
    }
    if minutes > MAX_DURATION_MINUTES {
        return Err(FieldError::new("Duration cannot exceed 24 hours (1440 minutes)"));
    }
    let scaled = minutes * 100.0;
    if (scaled - scaled.round()).abs() > 1e-6 {
        return Err(FieldError::new("Duration can have at most 2 decimal places"));
    }
    Ok(minutes)
}

/// Validate a tag under the given boundary rules. Returns the trimmed form.
pub fn validate_tag(raw: &str, rules: TagRules) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("Tag is required"));
    }
    if trimmed.chars().count() > MAX_TAG_LEN {
        return Err(FieldError::new("Tag cannot exceed 50 characters"));
    }
    if rules == TagRules::Form && !FORM_TAG_RE.is_match(trimmed) {
        return Err(FieldError::new("Tag may only contain letters, spaces, and hyphens"));
    }
    Ok(trimmed.to_string())
}

/// Validate a whole task and return a canonicalized copy (trimmed title and
/// tag), or the per-field error map.
pub fn validate_task(task: &Task, rules: TagRules) -> Result<Task, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut canonical = task.clone();

    match validate_title(&task.title) {
        Ok(title) => canonical.title = title,
        Err(e) => errors.insert("title", e.message),
    }
    match validate_due_date(&task.due_date) {
        Ok(date) => canonical.due_date = date,
        Err(e) => errors.insert("dueDate", e.message),
    }
    match validate_duration(task.duration) {
        Ok(duration) => canonical.duration = duration,
        Err(e) => errors.insert("duration", e.message),
    }
    match validate_tag(&task.tag, rules) {
        Ok(tag) => canonical.tag = tag,
        Err(e) => errors.insert("tag", e.message),
    }

    if errors.is_empty() { Ok(canonical) } else { Err(errors) }
}

/// Validate a full settings value (used after applying a patch, so a failed
/// write rejects atomically).
pub fn validate_settings(settings: &Settings) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let target = settings.weekly_hour_target;
    if !target.is_finite() || !(0.0..=MAX_WEEKLY_TARGET).contains(&target) {
        errors.insert(
            "weeklyHourTarget",
            "Weekly hour target must be between 0 and 168",
        );
    }
    if let Err(e) = validate_tag(&settings.default_tag, TagRules::Form) {
        errors.insert("defaultTag", e.message);
    }
    if settings.first_day_of_week > 6 {
        errors.insert("firstDayOfWeek", "First day of week must be between 0 and 6");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    fn valid_task() -> Task {
        Task {
            id: "task_1_aaaaaaaaa".to_string(),
            title: "Essay".to_string(),
            due_date: "2025-03-14".to_string(),
            duration: 90.0,
            tag: "Writing".to_string(),
            status: TaskStatus::Pending,
            created_at: "2025-03-01T08:00:00+00:00".to_string(),
            updated_at: "2025-03-01T08:00:00+00:00".to_string(),
        }
    }

    // ── title ────────────────────────────────────────────────────────────

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  Essay  ").unwrap(), "Essay");
    }

    #[test]
    fn empty_or_whitespace_title_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    // ── due date ─────────────────────────────────────────────────────────

    #[test]
    fn valid_dates_accepted() {
        assert!(validate_due_date("2025-03-14").is_ok());
        assert!(validate_due_date("2024-02-29").is_ok()); // leap day
        assert!(validate_due_date("2025-12-31").is_ok());
    }

    #[test]
    fn shape_violations_rejected() {
        assert!(validate_due_date("2025-3-14").is_err());
        assert!(validate_due_date("03/14/2025").is_err());
        assert!(validate_due_date("2025-13-01").is_err());
        assert!(validate_due_date("2025-00-10").is_err());
        assert!(validate_due_date("2025-01-32").is_err());
        assert!(validate_due_date("").is_err());
    }

    #[test]
    fn impossible_calendar_dates_rejected() {
        // Passes the regex but is not a real date.
        assert!(validate_due_date("2025-02-30").is_err());
        assert!(validate_due_date("2025-04-31").is_err());
    }

    // ── duration ─────────────────────────────────────────────────────────

    #[test]
    fn duration_bounds() {
        assert_eq!(validate_duration(0.0).unwrap(), 0.0);
        assert_eq!(validate_duration(1440.0).unwrap(), 1440.0);
        assert!(validate_duration(-1.0).is_err());
        assert!(validate_duration(1440.01).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn duration_two_decimal_places() {
        assert!(validate_duration(90.25).is_ok());
        assert!(validate_duration(90.125).is_err());
    }

    // ── tag ──────────────────────────────────────────────────────────────

    #[test]
    fn form_tag_character_set() {
        assert_eq!(validate_tag("Deep Work", TagRules::Form).unwrap(), "Deep Work");
        assert_eq!(validate_tag("self-study", TagRules::Form).unwrap(), "self-study");
        assert!(validate_tag("CS 101!", TagRules::Form).is_err());
        assert!(validate_tag("math2", TagRules::Form).is_err());
    }

    #[test]
    fn import_tag_accepts_any_non_empty() {
        assert_eq!(validate_tag("CS 101!", TagRules::Import).unwrap(), "CS 101!");
        assert_eq!(validate_tag("数学", TagRules::Import).unwrap(), "数学");
        assert!(validate_tag("  ", TagRules::Import).is_err());
    }

    #[test]
    fn tag_length_cap_applies_to_both_rule_sets() {
        let long = "a".repeat(51);
        assert!(validate_tag(&long, TagRules::Form).is_err());
        assert!(validate_tag(&long, TagRules::Import).is_err());
        let max = "a".repeat(50);
        assert!(validate_tag(&max, TagRules::Import).is_ok());
    }

    // ── whole task ───────────────────────────────────────────────────────

    #[test]
    fn valid_task_is_canonicalized() {
        let mut task = valid_task();
        task.title = "  Essay  ".to_string();
        task.tag = " Writing ".to_string();
        let canonical = validate_task(&task, TagRules::Form).unwrap();
        assert_eq!(canonical.title, "Essay");
        assert_eq!(canonical.tag, "Writing");
    }

    #[test]
    fn all_field_errors_collected() {
        let task = Task {
            title: " ".to_string(),
            due_date: "14-03-2025".to_string(),
            duration: -5.0,
            tag: String::new(),
            ..valid_task()
        };
        let errors = validate_task(&task, TagRules::Form).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.get("title").is_some());
        assert!(errors.get("dueDate").is_some());
        assert!(errors.get("duration").is_some());
        assert!(errors.get("tag").is_some());
    }

    // ── settings ─────────────────────────────────────────────────────────

    #[test]
    fn default_settings_validate() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn weekly_target_range_enforced() {
        let mut s = Settings::default();
        s.weekly_hour_target = 200.0;
        let errors = validate_settings(&s).unwrap_err();
        assert!(errors.get("weeklyHourTarget").is_some());

        s.weekly_hour_target = -1.0;
        assert!(validate_settings(&s).is_err());

        s.weekly_hour_target = 168.0;
        assert!(validate_settings(&s).is_ok());
    }

    #[test]
    fn default_tag_rules_enforced() {
        let mut s = Settings::default();
        s.default_tag = String::new();
        assert!(validate_settings(&s).is_err());
        s.default_tag = "a".repeat(51);
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn first_day_of_week_range() {
        let mut s = Settings::default();
        s.first_day_of_week = 6;
        assert!(validate_settings(&s).is_ok());
        s.first_day_of_week = 7;
        assert!(validate_settings(&s).is_err());
    }
}
