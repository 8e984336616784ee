//! Duration conversion, formatting, and input parsing.
//!
//! Durations are stored in minutes. Formatting is driven by the configured
//! [`TimeUnit`]; negative and non-finite values render as 0 while the
//! validating parser rejects them outright.

use crate::validate::{self, FieldError};
use crate::types::TimeUnit;

/// Round to 2 decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert minutes to hours, rounded to 2 decimal places.
#[must_use]
pub fn minutes_to_hours(minutes: f64) -> f64 {
    if !minutes.is_finite() {
        return 0.0;
    }
    round2(minutes / 60.0)
}

/// Convert hours to whole minutes (rounded to the nearest minute).
#[must_use]
pub fn hours_to_minutes(hours: f64) -> f64 {
    if !hours.is_finite() {
        return 0.0;
    }
    (hours * 60.0).round()
}

/// Render a duration for display.
///
/// Negative and non-finite inputs render as 0. In `both` mode, durations of
/// at least an hour render as `H hr M min` (the minute part omitted when
/// zero); shorter durations render as `M min`. The single-unit modes drop
/// their suffix when `show_unit` is false; `both` keeps its structural units.
#[must_use]
pub fn format_duration(minutes: f64, unit: TimeUnit, show_unit: bool) -> String {
    let minutes = if minutes.is_finite() && minutes > 0.0 { minutes } else { 0.0 };
    match unit {
        TimeUnit::Minutes => {
            let value = round2(minutes);
            if show_unit { format!("{value} min") } else { value.to_string() }
        }
        TimeUnit::Hours => {
            let value = minutes_to_hours(minutes);
            if show_unit { format!("{value} hr") } else { value.to_string() }
        }
        TimeUnit::Both => {
            if minutes >= 60.0 {
                let hours = (minutes / 60.0).floor();
                // Clamp: for extreme magnitudes `hours * 60` can round past
                // `minutes`, which would leave a negative remainder.
                let rest = round2((minutes - hours * 60.0).max(0.0));
                if rest > 0.0 {
                    format!("{hours} hr {rest} min")
                } else {
                    format!("{hours} hr")
                }
            } else {
                format!("{} min", round2(minutes))
            }
        }
    }
}

/// Leniently parse a duration input in the configured unit, returning
/// minutes. Unparseable, negative, and non-finite inputs collapse to 0;
/// use [`validate_duration_input`] where rejection is wanted.
#[must_use]
pub fn parse_duration_input(text: &str, unit: TimeUnit) -> f64 {
    let value: f64 = text.trim().parse().unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return 0.0;
    }
    match unit {
        TimeUnit::Hours => hours_to_minutes(value),
        TimeUnit::Minutes | TimeUnit::Both => round2(value),
    }
}

/// Strictly validate a duration input in the configured unit.
///
/// Returns the value converted to minutes, or a field error for empty,
/// non-numeric, negative, over-precise (more than 2 decimal places), or
/// out-of-range (over 24 hours) input.
pub fn validate_duration_input(text: &str, unit: TimeUnit) -> Result<f64, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("Duration is required"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| FieldError::new("Duration must be a number"))?;
    // `"NaN"` and `"inf"` parse successfully; treat them as non-numeric.
    if !value.is_finite() {
        return Err(FieldError::new("Duration must be a number"));
    }
    let scaled = value * 100.0;
    if (scaled - scaled.round()).abs() > 1e-6 {
        return Err(FieldError::new("Duration can have at most 2 decimal places"));
    }
    let minutes = match unit {
        TimeUnit::Hours => hours_to_minutes(value),
        TimeUnit::Minutes | TimeUnit::Both => value,
    };
    validate::validate_duration(minutes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
