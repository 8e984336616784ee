//! Dashboard statistics and weekly-progress derivation.
//!
//! Pure functions over a task snapshot, parameterized by `today` and the
//! configured first day of the week so results are deterministic in tests.
//! All hour values are rounded to 2 decimal places.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use studyplan_core::duration::round2;
use studyplan_core::time;
use studyplan_core::types::{Task, TaskStatus};

/// Inclusive date bounds of the week containing `today`.
///
/// `first_day_of_week` is `0..=6` with 0 being Sunday; out-of-range values
/// are treated modulo 7.
#[must_use]
pub fn week_bounds(today: NaiveDate, first_day_of_week: u8) -> (NaiveDate, NaiveDate) {
    let first = u32::from(first_day_of_week) % 7;
    let offset = (today.weekday().num_days_from_sunday() + 7 - first) % 7;
    let start = today - Days::new(u64::from(offset));
    let end = start + Days::new(6);
    (start, end)
}

/// Number of days from the start of the current week to `today` (0-based).
#[must_use]
fn day_index_in_week(today: NaiveDate, first_day_of_week: u8) -> u32 {
    let first = u32::from(first_day_of_week) % 7;
    (today.weekday().num_days_from_sunday() + 7 - first) % 7
}

/// Aggregate dashboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// Total task count.
    pub total_tasks: usize,
    /// Tasks with `Complete` status.
    pub completed_tasks: usize,
    /// Tasks with `Pending` status.
    pub pending_tasks: usize,
    /// Sum of all durations, in hours.
    pub total_hours_planned: f64,
    /// Sum of completed-task durations, in hours.
    pub completed_hours: f64,
    /// Most frequent tag, ties broken by first appearance; `"None"` when
    /// there are no tasks.
    pub top_tag: String,
    /// Pending tasks due in the current week.
    pub upcoming_this_week: usize,
    /// Pending tasks whose due date has passed.
    pub overdue_tasks: usize,
    /// Completed share of all tasks, in percent (0 when empty).
    pub completion_rate: f64,
    /// Mean task duration in hours (0 when empty).
    pub average_task_duration: f64,
}

/// Compute dashboard statistics for a task snapshot.
#[must_use]
pub fn calculate_task_stats(tasks: &[Task], today: NaiveDate, first_day_of_week: u8) -> TaskStats {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Complete).count();
    let pending_tasks = total_tasks - completed_tasks;

    let total_minutes: f64 = tasks.iter().map(|t| t.duration).sum();
    let completed_minutes: f64 = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Complete)
        .map(|t| t.duration)
        .sum();
    let total_hours_planned = round2(total_minutes / 60.0);
    let completed_hours = round2(completed_minutes / 60.0);

    let top_tag = top_tag(tasks);

    let (week_start, week_end) = week_bounds(today, first_day_of_week);
    let mut upcoming_this_week = 0;
    let mut overdue_tasks = 0;
    for task in tasks.iter().filter(|t| t.status == TaskStatus::Pending) {
        let Some(due) = time::parse_due_date(&task.due_date) else { continue };
        if (week_start..=week_end).contains(&due) {
            upcoming_this_week += 1;
        }
        if due < today {
            overdue_tasks += 1;
        }
    }

    let completion_rate = if total_tasks == 0 {
        0.0
    } else {
        round2(completed_tasks as f64 / total_tasks as f64 * 100.0)
    };
    let average_task_duration = if total_tasks == 0 {
        0.0
    } else {
        round2(total_hours_planned / total_tasks as f64)
    };

    TaskStats {
        total_tasks,
        completed_tasks,
        pending_tasks,
        total_hours_planned,
        completed_hours,
        top_tag,
        upcoming_this_week,
        overdue_tasks,
        completion_rate,
        average_task_duration,
    }
}

/// Mode of the tag column; first encountered wins ties.
fn top_tag(tasks: &[Task]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in tasks {
        *counts.entry(task.tag.as_str()).or_insert(0) += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for task in tasks {
        let count = counts[task.tag.as_str()];
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((task.tag.as_str(), count)),
        }
    }
    best.map_or_else(|| "None".to_string(), |(tag, _)| tag.to_string())
}

/// Weekly progress against the configured hour target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    /// Hours of completed work attributed to the current week.
    pub current_week_completed_hours: f64,
    /// Hours of work due in the current week.
    pub current_week_planned_hours: f64,
    /// Completed share of the target, capped at 100 (0 when target is 0).
    pub progress_percentage: f64,
    /// Whether completed hours exceed the target.
    pub is_over_target: bool,
    /// Hours still needed to reach the target (0 when reached).
    pub remaining_hours: f64,
    /// Linear pacing benchmark: `(target / 7) * (dayOfWeek + 1)`.
    pub expected_hours_by_now: f64,
}

/// Compute weekly progress for a task snapshot.
///
/// Completed work is attributed to the week of its `updatedAt` timestamp,
/// falling back to `createdAt` when `updatedAt` does not parse. Planned
/// work is attributed by due date.
#[must_use]
pub fn calculate_weekly_progress(
    tasks: &[Task],
    target_hours: f64,
    today: NaiveDate,
    first_day_of_week: u8,
) -> WeeklyProgress {
    let (week_start, week_end) = week_bounds(today, first_day_of_week);
    let window_start = week_start.and_hms_opt(0, 0, 0).expect("midnight is valid");
    let window_end = week_end
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is valid");

    let completed_minutes: f64 = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Complete)
        .filter(|t| {
            completion_stamp(t)
                .is_some_and(|stamp| stamp >= window_start && stamp <= window_end)
        })
        .map(|t| t.duration)
        .sum();
    let planned_minutes: f64 = tasks
        .iter()
        .filter(|t| {
            time::parse_due_date(&t.due_date)
                .is_some_and(|due| (week_start..=week_end).contains(&due))
        })
        .map(|t| t.duration)
        .sum();

    let completed = round2(completed_minutes / 60.0);
    let planned = round2(planned_minutes / 60.0);

    let progress_percentage = if target_hours > 0.0 {
        round2((completed / target_hours * 100.0).min(100.0))
    } else {
        0.0
    };
    let day_index = day_index_in_week(today, first_day_of_week);
    let expected_hours_by_now = if target_hours > 0.0 {
        round2(target_hours / 7.0 * f64::from(day_index + 1))
    } else {
        0.0
    };

    WeeklyProgress {
        current_week_completed_hours: completed,
        current_week_planned_hours: planned,
        progress_percentage,
        is_over_target: completed > target_hours,
        remaining_hours: round2((target_hours - completed).max(0.0)),
        expected_hours_by_now,
    }
}

/// The instant a completed task counts toward: `updatedAt`, falling back to
/// `createdAt` when `updatedAt` does not parse.
fn completion_stamp(task: &Task) -> Option<NaiveDateTime> {
    time::parse_timestamp_local(&task.updated_at)
        .or_else(|| time::parse_timestamp_local(&task.created_at))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
