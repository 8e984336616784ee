//! The pure filter → search → sort pipeline.
//!
//! Filtering runs first so pattern evaluation stays cheap, and sorting runs
//! last to avoid ordering rows that are about to be dropped. Every function
//! here is pure over its inputs; repeated calls on the same snapshot return
//! identical output.

use regex::RegexBuilder;
use tracing::warn;

use chrono::NaiveDate;

use studyplan_core::time;
use studyplan_core::types::{FilterKind, SearchMode, Settings, SortKey, Task, TaskStatus, UiState};

use crate::stats::week_bounds;

/// Longest accepted search pattern; longer queries degrade to substring
/// matching so hostile patterns cannot blow up compilation.
pub const MAX_PATTERN_LEN: usize = 200;

/// Apply a filter to a task snapshot.
///
/// `today` anchors the calendar filters; `first_day_of_week` shapes the
/// `Week` window.
#[must_use]
pub fn filter_tasks(
    tasks: &[Task],
    filter: FilterKind,
    today: NaiveDate,
    first_day_of_week: u8,
) -> Vec<Task> {
    match filter {
        FilterKind::All => tasks.to_vec(),
        FilterKind::Pending => tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect(),
        FilterKind::Completed => tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Complete)
            .cloned()
            .collect(),
        FilterKind::Today => tasks
            .iter()
            .filter(|t| time::parse_due_date(&t.due_date) == Some(today))
            .cloned()
            .collect(),
        FilterKind::Week => {
            let (start, end) = week_bounds(today, first_day_of_week);
            tasks
                .iter()
                .filter(|t| {
                    time::parse_due_date(&t.due_date)
                        .is_some_and(|due| (start..=end).contains(&due))
                })
                .cloned()
                .collect()
        }
        FilterKind::Overdue => tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| time::parse_due_date(&t.due_date).is_some_and(|due| due < today))
            .cloned()
            .collect(),
    }
}

/// Search a task snapshot over title, tag, and status.
///
/// An empty query is the identity. `Text` mode escapes regex metacharacters;
/// `Regex` mode compiles the raw query and falls back to case-insensitive
/// substring matching when compilation fails (logged, never an error).
#[must_use]
pub fn search_tasks(
    tasks: &[Task],
    query: &str,
    mode: SearchMode,
    case_sensitive: bool,
) -> Vec<Task> {
    if query.is_empty() {
        return tasks.to_vec();
    }
    if query.len() > MAX_PATTERN_LEN {
        warn!(len = query.len(), "search pattern over length cap; using substring match");
        return substring_search(tasks, query);
    }

    let pattern = match mode {
        SearchMode::Text => regex::escape(query),
        SearchMode::Regex => query.to_string(),
    };
    match RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(re) => tasks
            .iter()
            .filter(|t| {
                re.is_match(&t.title) || re.is_match(&t.tag) || re.is_match(t.status.as_str())
            })
            .cloned()
            .collect(),
        Err(e) => {
            warn!(query, error = %e, "search pattern failed to compile; using substring match");
            substring_search(tasks, query)
        }
    }
}

/// Case-insensitive substring fallback over the same fields as the regex
/// path.
fn substring_search(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.tag.to_lowercase().contains(&needle)
                || t.status.as_str().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Sort a task snapshot. Stable: ties keep their input order.
#[must_use]
pub fn sort_tasks(tasks: &[Task], key: SortKey) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match key {
        // ISO dates compare correctly as strings.
        SortKey::DateNewest => sorted.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
        SortKey::DateOldest => sorted.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        SortKey::TitleAsc => {
            sorted.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortKey::TitleDesc => {
            sorted.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()));
        }
        SortKey::DurationAsc => sorted.sort_by(|a, b| a.duration.total_cmp(&b.duration)),
        SortKey::DurationDesc => sorted.sort_by(|a, b| b.duration.total_cmp(&a.duration)),
    }
    sorted
}

/// Run the full pipeline as the presentation layer sees it: the UI state
/// supplies filter, query, mode, and sort; settings supply case sensitivity
/// and the week start.
#[must_use]
pub fn apply_view(
    tasks: &[Task],
    ui: &UiState,
    settings: &Settings,
    today: NaiveDate,
) -> Vec<Task> {
    let filtered = filter_tasks(tasks, ui.filter_by, today, settings.first_day_of_week);
    let searched = search_tasks(
        &filtered,
        &ui.search_query,
        ui.search_mode,
        settings.search_case_sensitive,
    );
    sort_tasks(&searched, ui.sort_by)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_core::types::TaskStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(title: &str, due: &str, duration: f64, status: TaskStatus) -> Task {
        Task {
            id: format!("task_1_{title}"),
            title: title.to_string(),
            due_date: due.to_string(),
            duration,
            tag: "General".to_string(),
            status,
            created_at: "2025-03-01T08:00:00+00:00".to_string(),
            updated_at: "2025-03-01T08:00:00+00:00".to_string(),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    // ── filter ───────────────────────────────────────────────────────────

    #[test]
    fn overdue_keeps_past_due_pending_only() {
        // Today is 2025-03-20.
        let tasks = vec![
            task("A", "2025-03-18", 30.0, TaskStatus::Pending),
            task("B", "2025-03-22", 30.0, TaskStatus::Pending),
            task("C", "2025-03-10", 30.0, TaskStatus::Complete),
        ];
        let out = filter_tasks(&tasks, FilterKind::Overdue, date(2025, 3, 20), 0);
        assert_eq!(titles(&out), vec!["A"]);
    }

    #[test]
    fn today_filter_matches_exact_due_date() {
        let tasks = vec![
            task("A", "2025-03-20", 30.0, TaskStatus::Pending),
            task("B", "2025-03-21", 30.0, TaskStatus::Pending),
        ];
        let out = filter_tasks(&tasks, FilterKind::Today, date(2025, 3, 20), 0);
        assert_eq!(titles(&out), vec!["A"]);
    }

    #[test]
    fn week_filter_respects_first_day() {
        // 2025-03-20 is a Thursday. Sunday-start week: 03-16..03-22.
        let tasks = vec![
            task("in", "2025-03-16", 30.0, TaskStatus::Pending),
            task("out", "2025-03-23", 30.0, TaskStatus::Pending),
        ];
        let sunday = filter_tasks(&tasks, FilterKind::Week, date(2025, 3, 20), 0);
        assert_eq!(titles(&sunday), vec!["in"]);
        // Monday-start week: 03-17..03-23 flips both.
        let monday = filter_tasks(&tasks, FilterKind::Week, date(2025, 3, 20), 1);
        assert_eq!(titles(&monday), vec!["out"]);
    }

    #[test]
    fn status_filters() {
        let tasks = vec![
            task("A", "2025-03-20", 30.0, TaskStatus::Pending),
            task("B", "2025-03-20", 30.0, TaskStatus::Complete),
        ];
        assert_eq!(
            titles(&filter_tasks(&tasks, FilterKind::Pending, date(2025, 3, 20), 0)),
            vec!["A"]
        );
        assert_eq!(
            titles(&filter_tasks(&tasks, FilterKind::Completed, date(2025, 3, 20), 0)),
            vec!["B"]
        );
        assert_eq!(
            filter_tasks(&tasks, FilterKind::All, date(2025, 3, 20), 0).len(),
            2
        );
    }

    // ── search ───────────────────────────────────────────────────────────

    #[test]
    fn empty_query_is_identity() {
        let tasks = vec![task("A", "2025-03-20", 30.0, TaskStatus::Pending)];
        let out = search_tasks(&tasks, "", SearchMode::Text, false);
        assert_eq!(out, tasks);
    }

    #[test]
    fn text_mode_escapes_metacharacters() {
        let tasks = vec![
            task("[WIP] report", "2025-03-20", 30.0, TaskStatus::Pending),
            task("Wide project", "2025-03-20", 30.0, TaskStatus::Pending),
        ];
        let out = search_tasks(&tasks, "[WIP]", SearchMode::Text, false);
        assert_eq!(titles(&out), vec!["[WIP] report"]);
    }

    #[test]
    fn text_mode_case_sensitivity_follows_setting() {
        let tasks = vec![task("Essay", "2025-03-20", 30.0, TaskStatus::Pending)];
        assert_eq!(search_tasks(&tasks, "essay", SearchMode::Text, false).len(), 1);
        assert_eq!(search_tasks(&tasks, "essay", SearchMode::Text, true).len(), 0);
    }

    #[test]
    fn regex_mode_compiles_raw_patterns() {
        let tasks = vec![
            task("Essay one", "2025-03-20", 30.0, TaskStatus::Pending),
            task("Lab", "2025-03-20", 30.0, TaskStatus::Pending),
        ];
        let out = search_tasks(&tasks, "^ess", SearchMode::Regex, false);
        assert_eq!(titles(&out), vec!["Essay one"]);
    }

    #[test]
    fn broken_regex_falls_back_to_substring() {
        let tasks = vec![
            task("[WIP]", "2025-03-20", 30.0, TaskStatus::Pending),
            task("done", "2025-03-20", 30.0, TaskStatus::Pending),
        ];
        let out = search_tasks(&tasks, "[", SearchMode::Regex, false);
        assert_eq!(titles(&out), vec!["[WIP]"]);
    }

    #[test]
    fn over_long_pattern_falls_back_to_substring() {
        let tasks = vec![task("aaa", "2025-03-20", 30.0, TaskStatus::Pending)];
        let long = "a".repeat(MAX_PATTERN_LEN + 1);
        assert!(search_tasks(&tasks, &long, SearchMode::Regex, false).is_empty());
    }

    #[test]
    fn search_covers_tag_and_status() {
        let mut a = task("A", "2025-03-20", 30.0, TaskStatus::Pending);
        a.tag = "Chemistry".to_string();
        let b = task("B", "2025-03-20", 30.0, TaskStatus::Complete);
        let tasks = vec![a, b];
        assert_eq!(
            titles(&search_tasks(&tasks, "chem", SearchMode::Text, false)),
            vec!["A"]
        );
        assert_eq!(
            titles(&search_tasks(&tasks, "complete", SearchMode::Text, false)),
            vec!["B"]
        );
    }

    // ── sort ─────────────────────────────────────────────────────────────

    #[test]
    fn date_orderings() {
        let tasks = vec![
            task("mid", "2025-03-20", 30.0, TaskStatus::Pending),
            task("old", "2025-03-10", 30.0, TaskStatus::Pending),
            task("new", "2025-03-30", 30.0, TaskStatus::Pending),
        ];
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::DateNewest)),
            vec!["new", "mid", "old"]
        );
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::DateOldest)),
            vec!["old", "mid", "new"]
        );
    }

    #[test]
    fn title_ordering_is_case_insensitive() {
        let tasks = vec![
            task("banana", "2025-03-20", 30.0, TaskStatus::Pending),
            task("Apple", "2025-03-20", 30.0, TaskStatus::Pending),
            task("cherry", "2025-03-20", 30.0, TaskStatus::Pending),
        ];
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::TitleAsc)),
            vec!["Apple", "banana", "cherry"]
        );
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::TitleDesc)),
            vec!["cherry", "banana", "Apple"]
        );
    }

    #[test]
    fn duration_ordering() {
        let tasks = vec![
            task("long", "2025-03-20", 120.0, TaskStatus::Pending),
            task("short", "2025-03-20", 15.0, TaskStatus::Pending),
            task("none", "2025-03-20", 0.0, TaskStatus::Pending),
        ];
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::DurationAsc)),
            vec!["none", "short", "long"]
        );
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::DurationDesc)),
            vec!["long", "short", "none"]
        );
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let tasks = vec![
            task("first", "2025-03-20", 30.0, TaskStatus::Pending),
            task("second", "2025-03-20", 30.0, TaskStatus::Pending),
            task("third", "2025-03-20", 30.0, TaskStatus::Pending),
        ];
        assert_eq!(
            titles(&sort_tasks(&tasks, SortKey::DateNewest)),
            vec!["first", "second", "third"]
        );
    }

    // ── pipeline ─────────────────────────────────────────────────────────

    #[test]
    fn pipeline_filters_then_searches_then_sorts() {
        let tasks = vec![
            task("beta essay", "2025-03-18", 30.0, TaskStatus::Pending),
            task("alpha essay", "2025-03-19", 30.0, TaskStatus::Pending),
            task("gamma essay", "2025-03-18", 30.0, TaskStatus::Complete),
            task("alpha lab", "2025-03-18", 30.0, TaskStatus::Pending),
        ];
        let ui = UiState {
            filter_by: FilterKind::Pending,
            search_query: "essay".to_string(),
            sort_by: SortKey::TitleAsc,
            ..UiState::default()
        };
        let out = apply_view(&tasks, &ui, &Settings::default(), date(2025, 3, 20));
        assert_eq!(titles(&out), vec!["alpha essay", "beta essay"]);
    }

    #[test]
    fn pipeline_is_pure() {
        let tasks = vec![
            task("A", "2025-03-18", 30.0, TaskStatus::Pending),
            task("B", "2025-03-19", 60.0, TaskStatus::Complete),
        ];
        let ui = UiState::default();
        let settings = Settings::default();
        let first = apply_view(&tasks, &ui, &settings, date(2025, 3, 20));
        let second = apply_view(&tasks, &ui, &settings, date(2025, 3, 20));
        assert_eq!(first, second);
    }

    proptest::proptest! {
        /// Repeated pipeline runs over arbitrary snapshots are deep-equal.
        #[test]
        fn pipeline_pure_over_arbitrary_durations(durations in proptest::collection::vec(0.0f64..1440.0, 0..20)) {
            let tasks: Vec<Task> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| task(&format!("t{i}"), "2025-03-18", (d * 100.0).round() / 100.0, TaskStatus::Pending))
                .collect();
            let ui = UiState { sort_by: SortKey::DurationAsc, ..UiState::default() };
            let settings = Settings::default();
            let first = apply_view(&tasks, &ui, &settings, date(2025, 3, 20));
            let second = apply_view(&tasks, &ui, &settings, date(2025, 3, 20));
            proptest::prop_assert_eq!(first, second);
        }
    }
}
