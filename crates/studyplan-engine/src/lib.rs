//! # studyplan-engine
//!
//! The behavioral core of the Study Planner:
//!
//! - **[`tasks`]**: in-memory task store (CRUD, id minting, timestamps,
//!   validation at every boundary)
//! - **[`settings`]**: typed settings store with atomic validated writes
//! - **[`query`]**: the pure filter → search → sort pipeline
//! - **[`stats`]**: dashboard statistics and weekly-progress derivation
//! - **[`hub`]**: the observable state hub mediating all mutations,
//!   persistence, and subscriber fan-out
//!
//! The engine is single-threaded cooperative: every mutation runs to
//! completion (persist, then notify) before the next can start, so
//! subscribers always observe consistent snapshots.
//!
//! ## Crate Position
//!
//! Top of the stack; hosts depend on this crate and construct a
//! [`hub::PlannerHub`] with an injected persistence adapter.

#![deny(unsafe_code)]

pub mod hub;
pub mod query;
pub mod settings;
pub mod stats;
pub mod tasks;

pub use hub::{HubConfig, PlannerHub, SubscriberId};
pub use query::{apply_view, filter_tasks, search_tasks, sort_tasks};
pub use stats::{calculate_task_stats, calculate_weekly_progress, TaskStats, WeeklyProgress};
