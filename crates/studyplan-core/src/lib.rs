//! # studyplan-core
//!
//! Foundation types, errors, ids, and utilities for the Study Planner engine.
//!
//! This crate provides the shared vocabulary that the other Study Planner
//! crates depend on:
//!
//! - **Domain types**: [`types::Task`], [`types::Settings`], [`types::UiState`],
//!   the persisted-state snapshot pair, and the [`types::ChangeRecord`]
//!   broadcast to subscribers
//! - **Errors**: [`errors::PlannerError`] hierarchy via `thiserror`, with
//!   stable machine-readable kinds
//! - **Ids**: [`ids::mint_task_id`] for the `task_<epochMs>_<base36>` format
//! - **Duration utilities**: minutes/hours conversion, formatting, and input
//!   parsing in [`duration`]
//! - **Validation**: field and whole-entity validators in [`validate`]
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `studyplan-store` and `studyplan-engine`.

#![deny(unsafe_code)]

pub mod duration;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod time;
pub mod types;
pub mod validate;
