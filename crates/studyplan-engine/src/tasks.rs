//! In-memory task store: CRUD with id minting, timestamps, and validation.
//!
//! The store owns the task collection exclusively; every mutation validates
//! the whole entity before committing, so a failed operation leaves the
//! collection untouched. `createdAt` is immutable after creation and
//! `updatedAt` is refreshed on every change.

use tracing::warn;

use studyplan_core::errors::{PlannerError, Result};
use studyplan_core::ids::mint_task_id;
use studyplan_core::time;
use studyplan_core::types::{Task, TaskDraft, TaskPatch, TaskStatus};
use studyplan_core::validate::{self, TagRules};

/// The task collection.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from loaded tasks, dropping any that no longer validate.
    ///
    /// Loaded data went through validation when it was written, so drops
    /// only happen after external tampering or a schema change; each one is
    /// logged.
    #[must_use]
    pub fn from_loaded(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        for task in tasks {
            match validate::validate_task(&task, TagRules::Import) {
                Ok(task) => store.tasks.push(task),
                Err(errors) => {
                    warn!(id = %task.id, %errors, "dropping invalid persisted task");
                }
            }
        }
        store
    }

    /// Defensive copy of all tasks, in store order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Borrow the tasks without copying (internal read paths).
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replace the whole collection (import and restore paths; the caller
    /// is responsible for having validated the tasks).
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Create a task from `draft`, filling defaults, minting an id, and
    /// stamping both timestamps with the current instant.
    pub fn add(&mut self, draft: TaskDraft, default_tag: &str) -> Result<Task> {
        let now = time::now_iso();
        let tag = match draft.tag {
            Some(tag) if !tag.trim().is_empty() => tag,
            _ => default_tag.to_string(),
        };
        let candidate = Task {
            id: mint_task_id(),
            title: draft.title,
            due_date: draft.due_date,
            duration: draft.duration.unwrap_or(0.0),
            tag,
            status: draft.status.unwrap_or(TaskStatus::Pending),
            created_at: now.clone(),
            updated_at: now,
        };
        let task = validate::validate_task(&candidate, TagRules::Form)
            .map_err(PlannerError::InvalidTask)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Apply `patch` to the task with `id`, refreshing `updatedAt`.
    ///
    /// The merged entity is revalidated before commit; on failure the
    /// stored task is unchanged.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PlannerError::NotFound { id: id.to_string() })?;

        let mut candidate = self.tasks[index].clone();
        if let Some(ref title) = patch.title {
            candidate.title = title.clone();
        }
        if let Some(ref due_date) = patch.due_date {
            candidate.due_date = due_date.clone();
        }
        if let Some(duration) = patch.duration {
            candidate.duration = duration;
        }
        if let Some(ref tag) = patch.tag {
            candidate.tag = tag.clone();
        }
        if let Some(status) = patch.status {
            candidate.status = status;
        }
        candidate.updated_at = time::now_iso();

        let task = validate::validate_task(&candidate, TagRules::Form)
            .map_err(PlannerError::InvalidTask)?;
        self.tasks[index] = task.clone();
        Ok(task)
    }

    /// Remove the task with `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PlannerError::NotFound { id: id.to_string() })?;
        Ok(self.tasks.remove(index))
    }

    /// Flip a task between `Pending` and `Complete`.
    pub fn toggle(&mut self, id: &str) -> Result<Task> {
        let status = self
            .get(id)
            .ok_or_else(|| PlannerError::NotFound { id: id.to_string() })?
            .status
            .toggled();
        self.update(id, &TaskPatch::status(status))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
