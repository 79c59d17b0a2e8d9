//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in the task file.
//! - Own title normalization and identity validation rules.
//!
//! # Invariants
//! - `id` is positive and never changes after creation.
//! - `title` is trimmed and non-empty for every task built through
//!   [`Task::new`].
//! - `created_at` is captured once, with second precision.

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric task identity.
///
/// Assigned by the service as `1 + max(existing)` and never recycled.
pub type TaskId = u64;

/// Timestamp layout used for `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Validation errors for task construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Task ids start at 1.
    InvalidId(TaskId),
    /// The id after `TaskId::MAX` cannot be issued.
    IdsExhausted,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::InvalidId(id) => write!(f, "task id must be positive, got {id}"),
            Self::IdsExhausted => write!(f, "no task ids left above {}", TaskId::MAX),
        }
    }
}

impl Error for TaskValidationError {}

/// Single to-do item.
///
/// Serialized field names match the task file; reading goes through the
/// repository's record decoder instead of `Deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub done: bool,
    /// `YYYY-MM-DDTHH:MM:SS` local time, or empty when unknown.
    pub created_at: String,
}

impl Task {
    /// Creates an open task stamped with the current local time.
    ///
    /// # Errors
    /// - `InvalidId` when `id == 0`.
    /// - `EmptyTitle` when `title` is blank after trimming.
    pub fn new(id: TaskId, title: &str) -> Result<Self, TaskValidationError> {
        Self::with_created_at(id, title, current_timestamp())
    }

    /// Creates an open task with a caller-provided creation timestamp.
    ///
    /// Used by tests and import paths where the timestamp already exists.
    pub fn with_created_at(
        id: TaskId,
        title: &str,
        created_at: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        if id == 0 {
            return Err(TaskValidationError::InvalidId(id));
        }
        Ok(Self {
            id,
            title: normalize_title(title)?,
            done: false,
            created_at: created_at.into(),
        })
    }

    /// Flips completion state and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.done = !self.done;
        self.done
    }
}

/// Trims `raw` and rejects blank titles.
pub fn normalize_title(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Current local time in [`CREATED_AT_FORMAT`].
pub fn current_timestamp() -> String {
    Local::now().format(CREATED_AT_FORMAT).to_string()
}
