//! The task record stored and served by Taskboard.

use serde::{Deserialize, Serialize};

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// A titled, identifiable, completable record.
///
/// `id` is assigned once by the store at creation and never reused or
/// mutated. `title` is non-empty after trimming (callers validate before
/// handing it to the store). `done` defaults to `false` at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, strictly increasing per store instance.
    pub id: i64,
    /// Human-readable title, trimmed and non-empty.
    pub title: String,
    /// Completion flag.
    pub done: bool,
}

impl Task {
    /// Creates an open (not done) task with the given id and title.
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }
}
