//! Task board entries attached to a local instance.

use serde::{Deserialize, Serialize};

use super::geography::LocationRef;

/// Lifecycle of a task on an instance's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns true while the task still needs work.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub location: LocationRef,
    pub title: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub location: LocationRef,
    pub title: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    pub fn status(id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            title: None,
            status: Some(status),
        }
    }
}
