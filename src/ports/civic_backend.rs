//! Civic Backend Port - Interface to the remote civic data service.
//!
//! The secretary reads geography and issue data through this port and writes
//! proposals, tasks and contribution log entries back. Every operation is
//! async and individually fallible; callers in the application layer degrade
//! failures to empty results instead of propagating them to the UI.
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! impl CivicBackend for HttpCivicBackend {
//!     async fn fetch_states(&self) -> Result<Vec<Geography>, BackendError> {
//!         self.get("/geography/states").await
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::civic::{
    CategorySuggestion, Contribution, GeoId, Geography, LocationRef, ProposalDraft,
    ProposalReceipt, Task, TaskDraft, TaskUpdate, TopIssue,
};

/// Port for the civic data service.
#[async_trait]
pub trait CivicBackend: Send + Sync {
    /// All states, in display order.
    async fn fetch_states(&self) -> Result<Vec<Geography>, BackendError>;

    /// Counties of a state.
    async fn fetch_counties(&self, state_id: &GeoId) -> Result<Vec<Geography>, BackendError>;

    /// Places of a state, optionally narrowed to one county.
    async fn fetch_places(
        &self,
        state_id: &GeoId,
        county_id: Option<&GeoId>,
    ) -> Result<Vec<Geography>, BackendError>;

    /// Most reported issues at a location, most reported first.
    async fn fetch_top_issues(&self, location: &LocationRef) -> Result<Vec<TopIssue>, BackendError>;

    /// Categories matching a free-text search term.
    async fn fetch_category_suggestions(
        &self,
        term: &str,
    ) -> Result<Vec<CategorySuggestion>, BackendError>;

    async fn submit_proposal(&self, draft: ProposalDraft) -> Result<ProposalReceipt, BackendError>;

    async fn create_task(&self, draft: TaskDraft) -> Result<Task, BackendError>;

    async fn list_tasks(&self, location: &LocationRef) -> Result<Vec<Task>, BackendError>;

    async fn update_task(&self, update: TaskUpdate) -> Result<Task, BackendError>;

    /// Records a user contribution for the activity log.
    async fn log_contribution(&self, contribution: Contribution) -> Result<(), BackendError>;
}

/// Names of backend operations, used for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOperation {
    FetchStates,
    FetchCounties,
    FetchPlaces,
    FetchTopIssues,
    FetchCategorySuggestions,
    SubmitProposal,
    CreateTask,
    ListTasks,
    UpdateTask,
    LogContribution,
}

impl BackendOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchStates => "fetch_states",
            Self::FetchCounties => "fetch_counties",
            Self::FetchPlaces => "fetch_places",
            Self::FetchTopIssues => "fetch_top_issues",
            Self::FetchCategorySuggestions => "fetch_category_suggestions",
            Self::SubmitProposal => "submit_proposal",
            Self::CreateTask => "create_task",
            Self::ListTasks => "list_tasks",
            Self::UpdateTask => "update_task",
            Self::LogContribution => "log_contribution",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the civic backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Service could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("backend call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl BackendError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for failures worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_readable() {
        assert_eq!(
            BackendError::unavailable("connection refused").to_string(),
            "backend unavailable: connection refused"
        );
        assert_eq!(
            BackendError::Timeout { timeout_ms: 250 }.to_string(),
            "backend call timed out after 250ms"
        );
        assert_eq!(BackendError::not_found("task t-1").to_string(), "not found: task t-1");
    }

    #[test]
    fn only_unavailable_and_timeout_are_transient() {
        assert!(BackendError::unavailable("x").is_transient());
        assert!(BackendError::Timeout { timeout_ms: 1 }.is_transient());
        assert!(!BackendError::rejected("x").is_transient());
    }

    #[test]
    fn operation_names_match_serde() {
        let json = serde_json::to_string(&BackendOperation::FetchTopIssues).unwrap();
        assert_eq!(json, format!("\"{}\"", BackendOperation::FetchTopIssues.as_str()));
    }

    // Compile-time check that the trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn CivicBackend) {}
}
