//! Issue reports, categories and contributions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geography::LocationRef;

/// An issue already reported by others at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopIssue {
    pub id: String,
    pub title: String,
    pub category: String,
    pub report_count: u32,
}

impl TopIssue {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            report_count: 0,
        }
    }

    pub fn with_report_count(mut self, count: u32) -> Self {
        self.report_count = count;
        self
    }
}

/// A category proposed for an issue description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl CategorySuggestion {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A user-typed category with no backend id.
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("custom:{}", name.to_lowercase()),
            name,
            description: None,
        }
    }
}

/// Proposal submitted when a report finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub location: LocationRef,
    pub description: String,
    pub category: String,
}

/// Backend acknowledgement of a submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalReceipt {
    pub proposal_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// What kind of civic contribution a user made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    IssueReported,
    IssueEndorsed,
}

/// Contribution log entry recorded after a successful report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub kind: ContributionKind,
    pub location: LocationRef,
    pub reference_id: String,
    pub recorded_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(kind: ContributionKind, location: LocationRef, reference_id: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            reference_id: reference_id.into(),
            recorded_at: Utc::now(),
        }
    }
}
