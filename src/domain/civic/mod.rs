//! Civic domain vocabulary shared with the backend port.
//!
//! Geography records, issue reports, category suggestions and task board
//! entries. These are plain data; the backend adapter owns their storage.

mod geography;
mod issues;
mod tasks;

pub use geography::{GeoId, GeoLevel, Geography, LocationRef};
pub use issues::{
    CategorySuggestion, Contribution, ContributionKind, ProposalDraft, ProposalReceipt, TopIssue,
};
pub use tasks::{Task, TaskDraft, TaskStatus, TaskUpdate};
