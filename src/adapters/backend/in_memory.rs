//! In-memory civic backend.
//!
//! Serves a small, fixed sample of US geography with top issues, category
//! suggestions and a task board, and stores submitted proposals, tasks and
//! contributions. Used by the terminal front end and by tests.
//!
//! # Features
//!
//! - Sample data for a handful of states
//! - Failure injection per operation
//! - Simulated latency
//! - Call log for verification
//!
//! # Example
//!
//! ```ignore
//! let backend = InMemoryCivicBackend::with_sample_data()
//!     .with_failure(BackendOperation::FetchCounties, BackendError::unavailable("down"));
//!
//! assert!(backend.fetch_counties(&GeoId::new("06")).await.is_err());
//! assert_eq!(backend.calls(), vec![BackendOperation::FetchCounties]);
//! ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::civic::{
    CategorySuggestion, Contribution, GeoId, Geography, LocationRef, ProposalDraft,
    ProposalReceipt, Task, TaskDraft, TaskStatus, TaskUpdate, TopIssue,
};
use crate::domain::secretary::normalize;
use crate::ports::{BackendError, BackendOperation, CivicBackend};

/// Category with the keywords that select it in a search.
#[derive(Debug, Clone)]
struct CategoryEntry {
    suggestion: CategorySuggestion,
    keywords: Vec<&'static str>,
}

#[derive(Debug, Default)]
struct BackendState {
    states: Vec<Geography>,
    counties: Vec<Geography>,
    places: Vec<Geography>,
    /// Top issues keyed by county id.
    top_issues: HashMap<GeoId, Vec<TopIssue>>,
    categories: Vec<CategoryEntry>,
    proposals: Vec<(ProposalReceipt, ProposalDraft)>,
    tasks: Vec<Task>,
    contributions: Vec<Contribution>,
    failures: HashMap<BackendOperation, BackendError>,
    calls: Vec<BackendOperation>,
}

/// In-memory implementation of [`CivicBackend`].
///
/// Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCivicBackend {
    state: Arc<Mutex<BackendState>>,
    delay: Duration,
}

impl InMemoryCivicBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend seeded with sample geography, issues and categories.
    pub fn with_sample_data() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            seed(&mut state);
        }
        backend
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes an operation fail until [`recover`](Self::recover) is called.
    pub fn with_failure(self, operation: BackendOperation, error: BackendError) -> Self {
        self.fail(operation, error);
        self
    }

    pub fn fail(&self, operation: BackendOperation, error: BackendError) {
        self.lock().failures.insert(operation, error);
    }

    pub fn recover(&self, operation: BackendOperation) {
        self.lock().failures.remove(&operation);
    }

    /// Replaces the top issues reported in a county.
    pub fn set_top_issues(&self, county_id: &GeoId, issues: Vec<TopIssue>) {
        self.lock().top_issues.insert(county_id.clone(), issues);
    }

    // === Test Helpers ===

    /// Operations called so far, in call order.
    pub fn calls(&self) -> Vec<BackendOperation> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: BackendOperation) -> usize {
        self.lock().calls.iter().filter(|op| **op == operation).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn proposals(&self) -> Vec<ProposalDraft> {
        self.lock().proposals.iter().map(|(_, draft)| draft.clone()).collect()
    }

    pub fn contributions(&self) -> Vec<Contribution> {
        self.lock().contributions.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call, waits out the configured latency, then applies any injected failure.
    async fn begin(&self, operation: BackendOperation) -> Result<(), BackendError> {
        self.lock().calls.push(operation);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        match self.lock().failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn in_location(task_location: &LocationRef, location: &LocationRef) -> bool {
    task_location.state_id == location.state_id
        && (location.county_id.is_none() || task_location.county_id == location.county_id)
}

#[async_trait]
impl CivicBackend for InMemoryCivicBackend {
    async fn fetch_states(&self) -> Result<Vec<Geography>, BackendError> {
        self.begin(BackendOperation::FetchStates).await?;
        Ok(self.lock().states.clone())
    }

    async fn fetch_counties(&self, state_id: &GeoId) -> Result<Vec<Geography>, BackendError> {
        self.begin(BackendOperation::FetchCounties).await?;
        Ok(self
            .lock()
            .counties
            .iter()
            .filter(|county| county.is_within_state(state_id))
            .cloned()
            .collect())
    }

    async fn fetch_places(
        &self,
        state_id: &GeoId,
        county_id: Option<&GeoId>,
    ) -> Result<Vec<Geography>, BackendError> {
        self.begin(BackendOperation::FetchPlaces).await?;
        Ok(self
            .lock()
            .places
            .iter()
            .filter(|place| place.is_within_state(state_id))
            .filter(|place| county_id.map_or(true, |county| place.is_within_county(county)))
            .cloned()
            .collect())
    }

    async fn fetch_top_issues(&self, location: &LocationRef) -> Result<Vec<TopIssue>, BackendError> {
        self.begin(BackendOperation::FetchTopIssues).await?;
        let state = self.lock();
        let mut issues: Vec<TopIssue> = match &location.county_id {
            Some(county_id) => state.top_issues.get(county_id).cloned().unwrap_or_default(),
            None => state
                .counties
                .iter()
                .filter(|county| county.is_within_state(&location.state_id))
                .filter_map(|county| state.top_issues.get(&county.id))
                .flatten()
                .cloned()
                .collect(),
        };
        issues.sort_by(|a, b| b.report_count.cmp(&a.report_count));
        Ok(issues)
    }

    async fn fetch_category_suggestions(
        &self,
        term: &str,
    ) -> Result<Vec<CategorySuggestion>, BackendError> {
        self.begin(BackendOperation::FetchCategorySuggestions).await?;
        let term = normalize(term);
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .lock()
            .categories
            .iter()
            .filter(|entry| {
                term.split_whitespace().any(|word| {
                    entry
                        .keywords
                        .iter()
                        .any(|keyword| word.starts_with(keyword) || word.ends_with(keyword))
                }) || entry.suggestion.name.to_lowercase().contains(&term)
            })
            .map(|entry| entry.suggestion.clone())
            .collect())
    }

    async fn submit_proposal(&self, draft: ProposalDraft) -> Result<ProposalReceipt, BackendError> {
        self.begin(BackendOperation::SubmitProposal).await?;
        if draft.description.trim().is_empty() {
            return Err(BackendError::rejected("proposal description is empty"));
        }
        let mut state = self.lock();
        let receipt = ProposalReceipt {
            proposal_id: format!("proposal-{}", state.proposals.len() + 1),
            submitted_at: Utc::now(),
        };
        state.proposals.push((receipt.clone(), draft));
        Ok(receipt)
    }

    async fn create_task(&self, draft: TaskDraft) -> Result<Task, BackendError> {
        self.begin(BackendOperation::CreateTask).await?;
        let mut state = self.lock();
        let task = Task {
            id: format!("task-{}", state.tasks.len() + 1),
            location: draft.location,
            title: draft.title,
            status: TaskStatus::Open,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, location: &LocationRef) -> Result<Vec<Task>, BackendError> {
        self.begin(BackendOperation::ListTasks).await?;
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|task| in_location(&task.location, location))
            .cloned()
            .collect())
    }

    async fn update_task(&self, update: TaskUpdate) -> Result<Task, BackendError> {
        self.begin(BackendOperation::UpdateTask).await?;
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == update.id)
            .ok_or_else(|| BackendError::not_found(format!("task {}", update.id)))?;
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        Ok(task.clone())
    }

    async fn log_contribution(&self, contribution: Contribution) -> Result<(), BackendError> {
        self.begin(BackendOperation::LogContribution).await?;
        self.lock().contributions.push(contribution);
        Ok(())
    }
}

fn seed(state: &mut BackendState) {
    let california = Geography::state("06", "California", "CA");
    let texas = Geography::state("48", "Texas", "TX");
    let indiana = Geography::state("18", "Indiana", "IN");
    let new_york = Geography::state("36", "New York", "NY");

    let alameda = Geography::county("06001", "Alameda County", &california.id);
    let san_francisco = Geography::county("06075", "San Francisco County", &california.id);
    let los_angeles = Geography::county("06037", "Los Angeles County", &california.id);
    let travis = Geography::county("48453", "Travis County", &texas.id);
    let harris = Geography::county("48201", "Harris County", &texas.id);
    let marion = Geography::county("18097", "Marion County", &indiana.id);
    let kings = Geography::county("36047", "Kings County", &new_york.id);

    state.places = vec![
        Geography::place("0653000", "Oakland", &california.id, &alameda.id),
        Geography::place("0606000", "Berkeley", &california.id, &alameda.id),
        Geography::place("0667000", "San Francisco", &california.id, &san_francisco.id),
        Geography::place("0644000", "Los Angeles", &california.id, &los_angeles.id),
        Geography::place("4805000", "Austin", &texas.id, &travis.id),
        Geography::place("4835000", "Houston", &texas.id, &harris.id),
        Geography::place("1836003", "Indianapolis", &indiana.id, &marion.id),
        Geography::place("3610022", "Brooklyn", &new_york.id, &kings.id),
    ];

    state.top_issues.insert(
        alameda.id.clone(),
        vec![
            TopIssue::new("issue-alameda-1", "Potholes on International Blvd", "Streets & Sidewalks")
                .with_report_count(14),
            TopIssue::new("issue-alameda-2", "Broken streetlights near Lake Merritt", "Street Lighting")
                .with_report_count(9),
            TopIssue::new("issue-alameda-3", "Illegal dumping under the freeway", "Trash & Sanitation")
                .with_report_count(6),
        ],
    );
    state.top_issues.insert(
        travis.id.clone(),
        vec![
            TopIssue::new("issue-travis-1", "Flooding on low water crossings", "Water & Drainage")
                .with_report_count(11),
            TopIssue::new("issue-travis-2", "Missing sidewalks on Burnet Rd", "Streets & Sidewalks")
                .with_report_count(4),
        ],
    );

    let alameda_location = LocationRef::from_parts(&california, Some(&alameda), None);
    state.tasks = vec![
        Task {
            id: "task-1".to_string(),
            location: alameda_location.clone(),
            title: "Collect signatures for crosswalk petition".to_string(),
            status: TaskStatus::Open,
        },
        Task {
            id: "task-2".to_string(),
            location: alameda_location,
            title: "Photograph damaged streetlights".to_string(),
            status: TaskStatus::Done,
        },
    ];

    state.categories = vec![
        category(
            "streets",
            "Streets & Sidewalks",
            "Roads, potholes, sidewalks and crosswalks",
            &["pothole", "road", "street", "sidewalk", "crosswalk", "traffic"],
        ),
        category(
            "lighting",
            "Street Lighting",
            "Broken or missing street lights",
            &["light", "lamp", "dark"],
        ),
        category(
            "sanitation",
            "Trash & Sanitation",
            "Litter, dumping and missed pickups",
            &["trash", "garbage", "litter", "dumping", "recycling"],
        ),
        category(
            "parks",
            "Parks & Recreation",
            "Parks, playgrounds, trails and trees",
            &["park", "playground", "trail", "tree"],
        ),
        category(
            "safety",
            "Public Safety",
            "Speeding, crime and hazards",
            &["safety", "crime", "speeding", "hazard", "noise"],
        ),
        category(
            "water",
            "Water & Drainage",
            "Flooding, leaks and storm drains",
            &["water", "flood", "drain", "sewer", "leak"],
        ),
        category(
            "housing",
            "Housing",
            "Rent, evictions and shelter",
            &["housing", "rent", "eviction", "homeless", "shelter"],
        ),
        category("transit", "Transit", "Buses, trains and stops", &["bus", "transit", "train", "stop"]),
    ];

    state.states = vec![california, texas, indiana, new_york];
    state.counties = vec![alameda, san_francisco, los_angeles, travis, harris, marion, kings];
}

fn category(id: &str, name: &str, description: &str, keywords: &[&'static str]) -> CategoryEntry {
    CategoryEntry {
        suggestion: CategorySuggestion::new(id, name).with_description(description),
        keywords: keywords.to_vec(),
    }
}
