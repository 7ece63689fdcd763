//! Backend lookups and the data each node needs on entry.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Brain, Interrupted, Step};
use crate::domain::civic::{Contribution, ContributionKind, GeoId, ProposalDraft};
use crate::domain::secretary::{copy, FlowAction, NodeId};
use crate::ports::{BackendError, BackendOperation, CivicBackend};

impl Brain {
    fn backend(&self) -> Option<Arc<dyn CivicBackend>> {
        if self.backend.is_none() {
            debug!(session = %self.ctx.session_id(), "no backend configured, skipping lookup");
        }
        self.backend.clone()
    }

    /// Runs one backend call under the session token and the call timeout.
    ///
    /// A failure or timeout is logged and comes back as `Ok(None)`.
    async fn call<T, F>(&self, operation: BackendOperation, request: F) -> Result<Option<T>, Interrupted>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let session = self.ctx.session_id();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(session = %session, operation = %operation, "backend call cancelled");
                Err(Interrupted)
            }
            outcome = tokio::time::timeout(self.config.backend_timeout(), request) => match outcome {
                Ok(Ok(value)) => Ok(Some(value)),
                Ok(Err(error)) => Ok(self.degrade(operation, error)),
                Err(_) => {
                    let timeout_ms = self.config.backend_timeout_ms;
                    Ok(self.degrade(operation, BackendError::Timeout { timeout_ms }))
                }
            },
        }
    }

    fn degrade<T>(&self, operation: BackendOperation, error: BackendError) -> Option<T> {
        warn!(
            session = %self.ctx.session_id(),
            operation = %operation,
            transient = error.is_transient(),
            error = %error,
            "backend call failed"
        );
        None
    }

    /// Waits out the pacing delay before a completion hands off.
    pub(super) async fn pause(&self) -> Step {
        let delay = self.config.navigation_delay();
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    pub(super) async fn ensure_states(&mut self) -> Step {
        if self.ctx.catalog().has_states() {
            return Ok(());
        }
        let Some(backend) = self.backend() else {
            return Ok(());
        };
        if let Some(states) = self
            .call(BackendOperation::FetchStates, backend.fetch_states())
            .await?
        {
            self.ctx.catalog_mut().set_states(states);
        }
        Ok(())
    }

    /// Loads counties and places for a state unless already cached.
    ///
    /// Places are cached separately, so a failed place lookup is retried on
    /// the next call even when the counties arrived.
    pub(super) async fn ensure_children(&mut self, state_id: &GeoId) -> Step {
        let catalog = self.ctx.catalog();
        if catalog.has_children_of(state_id) && catalog.has_places_of(state_id) {
            return Ok(());
        }
        let Some(backend) = self.backend() else {
            return Ok(());
        };
        if !self.ctx.catalog().has_children_of(state_id) {
            let Some(counties) = self
                .call(BackendOperation::FetchCounties, backend.fetch_counties(state_id))
                .await?
            else {
                return Ok(());
            };
            self.ctx.catalog_mut().set_state_counties(state_id, counties);
        }
        if let Some(places) = self
            .call(BackendOperation::FetchPlaces, backend.fetch_places(state_id, None))
            .await?
        {
            self.ctx.catalog_mut().set_state_places(state_id, places);
        }
        Ok(())
    }

    /// Replaces the suggestion chips with categories matching `term`.
    pub(super) async fn load_suggestions(&mut self, term: &str) -> Step {
        let suggestions = match self.backend() {
            Some(backend) => self
                .call(
                    BackendOperation::FetchCategorySuggestions,
                    backend.fetch_category_suggestions(term),
                )
                .await?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        self.ctx.board_mut().suggestions = suggestions;
        Ok(())
    }

    /// Fetches whatever the current node shows.
    pub(super) async fn load_node_data(&mut self) -> Step {
        match self.ctx.current_node() {
            NodeId::DiscoverySelectState => {
                self.ensure_states().await?;
                if !self.ctx.catalog().has_states() {
                    self.ctx.say(copy::GEOGRAPHY_UNAVAILABLE);
                }
            }
            NodeId::DiscoverySelectLocation => {
                let Some(state_id) = self.ctx.discovery().state.as_ref().map(|s| s.id.clone()) else {
                    return Ok(());
                };
                self.ensure_children(&state_id).await?;
                if !self.ctx.catalog().has_children_of(&state_id) {
                    self.ctx.say(copy::GEOGRAPHY_UNAVAILABLE);
                }
            }
            NodeId::DiscoveryResult => self.load_open_tasks().await?,
            NodeId::DiscoveryTopIssues => {
                self.fetch_top_issues().await?;
                self.announce_top_issues();
            }
            NodeId::ReportLoading => {
                self.fetch_top_issues().await?;
                self.graph.dispatch(&mut self.ctx, &FlowAction::IssuesLoaded);
            }
            NodeId::ReportShowSuggestions => {
                let term = self.ctx.report().description.clone().unwrap_or_default();
                self.load_suggestions(&term).await?;
                if self.ctx.board().suggestions.is_empty() {
                    self.ctx.say(copy::NO_SUGGESTIONS);
                }
            }
            NodeId::ReportComplete => self.submit_report().await?,
            NodeId::Menu
            | NodeId::UnknownInputRecovery
            | NodeId::ReportTopIssues
            | NodeId::ReportCollectDescription
            | NodeId::ReportCustomCategory
            | NodeId::IntentSlotFilling => {}
        }
        Ok(())
    }

    async fn load_open_tasks(&mut self) -> Step {
        let Some(location) = self.ctx.discovery().location() else {
            return Ok(());
        };
        let Some(backend) = self.backend() else {
            return Ok(());
        };
        if let Some(tasks) = self
            .call(BackendOperation::ListTasks, backend.list_tasks(&location))
            .await?
        {
            let open = tasks.iter().filter(|task| task.status.is_open()).count();
            self.ctx.board_mut().open_task_count = Some(open);
            self.ctx.say(copy::open_tasks(open));
        }
        Ok(())
    }

    async fn fetch_top_issues(&mut self) -> Step {
        let Some(location) = self.ctx.discovery().location() else {
            return Ok(());
        };
        let Some(backend) = self.backend() else {
            return Ok(());
        };
        let issues = self
            .call(BackendOperation::FetchTopIssues, backend.fetch_top_issues(&location))
            .await?
            .unwrap_or_default();
        self.ctx.board_mut().top_issues = issues;
        Ok(())
    }

    fn announce_top_issues(&mut self) {
        let Some(location) = self.ctx.discovery().location() else {
            return;
        };
        if self.ctx.board().top_issues.is_empty() {
            self.ctx.say(copy::TOP_ISSUES_UNAVAILABLE);
            return;
        }
        let lines: Vec<String> = self
            .ctx
            .board()
            .top_issues
            .iter()
            .map(|issue| copy::issue_line(&issue.title, issue.report_count))
            .collect();
        self.ctx.say(copy::loading_top_issues(&location.label));
        for line in lines {
            self.ctx.say(line);
        }
    }

    /// Submits the report draft and logs the contribution.
    async fn submit_report(&mut self) -> Step {
        let report = self.ctx.report().clone();
        let receipt = match (self.ctx.discovery().location(), self.backend()) {
            (Some(location), Some(backend)) => {
                let draft = ProposalDraft {
                    location: location.clone(),
                    description: report.description.clone().unwrap_or_default(),
                    category: report
                        .category
                        .as_ref()
                        .map(|category| category.name.clone())
                        .unwrap_or_default(),
                };
                let receipt = self
                    .call(BackendOperation::SubmitProposal, backend.submit_proposal(draft))
                    .await?;
                if let Some(receipt) = &receipt {
                    let kind = if report.endorsed_issue.is_some() {
                        ContributionKind::IssueEndorsed
                    } else {
                        ContributionKind::IssueReported
                    };
                    let contribution = Contribution::new(kind, location, receipt.proposal_id.clone());
                    self.call(
                        BackendOperation::LogContribution,
                        backend.log_contribution(contribution),
                    )
                    .await?;
                }
                receipt
            }
            _ => None,
        };

        match receipt {
            Some(receipt) => {
                info!(
                    session = %self.ctx.session_id(),
                    proposal_id = %receipt.proposal_id,
                    "report submitted"
                );
                self.ctx.say(copy::submitted(&receipt.proposal_id));
                self.ctx.report_mut().receipt = Some(receipt);
            }
            None => {
                self.ctx.report_mut().submission_failed = true;
                self.ctx.say(copy::SUBMIT_FAILED);
            }
        }
        Ok(())
    }
}
