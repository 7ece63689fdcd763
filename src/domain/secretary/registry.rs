//! Per-intent flow declarations.
//!
//! Each intent names the slots it needs, the order in which to ask for them,
//! and a completion action run once every required slot is filled.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::context::ConversationContext;
use super::intent::Intent;
use super::navigation::{NavigationRequest, DESTINATION_CREATE_INSTANCE, DESTINATION_REPORT_ISSUE};
use super::slots::SlotName;

/// What finishing an intent led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The host was asked to open another page.
    Navigated(NavigationRequest),
    /// Show the discovery result for the slot-filled location.
    ShowDiscoveryResult,
    /// Show top issues for the slot-filled location.
    ShowTopIssues,
    /// List categories matching the description.
    ShowCategories,
}

/// Completion callback registered for an intent.
pub type CompletionAction = Arc<dyn Fn(&ConversationContext) -> CompletionOutcome + Send + Sync>;

/// Registry entry for one intent.
#[derive(Clone)]
pub struct IntentFlow {
    pub intent: Intent,
    pub required_slots: &'static [SlotName],
    /// Every slot worth asking about, in asking order. May list optional slots.
    pub prompt_order: &'static [SlotName],
    pub completion: CompletionAction,
}

impl IntentFlow {
    pub fn is_required(&self, slot: SlotName) -> bool {
        self.required_slots.contains(&slot)
    }
}

impl fmt::Debug for IntentFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentFlow")
            .field("intent", &self.intent)
            .field("required_slots", &self.required_slots)
            .field("prompt_order", &self.prompt_order)
            .finish_non_exhaustive()
    }
}

const LOCATION_REQUIRED: &[SlotName] = &[SlotName::State, SlotName::County];
const LOCATION_ORDER: &[SlotName] = &[SlotName::State, SlotName::County, SlotName::Place];

/// Required slots and prompt order for each intent.
pub fn slot_plan(intent: Intent) -> (&'static [SlotName], &'static [SlotName]) {
    match intent {
        Intent::ReportIssue => (
            &[
                SlotName::State,
                SlotName::County,
                SlotName::IssueDescription,
                SlotName::IssueCategory,
            ],
            &[
                SlotName::State,
                SlotName::County,
                SlotName::Place,
                SlotName::IssueDescription,
                SlotName::IssueCategory,
            ],
        ),
        Intent::CreateInstance | Intent::FindInstance | Intent::TopIssues => {
            (LOCATION_REQUIRED, LOCATION_ORDER)
        }
        Intent::AskCategory => (
            &[SlotName::IssueDescription],
            &[SlotName::IssueDescription, SlotName::IssueCategory],
        ),
    }
}

/// Outcome each intent produces when nothing else is wired in.
///
/// Navigating intents build their request here; callers decide whether to
/// hand it to a navigator.
pub fn standard_outcome(intent: Intent, ctx: &ConversationContext) -> CompletionOutcome {
    match intent {
        Intent::ReportIssue => {
            let mut request = location_request(DESTINATION_REPORT_ISSUE, ctx);
            if let Some(description) = ctx.slots().issue_description() {
                request = request.with_param("description", description);
            }
            if let Some(category) = ctx.slots().issue_category() {
                request = request.with_param("category", category);
            }
            CompletionOutcome::Navigated(request)
        }
        Intent::CreateInstance => {
            CompletionOutcome::Navigated(location_request(DESTINATION_CREATE_INSTANCE, ctx))
        }
        Intent::FindInstance => CompletionOutcome::ShowDiscoveryResult,
        Intent::TopIssues => CompletionOutcome::ShowTopIssues,
        Intent::AskCategory => CompletionOutcome::ShowCategories,
    }
}

fn location_request(destination: &str, ctx: &ConversationContext) -> NavigationRequest {
    let slots = ctx.slots();
    let mut request = NavigationRequest::new(destination).closing();
    if let Some(state) = slots.state() {
        request = request.with_param("state_id", state.id.as_str());
    }
    if let Some(county) = slots.county() {
        request = request.with_param("county_id", county.id.as_str());
    }
    if let Some(place) = slots.place() {
        request = request.with_param("place_id", place.id.as_str());
    }
    request
}

/// Lookup table from intent to its flow.
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: HashMap<Intent, IntentFlow>,
}

impl FlowRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers every intent with the standard slot plan and the given completions.
    pub fn with_completions<F>(completion_for: F) -> Self
    where
        F: Fn(Intent) -> CompletionAction,
    {
        let mut registry = Self::empty();
        for intent in Intent::ALL {
            let (required_slots, prompt_order) = slot_plan(intent);
            registry.register(IntentFlow {
                intent,
                required_slots,
                prompt_order,
                completion: completion_for(intent),
            });
        }
        registry
    }

    /// Standard plans whose completions only compute [`standard_outcome`].
    pub fn standard() -> Self {
        Self::with_completions(|intent| {
            let action: CompletionAction =
                Arc::new(move |ctx: &ConversationContext| standard_outcome(intent, ctx));
            action
        })
    }

    /// Adds or replaces the flow for its intent.
    pub fn register(&mut self, flow: IntentFlow) {
        self.flows.insert(flow.intent, flow);
    }

    pub fn get(&self, intent: Intent) -> Option<&IntentFlow> {
        self.flows.get(&intent)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
