//! The secretary: a single-session conversational engine.
//!
//! Leaves first: the slot store, text matchers, intent classifier and repair
//! detection are pure functions over plain data. The flow registry and
//! slot-filling runner decide what to ask next; the flow graph moves the
//! conversation between nodes; the view model projects the context for a UI.
//! The Brain in `application` composes all of it with the backend.

mod action;
mod catalog;
mod context;
pub mod copy;
mod events;
mod graph;
mod intent;
mod matchers;
mod message;
mod navigation;
mod node;
mod registry;
mod repair;
mod slot_filling;
mod slots;
mod view_model;

pub use action::{ActionKind, FlowAction, MenuOption};
pub use catalog::{GeographyCatalog, IssueBoard};
pub use context::{
    ConversationContext, DiscoveryGoal, DiscoverySelection, ReportDraft,
    DEFAULT_MIN_DESCRIPTION_CHARS,
};
pub use events::{FlowEvent, FlowEventListener};
pub use graph::{default_transitions, Effect, FlowGraph, Guard, Target, TargetFn, Transition};
pub use intent::{classify_intent, Intent, IntentRule, INTENT_RULES};
pub use matchers::{
    clean_issue_description, extract_geography_from_text, find_county_in_text,
    find_geography_in_text, find_place_in_text, find_state_in_text, normalize, GeographyMatch,
    MIN_CLEANED_DESCRIPTION_CHARS,
};
pub use message::{ChatMessage, Role};
pub use navigation::{
    NavigationRequest, DESTINATION_CREATE_INSTANCE, DESTINATION_INSTANCE, DESTINATION_REPORT_ISSUE,
};
pub use node::NodeId;
pub use registry::{
    slot_plan, standard_outcome, CompletionAction, CompletionOutcome, FlowRegistry, IntentFlow,
};
pub use repair::{apply_repair, looks_like_repair, parse_repair_slot, REPAIR_CUES};
pub use slot_filling::SlotFiller;
pub use slots::{SlotName, SlotStore, SlotValue};
pub use view_model::{
    project, ButtonOption, SuggestionChip, TypeaheadOption, ViewLimits, ViewModel,
};
