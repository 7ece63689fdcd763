//! Conversation context: the single mutable record behind one session.
//!
//! Fields are private; the Brain, flow graph and node hooks mutate them
//! through the methods below.

use serde::{Deserialize, Serialize};

use crate::domain::civic::{CategorySuggestion, Geography, LocationRef, ProposalReceipt};
use crate::domain::foundation::SessionId;

use super::catalog::{GeographyCatalog, IssueBoard};
use super::intent::Intent;
use super::message::ChatMessage;
use super::node::NodeId;
use super::slots::SlotStore;

/// Shortest free-text description accepted when no config overrides it.
pub const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 5;

/// What the user wants to do once a location is chosen in discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryGoal {
    #[default]
    FindInstance,
    TopIssues,
    ReportIssue,
}

/// Geography picked through the discovery nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySelection {
    pub goal: DiscoveryGoal,
    pub state: Option<Geography>,
    pub county: Option<Geography>,
    pub place: Option<Geography>,
}

impl DiscoverySelection {
    /// Picks a state, dropping any county or place chosen under the old one.
    pub fn select_state(&mut self, state: Geography) {
        self.state = Some(state);
        self.county = None;
        self.place = None;
    }

    pub fn select_location(&mut self, county: Geography, place: Option<Geography>) {
        self.county = Some(county);
        self.place = place;
    }

    /// Resolved location, available once a state is selected.
    pub fn location(&self) -> Option<LocationRef> {
        let state = self.state.as_ref()?;
        Some(LocationRef::from_parts(
            state,
            self.county.as_ref(),
            self.place.as_ref(),
        ))
    }
}

/// Report being assembled through the report nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub description: Option<String>,
    pub category: Option<CategorySuggestion>,
    /// Existing issue the user chose to add their voice to.
    pub endorsed_issue: Option<String>,
    pub receipt: Option<ProposalReceipt>,
    pub submission_failed: bool,
}

impl ReportDraft {
    pub fn clear_submission(&mut self) {
        self.receipt = None;
        self.submission_failed = false;
    }
}

/// Everything the secretary knows about the live conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    session_id: SessionId,
    current_node: NodeId,
    messages: Vec<ChatMessage>,
    active_intent: Option<Intent>,
    intent_completed: bool,
    slots: SlotStore,
    discovery: DiscoverySelection,
    report: ReportDraft,
    catalog: GeographyCatalog,
    board: IssueBoard,
    awaiting_repair_target: bool,
    last_user_input: Option<String>,
    min_description_chars: usize,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            current_node: NodeId::Menu,
            messages: Vec::new(),
            active_intent: None,
            intent_completed: false,
            slots: SlotStore::new(),
            discovery: DiscoverySelection::default(),
            report: ReportDraft::default(),
            catalog: GeographyCatalog::new(),
            board: IssueBoard::default(),
            awaiting_repair_target: false,
            last_user_input: None,
            min_description_chars: DEFAULT_MIN_DESCRIPTION_CHARS,
        }
    }

    pub fn with_min_description_chars(mut self, min_chars: usize) -> Self {
        self.min_description_chars = min_chars;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    /// Only the flow graph moves the conversation between nodes.
    pub(crate) fn set_current_node(&mut self, node: NodeId) {
        self.current_node = node;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Appends an assistant line.
    pub fn say(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Appends a user line and remembers it for recovery prompts.
    pub fn record_user_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.messages.push(ChatMessage::user(text.clone()));
        self.last_user_input = Some(text);
    }

    /// Appends a user line produced by a button or selector.
    pub fn record_user_choice(&mut self, label: impl Into<String>) {
        self.messages.push(ChatMessage::user(label));
    }

    pub fn last_user_input(&self) -> Option<&str> {
        self.last_user_input.as_deref()
    }

    pub fn min_description_chars(&self) -> usize {
        self.min_description_chars
    }

    /// Returns true if the text is long enough to stand as an issue description.
    pub fn accepts_description(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_description_chars
    }

    pub fn active_intent(&self) -> Option<Intent> {
        self.active_intent
    }

    /// Starts a new intent; completion state is reset.
    pub fn set_active_intent(&mut self, intent: Intent) {
        self.active_intent = Some(intent);
        self.intent_completed = false;
    }

    pub fn intent_completed(&self) -> bool {
        self.intent_completed
    }

    pub fn mark_intent_completed(&mut self) {
        self.intent_completed = true;
    }

    /// Allows the active intent to complete again after a repair.
    pub fn reopen_intent(&mut self) {
        self.intent_completed = false;
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotStore {
        &mut self.slots
    }

    pub fn discovery(&self) -> &DiscoverySelection {
        &self.discovery
    }

    pub fn discovery_mut(&mut self) -> &mut DiscoverySelection {
        &mut self.discovery
    }

    /// Copies the slot-filled geography into the discovery selection.
    pub fn adopt_slot_geography(&mut self, goal: DiscoveryGoal) {
        self.discovery = DiscoverySelection {
            goal,
            state: self.slots.state().cloned(),
            county: self.slots.county().cloned(),
            place: self.slots.place().cloned(),
        };
    }

    pub fn report(&self) -> &ReportDraft {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut ReportDraft {
        &mut self.report
    }

    pub fn catalog(&self) -> &GeographyCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut GeographyCatalog {
        &mut self.catalog
    }

    pub fn board(&self) -> &IssueBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut IssueBoard {
        &mut self.board
    }

    pub fn awaiting_repair_target(&self) -> bool {
        self.awaiting_repair_target
    }

    pub fn set_awaiting_repair_target(&mut self, awaiting: bool) {
        self.awaiting_repair_target = awaiting;
    }

    /// Drops everything tied to the current flow.
    ///
    /// Messages and the geography catalog survive; both belong to the session.
    pub fn clear_flow_state(&mut self) {
        self.active_intent = None;
        self.intent_completed = false;
        self.slots = SlotStore::new();
        self.discovery = DiscoverySelection::default();
        self.report = ReportDraft::default();
        self.board = IssueBoard::default();
        self.awaiting_repair_target = false;
    }
}
