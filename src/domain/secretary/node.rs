//! Conversation nodes and their enter/exit hooks.
//!
//! Nodes are a closed enum, so every hook and projection is an exhaustive
//! match. Hooks may append assistant messages and reset per-flow state;
//! only the flow graph changes the current node.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::ConversationContext;
use super::copy;

/// A named state in the conversation's finite-state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NodeId {
    #[default]
    Menu,
    DiscoverySelectState,
    DiscoverySelectLocation,
    DiscoveryResult,
    DiscoveryTopIssues,
    ReportLoading,
    ReportTopIssues,
    ReportCollectDescription,
    ReportShowSuggestions,
    ReportCustomCategory,
    ReportComplete,
    UnknownInputRecovery,
    IntentSlotFilling,
}

impl NodeId {
    pub const ALL: [NodeId; 13] = [
        NodeId::Menu,
        NodeId::DiscoverySelectState,
        NodeId::DiscoverySelectLocation,
        NodeId::DiscoveryResult,
        NodeId::DiscoveryTopIssues,
        NodeId::ReportLoading,
        NodeId::ReportTopIssues,
        NodeId::ReportCollectDescription,
        NodeId::ReportShowSuggestions,
        NodeId::ReportCustomCategory,
        NodeId::ReportComplete,
        NodeId::UnknownInputRecovery,
        NodeId::IntentSlotFilling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::DiscoverySelectState => "discovery-select-state",
            Self::DiscoverySelectLocation => "discovery-select-location",
            Self::DiscoveryResult => "discovery-result",
            Self::DiscoveryTopIssues => "discovery-top-issues",
            Self::ReportLoading => "report-loading",
            Self::ReportTopIssues => "report-top-issues",
            Self::ReportCollectDescription => "report-collect-description",
            Self::ReportShowSuggestions => "report-show-suggestions",
            Self::ReportCustomCategory => "report-custom-category",
            Self::ReportComplete => "report-complete",
            Self::UnknownInputRecovery => "unknown-input-recovery",
            Self::IntentSlotFilling => "intent-slot-filling",
        }
    }

    /// Nodes where free text is routed like a fresh request.
    pub fn accepts_open_request(&self) -> bool {
        matches!(self, Self::Menu | Self::UnknownInputRecovery)
    }

    /// Runs when the node becomes current.
    pub(crate) fn on_enter(self, ctx: &mut ConversationContext) {
        match self {
            Self::Menu => {
                ctx.clear_flow_state();
                let greeting = if ctx.messages().is_empty() {
                    copy::WELCOME
                } else {
                    copy::MENU_AGAIN
                };
                ctx.say(greeting);
            }
            Self::DiscoverySelectState => ctx.say(copy::ASK_STATE_FOR_DISCOVERY),
            Self::DiscoverySelectLocation => {
                let prompt = match ctx.discovery().state.as_ref() {
                    Some(state) => copy::ask_location(&state.name),
                    None => copy::ask_county(None),
                };
                ctx.say(prompt);
            }
            Self::DiscoveryResult => {
                if let Some(location) = ctx.discovery().location() {
                    ctx.say(copy::discovery_summary(&location.label));
                }
            }
            Self::DiscoveryTopIssues | Self::ReportLoading => {
                ctx.board_mut().top_issues.clear();
                if self == Self::ReportLoading {
                    ctx.say(copy::CHECKING_REPORTS);
                }
            }
            Self::ReportTopIssues => {
                let prompt = if ctx.board().top_issues.is_empty() {
                    copy::NO_EXISTING_ISSUES
                } else {
                    copy::PICK_EXISTING_ISSUE
                };
                ctx.say(prompt);
            }
            Self::ReportCollectDescription => ctx.say(copy::ASK_DESCRIPTION),
            Self::ReportShowSuggestions => {
                ctx.board_mut().suggestions.clear();
                ctx.say(copy::ASK_CATEGORY);
            }
            Self::ReportCustomCategory => ctx.say(copy::ASK_CUSTOM_CATEGORY),
            Self::ReportComplete => {
                ctx.report_mut().clear_submission();
                ctx.say(copy::SUBMITTING);
            }
            Self::UnknownInputRecovery => {
                let message = copy::unknown_input(ctx.last_user_input());
                ctx.say(message);
            }
            Self::IntentSlotFilling => {}
        }
    }

    /// Runs just before the node stops being current.
    pub(crate) fn on_exit(self, ctx: &mut ConversationContext) {
        match self {
            Self::IntentSlotFilling => ctx.set_awaiting_repair_target(false),
            Self::Menu
            | Self::DiscoverySelectState
            | Self::DiscoverySelectLocation
            | Self::DiscoveryResult
            | Self::DiscoveryTopIssues
            | Self::ReportLoading
            | Self::ReportTopIssues
            | Self::ReportCollectDescription
            | Self::ReportShowSuggestions
            | Self::ReportCustomCategory
            | Self::ReportComplete
            | Self::UnknownInputRecovery => {}
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
