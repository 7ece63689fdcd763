//! Flow events published to observers of the conversation.

use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use super::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum FlowEvent {
    /// A transition fired; emitted before the matching `NodeEntered`.
    ActionTaken { node: NodeId, action: ActionKind },
    NodeEntered { from: NodeId, to: NodeId },
}

/// Observer of flow events.
///
/// Any `Fn(&FlowEvent)` closure that is `Send + Sync` is a listener.
pub trait FlowEventListener: Send + Sync {
    fn on_event(&self, event: &FlowEvent);
}

impl<F> FlowEventListener for F
where
    F: Fn(&FlowEvent) + Send + Sync,
{
    fn on_event(&self, event: &FlowEvent) {
        self(event)
    }
}
