//! Intent completions wired to the host navigator.

use std::sync::Arc;

use tracing::info;

use crate::domain::secretary::{
    standard_outcome, CompletionAction, CompletionOutcome, ConversationContext, FlowRegistry,
};
use crate::ports::Navigator;

/// Standard flows whose navigating completions hand the request to `navigator`.
pub(super) fn build_registry(navigator: Arc<dyn Navigator>) -> FlowRegistry {
    FlowRegistry::with_completions(|intent| {
        let navigator = navigator.clone();
        let action: CompletionAction = Arc::new(move |ctx: &ConversationContext| {
            let outcome = standard_outcome(intent, ctx);
            if let CompletionOutcome::Navigated(request) = &outcome {
                info!(
                    intent = %intent,
                    destination = %request.destination_id,
                    "intent completed with navigation"
                );
                navigator.navigate(request);
            }
            outcome
        });
        action
    })
}
