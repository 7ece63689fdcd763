//! Slot-filling sub-runner.
//!
//! Walks an intent's prompt order against the slot store: which slot to ask
//! for next, how to phrase the question, and when to run the completion.

use super::context::ConversationContext;
use super::copy;
use super::intent::Intent;
use super::registry::{CompletionOutcome, FlowRegistry};
use super::repair::apply_repair;
use super::slots::{SlotName, SlotStore, SlotValue};

/// Read-mostly view over a [`FlowRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct SlotFiller<'a> {
    registry: &'a FlowRegistry,
}

impl<'a> SlotFiller<'a> {
    pub fn new(registry: &'a FlowRegistry) -> Self {
        Self { registry }
    }

    /// First unfilled required slot in prompt order.
    ///
    /// `None` means the intent is ready to complete, or has no flow.
    pub fn next_missing_slot(&self, intent: Intent, slots: &SlotStore) -> Option<SlotName> {
        let flow = self.registry.get(intent)?;
        flow.prompt_order
            .iter()
            .copied()
            .filter(|slot| flow.is_required(*slot))
            .find(|slot| !slots.is_filled(*slot))
    }

    /// True iff every required slot is filled. False for unregistered intents.
    pub fn all_required_slots_filled(&self, intent: Intent, slots: &SlotStore) -> bool {
        self.registry
            .get(intent)
            .map_or(false, |flow| flow.required_slots.iter().all(|slot| slots.is_filled(*slot)))
    }

    /// Question for a slot, personalized with its parent when known.
    pub fn slot_prompt(&self, slot: SlotName, ctx: &ConversationContext) -> String {
        let slots = ctx.slots();
        match slot {
            SlotName::State => copy::ask_state(ctx.active_intent()).to_string(),
            SlotName::County => copy::ask_county(slots.state().map(|s| s.name.as_str())),
            SlotName::Place => copy::ask_place(slots.county().map(|c| c.name.as_str())),
            SlotName::IssueDescription => match ctx.active_intent() {
                Some(Intent::AskCategory) => copy::ASK_TOPIC.to_string(),
                _ => copy::ASK_DESCRIPTION.to_string(),
            },
            SlotName::IssueCategory => copy::ASK_CATEGORY.to_string(),
        }
    }

    /// Stores a value. Returns false if rejected.
    ///
    /// Replacing a different value clears the slot's dependents. A first
    /// value only drops dependents that lie outside it, so slots can be
    /// filled in any order.
    pub fn fill_slot(&self, ctx: &mut ConversationContext, slot: SlotName, value: SlotValue) -> bool {
        let slots = ctx.slots_mut();
        let replaced = slots.get(slot).is_some_and(|previous| previous != value);
        if replaced {
            return apply_repair(slots, slot, value);
        }
        if !slots.set(slot, value) {
            return false;
        }
        slots.clear_mismatched_dependents(slot);
        true
    }

    /// True when the active intent has every required slot and has not completed yet.
    pub fn completion_pending(&self, ctx: &ConversationContext) -> bool {
        ctx.active_intent().is_some_and(|intent| {
            !ctx.intent_completed() && self.all_required_slots_filled(intent, ctx.slots())
        })
    }

    /// Runs the active intent's completion once all its required slots are filled.
    ///
    /// Returns `None` if there is no active intent, no flow for it, a required
    /// slot is still missing, or the completion already ran.
    pub fn execute_completion(&self, ctx: &mut ConversationContext) -> Option<CompletionOutcome> {
        let intent = ctx.active_intent()?;
        let flow = self.registry.get(intent)?;
        if !self.completion_pending(ctx) {
            return None;
        }
        ctx.mark_intent_completed();
        Some((flow.completion)(&*ctx))
    }
}
