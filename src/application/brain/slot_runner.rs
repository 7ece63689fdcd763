//! Intent slot filling: starting intents, filling and repairing slots,
//! and running completions.

use tracing::{debug, info};

use super::{Brain, Interrupted, Step};
use crate::domain::civic::{CategorySuggestion, Geography};
use crate::domain::secretary::{
    classify_intent, clean_issue_description, copy, extract_geography_from_text,
    find_county_in_text, find_state_in_text, looks_like_repair, parse_repair_slot, CompletionOutcome, DiscoveryGoal,
    FlowAction, Intent, NodeId, SlotFiller, SlotName, SlotValue,
};

impl Brain {
    /// Begins slot filling for an intent recognized in `utterance` or picked from the menu.
    pub(super) async fn start_intent(&mut self, intent: Intent, utterance: Option<&str>) -> Step {
        info!(session = %self.ctx.session_id(), intent = %intent, "intent started");
        self.ctx.clear_flow_state();
        self.ctx.set_active_intent(intent);
        self.ctx.say(copy::intent_acknowledgement(intent));

        if let Some(text) = utterance {
            if intent == Intent::ReportIssue && copy::carries_issue_detail(text) {
                self.prefill_description(text).await?;
            }
        }

        self.graph.jump_to(&mut self.ctx, NodeId::IntentSlotFilling);
        self.continue_slot_filling().await
    }

    /// Keeps the issue itself from an opening report, minus any place names.
    async fn prefill_description(&mut self, text: &str) -> Step {
        self.ensure_states().await?;
        let mut matched = extract_geography_from_text(text, self.ctx.catalog());
        if let Some(state_id) = matched.state.as_ref().map(|state| state.id.clone()) {
            self.ensure_children(&state_id).await?;
            matched = extract_geography_from_text(text, self.ctx.catalog());
        }
        let description = clean_issue_description(text, &matched);
        if self.ctx.accepts_description(&description) {
            debug!(session = %self.ctx.session_id(), "issue description taken from opening message");
            self.fill(SlotName::IssueDescription, SlotValue::Text(description));
        }
        Ok(())
    }

    fn fill(&mut self, slot: SlotName, value: SlotValue) -> bool {
        let accepted = SlotFiller::new(&self.registry).fill_slot(&mut self.ctx, slot, value);
        if accepted {
            self.ctx.reopen_intent();
        } else {
            debug!(session = %self.ctx.session_id(), slot = %slot, "slot value rejected");
        }
        accepted
    }

    /// Asks for the next missing slot, or completes the intent.
    pub(super) async fn continue_slot_filling(&mut self) -> Step {
        let Some(intent) = self.ctx.active_intent() else {
            return Ok(());
        };
        let next = SlotFiller::new(&self.registry).next_missing_slot(intent, self.ctx.slots());
        match next {
            Some(slot) => {
                self.prepare_slot(slot).await?;
                let prompt = SlotFiller::new(&self.registry).slot_prompt(slot, &self.ctx);
                self.ctx.say(prompt);
                Ok(())
            }
            None => self.complete_intent(intent).await,
        }
    }

    /// Loads the options the prompt for `slot` offers.
    async fn prepare_slot(&mut self, slot: SlotName) -> Step {
        match slot {
            SlotName::State => {
                self.ensure_states().await?;
                if !self.ctx.catalog().has_states() {
                    self.ctx.say(copy::GEOGRAPHY_UNAVAILABLE);
                }
            }
            SlotName::County | SlotName::Place => {
                let Some(state_id) = self.ctx.slots().state().map(|state| state.id.clone()) else {
                    return Ok(());
                };
                self.ensure_children(&state_id).await?;
                if !self.ctx.catalog().has_children_of(&state_id) {
                    self.ctx.say(copy::GEOGRAPHY_UNAVAILABLE);
                }
            }
            SlotName::IssueCategory => {
                let term = self.ctx.slots().issue_description().unwrap_or_default().to_string();
                self.load_suggestions(&term).await?;
            }
            SlotName::IssueDescription => {}
        }
        Ok(())
    }

    async fn complete_intent(&mut self, intent: Intent) -> Step {
        if !SlotFiller::new(&self.registry).completion_pending(&self.ctx) {
            debug!(session = %self.ctx.session_id(), intent = %intent, "nothing left to complete");
            return Ok(());
        }
        if matches!(intent, Intent::ReportIssue | Intent::CreateInstance) {
            self.ctx.say(copy::completing(intent));
            self.pause().await?;
        }

        let outcome = SlotFiller::new(&self.registry).execute_completion(&mut self.ctx);
        let Some(outcome) = outcome else {
            return Ok(());
        };
        info!(session = %self.ctx.session_id(), intent = %intent, "intent completed");

        match outcome {
            CompletionOutcome::Navigated(_) => Ok(()),
            CompletionOutcome::ShowDiscoveryResult => {
                self.ctx.adopt_slot_geography(DiscoveryGoal::FindInstance);
                self.graph.jump_to(&mut self.ctx, NodeId::DiscoveryResult);
                self.load_node_data().await
            }
            CompletionOutcome::ShowTopIssues => {
                self.ctx.adopt_slot_geography(DiscoveryGoal::TopIssues);
                self.graph.jump_to(&mut self.ctx, NodeId::DiscoveryTopIssues);
                self.load_node_data().await
            }
            CompletionOutcome::ShowCategories => {
                let topic = self.ctx.slots().issue_description().unwrap_or_default().to_string();
                self.load_suggestions(&topic).await?;
                if self.ctx.board().suggestions.is_empty() {
                    self.ctx.say(copy::CATEGORY_LIST_UNAVAILABLE);
                } else {
                    self.ctx.say(copy::categories_for(&topic));
                    self.ctx.say(copy::WHAT_NEXT_AFTER_CATEGORIES);
                }
                Ok(())
            }
        }
    }

    /// Typed text while an intent is collecting slots.
    pub(super) async fn slot_text(&mut self, text: &str) -> Step {
        if copy::is_exit_phrase(text) {
            self.graph.dispatch(&mut self.ctx, &FlowAction::BackToMenu);
            return Ok(());
        }
        if self.ctx.awaiting_repair_target() {
            return self.resolve_repair_target(text).await;
        }
        if self.ctx.slots().any_filled() && looks_like_repair(text) {
            return match parse_repair_slot(text) {
                Some(slot) => self.repair_slot(slot).await,
                None => {
                    self.ctx.set_awaiting_repair_target(true);
                    self.ctx.say(copy::ASK_WHICH_FIELD);
                    Ok(())
                }
            };
        }

        let Some(intent) = self.ctx.active_intent() else {
            return self.route_open_request(text).await;
        };
        if self.ctx.intent_completed() {
            return self.text_after_completion(intent, text).await;
        }

        let next = SlotFiller::new(&self.registry).next_missing_slot(intent, self.ctx.slots());
        match next {
            Some(slot) if slot.is_geography() => {
                self.ctx.say(copy::use_selector(slot));
                Ok(())
            }
            Some(SlotName::IssueDescription) => {
                if !self.ctx.accepts_description(text) {
                    self.ctx.say(copy::description_too_short(self.ctx.min_description_chars()));
                    return Ok(());
                }
                self.fill(SlotName::IssueDescription, SlotValue::Text(text.to_string()));
                self.continue_slot_filling().await
            }
            Some(slot) => {
                self.fill(slot, SlotValue::Text(text.to_string()));
                self.continue_slot_filling().await
            }
            None => self.continue_slot_filling().await,
        }
    }

    async fn text_after_completion(&mut self, intent: Intent, text: &str) -> Step {
        if intent == Intent::AskCategory && classify_fresh_request(text).is_none() {
            self.fill(SlotName::IssueDescription, SlotValue::Text(text.to_string()));
            return self.continue_slot_filling().await;
        }
        self.route_open_request(text).await
    }

    /// Works out which field a bare "that's wrong" referred to.
    async fn resolve_repair_target(&mut self, text: &str) -> Step {
        let slot = parse_repair_slot(text).or_else(|| self.infer_geography_slot(text));
        match slot {
            Some(slot) => self.repair_slot(slot).await,
            None => {
                self.ctx.say(copy::ASK_WHICH_FIELD);
                Ok(())
            }
        }
    }

    fn infer_geography_slot(&self, text: &str) -> Option<SlotName> {
        let catalog = self.ctx.catalog();
        if find_state_in_text(text, catalog.states()).is_some() {
            return Some(SlotName::State);
        }
        let state = self.ctx.slots().state()?;
        let counties = catalog.counties_in(&state.id);
        find_county_in_text(text, &counties).map(|_| SlotName::County)
    }

    /// Clears a slot and its dependents, then asks for it again.
    pub(super) async fn repair_slot(&mut self, slot: SlotName) -> Step {
        self.ctx.set_awaiting_repair_target(false);
        if !self.ctx.slots().is_filled(slot) {
            self.ctx.say(copy::nothing_to_repair(slot));
            return self.continue_slot_filling().await;
        }
        info!(session = %self.ctx.session_id(), slot = %slot, "slot repair");
        self.ctx.slots_mut().clear(slot);
        self.ctx.reopen_intent();
        self.ctx.say(copy::repair_acknowledgement(slot));
        self.continue_slot_filling().await
    }

    /// Structured actions while an intent is collecting slots.
    ///
    /// Returns false when the action is not a slot action and should go
    /// through the transition table instead.
    pub(super) async fn slot_action(&mut self, action: &FlowAction) -> Result<bool, Interrupted> {
        match action {
            FlowAction::StateSelected(state) => {
                self.select_state_slot(state.clone()).await?;
            }
            FlowAction::LocationSelected { county, place } => {
                self.select_location_slot(county.clone(), place.clone()).await?;
            }
            FlowAction::SuggestionSelected(category) => {
                self.select_category_slot(category.clone()).await?;
            }
            FlowAction::RepairSlot(slot) => self.repair_slot(*slot).await?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    async fn select_state_slot(&mut self, state: Geography) -> Step {
        self.ctx.set_awaiting_repair_target(false);
        self.fill(SlotName::State, SlotValue::Geography(state));
        self.continue_slot_filling().await
    }

    async fn select_location_slot(&mut self, county: Geography, place: Option<Geography>) -> Step {
        self.ctx.set_awaiting_repair_target(false);
        let Some(state) = self.ctx.slots().state().cloned() else {
            self.ctx.say(copy::use_selector(SlotName::State));
            return self.continue_slot_filling().await;
        };
        if !county.is_within_state(&state.id) {
            self.ctx.say(copy::use_selector(SlotName::County));
            return self.continue_slot_filling().await;
        }
        let county_id = county.id.clone();
        self.fill(SlotName::County, SlotValue::Geography(county));
        if let Some(place) = place.filter(|place| place.is_within_county(&county_id)) {
            self.fill(SlotName::Place, SlotValue::Geography(place));
        }
        self.continue_slot_filling().await
    }

    async fn select_category_slot(&mut self, category: CategorySuggestion) -> Step {
        if self.ctx.active_intent() == Some(Intent::AskCategory) && self.ctx.intent_completed() {
            info!(session = %self.ctx.session_id(), "category browse turned into a report");
            self.ctx.set_active_intent(Intent::ReportIssue);
            self.ctx.say(copy::intent_acknowledgement(Intent::ReportIssue));
        }
        self.fill(SlotName::IssueCategory, SlotValue::Text(category.name));
        self.continue_slot_filling().await
    }
}

/// An intent named by text typed after a completion, other than browsing categories.
fn classify_fresh_request(text: &str) -> Option<Intent> {
    classify_intent(text).filter(|intent| *intent != Intent::AskCategory)
}
