//! End-to-end conversations against the in-memory backend.
//!
//! Each test drives a Brain the way a chat widget would: typed text, button
//! and picker actions, then inspects the view model, the message log, the
//! navigator and the backend's recorded calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use civic_secretary::adapters::{InMemoryCivicBackend, RecordingNavigator, StaticDestinationCatalog};
use civic_secretary::application::Brain;
use civic_secretary::config::SecretaryConfig;
use civic_secretary::domain::civic::ContributionKind;
use civic_secretary::domain::secretary::{
    copy, FlowAction, FlowEvent, Intent, MenuOption, NodeId, Role, SlotName,
};
use civic_secretary::ports::{BackendError, BackendOperation};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    brain: Brain,
    backend: InMemoryCivicBackend,
    navigator: RecordingNavigator,
}

fn test_config() -> SecretaryConfig {
    SecretaryConfig {
        navigation_delay_ms: 0,
        ..Default::default()
    }
}

fn harness_with(backend: InMemoryCivicBackend, config: SecretaryConfig) -> Harness {
    let navigator = RecordingNavigator::new();
    let brain = Brain::new(Arc::new(navigator.clone()), config)
        .with_backend(Arc::new(backend.clone()))
        .with_destinations(Arc::new(StaticDestinationCatalog::civic_defaults()));
    Harness {
        brain,
        backend,
        navigator,
    }
}

fn harness() -> Harness {
    harness_with(InMemoryCivicBackend::with_sample_data(), test_config())
}

fn last_assistant(brain: &Brain) -> String {
    brain
        .get_messages()
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .map(|message| message.content.clone())
        .unwrap_or_default()
}

fn said(brain: &Brain, text: &str) -> bool {
    brain
        .get_messages()
        .iter()
        .any(|message| message.role == Role::Assistant && message.content == text)
}

/// Action behind the picker entry with this label.
fn typeahead(brain: &Brain, label: &str) -> FlowAction {
    brain
        .get_typeahead_options()
        .into_iter()
        .find(|option| option.label == label)
        .map(|option| option.action)
        .unwrap_or_else(|| panic!("no typeahead option {:?}", label))
}

fn chip(brain: &Brain, label: &str) -> FlowAction {
    brain
        .get_suggestions()
        .into_iter()
        .find(|chip| chip.label == label)
        .map(|chip| chip.action)
        .unwrap_or_else(|| panic!("no suggestion {:?}", label))
}

fn button(brain: &Brain, label: &str) -> FlowAction {
    brain
        .get_view_model()
        .buttons
        .into_iter()
        .find(|button| button.label == label)
        .map(|button| button.action)
        .unwrap_or_else(|| panic!("no button {:?}", label))
}

// =============================================================================
// Menu and free text
// =============================================================================

#[tokio::test]
async fn new_session_shows_welcome_and_menu() {
    let h = harness();
    assert!(h.brain.is_showing_menu());
    assert_eq!(h.brain.get_messages().len(), 1);
    assert_eq!(last_assistant(&h.brain), copy::WELCOME);

    let view = h.brain.get_view_model();
    assert!(view.show_text_input);
    assert_eq!(view.buttons.len(), MenuOption::ALL.len());
}

#[tokio::test]
async fn broken_streetlight_starts_report_and_asks_for_state() {
    let mut h = harness();
    h.brain
        .handle_user_text("there's a broken streetlight near Main St")
        .await;

    assert_eq!(h.brain.current_node(), NodeId::IntentSlotFilling);
    assert_eq!(h.brain.context().active_intent(), Some(Intent::ReportIssue));
    assert_eq!(
        h.brain.context().slots().issue_description(),
        Some("there's a broken streetlight near Main St")
    );
    assert_eq!(last_assistant(&h.brain), copy::ask_state(Some(Intent::ReportIssue)));

    let view = h.brain.get_view_model();
    assert!(view.show_typeahead);
    assert_eq!(view.typeahead_options.len(), 4);
}

#[tokio::test]
async fn unrecognized_text_lands_on_recovery() {
    let mut h = harness();
    h.brain.handle_user_text("qwerty").await;

    assert_eq!(h.brain.current_node(), NodeId::UnknownInputRecovery);
    assert!(h.brain.is_showing_menu());
    assert_eq!(last_assistant(&h.brain), copy::unknown_input(Some("qwerty")));

    h.brain.handle_action(FlowAction::Retry).await;
    assert_eq!(h.brain.current_node(), NodeId::Menu);
}

#[tokio::test]
async fn deep_link_and_keywords_navigate_without_moving() {
    let mut h = harness();

    h.brain.handle_user_text("/tasks").await;
    assert_eq!(h.navigator.last().unwrap().destination_id, "tasks");
    assert_eq!(h.brain.current_node(), NodeId::Menu);

    h.brain.handle_user_text("open the governance page").await;
    assert_eq!(h.navigator.last().unwrap().destination_id, "governance");
    assert_eq!(h.navigator.count(), 2);
    assert_eq!(h.brain.current_node(), NodeId::Menu);
}

// =============================================================================
// Intent slot filling
// =============================================================================

#[tokio::test]
async fn create_instance_collects_location_then_navigates() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;
    assert_eq!(h.brain.context().active_intent(), Some(Intent::CreateInstance));
    assert_eq!(
        last_assistant(&h.brain),
        copy::ask_state(Some(Intent::CreateInstance))
    );

    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    assert_eq!(last_assistant(&h.brain), copy::ask_county(Some("California")));

    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;

    let request = h.navigator.last().expect("navigated");
    assert_eq!(request.destination_id, "create-instance");
    assert!(request.should_close);
    assert_eq!(request.params.get("state_id").map(String::as_str), Some("06"));
    assert_eq!(request.params.get("county_id").map(String::as_str), Some("06001"));
    assert!(h.brain.context().intent_completed());
    assert!(said(&h.brain, copy::completing(Intent::CreateInstance)));
}

#[tokio::test]
async fn report_issue_finishes_with_report_destination() {
    let mut h = harness();
    h.brain
        .handle_user_text("there's a broken streetlight near Main St")
        .await;

    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;

    assert_eq!(last_assistant(&h.brain), copy::ASK_CATEGORY);
    let lighting = chip(&h.brain, "Street Lighting");
    h.brain.handle_action(lighting).await;

    let request = h.navigator.last().expect("navigated");
    assert_eq!(request.destination_id, "report-issue");
    assert_eq!(
        request.params.get("category").map(String::as_str),
        Some("Street Lighting")
    );
    assert_eq!(
        request.params.get("description").map(String::as_str),
        Some("there's a broken streetlight near Main St")
    );
}

#[tokio::test]
async fn geography_slots_ignore_typed_text() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;
    h.brain.handle_user_text("Texas").await;

    assert!(!h.brain.context().slots().is_filled(SlotName::State));
    assert_eq!(last_assistant(&h.brain), copy::use_selector(SlotName::State));
}

#[tokio::test]
async fn failed_county_lookup_degrades_to_reprompt() {
    let backend = InMemoryCivicBackend::with_sample_data().with_failure(
        BackendOperation::FetchCounties,
        BackendError::unavailable("county service down"),
    );
    let mut h = harness_with(backend, test_config());
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;
    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;

    assert_eq!(h.brain.current_node(), NodeId::IntentSlotFilling);
    assert!(said(&h.brain, copy::GEOGRAPHY_UNAVAILABLE));
    assert_eq!(last_assistant(&h.brain), copy::ask_county(Some("California")));
    assert!(h.brain.get_typeahead_options().is_empty());

    h.backend.recover(BackendOperation::FetchCounties);
    h.brain.handle_user_text("change the state").await;
    assert_eq!(last_assistant(&h.brain), copy::ask_state(Some(Intent::CreateInstance)));

    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    assert_eq!(h.brain.get_typeahead_options().len(), 3);
}

#[tokio::test]
async fn failed_place_lookup_is_retried_later() {
    let backend = InMemoryCivicBackend::with_sample_data().with_failure(
        BackendOperation::FetchPlaces,
        BackendError::unavailable("place service down"),
    );
    let mut h = harness_with(backend, test_config());
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance))
        .await;
    h.brain.handle_user_text("California").await;
    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectLocation);
    let labels: Vec<String> = h.brain.get_typeahead_options().into_iter().map(|o| o.label).collect();
    assert_eq!(labels.len(), 3);
    assert!(!labels.iter().any(|label| label == "Oakland"));

    h.backend.recover(BackendOperation::FetchPlaces);
    h.brain.handle_action(FlowAction::BackToMenu).await;
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance))
        .await;
    h.brain.handle_user_text("California").await;

    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectLocation);
    assert!(h
        .brain
        .get_typeahead_options()
        .iter()
        .any(|option| option.label == "Oakland"));
    assert_eq!(h.backend.call_count(BackendOperation::FetchCounties), 1);
}

#[tokio::test]
async fn changing_state_clears_county_and_asks_again() {
    let mut h = harness();
    h.brain
        .handle_user_text("there's a broken streetlight near Main St")
        .await;
    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;
    assert_eq!(last_assistant(&h.brain), copy::ASK_CATEGORY);

    h.brain.handle_user_text("actually change the state").await;

    let slots = h.brain.context().slots();
    assert!(!slots.is_filled(SlotName::State));
    assert!(!slots.is_filled(SlotName::County));
    assert_eq!(slots.issue_description(), Some("there's a broken streetlight near Main St"));
    assert!(said(&h.brain, &copy::repair_acknowledgement(SlotName::State)));
    assert_eq!(last_assistant(&h.brain), copy::ask_state(Some(Intent::ReportIssue)));

    let texas = typeahead(&h.brain, "Texas");
    h.brain.handle_action(texas).await;
    assert_eq!(last_assistant(&h.brain), copy::ask_county(Some("Texas")));
    let counties: Vec<String> = h.brain.get_typeahead_options().into_iter().map(|o| o.label).collect();
    assert!(counties.iter().any(|label| label == "Travis County"));
    assert!(!counties.iter().any(|label| label == "Alameda County"));
}

#[tokio::test]
async fn repairing_unset_slot_after_navigation_does_not_announce_again() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;
    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;
    assert_eq!(h.navigator.count(), 1);

    h.brain.handle_action(FlowAction::RepairSlot(SlotName::Place)).await;

    assert_eq!(h.navigator.count(), 1);
    assert_eq!(last_assistant(&h.brain), copy::nothing_to_repair(SlotName::Place));
    let announcements = h
        .brain
        .get_messages()
        .iter()
        .filter(|message| message.content == copy::completing(Intent::CreateInstance))
        .count();
    assert_eq!(announcements, 1);
}

#[tokio::test]
async fn ambiguous_repair_asks_which_field_then_resolves() {
    let mut h = harness();
    h.brain.handle_user_text("find my local instance").await;
    assert_eq!(h.brain.context().active_intent(), Some(Intent::FindInstance));

    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    h.brain.handle_user_text("actually I meant somewhere else").await;

    assert!(h.brain.context().awaiting_repair_target());
    assert_eq!(last_assistant(&h.brain), copy::ASK_WHICH_FIELD);
    let view = h.brain.get_view_model();
    assert!(view
        .buttons
        .iter()
        .any(|b| b.action == FlowAction::RepairSlot(SlotName::State)));

    h.brain.handle_user_text("Texas").await;
    assert!(!h.brain.context().awaiting_repair_target());
    assert!(!h.brain.context().slots().is_filled(SlotName::State));
    assert_eq!(last_assistant(&h.brain), copy::ask_state(Some(Intent::FindInstance)));
}

#[tokio::test]
async fn find_instance_intent_shows_discovery_result() {
    let mut h = harness();
    h.brain.handle_user_text("find my local instance").await;
    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;

    assert_eq!(h.brain.current_node(), NodeId::DiscoveryResult);
    assert_eq!(h.brain.context().board().open_task_count, Some(1));
    assert_eq!(last_assistant(&h.brain), copy::open_tasks(1));
    assert_eq!(h.navigator.count(), 0);

    let view_instance = button(&h.brain, copy::VIEW_INSTANCE);
    h.brain.handle_action(view_instance).await;
    let request = h.navigator.last().unwrap();
    assert_eq!(request.destination_id, "instance");
    assert_eq!(request.params.get("county_id").map(String::as_str), Some("06001"));
}

#[tokio::test]
async fn browsing_categories_can_turn_into_a_report() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::BrowseCategories))
        .await;
    assert_eq!(last_assistant(&h.brain), copy::ASK_TOPIC);

    h.brain.handle_user_text("trash").await;
    assert!(said(&h.brain, &copy::categories_for("trash")));
    assert!(h.brain.context().intent_completed());

    let sanitation = chip(&h.brain, "Trash & Sanitation");
    h.brain.handle_action(sanitation).await;

    let ctx = h.brain.context();
    assert_eq!(ctx.active_intent(), Some(Intent::ReportIssue));
    assert_eq!(ctx.slots().issue_description(), Some("trash"));
    assert_eq!(ctx.slots().issue_category(), Some("Trash & Sanitation"));
    assert_eq!(last_assistant(&h.brain), copy::ask_state(Some(Intent::ReportIssue)));
}

#[tokio::test]
async fn exit_phrase_returns_to_menu() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;
    h.brain.handle_user_text("never mind").await;

    assert_eq!(h.brain.current_node(), NodeId::Menu);
    assert_eq!(h.brain.context().active_intent(), None);
    assert_eq!(last_assistant(&h.brain), copy::MENU_AGAIN);
}

// =============================================================================
// Discovery and report nodes
// =============================================================================

#[tokio::test]
async fn discovery_then_report_submits_proposal() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance))
        .await;
    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectState);

    h.brain.handle_user_text("California").await;
    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectLocation);

    h.brain.handle_user_text("Oakland").await;
    assert_eq!(h.brain.current_node(), NodeId::DiscoveryResult);
    assert!(said(
        &h.brain,
        &copy::discovery_summary("Oakland, Alameda County, California")
    ));

    h.brain.handle_action(FlowAction::ReportHere).await;
    assert_eq!(h.brain.current_node(), NodeId::ReportTopIssues);
    assert_eq!(h.brain.context().board().top_issues.len(), 3);

    h.brain
        .handle_user_text("The crosswalk paint on 5th is gone")
        .await;
    assert_eq!(h.brain.current_node(), NodeId::ReportShowSuggestions);

    let streets = chip(&h.brain, "Streets & Sidewalks");
    h.brain.handle_action(streets).await;
    assert_eq!(h.brain.current_node(), NodeId::ReportComplete);
    assert_eq!(last_assistant(&h.brain), copy::submitted("proposal-1"));

    let proposals = h.backend.proposals();
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].category, "Streets & Sidewalks");
    assert_eq!(proposals[0].location.label, "Oakland, Alameda County, California");
    assert_eq!(h.backend.contributions()[0].kind, ContributionKind::IssueReported);
}

#[tokio::test]
async fn short_description_gets_a_hint() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::ReportIssue))
        .await;
    h.brain.handle_user_text("Texas").await;
    h.brain.handle_user_text("Austin").await;
    assert_eq!(h.brain.current_node(), NodeId::ReportTopIssues);

    h.brain.handle_user_text("bad").await;
    assert_eq!(h.brain.current_node(), NodeId::ReportTopIssues);
    assert_eq!(last_assistant(&h.brain), copy::description_too_short(5));
}

#[tokio::test]
async fn endorsing_a_top_issue_logs_an_endorsement() {
    let mut h = harness();
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::TopIssues))
        .await;
    let california = typeahead(&h.brain, "California");
    h.brain.handle_action(california).await;
    let alameda = typeahead(&h.brain, "Alameda County");
    h.brain.handle_action(alameda).await;

    assert_eq!(h.brain.current_node(), NodeId::DiscoveryTopIssues);
    assert!(said(&h.brain, &copy::issue_line("Potholes on International Blvd", 14)));

    let potholes = button(&h.brain, &copy::endorse_label("Potholes on International Blvd"));
    h.brain.handle_action(potholes).await;

    assert_eq!(h.brain.current_node(), NodeId::ReportComplete);
    let contributions = h.backend.contributions();
    assert_eq!(contributions.len(), 1);
    assert_eq!(contributions[0].kind, ContributionKind::IssueEndorsed);
}

#[tokio::test]
async fn failed_submission_can_be_retried() {
    let backend = InMemoryCivicBackend::with_sample_data().with_failure(
        BackendOperation::SubmitProposal,
        BackendError::unavailable("proposals offline"),
    );
    let mut h = harness_with(backend, test_config());
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::ReportIssue))
        .await;
    h.brain.handle_user_text("Texas").await;
    h.brain.handle_user_text("Travis County").await;
    h.brain.handle_action(FlowAction::SomethingElse).await;
    h.brain.handle_user_text("Flooded bike lane on Lamar").await;
    h.brain.handle_user_text("Bike lanes").await;

    assert_eq!(h.brain.current_node(), NodeId::ReportComplete);
    assert!(h.brain.context().report().submission_failed);
    assert_eq!(last_assistant(&h.brain), copy::SUBMIT_FAILED);

    h.backend.recover(BackendOperation::SubmitProposal);
    let retry = button(&h.brain, copy::TRY_AGAIN);
    h.brain.handle_action(retry).await;

    assert!(!h.brain.context().report().submission_failed);
    assert_eq!(h.backend.proposals()[0].category, "Bike lanes");
}

// =============================================================================
// Listeners, cancellation and reset
// =============================================================================

#[tokio::test]
async fn listeners_observe_transitions_until_removed() {
    let mut h = harness();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let id = h
        .brain
        .add_listener(move |event: &FlowEvent| sink.lock().unwrap().push(event.clone()));

    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance))
        .await;
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            FlowEvent::ActionTaken {
                node: NodeId::Menu,
                action: FlowAction::MenuSelected(MenuOption::FindInstance).kind(),
            },
            FlowEvent::NodeEntered {
                from: NodeId::Menu,
                to: NodeId::DiscoverySelectState,
            },
        ]
    );

    assert!(h.brain.remove_listener(id));
    h.brain.handle_action(FlowAction::BackToMenu).await;
    assert_eq!(events.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn cancelling_interrupts_lookup_and_reset_recovers() {
    let backend = InMemoryCivicBackend::with_sample_data().with_delay(Duration::from_millis(500));
    let mut h = harness_with(backend, test_config());
    let token = h.brain.cancellation_token();

    tokio::join!(
        h.brain
            .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance)),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        }
    );

    assert!(h.brain.is_closed());
    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectState);
    assert!(!h.brain.context().catalog().has_states());

    let before = h.brain.get_messages().len();
    h.brain.handle_user_text("California").await;
    assert_eq!(h.brain.get_messages().len(), before);

    let old_session = h.brain.session_id();
    h.brain.reset();
    assert!(!h.brain.is_closed());
    assert_ne!(h.brain.session_id(), old_session);
    assert_eq!(h.brain.current_node(), NodeId::Menu);
    assert_eq!(h.brain.get_messages().len(), 1);
}

#[tokio::test]
async fn slow_backend_times_out_and_conversation_continues() {
    let backend = InMemoryCivicBackend::with_sample_data().with_delay(Duration::from_millis(300));
    let config = SecretaryConfig {
        backend_timeout_ms: 30,
        ..test_config()
    };
    let mut h = harness_with(backend, config);
    h.brain
        .handle_action(FlowAction::MenuSelected(MenuOption::FindInstance))
        .await;

    assert!(!h.brain.is_closed());
    assert_eq!(h.brain.current_node(), NodeId::DiscoverySelectState);
    assert_eq!(last_assistant(&h.brain), copy::GEOGRAPHY_UNAVAILABLE);
}

#[tokio::test]
async fn brain_without_backend_still_converses() {
    let navigator = RecordingNavigator::new();
    let mut brain = Brain::new(Arc::new(navigator.clone()), test_config());
    brain
        .handle_action(FlowAction::MenuSelected(MenuOption::CreateInstance))
        .await;

    assert_eq!(brain.current_node(), NodeId::IntentSlotFilling);
    assert!(brain.get_typeahead_options().is_empty());
    assert!(said(&brain, copy::GEOGRAPHY_UNAVAILABLE));
}
