//! View model projection.
//!
//! A pure function of the context: what the UI should render right now.
//! Nothing here mutates state, so projecting twice without an intervening
//! action yields identical output.

use serde::{Deserialize, Serialize};

use crate::domain::civic::Geography;

use super::action::{FlowAction, MenuOption};
use super::catalog::GeographyCatalog;
use super::context::ConversationContext;
use super::copy;
use super::intent::Intent;
use super::message::ChatMessage;
use super::navigation::{DESTINATION_CREATE_INSTANCE, DESTINATION_INSTANCE};
use super::node::NodeId;
use super::registry::FlowRegistry;
use super::slot_filling::SlotFiller;
use super::slots::SlotName;

/// A clickable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOption {
    pub label: String,
    pub action: FlowAction,
}

impl ButtonOption {
    pub fn new(label: impl Into<String>, action: FlowAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// An entry in a searchable picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeaheadOption {
    pub label: String,
    /// Secondary text, such as the county a place sits in.
    pub detail: Option<String>,
    pub action: FlowAction,
}

/// A suggestion chip under the input box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionChip {
    pub label: String,
    pub action: FlowAction,
}

/// Caps applied to option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLimits {
    pub max_typeahead_options: usize,
    pub max_suggestions: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            max_typeahead_options: 50,
            max_suggestions: 6,
        }
    }
}

/// Everything the UI needs to render the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub node: NodeId,
    pub messages: Vec<ChatMessage>,
    pub show_text_input: bool,
    pub text_placeholder: Option<String>,
    pub show_typeahead: bool,
    pub typeahead_options: Vec<TypeaheadOption>,
    pub show_suggestions: bool,
    pub suggestions: Vec<SuggestionChip>,
    pub buttons: Vec<ButtonOption>,
}

impl ViewModel {
    fn for_node(ctx: &ConversationContext) -> Self {
        Self {
            node: ctx.current_node(),
            messages: ctx.messages().to_vec(),
            ..Self::default()
        }
    }

    fn text_input(mut self) -> Self {
        self.show_text_input = true;
        self.text_placeholder = Some(copy::TEXT_PLACEHOLDER.to_string());
        self
    }

    fn typeahead(mut self, options: Vec<TypeaheadOption>) -> Self {
        self.show_typeahead = true;
        self.typeahead_options = options;
        self
    }

    fn suggestions(mut self, chips: Vec<SuggestionChip>) -> Self {
        self.show_suggestions = true;
        self.suggestions = chips;
        self
    }

    fn button(mut self, label: impl Into<String>, action: FlowAction) -> Self {
        self.buttons.push(ButtonOption::new(label, action));
        self
    }

    fn back_to_menu(self) -> Self {
        self.button(copy::BACK_TO_MENU, FlowAction::BackToMenu)
    }

    fn menu_buttons(self) -> Self {
        MenuOption::ALL
            .into_iter()
            .fold(self, |vm, option| vm.button(option.label(), FlowAction::MenuSelected(option)))
    }
}

/// Projects the context into a view model.
pub fn project(ctx: &ConversationContext, registry: &FlowRegistry, limits: &ViewLimits) -> ViewModel {
    let vm = ViewModel::for_node(ctx);
    let catalog = ctx.catalog();
    let discovery = ctx.discovery();

    match ctx.current_node() {
        NodeId::Menu => vm.menu_buttons().text_input(),
        NodeId::UnknownInputRecovery => vm
            .menu_buttons()
            .button(copy::SHOW_MENU, FlowAction::Retry)
            .text_input(),
        NodeId::DiscoverySelectState => vm
            .typeahead(state_options(catalog, limits))
            .text_input()
            .back_to_menu(),
        NodeId::DiscoverySelectLocation => {
            let options = match discovery.state.as_ref() {
                Some(state) => location_options(catalog, state, limits),
                None => Vec::new(),
            };
            vm.typeahead(options).text_input().back_to_menu()
        }
        NodeId::DiscoveryResult => vm
            .button(copy::REPORT_HERE, FlowAction::ReportHere)
            .button(
                copy::VIEW_INSTANCE,
                FlowAction::OpenDestination(DESTINATION_INSTANCE.to_string()),
            )
            .button(
                copy::CREATE_INSTANCE_HERE,
                FlowAction::OpenDestination(DESTINATION_CREATE_INSTANCE.to_string()),
            )
            .back_to_menu(),
        NodeId::DiscoveryTopIssues => issue_buttons(vm, ctx)
            .button(copy::REPORT_SOMETHING_NEW, FlowAction::SomethingElse)
            .back_to_menu(),
        NodeId::ReportLoading => vm.back_to_menu(),
        NodeId::ReportTopIssues => issue_buttons(vm, ctx)
            .button(copy::SOMETHING_ELSE, FlowAction::SomethingElse)
            .text_input()
            .back_to_menu(),
        NodeId::ReportCollectDescription | NodeId::ReportCustomCategory => {
            vm.text_input().back_to_menu()
        }
        NodeId::ReportShowSuggestions => {
            let mut chips = suggestion_chips(ctx, limits);
            chips.push(SuggestionChip {
                label: copy::OTHER_CATEGORY.to_string(),
                action: FlowAction::CustomCategory,
            });
            vm.suggestions(chips).text_input().back_to_menu()
        }
        NodeId::ReportComplete => {
            let vm = if ctx.report().submission_failed {
                vm.button(copy::TRY_AGAIN, FlowAction::Retry)
            } else {
                vm
            };
            vm.back_to_menu()
        }
        NodeId::IntentSlotFilling => project_slot_filling(vm, ctx, registry, limits),
    }
}

fn project_slot_filling(
    vm: ViewModel,
    ctx: &ConversationContext,
    registry: &FlowRegistry,
    limits: &ViewLimits,
) -> ViewModel {
    let Some(intent) = ctx.active_intent() else {
        return vm.text_input().back_to_menu();
    };

    if ctx.awaiting_repair_target() {
        let prompt_order = registry.get(intent).map_or(&[][..], |flow| flow.prompt_order);
        let vm = prompt_order
            .iter()
            .filter(|slot| ctx.slots().is_filled(**slot))
            .fold(vm, |vm, slot| {
                vm.button(
                    format!("Change the {}", slot.label()),
                    FlowAction::RepairSlot(*slot),
                )
            });
        return vm.text_input().back_to_menu();
    }

    let filler = SlotFiller::new(registry);
    let slots = ctx.slots();
    let catalog = ctx.catalog();
    match filler.next_missing_slot(intent, slots) {
        Some(SlotName::State) => vm
            .typeahead(state_options(catalog, limits))
            .text_input()
            .back_to_menu(),
        Some(SlotName::County) => {
            let options = slots
                .state()
                .map(|state| county_options(catalog, state, limits))
                .unwrap_or_default();
            vm.typeahead(options).text_input().back_to_menu()
        }
        Some(SlotName::Place) => {
            let options = match (slots.state(), slots.county()) {
                (Some(state), Some(county)) => place_options(catalog, state, county, limits),
                _ => Vec::new(),
            };
            vm.typeahead(options).text_input().back_to_menu()
        }
        Some(SlotName::IssueDescription) => vm.text_input().back_to_menu(),
        Some(SlotName::IssueCategory) => vm
            .suggestions(suggestion_chips(ctx, limits))
            .text_input()
            .back_to_menu(),
        None if intent == Intent::AskCategory && ctx.intent_completed() => vm
            .suggestions(suggestion_chips(ctx, limits))
            .text_input()
            .back_to_menu(),
        None => vm.text_input().back_to_menu(),
    }
}

fn issue_buttons(vm: ViewModel, ctx: &ConversationContext) -> ViewModel {
    ctx.board().top_issues.iter().fold(vm, |vm, issue| {
        vm.button(
            copy::endorse_label(&issue.title),
            FlowAction::TopIssueSelected(issue.clone()),
        )
    })
}

fn suggestion_chips(ctx: &ConversationContext, limits: &ViewLimits) -> Vec<SuggestionChip> {
    ctx.board()
        .suggestions
        .iter()
        .take(limits.max_suggestions)
        .map(|suggestion| SuggestionChip {
            label: suggestion.name.clone(),
            action: FlowAction::SuggestionSelected(suggestion.clone()),
        })
        .collect()
}

fn state_options(catalog: &GeographyCatalog, limits: &ViewLimits) -> Vec<TypeaheadOption> {
    catalog
        .states()
        .iter()
        .take(limits.max_typeahead_options)
        .map(|state| TypeaheadOption {
            label: state.name.clone(),
            detail: state.short_name.clone(),
            action: FlowAction::StateSelected(state.clone()),
        })
        .collect()
}

fn county_options(catalog: &GeographyCatalog, state: &Geography, limits: &ViewLimits) -> Vec<TypeaheadOption> {
    catalog
        .counties_in(&state.id)
        .into_iter()
        .take(limits.max_typeahead_options)
        .map(|county| TypeaheadOption {
            label: county.name.clone(),
            detail: Some(state.name.clone()),
            action: FlowAction::LocationSelected { county, place: None },
        })
        .collect()
}

fn place_options(
    catalog: &GeographyCatalog,
    state: &Geography,
    county: &Geography,
    limits: &ViewLimits,
) -> Vec<TypeaheadOption> {
    catalog
        .places_in(&state.id, Some(&county.id))
        .into_iter()
        .take(limits.max_typeahead_options)
        .map(|place| TypeaheadOption {
            label: place.name.clone(),
            detail: Some(county.name.clone()),
            action: FlowAction::LocationSelected {
                county: county.clone(),
                place: Some(place),
            },
        })
        .collect()
}

/// Counties of the state followed by its places, each place paired with its county.
fn location_options(catalog: &GeographyCatalog, state: &Geography, limits: &ViewLimits) -> Vec<TypeaheadOption> {
    let counties = county_options(catalog, state, limits);
    let places = catalog.places_in(&state.id, None).into_iter().filter_map(|place| {
        let county = place
            .county_id
            .as_ref()
            .and_then(|id| catalog.county_by_id(id))?
            .clone();
        Some(TypeaheadOption {
            label: place.name.clone(),
            detail: Some(county.name.clone()),
            action: FlowAction::LocationSelected {
                county,
                place: Some(place),
            },
        })
    });

    counties
        .into_iter()
        .chain(places)
        .take(limits.max_typeahead_options)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::civic::CategorySuggestion;
    use crate::domain::secretary::graph::FlowGraph;
    use crate::domain::secretary::slots::SlotValue;

    fn california() -> Geography {
        Geography::state("06", "California", "CA")
    }

    fn alameda() -> Geography {
        Geography::county("06001", "Alameda County", &california().id)
    }

    fn context() -> ConversationContext {
        let mut ctx = ConversationContext::new();
        ctx.catalog_mut()
            .set_states(vec![california(), Geography::state("48", "Texas", "TX")]);
        let oakland = Geography::place("0653000", "Oakland", &california().id, &alameda().id);
        ctx.catalog_mut()
            .set_state_children(&california().id, vec![alameda()], vec![oakland]);
        FlowGraph::default().start(&mut ctx);
        ctx
    }

    fn slot_filling(intent: Intent) -> ConversationContext {
        let mut ctx = context();
        ctx.set_active_intent(intent);
        FlowGraph::default().jump_to(&mut ctx, NodeId::IntentSlotFilling);
        ctx
    }

    #[test]
    fn menu_offers_every_option() {
        let ctx = context();
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        assert_eq!(vm.node, NodeId::Menu);
        assert_eq!(vm.buttons.len(), MenuOption::ALL.len());
        assert!(vm.show_text_input);
        assert!(!vm.show_typeahead);
    }

    #[test]
    fn projection_is_idempotent() {
        let ctx = slot_filling(Intent::ReportIssue);
        let registry = FlowRegistry::standard();
        let limits = ViewLimits::default();
        assert_eq!(project(&ctx, &registry, &limits), project(&ctx, &registry, &limits));
    }

    #[test]
    fn geography_slot_shows_typeahead() {
        let ctx = slot_filling(Intent::CreateInstance);
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        assert!(vm.show_typeahead);
        assert_eq!(vm.typeahead_options.len(), 2);
        assert_eq!(
            vm.typeahead_options[0].action,
            FlowAction::StateSelected(california())
        );
    }

    #[test]
    fn county_typeahead_is_scoped_to_state() {
        let mut ctx = slot_filling(Intent::CreateInstance);
        ctx.slots_mut()
            .set(SlotName::State, SlotValue::Geography(california()));
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        assert_eq!(vm.typeahead_options.len(), 1);
        assert_eq!(vm.typeahead_options[0].label, "Alameda County");
    }

    #[test]
    fn category_slot_shows_capped_chips() {
        let mut ctx = slot_filling(Intent::ReportIssue);
        ctx.slots_mut()
            .set(SlotName::State, SlotValue::Geography(california()));
        ctx.slots_mut()
            .set(SlotName::County, SlotValue::Geography(alameda()));
        ctx.slots_mut()
            .set(SlotName::IssueDescription, SlotValue::Text("dark street".into()));
        ctx.board_mut().suggestions = (0..10)
            .map(|i| CategorySuggestion::new(format!("c{}", i), format!("Category {}", i)))
            .collect();

        let limits = ViewLimits {
            max_typeahead_options: 50,
            max_suggestions: 3,
        };
        let vm = project(&ctx, &FlowRegistry::standard(), &limits);
        assert!(vm.show_suggestions);
        assert_eq!(vm.suggestions.len(), 3);
        assert!(!vm.show_typeahead);
    }

    #[test]
    fn pending_repair_offers_filled_fields() {
        let mut ctx = slot_filling(Intent::CreateInstance);
        ctx.slots_mut()
            .set(SlotName::State, SlotValue::Geography(california()));
        ctx.set_awaiting_repair_target(true);
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        assert_eq!(vm.buttons[0].action, FlowAction::RepairSlot(SlotName::State));
        assert_eq!(vm.buttons.last().unwrap().action, FlowAction::BackToMenu);
    }

    #[test]
    fn discovery_location_lists_counties_then_places() {
        let mut ctx = context();
        ctx.discovery_mut().select_state(california());
        FlowGraph::default().jump_to(&mut ctx, NodeId::DiscoverySelectLocation);
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        let labels: Vec<_> = vm.typeahead_options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Alameda County", "Oakland"]);
        assert_eq!(vm.typeahead_options[1].detail.as_deref(), Some("Alameda County"));
    }

    #[test]
    fn failed_submission_offers_retry() {
        let mut ctx = context();
        FlowGraph::default().jump_to(&mut ctx, NodeId::ReportComplete);
        ctx.report_mut().submission_failed = true;
        let vm = project(&ctx, &FlowRegistry::standard(), &ViewLimits::default());
        assert_eq!(vm.buttons[0].action, FlowAction::Retry);
    }
}
