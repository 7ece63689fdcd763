//! Flow graph: the node/transition engine.
//!
//! Transitions are keyed by `(from node, action kind)` and scanned in
//! declaration order; the first key match decides. A failing guard makes the
//! action a no-op rather than falling through to a later row, and an action
//! with no row at all is ignored. Anything smarter than a static table is the
//! Brain's job.

use std::sync::Arc;

use crate::domain::civic::{CategorySuggestion, Geography};
use crate::domain::foundation::ListenerId;

use super::action::{ActionKind, FlowAction, MenuOption};
use super::context::{ConversationContext, DiscoveryGoal};
use super::events::{FlowEvent, FlowEventListener};
use super::matchers::{find_county_in_text, find_place_in_text, find_state_in_text};
use super::node::NodeId;

/// Decides whether a transition may fire.
pub type Guard = fn(&ConversationContext, &FlowAction) -> bool;
/// Context update applied when a transition fires, before any hook runs.
pub type Effect = fn(&mut ConversationContext, &FlowAction);
/// Computes a destination from context and payload.
pub type TargetFn = fn(&ConversationContext, &FlowAction) -> NodeId;

#[derive(Clone, Copy)]
pub enum Target {
    Node(NodeId),
    Select(TargetFn),
}

impl Target {
    fn resolve(&self, ctx: &ConversationContext, action: &FlowAction) -> NodeId {
        match self {
            Self::Node(node) => *node,
            Self::Select(select) => select(ctx, action),
        }
    }
}

/// One row of the transition table.
#[derive(Clone, Copy)]
pub struct Transition {
    pub from: NodeId,
    pub on: ActionKind,
    pub to: Target,
    guard: Option<Guard>,
    effect: Option<Effect>,
}

impl Transition {
    pub fn new(from: NodeId, on: ActionKind, to: NodeId) -> Self {
        Self {
            from,
            on,
            to: Target::Node(to),
            guard: None,
            effect: None,
        }
    }

    pub fn select(from: NodeId, on: ActionKind, select: TargetFn) -> Self {
        Self {
            from,
            on,
            to: Target::Select(select),
            guard: None,
            effect: None,
        }
    }

    pub fn when(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn then(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    fn matches(&self, from: NodeId, on: ActionKind) -> bool {
        self.from == from && self.on == on
    }

    fn allows(&self, ctx: &ConversationContext, action: &FlowAction) -> bool {
        self.guard.map_or(true, |guard| guard(ctx, action))
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("on", &self.on)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

/// The conversation state machine plus its event listeners.
pub struct FlowGraph {
    transitions: Vec<Transition>,
    listeners: Vec<(ListenerId, Arc<dyn FlowEventListener>)>,
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new(default_transitions())
    }
}

impl FlowGraph {
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self {
            transitions,
            listeners: Vec::new(),
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Puts the conversation on the menu and runs its enter hook.
    pub fn start(&self, ctx: &mut ConversationContext) {
        ctx.set_current_node(NodeId::Menu);
        NodeId::Menu.on_enter(ctx);
    }

    /// Applies an action through the transition table.
    ///
    /// Returns the node entered, or `None` when the action was ignored.
    pub fn dispatch(&self, ctx: &mut ConversationContext, action: &FlowAction) -> Option<NodeId> {
        let from = ctx.current_node();
        let kind = action.kind();
        let transition = self.transitions.iter().find(|t| t.matches(from, kind))?;

        if !transition.allows(ctx, action) {
            tracing::debug!(node = %from, action = %kind, "transition guard rejected action");
            return None;
        }

        if let Some(effect) = transition.effect {
            effect(ctx, action);
        }
        let to = transition.to.resolve(ctx, action);

        self.emit(&FlowEvent::ActionTaken { node: from, action: kind });
        self.enter(ctx, from, to);
        Some(to)
    }

    /// Moves straight to a node, bypassing the table.
    pub fn jump_to(&self, ctx: &mut ConversationContext, to: NodeId) {
        let from = ctx.current_node();
        self.enter(ctx, from, to);
    }

    fn enter(&self, ctx: &mut ConversationContext, from: NodeId, to: NodeId) {
        from.on_exit(ctx);
        ctx.set_current_node(to);
        to.on_enter(ctx);
        tracing::debug!(from = %from, to = %to, "node transition");
        self.emit(&FlowEvent::NodeEntered { from, to });
    }

    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: FlowEventListener + 'static,
    {
        let id = ListenerId::new();
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns false if no listener had that id.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn emit(&self, event: &FlowEvent) {
        for (_, listener) in &self.listeners {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for FlowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowGraph")
            .field("transitions", &self.transitions.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn discovery_goal(option: MenuOption) -> Option<DiscoveryGoal> {
    match option {
        MenuOption::ReportIssue => Some(DiscoveryGoal::ReportIssue),
        MenuOption::FindInstance => Some(DiscoveryGoal::FindInstance),
        MenuOption::TopIssues => Some(DiscoveryGoal::TopIssues),
        MenuOption::CreateInstance | MenuOption::BrowseCategories => None,
    }
}

fn is_discovery_option(_: &ConversationContext, action: &FlowAction) -> bool {
    matches!(action, FlowAction::MenuSelected(option) if discovery_goal(*option).is_some())
}

fn set_discovery_goal(ctx: &mut ConversationContext, action: &FlowAction) {
    if let FlowAction::MenuSelected(option) = action {
        if let Some(goal) = discovery_goal(*option) {
            ctx.clear_flow_state();
            ctx.discovery_mut().goal = goal;
        }
    }
}

fn select_state(ctx: &mut ConversationContext, action: &FlowAction) {
    let state = match action {
        FlowAction::StateSelected(state) => Some(state.clone()),
        FlowAction::FreeTextInput(text) => find_state_in_text(text, ctx.catalog().states()).cloned(),
        _ => None,
    };
    if let Some(state) = state {
        ctx.discovery_mut().select_state(state);
    }
}

fn names_known_state(ctx: &ConversationContext, action: &FlowAction) -> bool {
    action
        .text()
        .map_or(false, |text| find_state_in_text(text, ctx.catalog().states()).is_some())
}

/// Resolves typed text to a county, or to a place and its county.
fn match_location(
    ctx: &ConversationContext,
    text: &str,
) -> Option<(Geography, Option<Geography>)> {
    let state = ctx.discovery().state.as_ref()?;
    let catalog = ctx.catalog();
    let counties = catalog.counties_in(&state.id);
    if let Some(county) = find_county_in_text(text, &counties) {
        let places = catalog.places_in(&state.id, Some(&county.id));
        let place = find_place_in_text(text, &places).cloned();
        return Some((county.clone(), place));
    }

    let places = catalog.places_in(&state.id, None);
    let place = find_place_in_text(text, &places)?;
    let county = place
        .county_id
        .as_ref()
        .and_then(|county_id| catalog.county_by_id(county_id))?;
    Some((county.clone(), Some(place.clone())))
}

fn names_known_location(ctx: &ConversationContext, action: &FlowAction) -> bool {
    action
        .text()
        .map_or(false, |text| match_location(ctx, text).is_some())
}

fn select_location(ctx: &mut ConversationContext, action: &FlowAction) {
    let location = match action {
        FlowAction::LocationSelected { county, place } => Some((county.clone(), place.clone())),
        FlowAction::FreeTextInput(text) => match_location(ctx, text),
        _ => None,
    };
    if let Some((county, place)) = location {
        ctx.discovery_mut().select_location(county, place);
    }
}

fn node_for_goal(ctx: &ConversationContext, _: &FlowAction) -> NodeId {
    match ctx.discovery().goal {
        DiscoveryGoal::FindInstance => NodeId::DiscoveryResult,
        DiscoveryGoal::TopIssues => NodeId::DiscoveryTopIssues,
        DiscoveryGoal::ReportIssue => NodeId::ReportLoading,
    }
}

fn start_report_here(ctx: &mut ConversationContext, _: &FlowAction) {
    ctx.discovery_mut().goal = DiscoveryGoal::ReportIssue;
    *ctx.report_mut() = Default::default();
}

fn endorse_issue(ctx: &mut ConversationContext, action: &FlowAction) {
    if let FlowAction::TopIssueSelected(issue) = action {
        let report = ctx.report_mut();
        report.endorsed_issue = Some(issue.id.clone());
        report.description = Some(issue.title.clone());
        report.category = Some(CategorySuggestion::new(
            issue.category.to_lowercase(),
            issue.category.clone(),
        ));
    }
}

fn is_description(ctx: &ConversationContext, action: &FlowAction) -> bool {
    action.text().map_or(false, |text| ctx.accepts_description(text))
}

fn set_description(ctx: &mut ConversationContext, action: &FlowAction) {
    if let Some(text) = action.text() {
        let text = text.trim().to_string();
        ctx.report_mut().description = Some(text);
    }
}

fn is_non_empty_text(_: &ConversationContext, action: &FlowAction) -> bool {
    action.text().map_or(false, |text| !text.trim().is_empty())
}

fn set_category(ctx: &mut ConversationContext, action: &FlowAction) {
    let category = match action {
        FlowAction::SuggestionSelected(category) => Some(category.clone()),
        FlowAction::FreeTextInput(text) => Some(CategorySuggestion::custom(text.trim())),
        _ => None,
    };
    if category.is_some() {
        ctx.report_mut().category = category;
    }
}

fn submission_failed(ctx: &ConversationContext, _: &FlowAction) -> bool {
    ctx.report().submission_failed
}

/// The standard transition table for the discovery and report flows.
pub fn default_transitions() -> Vec<Transition> {
    use ActionKind as A;
    use NodeId as N;

    let mut table = vec![
        Transition::new(N::Menu, A::MenuSelected, N::DiscoverySelectState)
            .when(is_discovery_option)
            .then(set_discovery_goal),
        Transition::new(N::Menu, A::FreeTextInput, N::UnknownInputRecovery),
        Transition::new(N::UnknownInputRecovery, A::MenuSelected, N::DiscoverySelectState)
            .when(is_discovery_option)
            .then(set_discovery_goal),
        Transition::new(N::UnknownInputRecovery, A::FreeTextInput, N::UnknownInputRecovery),
        Transition::new(N::UnknownInputRecovery, A::Retry, N::Menu),
        Transition::new(N::DiscoverySelectState, A::StateSelected, N::DiscoverySelectLocation)
            .then(select_state),
        Transition::new(N::DiscoverySelectState, A::FreeTextInput, N::DiscoverySelectLocation)
            .when(names_known_state)
            .then(select_state),
        Transition::select(N::DiscoverySelectLocation, A::LocationSelected, node_for_goal)
            .then(select_location),
        Transition::select(N::DiscoverySelectLocation, A::FreeTextInput, node_for_goal)
            .when(names_known_location)
            .then(select_location),
        Transition::new(N::DiscoverySelectLocation, A::StateSelected, N::DiscoverySelectLocation)
            .then(select_state),
        Transition::new(N::DiscoveryResult, A::ReportHere, N::ReportLoading)
            .then(start_report_here),
        Transition::new(N::DiscoveryTopIssues, A::TopIssueSelected, N::ReportComplete)
            .then(endorse_issue),
        Transition::new(N::DiscoveryTopIssues, A::SomethingElse, N::ReportCollectDescription)
            .then(start_report_here),
        Transition::new(N::ReportLoading, A::IssuesLoaded, N::ReportTopIssues),
        Transition::new(N::ReportTopIssues, A::TopIssueSelected, N::ReportComplete)
            .then(endorse_issue),
        Transition::new(N::ReportTopIssues, A::SomethingElse, N::ReportCollectDescription),
        Transition::new(N::ReportTopIssues, A::FreeTextInput, N::ReportShowSuggestions)
            .when(is_description)
            .then(set_description),
        Transition::new(N::ReportCollectDescription, A::FreeTextInput, N::ReportShowSuggestions)
            .when(is_description)
            .then(set_description),
        Transition::new(N::ReportShowSuggestions, A::SuggestionSelected, N::ReportComplete)
            .then(set_category),
        Transition::new(N::ReportShowSuggestions, A::CustomCategory, N::ReportCustomCategory),
        Transition::new(N::ReportShowSuggestions, A::FreeTextInput, N::ReportComplete)
            .when(is_non_empty_text)
            .then(set_category),
        Transition::new(N::ReportCustomCategory, A::FreeTextInput, N::ReportComplete)
            .when(is_non_empty_text)
            .then(set_category),
        Transition::new(N::ReportComplete, A::Retry, N::ReportComplete).when(submission_failed),
    ];

    table.extend(
        NodeId::ALL
            .into_iter()
            .filter(|node| *node != N::Menu)
            .map(|node| Transition::new(node, A::BackToMenu, N::Menu)),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::civic::TopIssue;
    use crate::domain::secretary::copy;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn california() -> Geography {
        Geography::state("06", "California", "CA")
    }

    fn alameda() -> Geography {
        Geography::county("06001", "Alameda County", &california().id)
    }

    fn oakland() -> Geography {
        Geography::place("0653000", "Oakland", &california().id, &alameda().id)
    }

    fn context_with_catalog() -> ConversationContext {
        let mut ctx = ConversationContext::new();
        ctx.catalog_mut().set_states(vec![california(), Geography::state("48", "Texas", "TX")]);
        ctx.catalog_mut()
            .set_state_children(&california().id, vec![alameda()], vec![oakland()]);
        ctx
    }

    fn started(graph: &FlowGraph) -> ConversationContext {
        let mut ctx = context_with_catalog();
        graph.start(&mut ctx);
        ctx
    }

    mod table {
        use super::*;

        #[test]
        fn back_to_menu_from_every_other_node() {
            let table = default_transitions();
            for node in NodeId::ALL.into_iter().filter(|n| *n != NodeId::Menu) {
                assert!(
                    table.iter().any(|t| t.from == node && t.on == ActionKind::BackToMenu),
                    "{} has no way back",
                    node
                );
            }
        }

        #[test]
        fn at_most_one_row_per_key() {
            let mut seen = HashSet::new();
            for transition in default_transitions() {
                assert!(
                    seen.insert((transition.from, transition.on)),
                    "duplicate row for {} on {}",
                    transition.from,
                    transition.on
                );
            }
        }
    }

    mod dispatching {
        use super::*;

        #[test]
        fn unmatched_action_is_ignored() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            let before = ctx.messages().len();
            assert_eq!(graph.dispatch(&mut ctx, &FlowAction::ReportHere), None);
            assert_eq!(ctx.current_node(), NodeId::Menu);
            assert_eq!(ctx.messages().len(), before);
        }

        #[test]
        fn menu_option_starts_discovery_with_goal() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            let to = graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::TopIssues));
            assert_eq!(to, Some(NodeId::DiscoverySelectState));
            assert_eq!(ctx.discovery().goal, DiscoveryGoal::TopIssues);
            assert_eq!(
                ctx.messages().last().unwrap().content,
                copy::ASK_STATE_FOR_DISCOVERY
            );
        }

        #[test]
        fn intent_menu_options_are_left_to_the_brain() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            let action = FlowAction::MenuSelected(MenuOption::CreateInstance);
            assert_eq!(graph.dispatch(&mut ctx, &action), None);
        }

        #[test]
        fn typed_state_is_matched_against_catalog() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::FindInstance));

            let miss = FlowAction::FreeTextInput("Atlantis".into());
            assert_eq!(graph.dispatch(&mut ctx, &miss), None);

            let hit = FlowAction::FreeTextInput("I'm in California".into());
            assert_eq!(graph.dispatch(&mut ctx, &hit), Some(NodeId::DiscoverySelectLocation));
            assert_eq!(ctx.discovery().state, Some(california()));
        }

        #[test]
        fn location_target_follows_goal() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::ReportIssue));
            graph.dispatch(&mut ctx, &FlowAction::StateSelected(california()));

            let to = graph.dispatch(&mut ctx, &FlowAction::FreeTextInput("Oakland".into()));
            assert_eq!(to, Some(NodeId::ReportLoading));
            assert_eq!(ctx.discovery().county, Some(alameda()));
            assert_eq!(ctx.discovery().place, Some(oakland()));
        }

        #[test]
        fn short_description_is_rejected_by_guard() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.jump_to(&mut ctx, NodeId::ReportCollectDescription);
            assert_eq!(graph.dispatch(&mut ctx, &FlowAction::FreeTextInput("bad".into())), None);

            let to = graph.dispatch(
                &mut ctx,
                &FlowAction::FreeTextInput("Overflowing trash cans".into()),
            );
            assert_eq!(to, Some(NodeId::ReportShowSuggestions));
            assert_eq!(ctx.report().description.as_deref(), Some("Overflowing trash cans"));
        }

        #[test]
        fn endorsing_an_issue_fills_the_report() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.jump_to(&mut ctx, NodeId::ReportLoading);
            graph.dispatch(&mut ctx, &FlowAction::IssuesLoaded);

            let issue = TopIssue::new("issue-1", "Potholes on Main St", "Streets");
            let to = graph.dispatch(&mut ctx, &FlowAction::TopIssueSelected(issue));
            assert_eq!(to, Some(NodeId::ReportComplete));
            assert_eq!(ctx.report().endorsed_issue.as_deref(), Some("issue-1"));
            assert_eq!(ctx.report().category.as_ref().unwrap().name, "Streets");
        }

        #[test]
        fn retry_requires_failed_submission() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.jump_to(&mut ctx, NodeId::ReportComplete);
            assert_eq!(graph.dispatch(&mut ctx, &FlowAction::Retry), None);

            ctx.report_mut().submission_failed = true;
            assert_eq!(graph.dispatch(&mut ctx, &FlowAction::Retry), Some(NodeId::ReportComplete));
            assert!(!ctx.report().submission_failed);
        }

        #[test]
        fn back_to_menu_clears_flow_state() {
            let graph = FlowGraph::default();
            let mut ctx = started(&graph);
            graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::FindInstance));
            graph.dispatch(&mut ctx, &FlowAction::StateSelected(california()));
            graph.dispatch(&mut ctx, &FlowAction::BackToMenu);
            assert_eq!(ctx.current_node(), NodeId::Menu);
            assert!(ctx.discovery().state.is_none());
            assert!(ctx.catalog().has_states());
        }
    }

    mod listeners {
        use super::*;

        #[test]
        fn events_follow_transition_order() {
            let mut graph = FlowGraph::default();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = seen.clone();
            graph.add_listener(move |event: &FlowEvent| sink.lock().unwrap().push(*event));

            let mut ctx = started(&graph);
            graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::FindInstance));

            let events = seen.lock().unwrap().clone();
            assert_eq!(
                events,
                vec![
                    FlowEvent::ActionTaken {
                        node: NodeId::Menu,
                        action: ActionKind::MenuSelected
                    },
                    FlowEvent::NodeEntered {
                        from: NodeId::Menu,
                        to: NodeId::DiscoverySelectState
                    },
                ]
            );
        }

        #[test]
        fn removed_listener_hears_nothing() {
            let mut graph = FlowGraph::default();
            let seen = Arc::new(Mutex::new(0usize));
            let sink = seen.clone();
            let id = graph.add_listener(move |_: &FlowEvent| *sink.lock().unwrap() += 1);

            assert!(graph.remove_listener(id));
            assert!(!graph.remove_listener(id));

            let mut ctx = started(&graph);
            graph.dispatch(&mut ctx, &FlowAction::MenuSelected(MenuOption::FindInstance));
            assert_eq!(*seen.lock().unwrap(), 0);
        }
    }
}
