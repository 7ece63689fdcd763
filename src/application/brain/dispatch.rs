//! Routing of typed text and structured actions.

use tracing::{debug, info};

use super::{Brain, Step};
use crate::domain::secretary::{
    classify_intent, copy, FlowAction, Intent, MenuOption, NavigationRequest, NodeId,
};

impl Brain {
    pub(super) async fn route_text(&mut self, text: &str) -> Step {
        let node = self.ctx.current_node();
        match node {
            NodeId::IntentSlotFilling => self.slot_text(text).await,
            NodeId::Menu | NodeId::UnknownInputRecovery => self.route_open_request(text).await,
            _ => self.route_node_text(node, text).await,
        }
    }

    /// Text on the menu: intents first, then deep links and destinations,
    /// then the transition table (which lands on recovery).
    pub(super) async fn route_open_request(&mut self, text: &str) -> Step {
        if let Some(intent) = classify_intent(text) {
            debug!(session = %self.ctx.session_id(), intent = %intent, "text classified");
            return self.start_intent(intent, Some(text)).await;
        }

        let request = self
            .destinations
            .parse_deep_link(text)
            .or_else(|| self.destinations.find_destination(text));
        if let Some(request) = request {
            self.navigate(request);
            return Ok(());
        }

        if self.ctx.current_node() == NodeId::IntentSlotFilling {
            self.graph.jump_to(&mut self.ctx, NodeId::Menu);
        }
        self.dispatch_and_load(FlowAction::FreeTextInput(text.to_string())).await
    }

    /// Text on a legacy node. The node's own rule wins; otherwise an exit
    /// phrase or a fresh request takes over, and failing that the user gets a
    /// hint for what this node expects.
    async fn route_node_text(&mut self, node: NodeId, text: &str) -> Step {
        let action = FlowAction::FreeTextInput(text.to_string());
        if self.graph.dispatch(&mut self.ctx, &action).is_some() {
            return self.load_node_data().await;
        }

        if copy::is_exit_phrase(text) {
            return self.dispatch_and_load(FlowAction::BackToMenu).await;
        }

        let expects_description = matches!(
            node,
            NodeId::ReportTopIssues | NodeId::ReportCollectDescription
        );
        if !expects_description {
            if let Some(intent) = classify_intent(text) {
                debug!(session = %self.ctx.session_id(), intent = %intent, "fresh request mid-flow");
                return self.start_intent(intent, Some(text)).await;
            }
        }

        let hint = match node {
            NodeId::DiscoverySelectState => copy::STATE_NOT_RECOGNIZED.to_string(),
            NodeId::DiscoverySelectLocation => copy::LOCATION_NOT_RECOGNIZED.to_string(),
            NodeId::ReportTopIssues | NodeId::ReportCollectDescription => {
                copy::description_too_short(self.ctx.min_description_chars())
            }
            NodeId::ReportShowSuggestions | NodeId::ReportCustomCategory => {
                copy::ASK_CUSTOM_CATEGORY.to_string()
            }
            _ => copy::PICK_AN_OPTION.to_string(),
        };
        self.ctx.say(hint);
        Ok(())
    }

    pub(super) async fn route_action(&mut self, action: FlowAction) -> Step {
        let node = self.ctx.current_node();
        match &action {
            FlowAction::OpenDestination(destination) => {
                let request = self.destination_request(destination);
                self.navigate(request);
                Ok(())
            }
            FlowAction::MenuSelected(option) if node.accepts_open_request() => {
                self.select_menu_option(*option).await
            }
            _ if node == NodeId::IntentSlotFilling => {
                if self.slot_action(&action).await? {
                    return Ok(());
                }
                self.dispatch_and_load(action).await
            }
            _ => self.dispatch_and_load(action).await,
        }
    }

    async fn select_menu_option(&mut self, option: MenuOption) -> Step {
        match option {
            MenuOption::CreateInstance => self.start_intent(Intent::CreateInstance, None).await,
            MenuOption::BrowseCategories => self.start_intent(Intent::AskCategory, None).await,
            MenuOption::ReportIssue | MenuOption::FindInstance | MenuOption::TopIssues => {
                self.dispatch_and_load(FlowAction::MenuSelected(option)).await
            }
        }
    }

    async fn dispatch_and_load(&mut self, action: FlowAction) -> Step {
        match self.graph.dispatch(&mut self.ctx, &action) {
            Some(_) => self.load_node_data().await,
            None => {
                debug!(
                    session = %self.ctx.session_id(),
                    node = %self.ctx.current_node(),
                    action = %action.kind(),
                    "action ignored"
                );
                Ok(())
            }
        }
    }

    /// Request for a destination button, carrying the selected location.
    fn destination_request(&self, destination: &str) -> NavigationRequest {
        let mut request = NavigationRequest::new(destination).closing();
        let discovery = self.ctx.discovery();
        if let Some(state) = &discovery.state {
            request = request.with_param("state_id", state.id.as_str());
        }
        if let Some(county) = &discovery.county {
            request = request.with_param("county_id", county.id.as_str());
        }
        if let Some(place) = &discovery.place {
            request = request.with_param("place_id", place.id.as_str());
        }
        request
    }

    fn navigate(&mut self, request: NavigationRequest) {
        info!(
            session = %self.ctx.session_id(),
            destination = %request.destination_id,
            should_close = request.should_close,
            "navigating"
        );
        self.ctx.say(copy::navigating_to(&request.destination_id));
        self.navigator.navigate(&request);
    }
}
