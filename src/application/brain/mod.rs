//! The Brain: one conversation session.
//!
//! Owns the conversation context, the flow graph and the intent registry,
//! and talks to the civic backend and the host navigator. Every entry point
//! takes `&mut self`, so a session processes one user action at a time.
//!
//! Backend failures never surface to the caller. A failed lookup leaves the
//! affected list empty and the conversation re-prompts. Cancelling the
//! session token aborts any in-flight lookup or pacing delay; the session
//! then ignores input until [`Brain::reset`].

mod dispatch;
mod flows;
mod lookups;
mod slot_runner;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::SecretaryConfig;
use crate::domain::foundation::{ListenerId, SessionId};
use crate::domain::secretary::{
    project, ChatMessage, ConversationContext, FlowAction, FlowEventListener, FlowGraph,
    FlowRegistry, NodeId, SuggestionChip, TypeaheadOption, ViewLimits, ViewModel,
};
use crate::ports::{CivicBackend, DestinationResolver, NoDestinations, Navigator};

/// Marker returned when the session token was cancelled mid-action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interrupted;

/// Outcome of an internal step; `Err` means stop processing this action.
pub(crate) type Step = Result<(), Interrupted>;

/// Conversational engine for a single chat session.
pub struct Brain {
    ctx: ConversationContext,
    graph: FlowGraph,
    registry: FlowRegistry,
    navigator: Arc<dyn Navigator>,
    backend: Option<Arc<dyn CivicBackend>>,
    destinations: Arc<dyn DestinationResolver>,
    config: SecretaryConfig,
    limits: ViewLimits,
    cancel: CancellationToken,
}

impl Brain {
    /// Creates a session on the menu with the welcome message shown.
    ///
    /// Without a backend every lookup comes back empty.
    pub fn new(navigator: Arc<dyn Navigator>, config: SecretaryConfig) -> Self {
        let registry = flows::build_registry(navigator.clone());
        let limits = ViewLimits {
            max_typeahead_options: config.max_typeahead_options,
            max_suggestions: config.max_suggestions,
        };
        let mut brain = Self {
            ctx: ConversationContext::new().with_min_description_chars(config.min_description_chars),
            graph: FlowGraph::default(),
            registry,
            navigator,
            backend: None,
            destinations: Arc::new(NoDestinations),
            config,
            limits,
            cancel: CancellationToken::new(),
        };
        brain.graph.start(&mut brain.ctx);
        info!(session = %brain.ctx.session_id(), "secretary session started");
        brain
    }

    pub fn with_backend(mut self, backend: Arc<dyn CivicBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_destinations(mut self, destinations: Arc<dyn DestinationResolver>) -> Self {
        self.destinations = destinations;
        self
    }

    /// Handles a line of typed text.
    pub async fn handle_user_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.is_closed() {
            return;
        }
        self.ctx.record_user_input(text);
        if self.route_text(text).await.is_err() {
            info!(session = %self.ctx.session_id(), "action interrupted");
        }
    }

    /// Handles a structured action from a button, chip or picker.
    pub async fn handle_action(&mut self, action: FlowAction) {
        if let FlowAction::FreeTextInput(text) = action {
            return self.handle_user_text(&text).await;
        }
        if self.is_closed() {
            return;
        }
        if let Some(label) = action.echo() {
            self.ctx.record_user_choice(label);
        }
        if self.route_action(action).await.is_err() {
            info!(session = %self.ctx.session_id(), "action interrupted");
        }
    }

    pub fn get_view_model(&self) -> ViewModel {
        project(&self.ctx, &self.registry, &self.limits)
    }

    pub fn get_messages(&self) -> &[ChatMessage] {
        self.ctx.messages()
    }

    /// True while the main menu (or its recovery variant) is on screen.
    pub fn is_showing_menu(&self) -> bool {
        self.ctx.current_node().accepts_open_request()
    }

    pub fn get_typeahead_options(&self) -> Vec<TypeaheadOption> {
        self.get_view_model().typeahead_options
    }

    pub fn get_suggestions(&self) -> Vec<SuggestionChip> {
        self.get_view_model().suggestions
    }

    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: FlowEventListener + 'static,
    {
        self.graph.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.graph.remove_listener(id)
    }

    /// Starts over with a fresh session on the menu.
    ///
    /// Work still in flight for the old session is cancelled. Listeners stay
    /// registered.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.ctx =
            ConversationContext::new().with_min_description_chars(self.config.min_description_chars);
        self.graph.start(&mut self.ctx);
        info!(session = %self.ctx.session_id(), "secretary session reset");
    }

    /// Cancels in-flight work and stops accepting input.
    pub fn close(&mut self) {
        self.cancel.cancel();
        info!(session = %self.ctx.session_id(), "secretary session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that aborts the session's in-flight work when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn session_id(&self) -> SessionId {
        self.ctx.session_id()
    }

    pub fn current_node(&self) -> NodeId {
        self.ctx.current_node()
    }

    pub fn context(&self) -> &ConversationContext {
        &self.ctx
    }
}

impl std::fmt::Debug for Brain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brain")
            .field("session_id", &self.ctx.session_id())
            .field("node", &self.ctx.current_node())
            .field("has_backend", &self.backend.is_some())
            .field("closed", &self.is_closed())
            .finish()
    }
}
