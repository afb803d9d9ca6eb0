//! Conversation graph: a four-stage linear flow that collects truck details
//! from the message history and answers with matching parts.
//!
//! Stages run in order `initial → gathering_info → searching →
//! providing_results`; each node only fires when the previous one left the
//! state in its stage. State is rebuilt from the messages on every call.

pub mod extract;
pub mod finder;
pub mod nodes;
pub mod state;

use std::sync::Arc;

use tracing::debug;

use partsbot_core::types::ChatMessage;

pub use extract::extract_truck_info;
pub use finder::{build_finder, CatalogFinder, MockFinder, PartFinder};
pub use state::{ConversationState, Step};

/// The assembled conversation graph.
#[derive(Clone)]
pub struct ConversationGraph {
    finder: Arc<dyn PartFinder>,
}

/// A graph backed by the synthetic finder and the default storefront.
pub fn create_graph() -> ConversationGraph {
    ConversationGraph::new(Arc::new(MockFinder::default()))
}

impl ConversationGraph {
    pub fn new(finder: Arc<dyn PartFinder>) -> Self {
        Self { finder }
    }

    pub fn finder_name(&self) -> &str {
        self.finder.name()
    }

    /// Run the graph over a message history, starting from an empty state.
    pub async fn process_messages(&self, messages: Vec<ChatMessage>) -> ConversationState {
        self.run(ConversationState::new(messages)).await
    }

    /// Run the graph from a caller-supplied state (e.g. with slots already known).
    pub async fn run(&self, state: ConversationState) -> ConversationState {
        let mut state = nodes::determine_step(state);
        debug!(step = ?state.step, "Conversation step determined");

        if state.step == Step::GatheringInfo {
            state = nodes::gather_truck_info(state);
        }

        if state.step == Step::Searching {
            state = nodes::search_parts(state, self.finder.as_ref()).await;
        }

        if state.step == Step::ProvidingResults {
            state = nodes::format_results(state);
        }

        debug!(step = ?state.step, messages = state.messages.len(), "Conversation graph finished");
        state
    }
}
