use std::sync::Arc;

use partsbot_agent::graph::{build_finder, ConversationGraph};
use partsbot_catalog::CatalogClient;
use partsbot_core::config::AppConfig;
use partsbot_core::error::Result;
use partsbot_dialogue::DialogueClient;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: AppConfig,
    pub dialogue: Arc<DialogueClient>,
    pub catalog: Arc<CatalogClient>,
    pub graph: ConversationGraph,
}

impl AppState {
    /// Build the clients and the conversation graph from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let dialogue = Arc::new(DialogueClient::new(&config.dialogue)?);
        let catalog = Arc::new(CatalogClient::new(&config.catalog)?);
        let graph = ConversationGraph::new(build_finder(&config, Some(catalog.clone())));
        Ok(Self {
            config,
            dialogue,
            catalog,
            graph,
        })
    }
}
