use serde::{Deserialize, Serialize};

use partsbot_core::types::{ChatMessage, SearchResult, TruckInfo};

/// Where the conversation currently stands.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Initial,
    GatheringInfo,
    Searching,
    ProvidingResults,
}

/// Everything the graph knows during one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub step: Step,
    pub truck_info: TruckInfo,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
}

impl ConversationState {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Content of every user message, joined with single spaces.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == partsbot_core::types::Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
