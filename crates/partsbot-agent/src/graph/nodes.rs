use tracing::{info, warn};

use partsbot_core::types::{ChatMessage, Role, SearchResult, TruckInfo};

use super::extract::extract_truck_info;
use super::finder::PartFinder;
use super::state::{ConversationState, Step};

/// Decide whether to gather more details or search. Only a trailing user
/// message moves the conversation.
pub fn determine_step(state: ConversationState) -> ConversationState {
    match state.messages.last() {
        Some(last) if last.role == Role::User => {}
        _ => return state,
    }

    let step = if state.truck_info.is_complete() {
        Step::Searching
    } else {
        Step::GatheringInfo
    };
    ConversationState { step, ..state }
}

/// Extract slots from everything the user has said so far.
pub fn gather_truck_info(state: ConversationState) -> ConversationState {
    let extracted = extract_truck_info(&state.user_text());
    let truck_info = state.truck_info.merge(&extracted);

    if truck_info.is_complete() {
        info!(
            make = ?truck_info.make,
            model = ?truck_info.model,
            year = ?truck_info.year,
            part_type = ?truck_info.part_type,
            "Truck details complete"
        );
        return ConversationState {
            truck_info,
            step: Step::Searching,
            ..state
        };
    }

    let mut messages = state.messages;
    messages.push(ChatMessage::assistant(ask_for_missing(&truck_info)));
    ConversationState {
        messages,
        truck_info,
        step: Step::GatheringInfo,
        ..state
    }
}

fn ask_for_missing(info: &TruckInfo) -> String {
    let missing = info.missing();
    let list = match missing.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    format!(
        "To find the right part, could you tell me your truck's {}?",
        list
    )
}

/// Look up parts for the collected details. A failed lookup yields no results.
pub async fn search_parts(state: ConversationState, finder: &dyn PartFinder) -> ConversationState {
    let search_results = match finder.find(&state.truck_info).await {
        Ok(results) => results,
        Err(e) => {
            warn!(finder = finder.name(), error = %e, "Part search failed");
            Vec::new()
        }
    };
    info!(finder = finder.name(), count = search_results.len(), "Part search finished");

    ConversationState {
        search_results,
        step: Step::ProvidingResults,
        ..state
    }
}

fn render_result(result: &SearchResult) -> String {
    format!(
        "Part Number: {}\nDescription: {}\nPrice: {}\nMore info: {}",
        result.part_number,
        result.description,
        result.price.as_deref().unwrap_or_default(),
        result.url.as_deref().unwrap_or_default()
    )
}

/// Turn the search results into the assistant's reply.
pub fn format_results(state: ConversationState) -> ConversationState {
    let info = &state.truck_info;
    let part = info.part_type.as_deref().unwrap_or_default();
    let vehicle = format!(
        "{} {} {}",
        info.year.as_deref().unwrap_or_default(),
        info.make.as_deref().unwrap_or_default(),
        info.model.as_deref().unwrap_or_default()
    );

    let (content, step) = if state.search_results.is_empty() {
        (
            format!(
                "I couldn't find any {} for your {}. Could you provide more details or try a different part?",
                part, vehicle
            ),
            Step::GatheringInfo,
        )
    } else {
        let listing = state
            .search_results
            .iter()
            .map(render_result)
            .collect::<Vec<_>>()
            .join("\n\n");
        (
            format!(
                "I found the following {} options for your {}:\n\n{}\n\nWould you like more information about any of these parts?",
                part, vehicle, listing
            ),
            Step::Initial,
        )
    };

    let mut messages = state.messages;
    messages.push(ChatMessage::assistant(content));
    ConversationState {
        messages,
        step,
        ..state
    }
}
