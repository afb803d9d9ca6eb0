pub mod client;
pub mod streaming;

pub use client::{DialogueClient, DialogueRequest, DialogueResponse, ToolCallRecord};
pub use streaming::{error_event, SseEvent, SseParser, SseStream};
