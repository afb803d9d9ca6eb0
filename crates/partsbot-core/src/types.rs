use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PartsbotError, Result};

/// Per-conversation identifier forwarded to the dialogue backend.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh id of the form `session_<unix-millis>_<9 chars>`.
    pub fn new() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(9)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        Self(format!("session_{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn from_string(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// A single chat message as exchanged with the widget and the dialogue backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Copy of this message stamped with the given time.
    pub fn stamped(&self, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(at),
            ..self.clone()
        }
    }
}

/// Reject an empty message history. Shape is enforced by deserialization.
pub fn validate_messages(messages: &[ChatMessage]) -> Result<()> {
    if messages.is_empty() {
        return Err(PartsbotError::Validation(
            "messages must be a non-empty array".into(),
        ));
    }
    Ok(())
}

/// The vehicle/part slots the conversation collects before searching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TruckInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
}

impl TruckInfo {
    pub fn is_complete(&self) -> bool {
        self.make.is_some() && self.model.is_some() && self.year.is_some() && self.part_type.is_some()
    }

    /// Overlay `other` on top of `self`; unset slots in `other` keep their value.
    pub fn merge(&self, other: &TruckInfo) -> TruckInfo {
        TruckInfo {
            make: other.make.clone().or_else(|| self.make.clone()),
            model: other.model.clone().or_else(|| self.model.clone()),
            year: other.year.clone().or_else(|| self.year.clone()),
            part_type: other.part_type.clone().or_else(|| self.part_type.clone()),
        }
    }

    /// Human names of the slots still missing, in collection order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.make.is_none() {
            out.push("make");
        }
        if self.model.is_none() {
            out.push("model");
        }
        if self.year.is_none() {
            out.push("year");
        }
        if self.part_type.is_none() {
            out.push("part type");
        }
        out
    }
}

/// A part offered back to the customer by the conversation graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub part_number: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = SessionId::new();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_message_wire_format() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert!(msg.timestamp.is_none());

        let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));

        assert!(serde_json::from_str::<ChatMessage>(r#"{"role":"robot","content":"x"}"#).is_err());
        assert!(serde_json::from_str::<ChatMessage>(r#"{"role":"user","content":5}"#).is_err());
    }

    #[test]
    fn test_validate_messages() {
        assert!(validate_messages(&[]).is_err());
        assert!(validate_messages(&[ChatMessage::user("hello")]).is_ok());
    }

    #[test]
    fn test_truck_info_merge_keeps_existing() {
        let prior = TruckInfo {
            make: Some("ford".into()),
            year: Some("2018".into()),
            ..Default::default()
        };
        let extracted = TruckInfo {
            model: Some("f-150".into()),
            year: Some("2019".into()),
            ..Default::default()
        };
        let merged = prior.merge(&extracted);
        assert_eq!(merged.make.as_deref(), Some("ford"));
        assert_eq!(merged.model.as_deref(), Some("f-150"));
        assert_eq!(merged.year.as_deref(), Some("2019"));
        assert!(!merged.is_complete());
        assert_eq!(merged.missing(), vec!["part type"]);
    }

    #[test]
    fn test_truck_info_camel_case() {
        let info = TruckInfo {
            part_type: Some("brake".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"partType": "brake"}));
    }
}
