use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartsbotError {
    // Dialogue backend errors
    #[error("Dialogue backend request failed: {0}")]
    DialogueRequest(String),

    #[error("Dialogue backend error: {status} - {body}")]
    DialogueStatus { status: u16, body: String },

    #[error("Dialogue backend streaming error: {status} - {body}")]
    DialogueStream { status: u16, body: String },

    #[error("Dialogue backend response parse error: {0}")]
    DialogueParse(String),

    // Catalog errors
    #[error("{message}")]
    Catalog {
        status: Option<u16>,
        message: String,
    },

    #[error("Catalog response did not match the expected schema: {0}")]
    CatalogSchema(String),

    // Request validation
    #[error("Invalid request: {0}")]
    Validation(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PartsbotError {
    /// HTTP status reported by the upstream service, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PartsbotError::DialogueStatus { status, .. }
            | PartsbotError::DialogueStream { status, .. } => Some(*status),
            PartsbotError::Catalog { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PartsbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_text() {
        let err = PartsbotError::DialogueStream {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "Dialogue backend streaming error: 502 - bad gateway"
        );
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_catalog_error_displays_message_only() {
        let err = PartsbotError::Catalog {
            status: Some(404),
            message: "Resource not found.".into(),
        };
        assert_eq!(err.to_string(), "Resource not found.");
        assert_eq!(err.status(), Some(404));
        assert_eq!(PartsbotError::Validation("x".into()).status(), None);
    }
}
