//! Mapping of catalog failures into customer-readable messages.

use partsbot_core::error::PartsbotError;

/// Build the error for a non-2xx catalog response.
///
/// Well-known statuses get a fixed message; anything else uses the body's
/// `message` field, then the status reason phrase.
pub fn status_error(status: u16, reason: Option<&str>, body: &str) -> PartsbotError {
    let message = match status {
        401 => "Authentication failed. Please check your API key.".to_string(),
        403 => "Access forbidden. You may not have permission to access this resource.".to_string(),
        404 => "Resource not found.".to_string(),
        429 => "Rate limit exceeded. Please try again later.".to_string(),
        500 => "Internal server error. Please try again later.".to_string(),
        _ => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| "API request failed".to_string()),
    };
    PartsbotError::Catalog {
        status: Some(status),
        message,
    }
}

/// Build the error for a request that never produced a response.
pub fn transport_error(err: &reqwest::Error) -> PartsbotError {
    let message = if err.is_connect() {
        "Unable to connect to the parts catalog API. Please check your internet connection."
            .to_string()
    } else if err.is_timeout() {
        "The parts catalog API did not respond in time. Please try again later.".to_string()
    } else {
        err.to_string()
    };
    PartsbotError::Catalog {
        status: None,
        message,
    }
}
