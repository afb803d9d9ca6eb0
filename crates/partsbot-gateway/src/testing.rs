//! Helpers shared by the route tests.

use std::sync::Arc;

use axum::response::Response;

use partsbot_core::config::AppConfig;

use crate::state::AppState;

/// State whose clients point at the given (usually mock) servers.
pub fn state_for(dialogue_url: &str, catalog_url: &str) -> Arc<AppState> {
    let mut config = AppConfig::default();
    config.dialogue.url = dialogue_url.to_string();
    config.dialogue.timeout_secs = 5;
    config.catalog.base_url = catalog_url.to_string();
    config.catalog.api_key = Some("test-catalog-key".into());
    config.catalog.timeout_secs = 5;
    Arc::new(AppState::from_config(config).unwrap())
}

pub async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
