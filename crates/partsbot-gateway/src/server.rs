use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::diagnostics;
use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the gateway server until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let app = router(self.state.clone());
        let bind = &self.state.config.gateway.bind;

        let listener = TcpListener::bind(bind).await?;
        info!(bind = %bind, backend = %self.state.dialogue.base_url(), "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}

/// All API routes with the configured CORS policy.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);

    Router::new()
        // Chat
        .route("/api/chat", post(routes::chat))
        .route("/api/assist", post(routes::assist))
        .route("/api/health", get(routes::health))
        // Catalog diagnostics
        .route("/api/test-connection", get(diagnostics::test_connection))
        .route("/api/test-search", post(diagnostics::test_search))
        .route("/api/test-part-details", post(diagnostics::test_part_details))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(routes::SESSION_HEADER)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_TYPE, ORIGIN,
    };
    use axum::http::Request;
    use tower::ServiceExt;

    use partsbot_core::config::AppConfig;

    fn restricted_router() -> Router {
        let mut config = AppConfig::default();
        config.dialogue.url = "http://127.0.0.1:1".into();
        config.catalog.base_url = "http://127.0.0.1:1".into();
        config.gateway.allowed_origins = vec!["https://shop.example.com".into()];
        router(Arc::new(AppState::from_config(config).unwrap()))
    }

    fn assist_from(origin: &str) -> Request<Body> {
        Request::post("/api/assist")
            .header(ORIGIN, origin)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"messages":[{"role":"user","content":"hi"}]}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_listed_origin_is_allowed() {
        let response = restricted_router()
            .oneshot(assist_from("https://shop.example.com"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example.com"
        );
        let exposed = response.headers()[ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(exposed.contains(routes::SESSION_HEADER));
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_allow_header() {
        let response = restricted_router()
            .oneshot(assist_from("https://evil.example.net"))
            .await
            .unwrap();
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_permissive_without_configured_origins() {
        let mut config = AppConfig::default();
        config.dialogue.url = "http://127.0.0.1:1".into();
        let app = router(Arc::new(AppState::from_config(config).unwrap()));
        let response = app
            .oneshot(assist_from("https://anywhere.example.org"))
            .await
            .unwrap();
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
