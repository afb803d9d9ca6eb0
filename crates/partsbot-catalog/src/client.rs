use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use partsbot_core::config::{AuthMethod, CatalogConfig};
use partsbot_core::error::{PartsbotError, Result};

use crate::endpoints::Endpoints;
use crate::errors::{status_error, transport_error};
use crate::types::{Part, SearchParams, SearchResponse};

/// Client for the third-party parts catalog API.
pub struct CatalogClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    auth_method: AuthMethod,
    endpoints: Endpoints,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PartsbotError::Config(format!("catalog http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|_| config.has_api_key()),
            auth_method: config.auth_method,
            endpoints: Endpoints::from_config(&config.endpoints),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let Some(key) = &self.api_key else {
            return builder;
        };
        match self.auth_method {
            AuthMethod::Bearer => builder.header(AUTHORIZATION, format!("Bearer {}", key)),
            AuthMethod::ApiKey => builder.header("X-API-Key", key),
            AuthMethod::Basic => match key.split_once(':') {
                Some((user, pass)) => builder.basic_auth(user, Some(pass)),
                None => builder.basic_auth(key, None::<&str>),
            },
            AuthMethod::None => builder,
        }
    }

    /// GET `endpoint` with the given query pairs and return the JSON body.
    pub async fn make_request(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, params = query.len(), "Catalog request");

        let response = self
            .authorize(self.http.get(&url))
            .header(CONTENT_TYPE, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Catalog request failed");
                transport_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Catalog returned an error status");
            return Err(status_error(status.as_u16(), status.canonical_reason(), &body));
        }

        response.json().await.map_err(|e| transport_error(&e))
    }

    /// Search the catalog. The response must match the documented schema.
    pub async fn search_parts(&self, params: &SearchParams) -> Result<SearchResponse> {
        let body = self
            .make_request(&self.endpoints.search, &params.to_query())
            .await?;
        serde_json::from_value(body).map_err(|e| PartsbotError::CatalogSchema(e.to_string()))
    }

    /// Look up one part. `Ok(None)` when the catalog does not know it.
    pub async fn get_part_details(&self, part_number: &str) -> Result<Option<Part>> {
        let path = self.endpoints.part_details_path(part_number);
        match self.make_request(&path, &[]).await {
            Ok(body) => serde_json::from_value(body)
                .map(Some)
                .map_err(|e| PartsbotError::CatalogSchema(e.to_string())),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use partsbot_core::config::{EndpointPreset, EndpointsConfig};

    fn config_for(server: &MockServer) -> CatalogConfig {
        CatalogConfig {
            base_url: server.base_url(),
            api_key: Some("cat-key".into()),
            ..Default::default()
        }
    }

    fn sample_search() -> serde_json::Value {
        serde_json::json!({
            "parts": [{
                "partNumber": "BRK-2291",
                "description": "Front brake caliper",
                "price": 129.5,
                "manufacturer": "Bendix"
            }],
            "totalResults": 1,
            "page": 1
        })
    }

    #[tokio::test]
    async fn test_search_sends_params_and_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search/parts")
                    .header("authorization", "Bearer cat-key")
                    .query_param("make", "freightliner")
                    .query_param("category", "caliper")
                    .query_param("page", "1")
                    .query_param("limit", "5");
                then.status(200).json_body(sample_search());
            })
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let params = SearchParams {
            make: Some("freightliner".into()),
            part_type: Some("caliper".into()),
            limit: Some(5),
            ..Default::default()
        };
        let result = client.search_parts(&params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.total_results, 1);
        assert_eq!(result.parts[0].part_number, "BRK-2291");
    }

    async fn search_with(config: &CatalogConfig) {
        let client = CatalogClient::new(config).unwrap();
        client.search_parts(&SearchParams::keyword("brake")).await.unwrap();
    }

    #[tokio::test]
    async fn test_basic_auth_splits_user_and_password() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search/parts")
                    .header("authorization", "Basic cGFydHM6czNjcmV0");
                then.status(200).json_body(sample_search());
            })
            .await;

        let mut config = config_for(&server);
        config.auth_method = AuthMethod::Basic;
        config.api_key = Some("parts:s3cret".into());
        search_with(&config).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_basic_auth_key_without_password() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search/parts")
                    .header("authorization", "Basic Y2F0LWtleTo=");
                then.status(200).json_body(sample_search());
            })
            .await;

        let mut config = config_for(&server);
        config.auth_method = AuthMethod::Basic;
        search_with(&config).await;
        mock.assert_async().await;
    }

    fn no_credentials(req: &HttpMockRequest) -> bool {
        !req.headers.iter().flatten().any(|(name, _)| {
            name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("x-api-key")
        })
    }

    #[tokio::test]
    async fn test_auth_none_sends_no_credentials() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search/parts").matches(no_credentials);
                then.status(200).json_body(sample_search());
            })
            .await;

        let mut config = config_for(&server);
        config.auth_method = AuthMethod::None;
        assert!(config.has_api_key());
        search_with(&config).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_key_header_and_v1_preset() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/parts/search")
                    .header("x-api-key", "cat-key");
                then.status(200).json_body(sample_search());
            })
            .await;

        let mut config = config_for(&server);
        config.auth_method = AuthMethod::ApiKey;
        config.endpoints = EndpointsConfig {
            preset: EndpointPreset::V1,
            ..Default::default()
        };
        let client = CatalogClient::new(&config).unwrap();
        client.search_parts(&SearchParams::keyword("brake")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/parts");
                then.status(200).json_body(serde_json::json!({"items": []}));
            })
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let err = client.search_parts(&SearchParams::default()).await.unwrap_err();
        assert!(matches!(err, PartsbotError::CatalogSchema(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/parts");
                then.status(429);
            })
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let err = client.search_parts(&SearchParams::default()).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again later.");
    }

    #[tokio::test]
    async fn test_part_details_found_and_missing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/parts/BRK-2291");
                then.status(200).json_body(serde_json::json!({
                    "partNumber": "BRK-2291",
                    "description": "Front brake caliper",
                    "category": "brakes"
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/parts/NOPE");
                then.status(404);
            })
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let part = client.get_part_details("BRK-2291").await.unwrap().unwrap();
        assert_eq!(part.category.as_deref(), Some("brakes"));
        assert!(client.get_part_details("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_part_details_auth_failure_propagates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/parts/X");
                then.status(401);
            })
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let err = client.get_part_details("X").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_unreachable_catalog() {
        let config = CatalogConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = CatalogClient::new(&config).unwrap();
        assert!(!client.has_api_key());
        let err = client.search_parts(&SearchParams::default()).await.unwrap_err();
        assert_eq!(err.status(), None);
        assert!(matches!(err, PartsbotError::Catalog { .. }));
    }
}
