//! Catalog diagnostics used by the operator test panel.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use partsbot_catalog::SearchParams;

use crate::state::AppState;

type JsonReply = (StatusCode, Json<serde_json::Value>);

fn failure(message: &str, error: impl std::fmt::Display) -> JsonReply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": message,
            "error": error.to_string(),
        })),
    )
}

/// Decode a JSON body; a malformed one is reported as the handler's failure.
fn parse_body<T: DeserializeOwned>(body: &[u8], failure_message: &str) -> Result<T, JsonReply> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejecting malformed diagnostics body");
        failure(failure_message, format!("Invalid request body: {}", e))
    })
}

// GET /api/test-connection
pub async fn test_connection(State(state): State<Arc<AppState>>) -> JsonReply {
    let catalog = &state.catalog;
    info!(api_url = %catalog.base_url(), has_api_key = catalog.has_api_key(), "Testing catalog connection");

    let timestamp = chrono::Utc::now().to_rfc3339();
    match catalog
        .search_parts(&SearchParams::keyword("brake").with_limit(1))
        .await
    {
        Ok(sample) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Successfully connected to the parts catalog API",
                "apiUrl": catalog.base_url(),
                "hasApiKey": catalog.has_api_key(),
                "sampleResult": sample,
                "timestamp": timestamp,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Catalog connection test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to connect to the parts catalog API",
                    "apiUrl": catalog.base_url(),
                    "hasApiKey": catalog.has_api_key(),
                    "error": e.to_string(),
                    "timestamp": timestamp,
                })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSearchBody {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub part_type: Option<String>,
}

const TEST_SEARCH_LIMIT: u32 = 5;
const SEARCH_FAILED: &str = "Search test failed";
const PART_DETAILS_FAILED: &str = "Part details test failed";

// POST /api/test-search
pub async fn test_search(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> JsonReply {
    let body: TestSearchBody = match parse_body(&body, SEARCH_FAILED) {
        Ok(b) => b,
        Err(reply) => return reply,
    };
    info!(make = ?body.make, model = ?body.model, year = ?body.year, part_type = ?body.part_type, "Testing catalog search");

    let params = SearchParams {
        make: body.make.clone(),
        model: body.model.clone(),
        year: body.year.clone(),
        part_type: body.part_type.clone(),
        limit: Some(TEST_SEARCH_LIMIT),
        ..Default::default()
    };

    match state.catalog.search_parts(&params).await {
        Ok(results) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Found {} parts", results.parts.len()),
                "data": {
                    "searchParams": {
                        "make": body.make,
                        "model": body.model,
                        "year": body.year,
                        "partType": body.part_type,
                    },
                    "results": results,
                },
            })),
        ),
        Err(e) => {
            error!(error = %e, "Search test failed");
            failure(SEARCH_FAILED, e)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPartDetailsBody {
    #[serde(default)]
    pub part_number: Option<String>,
}

// POST /api/test-part-details
pub async fn test_part_details(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> JsonReply {
    let body: TestPartDetailsBody = match parse_body(&body, PART_DETAILS_FAILED) {
        Ok(b) => b,
        Err(reply) => return reply,
    };
    let Some(part_number) = body.part_number.filter(|p| !p.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "partNumber is required",
            })),
        );
    };
    info!(part_number = %part_number, "Testing part details");

    match state.catalog.get_part_details(&part_number).await {
        Ok(Some(details)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Found details for part {}", part_number),
                "data": {
                    "partNumber": part_number,
                    "details": details,
                },
            })),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({
                "success": false,
                "message": format!("Part number {} not found", part_number),
            })),
        ),
        Err(e) => {
            error!(error = %e, "Part details test failed");
            failure(PART_DETAILS_FAILED, e)
        }
    }
}
