//! Customer-facing summaries of catalog results, with placeholder text for
//! fields the catalog left empty.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::client::CatalogClient;
use crate::types::{Part, SearchParams};

/// `$129.50`, or "Contact for price" when the catalog has none.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "Contact for price".to_string(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartSummary {
    pub part_number: String,
    pub description: String,
    pub price: String,
    pub availability: String,
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<HashMap<String, String>>,
}

impl PartSummary {
    /// Short form used in search listings.
    pub fn listing(part: &Part) -> Self {
        Self {
            part_number: part.part_number.clone(),
            description: part.description.clone(),
            price: format_price(part.price),
            availability: part
                .availability
                .clone()
                .unwrap_or_else(|| "Check availability".into()),
            manufacturer: part.manufacturer.clone().unwrap_or_else(|| "Various".into()),
            category: None,
            specifications: None,
        }
    }

    /// Full form used for a single part.
    pub fn detail(part: &Part) -> Self {
        Self {
            manufacturer: part.manufacturer.clone().unwrap_or_else(|| "Unknown".into()),
            category: Some(part.category.clone().unwrap_or_else(|| "Unknown".into())),
            specifications: Some(part.specifications.clone().unwrap_or_default()),
            ..Self::listing(part)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub success: bool,
    pub message: String,
    pub parts: Vec<PartSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartDetailsOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<PartSummary>,
}

/// Default result count for customer-facing searches.
pub const SUMMARY_LIMIT: u32 = 5;

impl CatalogClient {
    /// Search and summarize. Failures become an unsuccessful outcome.
    pub async fn search_summary(&self, params: &SearchParams) -> SearchOutcome {
        let mut params = params.clone();
        params.limit.get_or_insert(SUMMARY_LIMIT);

        match self.search_parts(&params).await {
            Ok(found) if found.parts.is_empty() => SearchOutcome {
                success: false,
                message: "No parts found. Try different search criteria.".into(),
                parts: Vec::new(),
                total_results: None,
            },
            Ok(found) => SearchOutcome {
                success: true,
                message: format!("Found {} parts", found.parts.len()),
                parts: found.parts.iter().map(PartSummary::listing).collect(),
                total_results: Some(found.total_results),
            },
            Err(e) => {
                warn!(error = %e, "Catalog search failed");
                SearchOutcome {
                    success: false,
                    message: "Error searching for parts. Please try again.".into(),
                    parts: Vec::new(),
                    total_results: None,
                }
            }
        }
    }

    /// Detail lookup and summarize. Failures become an unsuccessful outcome.
    pub async fn part_details_summary(&self, part_number: &str) -> PartDetailsOutcome {
        match self.get_part_details(part_number).await {
            Ok(Some(part)) => PartDetailsOutcome {
                success: true,
                message: None,
                part: Some(PartSummary::detail(&part)),
            },
            Ok(None) => PartDetailsOutcome {
                success: false,
                message: Some(format!("Part number {} not found", part_number)),
                part: None,
            },
            Err(e) => {
                warn!(error = %e, part_number, "Catalog detail lookup failed");
                PartDetailsOutcome {
                    success: false,
                    message: Some("Error getting part details. Please try again.".into()),
                    part: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use partsbot_core::config::CatalogConfig;

    fn bare_part() -> Part {
        Part {
            part_number: "FLT-77".into(),
            description: "Oil filter".into(),
            price: None,
            availability: None,
            category: None,
            manufacturer: None,
            image_url: None,
            specifications: None,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(12.0)), "$12.00");
        assert_eq!(format_price(Some(129.456)), "$129.46");
        assert_eq!(format_price(None), "Contact for price");
    }

    #[test]
    fn test_listing_and_detail_defaults() {
        let listing = PartSummary::listing(&bare_part());
        assert_eq!(listing.availability, "Check availability");
        assert_eq!(listing.manufacturer, "Various");
        assert!(listing.category.is_none());

        let detail = PartSummary::detail(&bare_part());
        assert_eq!(detail.manufacturer, "Unknown");
        assert_eq!(detail.category.as_deref(), Some("Unknown"));
        assert_eq!(detail.specifications, Some(HashMap::new()));
    }

    #[tokio::test]
    async fn test_empty_search_is_unsuccessful() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search/parts").query_param("limit", "5");
                then.status(200)
                    .json_body(serde_json::json!({"parts": [], "totalResults": 0}));
            })
            .await;

        let client = CatalogClient::new(&CatalogConfig {
            base_url: server.base_url(),
            ..Default::default()
        })
        .unwrap();
        let outcome = client.search_summary(&SearchParams::keyword("winch")).await;
        mock.assert_async().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No parts found. Try different search criteria.");
    }

    #[tokio::test]
    async fn test_detail_error_is_unsuccessful() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/parts/ABC");
                then.status(500);
            })
            .await;

        let client = CatalogClient::new(&CatalogConfig {
            base_url: server.base_url(),
            ..Default::default()
        })
        .unwrap();
        let outcome = client.part_details_summary("ABC").await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Error getting part details. Please try again.")
        );
    }
}
