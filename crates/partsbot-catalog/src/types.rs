use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A catalog part as returned by the search and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub part_number: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub parts: Vec<Part>,
    pub total_results: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// Search filters. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub part_type: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;

impl SearchParams {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query pairs in the catalog's parameter names, skipping unset filters.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let filters = [
            ("make", &self.make),
            ("model", &self.model),
            ("year", &self.year),
            ("category", &self.part_type),
            ("part_number", &self.part_number),
            ("q", &self.keyword),
        ];
        let mut query: Vec<(&'static str, String)> = filters
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k, v.clone())))
            .collect();
        query.push(("page", self.page.unwrap_or(DEFAULT_PAGE).to_string()));
        query.push(("limit", self.limit.unwrap_or(DEFAULT_LIMIT).to_string()));
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_skips_unset_and_applies_defaults() {
        let params = SearchParams {
            make: Some("ford".into()),
            part_type: Some("rotor".into()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("make", "ford".to_string()),
                ("category", "rotor".to_string()),
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_maps_to_q() {
        let query = SearchParams::keyword("brake").with_limit(1).to_query();
        assert!(query.contains(&("q", "brake".to_string())));
        assert!(query.contains(&("limit", "1".to_string())));
    }

    #[test]
    fn test_search_response_requires_core_fields() {
        let ok: SearchResponse = serde_json::from_value(serde_json::json!({
            "parts": [{"partNumber": "BR-1", "description": "Pad", "price": 42.5,
                       "specifications": {"material": "ceramic"}}],
            "totalResults": 1,
            "hasMore": false
        }))
        .unwrap();
        assert_eq!(ok.parts[0].price, Some(42.5));
        assert_eq!(ok.has_more, Some(false));

        let missing_total = serde_json::from_value::<SearchResponse>(serde_json::json!({
            "parts": []
        }));
        assert!(missing_total.is_err());
    }
}
