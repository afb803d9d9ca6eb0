use partsbot_core::config::{EndpointPreset, EndpointsConfig};

const PART_NUMBER_PLACEHOLDER: &str = "{partNumber}";

/// Resolved endpoint paths for the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub search: String,
    pub part_details: String,
}

impl Endpoints {
    pub fn preset(preset: EndpointPreset) -> Self {
        let (search, part_details) = match preset {
            EndpointPreset::Legacy => ("/search/parts", "/parts/{partNumber}"),
            EndpointPreset::V1 => ("/api/v1/parts/search", "/api/v1/parts/{partNumber}"),
            EndpointPreset::Restful => ("/parts", "/parts/{partNumber}"),
        };
        Self {
            search: search.to_string(),
            part_details: part_details.to_string(),
        }
    }

    pub fn from_config(config: &EndpointsConfig) -> Self {
        let mut endpoints = Self::preset(config.preset);
        if let Some(search) = &config.search {
            endpoints.search = search.clone();
        }
        if let Some(details) = &config.part_details {
            endpoints.part_details = details.clone();
        }
        endpoints
    }

    /// Detail path for one part. The part number is percent-encoded; a
    /// template without the placeholder gets it appended as a segment.
    pub fn part_details_path(&self, part_number: &str) -> String {
        let encoded = urlencoding::encode(part_number);
        if self.part_details.contains(PART_NUMBER_PLACEHOLDER) {
            self.part_details.replace(PART_NUMBER_PLACEHOLDER, &encoded)
        } else {
            format!("{}/{}", self.part_details.trim_end_matches('/'), encoded)
        }
    }
}
