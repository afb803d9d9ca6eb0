use std::sync::Arc;

use futures::future::BoxFuture;
use rand::Rng;
use tracing::info;

use partsbot_catalog::summary::format_price;
use partsbot_catalog::{CatalogClient, SearchParams};
use partsbot_core::config::{AppConfig, FinderKind};
use partsbot_core::error::Result;
use partsbot_core::types::{SearchResult, TruckInfo};

const DEFAULT_STOREFRONT: &str = "https://www.intellaparts.com";
const PART_NUMBER_PREFIX: &str = "IP";

/// The graph's search stage.
pub trait PartFinder: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Find parts for a fully described truck.
    fn find<'a>(&'a self, info: &'a TruckInfo) -> BoxFuture<'a, Result<Vec<SearchResult>>>;
}

/// Synthetic results with random part numbers and prices.
pub struct MockFinder {
    storefront: String,
}

impl MockFinder {
    pub fn new(storefront: impl Into<String>) -> Self {
        Self {
            storefront: storefront.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for MockFinder {
    fn default() -> Self {
        Self::new(DEFAULT_STOREFRONT)
    }
}

/// Two synthetic results: a standard and a premium option.
pub fn mock_results<R: Rng>(info: &TruckInfo, storefront: &str, rng: &mut R) -> Vec<SearchResult> {
    let make = info.make.as_deref().unwrap_or_default();
    let model = info.model.as_deref().unwrap_or_default();
    let year = info.year.as_deref().unwrap_or_default();
    let part = info.part_type.as_deref().unwrap_or_default();

    let make_code: String = make.chars().take(3).collect::<String>().to_uppercase();
    let year_code: String = year.chars().skip(2).collect();
    let part_number = |rng: &mut R| {
        format!(
            "{}-{}-{}-{}",
            PART_NUMBER_PREFIX,
            make_code,
            year_code,
            rng.gen_range(0..10_000)
        )
    };

    vec![
        SearchResult {
            part_number: part_number(&mut *rng),
            description: format!("{} for {} {} {}", part, year, make, model),
            price: Some(format!("${}.99", rng.gen_range(0..500) + 50)),
            url: Some(
                format!("{}/product/{}-{}-{}", storefront, make, model, part).to_lowercase(),
            ),
        },
        SearchResult {
            part_number: part_number(&mut *rng),
            description: format!("Premium {} for {} {} {}", part, year, make, model),
            price: Some(format!("${}.99", rng.gen_range(0..700) + 100)),
            url: Some(
                format!("{}/product/premium-{}-{}-{}", storefront, make, model, part)
                    .to_lowercase(),
            ),
        },
    ]
}

impl PartFinder for MockFinder {
    fn name(&self) -> &str {
        "mock"
    }

    fn find<'a>(&'a self, info: &'a TruckInfo) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        let results = mock_results(info, &self.storefront, &mut rand::thread_rng());
        Box::pin(async move { Ok(results) })
    }
}

/// Real lookups against the parts catalog.
pub struct CatalogFinder {
    client: Arc<CatalogClient>,
    storefront: String,
    limit: u32,
}

impl CatalogFinder {
    pub fn new(client: Arc<CatalogClient>, storefront: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            storefront: storefront.into().trim_end_matches('/').to_string(),
            limit,
        }
    }
}

impl PartFinder for CatalogFinder {
    fn name(&self) -> &str {
        "catalog"
    }

    fn find<'a>(&'a self, info: &'a TruckInfo) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        Box::pin(async move {
            let params = SearchParams {
                make: info.make.clone(),
                model: info.model.clone(),
                year: info.year.clone(),
                part_type: info.part_type.clone(),
                limit: Some(self.limit),
                ..Default::default()
            };
            let found = self.client.search_parts(&params).await?;
            Ok(found
                .parts
                .into_iter()
                .map(|p| SearchResult {
                    url: Some(format!(
                        "{}/product/{}",
                        self.storefront,
                        urlencoding::encode(&p.part_number.to_lowercase())
                    )),
                    price: Some(format_price(p.price)),
                    part_number: p.part_number,
                    description: p.description,
                })
                .collect())
        })
    }
}

/// Pick the finder named in the config. The catalog finder needs a client.
pub fn build_finder(config: &AppConfig, catalog: Option<Arc<CatalogClient>>) -> Arc<dyn PartFinder> {
    let storefront = config.catalog.storefront_url.clone();
    match (config.assistant.finder, catalog) {
        (FinderKind::Catalog, Some(client)) => {
            info!(limit = config.assistant.result_limit, "Conversation graph searches the catalog");
            Arc::new(CatalogFinder::new(client, storefront, config.assistant.result_limit))
        }
        (FinderKind::Catalog, None) => {
            tracing::warn!("Catalog finder requested without a catalog client, using synthetic results");
            Arc::new(MockFinder::new(storefront))
        }
        (FinderKind::Mock, _) => Arc::new(MockFinder::new(storefront)),
    }
}
