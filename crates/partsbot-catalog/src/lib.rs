pub mod client;
pub mod endpoints;
pub mod errors;
pub mod summary;
pub mod types;

pub use client::CatalogClient;
pub use endpoints::Endpoints;
pub use summary::{PartDetailsOutcome, PartSummary, SearchOutcome};
pub use types::{Part, SearchParams, SearchResponse};
