pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod enrichment;
pub mod fiscal;
pub mod models;
pub mod service;
pub mod state;
pub mod upstream;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::route::create_router;
pub use fiscal::{parse_access_key, FiscalKeyInfo};
pub use models::EnrichedOrder;
pub use service::{LookupOutcome, OrderLookupService};
pub use upstream::{ClientError, StoreClient, UpstreamApi};
pub use validation::{validate_search, SearchParams, SearchQuery};
