pub mod address;
pub mod enricher;

pub use enricher::{resolve_access_key, Enricher};
