pub mod auth;
pub mod error;
pub mod route;
pub mod response;

pub use error::ApiError;
pub use route::create_router;
pub use response::with_cache_status;
