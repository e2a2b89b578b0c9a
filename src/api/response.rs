use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const CACHE_STATUS_HEADER: &str = "X-Cache";
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Serialize a result list as a bare JSON array, with the cache status and
/// item count in headers.
pub fn with_cache_status<T: Serialize>(data: &[T], cache_hit: bool) -> Response {
    let json = match serde_json::to_string(data) {
        Ok(json) => json,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(if cache_hit { "HIT" } else { "MISS" }),
    );
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(data.len()));

    (StatusCode::OK, headers, json).into_response()
}
