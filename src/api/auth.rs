//! HTTP basic-auth gate for the protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::state::AppState;

pub const REALM_CHALLENGE: &str = "Basic realm=\"Consulta Pedidos\"";

/// The user that passed the gate. Inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some((user, password)) = basic_credentials(request.headers()) else {
        debug!("Rejected {} without usable basic credentials", request.uri().path());
        return unauthorized("Authentication required");
    };

    if !state.config.credentials.verify(&user, &password) {
        warn!("Invalid credentials for user {:?} on {}", user, request.uri().path());
        return unauthorized("Invalid username or password");
    }

    request.extensions_mut().insert(AuthenticatedUser(user));
    next.run(request).await
}

/// Decode `Authorization: Basic <base64(user:password)>`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM_CHALLENGE))],
        message,
    )
        .into_response()
}
