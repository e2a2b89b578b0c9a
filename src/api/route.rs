use crate::{
    api::{
        auth::{require_basic_auth, AuthenticatedUser},
        error::ApiError,
        response::with_cache_status,
    },
    state::AppState,
    validation::{validate_search, SearchParams},
};
use axum::{
    extract::{Query, State},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>Consulta Pedidos</title></head>
<body>
  <h1>Consulta Pedidos</h1>
  <p>Use <code>GET /api/pedidos?cpf=...</code>, <code>?pedido=...</code> or <code>?nf=...</code>.</p>
  <p>See <a href="/login-info">/login-info</a> for access details.</p>
</body>
</html>"#;

const LOGIN_INFO: &str = "This service uses HTTP basic authentication. \
Send an Authorization header with the username and password you were given \
(the browser will prompt for them on /api/pedidos). Contact the administrator \
to get access.";

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/pedidos", get(get_orders))
        .route("/api/cache", delete(clear_cache))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_basic_auth,
        ));

    Router::new()
        .route("/", get(index))
        .route("/status", get(status))
        .route("/login-info", get(login_info))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn login_info() -> &'static str {
    LOGIN_INFO
}

// GET /status handler
async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "cache_entries": state.cache.len(),
        "cache_ttl_secs": state.cache.ttl().as_secs(),
        "upstream_token_configured": !state.config.upstream_token.is_empty(),
        "users_configured": state.config.credentials.len(),
    }))
}

// GET /api/pedidos handler
async fn get_orders(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = validate_search(&params)?;
    info!("Processing order search {:?} for user {}", query, user);

    let outcome = state.lookup.lookup(&query, &user).await.map_err(|e| {
        error!("Order search {:?} failed: {}", query, e);
        ApiError::from(e)
    })?;

    info!(
        "Returning {} orders (cache {})",
        outcome.orders.len(),
        if outcome.cache_hit { "hit" } else { "miss" }
    );
    Ok(with_cache_status(outcome.orders.as_slice(), outcome.cache_hit))
}

// DELETE /api/cache handler
async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    info!("Cache clear requested by {}", user);
    let size = state.cache.clear().await;
    Json(json!({ "cleared": true, "size": size }))
}
