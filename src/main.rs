// Initialize logging
// Load configuration
// Create store client, clock and cache
// Create shared state
// Start HTTP server with graceful shutdown

use order_data_service::{
    api, cache,
    clock::{Clock, SystemClock},
    config::Config,
    service::OrderLookupService,
    state::AppState,
    upstream::{StoreClient, UpstreamApi},
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order-data-service");

    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);
    if config.credentials.is_empty() {
        error!("No USUARIO_n/SENHA_n pairs configured; every protected request will be rejected");
    }

    let upstream: Arc<dyn UpstreamApi> = Arc::new(StoreClient::new(&config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = cache::init_cache(&config, clock.clone());
    info!(
        "Cache initialized with TTL: {:?} and capacity: {}",
        config.cache_ttl, config.cache_max_capacity
    );

    let lookup = OrderLookupService::new(&config, upstream, cache, clock);
    let app_state = Arc::new(AppState::new(config.clone(), lookup));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
