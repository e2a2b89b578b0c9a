//! Manual smoke test against the live store API.
//!
//! Usage: `cargo run --bin test_lookup -- cpf=12345678901` (or `pedido=`, `nf=`, `valor=`).
//! Reads the same environment as the server.

use order_data_service::{
    cache,
    clock::{Clock, SystemClock},
    config::Config,
    service::OrderLookupService,
    upstream::{StoreClient, UpstreamApi},
    validation::{validate_search, SearchParams, SearchQuery},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let mut params = SearchParams::default();
    for arg in std::env::args().skip(1) {
        let Some((name, value)) = arg.split_once('=') else {
            error!("Ignoring argument {:?}, expected name=value", arg);
            continue;
        };
        let value = Some(value.to_string());
        match name {
            "cpf" => params.cpf = value,
            "pedido" => params.pedido = value,
            "nf" => params.nf = value,
            "valor" => params.valor = value,
            other => error!("Unknown search parameter {:?}", other),
        }
    }
    let query = validate_search(&params)?;

    let config = Config::from_env();
    let upstream: Arc<dyn UpstreamApi> = Arc::new(StoreClient::new(&config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let lookup = OrderLookupService::new(
        &config,
        upstream,
        cache::init_cache(&config, clock.clone()),
        clock,
    );

    // First call goes upstream, second one should be served from cache
    for attempt in 1..=2 {
        let started = Instant::now();
        let outcome = lookup.lookup(&query, "smoke-test").await?;
        info!(
            "Attempt {}: {} orders in {:?} (cache hit: {})",
            attempt,
            outcome.orders.len(),
            started.elapsed(),
            outcome.cache_hit
        );
        if attempt == 1 {
            println!("{}", serde_json::to_string_pretty(outcome.orders.as_slice())?);
        }
        if matches!(query, SearchQuery::Orders { .. }) {
            assert_eq!(outcome.cache_hit, attempt == 2, "unexpected cache behaviour");
        }
    }

    info!("✅ Lookup smoke test finished");
    Ok(())
}
