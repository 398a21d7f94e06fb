//! swaproute best-route HTTP microservice.
//!
//! This service keeps a versioned token graph fresh from a market data
//! provider and answers best-route queries against it.
//!
//! # Endpoints
//!
//! - `GET /api/v1/tokens` - List token ids of the current snapshot
//! - `GET /api/v1/tokens/{id}` - Token detail with latest quote and pools
//! - `POST /api/v1/route` - Compute the best route between two tokens
//! - `POST /api/v1/refresh` - Refresh the graph now
//! - `GET /metrics` - Prometheus metrics endpoint (path set by `METRICS_PATH`)
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `SWAPROUTE_API_URL` - Market data API root (default: CoinGecko v3)
//! - `SWAPROUTE_TOKEN_IDS` - Comma-separated token ids (default: bitcoin,ethereum,litecoin)
//! - `SWAPROUTE_VS_CURRENCY` - Quote currency (default: usd)
//! - `SWAPROUTE_MARKET_FILE` - Read market data from a JSON file instead of the API
//! - `SWAPROUTE_EDGES_PATH` - JSON edge file (default: built-in seed edges)
//! - `SWAPROUTE_REFRESH_INTERVAL_SECS` - Seconds between refreshes (default: 300)
//! - `METRICS_ENABLED` - Install the Prometheus recorder (default: true)
//! - `METRICS_PATH` - Metrics endpoint path (default: /metrics)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, info, warn};

use swaproute_service_route::{
    SERVICE_NAME, router_with_metrics_path,
    scheduler::{DEFAULT_REFRESH_INTERVAL, spawn_refresh_loop},
};
use swaproute_service_shared::{
    AppState, LoggingConfig, MetricsConfig, SourceConfig, init_logging, init_metrics,
};

const DEFAULT_PORT: u16 = 8080;

/// Process-level settings that are not part of the graph sources.
struct ServiceConfig {
    port: u16,
    refresh_interval: Duration,
}

impl ServiceConfig {
    fn from_env() -> Self {
        let port = env::var("SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let refresh_interval = env::var("SWAPROUTE_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        Self {
            port,
            refresh_interval,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env().with_service(SERVICE_NAME))?;

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "serving without a metrics recorder");
    }

    let source = SourceConfig::from_env();
    let service = ServiceConfig::from_env();
    info!(
        api_url = %source.api_url,
        tokens = source.token_ids.len(),
        refresh_interval_secs = service.refresh_interval.as_secs(),
        port = service.port,
        "starting route service"
    );

    // reqwest's blocking client must not be built on a runtime worker.
    let state = tokio::task::spawn_blocking(move || AppState::from_config(&source))
        .await?
        .inspect_err(|e| error!(error = %e, "failed to create application state"))?;

    let refresh_task = spawn_refresh_loop(state.clone(), service.refresh_interval);
    let app = router_with_metrics_path(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], service.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    let served = axum::serve(listener, app).await;
    refresh_task.abort();
    Ok(served?)
}
