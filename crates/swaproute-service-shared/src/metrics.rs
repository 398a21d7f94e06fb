//! Prometheus metrics for swaproute services.
//!
//! [`init_metrics`] installs the global recorder once at startup and
//! [`metrics_handler`] renders it. The `record_*` helpers are safe to call
//! before (or without) initialisation; they become no-ops.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use swaproute_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//!
//! let config = MetricsConfig::from_env();
//! init_metrics(&config).expect("metrics recorder installed once");
//! let app: Router = Router::new().route(&config.path, get(metrics_handler));
//! ```

use std::time::Duration;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROUTES_FOUND: &str = "swaproute_routes_calculated_total";
pub const ROUTES_EMPTY: &str = "swaproute_routes_empty_total";
pub const ROUTE_HOPS: &str = "swaproute_route_hops";
pub const REFRESH_TOTAL: &str = "swaproute_refresh_total";
pub const REFRESH_DURATION: &str = "swaproute_refresh_duration_seconds";
pub const SNAPSHOT_VERSION: &str = "swaproute_snapshot_version";
pub const SNAPSHOT_TOKENS: &str = "swaproute_snapshot_tokens";
pub const SNAPSHOT_EDGES: &str = "swaproute_snapshot_edges";
pub const HTTP_REQUESTS: &str = "swaproute_http_requests_total";
pub const HTTP_DURATION: &str = "swaproute_http_request_duration_seconds";
pub const HTTP_RESPONSE_SIZE: &str = "swaproute_http_response_size_bytes";

const HOP_BUCKETS: &[f64] = &[1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0];
const REFRESH_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Metrics settings read from `METRICS_ENABLED` and `METRICS_PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route the exposition endpoint is mounted on.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(defaults.enabled);
        let path = std::env::var("METRICS_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
            .unwrap_or(defaults.path);

        Self { enabled, path }
    }
}

/// Errors raised while installing the Prometheus recorder.
#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

/// Install the global Prometheus recorder and describe the swaproute metrics.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(ROUTE_HOPS.to_string()), HOP_BUCKETS)
        .and_then(|b| {
            b.set_buckets_for_metric(Matcher::Full(REFRESH_DURATION.to_string()), REFRESH_BUCKETS)
        })
        .and_then(|b| b.install_recorder())
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    describe();
    Ok(())
}

fn describe() {
    metrics::describe_counter!(ROUTES_FOUND, "Route queries that produced a route");
    metrics::describe_counter!(ROUTES_EMPTY, "Route queries answered with the empty route");
    metrics::describe_histogram!(ROUTE_HOPS, "Trades per returned route");
    metrics::describe_counter!(REFRESH_TOTAL, "Graph refresh attempts by outcome");
    metrics::describe_histogram!(REFRESH_DURATION, "Graph refresh wall-clock time");
    metrics::describe_gauge!(SNAPSHOT_VERSION, "Version of the published graph snapshot");
    metrics::describe_gauge!(SNAPSHOT_TOKENS, "Tokens in the published graph snapshot");
    metrics::describe_gauge!(SNAPSHOT_EDGES, "Edges in the published graph snapshot");
    metrics::describe_counter!(HTTP_REQUESTS, "HTTP requests by method, path and status class");
    metrics::describe_histogram!(HTTP_DURATION, "HTTP request latency");
    metrics::describe_histogram!(HTTP_RESPONSE_SIZE, "HTTP response body size when known");
}

/// Renders Prometheus exposition text.
pub async fn metrics_handler() -> String {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# metrics recorder not installed\n".to_string(),
    }
}

/// Record a route query that produced a route of `hops` trades.
pub fn record_route_found(service: &str, hops: usize) {
    metrics::counter!(ROUTES_FOUND, "service" => service.to_string()).increment(1);
    metrics::histogram!(ROUTE_HOPS).record(hops as f64);
}

/// Record a route query answered with the empty route.
///
/// `reason` is one of `not_ready`, `unknown_token`, `unreachable` or
/// `validation_error`.
pub fn record_route_empty(reason: &'static str, service: &str) {
    metrics::counter!(
        ROUTES_EMPTY,
        "reason" => reason,
        "service" => service.to_string()
    )
    .increment(1);
}

/// How a refresh attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshResult {
    Success,
    /// The provider or edge source could not deliver data.
    FetchError,
    /// Snapshot validation rejected the data.
    BuildError,
}

impl RefreshResult {
    pub fn as_label(self) -> &'static str {
        match self {
            RefreshResult::Success => "success",
            RefreshResult::FetchError => "fetch_error",
            RefreshResult::BuildError => "build_error",
        }
    }
}

pub fn record_refresh(result: RefreshResult, elapsed: Duration) {
    let outcome = result.as_label();
    metrics::counter!(REFRESH_TOTAL, "outcome" => outcome).increment(1);
    metrics::histogram!(REFRESH_DURATION, "outcome" => outcome).record(elapsed.as_secs_f64());
}

/// Publish the shape of the current snapshot as gauges.
pub fn record_snapshot(version: u64, tokens: usize, edges: usize) {
    metrics::gauge!(SNAPSHOT_VERSION).set(version as f64);
    metrics::gauge!(SNAPSHOT_TOKENS).set(tokens as f64);
    metrics::gauge!(SNAPSHOT_EDGES).set(edges as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_disabled_config_is_rejected() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(matches!(init_metrics(&config), Err(MetricsError::Disabled)));
    }

    #[tokio::test]
    async fn test_handler_without_recorder() {
        if PROMETHEUS_HANDLE.get().is_none() {
            assert!(metrics_handler().await.starts_with('#'));
        }
    }

    #[test]
    fn test_helpers_are_noops_without_recorder() {
        record_route_found("route", 2);
        record_route_empty("unknown_token", "route");
        record_refresh(RefreshResult::FetchError, Duration::from_millis(30));
        record_snapshot(4, 3, 2);
    }

    #[test]
    fn test_refresh_result_labels() {
        assert_eq!(RefreshResult::Success.as_label(), "success");
        assert_eq!(RefreshResult::FetchError.as_label(), "fetch_error");
        assert_eq!(RefreshResult::BuildError.as_label(), "build_error");
    }

    #[test]
    fn test_metrics_error_display() {
        assert_eq!(MetricsError::Disabled.to_string(), "metrics are disabled");
        assert!(MetricsError::InstallFailed("port in use".into())
            .to_string()
            .contains("port in use"));
    }
}
