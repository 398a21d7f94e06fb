//! HTTP plumbing shared by the swaproute services.
//!
//! Route finding and graph construction live in `swaproute-lib`. This crate
//! wraps them for axum: [`AppState`] owns the snapshot store and its
//! refresher, handlers validate input with [`Validate`], answer with
//! [`ServiceResponse`] and fail with RFC 9457 [`ProblemDetails`].
//!
//! Cross-cutting pieces:
//!
//! - [`health_live`] and [`health_ready`] probes; readiness reports the snapshot
//!   version and age.
//! - [`logging`] JSON or compact text tracing output.
//! - [`metrics`] Prometheus recorder plus route and refresh counters.
//! - [`middleware`] request ids and per-request HTTP metrics.
//!
//! Handlers load [`swaproute_lib::GraphStore::current`] once per request and
//! work only with that snapshot, so a refresh landing mid-request never mixes
//! two graph versions in one answer.
//!
//! `test_utils` (feature `test-utils`) builds an [`AppState`] over an
//! in-memory fixture graph for handler tests in dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_refresh, record_route_empty, record_route_found,
    record_snapshot, MetricsConfig, MetricsError, RefreshResult,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_DANGLING_EDGE, PROBLEM_GRAPH_NOT_READY,
    PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_EDGE_WEIGHT, PROBLEM_INVALID_REQUEST,
    PROBLEM_REFRESH_FAILED, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_UNKNOWN_TOKEN,
};
pub use request::{RouteRequest, TokenLookup, Validate, MAX_TOKEN_ID_LEN};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError, SourceConfig};
