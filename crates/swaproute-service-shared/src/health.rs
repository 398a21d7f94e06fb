//! Liveness and readiness probes.
//!
//! `/health/live` answers as soon as the process serves HTTP. `/health/ready`
//! answers 200 only once a non-empty graph snapshot has been published, so a
//! service whose first refresh failed stays out of rotation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

const SERVICE: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>`.
    pub status: String,
    pub service: String,
    /// Crate version of the running binary.
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_loaded: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<u64>,

    /// Seconds since the snapshot was published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_age_secs: Option<i64>,
}

impl HealthStatus {
    fn with_status(status: String, service: &str, version: &str) -> Self {
        Self {
            status,
            service: service.to_string(),
            version: version.to_string(),
            tokens_loaded: None,
            snapshot_version: None,
            snapshot_age_secs: None,
        }
    }

    pub fn alive(service: &str, version: &str) -> Self {
        Self::with_status("ok".to_string(), service, version)
    }

    /// Serving snapshot `snapshot_version` with `tokens` tokens.
    pub fn ready(service: &str, version: &str, tokens: usize, snapshot_version: u64) -> Self {
        Self {
            tokens_loaded: Some(tokens),
            snapshot_version: Some(snapshot_version),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self::with_status(format!("not_ready: {reason}"), service, version)
    }

    /// Attach the age of a snapshot published at `created_at`, clamped at zero
    /// to absorb clock skew.
    pub fn with_snapshot_age(mut self, created_at: DateTime<Utc>) -> Self {
        let age = Utc::now().signed_duration_since(created_at).num_seconds();
        self.snapshot_age_secs = Some(age.max(0));
        self
    }
}

/// `GET /health/live`
///
/// ```text
/// {"status":"ok","service":"swaproute-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::alive(SERVICE, VERSION)))
}

/// `GET /health/ready`
///
/// ```text
/// {"status":"ok",...,"tokens_loaded":3,"snapshot_version":12,"snapshot_age_secs":41}
/// ```
///
/// 503 with `not_ready: no tokens loaded` until the first successful refresh.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot();
    if snapshot.is_empty() {
        let body = HealthStatus::not_ready(SERVICE, VERSION, "no tokens loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    let body = HealthStatus::ready(SERVICE, VERSION, snapshot.token_count(), snapshot.version())
        .with_snapshot_age(snapshot.created_at());
    (StatusCode::OK, Json(body)).into_response()
}
