//! Router and handlers for the swaproute HTTP microservice.
//!
//! Handlers are thin: each one loads the snapshot current at request time and
//! answers entirely from it, so a refresh that lands mid-request never mixes
//! two graph versions into one response.

pub mod scheduler;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use swaproute_lib::{Edge, GraphSnapshot, RefreshOutcome, best_route, lookup_token};
use swaproute_service_shared::{
    AppState, MetricsLayer, ProblemDetails, RequestId, RouteRequest, ServiceResponse, TokenLookup,
    Validate, from_lib_error, health_live, health_ready, metrics_handler, record_route_empty,
    record_route_found,
};

/// Service label used in logs and metrics.
pub const SERVICE_NAME: &str = "route";

/// Token listing returned by `GET /api/v1/tokens`.
#[derive(Debug, Serialize)]
pub struct TokenList {
    /// Token ids in ascending order.
    pub tokens: Vec<String>,
}

/// Outgoing pool from a token.
#[derive(Debug, Serialize)]
pub struct PoolView {
    pub target: String,
    pub weight: f64,
}

impl From<&Edge> for PoolView {
    fn from(edge: &Edge) -> Self {
        Self {
            target: edge.target.to_string(),
            weight: edge.weight,
        }
    }
}

/// Token detail returned by `GET /api/v1/tokens/{id}`.
#[derive(Debug, Serialize)]
pub struct TokenDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Latest quoted price, if the last successful refresh carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub pools: Vec<PoolView>,
}

/// Route response returned by `POST /api/v1/route`.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Ordered token ids, source to target. Empty when no route exists.
    pub route: Vec<String>,
    /// Number of trades in the route.
    pub hops: usize,
    pub total_weight: f64,
    pub found: bool,
}

/// Handler result: a versioned payload or a problem document.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

/// Build the service router around `state`, exposing metrics on `/metrics`.
pub fn router(state: AppState) -> Router {
    router_with_metrics_path(state, "/metrics")
}

/// Build the service router with the Prometheus endpoint at `metrics_path`.
pub fn router_with_metrics_path(state: AppState, metrics_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/tokens", get(list_tokens_handler))
        .route("/api/v1/tokens/{id}", get(token_handler))
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/refresh", post(refresh_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(cors)
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle GET /api/v1/tokens requests.
async fn list_tokens_handler(State(state): State<AppState>) -> Response<TokenList> {
    let snapshot = state.snapshot();
    let tokens = snapshot
        .token_ids()
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    Response::Success(ServiceResponse::at_version(
        TokenList { tokens },
        snapshot.version(),
    ))
}

/// Handle GET /api/v1/tokens/{id} requests.
async fn token_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(lookup): Path<TokenLookup>,
) -> Response<TokenDetail> {
    if let Err(problem) = lookup.validate(request_id.as_str()) {
        return Response::Error(*problem);
    }

    let snapshot = state.snapshot();
    let token = match lookup_token(&snapshot, lookup.id.trim()) {
        Ok(token) => token,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "token lookup failed");
            return Response::Error(from_lib_error(&e, request_id.as_str()));
        }
    };

    // Prices from a different refresh than `snapshot` are left out.
    let quotes = state.refresher().latest_quotes();
    let quote = quotes.quote_at(snapshot.version(), &token.id);

    let detail = TokenDetail {
        id: token.id.to_string(),
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        current_price: quote.and_then(|q| q.current_price),
        market_cap: quote.and_then(|q| q.market_cap),
        last_updated: quote.and_then(|q| q.last_updated.clone()),
        pools: snapshot
            .neighbours(token.id.as_str())
            .iter()
            .map(PoolView::from)
            .collect(),
    };

    Response::Success(ServiceResponse::at_version(detail, snapshot.version()))
}

/// Handle POST /api/v1/route requests.
///
/// Unknown and unreachable tokens are not errors here: they produce an empty
/// route with `found: false`.
async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<RouteRequest>,
) -> Response<RouteResponse> {
    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        "handling route request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_route_empty("validation_error", SERVICE_NAME);
        return Response::Error(*problem);
    }

    let lib_request = request.to_lib();
    let snapshot = state.snapshot();
    let route = best_route(&snapshot, &lib_request.from, &lib_request.to);

    if route.is_empty() {
        let reason = empty_route_reason(&snapshot, &lib_request.from, &lib_request.to);
        record_route_empty(reason, SERVICE_NAME);
        info!(
            request_id = %request_id,
            version = snapshot.version(),
            reason,
            "no route found"
        );
    } else {
        record_route_found(SERVICE_NAME, route.hop_count());
        info!(
            request_id = %request_id,
            version = snapshot.version(),
            hops = route.hop_count(),
            total_weight = route.total_weight,
            "route computed successfully"
        );
    }

    let response = RouteResponse {
        hops: route.hop_count(),
        total_weight: route.total_weight,
        found: !route.is_empty(),
        route: route.tokens.iter().map(|id| id.to_string()).collect(),
    };

    Response::Success(ServiceResponse::at_version(response, snapshot.version()))
}

/// Handle POST /api/v1/refresh requests.
async fn refresh_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Response<RefreshOutcome> {
    info!(request_id = %request_id, "manual refresh requested");

    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || scheduler::refresh_once(&task_state)).await;

    match result {
        // The outcome already carries the published version.
        Ok(Ok(outcome)) => Response::Success(ServiceResponse::new(outcome)),
        Ok(Err(e)) => Response::Error(from_lib_error(&e, request_id.as_str())),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "refresh task failed");
            Response::Error(ProblemDetails::internal_error(
                "refresh task failed",
                request_id.as_str(),
            ))
        }
    }
}

fn empty_route_reason(snapshot: &GraphSnapshot, from: &str, to: &str) -> &'static str {
    if snapshot.is_empty() {
        "not_ready"
    } else if !snapshot.contains(from) || !snapshot.contains(to) {
        "unknown_token"
    } else {
        "unreachable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaproute_lib::{Token, TokenId};

    #[test]
    fn test_empty_route_reason() {
        assert_eq!(
            empty_route_reason(&GraphSnapshot::empty(), "a", "b"),
            "not_ready"
        );

        let snapshot = GraphSnapshot::build(
            1,
            vec![Token::new("a", "A", "A"), Token::new("b", "B", "B")],
            vec![Edge::new("b", "a", 1.0)],
        )
        .expect("valid snapshot");
        assert_eq!(empty_route_reason(&snapshot, "a", "zz"), "unknown_token");
        assert_eq!(empty_route_reason(&snapshot, "a", "b"), "unreachable");
    }

    #[test]
    fn test_pool_view_from_edge() {
        let edge = Edge::new(TokenId::from("bitcoin"), TokenId::from("ethereum"), 0.1);
        let view = PoolView::from(&edge);
        assert_eq!(view.target, "ethereum");
        assert_eq!(view.weight, 0.1);
    }
}
