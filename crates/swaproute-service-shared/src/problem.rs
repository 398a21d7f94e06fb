//! RFC 9457 problem responses.
//!
//! Every non-2xx answer from a swaproute service is a [`ProblemDetails`]
//! body served as `application/problem+json`, with `instance` set to the
//! request id so a client report can be matched to the service logs.
//! See <https://www.rfc-editor.org/rfc/rfc9457.html>.

use std::fmt;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use swaproute_lib::{BuildError, Error as LibError};

pub const PROBLEM_UNKNOWN_TOKEN: &str = "/problems/unknown-token";
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";
/// No snapshot with tokens has been published yet.
pub const PROBLEM_GRAPH_NOT_READY: &str = "/problems/graph-not-ready";
/// The market provider or edge source failed during a refresh.
pub const PROBLEM_REFRESH_FAILED: &str = "/problems/refresh-failed";
/// A refreshed edge named a token outside the refreshed token set.
pub const PROBLEM_DANGLING_EDGE: &str = "/problems/dangling-edge";
pub const PROBLEM_INVALID_EDGE_WEIGHT: &str = "/problems/invalid-edge-weight";

const PROBLEM_JSON: &str = "application/problem+json";

/// Problem body.
///
/// ```
/// use axum::http::StatusCode;
/// use swaproute_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_TOKEN};
///
/// let problem = ProblemDetails::new(PROBLEM_UNKNOWN_TOKEN, "Unknown Token", StatusCode::NOT_FOUND)
///     .with_detail("Token 'bitcon' not found. Did you mean: bitcoin?")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Relative URI naming the problem type.
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    fn occurrence(
        type_uri: &str,
        title: &str,
        status: StatusCode,
        detail: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(type_uri, title, status)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 400 for a request that failed validation.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::occurrence(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
            detail,
            request_id,
        )
    }

    /// 404 for a token id missing from the snapshot, listing close matches.
    pub fn unknown_token(id: &str, suggestions: &[String], request_id: impl Into<String>) -> Self {
        let detail = match suggestions {
            [] => format!("Token '{id}' not found"),
            _ => format!("Token '{id}' not found. Did you mean: {}?", suggestions.join(", ")),
        };
        Self::occurrence(
            PROBLEM_UNKNOWN_TOKEN,
            "Unknown Token",
            StatusCode::NOT_FOUND,
            detail,
            request_id,
        )
    }

    pub fn route_not_found(from: &str, to: &str, request_id: impl Into<String>) -> Self {
        Self::occurrence(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
            format!("No route exists from '{from}' to '{to}'"),
            request_id,
        )
    }

    /// 503 while the store still holds an empty snapshot.
    pub fn graph_not_ready(version: u64, request_id: impl Into<String>) -> Self {
        Self::occurrence(
            PROBLEM_GRAPH_NOT_READY,
            "Graph Not Ready",
            StatusCode::SERVICE_UNAVAILABLE,
            format!("No tokens have been published yet (snapshot version {version})"),
            request_id,
        )
    }

    /// 502 when an upstream data source failed.
    pub fn refresh_failed(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::occurrence(
            PROBLEM_REFRESH_FAILED,
            "Refresh Failed",
            StatusCode::BAD_GATEWAY,
            detail,
            request_id,
        )
    }

    /// 409 when refreshed data was rejected; the previous snapshot stays live.
    pub fn build_rejected(error: &BuildError, request_id: impl Into<String>) -> Self {
        let (type_uri, title) = match error {
            BuildError::DanglingEdge { .. } => (PROBLEM_DANGLING_EDGE, "Dangling Edge"),
            BuildError::InvalidWeight { .. } => (PROBLEM_INVALID_EDGE_WEIGHT, "Invalid Edge Weight"),
        };
        Self::occurrence(type_uri, title, StatusCode::CONFLICT, error.to_string(), request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::occurrence(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
            detail,
            request_id,
        )
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

/// Map a library error onto its problem type, tagged with `request_id`.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownToken { id, suggestions } => {
            ProblemDetails::unknown_token(id.as_str(), suggestions, request_id)
        }
        LibError::RouteNotFound { from, to } => {
            ProblemDetails::route_not_found(from.as_str(), to.as_str(), request_id)
        }
        LibError::GraphNotReady { version } => ProblemDetails::graph_not_ready(*version, request_id),
        LibError::Build(build) => ProblemDetails::build_rejected(build, request_id),
        LibError::Fetch(_) | LibError::EdgeFile { .. } | LibError::Io(_) => {
            ProblemDetails::refresh_failed(error.to_string(), request_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaproute_lib::{Edge, FetchError, TokenId};

    fn detail(problem: &ProblemDetails) -> &str {
        problem.detail.as_deref().unwrap_or_default()
    }

    #[test]
    fn test_bad_request_carries_request_id() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_unknown_token_lists_suggestions() {
        let suggestions = vec!["bitcoin".to_string(), "bitcoin-cash".to_string()];
        let problem = ProblemDetails::unknown_token("bitcon", &suggestions, "req-456");
        assert_eq!(problem.status, 404);
        assert_eq!(
            detail(&problem),
            "Token 'bitcon' not found. Did you mean: bitcoin, bitcoin-cash?"
        );

        let problem = ProblemDetails::unknown_token("xyz", &[], "req-789");
        assert_eq!(detail(&problem), "Token 'xyz' not found");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(ProblemDetails::bad_request("Test error", "req-test")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "/problems/invalid-request",
                "title": "Invalid Request",
                "status": 400,
                "detail": "Test error",
                "instance": "req-test"
            })
        );
    }

    #[test]
    fn test_into_response_uses_problem_json() {
        let response = ProblemDetails::route_not_found("bitcoin", "dogecoin", "req").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
    }

    #[test]
    fn test_display_without_detail() {
        let problem = ProblemDetails::new(PROBLEM_INTERNAL_ERROR, "Internal Error", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(problem.to_string(), "Internal Error");
    }

    #[test]
    fn test_from_lib_error_unknown_token() {
        let error = LibError::UnknownToken {
            id: TokenId::from("bitcon"),
            suggestions: vec!["bitcoin".to_string()],
        };
        let problem = from_lib_error(&error, "req-lib");
        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_TOKEN);
        assert_eq!(problem.instance.as_deref(), Some("req-lib"));
    }

    #[test]
    fn test_from_lib_error_graph_not_ready() {
        let problem = from_lib_error(&LibError::GraphNotReady { version: 0 }, "req-ready");
        assert_eq!(problem.type_uri, PROBLEM_GRAPH_NOT_READY);
        assert_eq!(problem.status, 503);
    }

    #[test]
    fn test_from_lib_error_dangling_edge() {
        let error = LibError::Build(BuildError::DanglingEdge {
            edge: Edge::new("solana", "bitcoin", 0.3),
            missing: TokenId::from("solana"),
        });
        let problem = from_lib_error(&error, "req-build");
        assert_eq!(problem.type_uri, PROBLEM_DANGLING_EDGE);
        assert_eq!(problem.status, 409);
        assert!(detail(&problem).contains("solana"));
    }

    #[test]
    fn test_from_lib_error_fetch_failure() {
        let error = LibError::Fetch(FetchError::Status {
            url: "http://localhost/coins/markets".to_string(),
            status: 429,
        });
        let problem = from_lib_error(&error, "req-fetch");
        assert_eq!(problem.type_uri, PROBLEM_REFRESH_FAILED);
        assert_eq!(problem.status, 502);
        assert!(detail(&problem).contains("429"));
    }
}
