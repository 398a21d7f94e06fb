//! Route planning facade for callers that want typed failures.
//!
//! [`best_route`](crate::path::best_route) folds unknown tokens and
//! unreachable targets into an empty route. [`plan_route`] runs the same
//! search but reports those outcomes as [`Error`] values so interactive
//! callers (the CLI, token detail lookups) can explain what went wrong.
//!
//! # Example
//!
//! ```ignore
//! use swaproute_lib::{plan_route, GraphStore, RouteRequest};
//!
//! let store = GraphStore::new();
//! // ... store.refresh(tokens, edges)?
//! let plan = plan_route(&store.current(), &RouteRequest::new("bitcoin", "litecoin"))?;
//! println!("Route: {} hops", plan.hop_count());
//! ```

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::GraphSnapshot;
use crate::path::best_route;
use crate::store::lookup_token;
use crate::token::{Token, TokenId};

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
}

impl RouteRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    /// Snapshot version the route was computed against.
    pub version: u64,
    pub from: TokenId,
    pub to: TokenId,
    pub steps: Vec<Token>,
    pub total_weight: f64,
}

impl RoutePlan {
    /// Number of trades in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn token_ids(&self) -> Vec<TokenId> {
        self.steps.iter().map(|token| token.id.clone()).collect()
    }
}

/// Compute the best route for `request` against `snapshot`.
pub fn plan_route(snapshot: &GraphSnapshot, request: &RouteRequest) -> Result<RoutePlan> {
    let from = lookup_token(snapshot, request.from.trim())?;
    let to = lookup_token(snapshot, request.to.trim())?;

    let route = best_route(snapshot, from.id.as_str(), to.id.as_str());
    if route.is_empty() {
        return Err(Error::RouteNotFound {
            from: from.id.clone(),
            to: to.id.clone(),
        });
    }

    let steps = route
        .tokens
        .iter()
        .filter_map(|id| snapshot.token(id.as_str()).cloned())
        .collect();

    tracing::debug!(
        version = snapshot.version(),
        from = %from.id,
        to = %to.id,
        hops = route.hop_count(),
        "planned route"
    );

    Ok(RoutePlan {
        version: snapshot.version(),
        from: from.id.clone(),
        to: to.id.clone(),
        steps,
        total_weight: route.total_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::build(
            4,
            vec![
                Token::new("bitcoin", "Bitcoin", "btc"),
                Token::new("ethereum", "Ethereum", "eth"),
                Token::new("litecoin", "Litecoin", "ltc"),
                Token::new("dogecoin", "Dogecoin", "doge"),
            ],
            vec![
                Edge::new("bitcoin", "ethereum", 0.1),
                Edge::new("ethereum", "litecoin", 0.2),
            ],
        )
        .expect("valid snapshot")
    }

    #[test]
    fn plan_includes_token_details_and_version() {
        let plan = plan_route(&snapshot(), &RouteRequest::new("bitcoin", "litecoin"))
            .expect("route exists");

        assert_eq!(plan.version, 4);
        assert_eq!(plan.hop_count(), 2);
        let symbols: Vec<&str> = plan.steps.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["btc", "eth", "ltc"]);
    }

    #[test]
    fn plan_reports_route_not_found() {
        let error = plan_route(&snapshot(), &RouteRequest::new("bitcoin", "dogecoin"))
            .expect_err("disconnected");
        assert!(matches!(error, Error::RouteNotFound { .. }));
    }

    #[test]
    fn plan_reports_unknown_token() {
        let error = plan_route(&snapshot(), &RouteRequest::new("bitcoin", "litecon"))
            .expect_err("unknown target");
        assert!(error.to_string().contains("Did you mean 'litecoin'?"));
    }

    #[test]
    fn plan_reports_not_ready_on_empty_graph() {
        let error = plan_route(&GraphSnapshot::empty(), &RouteRequest::new("a", "b"))
            .expect_err("empty graph");
        assert!(matches!(error, Error::GraphNotReady { version: 0 }));
    }

    #[test]
    fn plan_trims_request_whitespace() {
        let plan = plan_route(&snapshot(), &RouteRequest::new(" bitcoin ", "ethereum"))
            .expect("route exists");
        assert_eq!(plan.from.as_str(), "bitcoin");
    }
}
