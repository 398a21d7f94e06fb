//! Test utilities for microservice handler testing.
//!
//! This module provides fixtures and helpers for testing HTTP handlers
//! against an in-memory market data provider and the built-in seed edges.
//! Every call builds a fresh state, since refreshes mutate the store.

use std::path::PathBuf;

use swaproute_lib::{
    default_token_ids, MarketToken, SeedEdges, StaticEdges, StaticProvider, TokenId,
};

use crate::middleware::RequestId;
use crate::state::{AppState, SourceConfig};

/// Path to the shared fixture directory.
pub const TEST_FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

/// Known token ids in the fixtures for use in tests.
pub mod fixture_tokens {
    /// Source of both seed edges.
    pub const BITCOIN: &str = "bitcoin";

    /// Middle hop of the seed route.
    pub const ETHEREUM: &str = "ethereum";

    /// Reachable from bitcoin via ethereum.
    pub const LITECOIN: &str = "litecoin";

    /// Quoted by the provider but untracked by default and without pools.
    pub const DOGECOIN: &str = "dogecoin";
}

/// Quotes returned by the in-memory provider.
pub fn fixture_quotes() -> Vec<MarketToken> {
    [
        ("bitcoin", "btc", "Bitcoin", 67250.0),
        ("ethereum", "eth", "Ethereum", 3480.5),
        ("litecoin", "ltc", "Litecoin", 81.2),
        ("dogecoin", "doge", "Dogecoin", 0.121),
    ]
    .into_iter()
    .map(|(id, symbol, name, price)| MarketToken {
        id: TokenId::from(id),
        name: name.to_string(),
        symbol: symbol.to_string(),
        current_price: Some(price),
        market_cap: None,
        total_volume: None,
        last_updated: None,
    })
    .collect()
}

/// A state whose graph has not been refreshed yet (version 0).
pub fn fixture_state() -> AppState {
    AppState::from_components(
        Box::new(StaticProvider::new(fixture_quotes())),
        Box::new(SeedEdges),
        default_token_ids(),
    )
}

/// A state that has published the seed graph as version 1.
///
/// # Panics
///
/// Panics if the in-memory refresh fails. This indicates a fixture issue.
pub fn ready_state() -> AppState {
    let state = fixture_state();
    state
        .refresher()
        .refresh_now()
        .unwrap_or_else(|e| panic!("failed to refresh fixture state: {}", e));
    state
}

/// A state whose provider returns nothing, so every refresh fails.
pub fn failing_state() -> AppState {
    AppState::from_components(
        Box::new(StaticProvider::new(Vec::new())),
        Box::new(StaticEdges::default()),
        default_token_ids(),
    )
}

/// Source configuration pointing at the JSON fixtures on disk.
pub fn fixture_file_config() -> SourceConfig {
    let dir = PathBuf::from(TEST_FIXTURE_DIR);
    SourceConfig {
        market_file: Some(dir.join("market_tokens.json")),
        edges_file: Some(dir.join("edges.json")),
        ..SourceConfig::default()
    }
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}
