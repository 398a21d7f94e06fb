//! Swaproute library entry points.
//!
//! This crate keeps a versioned, atomically swapped graph of tokens and
//! directed trading edges, finds minimum-weight swap routes across it, and
//! refreshes it from market data providers. Higher-level consumers (CLI,
//! HTTP service) should only depend on the items exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod edges;
pub mod error;
pub mod graph;
pub mod market;
pub mod path;
pub mod refresh;
pub mod routing;
pub mod store;
pub mod token;

pub use edges::{EdgeFile, EdgeSource, SeedEdges, StaticEdges};
pub use error::{BuildError, Error, FetchError, Result};
pub use graph::{Edge, GraphSnapshot};
pub use market::{
    default_token_ids, parse_market_payload, parse_token_ids, CoinGeckoProvider, FileProvider,
    MarketDataProvider, MarketToken, StaticProvider, DEFAULT_API_URL, DEFAULT_VS_CURRENCY,
};
pub use path::{best_route, Route};
pub use refresh::{QuoteBook, RefreshOutcome, Refresher};
pub use routing::{plan_route, RoutePlan, RouteRequest};
pub use store::{fuzzy_token_matches, lookup_token, GraphStore};
pub use token::{Token, TokenId};
