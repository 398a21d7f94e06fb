//! Application state for HTTP microservices.
//!
//! This module provides the shared state structure that axum handlers use to
//! reach the graph store and the refresher that feeds it.

use std::path::PathBuf;
use std::sync::Arc;

use swaproute_lib::{
    default_token_ids, parse_token_ids, CoinGeckoProvider, EdgeFile, EdgeSource, FetchError,
    FileProvider, GraphSnapshot, GraphStore, MarketDataProvider, Refresher, SeedEdges, TokenId,
    DEFAULT_API_URL, DEFAULT_VS_CURRENCY,
};
use thiserror::Error;

/// Error during application state initialization.
#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("failed to create market data provider: {0}")]
    Provider(#[from] FetchError),

    #[error("market data file not found: {0}")]
    MarketFileNotFound(String),

    #[error("edge file not found: {0}")]
    EdgeFileNotFound(String),

    #[error("no token ids configured")]
    NoTokens,
}

/// Where a service pulls its market data and edges from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL of the CoinGecko compatible API.
    pub api_url: String,

    /// Quote currency passed to the provider.
    pub vs_currency: String,

    /// Tracked token ids.
    pub token_ids: Vec<TokenId>,

    /// Read market data from this file instead of the HTTP API.
    pub market_file: Option<PathBuf>,

    /// Read edges from this JSON file instead of the built-in seed set.
    pub edges_file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            token_ids: default_token_ids(),
            market_file: None,
            edges_file: None,
        }
    }
}

impl SourceConfig {
    /// Build a configuration from environment variables.
    ///
    /// - `SWAPROUTE_API_URL`: provider base URL (default: CoinGecko v3)
    /// - `SWAPROUTE_VS_CURRENCY`: quote currency (default: "usd")
    /// - `SWAPROUTE_TOKEN_IDS`: comma-separated token ids
    /// - `SWAPROUTE_MARKET_FILE`: optional market data JSON file
    /// - `SWAPROUTE_EDGES_PATH`: optional edge JSON file
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            api_url: non_empty("SWAPROUTE_API_URL").unwrap_or(defaults.api_url),
            vs_currency: non_empty("SWAPROUTE_VS_CURRENCY").unwrap_or(defaults.vs_currency),
            token_ids: non_empty("SWAPROUTE_TOKEN_IDS")
                .map(|raw| parse_token_ids(&raw))
                .unwrap_or(defaults.token_ids),
            market_file: non_empty("SWAPROUTE_MARKET_FILE").map(PathBuf::from),
            edges_file: non_empty("SWAPROUTE_EDGES_PATH").map(PathBuf::from),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use swaproute_service_shared::{AppState, SourceConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let snapshot = state.snapshot();
///     // ... use snapshot
/// }
///
/// let state = AppState::from_config(&SourceConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/api/v1/tokens", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<GraphStore>,
    refresher: Refresher,
}

impl AppState {
    /// Create application state from a source configuration.
    ///
    /// Nothing is fetched here; the graph stays at the empty version 0 until
    /// the first refresh. Constructing the HTTP provider creates a blocking
    /// client, so async callers should do this on a blocking thread.
    pub fn from_config(config: &SourceConfig) -> Result<Self, AppStateError> {
        if config.token_ids.is_empty() {
            return Err(AppStateError::NoTokens);
        }

        let provider: Box<dyn MarketDataProvider> = match &config.market_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppStateError::MarketFileNotFound(
                        path.display().to_string(),
                    ));
                }
                tracing::info!(path = %path.display(), "using market data file");
                Box::new(FileProvider::new(path))
            }
            None => {
                tracing::info!(url = %config.api_url, "using market data API");
                Box::new(
                    CoinGeckoProvider::new(config.api_url.clone())?
                        .with_vs_currency(config.vs_currency.clone()),
                )
            }
        };

        let edges: Box<dyn EdgeSource> = match &config.edges_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppStateError::EdgeFileNotFound(path.display().to_string()));
                }
                tracing::info!(path = %path.display(), "using edge file");
                Box::new(EdgeFile::new(path))
            }
            None => {
                tracing::info!("using built-in seed edges");
                Box::new(SeedEdges)
            }
        };

        Ok(Self::from_components(provider, edges, config.token_ids.clone()))
    }

    /// Create application state from pre-built components.
    ///
    /// This is useful for testing or when embedding custom providers.
    pub fn from_components(
        provider: Box<dyn MarketDataProvider>,
        edges: Box<dyn EdgeSource>,
        token_ids: Vec<TokenId>,
    ) -> Self {
        let store = Arc::new(GraphStore::new());
        let refresher = Refresher::new(provider, edges, token_ids, Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner { store, refresher }),
        }
    }

    /// Access the graph store.
    pub fn store(&self) -> &GraphStore {
        &self.inner.store
    }

    /// Access the refresher feeding the store.
    pub fn refresher(&self) -> &Refresher {
        &self.inner.refresher
    }

    /// The snapshot current at call time.
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.inner.store.current()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.store.current();
        f.debug_struct("AppState")
            .field("version", &snapshot.version())
            .field("token_count", &snapshot.token_count())
            .field("provider", &self.inner.refresher.provider_name())
            .finish()
    }
}
