//! Pulls fresh market data and edges and republishes the graph.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::{info, warn};

use crate::edges::EdgeSource;
use crate::error::{Error, FetchError, Result};
use crate::market::{MarketDataProvider, MarketToken};
use crate::store::GraphStore;
use crate::token::TokenId;

/// Summary of a successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub version: u64,
    pub tokens: usize,
    pub edges: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Market quotes captured by the refresh that published snapshot `version`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBook {
    pub version: u64,
    quotes: HashMap<TokenId, MarketToken>,
}

impl QuoteBook {
    fn new(version: u64, market: Vec<MarketToken>) -> Self {
        Self {
            version,
            quotes: market
                .into_iter()
                .map(|quote| (quote.id.clone(), quote))
                .collect(),
        }
    }

    /// The quote for `id`, only if it was captured alongside snapshot
    /// `version`.
    ///
    /// Snapshot and quotes are published one after the other, so a reader can
    /// observe a book one refresh ahead of or behind its snapshot.
    pub fn quote_at(&self, version: u64, id: &TokenId) -> Option<&MarketToken> {
        if self.version == version {
            self.quotes.get(id)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Drives one provider and one edge source into a [`GraphStore`].
///
/// A refresh either publishes a complete new snapshot or leaves the store and
/// the cached quotes untouched.
pub struct Refresher {
    provider: Box<dyn MarketDataProvider>,
    edges: Box<dyn EdgeSource>,
    token_ids: Vec<TokenId>,
    store: Arc<GraphStore>,
    quotes: ArcSwap<QuoteBook>,
    in_flight: Mutex<()>,
}

impl Refresher {
    pub fn new(
        provider: Box<dyn MarketDataProvider>,
        edges: Box<dyn EdgeSource>,
        token_ids: Vec<TokenId>,
        store: Arc<GraphStore>,
    ) -> Self {
        Self {
            provider,
            edges,
            token_ids,
            store,
            quotes: ArcSwap::from_pointee(QuoteBook::default()),
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn token_ids(&self) -> &[TokenId] {
        &self.token_ids
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Quotes from the last successful refresh.
    pub fn latest_quotes(&self) -> Arc<QuoteBook> {
        self.quotes.load_full()
    }

    /// Fetch tokens and edges and publish them as the next snapshot.
    ///
    /// Blocks on network or disk IO. Concurrent calls run one at a time.
    pub fn refresh_now(&self) -> Result<RefreshOutcome> {
        let _guard = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        let market = self.fetch_market().inspect_err(|error| {
            warn!(provider = self.provider.name(), error = %error, "market data fetch failed");
        })?;
        let edges = self.edges.edges().inspect_err(|error| {
            warn!(error = %error, "edge source failed");
        })?;

        let tokens = market.iter().map(MarketToken::to_token);
        let snapshot = self.store.refresh(tokens, edges)?;

        self.quotes
            .store(Arc::new(QuoteBook::new(snapshot.version(), market)));

        let outcome = RefreshOutcome {
            version: snapshot.version(),
            tokens: snapshot.token_count(),
            edges: snapshot.edge_count(),
            elapsed: started.elapsed(),
        };
        info!(
            provider = self.provider.name(),
            version = outcome.version,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "refresh complete"
        );
        Ok(outcome)
    }

    fn fetch_market(&self) -> Result<Vec<MarketToken>> {
        let market = self.provider.fetch_tokens(&self.token_ids)?;
        if market.is_empty() {
            return Err(Error::Fetch(FetchError::malformed(
                "provider returned no tokens",
            )));
        }

        let missing: Vec<&str> = self
            .token_ids
            .iter()
            .filter(|id| !market.iter().any(|quote| &quote.id == *id))
            .map(TokenId::as_str)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "provider did not return every requested token");
        }
        Ok(market)
    }
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher")
            .field("provider", &self.provider.name())
            .field("token_ids", &self.token_ids)
            .field("version", &self.store.version())
            .finish()
    }
}
