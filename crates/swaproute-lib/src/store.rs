//! Process-wide holder of the current graph snapshot.
//!
//! Readers load the current `Arc<GraphSnapshot>` through an [`ArcSwap`] and
//! never take a lock. Writers are serialized by a mutex so version numbers are
//! assigned without gaps; a snapshot is fully built before the single atomic
//! store that publishes it.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};

use crate::error::{BuildError, Error, Result};
use crate::graph::{Edge, GraphSnapshot};
use crate::token::{Token, TokenId};

/// Maximum number of "did you mean" suggestions returned for unknown ids.
const MAX_SUGGESTIONS: usize = 3;

/// Minimum Jaro-Winkler similarity for a token id to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Versioned graph store shared between the refresh path and query handlers.
#[derive(Debug)]
pub struct GraphStore {
    current: ArcSwap<GraphSnapshot>,
    writer: Mutex<()>,
}

impl GraphStore {
    /// Create a store holding the empty version-0 snapshot.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(GraphSnapshot::empty()),
            writer: Mutex::new(()),
        }
    }

    /// Validate the input and publish it as the next snapshot version.
    ///
    /// On error the current snapshot is left exactly as it was.
    pub fn refresh<T, E>(
        &self,
        tokens: T,
        edges: E,
    ) -> std::result::Result<Arc<GraphSnapshot>, BuildError>
    where
        T: IntoIterator<Item = Token>,
        E: IntoIterator<Item = Edge>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.current.load().version();

        let snapshot = match GraphSnapshot::build(previous + 1, tokens, edges) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(error) => {
                warn!(
                    version = previous,
                    error = %error,
                    "refresh rejected, keeping current snapshot"
                );
                return Err(error);
            }
        };

        self.current.store(Arc::clone(&snapshot));
        info!(
            version = snapshot.version(),
            tokens = snapshot.token_count(),
            edges = snapshot.edge_count(),
            "published graph snapshot"
        );
        Ok(snapshot)
    }

    /// The snapshot that is current at call time.
    pub fn current(&self) -> Arc<GraphSnapshot> {
        self.current.load_full()
    }

    /// Version of the current snapshot.
    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    /// Token ids of the current snapshot. Callers must treat this as a set.
    pub fn list_tokens(&self) -> Vec<TokenId> {
        self.current.load().token_ids()
    }

    /// Look up a token, telling an empty graph apart from an unknown id.
    pub fn token(&self, id: &str) -> Result<Token> {
        let snapshot = self.current();
        lookup_token(&snapshot, id).cloned()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `id` in `snapshot`, producing `GraphNotReady` for an empty graph
/// and `UnknownToken` with fuzzy suggestions otherwise.
pub fn lookup_token<'a>(snapshot: &'a GraphSnapshot, id: &str) -> Result<&'a Token> {
    if snapshot.is_empty() {
        return Err(Error::GraphNotReady {
            version: snapshot.version(),
        });
    }

    snapshot.token(id).ok_or_else(|| {
        let suggestions = fuzzy_token_matches(snapshot, id, MAX_SUGGESTIONS);
        debug!(id, ?suggestions, "unknown token requested");
        Error::UnknownToken {
            id: TokenId::from(id),
            suggestions,
        }
    })
}

/// Up to `limit` token ids that look like `query`, best match first.
pub fn fuzzy_token_matches(snapshot: &GraphSnapshot, query: &str, limit: usize) -> Vec<String> {
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, &str)> = snapshot
        .tokens()
        .filter_map(|token| {
            let id_score = strsim::jaro_winkler(&query, &token.id.as_str().to_lowercase());
            let symbol_score = strsim::jaro_winkler(&query, &token.symbol.to_lowercase());
            let score = id_score.max(symbol_score);
            (score >= SUGGESTION_THRESHOLD).then_some((score, token.id.as_str()))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, id)| id.to_string())
        .collect()
}
