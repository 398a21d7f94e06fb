use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::token::{Token, TokenId};

/// Directed pool edge between two tokens.
///
/// `weight` is the cost of trading across this pool (fee, inverse liquidity
/// score, ...). Weights must be finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: TokenId,
    pub target: TokenId,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: impl Into<TokenId>, target: impl Into<TokenId>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }

    fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight >= 0.0
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.weight)
    }
}

/// Immutable, versioned point-in-time view of the token graph.
///
/// Every edge endpoint is guaranteed to be a token of the same snapshot;
/// [`GraphSnapshot::build`] refuses input that would break this.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    version: u64,
    created_at: DateTime<Utc>,
    tokens: BTreeMap<TokenId, Token>,
    adjacency: HashMap<TokenId, Vec<Edge>>,
    edge_count: usize,
}

impl GraphSnapshot {
    /// The empty version-0 snapshot a store starts with.
    pub fn empty() -> Self {
        Self {
            version: 0,
            created_at: Utc::now(),
            tokens: BTreeMap::new(),
            adjacency: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Validate `tokens` and `edges` and assemble them into a snapshot.
    ///
    /// Later tokens with a duplicate id replace earlier ones, and a later edge
    /// for the same (source, target) pair replaces the earlier weight.
    pub fn build<T, E>(version: u64, tokens: T, edges: E) -> Result<Self, BuildError>
    where
        T: IntoIterator<Item = Token>,
        E: IntoIterator<Item = Edge>,
    {
        let tokens: BTreeMap<TokenId, Token> = tokens
            .into_iter()
            .map(|token| (token.id.clone(), token))
            .collect();

        let mut unique: BTreeMap<(TokenId, TokenId), Edge> = BTreeMap::new();
        for edge in edges {
            if !edge.has_valid_weight() {
                return Err(BuildError::InvalidWeight { edge });
            }
            let missing = [&edge.source, &edge.target]
                .into_iter()
                .find(|endpoint| !tokens.contains_key(*endpoint))
                .cloned();
            if let Some(missing) = missing {
                return Err(BuildError::DanglingEdge { edge, missing });
            }
            unique.insert((edge.source.clone(), edge.target.clone()), edge);
        }

        let edge_count = unique.len();
        let mut adjacency: HashMap<TokenId, Vec<Edge>> = HashMap::new();
        // BTreeMap iteration keeps each neighbour list sorted by target id.
        for ((source, _), edge) in unique {
            adjacency.entry(source).or_default().push(edge);
        }

        Ok(Self {
            version,
            created_at: Utc::now(),
            tokens,
            adjacency,
            edge_count,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// `true` when the snapshot holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tokens.contains_key(id)
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// Tokens in ascending id order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn token_ids(&self) -> Vec<TokenId> {
        self.tokens.keys().cloned().collect()
    }

    /// Outgoing edges of `id`, sorted by target id.
    pub fn neighbours(&self, id: &str) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The edge from `source` to `target`, if the snapshot has one.
    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.neighbours(source)
            .iter()
            .find(|edge| edge.target.as_str() == target)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.adjacency.values().flatten()
    }
}

impl Default for GraphSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
