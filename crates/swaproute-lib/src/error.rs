use std::path::PathBuf;

use thiserror::Error;

use crate::graph::Edge;
use crate::token::TokenId;

/// Convenient result alias for the swaproute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot construction rejected the refresh input.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The market data provider could not deliver usable token data.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Raised when a token id is absent from a populated snapshot.
    #[error("unknown token: {id}{}", format_suggestions(.suggestions))]
    UnknownToken {
        id: TokenId,
        suggestions: Vec<String>,
    },

    /// Raised when the store has not published any tokens yet.
    #[error("token graph is not ready (snapshot version {version} has no tokens)")]
    GraphNotReady { version: u64 },

    /// Raised when no route connects two known tokens.
    #[error("no route found between {from} and {to}")]
    RouteNotFound { from: TokenId, to: TokenId },

    /// Raised when an edge file could not be parsed.
    #[error("failed to parse edge file {path}: {message}")]
    EdgeFile { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating refresh input into a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// An edge references a token missing from the supplied token set.
    #[error("edge {edge} references a token that is not part of the refresh ({missing})")]
    DanglingEdge { edge: Edge, missing: TokenId },

    /// An edge weight is negative, NaN, or infinite.
    #[error("edge {edge} has invalid weight {}", .edge.weight)]
    InvalidWeight { edge: Edge },
}

/// Errors raised by market data providers.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with a non-success HTTP status.
    #[error("market data request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The provider answered, but the payload was not usable.
    #[error("malformed market data payload: {message}")]
    MalformedPayload { message: String },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Raised when a local market data file could not be read.
    #[error("failed to read market data from {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FetchError::MalformedPayload {
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
