// Handlers for the CLI subcommands.
//
// Each subcommand builds a fresh graph store from `SourceArgs`, runs one
// refresh, and answers from the snapshot it published. Nothing persists
// between invocations.

pub mod refresh;
pub mod route;
pub mod tokens;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use swaproute_lib::{
    default_token_ids, parse_token_ids, CoinGeckoProvider, EdgeFile, EdgeSource, FileProvider,
    GraphStore, MarketDataProvider, RefreshOutcome, Refresher, SeedEdges, TokenId, DEFAULT_API_URL,
    DEFAULT_VS_CURRENCY,
};

/// Where market data and edges come from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Market data API root.
    #[arg(long, global = true, env = "SWAPROUTE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Comma-separated token ids to track (default: bitcoin,ethereum,litecoin).
    #[arg(long, global = true, env = "SWAPROUTE_TOKEN_IDS")]
    pub ids: Option<String>,

    /// Quote currency for prices.
    #[arg(long, global = true, env = "SWAPROUTE_VS_CURRENCY", default_value = DEFAULT_VS_CURRENCY)]
    pub vs_currency: String,

    /// Read market data from a JSON file instead of the API.
    #[arg(long, global = true, env = "SWAPROUTE_MARKET_FILE")]
    pub market_file: Option<PathBuf>,

    /// JSON edge file (default: built-in seed edges).
    #[arg(long, global = true, env = "SWAPROUTE_EDGES_PATH")]
    pub edges_file: Option<PathBuf>,
}

impl SourceArgs {
    /// Token ids to request from the provider.
    pub fn token_ids(&self) -> Vec<TokenId> {
        match &self.ids {
            Some(raw) => parse_token_ids(raw),
            None => default_token_ids(),
        }
    }

    /// Build a refresher feeding a new, empty store.
    pub fn build_refresher(&self) -> Result<Refresher> {
        let token_ids = self.token_ids();
        if token_ids.is_empty() {
            bail!("no token ids given; pass --ids with at least one id");
        }

        let provider: Box<dyn MarketDataProvider> = match &self.market_file {
            Some(path) => {
                if !path.exists() {
                    bail!("market data file {} does not exist", path.display());
                }
                Box::new(FileProvider::new(path))
            }
            None => Box::new(
                CoinGeckoProvider::new(self.api_url.clone())
                    .context("failed to create market data client")?
                    .with_vs_currency(self.vs_currency.clone()),
            ),
        };

        let edges: Box<dyn EdgeSource> = match &self.edges_file {
            Some(path) => {
                if !path.exists() {
                    bail!("edge file {} does not exist", path.display());
                }
                Box::new(EdgeFile::new(path))
            }
            None => Box::new(SeedEdges),
        };

        Ok(Refresher::new(
            provider,
            edges,
            token_ids,
            Arc::new(GraphStore::new()),
        ))
    }

    /// Build a refresher and publish the first snapshot.
    pub fn load(&self) -> Result<(Refresher, RefreshOutcome)> {
        let refresher = self.build_refresher()?;
        let outcome = refresher.refresh_now().with_context(|| {
            format!(
                "failed to build the token graph from {}",
                refresher.provider_name()
            )
        })?;
        tracing::debug!(
            version = outcome.version,
            tokens = outcome.tokens,
            edges = outcome.edges,
            "token graph loaded"
        );
        Ok((refresher, outcome))
    }
}
