//! Market data providers.
//!
//! The refresh path only needs token metadata (id, name, symbol) from a
//! provider; pricing fields are carried along for transport use. Providers are
//! blocking: callers running inside an async runtime should move the fetch
//! onto a blocking thread.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::token::{Token, TokenId};

/// Public CoinGecko v3 API root.
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Quote currency requested when none is configured.
pub const DEFAULT_VS_CURRENCY: &str = "usd";

/// Token ids tracked when none are configured.
pub const DEFAULT_TOKEN_IDS: &[&str] = &["bitcoin", "ethereum", "litecoin"];

/// Token metadata and pricing as reported by a market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketToken {
    pub id: TokenId,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl MarketToken {
    pub fn to_token(&self) -> Token {
        Token {
            id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
        }
    }
}

/// Source of current token metadata and pricing.
pub trait MarketDataProvider: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &str;

    /// Fetch the requested tokens. Ids the provider does not know are simply
    /// absent from the result.
    fn fetch_tokens(&self, ids: &[TokenId]) -> Result<Vec<MarketToken>, FetchError>;
}

/// Parse a `/coins/markets` style JSON array.
///
/// Entries need a non-empty id; entries for ids that were not requested are
/// dropped, and a repeated id keeps its last entry. Output is sorted by id.
pub fn parse_market_payload(
    payload: &str,
    requested: &[TokenId],
) -> Result<Vec<MarketToken>, FetchError> {
    let entries: Vec<MarketToken> = serde_json::from_str(payload)
        .map_err(|e| FetchError::malformed(format!("invalid token list: {e}")))?;

    let mut by_id: BTreeMap<TokenId, MarketToken> = BTreeMap::new();
    for entry in entries {
        if entry.id.as_str().trim().is_empty() {
            return Err(FetchError::malformed("token entry with empty id"));
        }
        if !requested.is_empty() && !requested.contains(&entry.id) {
            debug!(id = %entry.id, "ignoring token that was not requested");
            continue;
        }
        by_id.insert(entry.id.clone(), entry);
    }

    Ok(by_id.into_values().collect())
}

/// HTTP provider for the CoinGecko `/coins/markets` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoProvider {
    client: Client,
    api_url: String,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(api_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.into(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
        })
    }

    pub fn with_vs_currency(mut self, vs_currency: impl Into<String>) -> Self {
        self.vs_currency = vs_currency.into();
        self
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.api_url.trim_end_matches('/'))
    }
}

impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch_tokens(&self, ids: &[TokenId]) -> Result<Vec<MarketToken>, FetchError> {
        let url = self.markets_url();
        let joined = ids
            .iter()
            .map(TokenId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        info!(url = %url, ids = %joined, "fetching market data");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("vs_currency", self.vs_currency.as_str()), ("ids", joined.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        parse_market_payload(&body, ids)
    }
}

/// Provider that reads a `/coins/markets` style payload from disk.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarketDataProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch_tokens(&self, ids: &[TokenId]) -> Result<Vec<MarketToken>, FetchError> {
        let payload = fs::read_to_string(&self.path).map_err(|source| FetchError::File {
            path: self.path.clone(),
            source,
        })?;
        parse_market_payload(&payload, ids)
    }
}

/// In-memory provider, mostly useful for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    tokens: Vec<MarketToken>,
}

impl StaticProvider {
    pub fn new(tokens: Vec<MarketToken>) -> Self {
        Self { tokens }
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_tokens(&self, ids: &[TokenId]) -> Result<Vec<MarketToken>, FetchError> {
        Ok(self
            .tokens
            .iter()
            .filter(|token| ids.is_empty() || ids.contains(&token.id))
            .cloned()
            .collect())
    }
}

/// Parse a comma-separated id list, skipping blanks.
pub fn parse_token_ids(raw: &str) -> Vec<TokenId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(TokenId::from)
        .collect()
}

/// The default tracked token ids.
pub fn default_token_ids() -> Vec<TokenId> {
    DEFAULT_TOKEN_IDS.iter().copied().map(TokenId::from).collect()
}

fn build_client() -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent())
        .build()
        .map_err(FetchError::Http)
}

fn user_agent() -> String {
    format!("swaproute-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":67000.5,"market_cap":1.3e12},
        {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":3500.0},
        {"id":"dogecoin","symbol":"doge","name":"Dogecoin","current_price":0.12}
    ]"#;

    #[test]
    fn parse_keeps_requested_tokens_only() {
        let requested = parse_token_ids("bitcoin,ethereum");
        let tokens = parse_market_payload(PAYLOAD, &requested).expect("valid payload");

        let ids: Vec<&str> = tokens.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum"]);
        assert_eq!(tokens[0].current_price, Some(67000.5));
        assert_eq!(tokens[1].market_cap, None);
    }

    #[test]
    fn parse_without_filter_keeps_everything() {
        let tokens = parse_market_payload(PAYLOAD, &[]).expect("valid payload");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn parse_rejects_non_array_payload() {
        let error = parse_market_payload(r#"{"error":"rate limited"}"#, &[]).expect_err("object");
        assert!(matches!(error, FetchError::MalformedPayload { .. }));
    }

    #[test]
    fn parse_rejects_entries_missing_fields() {
        let error =
            parse_market_payload(r#"[{"id":"bitcoin","symbol":"btc"}]"#, &[]).expect_err("name");
        assert!(error.to_string().contains("malformed market data payload"));
    }

    #[test]
    fn parse_rejects_empty_id() {
        let error = parse_market_payload(r#"[{"id":" ","symbol":"x","name":"X"}]"#, &[])
            .expect_err("empty id");
        assert!(error.to_string().contains("empty id"));
    }

    #[test]
    fn duplicate_ids_keep_last_entry() {
        let payload = r#"[
            {"id":"bitcoin","symbol":"btc","name":"Old"},
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin"}
        ]"#;
        let tokens = parse_market_payload(payload, &[]).expect("valid payload");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "Bitcoin");
    }

    #[test]
    fn token_id_list_parsing_skips_blanks() {
        let ids = parse_token_ids(" bitcoin, ,ethereum,");
        assert_eq!(ids, vec![TokenId::from("bitcoin"), TokenId::from("ethereum")]);
    }

    #[test]
    fn markets_url_strips_trailing_slash() {
        let provider = CoinGeckoProvider::new("http://localhost:1234/api/v3/").expect("client");
        assert_eq!(
            provider.markets_url(),
            "http://localhost:1234/api/v3/coins/markets"
        );
    }

    #[test]
    fn static_provider_filters_by_id() {
        let provider = StaticProvider::new(
            parse_market_payload(PAYLOAD, &[]).expect("valid payload"),
        );
        let tokens = provider
            .fetch_tokens(&[TokenId::from("dogecoin")])
            .expect("static fetch");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].to_token().symbol, "doge");
    }
}
