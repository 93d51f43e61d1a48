//! CoinGecko market data provider implementation

use crate::{
    constants::{
        API_KEY_HEADER, API_KEY_PLACEHOLDER, COINGECKO_API_URL, COINGECKO_COINS_SEGMENT,
        COINGECKO_GLOBAL_SEGMENT, COINGECKO_MARKETS_SEGMENT, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::MarketDataError,
    provider::MarketDataProvider,
    types::{CoinSnapshot, GlobalMarketSummary, MarketListing},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// `{ "usd": <number> }` as used throughout the CoinGecko API
#[derive(Debug, Default, Deserialize)]
struct UsdValue {
    #[serde(default)]
    usd: Option<f64>,
}

fn usd(value: &Option<UsdValue>) -> f64 {
    value.as_ref().and_then(|v| v.usd).unwrap_or(0.0)
}

/// CoinGecko `/coins/{id}` response (only the fields we read)
#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    image: Option<CoinImage>,
    #[serde(default)]
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    #[serde(default)]
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    #[serde(default)]
    current_price: Option<UsdValue>,
    #[serde(default)]
    market_cap: Option<UsdValue>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

/// One element of the `/coins/markets` array
#[derive(Debug, Deserialize)]
struct MarketsEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    total_volume: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

/// CoinGecko `/global` response; everything of interest sits under `data`
#[derive(Debug, Deserialize)]
struct GlobalResponse {
    #[serde(default)]
    data: Option<GlobalData>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: Option<UsdValue>,
    #[serde(default)]
    total_volume: Option<UsdValue>,
    #[serde(default)]
    market_cap_change_percentage_24h_usd: Option<f64>,
    #[serde(default)]
    active_cryptocurrencies: Option<u64>,
    #[serde(default)]
    markets: Option<u64>,
    #[serde(default)]
    market_cap_percentage: Option<DominanceData>,
}

#[derive(Debug, Deserialize)]
struct DominanceData {
    #[serde(default)]
    btc: Option<f64>,
    #[serde(default)]
    eth: Option<f64>,
}

/// Truncates a JSON market cap to an unsigned integer
fn to_market_cap(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Parses a `/coins/{id}` body into a snapshot
pub fn parse_coin_detail(body: &str) -> Result<CoinSnapshot, MarketDataError> {
    let detail: CoinDetailResponse = serde_json::from_str(body)?;
    let market = detail.market_data.as_ref();

    Ok(CoinSnapshot {
        coin_id: detail.id.unwrap_or_default(),
        name: detail.name.unwrap_or_default(),
        symbol: detail.symbol.unwrap_or_default().to_uppercase(),
        price: market.map(|m| usd(&m.current_price)).unwrap_or(0.0),
        market_cap: to_market_cap(market.map(|m| usd(&m.market_cap)).unwrap_or(0.0)),
        price_change_24h: market
            .and_then(|m| m.price_change_percentage_24h)
            .unwrap_or(0.0),
        image: detail.image.and_then(|i| i.small).unwrap_or_default(),
    })
}

/// Parses a `/coins/markets` body, keeping provider order
pub fn parse_markets(body: &str) -> Result<Vec<MarketListing>, MarketDataError> {
    let entries: Vec<MarketsEntry> = serde_json::from_str(body)?;

    Ok(entries
        .into_iter()
        .map(|coin| MarketListing {
            rank: coin.market_cap_rank.unwrap_or(0),
            coin_id: coin.id.unwrap_or_default(),
            name: coin.name.unwrap_or_default(),
            symbol: coin.symbol.unwrap_or_default().to_uppercase(),
            price: coin.current_price.unwrap_or(0.0),
            market_cap: to_market_cap(coin.market_cap.unwrap_or(0.0)),
            volume_24h: coin.total_volume.unwrap_or(0.0),
            price_change_24h: coin.price_change_percentage_24h.unwrap_or(0.0),
            image: coin.image.unwrap_or_default(),
        })
        .collect())
}

/// Parses a `/global` body after unwrapping its `data` envelope
pub fn parse_global(body: &str) -> Result<GlobalMarketSummary, MarketDataError> {
    let response: GlobalResponse = serde_json::from_str(body)?;
    let data = response.data.unwrap_or_default();
    let dominance = data.market_cap_percentage.as_ref();

    Ok(GlobalMarketSummary {
        total_market_cap: usd(&data.total_market_cap),
        total_volume_24h: usd(&data.total_volume),
        market_cap_change_24h: data.market_cap_change_percentage_24h_usd.unwrap_or(0.0),
        active_cryptocurrencies: data.active_cryptocurrencies.unwrap_or(0),
        markets: data.markets.unwrap_or(0),
        btc_dominance: dominance.and_then(|d| d.btc).unwrap_or(0.0),
        eth_dominance: dominance.and_then(|d| d.eth).unwrap_or(0.0),
    })
}

/// Returns the key only if it is set to something other than the placeholder
pub fn usable_api_key(raw: Option<String>) -> Option<String> {
    raw.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != API_KEY_PLACEHOLDER)
}

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    /// Creates a provider against the public CoinGecko API
    pub fn new(api_key: Option<String>) -> Result<Self, MarketDataError> {
        Self::with_base_url(COINGECKO_API_URL, api_key)
    }

    /// Creates a provider against a custom base URL (proxies, tests)
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(MarketDataError::from)?;

        let base_url = Url::parse(base_url)
            .map_err(|e| MarketDataError::unexpected(format!("Invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::unexpected(format!(
                "Invalid base URL {base_url}: cannot be a base"
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key: usable_api_key(api_key),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Appends path segments to the base URL, escaping each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::unexpected("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues a GET and returns the status with the body text
    async fn get(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), MarketDataError> {
        tracing::debug!(path = url.path(), "Requesting CoinGecko");

        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_coin(&self, coin_id: &str) -> Result<CoinSnapshot, MarketDataError> {
        let url = self.endpoint(&[COINGECKO_COINS_SEGMENT, coin_id])?;
        let query = [
            ("market_data", "true".to_string()),
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("sparkline", "false".to_string()),
        ];

        let (status, body) = self.get(url, &query).await?;
        match status {
            StatusCode::OK => parse_coin_detail(&body),
            StatusCode::NOT_FOUND => Err(MarketDataError::NotFound(coin_id.to_string())),
            other => Err(MarketDataError::ProviderError(other.as_u16())),
        }
    }

    async fn fetch_top_by_volume(&self, limit: u32) -> Result<Vec<MarketListing>, MarketDataError> {
        let url = self.endpoint(&[COINGECKO_COINS_SEGMENT, COINGECKO_MARKETS_SEGMENT])?;
        let query = [
            ("vs_currency", "usd".to_string()),
            ("order", "volume_desc".to_string()),
            ("per_page", limit.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("locale", "en".to_string()),
        ];

        let (status, body) = self.get(url, &query).await?;
        if status != StatusCode::OK {
            return Err(MarketDataError::ProviderError(status.as_u16()));
        }

        let listings = parse_markets(&body)?;
        tracing::debug!(count = listings.len(), "Parsed CoinGecko market listings");
        Ok(listings)
    }

    async fn fetch_global_summary(&self) -> Result<GlobalMarketSummary, MarketDataError> {
        let url = self.endpoint(&[COINGECKO_GLOBAL_SEGMENT])?;

        let (status, body) = self.get(url, &[]).await?;
        if status != StatusCode::OK {
            return Err(MarketDataError::ProviderError(status.as_u16()));
        }

        parse_global(&body)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN: &str = r#"{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "btc",
        "image": {"small": "https://assets.coingecko.com/coins/images/1/small/bitcoin.png"},
        "market_data": {
            "current_price": {"usd": 65000},
            "market_cap": {"usd": 1200000000000},
            "price_change_percentage_24h": 2.5
        }
    }"#;

    #[test]
    fn test_parse_coin_detail() {
        let coin = parse_coin_detail(BITCOIN).unwrap();
        assert_eq!(coin.coin_id, "bitcoin");
        assert_eq!(coin.name, "Bitcoin");
        assert_eq!(coin.symbol, "BTC");
        assert_eq!(coin.price, 65000.0);
        assert_eq!(coin.market_cap, 1_200_000_000_000);
        assert_eq!(coin.price_change_24h, 2.5);
        assert!(coin.image.ends_with("bitcoin.png"));
    }

    #[test]
    fn test_parse_coin_detail_missing_fields_default() {
        let coin = parse_coin_detail(r#"{"id": "obscure", "market_data": {"current_price": {}}}"#)
            .unwrap();
        assert_eq!(coin.coin_id, "obscure");
        assert_eq!(coin.name, "");
        assert_eq!(coin.symbol, "");
        assert_eq!(coin.price, 0.0);
        assert_eq!(coin.market_cap, 0);
        assert_eq!(coin.price_change_24h, 0.0);
        assert_eq!(coin.image, "");
    }

    #[test]
    fn test_parse_coin_detail_null_values() {
        let body = r#"{"id": "x", "symbol": null, "market_data": {"market_cap": {"usd": null}, "price_change_percentage_24h": null}}"#;
        let coin = parse_coin_detail(body).unwrap();
        assert_eq!(coin.symbol, "");
        assert_eq!(coin.market_cap, 0);
        assert_eq!(coin.price_change_24h, 0.0);
    }

    #[test]
    fn test_parse_coin_detail_malformed() {
        let err = parse_coin_detail("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_markets_keeps_order() {
        let body = r#"[
            {"id": "tether", "name": "Tether", "symbol": "usdt", "image": "https://img/usdt.png",
             "current_price": 1.0, "market_cap": 110000000000.7, "market_cap_rank": 3,
             "total_volume": 50000000000, "price_change_percentage_24h": 0.01},
            {"id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "current_price": 65000,
             "market_cap": 1200000000000, "market_cap_rank": 1, "total_volume": 30000000000,
             "price_change_percentage_24h": -1.2}
        ]"#;

        let listings = parse_markets(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].coin_id, "tether");
        assert_eq!(listings[0].symbol, "USDT");
        assert_eq!(listings[0].rank, 3);
        assert_eq!(listings[0].market_cap, 110_000_000_000);
        assert_eq!(listings[0].volume_24h, 50_000_000_000.0);
        assert_eq!(listings[1].coin_id, "bitcoin");
        assert_eq!(listings[1].image, "");
    }

    #[test]
    fn test_parse_markets_clamps_bad_market_cap() {
        let body = r#"[
            {"id": "a", "name": "A", "symbol": "a", "market_cap": -5.0},
            {"id": "b", "name": "B", "symbol": "b", "market_cap": null}
        ]"#;

        let listings = parse_markets(body).unwrap();
        assert_eq!(listings[0].market_cap, 0);
        assert_eq!(listings[1].market_cap, 0);
    }

    #[test]
    fn test_parse_markets_rejects_object() {
        let err = parse_markets(r#"{"status": {"error_code": 429}}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_global_unwraps_data() {
        let body = r#"{"data": {
            "active_cryptocurrencies": 13500,
            "markets": 1100,
            "total_market_cap": {"usd": 2500000000000.0, "eur": 1.0},
            "total_volume": {"usd": 90000000000.0},
            "market_cap_percentage": {"btc": 52.1, "eth": 16.8},
            "market_cap_change_percentage_24h_usd": -0.75
        }}"#;

        let summary = parse_global(body).unwrap();
        assert_eq!(summary.active_cryptocurrencies, 13500);
        assert_eq!(summary.markets, 1100);
        assert_eq!(summary.total_market_cap, 2_500_000_000_000.0);
        assert_eq!(summary.total_volume_24h, 90_000_000_000.0);
        assert_eq!(summary.btc_dominance, 52.1);
        assert_eq!(summary.eth_dominance, 16.8);
        assert_eq!(summary.market_cap_change_24h, -0.75);
    }

    #[test]
    fn test_parse_global_without_data_is_zeroed() {
        let summary = parse_global("{}").unwrap();
        assert_eq!(summary.total_market_cap, 0.0);
        assert_eq!(summary.active_cryptocurrencies, 0);
    }

    #[test]
    fn test_usable_api_key() {
        assert_eq!(usable_api_key(None), None);
        assert_eq!(usable_api_key(Some("".to_string())), None);
        assert_eq!(usable_api_key(Some(API_KEY_PLACEHOLDER.to_string())), None);
        assert_eq!(
            usable_api_key(Some(" CG-abc ".to_string())),
            Some("CG-abc".to_string())
        );
    }

    #[test]
    fn test_endpoint_escapes_coin_id() {
        let provider = CoinGeckoProvider::with_base_url("http://localhost:1/api/v3/", None).unwrap();
        let url = provider.endpoint(&["coins", "../global"]).unwrap();
        assert_eq!(url.path(), "/api/v3/coins/..%2Fglobal");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(CoinGeckoProvider::with_base_url("not a url", None).is_err());
    }
}
