//! Error types for the coin watchlist service

use thiserror::Error;

/// Errors that can occur when fetching market data from the provider
///
/// The `Display` text of every variant is written for end users; the web
/// layer shows it verbatim.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarketDataError {
    /// Provider did not answer within the request timeout
    #[error("Request timed out. Please try again.")]
    Timeout,

    /// Could not reach the provider at all
    #[error("Network error. Please check your internet connection. ({0})")]
    ConnectionFailure(String),

    /// Provider answered with a non-success status other than 404
    #[error("API error: Unable to fetch data (Status {0})")]
    ProviderError(u16),

    /// Provider does not know the requested identifier
    #[error("Coin \"{0}\" not found. Try bitcoin, ethereum, cardano, etc.")]
    NotFound(String),

    /// Body could not be parsed as the expected schema
    #[error("Invalid response from API. Please try again. ({0})")]
    MalformedResponse(String),

    /// Anything not classified above
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl MarketDataError {
    /// Creates an Unexpected error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        let msg = redact_query(&e.to_string());
        if e.is_timeout() {
            MarketDataError::Timeout
        } else if e.is_connect() {
            MarketDataError::ConnectionFailure(msg)
        } else if e.is_decode() {
            MarketDataError::MalformedResponse(msg)
        } else if let Some(status) = e.status() {
            MarketDataError::ProviderError(status.as_u16())
        } else {
            MarketDataError::Unexpected(msg)
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(e: serde_json::Error) -> Self {
        MarketDataError::MalformedResponse(e.to_string())
    }
}

/// Strips query strings from URLs embedded in transport errors so that
/// request parameters never end up in logs or user-facing messages.
fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => {
            let tail = &msg[idx..];
            let rest = tail
                .find(|c: char| c == ')' || c.is_whitespace())
                .map(|end| &tail[end..])
                .unwrap_or("");
            format!("{}?<query redacted>{}", &msg[..idx], rest)
        }
        None => msg.to_string(),
    }
}

/// Errors raised by the watchlist store
#[derive(Debug, Error)]
pub enum WatchlistError {
    /// No row with this id
    #[error("Watchlist entry {0} not found")]
    NotFound(i64),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors raised while assembling runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
