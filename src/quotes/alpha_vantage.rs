//! Alpha Vantage GLOBAL_QUOTE client
//!
//! One HTTP GET per symbol against the `GLOBAL_QUOTE` function. Each lookup
//! uses a fresh, independently-scoped client so every exit path (success,
//! error, timeout) releases its connection with the call.

use crate::quotes::{QuoteError, QuoteSource};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Quote source backed by the Alpha Vantage GLOBAL_QUOTE endpoint
pub struct AlphaVantageSource {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl AlphaVantageSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Build the quote request URL for a symbol (pure function)
    fn quote_url(&self, symbol: &str) -> Result<Url, QuoteError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| QuoteError::Malformed(format!("invalid quote endpoint URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("function", "GLOBAL_QUOTE")
            .append_pair("symbol", symbol)
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }

    /// Extract the price from a GLOBAL_QUOTE response body (pure function)
    ///
    /// Absent price field is not an error: the endpoint answers with an
    /// empty `Global Quote` object for unknown symbols.
    fn parse_price(body: &Value) -> Result<Option<f64>, QuoteError> {
        let price_str = body
            .get("Global Quote")
            .and_then(|quote| quote.get("05. price"))
            .and_then(Value::as_str);

        match price_str {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| QuoteError::Malformed(format!("non-numeric price field: {raw:?}"))),
        }
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageSource {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError> {
        let url = self.quote_url(symbol)?;

        // Fresh connection scope per lookup
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| QuoteError::Malformed(format!("invalid quote JSON: {e}")))?;

        let price = Self::parse_price(&body)?;

        tracing::debug!(symbol = %symbol, price = ?price, "Quote lookup completed");
        Ok(price)
    }
}
