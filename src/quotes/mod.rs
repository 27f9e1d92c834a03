//! Market quote lookup
//!
//! The [`QuoteSource`] trait is the seam between the allocation processor
//! and the external market-data endpoint, enabling dependency injection
//! and testing without network access.

use async_trait::async_trait;
use thiserror::Error;

pub mod alpha_vantage;

pub use alpha_vantage::AlphaVantageSource;

/// Per-symbol price lookup
///
/// `Ok(None)` means the endpoint answered but carried no price field for
/// the symbol; the processor treats that as a zero price rather than a
/// lookup failure.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError>;
}

/// Quote lookup errors (all map to `API_FETCH_ERROR` at the protocol layer)
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Connection failure or timeout
    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("quote endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed quote payload: {0}")]
    Malformed(String),
}
