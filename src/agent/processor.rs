//! Portfolio allocation processor
//!
//! Computes, against a fixed simulated capital base, the capital allocation
//! and estimated share count for each requested holding using a live
//! per-symbol quote lookup. Holdings are processed strictly sequentially in
//! input order; the first item-level failure aborts the whole batch and no
//! partial results are ever returned.

use crate::error::sanitize_error_message;
use crate::protocol::messages::{
    ErrorCode, ErrorDetails, HoldingRequest, ProcessingOutcome, ResolvedHolding,
    INTENT_ANALYZE_PORTFOLIO,
};
use crate::quotes::QuoteSource;
use std::sync::Arc;
use tracing::{error, info};

/// Simulated total capital base, in currency units
pub const BASE_CAPITAL: f64 = 100_000.0;

/// Round to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse an allocation percentage string like "25%" (pure function)
fn parse_allocation(allocation: &str) -> Option<f64> {
    let percent: f64 = allocation.trim().trim_end_matches('%').trim().parse().ok()?;
    (percent.is_finite() && percent >= 0.0).then_some(percent)
}

/// Allocation processor with an injected quote source
pub struct AllocationProcessor {
    quotes: Arc<dyn QuoteSource>,
    base_capital: f64,
}

impl AllocationProcessor {
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self {
            quotes,
            base_capital: BASE_CAPITAL,
        }
    }

    /// Process one request's holdings to a terminal outcome.
    ///
    /// Never returns an error: every failure mode is a protocol-level
    /// `Failure` outcome delivered back to the requester.
    pub async fn process(&self, intent: &str, holdings: &[HoldingRequest]) -> ProcessingOutcome {
        if intent != INTENT_ANALYZE_PORTFOLIO {
            return failure(
                ErrorCode::UnexpectedIntent,
                format!("Unexpected intent: {intent}"),
            );
        }

        let mut total_value = 0.0;
        let mut resolved = Vec::with_capacity(holdings.len());

        for item in holdings {
            if item.symbol.is_empty() || item.allocation.is_empty() {
                return failure(
                    ErrorCode::InvalidPortfolioItem,
                    format!(
                        "Invalid portfolio item: symbol={:?} allocation={:?}",
                        item.symbol, item.allocation
                    ),
                );
            }

            let Some(allocation_percent) = parse_allocation(&item.allocation) else {
                return failure(
                    ErrorCode::InvalidPortfolioItem,
                    format!(
                        "Invalid portfolio item: symbol={:?} allocation={:?}",
                        item.symbol, item.allocation
                    ),
                );
            };

            let capital_allocated = (allocation_percent / 100.0) * self.base_capital;

            let current_price = match self.quotes.current_price(&item.symbol).await {
                Ok(Some(price)) => price,
                // Endpoint answered without a price field: zero price,
                // shares become the null sentinel below
                Ok(None) => 0.0,
                Err(e) => {
                    error!(
                        symbol = %item.symbol,
                        error = %sanitize_error_message(&e.to_string()),
                        "Quote lookup failed"
                    );
                    return failure(
                        ErrorCode::ApiFetchError,
                        format!("Could not fetch data for symbol: {}", item.symbol),
                    );
                }
            };

            let estimated_shares = if current_price == 0.0 {
                None
            } else {
                Some(round2(capital_allocated / current_price))
            };

            info!(
                symbol = %item.symbol,
                allocation_percent = allocation_percent,
                capital_allocated = round2(capital_allocated),
                "Holding resolved"
            );

            resolved.push(ResolvedHolding {
                symbol: item.symbol.clone(),
                allocation_percent,
                capital_allocated: round2(capital_allocated),
                estimated_shares,
                current_price,
            });
            // Detail rows are rounded; the running total accumulates
            // unrounded and is rounded once at the end
            total_value += capital_allocated;
        }

        info!(
            total_value = round2(total_value),
            num_holdings = resolved.len(),
            "Portfolio analysis complete"
        );

        ProcessingOutcome::Success {
            total_value: round2(total_value),
            holdings: resolved,
        }
    }
}

fn failure(code: ErrorCode, message: String) -> ProcessingOutcome {
    ProcessingOutcome::Failure {
        error: ErrorDetails { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::MockQuoteSource;

    fn holding(symbol: &str, allocation: &str) -> HoldingRequest {
        HoldingRequest {
            symbol: symbol.to_string(),
            allocation: allocation.to_string(),
        }
    }

    fn processor(quotes: MockQuoteSource) -> AllocationProcessor {
        AllocationProcessor::new(Arc::new(quotes))
    }

    #[test]
    fn test_parse_allocation() {
        assert_eq!(parse_allocation("25%"), Some(25.0));
        assert_eq!(parse_allocation("0%"), Some(0.0));
        assert_eq!(parse_allocation("12.5%"), Some(12.5));
        assert_eq!(parse_allocation("50"), Some(50.0));
        assert_eq!(parse_allocation(" 50% "), Some(50.0));
        assert_eq!(parse_allocation("-10%"), None);
        assert_eq!(parse_allocation("abc%"), None);
        assert_eq!(parse_allocation(""), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(333.333333), 333.33);
        assert_eq!(round2(50000.0), 50000.0);
    }

    #[tokio::test]
    async fn test_two_holdings_allocating_full_capital() {
        let quotes = MockQuoteSource::with_prices([("AAPL", 100.0), ("MSFT", 200.0)]);
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("AAPL", "50%"), holding("MSFT", "50%")],
            )
            .await;

        let ProcessingOutcome::Success {
            total_value,
            holdings,
        } = outcome
        else {
            panic!("expected success, got {outcome:?}");
        };

        assert_eq!(total_value, 100000.0);
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].capital_allocated, 50000.0);
        assert_eq!(holdings[0].estimated_shares, Some(500.0));
        assert_eq!(holdings[1].symbol, "MSFT");
        assert_eq!(holdings[1].capital_allocated, 50000.0);
        assert_eq!(holdings[1].estimated_shares, Some(250.0));
    }

    #[tokio::test]
    async fn test_capital_allocation_formula() {
        let quotes = MockQuoteSource::with_prices([("IBM", 123.45)]);
        let processor = processor(quotes);

        let outcome = processor
            .process(INTENT_ANALYZE_PORTFOLIO, &[holding("IBM", "33.33%")])
            .await;

        let ProcessingOutcome::Success { holdings, .. } = outcome else {
            panic!("expected success");
        };

        // capital_allocated == round(a/100 * 100000, 2), always
        assert_eq!(holdings[0].capital_allocated, 33330.0);
        assert_eq!(
            holdings[0].estimated_shares,
            Some((33330.0_f64 / 123.45 * 100.0).round() / 100.0)
        );
    }

    #[tokio::test]
    async fn test_unexpected_intent_processes_nothing() {
        let quotes = MockQuoteSource::with_prices([("AAPL", 100.0)]);
        let processor = AllocationProcessor::new(Arc::new(quotes));

        let outcome = processor
            .process("unknown_intent", &[holding("AAPL", "100%")])
            .await;

        let ProcessingOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error.code, ErrorCode::UnexpectedIntent);
        assert!(error.message.contains("unknown_intent"));
    }

    #[tokio::test]
    async fn test_empty_allocation_fails_with_invalid_item() {
        let quotes = MockQuoteSource::with_prices([("AAPL", 100.0)]);
        let processor = processor(quotes);

        let outcome = processor
            .process(INTENT_ANALYZE_PORTFOLIO, &[holding("AAPL", "")])
            .await;

        let ProcessingOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error.code, ErrorCode::InvalidPortfolioItem);
        assert!(error.message.contains("AAPL"));
    }

    #[tokio::test]
    async fn test_empty_symbol_short_circuits_remaining_items() {
        let quotes = MockQuoteSource::with_prices([("MSFT", 200.0)]);
        let lookups = quotes.lookup_log();
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("", "50%"), holding("MSFT", "50%")],
            )
            .await;

        assert!(matches!(
            outcome,
            ProcessingOutcome::Failure {
                error: ErrorDetails {
                    code: ErrorCode::InvalidPortfolioItem,
                    ..
                }
            }
        ));
        // No lookups after the offending index
        assert!(lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_allocation_is_invalid_item() {
        let quotes = MockQuoteSource::with_prices([("AAPL", 100.0)]);
        let processor = processor(quotes);

        let outcome = processor
            .process(INTENT_ANALYZE_PORTFOLIO, &[holding("AAPL", "lots%")])
            .await;

        let ProcessingOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error.code, ErrorCode::InvalidPortfolioItem);
    }

    #[tokio::test]
    async fn test_lookup_failure_aborts_batch_naming_symbol() {
        let quotes =
            MockQuoteSource::with_prices([("AAPL", 100.0)]).failing_for(["MSFT"]);
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("AAPL", "50%"), holding("MSFT", "50%")],
            )
            .await;

        let ProcessingOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error.code, ErrorCode::ApiFetchError);
        assert_eq!(error.message, "Could not fetch data for symbol: MSFT");
    }

    #[tokio::test]
    async fn test_lookup_failure_on_first_item_skips_rest() {
        let quotes =
            MockQuoteSource::with_prices([("MSFT", 200.0)]).failing_for(["AAPL"]);
        let lookups = quotes.lookup_log();
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("AAPL", "50%"), holding("MSFT", "50%")],
            )
            .await;

        assert!(matches!(outcome, ProcessingOutcome::Failure { .. }));
        assert_eq!(*lookups.lock().unwrap(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_absent_price_yields_null_shares_and_continues() {
        let quotes =
            MockQuoteSource::with_prices([("MSFT", 200.0)]).missing_price_for(["NEWCO"]);
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("NEWCO", "40%"), holding("MSFT", "60%")],
            )
            .await;

        let ProcessingOutcome::Success {
            total_value,
            holdings,
        } = outcome
        else {
            panic!("expected success, got {outcome:?}");
        };

        // Zero price must not raise: shares are the null sentinel,
        // capital still counts toward the total
        assert_eq!(holdings[0].current_price, 0.0);
        assert_eq!(holdings[0].estimated_shares, None);
        assert_eq!(holdings[0].capital_allocated, 40000.0);
        assert_eq!(holdings[1].estimated_shares, Some(300.0));
        assert_eq!(total_value, 100000.0);
    }

    #[tokio::test]
    async fn test_empty_holdings_succeeds_with_zero_total() {
        let processor = processor(MockQuoteSource::default());

        let outcome = processor.process(INTENT_ANALYZE_PORTFOLIO, &[]).await;

        assert_eq!(
            outcome,
            ProcessingOutcome::Success {
                total_value: 0.0,
                holdings: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_holdings_processed_in_input_order() {
        let quotes =
            MockQuoteSource::with_prices([("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let lookups = quotes.lookup_log();
        let processor = processor(quotes);

        let outcome = processor
            .process(
                INTENT_ANALYZE_PORTFOLIO,
                &[holding("C", "10%"), holding("A", "20%"), holding("B", "70%")],
            )
            .await;

        let ProcessingOutcome::Success { holdings, .. } = outcome else {
            panic!("expected success");
        };

        let symbols: Vec<&str> = holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A", "B"]);
        assert_eq!(
            *lookups.lock().unwrap(),
            vec!["C".to_string(), "A".to_string(), "B".to_string()]
        );
    }

    #[tokio::test]
    async fn test_replay_yields_identical_outcome() {
        let quotes = MockQuoteSource::with_prices([("AAPL", 100.0), ("MSFT", 200.0)]);
        let processor = processor(quotes);
        let holdings = [holding("AAPL", "50%"), holding("MSFT", "50%")];

        let first = processor.process(INTENT_ANALYZE_PORTFOLIO, &holdings).await;
        let second = processor.process(INTENT_ANALYZE_PORTFOLIO, &holdings).await;

        assert_eq!(first, second);
    }
}
