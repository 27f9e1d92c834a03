//! Wire types for the finance_mcp envelope protocol
//!
//! This module defines the inbound task request, the outbound response
//! envelope, and the protocol error taxonomy shared by both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol tag carried by every response envelope.
pub const PROTOCOL: &str = "finance_mcp";
/// Protocol version carried by every response envelope.
pub const PROTOCOL_VERSION: &str = "1.0";
/// Ontology label identifying finance task traffic on the transport.
pub const ONTOLOGY: &str = "finance-task";
/// The single intent this agent recognizes.
pub const INTENT_ANALYZE_PORTFOLIO: &str = "analyze_portfolio";

/// Decoded task request
///
/// Produced by [`crate::protocol::decode_task_request`] from an inbound
/// payload. Request-scoped: owned by one processing invocation and dropped
/// when the reply has been handed to the transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRequest {
    /// Intent tag; empty string when the payload omitted it
    pub intent: String,
    /// Requested holdings in input order
    pub holdings: Vec<HoldingRequest>,
    /// Correlation identifier for this task
    pub task_id: String,
    /// Correlation identifier of the task that spawned this one
    pub parent_task: String,
    /// Transport address the response envelope is sent to
    pub reply_to: String,
}

/// One requested portfolio line item
///
/// Both fields default to empty when absent; emptiness is a processor-level
/// validation, not a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingRequest {
    #[serde(default)]
    pub symbol: String,
    /// Target allocation as a percentage string, e.g. "25%"
    #[serde(default)]
    pub allocation: String,
}

/// One computed portfolio line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedHolding {
    pub symbol: String,
    pub allocation_percent: f64,
    /// Capital assigned to this holding, rounded to 2 decimals
    pub capital_allocated: f64,
    /// Share count estimate, rounded to 2 decimals; None when the quote
    /// lookup returned no price (serialized as JSON null)
    pub estimated_shares: Option<f64>,
    pub current_price: f64,
}

/// Aggregate figures for a successful analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSummary {
    pub total_estimated_value: f64,
    pub base_capital: f64,
    pub num_holdings: usize,
}

/// Success payload of a response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub portfolio_summary: PortfolioSummary,
    pub holdings_details: Vec<ResolvedHolding>,
}

/// Outcome of one processing invocation
///
/// Exactly one variant per request; exclusive ownership passes to the
/// response composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Success {
        /// Sum of allocated capital, rounded to 2 decimals
        total_value: f64,
        holdings: Vec<ResolvedHolding>,
    },
    Failure {
        error: ErrorDetails,
    },
}

/// Response status tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
}

/// Outbound response envelope
///
/// Invariant: `result` is present iff `status` is success, `error` iff
/// failure; never both, never neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub protocol: String,
    pub version: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub task_id: String,
    pub parent_task: String,
    pub intent: String,
    pub status: ResponseStatus,
    /// RFC 3339 UTC timestamp of envelope construction
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Error details structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    /// Human-readable description (no sensitive data)
    pub message: String,
}

/// Protocol error codes reported to the requester
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnexpectedIntent,
    InvalidPortfolioItem,
    ApiFetchError,
}

/// Performative metadata tag on transport messages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Performative {
    Request,
    Inform,
    Failure,
}

impl Performative {
    /// Wire-format string for this performative
    pub fn as_str(&self) -> &'static str {
        match self {
            Performative::Request => "request",
            Performative::Inform => "inform",
            Performative::Failure => "failure",
        }
    }
}
