//! finance_mcp protocol layer
//!
//! Message types for the task request/response envelopes and the decoder
//! that validates inbound payloads.

pub mod decode;
pub mod messages;

pub use decode::decode_task_request;
pub use messages::{
    AnalysisResult, ErrorCode, ErrorDetails, HoldingRequest, Performative, PortfolioSummary,
    ProcessingOutcome, ResolvedHolding, ResponseEnvelope, ResponseStatus, TaskRequest,
    INTENT_ANALYZE_PORTFOLIO, ONTOLOGY, PROTOCOL, PROTOCOL_VERSION,
};
