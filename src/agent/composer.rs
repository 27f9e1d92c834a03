//! Response composer
//!
//! Turns a terminal [`ProcessingOutcome`] into a protocol response envelope
//! addressed to the requester's `reply_to`. Every accepted request yields
//! exactly one envelope, success or failure alike.

use crate::agent::processor::BASE_CAPITAL;
use crate::error::{AgentError, AgentResult};
use crate::protocol::messages::{
    AnalysisResult, Performative, PortfolioSummary, ProcessingOutcome, ResponseEnvelope,
    ResponseStatus, TaskRequest, ONTOLOGY, PROTOCOL, PROTOCOL_VERSION,
};
use crate::transport::OutboundMessage;
use chrono::Utc;

/// Build the response envelope for one processed request.
///
/// Correlation identifiers are copied verbatim from the request; the
/// timestamp is taken at composition time.
pub fn compose_envelope(request: &TaskRequest, outcome: ProcessingOutcome) -> ResponseEnvelope {
    let (status, result, error) = match outcome {
        ProcessingOutcome::Success {
            total_value,
            holdings,
        } => (
            ResponseStatus::Success,
            Some(AnalysisResult {
                portfolio_summary: PortfolioSummary {
                    total_estimated_value: total_value,
                    base_capital: BASE_CAPITAL,
                    num_holdings: holdings.len(),
                },
                holdings_details: holdings,
            }),
            None,
        ),
        ProcessingOutcome::Failure { error } => (ResponseStatus::Failure, None, Some(error)),
    };

    ResponseEnvelope {
        protocol: PROTOCOL.to_string(),
        version: PROTOCOL_VERSION.to_string(),
        message_type: "response".to_string(),
        task_id: request.task_id.clone(),
        parent_task: request.parent_task.clone(),
        intent: request.intent.clone(),
        status,
        timestamp: Utc::now(),
        result,
        error,
    }
}

/// Wrap an envelope in a transport message bound for the requester.
///
/// The performative mirrors the envelope status: `inform` for success,
/// `failure` otherwise.
pub fn compose_reply(
    request: &TaskRequest,
    envelope: &ResponseEnvelope,
) -> AgentResult<OutboundMessage> {
    let performative = match envelope.status {
        ResponseStatus::Success => Performative::Inform,
        ResponseStatus::Failure => Performative::Failure,
    };

    let body = serde_json::to_string(envelope)
        .map_err(|e| AgentError::internal(format!("unserializable response envelope: {e}")))?;

    Ok(OutboundMessage {
        to: request.reply_to.clone(),
        performative,
        ontology: ONTOLOGY.to_string(),
        body,
    })
}
