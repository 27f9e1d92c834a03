//! Inbound payload decoding and structural validation
//!
//! Turns raw message text into a [`TaskRequest`] or fails with one of two
//! decode-level errors, both of which are terminal and produce no reply:
//! malformed JSON and missing required envelope fields. Holding-level
//! semantic validation is deferred to the processor.

use crate::error::AgentError;
use crate::protocol::messages::{HoldingRequest, TaskRequest};
use serde_json::Value;

/// Decode a raw payload into a [`TaskRequest`].
///
/// `task_id`, `parent_task`, `reply_to` and `parameters.holdings` are
/// required; a missing `intent` decodes to the empty string so the
/// processor can report it as an unexpected intent.
pub fn decode_task_request(payload: &str) -> Result<TaskRequest, AgentError> {
    let data: Value = serde_json::from_str(payload).map_err(AgentError::Decode)?;

    let intent = data
        .get("intent")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let holdings_value = data
        .get("parameters")
        .and_then(|p| p.get("holdings"))
        .ok_or(AgentError::MissingField("parameters.holdings"))?;
    let holdings: Vec<HoldingRequest> = serde_json::from_value(holdings_value.clone())
        .map_err(|_| AgentError::MissingField("parameters.holdings"))?;

    Ok(TaskRequest {
        intent,
        holdings,
        task_id: require_str(&data, "task_id")?,
        parent_task: require_str(&data, "parent_task")?,
        reply_to: require_str(&data, "reply_to")?,
    })
}

fn require_str(data: &Value, field: &'static str) -> Result<String, AgentError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AgentError::MissingField(field))
}
