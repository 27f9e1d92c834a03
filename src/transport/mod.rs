//! Transport layer for agent communication
//!
//! The [`Transport`] trait abstracts the point-to-point delivery channel
//! the agent sits on. The core assumes reliable delivery and consumes only
//! decoded payloads plus metadata tags; framing, routing, and delivery
//! guarantees belong to the implementation.

use crate::protocol::messages::Performative;
use std::time::Duration;

pub mod stdio;

pub use stdio::StdioTransport;

/// Inbound message with its metadata tags
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Sender address
    pub sender: String,
    /// Performative metadata tag (e.g. "request")
    pub performative: String,
    /// Ontology metadata tag (e.g. "finance-task")
    pub ontology: String,
    /// Raw payload text
    pub body: String,
}

/// Outbound message addressed to a single recipient
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Recipient address (the request's `reply_to`)
    pub to: String,
    pub performative: Performative,
    pub ontology: String,
    /// Serialized response envelope
    pub body: String,
}

/// Transport trait for agent communication
///
/// Abstraction over the delivery channel to enable dependency injection
/// and testing.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Wait up to `wait` for the next inbound message.
    ///
    /// `Ok(None)` means the wait elapsed with nothing to handle (an idle
    /// re-poll, not a failure); `Err` means the channel is closed or broken.
    async fn recv(&self, wait: Duration) -> Result<Option<InboundMessage>, Self::Error>;

    /// Send one message to its recipient.
    async fn send(&self, message: &OutboundMessage) -> Result<(), Self::Error>;
}
