//! Agent receive loop
//!
//! Cooperative worker that polls the transport with a bounded wait,
//! decodes inbound task requests, runs them through the allocation
//! processor, and sends the composed reply back to the requester.

use crate::agent::composer::{compose_envelope, compose_reply};
use crate::agent::processor::AllocationProcessor;
use crate::config::AgentConfig;
use crate::directory::{DirectoryClient, DirectoryError, ServiceRegistration};
use crate::error::AgentError;
use crate::observability::{observe, MetricsCollector};
use crate::protocol::messages::{Performative, INTENT_ANALYZE_PORTFOLIO, ONTOLOGY};
use crate::protocol::{decode_task_request, TaskRequest};
use crate::transport::{InboundMessage, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};

/// Result of one receive-loop iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// A message was received and fully handled
    Handled,
    /// The bounded wait elapsed with nothing to do
    Idle,
}

/// Portfolio analysis agent worker
pub struct AgentWorker<T: Transport> {
    config: AgentConfig,
    transport: Arc<T>,
    processor: AllocationProcessor,
    metrics: Arc<MetricsCollector>,
}

impl<T: Transport> AgentWorker<T> {
    pub fn new(
        config: AgentConfig,
        transport: Arc<T>,
        processor: AllocationProcessor,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            config,
            transport,
            processor,
            metrics,
        }
    }

    /// Register this agent's capability with the directory.
    ///
    /// Called once at startup, before the receive loop starts.
    pub async fn register(&self, directory: &dyn DirectoryClient) -> Result<(), DirectoryError> {
        let registration = ServiceRegistration {
            service_type: self.config.agent.service_type.clone(),
            intent: INTENT_ANALYZE_PORTFOLIO.to_string(),
            address: self.config.agent.id.clone(),
            description: self.config.agent.description.clone(),
        };
        directory.register(&registration).await
    }

    /// Run the receive loop until the transport closes.
    pub async fn run(&self) -> Result<(), AgentError> {
        info!(
            agent_id = %self.config.agent.id,
            recv_timeout_secs = self.config.transport.recv_timeout_secs,
            "Agent worker started"
        );

        loop {
            match self.poll_once().await {
                Ok(PollOutcome::Handled) => {}
                Ok(PollOutcome::Idle) => {
                    debug!("No message received, re-polling");
                }
                Err(e) => {
                    info!(reason = %e, "Transport closed, stopping worker");
                    return Ok(());
                }
            }
        }
    }

    /// One receive-loop iteration: bounded wait, then handle at most one
    /// message. `Err` means the transport is closed or broken.
    pub async fn poll_once(&self) -> Result<PollOutcome, T::Error> {
        let wait = Duration::from_secs(self.config.transport.recv_timeout_secs);

        let Some(message) = self.transport.recv(wait).await? else {
            return Ok(PollOutcome::Idle);
        };

        self.handle_message(message).await;
        Ok(PollOutcome::Handled)
    }

    async fn handle_message(&self, message: InboundMessage) {
        // Only request traffic tagged with our ontology is ours to answer
        if message.performative != Performative::Request.as_str() || message.ontology != ONTOLOGY {
            debug!(
                sender = %message.sender,
                performative = %message.performative,
                ontology = %message.ontology,
                "Ignoring message with foreign metadata"
            );
            return;
        }

        self.metrics.request_received();

        let request = match decode_task_request(&message.body) {
            Ok(request) => request,
            // No reply path exists for an undecodable request; log and drop
            Err(AgentError::MissingField(field)) => {
                warn!(
                    sender = %message.sender,
                    field,
                    "Dropping request with missing envelope field"
                );
                self.metrics.request_dropped();
                return;
            }
            Err(e) => {
                error!(sender = %message.sender, error = %e, "Dropping malformed request");
                self.metrics.request_dropped();
                return;
            }
        };

        self.handle_request(request).await;
    }

    async fn handle_request(&self, request: TaskRequest) {
        let span = crate::task_span!(task_id = %request.task_id, intent = %request.intent);
        let metrics = Arc::clone(&self.metrics);

        let outcome = observe(
            || {
                info!(
                    num_holdings = request.holdings.len(),
                    "Processing task request"
                )
            },
            |elapsed| metrics.record_processing_time(elapsed),
            self.processor.process(&request.intent, &request.holdings),
        )
        .instrument(span)
        .await;

        let envelope = compose_envelope(&request, outcome);
        let success = matches!(
            envelope.status,
            crate::protocol::messages::ResponseStatus::Success
        );

        let reply = match compose_reply(&request, &envelope) {
            Ok(reply) => reply,
            Err(e) => {
                error!(task_id = %request.task_id, error = %e, "Failed to serialize reply");
                return;
            }
        };

        match self.transport.send(&reply).await {
            Ok(()) => {
                self.metrics.response_sent(success);
                info!(
                    task_id = %request.task_id,
                    to = %reply.to,
                    status = if success { "success" } else { "failure" },
                    "Reply sent"
                );
            }
            Err(e) => {
                error!(task_id = %request.task_id, error = %e, "Failed to send reply");
            }
        }
    }
}
