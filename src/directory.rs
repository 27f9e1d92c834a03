//! Service directory registration
//!
//! Setup-time collaborator: the agent registers its capability once at
//! startup so other components can discover it. Injected explicitly rather
//! than reached through a process-wide registry; not part of the
//! per-request pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// One capability registration entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRegistration {
    /// Service type, e.g. "finance-data-provider"
    pub service_type: String,
    /// Intent this agent serves, e.g. "analyze_portfolio"
    pub intent: String,
    /// Transport address tasks should be sent to
    pub address: String,
    /// Human-readable description
    pub description: String,
}

/// Directory registration errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory registration failed: {0}")]
    Registration(String),
}

/// Directory client collaborator
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn register(&self, registration: &ServiceRegistration) -> Result<(), DirectoryError>;
}

/// Directory client that only records the registration in the log.
///
/// Used when the deployment has no live directory service; discovery is the
/// orchestrator's concern in that setup.
#[derive(Debug, Default)]
pub struct LoggingDirectory;

#[async_trait]
impl DirectoryClient for LoggingDirectory {
    async fn register(&self, registration: &ServiceRegistration) -> Result<(), DirectoryError> {
        info!(
            service_type = %registration.service_type,
            intent = %registration.intent,
            address = %registration.address,
            "Service registered"
        );
        Ok(())
    }
}
