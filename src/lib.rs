//! Portfolio analysis agent
//!
//! A task-exchange agent that analyzes hypothetical portfolio allocations
//! against a fixed capital base using live market quotes. It sits on a
//! point-to-point transport, decodes `finance_mcp/1.0` task requests,
//! resolves each holding's capital allocation and estimated share count,
//! and replies to the requester with a success or failure envelope.
//!
//! # Architecture
//!
//! - [`protocol`]: wire types, request decoding, response envelope
//! - [`agent`]: the receive loop, allocation processor, response composer
//! - [`quotes`]: quote lookup trait and the Alpha Vantage client
//! - [`transport`]: delivery channel abstraction and the stdio transport
//! - [`directory`]: capability registration at startup
//! - [`config`]: TOML configuration with env-var credential indirection
//! - [`observability`]: structured logging and injected metrics

pub mod agent;
pub mod config;
pub mod directory;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod quotes;
pub mod testing;
pub mod transport;

pub use agent::{AgentWorker, AllocationProcessor};
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
