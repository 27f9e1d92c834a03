//! Agent core: receive loop, allocation processing, response composition

pub mod composer;
pub mod processor;
pub mod worker;

pub use composer::{compose_envelope, compose_reply};
pub use processor::{AllocationProcessor, BASE_CAPITAL};
pub use worker::{AgentWorker, PollOutcome};
