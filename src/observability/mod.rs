//! Observability: structured logging, injected metrics, and the explicit
//! instrumentation wrapper.

pub mod logging;
pub mod metrics;
pub mod observe;

pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use observe::observe;
