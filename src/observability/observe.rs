//! Explicit instrumentation wrapper
//!
//! Request handling is observed by composing [`observe`] around the
//! pipeline call with start/end hooks, instead of implicit decoration of
//! the handler loop.

use std::future::Future;
use std::time::{Duration, Instant};

/// Run `fut`, invoking `on_start` before it and `on_end` with the elapsed
/// wall time after it completes.
pub async fn observe<Fut, T>(
    on_start: impl FnOnce(),
    on_end: impl FnOnce(Duration),
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    on_start();
    let started = Instant::now();
    let output = fut.await;
    on_end(started.elapsed());
    output
}
