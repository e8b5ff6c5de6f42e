//! Bounded retry for simple data-store writes.
//!
//! Only transient (connection-level) failures are retried, with exponential
//! backoff and jitter over three attempts. Webhook dispatch is deliberately
//! not routed through this wrapper; it is single-attempt with local-state
//! compensation on failure.

use cadence_error::StoreError;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};

/// Run a store write, retrying transient failures up to three times.
///
/// Deterministic failures (query, not-found, conflict) return immediately.
pub async fn with_write_retry<T, F, Fut>(mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let strategy = ExponentialBackoff::from_millis(50)
        .factor(2)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(3);

    Retry::spawn(strategy, || {
        let attempt = op();
        async move {
            attempt.await.map_err(|e| {
                if e.is_transient() {
                    tracing::debug!(error = %e, "transient store failure, will retry");
                    RetryError::transient(e)
                } else {
                    RetryError::permanent(e)
                }
            })
        }
    })
    .await
}
