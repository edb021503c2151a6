//! Resilient invocation of a single remote call
//!
//! Wraps one fallible operation with the breaker gate, bounded
//! retries, and linear backoff. All failures degrade to `None`; the
//! caller decides what an absent result means.

use crate::breaker::CircuitBreaker;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Attempts per invocation, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// Base backoff between failed attempts; attempt `n` failing waits
/// `n` times this (linear, not exponential)
pub const BACKOFF_STEP: Duration = Duration::from_millis(700);

/// Run `operation` under the breaker with retries and backoff.
///
/// Short-circuits without an attempt when the breaker is open. Every
/// attempt outcome is reported to the breaker, one report per failed
/// attempt; no sleep follows the last attempt.
pub async fn invoke<T, F, Fut>(breaker: &CircuitBreaker, mut operation: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let resource = breaker.resource().as_str();

    if !breaker.try_acquire() {
        debug!(resource, "short-circuited, resource cooling down");
        return None;
    }

    for attempt in 1..=MAX_ATTEMPTS {
        match operation().await {
            Ok(value) => {
                breaker.record_success();
                debug!(resource, attempt, "call succeeded");
                return Some(value);
            }
            Err(error) => {
                breaker.record_failure();
                warn!(
                    resource,
                    attempt,
                    max_attempts = MAX_ATTEMPTS,
                    error = %error,
                    "call attempt failed"
                );
                if attempt < MAX_ATTEMPTS {
                    sleep(BACKOFF_STEP * attempt).await;
                }
            }
        }
    }

    warn!(resource, "all attempts exhausted, degrading to no result");
    None
}
