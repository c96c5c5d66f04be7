//! Exponential-backoff retry helper, shared by the Embedding Worker Pool's
//! batch retries and Storage's transient I/O retries (spec §4.9/§7).
//!
//! Mirrors the teacher's resilience module, generalized into a single
//! reusable primitive rather than the teacher's full circuit-breaker /
//! rate-limiter stack (out of scope here — no outward transport to rate
//! limit).

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retries `op` up to `max_attempts` times, doubling `base_delay` after each
/// failure (1s, 2s, 4s for the spec's defaults). Returns the last error if
/// every attempt fails.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                let delay = base_delay * 2u32.pow(attempt - 1);
                warn!(
                    target: "folder_semantic_index::resilience",
                    %label, attempt, %err, delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, &str> = retry_with_backoff(3, Duration::from_millis(1), "t", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, &str> = retry_with_backoff(3, Duration::from_millis(1), "t", || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err("not yet")
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, &str> = retry_with_backoff(2, Duration::from_millis(1), "t", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("always fails")
            }
        })
        .await;
        assert_eq!(result, Err("always fails"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
