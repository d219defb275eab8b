//! Bounded exponential-backoff retry for fallible async operations.

use rand::Rng;
use std::future::Future;

use crate::config::RetryOptions;
use crate::error::Result;
use crate::logger::Logger;

/// Runs `operation` until it succeeds, fails with a bail error (HTTP 403),
/// or `options.retries` additional attempts have been spent. Attempts are
/// strictly sequential. The last error is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    options: &RetryOptions,
    logger: &dyn Logger,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = options.retries.saturating_add(1);
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_bail() => {
                logger.verbose(&format!("{}: non-retryable error: {}", operation_name, e));
                return Err(e);
            }
            Err(e) => {
                if attempt >= options.retries {
                    return Err(e);
                }

                let delay = options.backoff(attempt, random_multiplier());
                attempt += 1;
                logger.warn(&format!(
                    "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                    operation_name,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                ));
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn random_multiplier() -> f64 {
    rand::thread_rng().gen_range(1.0..2.0)
}
