//! Retry loop and per-attempt timeout guard.
//!
//! Retries are immediate and indiscriminate: every failure, including a
//! completed request with an error status, is retried until the attempt
//! budget is spent. The last error is returned unchanged.

use anyhow::{Result, bail};
use log::debug;
use std::future::Future;
use std::time::Duration;

use super::error::AttemptTimeout;
use super::logger::Logger;

/// Runs one attempt under its own timer.
///
/// The timer lives inside the returned future and is dropped with it, so it
/// cannot fire once the attempt has finished either way.
pub async fn with_timeout<F, T>(url: &str, timeout: Duration, attempt: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptTimeout {
            url: url.to_string(),
            timeout,
        }
        .into()),
    }
}

/// Calls `operation` up to `attempts` times, stopping at the first success.
///
/// `operation` receives the zero-based attempt index.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    attempts: u32,
    logger: &dyn Logger,
    operation: F,
) -> Result<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if attempts == 0 {
        bail!("{}: retry count is 0, no attempt was made", operation_name);
    }

    for attempt in 0..attempts {
        match operation(attempt).await {
            Ok(result) => {
                debug!("{}: succeeded on attempt {}/{}", operation_name, attempt + 1, attempts);
                return Ok(result);
            }
            Err(e) if attempt + 1 < attempts => {
                logger.warn(&format!(
                    "{}: attempt {}/{} failed ({:#}), retrying...",
                    operation_name,
                    attempt + 1,
                    attempts,
                    e
                ));
            }
            Err(e) => {
                logger.error(&format!(
                    "{}: failed after {} attempts: {:#}",
                    operation_name, attempts, e
                ));
                return Err(e);
            }
        }
    }

    unreachable!("the final attempt always returns")
}

/// Runs a single attempt, logging the failure before handing it back.
pub async fn once<Fut, T>(operation_name: &str, logger: &dyn Logger, attempt: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    attempt.await.inspect_err(|e| {
        logger.error(&format!("{}: failed: {:#}", operation_name, e));
    })
}
