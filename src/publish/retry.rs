//! Retry logic with exponential backoff for classified remote operations.

use crate::cli::RetryConfig;
use crate::context::Context;
use crate::error::Result;
use std::future::Future;

/// Retry an async operation while it fails with a retriable error
///
/// - Retriable errors ([`crate::ReleaseError::is_retriable`]): exponential
///   backoff (1s, 2s, 4s, ...) up to `config.file_uploads` retries
/// - Any other error: returned immediately
///
/// Cancellation of the run interrupts the backoff sleep.
pub async fn retry_with_backoff<F, T, Fut>(
    ctx: &Context,
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempts > 0 {
                    log::info!(
                        operation = operation_name,
                        retries = attempts;
                        "succeeded after retrying"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_retriable() {
                    return Err(e);
                }

                if attempts >= config.file_uploads {
                    log::error!(
                        operation = operation_name,
                        attempts = attempts + 1;
                        "giving up"
                    );
                    return Err(e);
                }

                attempts += 1;
                let wait = config.delay_for(attempts);

                log::warn!(
                    operation = operation_name,
                    attempt = attempts,
                    max_attempts = config.file_uploads + 1,
                    wait_ms = wait.as_millis() as u64,
                    err:% = e;
                    "retrying"
                );

                ctx.cancellable(tokio::time::sleep(wait)).await?;
            }
        }
    }
}
