//! Fixed-interval retry for operations that are expected to be flaky.
//!
//! Key propagation and SSH timing are eventually consistent; an operation is
//! retried until it succeeds, returns a [`Fatal`] error, or runs out of attempts.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::domain::RetryError;

/// Marks an error as not worth retrying. Wrap it in `anyhow::Error` and the
/// loop stops on the spot.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Fatal(pub String);

/// Call `operation` up to `max_retries` times, sleeping `sleep` between failed
/// attempts.
///
/// # Errors
///
/// Returns [`RetryError::Fatal`] if the operation returned a [`Fatal`] error,
/// or [`RetryError::MaxRetriesExceeded`] carrying the last error once the
/// attempts are used up.
pub async fn do_with_retry<F, Fut, T>(
    description: &str,
    max_retries: u32,
    sleep: Duration,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut last_error = String::from("operation was never attempted");

    for attempt in 1..=max_retries {
        match operation().await {
            Ok(value) => {
                debug!(operation = %description, attempt, "Operation succeeded");
                return Ok(value);
            }
            Err(e) => {
                if let Some(fatal) = e.downcast_ref::<Fatal>() {
                    error!(operation = %description, attempt, error = %fatal, "Operation failed fatally");
                    return Err(RetryError::Fatal {
                        description: description.to_string(),
                        error: fatal.0.clone(),
                    });
                }
                last_error = format!("{e:#}");
                if attempt < max_retries {
                    warn!(
                        operation = %description,
                        attempt,
                        max_retries,
                        error = %last_error,
                        delay_ms = sleep.as_millis(),
                        "Operation failed, retrying"
                    );
                    tokio::time::sleep(sleep).await;
                }
            }
        }
    }

    error!(operation = %description, max_retries, error = %last_error, "Operation failed after max retries");
    Err(RetryError::MaxRetriesExceeded {
        description: description.to_string(),
        max_retries,
        last_error,
    })
}
