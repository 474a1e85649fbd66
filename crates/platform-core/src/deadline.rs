use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;

use crate::errors::AppError;

/// Runs a use-case future under a fixed deadline.
///
/// On expiry the inner future is dropped, which cancels any in-flight store
/// query, and a generic internal error is returned. Nothing is retried.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::internal(anyhow!(
            "operation exceeded deadline of {}ms",
            deadline.as_millis()
        ))),
    }
}
