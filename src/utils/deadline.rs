//! Deadline wrapper for backend calls.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// A backend call did not complete within its deadline.
///
/// The wrapped future has been dropped by the time this is returned, which
/// cancels the in-flight operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} timed out after {elapsed_ms}ms")]
pub struct DeadlineExceeded {
    pub operation: &'static str,
    pub elapsed_ms: u128,
}

/// Runs `fut` with a deadline of `limit`.
///
/// # Examples
///
/// ```ignore
/// let link = with_deadline("find_by_code", Duration::from_secs(2), repo.find_by_code(code)).await??;
/// ```
pub async fn with_deadline<F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DeadlineExceeded {
            operation,
            elapsed_ms: limit.as_millis(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline("fast", Duration::from_millis(100), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let result = with_deadline("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            7
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.operation, "slow");
        assert_eq!(err.elapsed_ms, 50);
        assert!(err.to_string().contains("slow timed out"));
    }
}
