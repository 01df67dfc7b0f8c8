use docqa_config::RetryConfig;
use docqa_core::DocqaError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Which external boundary a retried call belongs to; used to synthesize
/// the right error variant on timeout.
#[derive(Debug, Clone, Copy)]
pub enum CallKind {
    Embedding,
    Generation,
}

impl CallKind {
    fn timeout_error(self, timeout: Duration) -> DocqaError {
        let message = format!("call timed out after {}ms", timeout.as_millis());
        match self {
            CallKind::Embedding => DocqaError::embedding(message, true),
            CallKind::Generation => DocqaError::generation(message, true),
        }
    }

    fn name(self) -> &'static str {
        match self {
            CallKind::Embedding => "embedding",
            CallKind::Generation => "generation",
        }
    }
}

/// Run `op` with a per-attempt timeout, retrying transient failures with
/// exponential backoff. Permanent errors (malformed input, auth failure,
/// dimension mismatch) are returned immediately without sleeping.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryConfig,
    kind: CallKind,
    mut op: F,
) -> Result<T, DocqaError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DocqaError>>,
{
    let timeout = Duration::from_millis(policy.timeout_ms);
    let mut last_err = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            let backoff =
                Duration::from_millis(policy.base_backoff_ms << (attempt - 2).min(16));
            tokio::time::sleep(backoff).await;
        }

        match tokio::time::timeout(timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(attempt, error = %err, "transient {} failure, retrying", kind.name());
                last_err = Some(err);
            }
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                warn!(attempt, "{} call timed out", kind.name());
                last_err = Some(kind.timeout_error(timeout));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| kind.timeout_error(timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy(max_attempts: usize) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_backoff_ms: 1,
            timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&policy(3), CallKind::Embedding, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DocqaError::embedding("rate limited", true))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, _> = with_retry(&policy(3), CallKind::Generation, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DocqaError::generation("bad request", false)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, _> = with_retry(&policy(2), CallKind::Embedding, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DocqaError::embedding("connection reset", true)) }
        })
        .await;
        assert!(result.unwrap_err().is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
