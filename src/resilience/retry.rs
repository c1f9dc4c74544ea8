use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};

/// Bounded retry with exponential backoff.
///
/// Business-critical calls get the `critical` budget; everything else uses
/// `standard` or `quick`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Full website analysis and other calls the rest of the pipeline
    /// depends on.
    pub fn critical() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(5),
        }
    }

    /// Vision calls and similar best-effort requests.
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }

    /// Plain one-shot requests.
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(3),
        }
    }
}

/// Transient upstream failures worth retrying: overload, rate limiting,
/// server errors, timeouts, dropped connections. Auth and validation
/// failures are not.
pub fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Api { status, body, .. } => {
            matches!(status, 408 | 429 | 500..=599)
                || body.to_lowercase().contains("overloaded")
        }
        Error::Http(err) => {
            err.is_timeout()
                || err.is_connect()
                || err
                    .status()
                    .map(|s| s.is_server_error() || s.as_u16() == 429)
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// `base * 2^attempt * jitter`, with jitter drawn from `uniform(0.5, 1.5)`
/// by the caller so it stays testable.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32, jitter: f64) -> Duration {
    let exponential = policy.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
    Duration::from_secs_f64(exponential * jitter)
}

/// Run `op` until it succeeds, a non-retryable error surfaces, or the
/// attempt budget runs out (then `RetriesExhausted` wrapping the last
/// error).
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error: Option<Error> = None;

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                if attempt + 1 < attempts {
                    let jitter = rand::thread_rng().gen_range(0.5..1.5);
                    let delay = backoff_delay(policy, attempt, jitter);
                    log::warn!(
                        "{} failed ({}); retrying in {:.1}s (attempt {}/{})",
                        label,
                        err,
                        delay.as_secs_f64(),
                        attempt + 1,
                        attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    let source = last_error.unwrap_or_else(|| {
        Error::InvalidInput(format!("retry budget for {label} was empty"))
    });
    log::error!("exhausted {} retry attempts for {}", attempts, label);
    Err(Error::RetriesExhausted {
        label: label.to_string(),
        attempts,
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderName;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn overloaded() -> Error {
        Error::Api {
            provider: ProviderName::Claude,
            status: 529,
            body: "Overloaded".to_string(),
        }
    }

    fn auth_failure() -> Error {
        Error::Api {
            provider: ProviderName::Claude,
            status: 401,
            body: "invalid x-api-key".to_string(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_classification() {
        assert!(is_retryable(&overloaded()));
        assert!(is_retryable(&Error::Api {
            provider: ProviderName::Gemini,
            status: 503,
            body: "unavailable".to_string(),
        }));
        assert!(is_retryable(&Error::Api {
            provider: ProviderName::OpenAi,
            status: 429,
            body: "rate limit".to_string(),
        }));
        assert!(!is_retryable(&auth_failure()));
        assert!(!is_retryable(&Error::InvalidInput("bad".to_string())));
    }

    #[test]
    fn test_backoff_is_monotonic_and_bounded() {
        let policy = RetryPolicy::critical();
        let mut previous = Duration::ZERO;
        for attempt in 0..5 {
            let delay = backoff_delay(&policy, attempt, 1.0);
            assert!(delay > previous);
            previous = delay;

            let low = backoff_delay(&policy, attempt, 0.5);
            let high = backoff_delay(&policy, attempt, 1.5);
            assert!(low < delay && delay < high);
        }
        assert_eq!(backoff_delay(&policy, 0, 1.0), Duration::from_secs(5));
        assert_eq!(backoff_delay(&policy, 2, 1.0), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_succeeds_when_failures_fit_budget() {
        let calls = AtomicU32::new(0);
        let result = retry(&fast_policy(4), "test op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(overloaded())
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry(&fast_policy(3), "doomed op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(overloaded()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(Error::RetriesExhausted {
                attempts, source, ..
            }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, Error::Api { status: 529, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry(&fast_policy(5), "auth op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(auth_failure()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Api { status: 401, .. })));
    }
}
