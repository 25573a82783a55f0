use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{ApiError, ImportError};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How often and how patiently a remote call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one. Always at least 1.
    pub max_attempts: usize,
    /// Fixed pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

type SleepFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs remote operations, retrying transient network failures with a fixed
/// delay and giving up immediately on everything else.
///
/// Whatever the operation, there are only two outcomes: its result, or an
/// [`ImportError`] that the caller is expected to propagate up to `main`.
#[derive(Clone)]
pub struct ReliableCaller {
    policy: RetryPolicy,
    sleep: SleepFn,
}

impl ReliableCaller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleep(policy, |delay| tokio::time::sleep(delay).boxed())
    }

    /// Same as [`ReliableCaller::new`], with a custom way of waiting between
    /// attempts.
    pub fn with_sleep<F>(policy: RetryPolicy, sleep: F) -> Self
    where
        F: Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            policy: RetryPolicy {
                max_attempts: policy.max_attempts.max(1),
                ..policy
            },
            sleep: Arc::new(sleep),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<T, ImportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = self.policy.max_attempts;
        let backoff = ConstantBuilder::default()
            .with_delay(self.policy.delay)
            .with_max_times(max_attempts - 1);
        let sleep = Arc::clone(&self.sleep);
        let mut remaining = max_attempts;

        let result = call
            .retry(backoff)
            .sleep(move |delay| sleep(delay))
            .when(ApiError::is_transient)
            .notify(|error: &ApiError, delay: Duration| {
                remaining -= 1;
                log::error!(
                    "{} encountered an error ({} retries remaining, retrying in {}): {}",
                    operation,
                    remaining,
                    humantime::format_duration(delay),
                    error
                );
            })
            .await;

        result.map_err(|source| {
            if source.is_transient() {
                log::error!(
                    "{} encountered an error (0 retries remaining): {}",
                    operation,
                    source
                );
                ImportError::RetriesExhausted {
                    operation,
                    attempts: max_attempts,
                    source,
                }
            } else {
                log::error!("Exiting due to unhandled error in {}: {}", operation, source);
                ImportError::Fatal { operation, source }
            }
        })
    }
}
