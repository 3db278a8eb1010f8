//! Fixed-interval retry with cooperative cancellation.

use derive_getters::Getters;
use std::future::Future;
use std::time::Duration;
use storyboard_core::GenerationConfig;
use storyboard_error::GenerationError;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How one scene's attempt sequence ended.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// An attempt succeeded and the run was not cancelled meanwhile
    Succeeded(T),
    /// Every attempt failed; carries the last error
    Failed(GenerationError),
    /// Cancellation was observed; any in-flight outcome was discarded
    Cancelled,
}

/// Why the attempt sequence stopped early.
enum Interrupt {
    Failed(GenerationError),
    Cancelled,
}

/// Attempt budget and spacing for one scene.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_pipeline::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_attempts(), 3);
/// assert_eq!(*policy.delay(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    max_attempts: usize,
    /// Pause between attempts
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy from the `[generation]` configuration section.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }

    /// Run `attempt` until it succeeds, the budget is spent, or `cancel` fires.
    ///
    /// `attempt` receives the 1-based attempt number. The token is checked
    /// before every attempt and once more after the sequence ends; an attempt
    /// already in flight is always awaited, never aborted.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut attempt: F) -> AttemptOutcome<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let strategy = FixedInterval::new(self.delay).take(self.max_attempts - 1);
        let max_attempts = self.max_attempts;
        let mut number = 0;

        let result = Retry::spawn(strategy, || {
            number += 1;
            let current = number;
            let call = (!cancel.is_cancelled()).then(|| attempt(current));
            async move {
                let Some(call) = call else {
                    debug!(attempt = current, "Cancellation observed before attempt");
                    return Err(RetryError::Permanent(Interrupt::Cancelled));
                };
                match call.await {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        warn!(
                            attempt = current,
                            max_attempts,
                            error = %e,
                            "Image generation attempt failed"
                        );
                        Err(RetryError::Transient {
                            err: Interrupt::Failed(e),
                            retry_after: None,
                        })
                    }
                }
            }
        })
        .await;

        if cancel.is_cancelled() {
            if result.is_ok() {
                debug!("Discarding image produced after cancellation");
            }
            return AttemptOutcome::Cancelled;
        }

        match result {
            Ok(value) => AttemptOutcome::Succeeded(value),
            Err(Interrupt::Failed(e)) => {
                warn!(max_attempts, error = %e, "Attempts exhausted");
                AttemptOutcome::Failed(e)
            }
            Err(Interrupt::Cancelled) => AttemptOutcome::Cancelled,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
