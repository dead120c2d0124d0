use std::time::Duration;

use async_trait::async_trait;

use super::FailureKind;

/// Why the selector is about to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepReason {
    /// Spacing before a regular profile attempt.
    PreRequest,
    /// Backoff after a classified failure.
    Backoff(FailureKind),
    /// Wait before one of the final fallback-profile attempts.
    Fallback,
}

/// Suspends the current request. Injected so retry schedules can be
/// observed in tests without real time passing.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration, reason: SleepReason);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration, reason: SleepReason) {
        if duration.is_zero() {
            return;
        }
        tracing::trace!("sleeping {:?} ({:?})", duration, reason);
        tokio::time::sleep(duration).await;
    }
}
