//! Resilient acquisition of an upstream session.

pub mod backoff;
pub mod classify;
pub mod selector;
pub mod sleeper;

pub use backoff::BackoffPolicy;
pub use classify::{Classifier, default_classifier};
pub use selector::{ClientSelector, FALLBACK_ATTEMPTS, RetryAttempt, SelectorError};
pub use sleeper::{SleepReason, Sleeper, TokioSleeper};

/// Classification of one failed upstream attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 429 / "too many requests". Retried with exponential backoff.
    RateLimited,
    /// HTTP 403. Retried with another profile after a short random wait.
    Forbidden,
    /// Anything else. Not delayed; the next profile is tried right away.
    Other,
}
