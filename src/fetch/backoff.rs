use std::time::Duration;

use rand::Rng;

use crate::configs::BackoffConfig;

use super::FailureKind;

/// Delay schedules used while acquiring an upstream session.
///
/// Every method is pure given the random source, so a seeded `StdRng`
/// reproduces the same schedule. The caller performs the actual sleep.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    rate_limit_base: Duration,
    rate_limit_ceiling: Duration,
    rate_limit_jitter: Duration,
    forbidden: (Duration, Duration),
    pre_request: (Duration, Duration),
    fallback: (Duration, Duration),
}

impl BackoffPolicy {
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            rate_limit_base: Duration::from_millis(config.rate_limit_base_ms),
            rate_limit_ceiling: Duration::from_millis(config.rate_limit_ceiling_ms),
            rate_limit_jitter: Duration::from_millis(config.rate_limit_jitter_ms),
            forbidden: (
                Duration::from_millis(config.forbidden_min_ms),
                Duration::from_millis(config.forbidden_max_ms),
            ),
            pre_request: (
                Duration::from_millis(config.pre_request_min_ms),
                Duration::from_millis(config.pre_request_max_ms),
            ),
            fallback: (
                Duration::from_millis(config.fallback_min_ms),
                Duration::from_millis(config.fallback_max_ms),
            ),
        }
    }

    /// A policy with every delay at zero.
    pub fn immediate() -> Self {
        Self {
            rate_limit_base: Duration::ZERO,
            rate_limit_ceiling: Duration::ZERO,
            rate_limit_jitter: Duration::ZERO,
            forbidden: (Duration::ZERO, Duration::ZERO),
            pre_request: (Duration::ZERO, Duration::ZERO),
            fallback: (Duration::ZERO, Duration::ZERO),
        }
    }

    pub fn ceiling(&self) -> Duration {
        self.rate_limit_ceiling
    }

    /// Delay to wait after a failure of `kind` on attempt `attempt` (0-based).
    ///
    /// * `RateLimited`: `base * 2^attempt + jitter`, capped at the ceiling.
    /// * `Forbidden`: short uniform delay, independent of `attempt`.
    /// * `Other`: zero, the failure is not retried at this layer.
    pub fn delay_for<R: Rng + ?Sized>(
        &self,
        kind: FailureKind,
        attempt: u32,
        rng: &mut R,
    ) -> Duration {
        match kind {
            FailureKind::RateLimited => {
                let factor = 2u32.saturating_pow(attempt.min(31));
                let exp = self.rate_limit_base.saturating_mul(factor);
                let jitter = uniform(rng, Duration::ZERO, self.rate_limit_jitter);
                exp.saturating_add(jitter).min(self.rate_limit_ceiling)
            }
            FailureKind::Forbidden => uniform(rng, self.forbidden.0, self.forbidden.1),
            FailureKind::Other => Duration::ZERO,
        }
    }

    /// Small spacing before each profile attempt so bursts don't look abusive.
    pub fn pre_request<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        uniform(rng, self.pre_request.0, self.pre_request.1)
    }

    /// Longer wait before each final attempt with the fallback profile.
    pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        uniform(rng, self.fallback.0, self.fallback.1)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}

/// Uniform in `[min, max)`, or `min` when the range is empty.
fn uniform<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let lo = min.as_millis() as u64;
    let hi = max.as_millis() as u64;
    Duration::from_millis(rng.gen_range(lo..hi))
}
