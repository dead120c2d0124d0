//! Client-profile rotation.
//!
//! ```text
//!  profiles[0..max_attempts]          fallback profile x2
//!  ┌──────────────────────────────┐   ┌───────────────────────┐
//!  │ pre-request jitter           │   │ fallback delay (5-15s)│
//!  │ open_session + details()     │──►│ open_session+details()│──► last error
//!  │ fail: classify, backoff      │   └───────────────────────┘
//!  └──────────────────────────────┘
//! ```
//!
//! The first usable session wins. A failed attempt is never fatal on its
//! own; only running out of attempts is, and then the last error is
//! returned as-is together with its classification.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    common::types::request_rng,
    sources::{Extractor, UpstreamError, UpstreamSession, youtube::clients::ClientProfile},
};

use super::{
    BackoffPolicy, Classifier, FailureKind, SleepReason, Sleeper, default_classifier,
};

/// Number of final attempts made with the fallback profile.
pub const FALLBACK_ATTEMPTS: usize = 2;

/// One failed try, kept for logging and for the final error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    pub index: u32,
    pub profile: ClientProfile,
    pub kind: FailureKind,
    /// Delay planned after this failure (zero when none applies).
    pub delay: Duration,
}

#[derive(Debug, Error)]
#[error("no client profile produced a usable session after {} attempts: {last_error}", .history.len())]
pub struct SelectorError {
    pub kind: FailureKind,
    pub last_error: UpstreamError,
    pub history: Vec<RetryAttempt>,
}

pub struct ClientSelector {
    extractor: Arc<dyn Extractor>,
    sleeper: Arc<dyn Sleeper>,
    policy: BackoffPolicy,
    classifier: Classifier,
    fallback_profile: ClientProfile,
    rng: Mutex<StdRng>,
}

impl ClientSelector {
    pub fn new(extractor: Arc<dyn Extractor>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            extractor,
            sleeper,
            policy: BackoffPolicy::default(),
            classifier: default_classifier,
            fallback_profile: ClientProfile::Web,
            rng: Mutex::new(request_rng()),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_fallback_profile(mut self, profile: ClientProfile) -> Self {
        self.fallback_profile = profile;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Tries `profiles` in order (at most `max_attempts` of them), then the
    /// fallback profile [`FALLBACK_ATTEMPTS`] times.
    pub async fn acquire_session(
        &self,
        video_id: &str,
        profiles: &[ClientProfile],
        max_attempts: usize,
    ) -> Result<Box<dyn UpstreamSession>, SelectorError> {
        let mut history: Vec<RetryAttempt> = Vec::new();
        let mut last: Option<(FailureKind, UpstreamError)> = None;

        for &profile in profiles.iter().take(max_attempts) {
            let index = history.len() as u32;
            let jitter = self.policy.pre_request(&mut *self.rng.lock());
            self.sleeper.sleep(jitter, SleepReason::PreRequest).await;

            let err = match self.try_profile(video_id, profile).await {
                Ok(session) => {
                    info!(
                        "[{}] session opened with {} after {} failed attempt(s)",
                        video_id,
                        profile,
                        history.len()
                    );
                    return Ok(session);
                }
                Err(err) => err,
            };

            let kind = (self.classifier)(&err);
            let delay = self.policy.delay_for(kind, index, &mut *self.rng.lock());
            history.push(RetryAttempt {
                index,
                profile,
                kind,
                delay,
            });

            match kind {
                FailureKind::RateLimited | FailureKind::Forbidden => {
                    warn!(
                        "[{}] {} failed ({:?}): {}. Retrying in {:?}",
                        video_id, profile, kind, err, delay
                    );
                    self.sleeper.sleep(delay, SleepReason::Backoff(kind)).await;
                }
                FailureKind::Other => {
                    warn!("[{}] {} failed: {}. Trying next client", video_id, profile, err);
                }
            }
            last = Some((kind, err));
        }

        for round in 0..FALLBACK_ATTEMPTS {
            let index = history.len() as u32;
            let delay = self.policy.fallback(&mut *self.rng.lock());
            debug!(
                "[{}] fallback {}/{} with {} in {:?}",
                video_id,
                round + 1,
                FALLBACK_ATTEMPTS,
                self.fallback_profile,
                delay
            );
            self.sleeper.sleep(delay, SleepReason::Fallback).await;

            match self.try_profile(video_id, self.fallback_profile).await {
                Ok(session) => {
                    info!(
                        "[{}] session opened with fallback {} after {} failed attempt(s)",
                        video_id,
                        self.fallback_profile,
                        history.len()
                    );
                    return Ok(session);
                }
                Err(err) => {
                    let kind = (self.classifier)(&err);
                    warn!(
                        "[{}] fallback {} failed ({:?}): {}",
                        video_id, self.fallback_profile, kind, err
                    );
                    history.push(RetryAttempt {
                        index,
                        profile: self.fallback_profile,
                        kind,
                        delay: Duration::ZERO,
                    });
                    last = Some((kind, err));
                }
            }
        }

        let (kind, last_error) = last.unwrap_or_else(|| {
            (
                FailureKind::Other,
                UpstreamError::new("no client profile was attempted"),
            )
        });
        Err(SelectorError {
            kind,
            last_error,
            history,
        })
    }

    /// Opens a session and forces `details()`: a session object alone does
    /// not prove the upstream accepted this client identity.
    async fn try_profile(
        &self,
        video_id: &str,
        profile: ClientProfile,
    ) -> Result<Box<dyn UpstreamSession>, UpstreamError> {
        let session = self.extractor.open_session(video_id, profile).await?;
        let details = session.details().await?;
        debug!("[{}] {} accepted: {:?}", video_id, profile, details.title);
        Ok(session)
    }
}
