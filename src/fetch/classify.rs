use crate::sources::UpstreamError;

use super::FailureKind;

/// Maps an upstream failure to a [`FailureKind`]. Swappable so tests can
/// feed synthetic failures without mimicking upstream wording.
pub type Classifier = fn(&UpstreamError) -> FailureKind;

/// Status code first, then message markers: `429` / "too many requests"
/// is rate limiting, `403` is access denial, anything else is `Other`.
pub fn default_classifier(err: &UpstreamError) -> FailureKind {
    match err.status {
        Some(429) => return FailureKind::RateLimited,
        Some(403) => return FailureKind::Forbidden,
        _ => {}
    }

    let message = err.message.to_lowercase();
    if message.contains("429") || message.contains("too many requests") {
        FailureKind::RateLimited
    } else if message.contains("403") {
        FailureKind::Forbidden
    } else {
        FailureKind::Other
    }
}
