pub mod download;
pub mod home;
pub mod info;
pub mod search;

use crate::{
    common::AppError,
    server::AppState,
    sources::{UpstreamSession, youtube::utils::extract_id},
};

/// Validates the `video_url` query parameter and extracts the video id.
pub(crate) fn require_video_id(video_url: Option<&str>) -> Result<String, AppError> {
    let raw = video_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::MissingParameter("video_url"))?;

    extract_id(raw).ok_or_else(|| AppError::InvalidUrl(raw.to_string()))
}

/// Runs the client-profile rotation for `video_id`.
pub(crate) async fn acquire_session(
    state: &AppState,
    video_id: &str,
) -> Result<Box<dyn UpstreamSession>, AppError> {
    state
        .selector()
        .acquire_session(video_id, &state.profiles, state.config.youtube.max_attempts)
        .await
        .map_err(|e| AppError::from_selector(e, state.retry_after_secs()))
}
