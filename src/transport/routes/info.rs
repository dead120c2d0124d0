use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::{acquire_session, require_video_id};
use crate::{
    common::AppError,
    server::AppState,
    streams::StreamDescriptor,
};

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub video_url: Option<String>,
}

/// Size in MiB, or `"inconnu"` when upstream did not announce it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SizeMb {
    Known(f64),
    Unknown(&'static str),
}

impl From<Option<f64>> for SizeMb {
    fn from(size: Option<f64>) -> Self {
        size.map(Self::Known).unwrap_or(Self::Unknown("inconnu"))
    }
}

#[derive(Debug, Serialize)]
pub struct StreamSummary {
    pub resolution: Option<String>,
    pub fps: Option<u32>,
    pub size_mb: SizeMb,
}

impl From<&StreamDescriptor> for StreamSummary {
    fn from(stream: &StreamDescriptor) -> Self {
        Self {
            resolution: stream.resolution.clone(),
            fps: stream.fps,
            size_mb: stream.size_mb().into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoInfo {
    pub title: String,
    pub author: String,
    pub length_seconds: u64,
    pub views: u64,
    pub thumbnail_url: Option<String>,
    pub available_streams: Vec<StreamSummary>,
}

/// GET /info?video_url=...
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InfoQuery>,
) -> Result<Json<VideoInfo>, AppError> {
    let video_id = require_video_id(params.video_url.as_deref())?;
    tracing::info!("GET /info {}", video_id);

    let session = acquire_session(&state, &video_id).await?;
    let retry_after = state.retry_after_secs();

    let details = session
        .details()
        .await
        .map_err(|e| AppError::from_upstream(e, retry_after))?;
    let streams = session
        .streams()
        .await
        .map_err(|e| AppError::from_upstream(e, retry_after))?;

    let available_streams = streams
        .iter()
        .filter(|s| s.is_progressive() && s.container == "mp4")
        .map(StreamSummary::from)
        .collect();

    Ok(Json(VideoInfo {
        title: details.title,
        author: details.author,
        length_seconds: details.length_seconds,
        views: details.views,
        thumbnail_url: details.thumbnail_url,
        available_streams,
    }))
}
