pub mod clients;
pub mod extractor;
pub mod search;
pub mod utils;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

use clients::{ClientProfile, common::{INNERTUBE_API, make_player_request}};

use crate::{
    sources::{Extractor, UpstreamError, UpstreamSession, VideoDetails},
    streams::StreamDescriptor,
};

/// InnerTube-backed extraction engine. Opening a session is free; the
/// player request only goes out on first attribute access.
pub struct YouTubeExtractor {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeExtractor {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, INNERTUBE_API)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    async fn open_session(
        &self,
        video_id: &str,
        profile: ClientProfile,
    ) -> Result<Box<dyn UpstreamSession>, UpstreamError> {
        if video_id.is_empty() {
            return Err(UpstreamError::new("empty video id"));
        }

        Ok(Box::new(YouTubeSession {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            video_id: video_id.to_string(),
            profile,
            player: OnceCell::new(),
        }))
    }
}

pub struct YouTubeSession {
    http: reqwest::Client,
    base_url: String,
    video_id: String,
    profile: ClientProfile,
    player: OnceCell<Value>,
}

impl YouTubeSession {
    async fn player(&self) -> Result<&Value, UpstreamError> {
        self.player
            .get_or_try_init(|| async {
                let body = make_player_request(
                    &self.http,
                    &self.base_url,
                    &self.profile.config(),
                    &self.video_id,
                )
                .await?;
                extractor::check_playability(&body)?;
                Ok(body)
            })
            .await
    }
}

#[async_trait]
impl UpstreamSession for YouTubeSession {
    fn video_id(&self) -> &str {
        &self.video_id
    }

    fn profile(&self) -> ClientProfile {
        self.profile
    }

    async fn details(&self) -> Result<VideoDetails, UpstreamError> {
        let body = self.player().await?;
        extractor::extract_details(body).ok_or_else(|| {
            UpstreamError::new(format!(
                "{} player response for {} has no videoDetails",
                self.profile, self.video_id
            ))
        })
    }

    async fn streams(&self) -> Result<Vec<StreamDescriptor>, UpstreamError> {
        let body = self.player().await?;
        let streams = extractor::extract_streams(body);
        tracing::debug!(
            "[{}] {} advertised {} stream(s)",
            self.video_id,
            self.profile,
            streams.len()
        );
        Ok(streams)
    }
}
