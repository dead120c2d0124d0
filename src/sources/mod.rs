//! Upstream collaborators: the video extraction engine and its sessions.
//!
//! Everything behind these traits talks to YouTube; the rest of the crate
//! only sees opaque [`UpstreamError`]s and immutable descriptors.

pub mod youtube;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::streams::StreamDescriptor;
use youtube::clients::ClientProfile;

/// Opaque upstream failure. `status` is set when the failure came from an
/// HTTP response; classification otherwise falls back to the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Lightweight metadata of one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub length_seconds: u64,
    pub views: u64,
    pub thumbnail_url: Option<String>,
}

/// Handle on one (video, client profile) pair. Lives for a single request.
#[async_trait]
pub trait UpstreamSession: Send + Sync {
    fn video_id(&self) -> &str;
    fn profile(&self) -> ClientProfile;

    /// Cheap attribute access; the first call may hit the network and is
    /// what proves the upstream accepted this client identity.
    async fn details(&self) -> Result<VideoDetails, UpstreamError>;

    /// Enumerates every variant the upstream advertised for this session.
    async fn streams(&self) -> Result<Vec<StreamDescriptor>, UpstreamError>;
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn open_session(
        &self,
        video_id: &str,
        profile: ClientProfile,
    ) -> Result<Box<dyn UpstreamSession>, UpstreamError>;
}
