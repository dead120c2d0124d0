#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tubelink::{
    common::HttpClient,
    configs::Config,
    fetch::{SleepReason, Sleeper},
    relay::MediaRelay,
    server::AppState,
    sources::{
        Extractor, UpstreamError, UpstreamSession, VideoDetails,
        youtube::{
            clients::ClientProfile,
            search::{SearchApi, SearchError, SearchPage, VideoSummary},
        },
    },
    streams::{StreamDescriptor, StreamLocator},
    transport,
};

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Never actually waits; only counts.
#[derive(Default)]
pub struct InstantSleeper {
    pub sleeps: AtomicUsize,
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration, _reason: SleepReason) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub enum Behaviour {
    Serve(Vec<StreamDescriptor>),
    FailWith(u16),
}

/// Extractor whose every session behaves the same way. Counts upstream calls.
pub struct FakeExtractor {
    behaviour: Behaviour,
    pub title: String,
    pub opened: AtomicUsize,
}

impl FakeExtractor {
    pub fn serving(streams: Vec<StreamDescriptor>) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Behaviour::Serve(streams),
            title: "Never Gonna Give You Up".into(),
            opened: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Behaviour::FailWith(status),
            title: String::new(),
            opened: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    video_id: String,
    profile: ClientProfile,
    title: String,
    streams: Vec<StreamDescriptor>,
}

#[async_trait]
impl UpstreamSession for FakeSession {
    fn video_id(&self) -> &str {
        &self.video_id
    }

    fn profile(&self) -> ClientProfile {
        self.profile
    }

    async fn details(&self) -> Result<VideoDetails, UpstreamError> {
        Ok(VideoDetails {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            author: "Rick Astley".into(),
            length_seconds: 212,
            views: 1_500_000_000,
            thumbnail_url: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".into()),
        })
    }

    async fn streams(&self) -> Result<Vec<StreamDescriptor>, UpstreamError> {
        Ok(self.streams.clone())
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn open_session(
        &self,
        video_id: &str,
        profile: ClientProfile,
    ) -> Result<Box<dyn UpstreamSession>, UpstreamError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::FailWith(status) => Err(UpstreamError::with_status(
                *status,
                format!("player request returned {status}"),
            )),
            Behaviour::Serve(streams) => Ok(Box::new(FakeSession {
                video_id: video_id.to_string(),
                profile,
                title: self.title.clone(),
                streams: streams.clone(),
            })),
        }
    }
}

/// Search backend serving `total` synthetic results.
pub struct FakeSearch {
    pub total: usize,
    pub pages: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with_results(total: usize) -> Arc<Self> {
        Arc::new(Self {
            total,
            pages: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchApi for FakeSearch {
    async fn search_page(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        self.pages.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + max_results).min(self.total);
        Ok(SearchPage {
            video_ids: (start..end).map(|i| format!("vid{i:08}")).collect(),
            next_page_token: (end < self.total).then(|| end.to_string()),
        })
    }

    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoSummary>, SearchError> {
        Ok(ids
            .iter()
            .map(|id| VideoSummary {
                titre: format!("Titre {id}"),
                duree: "3m 33s".into(),
                qualite: "HD".into(),
                lien: format!("https://www.youtube.com/watch?v={id}"),
                image_url: String::new(),
                auteur: "Auteur".into(),
                vues: "42".into(),
            })
            .collect())
    }
}

pub fn progressive(itag: u32, height: u32, url: &str, content_length: Option<u64>) -> StreamDescriptor {
    StreamDescriptor {
        itag,
        mime_type: "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"".into(),
        container: "mp4".into(),
        resolution: Some(format!("{height}p")),
        height: Some(height),
        fps: Some(30),
        bitrate: Some(500_000),
        has_audio: true,
        has_video: true,
        content_length,
        locator: StreamLocator::Direct(url.to_string()),
    }
}

pub fn audio_only(itag: u32, bitrate: u64, url: &str) -> StreamDescriptor {
    StreamDescriptor {
        itag,
        mime_type: "audio/mp4; codecs=\"mp4a.40.2\"".into(),
        container: "m4a".into(),
        resolution: None,
        height: None,
        fps: None,
        bitrate: Some(bitrate),
        has_audio: true,
        has_video: false,
        content_length: None,
        locator: StreamLocator::Direct(url.to_string()),
    }
}

pub fn video_only(itag: u32, height: u32, url: &str) -> StreamDescriptor {
    StreamDescriptor {
        itag,
        mime_type: "video/mp4; codecs=\"avc1.640028\"".into(),
        container: "mp4".into(),
        resolution: Some(format!("{height}p")),
        height: Some(height),
        fps: Some(30),
        bitrate: Some(4_000_000),
        has_audio: false,
        has_video: true,
        content_length: None,
        locator: StreamLocator::Direct(url.to_string()),
    }
}

pub fn app(extractor: Arc<dyn Extractor>, search: Arc<dyn SearchApi>) -> Router {
    app_with_config(extractor, search, Config::default())
}

pub fn app_with_config(
    extractor: Arc<dyn Extractor>,
    search: Arc<dyn SearchApi>,
    config: Config,
) -> Router {
    let relay_http =
        HttpClient::new_streaming(Duration::from_secs(5), Duration::from_secs(5)).unwrap();
    let state = AppState::new(
        config,
        extractor,
        search,
        MediaRelay::new(relay_http),
        Arc::new(InstantSleeper::default()),
    );
    transport::router(Arc::new(state))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
