//! YouTube Data API v3 search with transparent pagination.
//!
//! `search.list` only returns ids (50 per page at most), so results are
//! gathered page by page up to the requested count, then hydrated through
//! `videos.list` in batches of 50 ids.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::utils::watch_url;

/// Upper bound imposed by the Data API on both `maxResults` and `id=` lists.
pub const API_BATCH_LIMIT: usize = 50;

/// Pages tolerated beyond the ones `max_results` needs, for short pages.
const EXTRA_PAGES: usize = 2;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(
        "Clé API YouTube non configurée. Veuillez définir {0} dans les variables d'environnement."
    )]
    MissingApiKey(String),

    #[error("YouTube Data API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("YouTube Data API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One page of `search.list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// One entry of the `/recherche` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub titre: String,
    pub duree: String,
    pub qualite: String,
    pub lien: String,
    pub image_url: String,
    pub auteur: String,
    pub vues: String,
}

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search_page(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage, SearchError>;

    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoSummary>, SearchError>;
}

/// Where the API key comes from.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// Read from this environment variable on every call.
    Env(String),
    Static(String),
}

impl ApiKeySource {
    pub fn resolve(&self) -> Result<String, SearchError> {
        match self {
            Self::Static(key) => Ok(key.clone()),
            Self::Env(var) => std::env::var(var)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| SearchError::MissingApiKey(var.clone())),
        }
    }
}

pub struct YouTubeDataApi {
    http: reqwest::Client,
    base_url: String,
    key: ApiKeySource,
}

impl YouTubeDataApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, key: ApiKeySource) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key,
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, SearchError> {
        let key = self.key.resolve()?;
        let url = format!("{}/{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", key)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body: Value = res.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("no error message")
                .to_string();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(res.json().await?)
    }
}

#[async_trait]
impl SearchApi for YouTubeDataApi {
    async fn search_page(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("part", "id,snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.min(API_BATCH_LIMIT).to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let body = self.get_json("search", &params).await?;

        let video_ids = body
            .get("items")
            .and_then(|i| i.as_array())
            .into_iter()
            .flatten()
            .filter_map(|item| item.get("id")?.get("videoId")?.as_str())
            .map(str::to_string)
            .collect();

        let next_page_token = body
            .get("nextPageToken")
            .and_then(|t| t.as_str())
            .map(str::to_string);

        Ok(SearchPage {
            video_ids,
            next_page_token,
        })
    }

    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoSummary>, SearchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("id", ids.join(",")),
            ("part", "snippet,contentDetails,statistics".to_string()),
        ];
        let body = self.get_json("videos", &params).await?;

        Ok(body
            .get("items")
            .and_then(|i| i.as_array())
            .into_iter()
            .flatten()
            .filter_map(parse_video_item)
            .collect())
    }
}

/// Collects up to `max_results` videos for `query`.
///
/// Stops as soon as enough ids are gathered or upstream stops making
/// progress: no page token, an empty page, a repeated token, or more pages
/// than `max_results` could need. Fewer results are then returned and
/// nothing is padded.
pub async fn collect_results(
    api: &dyn SearchApi,
    query: &str,
    max_results: usize,
    page_size: usize,
) -> Result<Vec<VideoSummary>, SearchError> {
    let page_size = page_size.clamp(1, API_BATCH_LIMIT);
    let max_pages = max_results.div_ceil(page_size) + EXTRA_PAGES;
    let mut ids: Vec<String> = Vec::new();
    let mut next_page_token: Option<String> = None;
    let mut pages = 0usize;

    while ids.len() < max_results && pages < max_pages {
        let remaining = max_results - ids.len();
        let page = api
            .search_page(query, remaining.min(page_size), next_page_token.as_deref())
            .await?;
        pages += 1;

        let stalled = page.video_ids.is_empty()
            || (page.next_page_token.is_some() && page.next_page_token == next_page_token);
        ids.extend(page.video_ids);
        next_page_token = page.next_page_token;

        if stalled || next_page_token.is_none() {
            break;
        }
    }

    if ids.len() < max_results {
        tracing::debug!(
            "search '{}': pagination ended after {} page(s) with {}/{} ids",
            query,
            pages,
            ids.len(),
            max_results
        );
    }
    ids.truncate(max_results);

    let mut videos = Vec::with_capacity(ids.len());
    for batch in ids.chunks(API_BATCH_LIMIT) {
        videos.extend(api.video_details(batch).await?);
    }

    tracing::debug!(
        "search '{}': {} video(s) from {} page(s)",
        query,
        videos.len(),
        pages
    );
    Ok(videos)
}

fn parse_video_item(video: &Value) -> Option<VideoSummary> {
    let video_id = video.get("id")?.as_str()?;
    let snippet = video.get("snippet")?;
    let content_details = video.get("contentDetails");

    let duration = content_details
        .and_then(|c| c.get("duration"))
        .and_then(|d| d.as_str())
        .unwrap_or("PT0S");

    let definition = content_details
        .and_then(|c| c.get("definition"))
        .and_then(|d| d.as_str())
        .unwrap_or("sd");

    let thumbnails = snippet.get("thumbnails");
    let image_url = ["maxres", "high", "medium"]
        .iter()
        .find_map(|size| thumbnails?.get(*size))
        .and_then(|t| t.get("url"))
        .and_then(|u| u.as_str())
        .unwrap_or_default();

    let text = |key: &str| {
        snippet
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    Some(VideoSummary {
        titre: text("title"),
        duree: format_duration(duration),
        qualite: definition.to_uppercase(),
        lien: watch_url(video_id),
        image_url: image_url.to_string(),
        auteur: text("channelTitle"),
        vues: video
            .get("statistics")
            .and_then(|s| s.get("viewCount"))
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string(),
    })
}

/// `PT1H2M3S` → `1h 2m 3s`.
pub fn format_duration(iso: &str) -> String {
    iso.replace("PT", "")
        .replace('H', "h ")
        .replace('M', "m ")
        .replace('S', "s")
        .trim()
        .to_string()
}
