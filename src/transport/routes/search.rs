use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    common::AppError,
    server::AppState,
    sources::youtube::search::{VideoSummary, collect_results},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub video: Option<String>,
    pub max_results: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub recherche: String,
    pub nombre_resultats: usize,
    pub max_demande: usize,
    pub videos: Vec<VideoSummary>,
}

/// GET /recherche?video=...&max_results=...
pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params
        .video
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingParameter("video"))?;

    let config = &state.config.search;
    let requested = match params.max_results.as_deref().map(str::trim) {
        None | Some("") => config.default_max_results,
        Some(raw) => raw.parse::<usize>().map_err(|_| AppError::InvalidParameter {
            name: "max_results",
            value: raw.to_string(),
        })?,
    };
    let max_results = requested.min(config.max_results_limit);
    if max_results < requested {
        tracing::debug!(
            "max_results {} clamped to {}",
            requested,
            config.max_results_limit
        );
    }

    tracing::info!("GET /recherche '{}' max_results={}", query, max_results);

    let videos = collect_results(state.search.as_ref(), &query, max_results, config.page_size).await?;

    Ok(Json(SearchResponse {
        nombre_resultats: videos.len(),
        max_demande: max_results,
        recherche: query,
        videos,
    }))
}
