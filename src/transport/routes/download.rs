use std::{io, sync::Arc};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, header},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, Span};
use uuid::Uuid;

use super::{acquire_session, require_video_id};
use crate::{
    common::{AppError, MediaFormat},
    relay::{ChunkSink, RelayError, pump},
    server::AppState,
    streams::select_from_session,
};

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub video_url: Option<String>,
    pub qualite: Option<String>,
    #[serde(rename = "type")]
    pub format: Option<String>,
}

/// GET /download?video_url=...&qualite=720p&type=mp4
///
/// Every failure up to and including the upstream media status check is
/// answered with a JSON error. Once headers are out, a broken transfer can
/// only be signalled by aborting the body.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let video_id = require_video_id(params.video_url.as_deref())?;
    let format = match params.format.as_deref() {
        None => MediaFormat::Mp4,
        Some(raw) => MediaFormat::from_ext(raw).ok_or_else(|| AppError::InvalidFormat(raw.to_string()))?,
    };
    let quality = params
        .qualite
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| state.config.youtube.default_quality.clone());

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("download", %request_id, %video_id);

    async move {
        tracing::info!("GET /download {} qualite={} type={}", video_id, quality, format);
        let retry_after = state.retry_after_secs();

        let session = acquire_session(&state, &video_id).await?;
        let details = session
            .details()
            .await
            .map_err(|e| AppError::from_upstream(e, retry_after))?;

        let stream = select_from_session(session.as_ref(), format, &quality)
            .await
            .map_err(|e| AppError::from_upstream(e, retry_after))?
            .ok_or_else(|| AppError::NoMatchingStream {
                format,
                quality: quality.clone(),
            })?;

        let url = stream
            .media_url()
            .map_err(|e| AppError::from_upstream(e, retry_after))?;
        let media = state.relay.open(url).await?;

        let content_length = match (stream.content_length, media.content_length()) {
            (Some(announced), Some(actual)) if announced != actual => {
                tracing::warn!(
                    "descriptor length {} differs from media length {}, using the latter",
                    announced,
                    actual
                );
                Some(actual)
            }
            (announced, _) => announced,
        };

        let filename = download_filename(&details.title, &quality, format);
        let mut response = Response::new(spawn_relay(
            media.into_reader(),
            state.config.relay.chunk_size,
        ));

        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(&filename)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(format.content_type()),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
        if let Some(len) = content_length {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        }

        Ok::<_, AppError>(response)
    }
    .instrument(span)
    .await
}

/// Moves the transfer into its own task feeding a one-slot channel that
/// backs the response body. Dropping the body ends the task.
fn spawn_relay<R>(reader: R, chunk_size: usize) -> Body
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let (mut tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(1);

    tokio::spawn(
        async move {
            match pump(reader, &mut tx, chunk_size).await {
                Ok(stats) => tracing::info!(
                    "relay finished: {} bytes in {} chunks",
                    stats.bytes_sent,
                    stats.chunks
                ),
                Err(RelayError::SinkClosed { bytes_sent }) => {
                    tracing::info!("client disconnected after {} bytes", bytes_sent)
                }
                Err(err) => {
                    tracing::error!("{}", err);
                    tx.abort(io::Error::other(err.to_string())).await;
                }
            }
        }
        .instrument(Span::current()),
    );

    Body::from_stream(ReceiverStream::new(rx))
}

fn content_disposition(filename: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        urlencoding::encode(filename)
    ))
    .map_err(|e| AppError::UpstreamOther(e.to_string()))
}

/// Keeps alphanumerics, spaces, `-` and `_` of the title.
pub fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        "video".to_string()
    } else {
        safe.to_string()
    }
}

pub fn download_filename(title: &str, quality: &str, format: MediaFormat) -> String {
    format!(
        "{}_{}.{}",
        sanitize_title(title),
        sanitize_title(quality),
        format.as_ext()
    )
}
