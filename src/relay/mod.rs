//! Chunked pass-through of a remote media body.
//!
//! [`MediaRelay::open`] connects and checks the upstream status before any
//! response header goes out; [`pump`] then forwards the body in chunks of at
//! most `chunk_size` bytes, one at a time, to a [`ChunkSink`].

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::mpsc,
};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("media server answered {}: {message}", .status.map(|s| s.to_string()).unwrap_or_else(|| "no response".into()))]
    UpstreamMedia {
        status: Option<u16>,
        message: String,
    },

    #[error("transfer interrupted after {bytes_sent} bytes: {message}")]
    TransferInterrupted { bytes_sent: u64, message: String },

    #[error("client went away after {bytes_sent} bytes")]
    SinkClosed { bytes_sent: u64 },
}

/// Totals of one completed relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub bytes_sent: u64,
    pub chunks: u64,
}

/// Receiving end of a relay, normally the outbound response body.
#[async_trait]
pub trait ChunkSink: Send {
    /// Hands one chunk over, waiting while the consumer is busy. Returns
    /// `false` once the consumer is gone.
    async fn send_chunk(&mut self, chunk: Bytes) -> bool;

    /// Resolves once the consumer is gone. Sinks that cannot tell never
    /// resolve.
    async fn closed(&self);

    /// Terminates the stream with an error so the consumer sees a truncated
    /// transfer instead of a clean end.
    async fn abort(&mut self, error: io::Error);
}

#[async_trait]
impl ChunkSink for mpsc::Sender<Result<Bytes, io::Error>> {
    async fn send_chunk(&mut self, chunk: Bytes) -> bool {
        self.send(Ok(chunk)).await.is_ok()
    }

    async fn closed(&self) {
        mpsc::Sender::closed(self).await
    }

    async fn abort(&mut self, error: io::Error) {
        let _ = self.send(Err(error)).await;
    }
}

/// An opened upstream media response whose status was already accepted.
pub struct MediaStream {
    response: reqwest::Response,
}

impl MediaStream {
    /// Length announced by the media server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub fn into_reader(self) -> impl AsyncRead + Unpin + Send {
        StreamReader::new(Box::pin(
            self.response.bytes_stream().map_err(io::Error::other),
        ))
    }
}

#[derive(Clone)]
pub struct MediaRelay {
    http: reqwest::Client,
}

impl MediaRelay {
    /// `http` should come from [`crate::common::HttpClient::new_streaming`].
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn open(&self, url: &str) -> Result<MediaStream, RelayError> {
        let response = self.http.get(url).send().await.map_err(|e| RelayError::UpstreamMedia {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamMedia {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        debug!(
            "media opened: status={} length={:?}",
            status,
            response.content_length()
        );
        Ok(MediaStream { response })
    }

    /// Opens `url` and pumps it into `sink` in one go.
    pub async fn relay<S: ChunkSink>(
        &self,
        url: &str,
        sink: &mut S,
        chunk_size: usize,
    ) -> Result<RelayStats, RelayError> {
        let stream = self.open(url).await?;
        pump(stream.into_reader(), sink, chunk_size).await
    }
}

/// Reads at most `chunk_size` bytes at a time from `reader` and forwards
/// every non-empty read before reading again. Stops as soon as the sink
/// closes, even while a read is pending, and drops the reader unread.
pub async fn pump<R, S>(mut reader: R, sink: &mut S, chunk_size: usize) -> Result<RelayStats, RelayError>
where
    R: AsyncRead + Unpin,
    S: ChunkSink + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut stats = RelayStats::default();

    loop {
        let read = tokio::select! {
            biased;
            _ = sink.closed() => {
                debug!("relay sink closed while reading after {} bytes", stats.bytes_sent);
                return Err(RelayError::SinkClosed {
                    bytes_sent: stats.bytes_sent,
                });
            }
            read = reader.read(&mut buf) => read,
        };

        let n = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("relay read failed after {} bytes: {}", stats.bytes_sent, e);
                return Err(RelayError::TransferInterrupted {
                    bytes_sent: stats.bytes_sent,
                    message: e.to_string(),
                });
            }
        };

        if !sink.send_chunk(Bytes::copy_from_slice(&buf[..n])).await {
            debug!("relay sink closed after {} bytes", stats.bytes_sent);
            return Err(RelayError::SinkClosed {
                bytes_sent: stats.bytes_sent,
            });
        }
        stats.bytes_sent += n as u64;
        stats.chunks += 1;
    }

    Ok(stats)
}
