use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    common::types::MediaFormat,
    fetch::{FailureKind, SelectorError, default_classifier},
    relay::RelayError,
    sources::UpstreamError,
    sources::youtube::search::SearchError,
};

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Seconds to wait before retrying, only set for throttling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            retry_after: None,
            code: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: u64) -> Self {
        Self {
            error: message.into(),
            retry_after: Some(retry_after),
            code: Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
        }
    }
}

/// Errors surfaced at the handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Paramètre '{0}' requis")]
    MissingParameter(&'static str),

    #[error("Paramètre '{name}' invalide: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("URL YouTube invalide: {0}")]
    InvalidUrl(String),

    #[error("Type '{0}' non supporté, valeurs acceptées: mp4, mp3")]
    InvalidFormat(String),

    #[error("{0}")]
    Configuration(String),

    #[error("YouTube limite les requêtes, réessayez plus tard: {message}")]
    UpstreamRateLimited { message: String, retry_after: u64 },

    #[error("Accès refusé par YouTube: {0}")]
    UpstreamForbidden(String),

    #[error("{0}")]
    UpstreamOther(String),

    #[error("Aucun flux {format} disponible pour la qualité '{quality}'")]
    NoMatchingStream { format: MediaFormat, quality: String },

    #[error("Erreur lors de la récupération du flux: {0}")]
    UpstreamMedia(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidUrl(_)
            | Self::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NoMatchingStream { .. } => StatusCode::NOT_FOUND,
            Self::Configuration(_)
            | Self::UpstreamForbidden(_)
            | Self::UpstreamOther(_)
            | Self::UpstreamMedia(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps an exhausted session acquisition onto the HTTP taxonomy, keeping
    /// the classification of the last failure.
    pub fn from_selector(err: SelectorError, retry_after: u64) -> Self {
        Self::classified(err.kind, err.last_error.to_string(), retry_after)
    }

    /// Maps a failure raised on an already acquired session.
    pub fn from_upstream(err: UpstreamError, retry_after: u64) -> Self {
        Self::classified(default_classifier(&err), err.to_string(), retry_after)
    }

    fn classified(kind: FailureKind, message: String, retry_after: u64) -> Self {
        match kind {
            FailureKind::RateLimited => Self::UpstreamRateLimited {
                message,
                retry_after,
            },
            FailureKind::Forbidden => Self::UpstreamForbidden(message),
            FailureKind::Other => Self::UpstreamOther(message),
        }
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        Self::UpstreamMedia(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match &err {
            SearchError::MissingApiKey(_) => Self::Configuration(err.to_string()),
            _ => Self::UpstreamOther(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("request failed ({}): {}", status, message);
        } else {
            tracing::debug!("request rejected ({}): {}", status, message);
        }

        match self {
            Self::UpstreamRateLimited { retry_after, .. } => {
                let mut response =
                    (status, Json(ErrorBody::rate_limited(message, retry_after))).into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(retry_after),
                );
                response
            }
            _ => (status, Json(ErrorBody::new(message))).into_response(),
        }
    }
}
