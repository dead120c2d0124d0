pub mod selector;

pub use selector::{select, select_from_session};

use crate::sources::UpstreamError;

/// Where the bytes of a variant live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLocator {
    /// Plain, already signed media URL.
    Direct(String),
    /// `signatureCipher` payload that still needs the player's decipher step.
    Ciphered(String),
}

/// One downloadable variant advertised by a session. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub itag: u32,
    pub mime_type: String,
    /// File extension derived from the MIME type (`mp4`, `webm`, `m4a`, ...).
    pub container: String,
    /// Quality label such as `720p`; `None` for audio-only variants.
    pub resolution: Option<String>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    /// Average bitrate in bits per second.
    pub bitrate: Option<u64>,
    pub has_audio: bool,
    pub has_video: bool,
    pub content_length: Option<u64>,
    pub locator: StreamLocator,
}

impl StreamDescriptor {
    /// Audio and video muxed in a single file.
    pub fn is_progressive(&self) -> bool {
        self.has_audio && self.has_video
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    pub fn size_mb(&self) -> Option<f64> {
        self.content_length
            .map(|len| (len as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0)
    }

    /// Resolves the direct, time-limited media URL for this variant.
    pub fn media_url(&self) -> Result<&str, UpstreamError> {
        match &self.locator {
            StreamLocator::Direct(url) => Ok(url),
            StreamLocator::Ciphered(_) => Err(UpstreamError::new(format!(
                "itag {} is signature-ciphered and cannot be fetched directly",
                self.itag
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(locator: StreamLocator) -> StreamDescriptor {
        StreamDescriptor {
            itag: 18,
            mime_type: "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"".into(),
            container: "mp4".into(),
            resolution: Some("360p".into()),
            height: Some(360),
            fps: Some(30),
            bitrate: Some(500_000),
            has_audio: true,
            has_video: true,
            content_length: Some(15_728_640),
            locator,
        }
    }

    #[test]
    fn size_is_rounded_to_two_decimals() {
        let mut d = descriptor(StreamLocator::Direct("https://example.test/v".into()));
        assert_eq!(d.size_mb(), Some(15.0));
        d.content_length = Some(1_234_567);
        assert_eq!(d.size_mb(), Some(1.18));
        d.content_length = None;
        assert_eq!(d.size_mb(), None);
    }

    #[test]
    fn ciphered_locator_does_not_resolve() {
        let d = descriptor(StreamLocator::Ciphered("s=abc&url=...".into()));
        assert!(d.media_url().is_err());

        let d = descriptor(StreamLocator::Direct("https://example.test/v".into()));
        assert_eq!(d.media_url().unwrap(), "https://example.test/v");
        assert!(d.is_progressive());
        assert!(!d.is_audio_only());
    }
}
